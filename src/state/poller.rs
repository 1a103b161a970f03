use crate::state::messages::Announcement;
use crate::stats::report::{TRIPLE_DUB, high_kill_notice, win_message};
use crate::stats::session::SessionStats;
use log::{debug, error, info, warn};
use warzone_api::client::{summarize_match, team_stats};
use warzone_api::cod::{RawMatch, RawPlayer};
use warzone_api::{ApiError, ApiResult, MatchSummary, TeamStats, WarzoneApi};

pub const DEFAULT_HIGH_KILL_THRESHOLD: u32 = 10;

/// The two upstream reads the poller needs.
pub trait MatchSource {
    /// Recent matches, newest first.
    fn recent_matches(
        &self,
        username: &str,
    ) -> impl Future<Output = ApiResult<Vec<RawMatch>>> + Send;

    fn match_players(&self, match_id: &str) -> impl Future<Output = ApiResult<Vec<RawPlayer>>> + Send;
}

impl MatchSource for WarzoneApi {
    fn recent_matches(
        &self,
        username: &str,
    ) -> impl Future<Output = ApiResult<Vec<RawMatch>>> + Send {
        WarzoneApi::recent_matches(self, username)
    }

    fn match_players(&self, match_id: &str) -> impl Future<Output = ApiResult<Vec<RawPlayer>>> + Send {
        WarzoneApi::match_players(self, match_id)
    }
}

/// Turns the upstream match list into accumulated stats and announcements.
///
/// The watermark is the newest match id already handled. It moves once per
/// tick, after the whole batch, so an interrupted tick replays at most that
/// one batch. It lives as long as the process, across sessions, so a match is
/// reported at most once.
#[derive(Debug, Clone)]
pub struct Poller {
    username: String,
    watermark: Option<String>,
    high_kill_threshold: u32,
}

impl Poller {
    pub fn new(username: String, initial_watermark: Option<String>, high_kill_threshold: u32) -> Self {
        Self {
            username,
            watermark: initial_watermark,
            high_kill_threshold,
        }
    }

    pub fn watermark(&self) -> Option<&str> {
        self.watermark.as_deref()
    }

    /// One polling pass.
    ///
    /// A failed list fetch returns the error and leaves the watermark alone.
    /// Problems with individual matches are logged and skipped.
    pub async fn tick<S: MatchSource>(
        &mut self,
        source: &S,
        stats: &mut SessionStats,
    ) -> ApiResult<Vec<Announcement>> {
        let matches = source.recent_matches(&self.username).await?;

        let Some(newest) = matches.first() else {
            debug!("no recent matches for {}", self.username);
            return Ok(Vec::new());
        };
        let newest_id = newest
            .match_id
            .clone()
            .ok_or_else(|| ApiError::Schema("newest match has no matchID".into()))?;

        // Cold start: history before the first poll is never reported.
        let Some(watermark) = self.watermark.clone() else {
            info!("watermark established at match {newest_id}");
            self.watermark = Some(newest_id);
            return Ok(Vec::new());
        };

        let mut announcements = Vec::new();
        let mut checked = 0;
        for raw in &matches {
            if raw.match_id.as_deref() == Some(watermark.as_str()) {
                break;
            }
            checked += 1;

            match summarize_match(raw) {
                Ok(summary) => {
                    let found = self.record(source, &summary, stats).await;
                    announcements.extend(found);
                }
                Err(e) => warn!(
                    "skipping {} match {:?}: {e}",
                    raw.mode.as_deref().unwrap_or("unknown mode"),
                    raw.match_id
                ),
            }
        }

        self.watermark = Some(newest_id);
        info!("poll complete. {checked} recent matches checked.");
        Ok(announcements)
    }

    async fn record<S: MatchSource>(
        &self,
        source: &S,
        summary: &MatchSummary,
        stats: &mut SessionStats,
    ) -> Vec<Announcement> {
        stats.record_match(summary.placement);

        let team = source
            .match_players(&summary.match_id)
            .await
            .and_then(|players| team_stats(&summary.team, &players));
        let team = team.unwrap_or_else(|e| {
            error!("no player stats for match {}: {e}", summary.match_id);
            TeamStats::new()
        });

        let mut announcements = Vec::new();
        for (player, line) in &team {
            stats.record_player_stats(player, line);
            if line.kills >= self.high_kill_threshold {
                info!("found a {}-kill game for {player}", line.kills);
                announcements.push(Announcement::text(high_kill_notice(player, line.kills)));
            }
        }

        if summary.is_win() {
            info!("win found in match {}", summary.match_id);
            stats.record_win();
            announcements.push(Announcement::with_salute(win_message(summary, &team)));
            if stats.win_count() % 3 == 0 {
                announcements.push(Announcement::text(TRIPLE_DUB));
            }
        }

        announcements
    }
}

/// In-memory upstream for driver tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use warzone_api::cod::{RawPlayerInfo, RawPlayerStats};

    pub const TEAM: &str = "team_five";

    #[derive(Debug, Default, Clone)]
    pub struct FakeSource {
        pub matches: Vec<RawMatch>,
        pub details: HashMap<String, Vec<RawPlayer>>,
        pub offline: bool,
    }

    impl FakeSource {
        /// Prepend a match so it becomes the newest.
        pub fn play(&mut self, id: &str, placement: u32, players: Vec<RawPlayer>) {
            self.matches.insert(0, raw_match(id, placement));
            self.details.insert(id.to_owned(), players);
        }
    }

    impl MatchSource for FakeSource {
        fn recent_matches(
            &self,
            _username: &str,
        ) -> impl Future<Output = ApiResult<Vec<RawMatch>>> + Send {
            let result = if self.offline {
                Err(ApiError::Other("upstream offline".into()))
            } else {
                Ok(self.matches.clone())
            };
            std::future::ready(result)
        }

        fn match_players(
            &self,
            match_id: &str,
        ) -> impl Future<Output = ApiResult<Vec<RawPlayer>>> + Send {
            let result = self
                .details
                .get(match_id)
                .cloned()
                .ok_or_else(|| ApiError::Status(format!("no detail for {match_id}")));
            std::future::ready(result)
        }
    }

    pub fn raw_match(id: &str, placement: u32) -> RawMatch {
        RawMatch {
            match_id: Some(id.into()),
            utc_start_seconds: Some(1_650_000_000),
            utc_end_seconds: Some(1_650_001_500),
            map: Some("mp_don4".into()),
            mode: Some("br_brquads".into()),
            player: Some(RawPlayerInfo {
                team: Some(TEAM.into()),
                username: Some("bglowniak".into()),
            }),
            player_stats: Some(RawPlayerStats {
                team_placement: Some(f64::from(placement)),
                ..Default::default()
            }),
        }
    }

    pub fn player(username: &str, team: &str, kills: u32, deaths: u32, damage: u32) -> RawPlayer {
        RawPlayer {
            player: Some(RawPlayerInfo {
                team: Some(team.into()),
                username: Some(username.into()),
            }),
            player_stats: Some(RawPlayerStats {
                kills: Some(f64::from(kills)),
                deaths: Some(f64::from(deaths)),
                damage_done: Some(f64::from(damage)),
                damage_taken: Some(1000.0),
                headshots: Some(1.0),
                assists: Some(2.0),
                team_placement: None,
            }),
        }
    }
}
