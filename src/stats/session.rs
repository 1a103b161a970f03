use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use warzone_api::PlayerMatchStats;

// ---------------------------------------------------------------------------
// Per-player running totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub kills: u64,
    pub deaths: u64,
    pub damage: u64,
    pub damage_taken: u64,
    pub headshots: u64,
    pub assists: u64,
    /// Matches this player appeared in. Can trail the team count when someone
    /// joins late or leaves early.
    pub individual_matches: u32,
    pub max_kills: u32,
    pub max_deaths: u32,
}

impl PlayerStats {
    fn absorb(&mut self, stats: &PlayerMatchStats) {
        self.kills += u64::from(stats.kills);
        self.deaths += u64::from(stats.deaths);
        self.damage += u64::from(stats.damage);
        self.damage_taken += u64::from(stats.damage_taken);
        self.headshots += u64::from(stats.headshots);
        self.assists += u64::from(stats.assists);
        self.individual_matches += 1;
        self.max_kills = self.max_kills.max(stats.kills);
        self.max_deaths = self.max_deaths.max(stats.deaths);
    }
}

// ---------------------------------------------------------------------------
// Session accumulator
// ---------------------------------------------------------------------------

/// Everything accumulated between a session start and its end.
///
/// Counters only ever grow; the only way back to zero is [`SessionStats::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionStats {
    wins: u32,
    matches: u32,
    team_placements: u64,
    session_start: Option<DateTime<Local>>,
    players: BTreeMap<String, PlayerStats>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: DateTime<Local>) {
        self.session_start = Some(now);
    }

    /// Count one processed match, whether or not per-player data was available.
    pub fn record_match(&mut self, placement: u32) {
        self.matches += 1;
        self.team_placements += u64::from(placement);
    }

    pub fn record_player_stats(&mut self, player_id: &str, stats: &PlayerMatchStats) {
        self.players
            .entry(player_id.to_owned())
            .or_default()
            .absorb(stats);
    }

    pub fn record_win(&mut self) {
        self.wins += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn win_count(&self) -> u32 {
        self.wins
    }

    pub fn match_count(&self) -> u32 {
        self.matches
    }

    pub fn team_placements(&self) -> u64 {
        self.team_placements
    }

    pub fn session_start(&self) -> Option<DateTime<Local>> {
        self.session_start
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &str> {
        self.players.keys().map(String::as_str)
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerStats> {
        self.players.get(player_id)
    }

    /// Players in id order.
    pub fn players(&self) -> impl Iterator<Item = (&str, &PlayerStats)> {
        self.players.iter().map(|(id, stats)| (id.as_str(), stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn line(kills: u32, deaths: u32, damage: u32) -> PlayerMatchStats {
        PlayerMatchStats {
            kills,
            deaths,
            damage,
            damage_taken: damage / 2,
            headshots: kills / 2,
            assists: 1,
        }
    }

    #[test]
    fn first_sighting_starts_from_zero() {
        let mut session = SessionStats::new();
        session.record_player_stats("bglowniak", &line(3, 2, 900));
        let player = session.player("bglowniak").unwrap();
        assert_eq!(player.kills, 3);
        assert_eq!(player.deaths, 2);
        assert_eq!(player.damage, 900);
        assert_eq!(player.damage_taken, 450);
        assert_eq!(player.headshots, 1);
        assert_eq!(player.assists, 1);
        assert_eq!(player.individual_matches, 1);
    }

    #[test]
    fn totals_are_sums_over_every_call() {
        let lines = [line(4, 1, 1200), line(0, 3, 300), line(9, 2, 2500), line(2, 2, 700)];
        let mut session = SessionStats::new();
        for l in &lines {
            session.record_player_stats("triplexlink", l);
        }

        let player = session.player("triplexlink").unwrap();
        assert_eq!(player.individual_matches as usize, lines.len());
        assert_eq!(player.kills, lines.iter().map(|l| u64::from(l.kills)).sum::<u64>());
        assert_eq!(player.deaths, lines.iter().map(|l| u64::from(l.deaths)).sum::<u64>());
        assert_eq!(player.damage, lines.iter().map(|l| u64::from(l.damage)).sum::<u64>());
        assert_eq!(
            player.damage_taken,
            lines.iter().map(|l| u64::from(l.damage_taken)).sum::<u64>()
        );
        assert_eq!(player.headshots, lines.iter().map(|l| u64::from(l.headshots)).sum::<u64>());
        assert_eq!(player.assists, 4);
    }

    #[test]
    fn maxima_track_running_max_and_never_drop() {
        let lines = [line(4, 1, 0), line(11, 0, 0), line(2, 6, 0), line(7, 3, 0)];
        let mut session = SessionStats::new();
        let mut previous = (0, 0);
        for (i, l) in lines.iter().enumerate() {
            session.record_player_stats("bglowniak", l);
            let player = session.player("bglowniak").unwrap();
            let expected_kills = lines[..=i].iter().map(|l| l.kills).max().unwrap();
            let expected_deaths = lines[..=i].iter().map(|l| l.deaths).max().unwrap();
            assert_eq!(player.max_kills, expected_kills);
            assert_eq!(player.max_deaths, expected_deaths);
            assert!(player.max_kills >= previous.0 && player.max_deaths >= previous.1);
            previous = (player.max_kills, player.max_deaths);
        }
        assert_eq!(previous, (11, 6));
    }

    #[test]
    fn record_match_counts_and_sums_placements() {
        let mut session = SessionStats::new();
        session.record_match(1);
        session.record_match(14);
        assert_eq!(session.match_count(), 2);
        assert_eq!(session.team_placements(), 15);
        assert_eq!(session.win_count(), 0);
        session.record_win();
        assert_eq!(session.win_count(), 1);
    }

    #[test]
    fn player_ids_lists_each_player_once() {
        let mut session = SessionStats::new();
        session.record_player_stats("triplexlink", &line(1, 1, 1));
        session.record_player_stats("bglowniak", &line(1, 1, 1));
        session.record_player_stats("triplexlink", &line(1, 1, 1));
        assert_eq!(session.player_ids().collect::<Vec<_>>(), vec!["bglowniak", "triplexlink"]);
    }

    #[test]
    fn reset_discards_everything() {
        let mut session = SessionStats::new();
        session.start(Local.with_ymd_and_hms(2022, 4, 15, 20, 0, 0).unwrap());
        session.record_match(3);
        session.record_win();
        session.record_player_stats("bglowniak", &line(5, 5, 5));

        session.reset();
        assert_eq!(session, SessionStats::new());
        assert!(session.session_start().is_none());
        assert_eq!(session.player_ids().count(), 0);
    }
}
