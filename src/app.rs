use crate::state::messages::Announcement;
use crate::state::poller::{MatchSource, Poller};
use crate::stats::report::{awards, player_summary, session_summary};
use crate::stats::session::SessionStats;
use chrono::{DateTime, Local};
use log::info;
use warzone_api::ApiResult;

const NO_MATCHES: &str = "No matches have been played.";

/// Session state shared by every command. Owned by the session worker, so
/// commands and polls never interleave.
pub struct App {
    session: SessionStats,
    /// Stats of the last ended session, restored by `start_wz -c`.
    previous: Option<SessionStats>,
    active: bool,
    poller: Poller,
}

impl App {
    pub fn new(poller: Poller) -> Self {
        Self {
            session: SessionStats::new(),
            previous: None,
            active: false,
            poller,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session(&self) -> &SessionStats {
        &self.session
    }

    pub fn watermark(&self) -> Option<&str> {
        self.poller.watermark()
    }

    // -----------------------------------------------------------------------
    // Command handlers: each returns the chat replies, in order
    // -----------------------------------------------------------------------

    pub fn start_session(&mut self, keep_stats: bool, now: DateTime<Local>) -> Vec<String> {
        if self.active {
            return vec!["There is already an active session.".into()];
        }

        match self.previous.take().filter(|_| keep_stats) {
            Some(previous) => {
                info!("continuing the previous session");
                self.session = previous;
            }
            None => self.session.reset(),
        }
        self.session.start(now);
        self.active = true;
        info!("Warzone session started");

        vec!["Warzone tracker started. Good luck, team.".into()]
    }

    pub fn end_session(&mut self, now: DateTime<Local>) -> Vec<String> {
        if !self.active {
            return vec!["There is currently no active session to end.".into()];
        }
        self.active = false;
        info!("Warzone session ended after {} matches", self.session.match_count());

        let mut replies = Vec::new();
        match session_summary(&self.session, now) {
            Some(summary) => {
                replies.push("Warzone tracker stopped. Good work out there.".into());
                replies.push(summary);
                replies.extend(awards(&self.session));
            }
            None => replies.push("Warzone tracker stopped. No matches were played.".into()),
        }

        self.previous = Some(self.session.clone());
        self.session.reset();
        replies
    }

    pub fn session_stats(&self, now: DateTime<Local>) -> Vec<String> {
        let reply = session_summary(&self.session, now).unwrap_or_else(|| NO_MATCHES.into());
        vec![reply]
    }

    pub fn player_stats(&self, username: Option<&str>) -> Vec<String> {
        let Some(username) = username else {
            return vec!["Usage: !player_stats <username>".into()];
        };
        if self.session.match_count() == 0 {
            return vec![NO_MATCHES.into()];
        }

        let reply = player_summary(&self.session, username).unwrap_or_else(|| {
            format!("{username} has not played any matches. No stats to report.")
        });
        vec![reply]
    }

    pub fn awards(&self) -> Vec<String> {
        if self.session.match_count() == 0 {
            return vec![NO_MATCHES.into()];
        }
        let reply = awards(&self.session)
            .unwrap_or_else(|| "No player stats have been recorded this session.".into());
        vec![reply]
    }

    // -----------------------------------------------------------------------
    // Polling
    // -----------------------------------------------------------------------

    /// Run one poll against `source`. Nothing happens outside a session.
    pub async fn poll<S: MatchSource>(&mut self, source: &S) -> ApiResult<Vec<Announcement>> {
        if !self.active {
            return Ok(Vec::new());
        }
        self.poller.tick(source, &mut self.session).await
    }
}
