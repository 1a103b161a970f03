pub mod client;
pub mod cod;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub use client::{ApiError, ApiResult, AuthPolicy, WarzoneApi};

// ---------------------------------------------------------------------------
// Domain types: the clean model, independent of the papi-client wire format
// ---------------------------------------------------------------------------

/// Per-match metadata for one match the session owner played.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub match_id: String,
    /// Final team ranking; 1 is a win.
    pub placement: u32,
    /// Team identifier the session owner played on in this match.
    pub team: String,
    /// Rounded to 2 decimal places.
    pub duration_minutes: f64,
    /// Raw map id, e.g. "mp_don4".
    pub map: String,
    pub start_time: DateTime<Utc>,
    pub utc_start_seconds: i64,
}

impl MatchSummary {
    pub fn is_win(&self) -> bool {
        self.placement == 1
    }
}

/// One player's stat block for a single match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerMatchStats {
    pub kills: u32,
    pub deaths: u32,
    pub damage: u32,
    pub damage_taken: u32,
    pub headshots: u32,
    pub assists: u32,
}

/// Teammates' stat blocks for one match, keyed by username.
pub type TeamStats = BTreeMap<String, PlayerMatchStats>;
