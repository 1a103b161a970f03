//! Call of Duty papi-client wire types, deserialized as-is from responses.
//! These map to our clean domain types via the mapping functions in client.rs.
//!
//! Every field is optional: the upstream schema drifts between titles and
//! seasons, and a missing field must surface as a skippable error rather than
//! a failed deserialization of the whole batch.
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Envelope<T> {
    pub status: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

// ---------------------------------------------------------------------------
// Recent matches  (gamer/{username}/matches/wz/start/0/end/0/details)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MatchesData {
    pub matches: Option<Vec<RawMatch>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawMatch {
    #[serde(rename = "matchID")]
    pub match_id: Option<String>,
    pub utc_start_seconds: Option<i64>,
    pub utc_end_seconds: Option<i64>,
    pub map: Option<String>,
    pub mode: Option<String>,
    pub player: Option<RawPlayerInfo>,
    pub player_stats: Option<RawPlayerStats>,
}

// ---------------------------------------------------------------------------
// Match detail  (fullMatch/wz/{match_id}/en)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetailData {
    pub all_players: Option<Vec<RawPlayer>>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayer {
    pub player: Option<RawPlayerInfo>,
    pub player_stats: Option<RawPlayerStats>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct RawPlayerInfo {
    pub team: Option<String>,
    pub username: Option<String>,
}

/// The API reports counters as floats ("kills": 12.0).
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawPlayerStats {
    pub kills: Option<f64>,
    pub deaths: Option<f64>,
    pub damage_done: Option<f64>,
    pub damage_taken: Option<f64>,
    pub headshots: Option<f64>,
    pub assists: Option<f64>,
    pub team_placement: Option<f64>,
}
