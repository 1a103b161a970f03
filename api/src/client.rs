use crate::cod::{Envelope, MatchDetailData, MatchesData, RawMatch, RawPlayer, RawPlayerStats};
use crate::{MatchSummary, PlayerMatchStats, TeamStats};
use chrono::DateTime;
use log::{debug, warn};
use reqwest::cookie::Jar;
use reqwest::{Client, StatusCode, Url};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

const PAPI_CLIENT: &str = "https://my.callofduty.com/api/papi-client/";
const PROFILE_LOGIN: &str = "https://profile.callofduty.com/cod/login";
const COOKIE_DOMAIN: &str = ".callofduty.com";
// requests stall without a browser-looking agent
const USER_AGENT: &str = "Chrome/104.0.0.0";

/// How often and how far apart to retry establishing the upstream session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthPolicy {
    pub attempts: u32,
    pub spacing: Duration,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self { attempts: 3, spacing: Duration::from_secs(5) }
    }
}

/// Warzone stats client backed by the Call of Duty papi-client endpoints.
///
/// Authentication is cookie based: `atkn` and `ACT_SSO_COOKIE` are lifted from
/// a logged-in browser session and handed in at construction.
#[derive(Debug, Clone)]
pub struct WarzoneApi {
    client: Client,
    base_url: String,
    login_url: String,
    timeout: Duration,
    auth: AuthPolicy,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Api(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// HTTP 200 but the envelope did not report success.
    Status(String),
    Unauthorized(String),
    /// An expected field is missing from the payload.
    Schema(String),
    Other(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Api(e, url) => write!(f, "API error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Status(msg) => write!(f, "Unsuccessful response: {msg}"),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            ApiError::Schema(msg) => write!(f, "Unexpected payload: {msg}"),
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl WarzoneApi {
    pub fn new(atkn: &str, sso: &str, timeout: Duration) -> ApiResult<Self> {
        let jar = Jar::default();
        let cookie_url = Url::parse(PAPI_CLIENT).map_err(|e| ApiError::Other(e.to_string()))?;
        for (name, value) in [("atkn", atkn), ("ACT_SSO_COOKIE", sso)] {
            jar.add_cookie_str(
                &format!("{name}={value}; Domain={COOKIE_DOMAIN}; Path=/"),
                &cookie_url,
            );
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_provider(Arc::new(jar))
            .build()
            .map_err(|e| ApiError::Other(format!("could not build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: PAPI_CLIENT.to_owned(),
            login_url: PROFILE_LOGIN.to_owned(),
            timeout,
            auth: AuthPolicy::default(),
        })
    }

    /// Point the client at different hosts (local mocks, proxies).
    pub fn with_endpoints(mut self, base_url: impl Into<String>, login_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.login_url = login_url.into();
        self
    }

    pub fn with_auth_policy(mut self, auth: AuthPolicy) -> Self {
        self.auth = auth;
        self
    }

    /// Visit the profile login page so the server sets its XSRF cookie.
    ///
    /// Retried according to the configured [`AuthPolicy`].
    pub async fn authenticate(&self) -> ApiResult<()> {
        let attempts = self.auth.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.login_once().await {
                Ok(()) => {
                    debug!("upstream session established on attempt {attempt}");
                    return Ok(());
                }
                Err(e) => {
                    warn!("authentication attempt {attempt}/{attempts} failed: {e}");
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(self.auth.spacing).await;
                    }
                }
            }
        }

        Err(ApiError::Unauthorized(format!(
            "gave up after {attempts} attempts: {last_error}"
        )))
    }

    /// Warzone matches played by `username` in roughly the last week, newest first.
    ///
    /// The start/end window in the path is ignored by the server.
    pub async fn recent_matches(&self, username: &str) -> ApiResult<Vec<RawMatch>> {
        let url = self.endpoint(&[
            "crm", "cod", "v2", "title", "mw", "platform", "uno", "gamer", username, "matches",
            "wz", "start", "0", "end", "0", "details",
        ])?;
        let data: MatchesData = self.get(url).await?;
        data.matches
            .ok_or_else(|| ApiError::Schema("matches list missing from response".into()))
    }

    /// Stat blocks for every participant of one match.
    pub async fn match_players(&self, match_id: &str) -> ApiResult<Vec<RawPlayer>> {
        let url = self.endpoint(&[
            "crm", "cod", "v2", "title", "mw", "platform", "uno", "fullMatch", "wz", match_id, "en",
        ])?;
        let data: MatchDetailData = self.get(url).await?;
        data.all_players
            .ok_or_else(|| ApiError::Schema(format!("allPlayers missing for match {match_id}")))
    }

    async fn login_once(&self) -> ApiResult<()> {
        self.client
            .get(&self.login_url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, self.login_url.clone()))?
            .error_for_status()
            .map_err(|e| ApiError::Api(e, self.login_url.clone()))?;
        Ok(())
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Other(format!("invalid base url {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Other(format!("base url {} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> ApiResult<T> {
        let url_str = url.to_string();
        debug!("GET {url_str}");
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url_str.clone()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized(format!("{url_str} responded with {status}")));
        }

        let envelope = response
            .error_for_status()
            .map_err(|e| ApiError::Api(e, url_str.clone()))?
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ApiError::Parsing(e, url_str.clone()))?;

        if !envelope.is_success() {
            return Err(ApiError::Status(format!(
                "{url_str} responded with status {:?}",
                envelope.status
            )));
        }

        envelope
            .data
            .ok_or_else(|| ApiError::Schema(format!("{url_str} responded without data")))
    }
}

// ---------------------------------------------------------------------------
// Mapping: papi-client wire types → clean domain types
// ---------------------------------------------------------------------------

/// Normalize one entry of the recent-matches list.
pub fn summarize_match(raw: &RawMatch) -> ApiResult<MatchSummary> {
    let match_id = required(raw.match_id.clone(), "matchID")?;
    let stats = required(raw.player_stats.as_ref(), "playerStats")?;
    let placement = required(stats.team_placement, "playerStats.teamPlacement")?;
    let team = required(
        raw.player.as_ref().and_then(|p| p.team.clone()),
        "player.team",
    )?;
    let start = required(raw.utc_start_seconds, "utcStartSeconds")?;
    let end = required(raw.utc_end_seconds, "utcEndSeconds")?;
    let map = required(raw.map.clone(), "map")?;
    let start_time = DateTime::from_timestamp(start, 0)
        .ok_or_else(|| ApiError::Schema(format!("utcStartSeconds {start} out of range")))?;

    Ok(MatchSummary {
        match_id,
        placement: counter(placement),
        team,
        duration_minutes: round2((end - start) as f64 / 60.0),
        map,
        start_time,
        utc_start_seconds: start,
    })
}

/// Stat blocks of every player that shared `team` in the match.
///
/// Opponents are ignored, but any participant without a team or any teammate
/// with an incomplete stat block fails the whole match.
pub fn team_stats(team: &str, players: &[RawPlayer]) -> ApiResult<TeamStats> {
    let mut teammates = TeamStats::new();
    for raw in players {
        let info = required(raw.player.as_ref(), "player")?;
        let player_team = required(info.team.as_deref(), "player.team")?;
        if player_team != team {
            continue;
        }
        let username = required(info.username.clone(), "player.username")?;
        let stats = required(raw.player_stats.as_ref(), "playerStats")
            .and_then(map_player_stats)
            .map_err(|e| ApiError::Schema(format!("{username}: {e}")))?;
        teammates.insert(username, stats);
    }
    Ok(teammates)
}

fn map_player_stats(raw: &RawPlayerStats) -> ApiResult<PlayerMatchStats> {
    Ok(PlayerMatchStats {
        kills: counter(required(raw.kills, "kills")?),
        deaths: counter(required(raw.deaths, "deaths")?),
        damage: counter(required(raw.damage_done, "damageDone")?),
        damage_taken: counter(required(raw.damage_taken, "damageTaken")?),
        headshots: counter(required(raw.headshots, "headshots")?),
        assists: counter(required(raw.assists, "assists")?),
    })
}

fn required<T>(value: Option<T>, field: &str) -> ApiResult<T> {
    value.ok_or_else(|| ApiError::Schema(format!("missing field `{field}`")))
}

fn counter(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
