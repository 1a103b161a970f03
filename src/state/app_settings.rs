use crate::state::poller::DEFAULT_HIGH_KILL_THRESHOLD;
use anyhow::{Context, Result, anyhow};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use warzone_api::AuthPolicy;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 480;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct AppSettings {
    pub discord_token: String,
    pub cod_username: String,
    pub atkn: String,
    pub sso: String,
    pub control_channel: u64,
    announce_channel: u64,
    debug_channel: Option<u64>,
    pub debug: bool,
    pub salute_directory: Option<PathBuf>,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub auth_policy: AuthPolicy,
    pub initial_match_id: Option<String>,
    pub high_kill_threshold: u32,
    pub log_level: String,
}

impl AppSettings {
    /// Settings from the process environment, after loading a `.env` file if present.
    pub fn load() -> Result<Self> {
        // A missing .env is normal in deployment.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let required = |key: &str| optional(key).ok_or_else(|| anyhow!("{key} must be set"));

        let default_policy = AuthPolicy::default();
        let auth_policy = AuthPolicy {
            attempts: parse_or(optional("AUTH_RETRY_ATTEMPTS"), "AUTH_RETRY_ATTEMPTS", default_policy.attempts)?,
            spacing: Duration::from_secs(parse_or(
                optional("AUTH_RETRY_SPACING_SECS"),
                "AUTH_RETRY_SPACING_SECS",
                default_policy.spacing.as_secs(),
            )?),
        };

        let poll_secs: u64 = parse_or(optional("POLL_INTERVAL_SECS"), "POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)?;
        if poll_secs == 0 {
            return Err(anyhow!("POLL_INTERVAL_SECS must be positive"));
        }

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            cod_username: required("COD_USERNAME")?,
            atkn: required("ATKN")?,
            sso: required("ACT_SSO_COOKIE")?,
            control_channel: channel_id(required("CONTROL_CHANNEL_ID")?, "CONTROL_CHANNEL_ID")?,
            announce_channel: channel_id(required("ANNOUNCE_CHANNEL_ID")?, "ANNOUNCE_CHANNEL_ID")?,
            debug_channel: optional("DEBUG_CHANNEL_ID")
                .map(|v| channel_id(v, "DEBUG_CHANNEL_ID"))
                .transpose()?,
            debug: optional("LUMBERBOT_DEBUG").is_some_and(|v| is_truthy(&v)),
            salute_directory: optional("SALUTE_DIRECTORY").map(PathBuf::from),
            poll_interval: Duration::from_secs(poll_secs),
            http_timeout: Duration::from_secs(parse_or(
                optional("HTTP_TIMEOUT_SECS"),
                "HTTP_TIMEOUT_SECS",
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
            auth_policy,
            initial_match_id: optional("INITIAL_MATCH_ID"),
            high_kill_threshold: parse_or(
                optional("HIGH_KILL_THRESHOLD"),
                "HIGH_KILL_THRESHOLD",
                DEFAULT_HIGH_KILL_THRESHOLD,
            )?,
            log_level: optional("LUMBERBOT_LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.into()),
        })
    }

    /// Where wins and big games are posted. Debug mode keeps them out of the squad channel.
    pub fn announce_channel(&self) -> u64 {
        if self.debug {
            self.debug_channel.unwrap_or(self.control_channel)
        } else {
            self.announce_channel
        }
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw.parse().with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}

fn channel_id(raw: String, key: &str) -> Result<u64> {
    let id: u64 = raw.parse().with_context(|| format!("{key} is not a channel id: {raw}"))?;
    if id == 0 {
        return Err(anyhow!("{key} cannot be 0"));
    }
    Ok(id)
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DISCORD_TOKEN", "token"),
            ("COD_USERNAME", "bglowniak"),
            ("ATKN", "atkn"),
            ("ACT_SSO_COOKIE", "sso"),
            ("CONTROL_CHANNEL_ID", "111"),
            ("ANNOUNCE_CHANNEL_ID", "222"),
        ])
    }

    fn settings(vars: &HashMap<&str, &str>) -> Result<AppSettings> {
        AppSettings::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_fill_in_optional_values() {
        let settings = settings(&base()).unwrap();
        assert_eq!(settings.poll_interval, Duration::from_secs(480));
        assert_eq!(settings.http_timeout, Duration::from_secs(10));
        assert_eq!(settings.auth_policy, AuthPolicy::default());
        assert_eq!(settings.high_kill_threshold, 10);
        assert_eq!(settings.initial_match_id, None);
        assert_eq!(settings.log_level, "info");
        assert!(!settings.debug);
        assert!(settings.salute_directory.is_none());
        assert_eq!(settings.announce_channel(), 222);
    }

    #[test]
    fn missing_required_value_is_named() {
        let mut vars = base();
        vars.remove("ATKN");
        let err = settings(&vars).unwrap_err();
        assert!(err.to_string().contains("ATKN"), "{err}");

        let mut blank = base();
        blank.insert("DISCORD_TOKEN", "   ");
        assert!(settings(&blank).is_err());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let mut vars = base();
        vars.insert("POLL_INTERVAL_SECS", "soon");
        let err = settings(&vars).unwrap_err();
        assert!(err.to_string().contains("POLL_INTERVAL_SECS"), "{err}");

        let mut zero = base();
        zero.insert("CONTROL_CHANNEL_ID", "0");
        assert!(settings(&zero).is_err());
    }

    #[test]
    fn debug_mode_redirects_announcements() {
        let mut vars = base();
        vars.insert("LUMBERBOT_DEBUG", "true");
        assert_eq!(settings(&vars).unwrap().announce_channel(), 111);

        vars.insert("DEBUG_CHANNEL_ID", "333");
        assert_eq!(settings(&vars).unwrap().announce_channel(), 333);

        vars.insert("LUMBERBOT_DEBUG", "0");
        assert_eq!(settings(&vars).unwrap().announce_channel(), 222);
    }

    #[test]
    fn overrides_are_parsed() {
        let mut vars = base();
        vars.insert("POLL_INTERVAL_SECS", "60");
        vars.insert("AUTH_RETRY_ATTEMPTS", "5");
        vars.insert("AUTH_RETRY_SPACING_SECS", "1");
        vars.insert("INITIAL_MATCH_ID", "12195181859429414966");
        vars.insert("HIGH_KILL_THRESHOLD", "15");
        vars.insert("SALUTE_DIRECTORY", "./salutes");

        let settings = settings(&vars).unwrap();
        assert_eq!(settings.poll_interval, Duration::from_secs(60));
        assert_eq!(settings.auth_policy.attempts, 5);
        assert_eq!(settings.auth_policy.spacing, Duration::from_secs(1));
        assert_eq!(settings.initial_match_id.as_deref(), Some("12195181859429414966"));
        assert_eq!(settings.high_kill_threshold, 15);
        assert_eq!(settings.salute_directory, Some(PathBuf::from("./salutes")));
    }
}
