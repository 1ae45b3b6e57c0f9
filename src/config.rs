use crate::components::gradescope::FilterPolicy;
use crate::error::{config_error, env_error, SyncResult};
use chrono::Duration;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Course opened when `COURSE_NAME` is not set
pub const DEFAULT_COURSE: &str = "CS70";
/// Zone attached to due dates that carry no explicit offset
pub const DEFAULT_TIMEZONE: &str = "America/Los_Angeles";
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
pub const DEFAULT_GRADESCOPE_URL: &str = "https://www.gradescope.com/";
/// chromedriver listens here unless told otherwise
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Optional file overlaying the keyword filters
const FILTERS_FILE: &str = "config/filters.toml";

/// Runtime configuration for a sync run
#[derive(Debug, Clone)]
pub struct Config {
    /// Course tile to open and prefix for event titles
    pub course_name: String,
    /// Zone used for due dates without an explicit offset
    pub timezone: Tz,
    /// Length of each created event
    pub event_duration_hours: i64,
    /// Google Calendar ID to write into
    pub calendar_id: String,
    /// OAuth scopes requested for the calendar
    pub scopes: Vec<String>,
    /// Gradescope login email
    pub gradescope_email: String,
    /// Gradescope login password
    pub gradescope_password: String,
    /// Landing page of the course site
    pub gradescope_url: String,
    /// WebDriver endpoint (chromedriver)
    pub webdriver_url: String,
    /// Start the browser without a window
    pub headless: bool,
    /// Element wait limit in seconds
    pub wait_timeout_secs: u64,
    /// Title keyword filters
    pub filters: FilterPolicy,
    /// Google OAuth client file
    pub credentials_path: PathBuf,
    /// Persisted OAuth token file
    pub token_path: PathBuf,
    /// Loopback port for the OAuth redirect
    pub oauth_redirect_port: u16,
}

/// Shape of `config/filters.toml`
#[derive(Debug, Default, Deserialize)]
struct FilterFile {
    allow: Option<Vec<String>>,
    deny: Option<Vec<String>>,
    include_attendance: Option<bool>,
}

impl Config {
    /// Load configuration from `.env`, the environment and the filter file
    pub fn load() -> SyncResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;

        if Path::new(FILTERS_FILE).exists() {
            let content = fs::read_to_string(FILTERS_FILE)?;
            config.apply_filter_file(&content)?;
        }

        Ok(config)
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let var_or = |key: &str, default: &str| {
            var(key)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        // Login pair is the only hard requirement
        let gradescope_email = var("GRADESCOPE_EMAIL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| env_error("GRADESCOPE_EMAIL"))?;
        let gradescope_password = var("GRADESCOPE_PASSWORD")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| env_error("GRADESCOPE_PASSWORD"))?;

        let timezone_name = var_or("DEFAULT_TZ", DEFAULT_TIMEZONE);
        let timezone = timezone_name
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", timezone_name)))?;

        let event_duration_hours = var_or("EVENT_DURATION_HOURS", "1")
            .parse::<i64>()
            .ok()
            .filter(|hours| *hours >= 0)
            .ok_or_else(|| config_error("Invalid EVENT_DURATION_HOURS format"))?;

        let wait_timeout_secs = var_or("WAIT_TIMEOUT_SECS", "25")
            .parse::<u64>()
            .map_err(|_| config_error("Invalid WAIT_TIMEOUT_SECS format"))?;

        let oauth_redirect_port = var_or("OAUTH_REDIRECT_PORT", "8080")
            .parse::<u16>()
            .map_err(|_| config_error("Invalid OAUTH_REDIRECT_PORT format"))?;

        let headless = parse_flag(&var_or("HEADLESS", "false"))
            .ok_or_else(|| config_error("Invalid HEADLESS value"))?;
        let include_attendance = parse_flag(&var_or("INCLUDE_ATTENDANCE", "true"))
            .ok_or_else(|| config_error("Invalid INCLUDE_ATTENDANCE value"))?;

        let allow = var("ALLOW_FILTER")
            .map(|v| split_list(&v))
            .filter(|list| !list.is_empty());
        let deny = var("DENY_FILTER").map(|v| split_list(&v)).unwrap_or_default();

        Ok(Config {
            course_name: var_or("COURSE_NAME", DEFAULT_COURSE),
            timezone,
            event_duration_hours,
            calendar_id: var_or("CALENDAR_ID", "primary"),
            scopes: split_list(&var_or("SCOPES", DEFAULT_SCOPE)),
            gradescope_email,
            gradescope_password,
            gradescope_url: var_or("GRADESCOPE_URL", DEFAULT_GRADESCOPE_URL),
            webdriver_url: var_or("WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL),
            headless,
            wait_timeout_secs,
            filters: FilterPolicy {
                allow,
                deny,
                include_attendance,
            },
            credentials_path: PathBuf::from(var_or("GOOGLE_CREDENTIALS_PATH", "credentials.json")),
            token_path: PathBuf::from(var_or("GOOGLE_TOKEN_PATH", "token.json")),
            oauth_redirect_port,
        })
    }

    /// Overlay filter settings from TOML content
    pub fn apply_filter_file(&mut self, content: &str) -> SyncResult<()> {
        let file: FilterFile = toml::from_str(content)?;

        if let Some(allow) = file.allow {
            self.filters.allow = Some(allow).filter(|list| !list.is_empty());
        }
        if let Some(deny) = file.deny {
            self.filters.deny = deny;
        }
        if let Some(include_attendance) = file.include_attendance {
            self.filters.include_attendance = include_attendance;
        }

        Ok(())
    }

    /// Configured event length
    pub fn event_duration(&self) -> Duration {
        Duration::hours(self.event_duration_hours)
    }

    /// Element wait limit
    pub fn wait_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.wait_timeout_secs)
    }
}

/// Split a comma-separated list, dropping blanks
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn credentials() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GRADESCOPE_EMAIL", " student@example.edu "),
            ("GRADESCOPE_PASSWORD", "hunter2"),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&credentials())).unwrap();

        assert_eq!(config.course_name, "CS70");
        assert_eq!(config.timezone, chrono_tz::America::Los_Angeles);
        assert_eq!(config.event_duration_hours, 1);
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.scopes, vec![DEFAULT_SCOPE.to_string()]);
        assert_eq!(config.gradescope_email, "student@example.edu");
        assert_eq!(config.wait_timeout_secs, 25);
        assert!(config.filters.allow.is_none());
        assert!(config.filters.deny.is_empty());
        assert!(config.filters.include_attendance);
        assert!(!config.headless);
    }

    #[test]
    fn test_missing_credentials_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[("GRADESCOPE_EMAIL", "a@b.c")])).unwrap_err();
        assert!(matches!(err, Error::Environment(msg) if msg.contains("GRADESCOPE_PASSWORD")));

        let err = Config::from_lookup(lookup_from(&[
            ("GRADESCOPE_EMAIL", "   "),
            ("GRADESCOPE_PASSWORD", "pw"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Environment(msg) if msg.contains("GRADESCOPE_EMAIL")));
    }

    #[test]
    fn test_lists_and_overrides() {
        let mut pairs = credentials();
        pairs.extend([
            ("SCOPES", "scope.a, scope.b ,"),
            ("ALLOW_FILTER", "homework,project"),
            ("DENY_FILTER", "attendance, mini-vitamin"),
            ("INCLUDE_ATTENDANCE", "false"),
            ("EVENT_DURATION_HOURS", "2"),
            ("DEFAULT_TZ", "Europe/Helsinki"),
        ]);
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.scopes, vec!["scope.a", "scope.b"]);
        assert_eq!(
            config.filters.allow,
            Some(vec!["homework".to_string(), "project".to_string()])
        );
        assert_eq!(config.filters.deny, vec!["attendance", "mini-vitamin"]);
        assert!(!config.filters.include_attendance);
        assert_eq!(config.event_duration(), Duration::hours(2));
        assert_eq!(config.timezone, chrono_tz::Europe::Helsinki);
    }

    #[test]
    fn test_invalid_values() {
        let mut pairs = credentials();
        pairs.push(("DEFAULT_TZ", "Mars/Olympus_Mons"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(Error::Config(_))
        ));

        let mut pairs = credentials();
        pairs.push(("EVENT_DURATION_HOURS", "one"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_filter_file_overlay() {
        let mut config = Config::from_lookup(lookup_from(&credentials())).unwrap();
        config
            .apply_filter_file("allow = [\"hw\"]\ndeny = [\"quiz\"]\ninclude_attendance = false\n")
            .unwrap();

        assert_eq!(config.filters.allow, Some(vec!["hw".to_string()]));
        assert_eq!(config.filters.deny, vec!["quiz"]);
        assert!(!config.filters.include_attendance);

        assert!(config.apply_filter_file("allow = 3").is_err());
    }
}
