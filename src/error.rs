use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(gradesync::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(gradesync::config))]
    Config(String),

    #[error("Browser error: {0}")]
    #[diagnostic(code(gradesync::browser))]
    Browser(String),

    #[error("Scrape error: {0}")]
    #[diagnostic(code(gradesync::scrape))]
    Scrape(String),

    #[error("Could not parse date: {0}")]
    #[diagnostic(code(gradesync::due_parse))]
    DueParse(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(gradesync::google_calendar))]
    GoogleCalendar(String),

    #[error("OAuth error: {0}")]
    #[diagnostic(
        code(gradesync::oauth),
        help("Run `get_calendar_token` to authorize access to Google Calendar")
    )]
    OAuth(String),

    #[error(transparent)]
    #[diagnostic(code(gradesync::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gradesync::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(gradesync::other))]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<fantoccini::error::CmdError> for Error {
    fn from(err: fantoccini::error::CmdError) -> Self {
        Error::Browser(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for Error {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        Error::Browser(format!("Failed to start WebDriver session: {}", err))
    }
}

/// Type alias for Result with our Error type
pub type SyncResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create browser errors
pub fn browser_error(message: &str) -> Error {
    Error::Browser(message.to_string())
}

/// Helper to create per-row scrape errors
pub fn scrape_error(message: &str) -> Error {
    Error::Scrape(message.to_string())
}

/// Helper to create due-date parse errors
pub fn parse_error(due_text: &str) -> Error {
    Error::DueParse(due_text.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create OAuth errors
pub fn oauth_error(message: &str) -> Error {
    Error::OAuth(message.to_string())
}
