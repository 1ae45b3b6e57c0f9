mod client;
pub mod models;
pub mod oauth;
pub mod token;

pub use client::{GoogleCalendarClient, GOOGLE_CALENDAR_API_BASE};
pub use models::{CalendarEvent, CalendarInfo, NewEvent};
pub use oauth::{run_consent_flow, OAuthClientConfig};
pub use token::{StoredToken, TokenManager};

use crate::config::Config;
use crate::error::SyncResult;
use async_trait::async_trait;
use tracing::info;

/// Calendar operations a sync run depends on
#[async_trait]
pub trait CalendarService: Send + Sync {
    /// Fetch calendar metadata
    async fn calendar_info(&self, calendar_id: &str) -> SyncResult<CalendarInfo>;

    /// First event whose private extended property `key` equals `value`
    async fn find_by_private_property(
        &self,
        calendar_id: &str,
        key: &str,
        value: &str,
    ) -> SyncResult<Option<CalendarEvent>>;

    /// Insert a new event and return it as created
    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> SyncResult<CalendarEvent>;
}

/// Build an authenticated client, running the consent flow if no token is usable
pub async fn connect(config: &Config) -> SyncResult<GoogleCalendarClient> {
    let oauth = OAuthClientConfig::from_file(&config.credentials_path)?;
    let token_manager = TokenManager::new(&config.token_path, oauth, config.scopes.clone());

    let token = match token_manager.get_token().await? {
        Some(token) => token,
        None => {
            info!("No usable Google Calendar token, starting authorization");
            run_consent_flow(&token_manager, config.oauth_redirect_port).await?
        }
    };

    GoogleCalendarClient::new(&token.access_token)
}
