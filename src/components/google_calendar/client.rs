use super::models::{ApiEvent, ApiEventList, CalendarEvent, CalendarInfo, NewEvent};
use super::CalendarService;
use crate::error::{google_calendar_error, SyncResult};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, Response};
use serde_json::json;
use tracing::debug;
use url::Url;

/// Base URL of the Calendar v3 REST API
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Authenticated Google Calendar v3 client
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl GoogleCalendarClient {
    /// Create a client against the public API
    pub fn new(access_token: &str) -> SyncResult<Self> {
        Self::with_base_url(GOOGLE_CALENDAR_API_BASE, access_token)
    }

    /// Create a client against another base URL
    pub fn with_base_url(base_url: &str, access_token: &str) -> SyncResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

        Ok(Self {
            client: Client::new(),
            base_url,
            access_token: access_token.to_string(),
        })
    }

    /// `{base}/calendars/{id}[/events]` with the calendar ID percent-encoded
    fn calendar_url(&self, calendar_id: &str, events: bool) -> SyncResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| google_calendar_error("Base URL cannot have path segments"))?;
            segments.pop_if_empty().push("calendars").push(calendar_id);
            if events {
                segments.push("events");
            }
        }
        Ok(url)
    }

    async fn check(response: Response, action: &str) -> SyncResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        Err(google_calendar_error(&format!(
            "Failed to {}: HTTP {} - {}",
            action, status, error_body
        )))
    }
}

#[async_trait]
impl CalendarService for GoogleCalendarClient {
    async fn calendar_info(&self, calendar_id: &str) -> SyncResult<CalendarInfo> {
        let url = self.calendar_url(calendar_id, false)?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch calendar: {}", e)))?;
        let response = Self::check(response, "fetch calendar").await?;

        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse calendar response: {}", e)))
    }

    async fn find_by_private_property(
        &self,
        calendar_id: &str,
        key: &str,
        value: &str,
    ) -> SyncResult<Option<CalendarEvent>> {
        let mut url = self.calendar_url(calendar_id, true)?;
        url.query_pairs_mut()
            .append_pair("privateExtendedProperty", &format!("{}={}", key, value))
            .append_pair("singleEvents", "true")
            .append_pair("maxResults", "1");

        debug!("Looking up event with {}={}", key, value);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;
        let response = Self::check(response, "fetch events").await?;

        let list: ApiEventList = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))?;

        Ok(list.items.into_iter().next().map(CalendarEvent::from))
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> SyncResult<CalendarEvent> {
        let url = self.calendar_url(calendar_id, true)?;

        let mut body = json!({
            "summary": event.summary,
            "description": event.description,
            "start": { "dateTime": event.start.to_rfc3339_opts(SecondsFormat::Secs, false) },
            "end": { "dateTime": event.end.to_rfc3339_opts(SecondsFormat::Secs, false) },
        });
        if !event.private_properties.is_empty() {
            body["extendedProperties"] = json!({ "private": event.private_properties });
        }

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to insert event: {}", e)))?;
        let response = Self::check(response, "insert event").await?;

        let created: ApiEvent = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse insert response: {}", e)))?;

        Ok(created.into())
    }
}
