use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::collections::HashMap;

/// Simplified calendar event representation
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub html_link: Option<String>,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
    /// Private extended properties attached at creation
    pub private_properties: HashMap<String, String>,
}

/// Calendar metadata
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarInfo {
    pub id: String,
    pub summary: Option<String>,
    pub time_zone: Option<String>,
}

/// Event to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    /// Private extended properties, e.g. the sync key
    pub private_properties: HashMap<String, String>,
}

/// Event as returned by the Calendar v3 API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEvent {
    #[serde(default)]
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub html_link: Option<String>,
    pub start: Option<ApiEventTime>,
    pub end: Option<ApiEventTime>,
    pub extended_properties: Option<ApiExtendedProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiEventTime {
    pub date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiExtendedProperties {
    #[serde(default)]
    pub private: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiEventList {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

impl From<ApiEvent> for CalendarEvent {
    fn from(event: ApiEvent) -> Self {
        CalendarEvent {
            id: event.id,
            summary: event.summary,
            description: event.description,
            html_link: event.html_link,
            start_date_time: event.start.and_then(|s| s.date_time),
            end_date_time: event.end.and_then(|e| e.date_time),
            private_properties: event
                .extended_properties
                .map(|p| p.private)
                .unwrap_or_default(),
        }
    }
}
