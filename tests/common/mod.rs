#![allow(dead_code)]

use async_trait::async_trait;
use gradesync::components::google_calendar::{CalendarEvent, CalendarInfo, CalendarService, NewEvent};
use gradesync::components::gradescope::{AssignmentRecord, CourseSession, RowSnapshot};
use gradesync::error::{browser_error, google_calendar_error, SyncResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory calendar standing in for Google Calendar
#[derive(Debug, Default)]
pub struct MockCalendar {
    events: Mutex<Vec<CalendarEvent>>,
    /// Inserts of events with this summary fail
    fail_summary: Option<String>,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(summary: &str) -> Self {
        Self {
            fail_summary: Some(summary.to_string()),
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarService for MockCalendar {
    async fn calendar_info(&self, calendar_id: &str) -> SyncResult<CalendarInfo> {
        Ok(CalendarInfo {
            id: calendar_id.to_string(),
            summary: Some("Gradescope".to_string()),
            time_zone: Some("America/Los_Angeles".to_string()),
        })
    }

    async fn find_by_private_property(
        &self,
        _calendar_id: &str,
        key: &str,
        value: &str,
    ) -> SyncResult<Option<CalendarEvent>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.private_properties.get(key).map(String::as_str) == Some(value))
            .cloned())
    }

    async fn insert_event(&self, _calendar_id: &str, event: &NewEvent) -> SyncResult<CalendarEvent> {
        if self.fail_summary.as_deref() == Some(event.summary.as_str()) {
            return Err(google_calendar_error("Failed to insert event: HTTP 500"));
        }

        let mut events = self.events.lock().unwrap();
        let created = CalendarEvent {
            id: format!("event{}", events.len() + 1),
            summary: Some(event.summary.clone()),
            description: Some(event.description.clone()),
            html_link: Some(format!("https://calendar.example/event{}", events.len() + 1)),
            start_date_time: Some(event.start.to_rfc3339()),
            end_date_time: Some(event.end.to_rfc3339()),
            private_properties: event.private_properties.clone(),
        };
        events.push(created.clone());
        Ok(created)
    }
}

pub fn assignment(title: &str, due_text: &str, link: Option<&str>) -> AssignmentRecord {
    AssignmentRecord {
        title: title.to_string(),
        due_text: due_text.to_string(),
        link: link.map(String::from),
    }
}

/// Scripted course site; records whether the session was closed
#[derive(Debug, Default)]
pub struct MockSession {
    rows: Vec<RowSnapshot>,
    fail_login: bool,
    closed: Arc<AtomicBool>,
}

impl MockSession {
    pub fn with_rows(rows: Vec<RowSnapshot>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn failing_login() -> Self {
        Self {
            fail_login: true,
            ..Default::default()
        }
    }

    /// Flag flipped by `close`, readable after the session is consumed
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }
}

#[async_trait]
impl CourseSession for MockSession {
    async fn login(&self, _email: &str, _password: &str) -> SyncResult<()> {
        if self.fail_login {
            return Err(browser_error("Timed out waiting for email field"));
        }
        Ok(())
    }

    async fn open_course(&self, course_name: &str) -> SyncResult<Option<String>> {
        Ok(Some(format!("https://www.gradescope.com/courses/{}", course_name)))
    }

    async fn read_rows(&self) -> SyncResult<Vec<SyncResult<RowSnapshot>>> {
        Ok(self.rows.iter().cloned().map(Ok).collect())
    }

    async fn close(self) -> SyncResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
