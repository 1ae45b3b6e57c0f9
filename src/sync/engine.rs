use super::key::make_key;
use crate::components::google_calendar::{CalendarEvent, CalendarService, NewEvent};
use crate::components::gradescope::AssignmentRecord;
use crate::config::Config;
use crate::error::SyncResult;
use crate::utils::time::{current_year, parse_due};
use chrono::Duration;
use chrono_tz::Tz;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

/// Private extended property holding the sync key
pub const SYNC_PROPERTY_KEY: &str = "gsyncId";

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Created {}, skipped {}, failed {}.",
            self.created, self.skipped, self.failed
        )
    }
}

/// Result of syncing one assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Created(CalendarEvent),
    /// An event with the same sync key already exists
    Skipped,
}

/// Creates one calendar event per assignment, skipping ones already synced
pub struct Synchronizer<'a> {
    calendar: &'a dyn CalendarService,
    calendar_id: String,
    course: String,
    timezone: Tz,
    duration: Duration,
    year: i32,
}

impl<'a> Synchronizer<'a> {
    pub fn new(
        calendar: &'a dyn CalendarService,
        calendar_id: &str,
        course: &str,
        timezone: Tz,
        duration: Duration,
    ) -> Self {
        Self {
            calendar,
            calendar_id: calendar_id.to_string(),
            course: course.to_string(),
            timezone,
            duration,
            year: current_year(timezone),
        }
    }

    pub fn from_config(calendar: &'a dyn CalendarService, config: &Config) -> Self {
        Self::new(
            calendar,
            &config.calendar_id,
            &config.course_name,
            config.timezone,
            config.event_duration(),
        )
    }

    /// Use a fixed year for due texts instead of the current one
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    /// Event title shown in the calendar
    pub fn event_title(&self, assignment: &AssignmentRecord) -> String {
        format!("{}: {} (Due)", self.course, assignment.title)
    }

    /// Build the event for an assignment together with its sync key
    pub fn build_event(&self, assignment: &AssignmentRecord) -> SyncResult<(String, NewEvent)> {
        let due = parse_due(&assignment.due_text, self.timezone, self.year)?;
        let key = make_key(&self.course, &assignment.title, &due);

        let mut description = format!("Gradescope due: {}", assignment.due_text);
        if let Some(link) = &assignment.link {
            description.push('\n');
            description.push_str(link);
        }

        let event = NewEvent {
            summary: self.event_title(assignment),
            description,
            start: due,
            end: due + self.duration,
            private_properties: HashMap::from([(SYNC_PROPERTY_KEY.to_string(), key.clone())]),
        };
        Ok((key, event))
    }

    /// Sync a single assignment
    pub async fn sync_one(&self, assignment: &AssignmentRecord) -> SyncResult<SyncOutcome> {
        let (key, event) = self.build_event(assignment)?;

        let existing = self
            .calendar
            .find_by_private_property(&self.calendar_id, SYNC_PROPERTY_KEY, &key)
            .await?;
        if existing.is_some() {
            info!("↩️  Skip exists: {} @ {}", event.summary, event.start);
            return Ok(SyncOutcome::Skipped);
        }

        let created = self.calendar.insert_event(&self.calendar_id, &event).await?;
        info!(
            "✅ Created: {} @ {} → {}",
            event.summary,
            event.start,
            created.html_link.as_deref().unwrap_or("-")
        );
        Ok(SyncOutcome::Created(created))
    }

    /// Sync every assignment in order; failures are counted, never fatal
    pub async fn run(&self, assignments: &[AssignmentRecord]) -> SyncSummary {
        let mut summary = SyncSummary::default();

        for assignment in assignments {
            match self.sync_one(assignment).await {
                Ok(SyncOutcome::Created(_)) => summary.created += 1,
                Ok(SyncOutcome::Skipped) => summary.skipped += 1,
                Err(e) => {
                    warn!(
                        "⚠️  Failed on {} ({}): {}",
                        assignment.title, assignment.due_text, e
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
