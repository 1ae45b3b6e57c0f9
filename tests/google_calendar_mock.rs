mod common;

use chrono::Duration;
use common::{assignment, MockCalendar};
use gradesync::components::gradescope::AssignmentRecord;
use gradesync::sync::{make_key, SyncOutcome, SyncSummary, Synchronizer, SYNC_PROPERTY_KEY};
use gradesync::utils::time::parse_due;

fn synchronizer(calendar: &MockCalendar) -> Synchronizer<'_> {
    Synchronizer::new(
        calendar,
        "primary",
        "CS70",
        chrono_tz::America::Los_Angeles,
        Duration::hours(1),
    )
    .with_year(2024)
}

fn scraped() -> Vec<AssignmentRecord> {
    vec![
        assignment("HW 1", "Oct 04 at 4:00PM", Some("https://www.gradescope.com/courses/1/assignments/11")),
        assignment("HW 2", "Oct 11 at 4:00PM", None),
        assignment("Project 1", "Nov 01 at 11:59PM", None),
    ]
}

/// Second run against the same calendar creates nothing
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let calendar = MockCalendar::new();
    let sync = synchronizer(&calendar);
    let assignments = scraped();

    let first = sync.run(&assignments).await;
    assert_eq!(first, SyncSummary { created: 3, skipped: 0, failed: 0 });

    let second = sync.run(&assignments).await;
    assert_eq!(second, SyncSummary { created: 0, skipped: 3, failed: 0 });
    assert_eq!(calendar.events().len(), 3);
}

/// Created events carry title, times, description and the sync key
#[tokio::test]
async fn test_created_event_shape() {
    let calendar = MockCalendar::new();
    let sync = synchronizer(&calendar);

    let outcome = sync.sync_one(&scraped()[0]).await.unwrap();
    let SyncOutcome::Created(event) = outcome else {
        panic!("expected a created event");
    };

    assert_eq!(event.summary.as_deref(), Some("CS70: HW 1 (Due)"));
    assert_eq!(event.start_date_time.as_deref(), Some("2024-10-04T16:00:00-07:00"));
    assert_eq!(event.end_date_time.as_deref(), Some("2024-10-04T17:00:00-07:00"));
    assert_eq!(
        event.description.as_deref(),
        Some("Gradescope due: Oct 04 at 4:00PM\nhttps://www.gradescope.com/courses/1/assignments/11")
    );

    let due = parse_due("Oct 04 at 4:00PM", chrono_tz::America::Los_Angeles, 2024).unwrap();
    assert_eq!(
        event.private_properties.get(SYNC_PROPERTY_KEY),
        Some(&make_key("CS70", "HW 1", &due))
    );

    let (_, without_link) = sync.build_event(&scraped()[1]).unwrap();
    assert_eq!(without_link.description, "Gradescope due: Oct 11 at 4:00PM");
}

/// One bad due text or failed insert does not stop the batch
#[tokio::test]
async fn test_failures_are_isolated() {
    let calendar = MockCalendar::failing_on("CS70: HW 2 (Due)");
    let sync = synchronizer(&calendar);

    let mut assignments = scraped();
    assignments.insert(1, assignment("Reading Quiz", "Due Oct 04", None));

    let summary = sync.run(&assignments).await;
    assert_eq!(summary, SyncSummary { created: 2, skipped: 0, failed: 2 });

    let titles: Vec<_> = calendar
        .events()
        .into_iter()
        .filter_map(|e| e.summary)
        .collect();
    assert_eq!(titles, vec!["CS70: HW 1 (Due)", "CS70: Project 1 (Due)"]);
}

/// A moved deadline is a new event; the old one stays
#[tokio::test]
async fn test_rescheduled_deadline_adds_event() {
    let calendar = MockCalendar::new();
    let sync = synchronizer(&calendar);

    sync.run(&[assignment("HW 1", "Oct 04 at 4:00PM", None)]).await;
    let summary = sync.run(&[assignment("HW 1", "Oct 06 at 4:00PM", None)]).await;

    assert_eq!(summary, SyncSummary { created: 1, skipped: 0, failed: 0 });
    assert_eq!(calendar.events().len(), 2);
}

#[tokio::test]
async fn test_summary_display() {
    let summary = SyncSummary { created: 2, skipped: 5, failed: 1 };
    assert_eq!(summary.to_string(), "Created 2, skipped 5, failed 1.");
}
