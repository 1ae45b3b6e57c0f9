//! Course-page side of a sync run: browser session, row reading and the
//! title/due-date heuristics applied to each row.

mod classifier;
mod extractor;
pub mod models;
mod session;

pub use classifier::{looks_like_date, mentions_month, MONTHS};
pub use extractor::{
    candidate_lines, extract_assignments, extract_row, resolve_title, sample_rows, select_due_text,
    FilterPolicy, RowOutcome,
};
pub use models::{AssignmentRecord, RowLink, RowSnapshot};
pub use session::{CourseSession, GradescopeSession};
