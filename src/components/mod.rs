// Export components
pub mod google_calendar;
pub mod gradescope;

// Re-export collaborator entry points
pub use google_calendar::{CalendarService, GoogleCalendarClient};
pub use gradescope::GradescopeSession;
