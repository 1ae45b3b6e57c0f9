use chrono::{DateTime, TimeZone};

/// Namespace prefix of every sync key
pub const KEY_NAMESPACE: &str = "gradescope";
const KEY_DELIMITER: char = ':';

/// Lower-case, collapse non-alphanumeric runs to `-`, trim the ends
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    for c in value.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    slug
}

/// Deterministic idempotency key for one assignment deadline
///
/// A rescheduled deadline yields a new key, so it becomes a new event.
pub fn make_key<Tz: TimeZone>(course: &str, title: &str, due: &DateTime<Tz>) -> String {
    format!(
        "{ns}{d}{course}{d}{title}{d}{ts}",
        ns = KEY_NAMESPACE,
        d = KEY_DELIMITER,
        course = slugify(course),
        title = slugify(title),
        ts = due.timestamp()
    )
}
