use crate::error::{parse_error, Error, SyncResult};
use chrono::{DateTime, Datelike, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Layouts tried after the year is appended, most specific first
const DATETIME_FORMATS: [&str; 2] = ["%b %d %I:%M%p %Y", "%b %d %H:%M %Y"];
const DATE_FORMAT: &str = "%b %d %Y";

/// Current year as seen on a wall clock in `zone`
pub fn current_year(zone: Tz) -> i32 {
    Utc::now().with_timezone(&zone).year()
}

/// Parse a due text such as `Oct 04 at 4:00PM` into an instant
///
/// The page never shows a year, so `year` is appended as-is; a January
/// deadline scraped in December lands in the wrong year. Without an explicit
/// offset in the text, the offset `zone` has on that date is attached.
pub fn parse_due(due_text: &str, zone: Tz, year: i32) -> SyncResult<DateTime<FixedOffset>> {
    let (text, offset) = normalize(due_text);
    if text.is_empty() {
        return Err(parse_error(due_text));
    }

    let naive = parse_naive(&format!("{} {}", text, year)).ok_or_else(|| parse_error(due_text))?;

    if let Some(offset) = offset {
        return offset
            .from_local_datetime(&naive)
            .single()
            .ok_or_else(|| parse_error(due_text));
    }

    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.fixed_offset()),
        // Repeated hour when clocks fall back
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.fixed_offset()),
        LocalResult::None => Err(Error::DueParse(format!(
            "{} (no such local time in {})",
            due_text,
            zone.name()
        ))),
    }
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Drop filler words, glue AM/PM onto the time and pull out an explicit offset
fn normalize(due_text: &str) -> (String, Option<FixedOffset>) {
    let mut tokens: Vec<String> = Vec::new();
    let mut offset = None;

    for raw in due_text.split_whitespace() {
        let token = raw.trim_end_matches(',');
        if token.is_empty() || token.eq_ignore_ascii_case("at") {
            continue;
        }
        if let Some(parsed) = parse_offset(token) {
            offset = Some(parsed);
            continue;
        }
        if is_zone_abbreviation(token) && !tokens.is_empty() {
            continue;
        }
        if is_meridiem(token) {
            if let Some(last) = tokens.last_mut() {
                *last = uppercase_meridiem(&format!("{}{}", last, token));
                continue;
            }
        }
        tokens.push(uppercase_meridiem(token));
    }

    (tokens.join(" "), offset)
}

fn is_meridiem(token: &str) -> bool {
    token.eq_ignore_ascii_case("am") || token.eq_ignore_ascii_case("pm")
}

/// `4:00pm` -> `4:00PM`, `9am` -> `9:00AM`
fn uppercase_meridiem(token: &str) -> String {
    let lower = token.to_ascii_lowercase();
    let starts_with_digit = token.chars().next().is_some_and(|c| c.is_ascii_digit());
    if !starts_with_digit || !(lower.ends_with("am") || lower.ends_with("pm")) {
        return token.to_string();
    }

    let (clock, meridiem) = token.split_at(token.len() - 2);
    if clock.chars().all(|c| c.is_ascii_digit()) {
        format!("{}:00{}", clock, meridiem.to_ascii_uppercase())
    } else {
        token.to_ascii_uppercase()
    }
}

/// Names like PT, PDT or CEST; they are dropped and the configured zone is used
fn is_zone_abbreviation(token: &str) -> bool {
    (2..=5).contains(&token.len())
        && token.chars().all(|c| c.is_ascii_uppercase())
        && token.ends_with('T')
}

/// `UTC`, `GMT`, `Z`, `+02:00`, `-0700`, `+05`
fn parse_offset(token: &str) -> Option<FixedOffset> {
    if matches!(token, "UTC" | "GMT" | "Z") {
        return FixedOffset::east_opt(0);
    }

    let sign = match token.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let digits: String = token[1..].chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
