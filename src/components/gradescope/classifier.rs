/// Month abbreviations recognized at the start of a due line
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Whether a line reads like `Oct 04 at 4:00PM`
pub fn looks_like_date(line: &str) -> bool {
    let line = line.trim();
    line.contains(" at ") && MONTHS.iter().any(|m| line.starts_with(m))
}

/// Whether a line mentions a month anywhere
pub fn mentions_month(line: &str) -> bool {
    MONTHS.iter().any(|m| line.contains(m))
}
