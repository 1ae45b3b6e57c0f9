use super::classifier::{looks_like_date, mentions_month};
use super::models::{AssignmentRecord, RowLink, RowSnapshot};
use crate::error::SyncResult;
use tracing::{debug, info, warn};

/// Path fragment identifying assignment links
const ASSIGNMENT_PATH: &str = "/assignments/";
/// Lines containing these are countdowns or late-due dates, never the due date
const NOISE_MARKERS: [&str; 2] = ["left", "late due"];
/// Implicit deny keyword when attendance rows are excluded
const ATTENDANCE: &str = "attendance";

/// Keyword filters applied to assignment titles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    /// When set, only titles containing one of these are kept
    pub allow: Option<Vec<String>>,
    /// Titles containing any of these are dropped
    pub deny: Vec<String>,
    /// When false, "attendance" is denied as well
    pub include_attendance: bool,
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self {
            allow: None,
            deny: Vec::new(),
            include_attendance: true,
        }
    }
}

impl FilterPolicy {
    /// Deny keywords including the implicit attendance keyword
    pub fn effective_deny(&self) -> Vec<String> {
        let mut deny = self.deny.clone();
        if !self.include_attendance {
            deny.push(ATTENDANCE.to_string());
        }
        deny
    }

    fn is_denied(&self, title: &str) -> bool {
        contains_any(title, &self.effective_deny())
    }

    fn is_allowed(&self, title: &str) -> bool {
        match &self.allow {
            Some(allow) if !allow.is_empty() => contains_any(title, allow),
            _ => true,
        }
    }
}

/// What happened to a single row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(AssignmentRecord),
    /// No title could be resolved
    Empty,
    Denied(String),
    NotAllowed(String),
    NoDue(String),
}

fn contains_any(title: &str, keywords: &[String]) -> bool {
    let title = title.to_lowercase();
    keywords
        .iter()
        .any(|keyword| title.contains(&keyword.to_lowercase()))
}

fn non_empty(link: &RowLink) -> Option<(String, Option<String>)> {
    let text = link.text.trim();
    if text.is_empty() {
        None
    } else {
        Some((text.to_string(), link.href.clone().filter(|h| !h.is_empty())))
    }
}

/// Resolve title and link: first-cell link, then any assignment link, then first-cell text
pub fn resolve_title(row: &RowSnapshot) -> Option<(String, Option<String>)> {
    if let Some(found) = row.first_cell_link.as_ref().and_then(non_empty) {
        return Some(found);
    }

    let assignment_link = row
        .links
        .iter()
        .filter(|link| {
            link.href
                .as_deref()
                .is_some_and(|href| href.contains(ASSIGNMENT_PATH))
        })
        .find_map(non_empty);
    if assignment_link.is_some() {
        return assignment_link;
    }

    row.cells
        .first()
        .map(|cell| cell.trim())
        .filter(|text| !text.is_empty())
        .map(|text| (text.to_string(), None))
}

/// Flatten cell texts into trimmed lines, dropping blanks and noise
pub fn candidate_lines(cells: &[String]) -> Vec<String> {
    cells
        .iter()
        .flat_map(|cell| cell.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            let lower = line.to_lowercase();
            !NOISE_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .map(String::from)
        .collect()
}

/// Pick the due text: the last date-like line, else the last line naming a month
///
/// Rows list submission and late-due dates before the real due date, so the
/// last match is taken.
pub fn select_due_text(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .rev()
        .find(|line| looks_like_date(line))
        .or_else(|| lines.iter().rev().find(|line| mentions_month(line)))
        .cloned()
}

/// Turn one row into an assignment, or explain why it was skipped
pub fn extract_row(row: &RowSnapshot, policy: &FilterPolicy) -> RowOutcome {
    let Some((title, link)) = resolve_title(row) else {
        return RowOutcome::Empty;
    };

    if policy.is_denied(&title) {
        return RowOutcome::Denied(title);
    }
    if !policy.is_allowed(&title) {
        return RowOutcome::NotAllowed(title);
    }

    match select_due_text(&candidate_lines(&row.cells)) {
        Some(due_text) => RowOutcome::Accepted(AssignmentRecord {
            title,
            due_text,
            link,
        }),
        None => RowOutcome::NoDue(title),
    }
}

/// Extract assignments from row reads, logging every decision
///
/// A failed read only skips that row.
pub fn extract_assignments(
    rows: Vec<SyncResult<RowSnapshot>>,
    policy: &FilterPolicy,
) -> Vec<AssignmentRecord> {
    info!("Found {} table rows", rows.len());

    let mut results = Vec::new();
    let mut snapshots = Vec::new();

    for (idx, row) in rows.into_iter().enumerate() {
        let idx = idx + 1;
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("[Row {}] error: {}", idx, e);
                continue;
            }
        };

        match extract_row(&row, policy) {
            RowOutcome::Accepted(record) => {
                info!("[Row {}] ✅ {} | {}", idx, record.title, record.due_text);
                results.push(record);
            }
            RowOutcome::Empty => debug!("[Row {}] no title, skipping", idx),
            RowOutcome::Denied(title) => info!("[Row {}] ❌ Deny-filtered: {}", idx, title),
            RowOutcome::NotAllowed(title) => {
                info!("[Row {}] ❌ Not in allow list: {}", idx, title)
            }
            RowOutcome::NoDue(title) => info!("[Row {}] skip: no due for {:?}", idx, title),
        }

        snapshots.push(row);
    }

    if results.is_empty() {
        for line in sample_rows(&snapshots) {
            warn!("{}", line);
        }
    }

    results
}

/// First few rows as log lines, shown when nothing was extracted
pub fn sample_rows(snapshots: &[RowSnapshot]) -> Vec<String> {
    snapshots
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, row)| format!("DEBUG row {}: {:?}", i + 1, row.cells))
        .collect()
}
