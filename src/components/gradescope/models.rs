/// Anchor found in a table row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowLink {
    pub text: String,
    pub href: Option<String>,
}

impl RowLink {
    pub fn new(text: &str, href: Option<&str>) -> Self {
        Self {
            text: text.to_string(),
            href: href.map(String::from),
        }
    }
}

/// Text and anchors read from one assignment table row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSnapshot {
    /// Rendered text of every `td`, in column order
    pub cells: Vec<String>,
    /// First anchor inside the first cell
    pub first_cell_link: Option<RowLink>,
    /// Every anchor in the row, in document order
    pub links: Vec<RowLink>,
}

/// Assignment accepted from the course page
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssignmentRecord {
    pub title: String,
    /// Raw due text as shown on the page, without a year
    pub due_text: String,
    pub link: Option<String>,
}
