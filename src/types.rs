use serde::Serialize;

//==============================================================================
// Spreadsheet cells
//==============================================================================

/// A single spreadsheet cell, typed the way the transcriber consumes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Read the cell as a radius/thickness distance.
    ///
    /// Any text cell (e.g. "INF") is the infinite sentinel; an empty cell
    /// leaves the document default untouched.
    pub fn as_distance(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(_) => Some(f64::INFINITY),
            Cell::Empty => None,
        }
    }

    /// Render the cell as display text (comments, row identifiers).
    pub fn display_text(&self) -> String {
        match self {
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::Text(s) => s.clone(),
            Cell::Empty => String::new(),
        }
    }
}

//==============================================================================
// Record groups
//==============================================================================

/// One labeled block of the workbook: a header row plus data rows, in
/// sheet order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordGroup {
    pub label: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RecordGroup {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at (row, column name). `Cell::Empty` for short rows.
    pub fn cell(&self, row: usize, name: &str) -> Cell {
        let Some(col) = self.column_index(name) else {
            return Cell::Empty;
        };
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or(Cell::Empty)
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .cloned()
            .unwrap_or(Cell::Empty)
    }
}

//==============================================================================
// Parsed workbook
//==============================================================================

pub const GROUP_META: &str = "META";
pub const GROUP_SURF: &str = "SURF";
pub const GROUP_ASPH: &str = "ASPH";
pub const GROUP_CONF: &str = "CONF";
pub const GROUP_WAVE: &str = "WAVE";

/// Parsed lens data: record groups keyed by their first-column label,
/// in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LensData {
    pub groups: Vec<RecordGroup>,
}

impl LensData {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn group(&self, label: &str) -> Option<&RecordGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    pub fn group_mut(&mut self, label: &str) -> Option<&mut RecordGroup> {
        self.groups.iter_mut().find(|g| g.label == label)
    }

    /// Group for `label`, creating an empty one on first appearance.
    pub fn group_or_insert(&mut self, label: &str) -> &mut RecordGroup {
        if let Some(idx) = self.groups.iter().position(|g| g.label == label) {
            &mut self.groups[idx]
        } else {
            self.groups.push(RecordGroup::new(label));
            self.groups.last_mut().unwrap()
        }
    }

    pub fn metadata(&self) -> Option<&RecordGroup> {
        self.group(GROUP_META)
    }

    pub fn surfaces(&self) -> Option<&RecordGroup> {
        self.group(GROUP_SURF)
    }

    pub fn aspheres(&self) -> Option<&RecordGroup> {
        self.group(GROUP_ASPH)
    }

    pub fn configs(&self) -> Option<&RecordGroup> {
        self.group(GROUP_CONF)
    }

    pub fn wavelengths(&self) -> Option<&RecordGroup> {
        self.group(GROUP_WAVE)
    }
}

impl Default for LensData {
    fn default() -> Self {
        Self::new()
    }
}
