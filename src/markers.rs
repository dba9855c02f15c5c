//! Naming-convention markers used throughout the workbook schema.
//!
//! Row identifiers carry meaning as substrings: `1_STO` flags the stop
//! surface, `F_c` flags the primary wavelength, and `CONF` row names like
//! `y_2` or `d_10` carry a field/surface index as a numeric suffix. All
//! matching is case-insensitive substring matching; this module is the
//! single home for those conventions.

use crate::types::RecordGroup;

/// Stop-surface marker inside a `SURF` row identifier.
pub const STOP_MARKER: &str = "_sto";

/// Primary-wavelength marker inside a `WAVE` row identifier.
pub const PRIMARY_MARKER: &str = "_c";

/// System f-number operand marker inside a `CONF` row name.
pub const FNO_MARKER: &str = "fno";

/// Field-height operand marker inside a `CONF` row name.
pub const FIELD_MARKER: &str = "y_";

/// Surface-thickness operand marker inside a `CONF` row name.
pub const THICKNESS_MARKER: &str = "d_";

/// Case-insensitive substring test.
pub fn contains_marker(value: &str, marker: &str) -> bool {
    value.to_lowercase().contains(&marker.to_lowercase())
}

/// Zero-based position of the first row whose `column` text contains
/// `marker` (case-insensitive). Non-text cells never match.
pub fn find_marked_row(group: &RecordGroup, column: &str, marker: &str) -> Option<usize> {
    (0..group.row_count()).find(|&row| {
        group
            .cell(row, column)
            .as_text()
            .is_some_and(|text| contains_marker(text, marker))
    })
}

/// All zero-based rows whose `column` text contains `marker`.
pub fn marked_rows(group: &RecordGroup, column: &str, marker: &str) -> Vec<usize> {
    (0..group.row_count())
        .filter(|&row| {
            group
                .cell(row, column)
                .as_text()
                .is_some_and(|text| contains_marker(text, marker))
        })
        .collect()
}

/// Numeric suffix after the first `_` in a name: `y_12` → 12, `A_4` → 4.
pub fn index_suffix(name: &str) -> Option<u32> {
    name.split('_').nth(1)?.trim().parse().ok()
}
