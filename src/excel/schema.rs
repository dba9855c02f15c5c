//! Workbook schema checks
//!
//! Group labels and the fixed column sets are validated against
//! allow-lists. Unknown keys are flagged as warnings, never rejected;
//! only the absence of the required groups aborts a run.

use crate::error::{LensError, LensResult};
use crate::markers;
use crate::types::{LensData, GROUP_ASPH, GROUP_CONF, GROUP_META, GROUP_SURF, GROUP_WAVE};

pub const EXPECTED_GROUPS: [&str; 5] =
    [GROUP_META, GROUP_SURF, GROUP_ASPH, GROUP_CONF, GROUP_WAVE];
pub const META_COLUMNS: [&str; 1] = ["lens_unit"];
pub const SURF_COLUMNS: [&str; 6] = ["surf_num", "r", "d", "nd", "vd", "cir"];
pub const WAVE_COLUMNS: [&str; 3] = ["wave_num", "wavelength_nm", "weight"];

/// Check group labels and column headers against the expected sets.
/// Returns one human-readable warning per unrecognized key.
pub fn validate(data: &LensData) -> Vec<String> {
    let mut warnings = Vec::new();

    for group in &data.groups {
        if !EXPECTED_GROUPS.contains(&group.label.as_str()) {
            warnings.push(format!(
                "unknown lens data label '{}' (column 1 should only contain {:?})",
                group.label, EXPECTED_GROUPS
            ));
            continue;
        }

        for column in &group.columns {
            if !column_is_known(&group.label, column) {
                warnings.push(format!(
                    "unknown {} column '{}'",
                    group.label, column
                ));
            }
        }
    }

    warnings
}

fn column_is_known(label: &str, column: &str) -> bool {
    match label {
        GROUP_META => META_COLUMNS.contains(&column),
        GROUP_SURF => SURF_COLUMNS.contains(&column),
        GROUP_WAVE => WAVE_COLUMNS.contains(&column),
        // ASPH carries one A_<n> column per aspheric coefficient
        GROUP_ASPH => {
            column == "surf_num"
                || column == "ka"
                || (column.starts_with("A_") && markers::index_suffix(column).is_some())
        }
        // CONF carries one config_<n> column per configuration
        GROUP_CONF => {
            column == "name"
                || (column.starts_with("config_") && markers::index_suffix(column).is_some())
        }
        _ => false,
    }
}

/// The transcriber cannot run without surface and wavelength data.
pub fn check_required(data: &LensData) -> LensResult<()> {
    for label in [GROUP_SURF, GROUP_WAVE] {
        match data.group(label) {
            Some(group) if group.row_count() > 0 => {}
            _ => {
                return Err(LensError::Validation(format!(
                    "workbook has no {} data rows",
                    label
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cell, RecordGroup};

    fn group(label: &str, columns: &[&str], n_rows: usize) -> RecordGroup {
        let mut g = RecordGroup::new(label);
        g.columns = columns.iter().map(|c| c.to_string()).collect();
        for _ in 0..n_rows {
            g.rows.push(vec![Cell::Empty; columns.len()]);
        }
        g
    }

    fn minimal_data() -> LensData {
        LensData {
            groups: vec![
                group(GROUP_SURF, &SURF_COLUMNS, 3),
                group(GROUP_WAVE, &WAVE_COLUMNS, 1),
            ],
        }
    }

    #[test]
    fn test_validate_clean_workbook() {
        assert!(validate(&minimal_data()).is_empty());
    }

    #[test]
    fn test_validate_flags_unknown_group() {
        let mut data = minimal_data();
        data.groups.push(group("LENS", &["foo"], 1));

        let warnings = validate(&data);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown lens data label 'LENS'"));
    }

    #[test]
    fn test_validate_flags_unknown_column() {
        let mut data = minimal_data();
        data.groups[0].columns.push("radius".to_string());

        let warnings = validate(&data);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unknown SURF column 'radius'"));
    }

    #[test]
    fn test_validate_accepts_patterned_columns() {
        let mut data = minimal_data();
        data.groups
            .push(group(GROUP_ASPH, &["surf_num", "ka", "A_4", "A_6"], 1));
        data.groups
            .push(group(GROUP_CONF, &["name", "config_1", "config_2"], 1));

        assert!(validate(&data).is_empty());
    }

    #[test]
    fn test_validate_flags_bad_patterned_columns() {
        let mut data = minimal_data();
        data.groups.push(group(GROUP_ASPH, &["surf_num", "ka", "A_x"], 1));
        data.groups.push(group(GROUP_CONF, &["name", "config_"], 1));

        let warnings = validate(&data);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_check_required_passes() {
        assert!(check_required(&minimal_data()).is_ok());
    }

    #[test]
    fn test_check_required_missing_wave() {
        let data = LensData {
            groups: vec![group(GROUP_SURF, &SURF_COLUMNS, 3)],
        };
        let err = check_required(&data).unwrap_err();
        assert!(err.to_string().contains("WAVE"));
    }

    #[test]
    fn test_check_required_empty_surf() {
        let data = LensData {
            groups: vec![
                group(GROUP_SURF, &SURF_COLUMNS, 0),
                group(GROUP_WAVE, &WAVE_COLUMNS, 1),
            ],
        };
        assert!(check_required(&data).is_err());
    }
}
