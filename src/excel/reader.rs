//! Workbook reader - Excel (.xlsx) → `LensData`

use crate::error::{LensError, LensResult};
use crate::types::{Cell, LensData};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::collections::HashMap;
use std::path::Path;

/// Read a lens patent workbook into labeled record groups.
///
/// Reads the first worksheet. Rows are bucketed by their column-A label;
/// the first row of each label is the header row, later rows are data.
/// Pure function of the file: reading twice yields equal `LensData`.
pub fn read_lens_workbook<P: AsRef<Path>>(path: P) -> LensResult<LensData> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| LensError::Spreadsheet(format!("failed to open {}: {}", path.display(), e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LensError::Spreadsheet("workbook has no worksheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| LensError::Spreadsheet(format!("failed to read '{}': {}", sheet_name, e)))?;

    let mut data = LensData::new();
    // Sheet column positions of each group's named headers, so data cells
    // stay aligned even when unnamed columns sit in between.
    let mut positions: HashMap<String, Vec<usize>> = HashMap::new();

    for row in range.rows() {
        let Some(label) = row_label(row) else {
            continue;
        };

        match positions.get(&label) {
            None => {
                // First appearance: this row carries the column headers.
                let group = data.group_or_insert(&label);
                let mut cols = Vec::new();
                for (idx, cell) in row.iter().enumerate().skip(1) {
                    if let Data::String(name) = cell {
                        let name = name.trim();
                        if !name.is_empty() {
                            group.columns.push(name.to_string());
                            cols.push(idx);
                        }
                    }
                }
                positions.insert(label, cols);
            }
            Some(cols) => {
                let cells: Vec<Cell> = cols
                    .iter()
                    .map(|&idx| convert_cell(row.get(idx)))
                    .collect();
                data.group_or_insert(&label).rows.push(cells);
            }
        }
    }

    Ok(data)
}

/// Column-A label of a row, if any.
fn row_label(row: &[Data]) -> Option<String> {
    match row.first() {
        Some(Data::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

fn convert_cell(cell: Option<&Data>) -> Cell {
    match cell {
        Some(Data::Float(f)) => Cell::Number(*f),
        Some(Data::Int(i)) => Cell::Number(*i as f64),
        Some(Data::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.to_string())
            }
        }
        Some(Data::Bool(b)) => Cell::Text(b.to_string()),
        Some(Data::DateTime(dt)) => Cell::Number(dt.as_f64()),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => Cell::Text(s.clone()),
        Some(Data::Error(_)) | Some(Data::Empty) | None => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GROUP_META, GROUP_SURF, GROUP_WAVE};
    use pretty_assertions::assert_eq;
    use rust_xlsxwriter::Workbook;
    use tempfile::TempDir;

    /// Minimal three-surface workbook in the patent layout.
    fn write_fixture(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("patent.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        // META block
        sheet.write_string(0, 0, "META").unwrap();
        sheet.write_string(0, 1, "lens_unit").unwrap();
        sheet.write_string(1, 0, "META").unwrap();
        sheet.write_string(1, 1, "mm").unwrap();

        // SURF block
        let headers = ["surf_num", "r", "d", "nd", "vd", "cir"];
        sheet.write_string(2, 0, "SURF").unwrap();
        for (i, h) in headers.iter().enumerate() {
            sheet.write_string(2, 1 + i as u16, *h).unwrap();
        }
        sheet.write_string(3, 0, "SURF").unwrap();
        sheet.write_string(3, 1, "OBJ").unwrap();
        sheet.write_string(3, 2, "INF").unwrap();
        sheet.write_string(3, 3, "INF").unwrap();
        sheet.write_string(4, 0, "SURF").unwrap();
        sheet.write_string(4, 1, "1_STO").unwrap();
        sheet.write_number(4, 2, 10.0).unwrap();
        sheet.write_number(4, 3, 5.0).unwrap();
        sheet.write_string(4, 4, "N-BK7").unwrap();
        sheet.write_string(4, 5, "SCHOTT").unwrap();
        sheet.write_number(4, 6, 8.0).unwrap();
        sheet.write_string(5, 0, "SURF").unwrap();
        sheet.write_string(5, 1, "IMG").unwrap();
        sheet.write_string(5, 2, "INF").unwrap();
        sheet.write_number(5, 3, 0.0).unwrap();

        // WAVE block
        sheet.write_string(6, 0, "WAVE").unwrap();
        sheet.write_string(6, 1, "wave_num").unwrap();
        sheet.write_string(6, 2, "wavelength_nm").unwrap();
        sheet.write_string(6, 3, "weight").unwrap();
        sheet.write_string(7, 0, "WAVE").unwrap();
        sheet.write_string(7, 1, "d_C").unwrap();
        sheet.write_number(7, 2, 550.0).unwrap();
        sheet.write_number(7, 3, 1.0).unwrap();

        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_groups_in_order() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let data = read_lens_workbook(&path).unwrap();
        let labels: Vec<&str> = data.groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec![GROUP_META, GROUP_SURF, GROUP_WAVE]);
    }

    #[test]
    fn test_read_surface_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let data = read_lens_workbook(&path).unwrap();
        let surf = data.surfaces().unwrap();

        assert_eq!(
            surf.columns,
            vec!["surf_num", "r", "d", "nd", "vd", "cir"]
        );
        assert_eq!(surf.row_count(), 3);
        assert_eq!(surf.cell(0, "surf_num"), Cell::Text("OBJ".to_string()));
        assert_eq!(surf.cell(1, "r"), Cell::Number(10.0));
        assert_eq!(surf.cell(1, "nd"), Cell::Text("N-BK7".to_string()));
        // Cells the fixture never wrote read back as empty
        assert_eq!(surf.cell(0, "cir"), Cell::Empty);
        assert_eq!(surf.cell(2, "nd"), Cell::Empty);
    }

    #[test]
    fn test_read_meta_and_wave() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let data = read_lens_workbook(&path).unwrap();
        assert_eq!(
            data.metadata().unwrap().cell(0, "lens_unit"),
            Cell::Text("mm".to_string())
        );
        let wave = data.wavelengths().unwrap();
        assert_eq!(wave.cell(0, "wavelength_nm"), Cell::Number(550.0));
        assert_eq!(wave.cell(0, "weight"), Cell::Number(1.0));
    }

    #[test]
    fn test_read_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);

        let first = read_lens_workbook(&path).unwrap();
        let second = read_lens_workbook(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_missing_file_is_spreadsheet_error() {
        let err = read_lens_workbook("no_such_file.xlsx").unwrap_err();
        assert!(matches!(err, LensError::Spreadsheet(_)));
    }

    #[test]
    fn test_unnamed_header_columns_are_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gap.xlsx");
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        // Header with a gap at column 2; data under the gap must not shift
        sheet.write_string(0, 0, "META").unwrap();
        sheet.write_string(0, 1, "lens_unit").unwrap();
        sheet.write_string(0, 3, "extra").unwrap();
        sheet.write_string(1, 0, "META").unwrap();
        sheet.write_string(1, 1, "inches").unwrap();
        sheet.write_number(1, 2, 99.0).unwrap();
        sheet.write_string(1, 3, "x").unwrap();
        workbook.save(&path).unwrap();

        let data = read_lens_workbook(&path).unwrap();
        let meta = data.metadata().unwrap();
        assert_eq!(meta.columns, vec!["lens_unit", "extra"]);
        assert_eq!(meta.cell(0, "lens_unit"), Cell::Text("inches".to_string()));
        assert_eq!(meta.cell(0, "extra"), Cell::Text("x".to_string()));
    }
}
