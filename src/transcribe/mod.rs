//! Transcription of parsed workbook groups into the design document
//!
//! The steps run in a fixed dependency order: units, surface rows and
//! stop, surface types, glass catalogs, per-surface data, wavelengths,
//! system data, multi-configuration operands, save. Each step assumes the
//! previous one succeeded; nothing is retried. Data-integrity problems
//! (unresolved markers, unknown glass) are logged and skipped, never
//! fatal.

pub mod display;

use crate::error::{LensError, LensResult};
use crate::markers;
use crate::types::{Cell, LensData, RecordGroup};
use crate::zemax::session::Application;
use crate::zemax::system::{
    ApertureType, FieldType, LensUnit, McOperandType, OpticalSystem, RayAimingMethod, SurfaceType,
};
use std::path::Path;

/// Editor cell holding the maximum-term count (parameter 13).
const MAX_TERM_CELL: u32 = 24;
/// Editor cell holding the normalization radius (parameter 14);
/// coefficient `A_n` lands at this cell plus `n`.
const NORM_RADIUS_CELL: u32 = 25;
/// The operand cells have no infinite representation; the sentinel is
/// stored as a large finite thickness.
const INFINITE_THICKNESS: f64 = 1e10;

/// Transcribe `data` into a fresh primary system and save it to
/// `out_path`.
pub fn write_lens_data(data: &LensData, app: &mut Application, out_path: &Path) -> LensResult<()> {
    let system = app.new_system()?;
    apply_to_system(data, system)?;
    system.save_as(out_path)?;
    Ok(())
}

/// Apply every record group to `system`, without persisting.
pub fn apply_to_system(data: &LensData, system: &mut OpticalSystem) -> LensResult<()> {
    let surf = data
        .surfaces()
        .filter(|g| g.row_count() > 0)
        .ok_or_else(|| LensError::Validation("workbook has no SURF data rows".to_string()))?;
    let wave = data
        .wavelengths()
        .filter(|g| g.row_count() > 0)
        .ok_or_else(|| LensError::Validation("workbook has no WAVE data rows".to_string()))?;

    set_system_units(system, data.metadata());
    insert_surfaces(system, surf)?;
    set_surface_types(system, data.aspheres());
    set_glass_catalogs(system, surf);
    set_surface_data(system, surf, data.aspheres());
    set_wavelengths(system, wave);
    set_system_data(system, data.configs());
    set_mce_data(system, data.configs());
    Ok(())
}

/// Step 1: document units from `META.lens_unit`; unrecognized or absent
/// values stay millimeters.
fn set_system_units(system: &mut OpticalSystem, meta: Option<&RecordGroup>) {
    let Some(meta) = meta else {
        return;
    };
    if let Some(name) = meta.cell(0, "lens_unit").as_text() {
        system.set_lens_units(LensUnit::from_name(name));
    }
}

/// Step 2: grow the surface table to one surface per SURF row and flag
/// the stop row.
fn insert_surfaces(system: &mut OpticalSystem, surf: &RecordGroup) -> LensResult<()> {
    while system.num_surfaces() < surf.row_count() {
        system.insert_new_surface_at(2);
    }
    if system.num_surfaces() != surf.row_count() {
        return Err(LensError::Validation(format!(
            "SURF has {} rows; at least the object, stop and image surfaces are required",
            surf.row_count()
        )));
    }

    match markers::find_marked_row(surf, "surf_num", markers::STOP_MARKER) {
        Some(row) => system.set_stop(row),
        None => tracing::error!(
            "no stop surface found; ensure one SURF surf_num contains '_STO'"
        ),
    }
    Ok(())
}

/// Step 3: surface types for ASPH rows. Only the extended odd asphere is
/// supported for now.
fn set_surface_types(system: &mut OpticalSystem, asph: Option<&RecordGroup>) {
    let Some(asph) = asph else {
        return;
    };
    for row in 0..asph.row_count() {
        match asph.cell(row, "surf_num").as_number() {
            Some(n) => {
                let index = n as usize;
                match system.surface_mut(index) {
                    Some(surface) => surface.change_type(SurfaceType::ExtendedOddAsphere),
                    None => tracing::warn!(
                        "ASPH row {} references surface {} outside the surface table",
                        row,
                        index
                    ),
                }
            }
            None => tracing::warn!("ASPH row {} has no numeric surf_num", row),
        }
    }
}

/// Step 4: register the glass catalogs referenced by named-glass rows and
/// drop unreferenced defaults.
fn set_glass_catalogs(system: &mut OpticalSystem, surf: &RecordGroup) {
    let mut catalogs_to_use: Vec<String> = Vec::new();

    for row in 0..surf.row_count() {
        // Named glass: nd is the material, vd its catalog. Numeric rows
        // are index/Abbe solves and reference no catalog.
        let Some(material) = surf.cell(row, "nd").as_text().map(str::to_string) else {
            continue;
        };
        let Some(catalog) = surf.cell(row, "vd").as_text().map(str::to_string) else {
            tracing::warn!(
                "SURF row {}: glass '{}' has no 'vd' catalog name",
                row,
                material
            );
            continue;
        };
        if !catalogs_to_use.contains(&catalog) {
            catalogs_to_use.push(catalog.clone());
        }
        if let Ok(materials) = system.materials_in_catalog(&catalog) {
            if !materials.iter().any(|m| m == &material) {
                tracing::warn!("material {} not found in catalog {}", material, catalog);
            }
        }
    }

    let available = system.available_catalogs();
    let defaults = system.catalogs_in_use().to_vec();
    for catalog in &catalogs_to_use {
        if !available.contains(catalog) {
            tracing::warn!("glass catalog {} not found in AGF files", catalog);
        } else if !defaults.contains(catalog) {
            system.add_catalog(catalog);
        }
    }
    for default in &defaults {
        if !catalogs_to_use.contains(default) {
            system.remove_catalog(default);
        }
    }
}

/// Step 5: per-surface geometry and material, then the aspheric terms.
fn set_surface_data(system: &mut OpticalSystem, surf: &RecordGroup, asph: Option<&RecordGroup>) {
    for row in 0..surf.row_count() {
        let Some(surface) = system.surface_mut(row) else {
            continue;
        };

        surface.comment = surf.cell(row, "surf_num").display_text();

        if let Some(radius) = surf.cell(row, "r").as_distance() {
            surface.radius = radius;
        }
        if let Some(thickness) = surf.cell(row, "d").as_distance() {
            surface.thickness = thickness;
        }

        match surf.cell(row, "nd") {
            Cell::Text(name) => surface.set_material(name),
            Cell::Number(index_nd) => match surf.cell(row, "vd").as_number() {
                Some(abbe_vd) => surface.set_material_solve(index_nd, abbe_vd),
                None => tracing::warn!(
                    "SURF row {}: index {} has no numeric 'vd' Abbe number",
                    row,
                    index_nd
                ),
            },
            Cell::Empty => {}
        }

        if let Some(cir) = surf.cell(row, "cir").as_number() {
            surface.semi_diameter = cir;
            surface.mechanical_semi_diameter = cir;
        }
    }

    let Some(asph) = asph else {
        return;
    };

    // Coefficient columns carry their index as an A_<n> suffix; the
    // remaining columns (surf_num, ka) have no parseable suffix.
    let coeff_columns: Vec<(usize, u32)> = asph
        .columns
        .iter()
        .enumerate()
        .filter_map(|(col, name)| markers::index_suffix(name).map(|n| (col, n)))
        .collect();
    let max_term = coeff_columns.iter().map(|&(_, n)| n).max();

    for row in 0..asph.row_count() {
        let Some(index) = asph.cell(row, "surf_num").as_number().map(|n| n as usize) else {
            continue;
        };
        let Some(surface) = system.surface_mut(index) else {
            continue;
        };

        match asph.cell(row, "ka").as_number() {
            Some(conic) => surface.conic = conic,
            None => tracing::warn!("ASPH row {} has no numeric conic constant 'ka'", row),
        }

        if let Some(max_term) = max_term {
            surface.set_cell_int(MAX_TERM_CELL, i64::from(max_term));
            surface.set_cell_double(NORM_RADIUS_CELL, 1.0);
        }

        for &(col, n) in &coeff_columns {
            let cell = asph.cell_at(row, col);
            let value = match &cell {
                Cell::Number(v) => Some(*v),
                Cell::Text(s) => s.parse::<f64>().ok(),
                Cell::Empty => None,
            };
            match value {
                Some(v) => surface.set_cell_double(NORM_RADIUS_CELL + n, v),
                None => {
                    if !cell.is_empty() {
                        tracing::warn!(
                            "ASPH row {}: coefficient A_{} is not numeric",
                            row,
                            n
                        );
                    }
                }
            }
        }
    }
}

/// Step 6: wavelengths in micrometers; the first row overwrites the
/// document default, the `_c` row becomes primary.
fn set_wavelengths(system: &mut OpticalSystem, wave: &RecordGroup) {
    for row in 0..wave.row_count() {
        let Some(nm) = wave.cell(row, "wavelength_nm").as_number() else {
            tracing::warn!("WAVE row {} has no numeric wavelength_nm", row);
            continue;
        };
        let weight = wave.cell(row, "weight").as_number().unwrap_or(1.0);
        let micrometers = 0.001 * nm;

        if row == 0 {
            if let Some(w) = system.wavelength_mut(1) {
                w.value = micrometers;
                w.weight = weight;
            }
        } else {
            system.add_wavelength(micrometers, weight);
        }
    }

    match markers::find_marked_row(wave, "wave_num", markers::PRIMARY_MARKER) {
        // Editor numbering is one ahead of the row position
        Some(row) => {
            system.set_primary_wavelength(row + 1);
        }
        None => tracing::error!(
            "no primary wavelength found; ensure one WAVE wave_num contains '_c'"
        ),
    }
}

/// Step 7: system data from the first configuration column. Aperture and
/// field types are fixed policy: image-space f/# and real image height.
fn set_system_data(system: &mut OpticalSystem, conf: Option<&RecordGroup>) {
    system.set_ray_aiming(RayAimingMethod::Real);

    let Some(conf) = conf else {
        return;
    };

    match markers::find_marked_row(conf, "name", markers::FNO_MARKER)
        .and_then(|row| conf.cell(row, "config_1").as_number())
    {
        Some(fno) => system.set_aperture(ApertureType::ImageSpaceFNum, fno),
        None => tracing::warn!("CONF has no usable 'fno' row; aperture left at default"),
    }

    let field_rows = markers::marked_rows(conf, "name", markers::FIELD_MARKER);
    if field_rows.is_empty() {
        return;
    }
    system.set_field_type(FieldType::RealImageHeight);
    for (position, &row) in field_rows.iter().enumerate() {
        let Some(y) = conf.cell(row, "config_1").as_number() else {
            tracing::warn!("CONF field row {} has no numeric config_1 value", row);
            continue;
        };
        if position == 0 {
            // The document starts with one field; reuse it
            if let Some(field) = system.field_mut(1) {
                field.y = y;
            }
        } else {
            system.add_field(0.0, y, 1.0);
        }
    }
}

/// Step 8: multi-configuration operands, only when more than one
/// configuration column exists.
fn set_mce_data(system: &mut OpticalSystem, conf: Option<&RecordGroup>) {
    let Some(conf) = conf else {
        return;
    };
    let config_columns: Vec<usize> = conf
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| name.starts_with("config_"))
        .map(|(col, _)| col)
        .collect();
    if config_columns.len() <= 1 {
        return;
    }

    for _ in 1..config_columns.len() {
        system.mce_mut().add_configuration();
    }

    // f-number operand (one expected)
    if let Some(row) = markers::find_marked_row(conf, "name", markers::FNO_MARKER) {
        let values = config_values(conf, row, &config_columns, false);
        let operand = system.mce_mut().add_operand(McOperandType::Aperture);
        for (config, value) in values {
            operand.set_value(config, value);
        }
    }

    for row in markers::marked_rows(conf, "name", markers::FIELD_MARKER) {
        let name = conf.cell(row, "name").display_text();
        let Some(field_num) = markers::index_suffix(&name) else {
            tracing::warn!("CONF row '{}' has no numeric field suffix", name);
            continue;
        };
        let values = config_values(conf, row, &config_columns, false);
        let operand = system.mce_mut().add_operand(McOperandType::YField);
        // The editor expects the index of the field drop-down list, so
        // field 1 is stored as 0
        operand.set_param(i64::from(field_num) - 1);
        for (config, value) in values {
            operand.set_value(config, value);
        }
    }

    for row in markers::marked_rows(conf, "name", markers::THICKNESS_MARKER) {
        let name = conf.cell(row, "name").display_text();
        let Some(surf_num) = markers::index_suffix(&name) else {
            tracing::warn!("CONF row '{}' has no numeric surface suffix", name);
            continue;
        };
        let values = config_values(conf, row, &config_columns, true);
        let operand = system.mce_mut().add_operand(McOperandType::Thickness);
        operand.set_param(i64::from(surf_num));
        for (config, value) in values {
            operand.set_value(config, value);
        }
    }
}

/// Per-configuration values of one CONF row, keyed by 1-based
/// configuration. With `map_infinite`, a text cell is the infinite
/// sentinel and stores as 1e10.
fn config_values(
    conf: &RecordGroup,
    row: usize,
    config_columns: &[usize],
    map_infinite: bool,
) -> Vec<(usize, f64)> {
    config_columns
        .iter()
        .enumerate()
        .filter_map(|(position, &col)| {
            let config = position + 1;
            match conf.cell_at(row, col) {
                Cell::Number(v) => Some((config, v)),
                Cell::Text(_) if map_infinite => Some((config, INFINITE_THICKNESS)),
                Cell::Text(s) => {
                    tracing::warn!(
                        "CONF row {} config {} has non-numeric value '{}'",
                        row,
                        config,
                        s
                    );
                    None
                }
                Cell::Empty => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LensData;
    use crate::zemax::catalog::GlassCatalogStore;
    use crate::zemax::system::{Aperture, MaterialCell};
    use pretty_assertions::assert_eq;

    fn group(label: &str, columns: &[&str], rows: Vec<Vec<Cell>>) -> RecordGroup {
        let mut g = RecordGroup::new(label);
        g.columns = columns.iter().map(|c| c.to_string()).collect();
        g.rows = rows;
        g
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(n: f64) -> Cell {
        Cell::Number(n)
    }

    /// The triplet lens from the end-to-end property: air, stop, image,
    /// one primary wavelength, single-config f/5.6 with one field.
    fn minimal_data() -> LensData {
        LensData {
            groups: vec![
                group(
                    "META",
                    &["lens_unit"],
                    vec![vec![text("mm")]],
                ),
                group(
                    "SURF",
                    &["surf_num", "r", "d", "nd", "vd", "cir"],
                    vec![
                        vec![text("OBJ"), text("INF"), text("INF"), Cell::Empty, Cell::Empty, Cell::Empty],
                        vec![text("1_STO"), num(10.0), num(5.0), Cell::Empty, Cell::Empty, num(8.0)],
                        vec![text("IMG"), text("INF"), num(0.0), Cell::Empty, Cell::Empty, Cell::Empty],
                    ],
                ),
                group(
                    "WAVE",
                    &["wave_num", "wavelength_nm", "weight"],
                    vec![vec![text("d_C"), num(550.0), num(1.0)]],
                ),
                group(
                    "CONF",
                    &["name", "config_1"],
                    vec![
                        vec![text("fno"), num(5.6)],
                        vec![text("y_1"), num(10.0)],
                    ],
                ),
            ],
        }
    }

    #[test]
    fn test_end_to_end_minimal_system() {
        let mut system = OpticalSystem::new();
        apply_to_system(&minimal_data(), &mut system).unwrap();

        assert_eq!(system.num_surfaces(), 3);
        assert_eq!(system.stop_index(), Some(1));

        assert_eq!(system.num_wavelengths(), 1);
        let primary = system.primary_wavelength().unwrap();
        assert_eq!(primary, 1);
        assert_eq!(system.wavelength(1).unwrap().value, 0.55);

        assert_eq!(
            system.aperture(),
            Aperture {
                aperture_type: ApertureType::ImageSpaceFNum,
                value: 5.6
            }
        );
        assert_eq!(system.field_type(), FieldType::RealImageHeight);
        assert_eq!(system.num_fields(), 1);
        assert_eq!(system.fields()[0].y, 10.0);
        assert_eq!(system.ray_aiming(), RayAimingMethod::Real);

        // Single configuration: no operands added
        assert_eq!(system.mce().num_configurations(), 1);
        assert!(system.mce().operands().is_empty());
    }

    #[test]
    fn test_surface_data_values() {
        let mut system = OpticalSystem::new();
        apply_to_system(&minimal_data(), &mut system).unwrap();

        let object = system.surface(0).unwrap();
        assert_eq!(object.comment, "OBJ");
        assert!(object.radius.is_infinite());
        assert!(object.thickness.is_infinite());

        let stop = system.surface(1).unwrap();
        assert_eq!(stop.comment, "1_STO");
        assert_eq!(stop.radius, 10.0);
        assert_eq!(stop.thickness, 5.0);
        assert_eq!(stop.semi_diameter, 8.0);
        assert_eq!(stop.mechanical_semi_diameter, 8.0);
        assert_eq!(stop.material, MaterialCell::Empty);
    }

    #[test]
    fn test_units_default_to_millimeters() {
        let mut data = minimal_data();
        data.group_mut("META").unwrap().rows[0] = vec![text("cubits")];

        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();
        assert_eq!(system.lens_units(), LensUnit::Millimeters);

        data.group_mut("META").unwrap().rows[0] = vec![text("Inches")];
        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();
        assert_eq!(system.lens_units(), LensUnit::Inches);
    }

    #[test]
    fn test_missing_stop_marker_is_non_fatal() {
        let mut data = minimal_data();
        data.group_mut("SURF").unwrap().rows[1][0] = text("S1");

        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();
        // The document default stop is left as-is
        assert_eq!(system.stop_index(), Some(1));
    }

    #[test]
    fn test_missing_primary_marker_is_non_fatal() {
        let mut data = minimal_data();
        data.group_mut("WAVE").unwrap().rows[0][0] = text("d");

        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();
        assert_eq!(system.primary_wavelength(), Some(1));
    }

    #[test]
    fn test_missing_surf_group_is_fatal() {
        let mut data = minimal_data();
        data.groups.retain(|g| g.label != "SURF");

        let mut system = OpticalSystem::new();
        let err = apply_to_system(&data, &mut system).unwrap_err();
        assert!(err.to_string().contains("SURF"));
    }

    #[test]
    fn test_too_few_surface_rows_is_fatal() {
        let mut data = minimal_data();
        data.group_mut("SURF").unwrap().rows.truncate(2);

        let mut system = OpticalSystem::new();
        assert!(apply_to_system(&data, &mut system).is_err());
    }

    #[test]
    fn test_surface_count_grows_to_row_count() {
        let mut data = minimal_data();
        let surf = data.group_mut("SURF").unwrap();
        let blank = vec![text("S"), num(20.0), num(1.0), Cell::Empty, Cell::Empty, Cell::Empty];
        surf.rows.insert(2, blank.clone());
        surf.rows.insert(2, blank);

        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();
        assert_eq!(system.num_surfaces(), 5);
        assert_eq!(system.surface(4).unwrap().comment, "IMG");
    }

    #[test]
    fn test_multiple_wavelengths_and_primary_offset() {
        let mut data = minimal_data();
        let wave = data.group_mut("WAVE").unwrap();
        wave.rows = vec![
            vec![text("F"), num(486.0), num(1.0)],
            vec![text("d_C"), num(588.0), num(1.0)],
            vec![text("C"), num(656.0), num(0.5)],
        ];

        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();

        assert_eq!(system.num_wavelengths(), 3);
        assert_eq!(system.wavelength(1).unwrap().value, 0.486);
        assert_eq!(system.wavelength(3).unwrap().weight, 0.5);
        assert_eq!(system.primary_wavelength(), Some(2));
    }

    #[test]
    fn test_named_glass_and_model_solve() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("SCHOTT.agf"),
            "NM N-BK7 2 0 1.5168 64.17\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("OHARA.agf"), "NM S-LAH66 2\n").unwrap();

        let mut data = minimal_data();
        let surf = data.group_mut("SURF").unwrap();
        surf.rows[1][3] = text("S-LAH66");
        surf.rows[1][4] = text("OHARA");
        surf.rows[2][3] = num(1.62);
        surf.rows[2][4] = num(60.3);

        let mut system =
            OpticalSystem::new().with_catalogs(GlassCatalogStore::with_dir(dir.path()));
        apply_to_system(&data, &mut system).unwrap();

        assert_eq!(
            system.surface(1).unwrap().material,
            MaterialCell::Glass("S-LAH66".to_string())
        );
        assert_eq!(
            system.surface(2).unwrap().material,
            MaterialCell::ModelSolve {
                index_nd: 1.62,
                abbe_vd: 60.3
            }
        );
        // OHARA added, unreferenced SCHOTT default removed
        assert_eq!(system.catalogs_in_use(), ["OHARA".to_string()]);
    }

    #[test]
    fn test_aspheric_terms() {
        let mut data = minimal_data();
        data.groups.push(group(
            "ASPH",
            &["surf_num", "ka", "A_4", "A_6"],
            vec![vec![num(1.0), num(-1.5), num(2.5e-5), num(-3.0e-7)]],
        ));

        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();

        let surface = system.surface(1).unwrap();
        assert_eq!(surface.surface_type, SurfaceType::ExtendedOddAsphere);
        assert_eq!(surface.conic, -1.5);
        assert_eq!(surface.cell_int(24), Some(6));
        assert_eq!(surface.cell_double(25), Some(1.0));
        assert_eq!(surface.cell_double(29), Some(2.5e-5));
        assert_eq!(surface.cell_double(31), Some(-3.0e-7));
    }

    #[test]
    fn test_multi_config_operands() {
        let mut data = minimal_data();
        let conf = data.group_mut("CONF").unwrap();
        conf.columns = vec![
            "name".to_string(),
            "config_1".to_string(),
            "config_2".to_string(),
        ];
        conf.rows = vec![
            vec![text("fno"), num(5.6), num(8.0)],
            vec![text("y_1"), num(10.0), num(12.0)],
            vec![text("y_2"), num(20.0), num(24.0)],
            vec![text("d_2"), num(5.0), text("INF")],
        ];

        let mut system = OpticalSystem::new();
        apply_to_system(&data, &mut system).unwrap();

        let mce = system.mce();
        assert_eq!(mce.num_configurations(), 2);
        assert_eq!(mce.operands().len(), 4);

        let aper = &mce.operands()[0];
        assert_eq!(aper.operand_type, McOperandType::Aperture);
        assert_eq!(aper.values(), &[5.6, 8.0]);

        let y1 = &mce.operands()[1];
        assert_eq!(y1.operand_type, McOperandType::YField);
        assert_eq!(y1.param, 0); // field 1, zero-based
        assert_eq!(y1.values(), &[10.0, 12.0]);

        let y2 = &mce.operands()[2];
        assert_eq!(y2.param, 1);
        assert_eq!(y2.values(), &[20.0, 24.0]);

        let thic = &mce.operands()[3];
        assert_eq!(thic.operand_type, McOperandType::Thickness);
        assert_eq!(thic.param, 2);
        assert_eq!(thic.values(), &[5.0, INFINITE_THICKNESS]);

        // Two fields were created from the first configuration column
        assert_eq!(system.num_fields(), 2);
        assert_eq!(system.fields()[1].y, 20.0);
    }

    #[test]
    fn test_single_config_column_adds_no_operands() {
        let mut system = OpticalSystem::new();
        apply_to_system(&minimal_data(), &mut system).unwrap();
        assert!(system.mce().operands().is_empty());
    }
}
