//! Lens-file writer
//!
//! Serializes an `OpticalSystem` to the native `.zmx` text form: one
//! system-data header, one `SURF` block per surface, then the
//! multi-configuration lines. This is the minimal subset of the format
//! the importer produces; it is line-oriented, keyword first.

use crate::error::LensResult;
use crate::zemax::system::{
    ApertureType, FieldType, LensUnit, MaterialCell, OpticalSystem, ParamCell, RayAimingMethod,
    SurfaceType,
};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Write `system` to `path`, overwriting any existing file.
pub fn write_system(system: &OpticalSystem, path: &Path) -> LensResult<()> {
    fs::write(path, render(system))?;
    tracing::debug!(path = %path.display(), "lens file saved");
    Ok(())
}

/// Render the document as lens-file text.
pub fn render(system: &OpticalSystem) -> String {
    let mut out = String::new();

    out.push_str("VERS 1.0\n");
    out.push_str("MODE SEQ\n");
    let _ = writeln!(out, "UNIT {} X W X CM MR CPMM", unit_token(system.lens_units()));

    let aperture = system.aperture();
    match aperture.aperture_type {
        ApertureType::ImageSpaceFNum => {
            let _ = writeln!(out, "FNUM {} 0", fmt_value(aperture.value));
        }
        ApertureType::EntrancePupilDiameter => {
            let _ = writeln!(out, "ENPD {}", fmt_value(aperture.value));
        }
    }
    let _ = writeln!(out, "RAIM {}", ray_aiming_code(system.ray_aiming()));

    let _ = writeln!(
        out,
        "FTYP {} 0 {} {} 0 0 0",
        field_type_code(system.field_type()),
        system.num_fields(),
        system.num_wavelengths()
    );
    let _ = writeln!(out, "XFLN {}", join_values(system.fields().iter().map(|f| f.x)));
    let _ = writeln!(out, "YFLN {}", join_values(system.fields().iter().map(|f| f.y)));
    let _ = writeln!(
        out,
        "FWGN {}",
        join_values(system.fields().iter().map(|f| f.weight))
    );

    for (i, w) in system.wavelengths().iter().enumerate() {
        let _ = writeln!(out, "WAVM {} {} {}", i + 1, fmt_value(w.value), fmt_value(w.weight));
    }
    if let Some(primary) = system.primary_wavelength() {
        let _ = writeln!(out, "PWAV {}", primary);
    }

    if !system.catalogs_in_use().is_empty() {
        let _ = writeln!(out, "GCAT {}", system.catalogs_in_use().join(" "));
    }

    for (i, surface) in system.surfaces().iter().enumerate() {
        let _ = writeln!(out, "SURF {}", i);
        let _ = writeln!(out, "  TYPE {}", surface_type_token(surface.surface_type));
        if surface.is_stop {
            out.push_str("  STOP\n");
        }
        if !surface.comment.is_empty() {
            let _ = writeln!(out, "  COMM {}", surface.comment);
        }
        let _ = writeln!(out, "  CURV {}", fmt_value(curvature(surface.radius)));
        let _ = writeln!(out, "  DISZ {}", fmt_distance(surface.thickness));
        match &surface.material {
            MaterialCell::Empty => {}
            MaterialCell::Glass(name) => {
                let _ = writeln!(out, "  GLAS {}", name);
            }
            MaterialCell::ModelSolve { index_nd, abbe_vd } => {
                // Model glass: blank name, solved from index and Abbe number
                let _ = writeln!(
                    out,
                    "  GLAS ___BLANK 1 0 {} {}",
                    fmt_value(*index_nd),
                    fmt_value(*abbe_vd)
                );
            }
        }
        if surface.semi_diameter != 0.0 {
            let _ = writeln!(out, "  DIAM {}", fmt_value(surface.semi_diameter));
        }
        if surface.mechanical_semi_diameter != 0.0 {
            let _ = writeln!(out, "  MEMA {}", fmt_value(surface.mechanical_semi_diameter));
        }
        if surface.conic != 0.0 {
            let _ = writeln!(out, "  CONI {}", fmt_value(surface.conic));
        }
        for (cell, value) in surface.param_cells() {
            // Editor cells 12.. are the numbered surface parameters
            if cell < 12 {
                continue;
            }
            let value = match value {
                ParamCell::Int(v) => fmt_value(v as f64),
                ParamCell::Double(v) => fmt_value(v),
            };
            let _ = writeln!(out, "  PARM {} {}", cell - 11, value);
        }
    }

    let mce = system.mce();
    if mce.num_configurations() > 1 || !mce.operands().is_empty() {
        let _ = writeln!(out, "MNUM {} 1", mce.num_configurations());
        for operand in mce.operands() {
            let _ = writeln!(
                out,
                "MCOP {} {} {}",
                operand.operand_type,
                operand.param,
                join_values(operand.values().iter().copied())
            );
        }
    }

    out
}

fn unit_token(unit: LensUnit) -> &'static str {
    match unit {
        LensUnit::Millimeters => "MM",
        LensUnit::Centimeters => "CM",
        LensUnit::Inches => "IN",
        LensUnit::Meters => "M",
    }
}

fn ray_aiming_code(method: RayAimingMethod) -> u8 {
    match method {
        RayAimingMethod::Off => 0,
        RayAimingMethod::Paraxial => 1,
        RayAimingMethod::Real => 2,
    }
}

fn field_type_code(field_type: FieldType) -> u8 {
    match field_type {
        FieldType::Angle => 0,
        FieldType::RealImageHeight => 3,
    }
}

fn surface_type_token(surface_type: SurfaceType) -> &'static str {
    match surface_type {
        SurfaceType::Standard => "STANDARD",
        SurfaceType::ExtendedOddAsphere => "XOSPHERE",
    }
}

fn curvature(radius: f64) -> f64 {
    if radius.is_finite() && radius != 0.0 {
        1.0 / radius
    } else {
        0.0
    }
}

fn fmt_distance(value: f64) -> String {
    if value.is_infinite() {
        "INFINITY".to_string()
    } else {
        fmt_value(value)
    }
}

fn fmt_value(value: f64) -> String {
    format!("{}", value)
}

fn join_values(values: impl Iterator<Item = f64>) -> String {
    values.map(fmt_value).collect::<Vec<_>>().join(" ")
}
