//! Read-back rendering of the surface table
//!
//! Not required for transcription correctness; the CLI prints this after
//! an import so the result can be eyeballed against the source sheet.

use crate::zemax::system::OpticalSystem;

const HEADERS: [&str; 10] = [
    "#",
    "surftype",
    "comment",
    "radius",
    "thickness",
    "material",
    "clearSD",
    "chip",
    "mechSD",
    "conic",
];

/// Render the surface table as an aligned text grid.
pub fn render_lde(system: &OpticalSystem) -> String {
    let rows: Vec<[String; 10]> = system
        .surfaces()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            [
                i.to_string(),
                s.surface_type.to_string(),
                s.comment.clone(),
                format_number(s.radius),
                format_number(s.thickness),
                s.material.to_string(),
                format_number(s.semi_diameter),
                format_number(s.chip_zone),
                format_number(s.mechanical_semi_diameter),
                format_number(s.conic),
            ]
        })
        .collect();

    let mut widths: [usize; 10] = HEADERS.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    render_row(&mut out, &HEADERS.map(String::from), &widths);
    for row in &rows {
        render_row(&mut out, row, &widths);
    }
    out
}

fn render_row(out: &mut String, cells: &[String; 10], widths: &[usize; 10]) {
    let line = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, &width)| format!("{:<width$}", cell))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Format a value for display, rounded to four decimals with trailing
/// zeros removed.
fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let rounded = (n * 1e4).round() / 1e4;
    format!("{:.4}", rounded)
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number_integer() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-5.0), "-5");
    }

    #[test]
    fn test_format_number_rounds_to_four_decimals() {
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.123456), "0.1235");
        assert_eq!(format_number(1.10), "1.1");
    }

    #[test]
    fn test_format_number_infinite() {
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_render_lde_contains_surfaces() {
        let mut system = OpticalSystem::new();
        let stop = system.surface_mut(1).unwrap();
        stop.comment = "1_STO".to_string();
        stop.radius = 10.0;
        stop.thickness = 5.0;
        stop.set_material("N-BK7");

        let table = render_lde(&system);
        let lines: Vec<&str> = table.lines().collect();
        // Header plus one line per surface
        assert_eq!(lines.len(), 1 + system.num_surfaces());
        assert!(lines[0].starts_with("#"));
        assert!(lines[2].contains("1_STO"));
        assert!(lines[2].contains("N-BK7"));
        assert!(lines[1].contains("Infinity"));
    }
}
