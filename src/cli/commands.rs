use crate::error::{LensError, LensResult};
use crate::excel::{reader, schema};
use crate::transcribe;
use crate::types::LensData;
use crate::zemax::Connection;
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execute the import command: read, transcribe, save, display.
pub fn import(
    input: PathBuf,
    output: Option<PathBuf>,
    zemax_root: Option<PathBuf>,
    verbose: bool,
) -> LensResult<()> {
    println!("{}", "🔬 Lensport - Importing lens data".bold().green());
    println!("   File: {}", input.display());
    let out_path = output.unwrap_or_else(|| derive_output_path(&input));
    println!("   Output: {}", out_path.display());
    println!();

    if verbose {
        println!("{}", "📖 Reading workbook...".cyan());
    }
    let data = reader::read_lens_workbook(&input)?;
    report_warnings(&schema::validate(&data));
    schema::check_required(&data)?;
    if verbose {
        for group in &data.groups {
            println!("   {} ({} rows)", group.label.cyan(), group.row_count());
        }
        println!();
    }

    if verbose {
        println!("{}", "🔌 Connecting to OpticStudio...".cyan());
    }
    let connection = match zemax_root {
        Some(root) => Connection::with_root(root)?,
        None => Connection::discover()?,
    };
    let mut app = connection.create_application()?;
    if verbose {
        println!("   Root: {}", app.root().display());
        println!("   License: {}", app.license_edition());
        println!();
    }

    transcribe::write_lens_data(&data, &mut app, &out_path)?;

    println!("{}", "📋 Lens Data Editor:".bold().cyan());
    println!("{}", transcribe::display::render_lde(app.primary_system()?));
    println!("{} {}", "✅ Saved".bold().green(), out_path.display());
    Ok(())
}

/// Execute the validate command: parse and schema-check each workbook.
pub fn validate(files: Vec<PathBuf>) -> LensResult<()> {
    let mut failures = 0;

    for file in &files {
        println!("{} {}", "🔍 Validating".bold().green(), file.display());
        match validate_one(file) {
            Ok(warnings) => {
                report_warnings(&warnings);
                println!("   {}", "✅ OK".green());
            }
            Err(e) => {
                failures += 1;
                println!("   {} {}", "❌".red(), e.to_string().red());
            }
        }
    }

    if failures > 0 {
        Err(LensError::Validation(format!(
            "{} of {} file(s) failed validation",
            failures,
            files.len()
        )))
    } else {
        Ok(())
    }
}

fn validate_one(file: &Path) -> LensResult<Vec<String>> {
    let data = reader::read_lens_workbook(file)?;
    schema::check_required(&data)?;
    Ok(schema::validate(&data))
}

/// Execute the show command: print the parsed record groups.
pub fn show(file: PathBuf, json: bool) -> LensResult<()> {
    let data = reader::read_lens_workbook(&file)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    print_groups(&data);
    Ok(())
}

fn print_groups(data: &LensData) {
    for group in &data.groups {
        println!(
            "{} ({} rows)",
            group.label.bright_blue().bold(),
            group.row_count()
        );
        println!("   {}", group.columns.join(" | ").cyan());
        for row in 0..group.row_count() {
            let cells: Vec<String> = (0..group.columns.len())
                .map(|col| group.cell_at(row, col).display_text())
                .collect();
            println!("   {}", cells.join(" | "));
        }
        println!();
    }
}

/// Output file next to the input: `lens.xlsx` → `lens_ZemaxImport.zmx`.
fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("lens");
    input.with_file_name(format!("{}_ZemaxImport.zmx", stem))
}

fn report_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("   {} {}", "⚠️".yellow(), warning.yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_output_path() {
        assert_eq!(
            derive_output_path(Path::new("/data/triplet.xlsx")),
            PathBuf::from("/data/triplet_ZemaxImport.zmx")
        );
        assert_eq!(
            derive_output_path(Path::new("patent.xlsx")),
            PathBuf::from("patent_ZemaxImport.zmx")
        );
    }
}
