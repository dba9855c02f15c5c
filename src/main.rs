use clap::{Parser, Subcommand};
use lensport::cli;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lensport")]
#[command(about = "Import lens prescriptions from Excel patent tables into OpticStudio lens files")]
#[command(long_about = "Lensport - Excel patent data to Zemax OpticStudio

Reads a patent workbook (META / SURF / ASPH / CONF / WAVE blocks keyed by
column A) and transcribes it into a lens file: surfaces, stop, glass
catalogs, wavelengths, aperture, fields and multi-configuration operands.

WORKBOOK LAYOUT:
  Column A carries the block label. The first row of each label holds that
  block's column headers; the following rows hold its data.

  META  lens_unit
  SURF  surf_num | r | d | nd | vd | cir
  ASPH  surf_num | ka | A_4 | A_6 | ...
  CONF  name | config_1 | config_2 | ...
  WAVE  wave_num | wavelength_nm | weight

MARKERS (case-insensitive substrings):
  _STO in a surf_num flags the aperture stop
  _C   in a wave_num flags the primary wavelength
  fno / y_<field> / d_<surface> name the CONF operand rows

EXAMPLES:
  lensport import triplet.xlsx                # writes triplet_ZemaxImport.zmx
  lensport import triplet.xlsx -o out.zmx --verbose
  lensport validate triplet.xlsx wide_angle.xlsx
  lensport show triplet.xlsx --json")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Read a patent workbook and write an OpticStudio lens file.

Connects to the local OpticStudio installation (a valid license is
required), transcribes the workbook into a fresh system and saves it.
The resulting surface table is printed for verification.

The installation root is resolved from --zemax-root, the ZEMAX_ROOT
environment variable, or the default install paths, in that order.")]
    /// Read a patent workbook and write an OpticStudio lens file
    Import {
        /// Path to the Excel workbook (.xlsx)
        file: PathBuf,

        /// Output lens file (default: <file>_ZemaxImport.zmx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// OpticStudio installation root
        #[arg(long, env = "ZEMAX_ROOT")]
        zemax_root: Option<PathBuf>,

        /// Show verbose import steps
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check workbook structure without connecting to OpticStudio
    Validate {
        /// Path to workbook(s) to validate
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the parsed record groups
    Show {
        /// Path to the Excel workbook (.xlsx)
        file: PathBuf,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            file,
            output,
            zemax_root,
            verbose,
        } => cli::import(file, output, zemax_root, verbose)?,

        Commands::Validate { files } => cli::validate(files)?,

        Commands::Show { file, json } => cli::show(file, json)?,
    }

    Ok(())
}
