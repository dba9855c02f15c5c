//! Lensport - Excel patent data to Zemax OpticStudio
//!
//! This library reads lens-prescription data from a patent workbook
//! (typed blocks keyed by a column-A label) and transcribes it into an
//! optical design document, saved as a native lens file.
//!
//! # Features
//!
//! - Block-structured workbook reader (META / SURF / ASPH / CONF / WAVE)
//! - Schema allow-lists with non-fatal warnings for unknown keys
//! - Surface table, stop, glass catalogs, wavelengths, aperture, fields
//! - Multi-configuration operands (f-number, field height, thickness)
//!
//! # Example
//!
//! ```no_run
//! use lensport::excel::read_lens_workbook;
//! use lensport::transcribe::write_lens_data;
//! use lensport::zemax::Connection;
//! use std::path::Path;
//!
//! let data = read_lens_workbook("triplet.xlsx")?;
//! let mut app = Connection::discover()?.create_application()?;
//! write_lens_data(&data, &mut app, Path::new("triplet_ZemaxImport.zmx"))?;
//! # Ok::<(), lensport::error::LensError>(())
//! ```

pub mod cli;
pub mod error;
pub mod excel;
pub mod markers;
pub mod transcribe;
pub mod types;
pub mod zemax;

// Re-export commonly used types
pub use error::{LensError, LensResult};
pub use types::{Cell, LensData, RecordGroup};
