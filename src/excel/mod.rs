//! Excel import for lens patent workbooks
//!
//! The workbook is a flat sheet: column A carries a block label (`META`,
//! `SURF`, `ASPH`, `CONF`, `WAVE`); the first row bearing a label carries
//! that block's column headers, the following rows its data.

pub mod reader;
pub mod schema;

pub use reader::read_lens_workbook;
pub use schema::validate;
