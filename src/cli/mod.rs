//! CLI command handlers

pub mod commands;

pub use commands::{import, show, validate};
