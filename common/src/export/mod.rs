//! Export core modules shared by the CLI log writers.

#[cfg(feature = "excel")]
pub mod excel_core;
