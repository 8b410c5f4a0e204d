//! Data processing modules.

pub mod converter;

pub use converter::{convert_gslib, run_pipeline, ConversionSummary, ConvertError};
