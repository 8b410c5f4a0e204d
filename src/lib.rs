//! GSLib point file to joint file converter.
//!
//! This crate provides tools for:
//! - Loading GSLib point files (title, variable count, names, whitespace rows)
//! - Shifting grid indices and appending dip, strike, KN and KS columns,
//!   each constant or per row
//! - Writing the fixed-width ten-column joint file
//! - Rendering the points as a 3D scatter plot colored by attribute
//!
//! # Example
//!
//! ```no_run
//! use gslib_joints::{processors::converter::convert_gslib, ColumnSpec, ConvertConfig};
//!
//! let config = ConvertConfig {
//!     i_offset: 1,
//!     dip_angle: ColumnSpec::Constant(15.0),
//!     ..ConvertConfig::default()
//! };
//! let cloud = convert_gslib(&config).unwrap();
//! println!("{} rows converted", cloud.len());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{Colormap, ConvertConfig, PipelineConfig, PlotConfig};
pub use crate::core::columns::ColumnSpec;
pub use crate::core::loaders::{DataRow, GslibDocument, PointCloud};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
