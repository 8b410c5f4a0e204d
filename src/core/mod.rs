//! Core data types and I/O operations.

pub mod columns;
pub mod loaders;
pub mod transforms;
pub mod writers;

pub use columns::{ColumnError, ColumnSpec};
pub use loaders::{load_gslib, parse_gslib, DataRow, GslibDocument, LoaderError, PointCloud};
pub use transforms::{IndexOffsets, JointColumns, JointRow, TransformError};
pub use writers::{format_joint_row, GslibJointWriter, WriteError, OUTPUT_COLUMNS};
