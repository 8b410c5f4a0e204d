//! Appended attribute columns.
//!
//! Each of the four joint columns (dip, strike, KN, KS) is either one value
//! shared by every row or a sequence with one value per data row.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while resolving column values.
#[derive(Debug, Error)]
pub enum ColumnError {
    #[error("column '{column}' has {actual} per-row values but the input has {expected} rows")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("failed to read values file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value '{token}' in '{path}' at line {line}")]
    InvalidValue {
        path: PathBuf,
        line: usize,
        token: String,
    },
}

/// Result type for column operations.
pub type Result<T> = std::result::Result<T, ColumnError>;

/// Value source for one appended column.
///
/// Deserialized untagged, so a YAML scalar becomes `Constant` and a YAML
/// list becomes `PerRow`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSpec {
    /// Same value for every row.
    Constant(f64),
    /// One value per data row, in row order.
    PerRow(Vec<f64>),
}

impl ColumnSpec {
    /// Value for the data row at `row` (0-based, blank lines not counted).
    ///
    /// Callers must run [`ColumnSpec::check_len`] first; a `PerRow` index
    /// past the end panics.
    #[inline]
    pub fn value_at(&self, row: usize) -> f64 {
        match self {
            ColumnSpec::Constant(value) => *value,
            ColumnSpec::PerRow(values) => values[row],
        }
    }

    /// Ensure a per-row sequence covers exactly `rows` rows.
    pub fn check_len(&self, column: &'static str, rows: usize) -> Result<()> {
        match self {
            ColumnSpec::PerRow(values) if values.len() != rows => Err(ColumnError::LengthMismatch {
                column,
                expected: rows,
                actual: values.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Iterate over every value this column can produce.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        let slice: &[f64] = match self {
            ColumnSpec::Constant(value) => std::slice::from_ref(value),
            ColumnSpec::PerRow(values) => values,
        };
        slice.iter().copied()
    }
}

impl Default for ColumnSpec {
    fn default() -> Self {
        ColumnSpec::Constant(0.0)
    }
}

/// Load a per-row sequence from a text file.
///
/// One number per line. Blank lines and lines starting with `#` are skipped.
pub fn load_column_values<P: AsRef<Path>>(path: P) -> Result<ColumnSpec> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ColumnError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut values = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }
        let value: f64 = token.parse().map_err(|_| ColumnError::InvalidValue {
            path: path.to_path_buf(),
            line: idx + 1,
            token: token.to_string(),
        })?;
        values.push(value);
    }

    Ok(ColumnSpec::PerRow(values))
}
