//! Fixed-width writer for GSLib joint files.
//!
//! The output always declares ten variables:
//! `i_index j_index k_index x_coord y_coord z_coord dip_angle strike_angle KN KS`.
//! Rows are streamed through a buffered writer as they are produced.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::transforms::JointRow;

/// Output variable names, in column order.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "i_index",
    "j_index",
    "k_index",
    "x_coord",
    "y_coord",
    "z_coord",
    "dip_angle",
    "strike_angle",
    "KN",
    "KS",
];

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write data to file.
    #[error("failed to write to file '{path}': {source}")]
    WriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Format one joint row with the fixed column widths.
///
/// Indices take 6 characters, coordinates 18 with 7 decimals, angles 13 with
/// 7 decimals and stiffnesses 14 rounded to whole numbers.
pub fn format_joint_row(row: &JointRow) -> String {
    format!(
        "{:6} {:6} {:6} {:18.7} {:18.7} {:18.7} {:13.7} {:13.7} {:14.0} {:14.0}",
        row.i,
        row.j,
        row.k,
        row.x,
        row.y,
        row.z,
        row.dip_angle,
        row.strike_angle,
        row.kn,
        row.ks
    )
}

/// Streaming writer for a GSLib joint file.
pub struct GslibJointWriter {
    writer: BufWriter<File>,
    path: PathBuf,
    rows_written: usize,
}

impl GslibJointWriter {
    /// Create (or overwrite) `path` and write the header.
    ///
    /// Parent directories are created if needed.
    pub fn create(path: &Path, title: &str) -> Result<Self> {
        ensure_parent_dirs(path)?;
        let file = File::create(path).map_err(|e| WriteError::CreateFile {
            path: path.display().to_string(),
            source: e,
        })?;

        let mut out = Self {
            writer: BufWriter::new(file),
            path: path.to_path_buf(),
            rows_written: 0,
        };
        out.write_header(title)?;
        Ok(out)
    }

    fn write_header(&mut self, title: &str) -> Result<()> {
        self.write_line(title)?;
        self.write_line(&OUTPUT_COLUMNS.len().to_string())?;
        for name in OUTPUT_COLUMNS {
            self.write_line(name)?;
        }
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line).map_err(|e| WriteError::WriteFile {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    /// Append one data row.
    pub fn write_row(&mut self, row: &JointRow) -> Result<()> {
        let line = format_joint_row(row);
        self.write_line(&line)?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush buffered output and return the number of rows written.
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush().map_err(|e| WriteError::WriteFile {
            path: self.path.display().to_string(),
            source: e,
        })?;
        Ok(self.rows_written)
    }
}
