//! GSLib point file loader.
//!
//! A GSLib file is plain text:
//! - line 1: title
//! - line 2: number of variables `n`
//! - next `n` lines: variable names
//! - remaining lines: whitespace-separated data rows
//!
//! Rows must carry at least seven tokens: `i j k x y z attribute`. Tokens past
//! the seventh are ignored.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

/// Minimum number of tokens in a data row.
pub const MIN_ROW_TOKENS: usize = 7;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("input file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("format error at line {line}: {message}")]
    Format { line: usize, message: String },
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// One data row of a GSLib point file.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    pub i: i64,
    pub j: i64,
    pub k: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Seventh token, kept verbatim.
    pub attribute: String,
    /// 1-based line number in the source file.
    pub line: usize,
}

/// Parsed GSLib point file.
#[derive(Debug, Clone)]
pub struct GslibDocument {
    pub title: String,
    pub declared_variable_count: usize,
    pub variable_names: Vec<String>,
    pub rows: Vec<DataRow>,
}

impl GslibDocument {
    /// Returns the number of data rows.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the document has no data rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Container for 3D points with their raw attribute values.
///
/// Filled in row order by the converter and handed to the plotter.
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    /// X coordinates of all points.
    pub x: Vec<f64>,
    /// Y coordinates of all points.
    pub y: Vec<f64>,
    /// Z coordinates of all points.
    pub z: Vec<f64>,
    /// Raw attribute token of each point, used as the color value.
    pub attributes: Vec<String>,
}

impl PointCloud {
    /// Creates a new empty point cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new point cloud with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
            z: Vec::with_capacity(capacity),
            attributes: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Adds a point with its attribute.
    pub fn push(&mut self, x: f64, y: f64, z: f64, attribute: &str) {
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
        self.attributes.push(attribute.to_string());
    }

    /// Attribute values parsed as numbers; `None` where a token is not numeric.
    pub fn numeric_attributes(&self) -> Vec<Option<f64>> {
        self.attributes.iter().map(|a| a.parse().ok()).collect()
    }
}

/// Load a GSLib point file from disk.
///
/// # Errors
///
/// Returns [`LoaderError::NotFound`] if the path does not exist and
/// [`LoaderError::Format`] for a bad header or the first malformed row.
pub fn load_gslib<P: AsRef<Path>>(path: P) -> Result<GslibDocument> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoaderError::NotFound(path.to_path_buf()),
        _ => LoaderError::Io(e),
    })?;

    if content.trim().is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    let doc = parse_gslib(&content)?;
    debug!(
        "{}: title '{}', {} variables, {} rows",
        path.display(),
        doc.title,
        doc.declared_variable_count,
        doc.num_rows()
    );
    Ok(doc)
}

/// Parse GSLib text already held in memory.
pub fn parse_gslib(content: &str) -> Result<GslibDocument> {
    let mut lines = content.lines();

    let title = lines
        .next()
        .ok_or_else(|| LoaderError::Format {
            line: 1,
            message: "missing title line".to_string(),
        })?
        .trim()
        .to_string();

    let count_line = lines.next().ok_or_else(|| LoaderError::Format {
        line: 2,
        message: "missing variable count".to_string(),
    })?;
    let declared_variable_count: usize =
        count_line.trim().parse().map_err(|_| LoaderError::Format {
            line: 2,
            message: format!("invalid variable count '{}'", count_line.trim()),
        })?;

    let mut variable_names = Vec::with_capacity(declared_variable_count);
    for name in lines.by_ref().take(declared_variable_count) {
        variable_names.push(name.trim().to_string());
    }

    if variable_names.len() < declared_variable_count {
        warn!(
            "header declares {} variables but only {} names are present; no data rows",
            declared_variable_count,
            variable_names.len()
        );
    }

    let first_data_line = 3 + declared_variable_count;
    let mut rows = Vec::new();
    for (offset, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(line, first_data_line + offset)?);
    }

    Ok(GslibDocument {
        title,
        declared_variable_count,
        variable_names,
        rows,
    })
}

/// Parse one data line. `line_no` is 1-based and only used in errors.
pub fn parse_row(line: &str, line_no: usize) -> Result<DataRow> {
    let values: Vec<&str> = line.split_whitespace().collect();

    if values.len() < MIN_ROW_TOKENS {
        return Err(LoaderError::Format {
            line: line_no,
            message: format!(
                "expected at least {} values, found {}",
                MIN_ROW_TOKENS,
                values.len()
            ),
        });
    }

    let int_at = |idx: usize, name: &str| -> Result<i64> {
        values[idx].parse().map_err(|_| LoaderError::Format {
            line: line_no,
            message: format!("invalid {} value: {}", name, values[idx]),
        })
    };
    let float_at = |idx: usize, name: &str| -> Result<f64> {
        values[idx].parse().map_err(|_| LoaderError::Format {
            line: line_no,
            message: format!("invalid {} value: {}", name, values[idx]),
        })
    };

    Ok(DataRow {
        i: int_at(0, "i_index")?,
        j: int_at(1, "j_index")?,
        k: int_at(2, "k_index")?,
        x: float_at(3, "x")?,
        y: float_at(4, "y")?,
        z: float_at(5, "z")?,
        attribute: values[6].to_string(),
        line: line_no,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
Velocity model
7
i
j
k
x
y
z
P-Velocity
1 2 3 10.0 20.0 30.0 5500.0
4 5 6 11.5 21.5 31.5 5600.0
";

    #[test]
    fn test_parse_header_and_rows() {
        let doc = parse_gslib(SAMPLE).unwrap();
        assert_eq!(doc.title, "Velocity model");
        assert_eq!(doc.declared_variable_count, 7);
        assert_eq!(doc.variable_names[6], "P-Velocity");
        assert_eq!(doc.num_rows(), 2);

        let row = &doc.rows[1];
        assert_eq!((row.i, row.j, row.k), (4, 5, 6));
        assert_eq!((row.x, row.y, row.z), (11.5, 21.5, 31.5));
        assert_eq!(row.attribute, "5600.0");
        assert_eq!(row.line, 11);
    }

    #[test]
    fn test_blank_lines_skipped() {
        let text = "t\n1\nv\n\n1 1 1 0 0 0 a\n   \n2 2 2 1 1 1 b\n\n";
        let doc = parse_gslib(text).unwrap();
        assert_eq!(doc.num_rows(), 2);
        assert_eq!(doc.rows[0].line, 5);
        assert_eq!(doc.rows[1].line, 7);
        assert_eq!(doc.rows[1].attribute, "b");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let text = "t\n9\na\nb\nc\nd\ne\nf\ng\nh\ni\n1 2 3 4.0 5.0 6.0 7.0 8.0 9.0\n";
        let doc = parse_gslib(text).unwrap();
        assert_eq!(doc.num_rows(), 1);
        assert_eq!(doc.rows[0].attribute, "7.0");
    }

    #[test]
    fn test_title_is_trimmed() {
        let doc = parse_gslib("  My title \r\n0\n").unwrap();
        assert_eq!(doc.title, "My title");
        assert!(doc.is_empty());
    }

    #[test]
    fn test_invalid_variable_count() {
        let err = parse_gslib("t\nseven\n").unwrap_err();
        assert!(matches!(err, LoaderError::Format { line: 2, .. }));

        let err = parse_gslib("t\n-1\n").unwrap_err();
        assert!(matches!(err, LoaderError::Format { line: 2, .. }));

        let err = parse_gslib("only a title").unwrap_err();
        assert!(matches!(err, LoaderError::Format { line: 2, .. }));
    }

    #[test]
    fn test_truncated_header_has_no_rows() {
        let doc = parse_gslib("t\n5\na\nb\n").unwrap();
        assert_eq!(doc.variable_names.len(), 2);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_short_row_fails() {
        let text = "t\n1\nv\n1 2 3 4.0 5.0\n";
        let err = parse_gslib(text).unwrap_err();
        match err {
            LoaderError::Format { line, message } => {
                assert_eq!(line, 4);
                assert!(message.contains("found 5"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_index_fails() {
        let text = "t\n1\nv\n1 2 3 4 5 6 7\n1.5 2 3 4 5 6 7\n";
        let err = parse_gslib(text).unwrap_err();
        assert!(matches!(err, LoaderError::Format { line: 5, .. }));
    }

    #[test]
    fn test_attribute_not_parsed() {
        let text = "t\n1\nv\n1 2 3 4 5 6 n/a\n";
        let doc = parse_gslib(text).unwrap();
        assert_eq!(doc.rows[0].attribute, "n/a");
    }

    #[test]
    fn test_load_gslib_file() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE).unwrap();
        file.flush().unwrap();

        let doc = load_gslib(file.path())?;
        assert_eq!(doc.num_rows(), 2);
        Ok(())
    }

    #[test]
    fn test_load_gslib_missing_file() {
        let err = load_gslib("/definitely/not/here.gslib").unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn test_load_gslib_empty_file() {
        let file = NamedTempFile::new().unwrap();
        let err = load_gslib(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::EmptyFile(_)));
    }

    #[test]
    fn test_point_cloud_operations() {
        let mut cloud = PointCloud::new();
        assert!(cloud.is_empty());

        cloud.push(1.0, 2.0, 3.0, "5500.0");
        cloud.push(4.0, 5.0, 6.0, "bad");

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.numeric_attributes(), vec![Some(5500.0), None]);
    }
}
