//! Row transformation from GSLib point rows to joint rows.
//!
//! Indices are shifted by constant offsets, coordinates pass through, and the
//! four joint columns are resolved per row from their [`ColumnSpec`]s.

use thiserror::Error;

use super::columns::{ColumnError, ColumnSpec};
use super::loaders::DataRow;

/// Errors that can occur while transforming rows.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{axis} index {index} + offset {offset} overflows at line {line}")]
    IndexOverflow {
        axis: char,
        index: i64,
        offset: u32,
        line: usize,
    },
}

/// Constant shifts applied to the i, j, k grid indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOffsets {
    pub i: u32,
    pub j: u32,
    pub k: u32,
}

impl IndexOffsets {
    pub fn new(i: u32, j: u32, k: u32) -> Self {
        Self { i, j, k }
    }
}

/// The four appended joint columns.
#[derive(Debug, Clone, PartialEq)]
pub struct JointColumns {
    pub dip_angle: ColumnSpec,
    pub strike_angle: ColumnSpec,
    pub kn: ColumnSpec,
    pub ks: ColumnSpec,
}

impl JointColumns {
    /// Column names paired with their specs, in output order.
    pub fn named(&self) -> [(&'static str, &ColumnSpec); 4] {
        [
            ("dip_angle", &self.dip_angle),
            ("strike_angle", &self.strike_angle),
            ("KN", &self.kn),
            ("KS", &self.ks),
        ]
    }

    /// Check every per-row column against the data row count.
    pub fn check_len(&self, rows: usize) -> Result<(), ColumnError> {
        for (name, spec) in self.named() {
            spec.check_len(name, rows)?;
        }
        Ok(())
    }
}

/// One output row of the joint file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointRow {
    pub i: i64,
    pub j: i64,
    pub k: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub dip_angle: f64,
    pub strike_angle: f64,
    pub kn: f64,
    pub ks: f64,
}

fn shift(axis: char, index: i64, offset: u32, line: usize) -> Result<i64, TransformError> {
    index
        .checked_add(i64::from(offset))
        .ok_or(TransformError::IndexOverflow {
            axis,
            index,
            offset,
            line,
        })
}

/// Transform the data row at position `row_idx`.
///
/// `row_idx` counts data rows only and indexes into per-row column specs,
/// whose lengths must already have been checked.
pub fn transform_row(
    row: &DataRow,
    row_idx: usize,
    offsets: &IndexOffsets,
    columns: &JointColumns,
) -> Result<JointRow, TransformError> {
    Ok(JointRow {
        i: shift('i', row.i, offsets.i, row.line)?,
        j: shift('j', row.j, offsets.j, row.line)?,
        k: shift('k', row.k, offsets.k, row.line)?,
        x: row.x,
        y: row.y,
        z: row.z,
        dip_angle: columns.dip_angle.value_at(row_idx),
        strike_angle: columns.strike_angle.value_at(row_idx),
        kn: columns.kn.value_at(row_idx),
        ks: columns.ks.value_at(row_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(i: i64, j: i64, k: i64) -> DataRow {
        DataRow {
            i,
            j,
            k,
            x: 10.0,
            y: 20.0,
            z: 30.0,
            attribute: "5500.0".to_string(),
            line: 10,
        }
    }

    fn constant_columns() -> JointColumns {
        JointColumns {
            dip_angle: ColumnSpec::Constant(15.0),
            strike_angle: ColumnSpec::Constant(90.0),
            kn: ColumnSpec::Constant(8_000_000.0),
            ks: ColumnSpec::Constant(4_000_000.0),
        }
    }

    #[test]
    fn test_offsets_applied() {
        let out = transform_row(&row(1, 2, 3), 0, &IndexOffsets::new(1, 10, 100), &constant_columns())
            .unwrap();
        assert_eq!((out.i, out.j, out.k), (2, 12, 103));
        assert_eq!((out.x, out.y, out.z), (10.0, 20.0, 30.0));
    }

    #[test]
    fn test_zero_offsets_identity() {
        let out = transform_row(&row(-4, 0, 7), 0, &IndexOffsets::default(), &constant_columns())
            .unwrap();
        assert_eq!((out.i, out.j, out.k), (-4, 0, 7));
    }

    #[test]
    fn test_per_row_columns_indexed_by_row() {
        let mut columns = constant_columns();
        columns.dip_angle = ColumnSpec::PerRow(vec![5.0, 45.0]);
        columns.ks = ColumnSpec::PerRow(vec![1.0, 2.0]);

        let out = transform_row(&row(1, 1, 1), 1, &IndexOffsets::default(), &columns).unwrap();
        assert_eq!(out.dip_angle, 45.0);
        assert_eq!(out.strike_angle, 90.0);
        assert_eq!(out.kn, 8_000_000.0);
        assert_eq!(out.ks, 2.0);
    }

    #[test]
    fn test_index_overflow() {
        let err = transform_row(&row(i64::MAX, 0, 0), 0, &IndexOffsets::new(1, 0, 0), &constant_columns())
            .unwrap_err();
        assert!(matches!(err, TransformError::IndexOverflow { axis: 'i', line: 10, .. }));
    }

    #[test]
    fn test_columns_check_len() {
        let mut columns = constant_columns();
        assert!(columns.check_len(3).is_ok());

        columns.kn = ColumnSpec::PerRow(vec![1.0, 2.0]);
        let err = columns.check_len(3).unwrap_err();
        assert!(matches!(err, ColumnError::LengthMismatch { column: "KN", .. }));
    }
}
