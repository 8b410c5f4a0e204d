//! GSLib point file to joint file conversion.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use thiserror::Error;

use crate::config::{ConvertConfig, PipelineConfig};
use crate::core::columns::ColumnError;
use crate::core::loaders::{self, LoaderError, PointCloud};
use crate::core::transforms::{self, TransformError};
use crate::core::writers::{GslibJointWriter, WriteError};
use crate::visualization::{self, VisualizationError};

/// Errors that can occur during conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Load(#[from] LoaderError),

    #[error(transparent)]
    Column(#[from] ColumnError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Outcome of a pipeline run.
#[derive(Debug, Clone)]
pub struct ConversionSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub rows: usize,
    pub plot: Option<PathBuf>,
}

/// Convert a GSLib point file into a joint file.
///
/// Reads `config.input_gslib_file`, shifts the i/j/k indices by the
/// configured offsets, keeps the coordinates, drops the remaining source
/// columns and appends dip, strike, KN and KS. The result is written to
/// `config.output_gslib_file`.
///
/// The whole input is parsed and every per-row column is checked against the
/// row count before the output file is opened, so a malformed input or a
/// short sequence leaves any existing output untouched.
///
/// # Returns
///
/// The coordinates and raw attribute of every row, in row order.
pub fn convert_gslib(config: &ConvertConfig) -> std::result::Result<PointCloud, ConvertError> {
    let doc = loaders::load_gslib(&config.input_gslib_file)?;
    let offsets = config.offsets();
    let columns = config.columns();

    columns.check_len(doc.num_rows())?;

    info!(
        "Converting {} rows from {} ({} source variables)",
        doc.num_rows(),
        config.input_gslib_file.display(),
        doc.declared_variable_count
    );

    let mut writer = GslibJointWriter::create(&config.output_gslib_file, &doc.title)?;
    let mut cloud = PointCloud::with_capacity(doc.num_rows());

    for (row_idx, row) in doc.rows.iter().enumerate() {
        let joint = transforms::transform_row(row, row_idx, &offsets, &columns)?;
        writer.write_row(&joint)?;
        cloud.push(row.x, row.y, row.z, &row.attribute);
    }

    let written = writer.finish()?;
    debug!("{}: wrote {} rows", config.output_gslib_file.display(), written);

    Ok(cloud)
}

/// Validate the configuration, convert, then plot.
///
/// An empty input produces a header-only joint file and skips the plot, as
/// does an input where no row has finite coordinates.
pub fn run_pipeline(config: &PipelineConfig) -> Result<ConversionSummary> {
    config.validate().context("Invalid configuration")?;

    let convert = &config.convert;
    let cloud = convert_gslib(convert).with_context(|| {
        format!(
            "Failed to convert {} to {}",
            convert.input_gslib_file.display(),
            convert.output_gslib_file.display()
        )
    })?;

    let plot = if !config.plot.enabled {
        None
    } else if cloud.is_empty() {
        warn!("No data rows in {}; skipping plot", convert.input_gslib_file.display());
        None
    } else {
        let png = config.plot.output_for(&convert.output_gslib_file);
        match visualization::plot_3d_scatter(&png, &cloud, &config.plot) {
            Ok(()) => {
                info!("Plot written to {}", png.display());
                Some(png)
            }
            Err(VisualizationError::NoFinitePoints) => {
                warn!("No row of {} has finite coordinates; skipping plot", convert.input_gslib_file.display());
                None
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to plot {}", png.display())),
        }
    };

    Ok(ConversionSummary {
        input: convert.input_gslib_file.clone(),
        output: convert.output_gslib_file.clone(),
        rows: cloud.len(),
        plot,
    })
}
