//! Configuration types for the GSLib joint converter.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::columns::ColumnSpec;
use crate::core::transforms::{IndexOffsets, JointColumns};

/// Required extension of input files.
pub const GSLIB_EXTENSION: &str = "gslib";

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("input file '{0}' must have the .gslib extension")]
    InvalidExtension(PathBuf),

    #[error("{name} value {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Conversion options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Source GSLib point file
    #[serde(default = "default_input_file")]
    pub input_gslib_file: PathBuf,

    /// Destination joint file (parent directories are created)
    #[serde(default = "default_output_file")]
    pub output_gslib_file: PathBuf,

    #[serde(default)]
    pub i_offset: u32,

    #[serde(default)]
    pub j_offset: u32,

    #[serde(default)]
    pub k_offset: u32,

    /// Dip angle in degrees, 0 to 90
    #[serde(default)]
    pub dip_angle: ColumnSpec,

    /// Strike angle in degrees, 0 to 360
    #[serde(default)]
    pub strike_angle: ColumnSpec,

    /// Normal stiffness
    #[serde(rename = "KN", default = "default_kn")]
    pub kn: ColumnSpec,

    /// Shear stiffness
    #[serde(rename = "KS", default = "default_ks")]
    pub ks: ColumnSpec,
}

fn default_input_file() -> PathBuf {
    PathBuf::from("input.gslib")
}

fn default_output_file() -> PathBuf {
    PathBuf::from("output.gslib")
}

fn default_kn() -> ColumnSpec {
    ColumnSpec::Constant(8_000_000.0)
}

fn default_ks() -> ColumnSpec {
    ColumnSpec::Constant(4_000_000.0)
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            input_gslib_file: default_input_file(),
            output_gslib_file: default_output_file(),
            i_offset: 0,
            j_offset: 0,
            k_offset: 0,
            dip_angle: ColumnSpec::default(),
            strike_angle: ColumnSpec::default(),
            kn: default_kn(),
            ks: default_ks(),
        }
    }
}

fn check_range(name: &'static str, spec: &ColumnSpec, min: f64, max: f64) -> Result<(), ConfigError> {
    match spec.values().find(|v| !(min..=max).contains(v)) {
        Some(value) => Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        }),
        None => Ok(()),
    }
}

impl ConvertConfig {
    pub fn offsets(&self) -> IndexOffsets {
        IndexOffsets::new(self.i_offset, self.j_offset, self.k_offset)
    }

    pub fn columns(&self) -> JointColumns {
        JointColumns {
            dip_angle: self.dip_angle.clone(),
            strike_angle: self.strike_angle.clone(),
            kn: self.kn.clone(),
            ks: self.ks.clone(),
        }
    }

    /// Check the input extension and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_extension = self
            .input_gslib_file
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(GSLIB_EXTENSION));
        if !has_extension {
            return Err(ConfigError::InvalidExtension(self.input_gslib_file.clone()));
        }

        check_range("dip_angle", &self.dip_angle, 0.0, 90.0)?;
        check_range("strike_angle", &self.strike_angle, 0.0, 360.0)?;
        check_range("KN", &self.kn, 0.0, f64::MAX)?;
        check_range("KS", &self.ks, 0.0, f64::MAX)?;
        Ok(())
    }
}

/// Colormap used to color points by attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colormap {
    #[default]
    Viridis,
    Gray,
}

/// Presentation parameters for the 3D scatter plot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Render a plot after conversion
    #[serde(default = "default_plot_enabled")]
    pub enabled: bool,

    /// PNG path; defaults to the output file with a .png extension
    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default = "default_plot_title")]
    pub title: String,

    /// Label of the color scale
    #[serde(default = "default_color_label")]
    pub color_label: String,

    #[serde(default)]
    pub colormap: Colormap,

    /// Marker area in pt^2
    #[serde(default = "default_point_size")]
    pub point_size: f64,

    /// Point opacity (0.0 to 1.0)
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    #[serde(default = "default_plot_width")]
    pub width: u32,

    #[serde(default = "default_plot_height")]
    pub height: u32,
}

fn default_plot_enabled() -> bool {
    true
}

fn default_plot_title() -> String {
    "3D Point Cloud - Color Coded by P-Velocity".to_string()
}

fn default_color_label() -> String {
    "P-Velocity".to_string()
}

fn default_point_size() -> f64 {
    50.0
}

fn default_alpha() -> f64 {
    0.6
}

fn default_plot_width() -> u32 {
    1280
}

fn default_plot_height() -> u32 {
    960
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            enabled: default_plot_enabled(),
            output: None,
            title: default_plot_title(),
            color_label: default_color_label(),
            colormap: Colormap::default(),
            point_size: default_point_size(),
            alpha: default_alpha(),
            width: default_plot_width(),
            height: default_plot_height(),
        }
    }
}

impl PlotConfig {
    /// PNG path for a given joint file.
    pub fn output_for(&self, gslib_output: &Path) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let mut path = gslib_output.to_path_buf();
            path.set_extension("png");
            path
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ConfigError::OutOfRange {
                name: "alpha",
                value: self.alpha,
                min: 0.0,
                max: 1.0,
            });
        }
        if self.point_size.is_nan() || self.point_size <= 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "point_size",
                value: self.point_size,
                min: f64::MIN_POSITIVE,
                max: f64::MAX,
            });
        }
        Ok(())
    }
}

/// Main configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub convert: ConvertConfig,

    #[serde(default)]
    pub plot: PlotConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.convert.validate()?;
        if self.plot.enabled {
            self.plot.validate()?;
        }
        Ok(())
    }
}
