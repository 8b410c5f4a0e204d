//! Visualization tools for converted point data.
//!
//! Renders a 3D scatter plot of the points, colored by their attribute value,
//! with a color scale bar, and saves it as PNG using the plotters library.

use std::ops::Range;
use std::path::Path;

use log::debug;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::{Colormap, PlotConfig};
use crate::core::loaders::PointCloud;
use crate::core::writers::ensure_parent_dirs;

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Empty point cloud")]
    EmptyPointCloud,

    #[error("No point has finite coordinates")]
    NoFinitePoints,

    #[error("The {0} range is too wide to plot")]
    RangeOverflow(&'static str),
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Width of the color scale area in pixels.
const COLOR_BAR_WIDTH: u32 = 160;

/// Number of bands drawn in the color scale.
const COLOR_BAR_STEPS: usize = 128;

/// Color for points whose attribute is not a finite number.
const MISSING_COLOR: (u8, u8, u8) = (128, 128, 128);

/// Viridis control points, evenly spaced over [0, 1].
const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

fn plot_err<E: std::fmt::Display>(e: E) -> VisualizationError {
    VisualizationError::PlottingError(e.to_string())
}

/// Map a normalized value in [0, 1] to an RGB triple.
pub fn colormap_rgb(colormap: Colormap, t: f64) -> (u8, u8, u8) {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    match colormap {
        Colormap::Gray => {
            let v = (t * 255.0).round() as u8;
            (v, v, v)
        }
        Colormap::Viridis => {
            let scaled = t * (VIRIDIS.len() - 1) as f64;
            let lo = scaled.floor() as usize;
            let hi = (lo + 1).min(VIRIDIS.len() - 1);
            let frac = scaled - lo as f64;
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
            let (a, b) = (VIRIDIS[lo], VIRIDIS[hi]);
            (lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
        }
    }
}

/// Pixel radius for a marker area given in pt^2.
pub fn marker_radius(point_size: f64) -> i32 {
    ((point_size.max(0.0).sqrt() / 2.0).round() as i32).max(1)
}

/// Min and max of the finite values, or `None` if there are none.
pub fn value_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    values
        .iter()
        .flatten()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Widen `[lo, hi]` when it is flat and reject spans that overflow `f64`.
fn widened(lo: f64, hi: f64) -> Option<(f64, f64)> {
    let (lo, hi) = if hi - lo < f64::EPSILON {
        let half = (lo.abs() * 0.05).max(1.0);
        (lo - half, hi + half)
    } else {
        (lo, hi)
    };
    (hi - lo).is_finite().then_some((lo, hi))
}

/// Axis range covering the finite `values` with 5% padding on each side.
///
/// A degenerate range is widened around its value. Returns `None` when no
/// value is finite or the padded span does not fit in an `f64`.
pub fn padded_range(values: &[f64]) -> Option<Range<f64>> {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })?;
    let (lo, hi) = widened(lo, hi)?;
    let padding = (hi - lo) * 0.05;
    let (start, end) = (lo - padding, hi + padding);
    (end - start).is_finite().then_some(start..end)
}

/// Range mapped onto the colormap, `[0, 1]` when no attribute is numeric.
pub fn color_range(values: &[Option<f64>]) -> Option<(f64, f64)> {
    match value_range(values) {
        Some((lo, hi)) => widened(lo, hi),
        None => Some((0.0, 1.0)),
    }
}

/// Plot a 3D scatter of a point cloud colored by attribute and save as PNG.
///
/// The z coordinate is drawn on the vertical axis. Attributes that do not
/// parse as finite numbers are drawn in gray.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image (parent directories are created)
/// * `cloud` - Points and their raw attribute values
/// * `style` - Title, color label, colormap, point size, opacity and image size
pub fn plot_3d_scatter(output_path: &Path, cloud: &PointCloud, style: &PlotConfig) -> Result<()> {
    if cloud.is_empty() {
        return Err(VisualizationError::EmptyPointCloud);
    }

    let plotted: Vec<usize> = (0..cloud.len())
        .filter(|&i| cloud.x[i].is_finite() && cloud.y[i].is_finite() && cloud.z[i].is_finite())
        .collect();
    if plotted.len() < cloud.len() {
        debug!(
            "{} of {} points have non-finite coordinates and are not plotted",
            cloud.len() - plotted.len(),
            cloud.len()
        );
    }
    if plotted.is_empty() {
        return Err(VisualizationError::NoFinitePoints);
    }

    let numeric = cloud.numeric_attributes();
    let values: Vec<Option<f64>> = plotted.iter().map(|&i| numeric[i]).collect();
    let missing = values.iter().filter(|v| !v.is_some_and(f64::is_finite)).count();
    if missing > 0 {
        debug!("{} of {} attribute values are not numeric", missing, values.len());
    }

    let (v_min, v_max) = color_range(&values).ok_or(VisualizationError::RangeOverflow("attribute"))?;

    let column = |axis: &[f64]| -> Vec<f64> { plotted.iter().map(|&i| axis[i]).collect() };
    let x_range = padded_range(&column(&cloud.x)).ok_or(VisualizationError::RangeOverflow("x"))?;
    let y_range = padded_range(&column(&cloud.y)).ok_or(VisualizationError::RangeOverflow("y"))?;
    let z_range = padded_range(&column(&cloud.z)).ok_or(VisualizationError::RangeOverflow("z"))?;

    let alpha = style.alpha.clamp(0.0, 1.0);
    let radius = marker_radius(style.point_size);

    let points: Vec<((f64, f64, f64), RGBAColor)> = plotted
        .iter()
        .zip(&values)
        .map(|(&i, value)| {
            let (r, g, b) = match value {
                Some(v) if v.is_finite() => colormap_rgb(style.colormap, (v - v_min) / (v_max - v_min)),
                _ => MISSING_COLOR,
            };
            ((cloud.x[i], cloud.z[i], cloud.y[i]), RGBAColor(r, g, b, alpha))
        })
        .collect();

    ensure_parent_dirs(output_path).map_err(plot_err)?;

    let root = BitMapBackend::new(output_path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let bar_split = style.width.saturating_sub(COLOR_BAR_WIDTH);
    let (main_area, bar_area) = root.split_horizontally(bar_split);

    let mut chart = ChartBuilder::on(&main_area)
        .caption(&style.title, ("sans-serif", 24))
        .margin(20)
        .build_cartesian_3d(x_range, z_range, y_range)
        .map_err(plot_err)?;

    chart.with_projection(|mut pb| {
        pb.pitch = 0.4;
        pb.yaw = 0.6;
        pb.scale = 0.8;
        pb.into_matrix()
    });

    chart
        .configure_axes()
        .light_grid_style(BLACK.mix(0.1))
        .max_light_lines(3)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|(coord, color)| Circle::new(*coord, radius, color.filled())),
        )
        .map_err(plot_err)?;

    draw_color_bar(&bar_area, style, v_min, v_max)?;

    root.present().map_err(plot_err)?;

    Ok(())
}

fn draw_color_bar(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    style: &PlotConfig,
    v_min: f64,
    v_max: f64,
) -> Result<()> {
    let mut bar = ChartBuilder::on(area)
        .margin(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, v_min..v_max)
        .map_err(plot_err)?;

    bar.configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .disable_x_axis()
        .y_desc(style.color_label.as_str())
        .draw()
        .map_err(plot_err)?;

    let step = (v_max - v_min) / COLOR_BAR_STEPS as f64;
    bar.draw_series((0..COLOR_BAR_STEPS).map(|s| {
        let lo = v_min + step * s as f64;
        let (r, g, b) = colormap_rgb(style.colormap, (s as f64 + 0.5) / COLOR_BAR_STEPS as f64);
        Rectangle::new([(0.0, lo), (1.0, lo + step)], RGBColor(r, g, b).filled())
    }))
    .map_err(plot_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(colormap_rgb(Colormap::Viridis, 0.0), (68, 1, 84));
        assert_eq!(colormap_rgb(Colormap::Viridis, 1.0), (253, 231, 37));
        assert_eq!(colormap_rgb(Colormap::Viridis, 0.5), (33, 144, 141));
    }

    #[test]
    fn test_colormap_clamps() {
        assert_eq!(colormap_rgb(Colormap::Viridis, -3.0), (68, 1, 84));
        assert_eq!(colormap_rgb(Colormap::Viridis, 7.0), (253, 231, 37));
        assert_eq!(colormap_rgb(Colormap::Gray, f64::NAN), (0, 0, 0));
        assert_eq!(colormap_rgb(Colormap::Gray, 1.0), (255, 255, 255));
    }

    #[test]
    fn test_viridis_interpolates() {
        let (r, g, b) = colormap_rgb(Colormap::Viridis, 0.0625);
        assert_eq!((r, g, b), (70, 23, 103));
    }

    #[test]
    fn test_marker_radius() {
        assert_eq!(marker_radius(50.0), 4);
        assert_eq!(marker_radius(1.0), 1);
        assert_eq!(marker_radius(0.0), 1);
        assert_eq!(marker_radius(400.0), 10);
    }

    #[test]
    fn test_value_range() {
        let values = vec![Some(5500.0), None, Some(f64::NAN), Some(4000.0), Some(6100.0)];
        assert_eq!(value_range(&values), Some((4000.0, 6100.0)));
        assert_eq!(value_range(&[None, None]), None);
    }

    #[test]
    fn test_padded_range() {
        let range = padded_range(&[0.0, 10.0]).unwrap();
        assert!((range.start + 0.5).abs() < 1e-12);
        assert!((range.end - 10.5).abs() < 1e-12);

        let flat = padded_range(&[3.0, 3.0]).unwrap();
        assert!(flat.start < 2.0 && flat.end > 4.0);

        let far = padded_range(&[1e300, 1e300]).unwrap();
        assert!(far.start < 1e300 && far.end > 1e300);
    }

    #[test]
    fn test_padded_range_skips_non_finite() {
        let range = padded_range(&[f64::NAN, 0.0, f64::INFINITY, 10.0, f64::NEG_INFINITY]).unwrap();
        assert!((range.start + 0.5).abs() < 1e-12);
        assert!((range.end - 10.5).abs() < 1e-12);

        assert!(padded_range(&[f64::NAN, f64::INFINITY]).is_none());
        assert!(padded_range(&[]).is_none());
    }

    #[test]
    fn test_padded_range_overflow() {
        assert!(padded_range(&[-1e308, 1e308]).is_none());
        assert!(padded_range(&[f64::MAX, f64::MAX]).is_none());
    }

    #[test]
    fn test_color_range() {
        assert_eq!(color_range(&[Some(2.0), Some(6.0)]), Some((2.0, 6.0)));
        assert_eq!(color_range(&[None, Some(f64::NAN)]), Some((0.0, 1.0)));
        assert_eq!(color_range(&[Some(5.0), Some(5.0)]), Some((4.0, 6.0)));
        assert_eq!(color_range(&[Some(-1e308), Some(1e308)]), None);
    }

    fn small_style() -> PlotConfig {
        PlotConfig {
            width: 480,
            height: 360,
            ..PlotConfig::default()
        }
    }

    fn cloud_of(points: &[(f64, f64, f64, &str)]) -> PointCloud {
        let mut cloud = PointCloud::new();
        for &(x, y, z, attribute) in points {
            cloud.push(x, y, z, attribute);
        }
        cloud
    }

    fn assert_png(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.len() > 8);
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn test_plot_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plots").join("cloud.png");
        let cloud = cloud_of(&[
            (0.0, 0.0, 0.0, "4000.0"),
            (10.0, 5.0, 2.0, "5500.0"),
            (3.0, 8.0, 9.0, "6100.0"),
            (7.5, 1.0, 4.0, "4800.0"),
        ]);

        plot_3d_scatter(&path, &cloud, &small_style()).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_plot_uniform_attribute() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("uniform.png");
        let cloud = cloud_of(&[(0.0, 0.0, 0.0, "5500"), (1.0, 2.0, 3.0, "5500"), (2.0, 1.0, 0.5, "5500")]);

        plot_3d_scatter(&path, &cloud, &small_style()).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_plot_non_numeric_attributes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.png");
        let cloud = cloud_of(&[(0.0, 0.0, 0.0, "granite"), (1.0, 2.0, 3.0, "shale")]);
        let style = PlotConfig {
            colormap: Colormap::Gray,
            ..small_style()
        };

        plot_3d_scatter(&path, &cloud, &style).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_plot_drops_non_finite_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.png");
        let cloud = cloud_of(&[
            (f64::NAN, 20.0, 30.0, "5500.0"),
            (1.0, f64::INFINITY, 3.0, "1.0"),
            (2.0, 2.0, f64::NEG_INFINITY, "2.0"),
            (10.0, 20.0, 30.0, "5500.0"),
            (11.0, 21.0, 31.0, "6000.0"),
        ]);

        plot_3d_scatter(&path, &cloud, &small_style()).unwrap();
        assert_png(&path);
    }

    #[test]
    fn test_plot_without_finite_points() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("none.png");
        let cloud = cloud_of(&[(f64::NAN, 0.0, 0.0, "1"), (0.0, f64::INFINITY, 0.0, "2")]);

        let err = plot_3d_scatter(&path, &cloud, &small_style()).unwrap_err();
        assert!(matches!(err, VisualizationError::NoFinitePoints));
        assert!(!path.exists());
    }

    #[test]
    fn test_plot_coordinate_overflow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wide.png");
        let cloud = cloud_of(&[(1e308, 0.0, 0.0, "1"), (-1e308, 1.0, 1.0, "2")]);

        let err = plot_3d_scatter(&path, &cloud, &small_style()).unwrap_err();
        assert!(matches!(err, VisualizationError::RangeOverflow("x")));
        assert!(!path.exists());
    }

    #[test]
    fn test_plot_attribute_overflow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("values.png");
        let cloud = cloud_of(&[(0.0, 0.0, 0.0, "-1e308"), (1.0, 1.0, 1.0, "1e308")]);

        let err = plot_3d_scatter(&path, &cloud, &small_style()).unwrap_err();
        assert!(matches!(err, VisualizationError::RangeOverflow("attribute")));
    }

    #[test]
    fn test_plot_empty_cloud() {
        let err = plot_3d_scatter(Path::new("unused.png"), &PointCloud::new(), &PlotConfig::default())
            .unwrap_err();
        assert!(matches!(err, VisualizationError::EmptyPointCloud));
    }
}
