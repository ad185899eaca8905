//! Weight-progression charts rasterised with `plotters`.
//!
//! Charts are drawn into an in-memory RGB buffer and handed to the PDF layer as an
//! [`image::DynamicImage`]. Text is rendered with the same Roboto face the PDF uses, registered
//! with plotters once per process.

use std::path::Path;
use std::sync::OnceLock;

use image::{DynamicImage, RgbImage};
use log::debug;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::error::{ReportError, Result};
use crate::fonts;
use crate::model::ExerciseSeries;

/// Font family name the chart text is registered under.
const CHART_FONT: &str = "sans-serif";

static FONT_REGISTRATION: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/// Visual settings for a single chart.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub series_label: String,
    pub line_color: RGBColor,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            x_axis_title: "Date".to_string(),
            y_axis_title: "Weights (kg)".to_string(),
            series_label: "Weights".to_string(),
            line_color: RGBColor(0, 90, 170),
        }
    }
}

fn chart_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Chart(err.to_string())
}

/// Registers the chart font with plotters.
///
/// The first call decides the outcome for the lifetime of the process.
pub fn ensure_chart_font(fonts_dir: Option<&Path>) -> Result<()> {
    FONT_REGISTRATION
        .get_or_init(|| {
            let bytes = fonts::regular_font_bytes(fonts_dir).map_err(|err| err.to_string())?;
            // plotters keeps a reference to the face for the rest of the process.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            register_font(CHART_FONT, FontStyle::Normal, bytes)
                .map_err(|_| "invalid chart font data".to_string())
        })
        .clone()
        .map_err(ReportError::Chart)
}

/// X range: starts at the first index and always spans at least one unit.
pub(crate) fn x_range(point_count: usize) -> std::ops::Range<f64> {
    let last = point_count.saturating_sub(1) as f64;
    0.0..last.max(1.0)
}

/// Y range: min..max weight with 10% head- and footroom, padded by one unit for flat series.
pub(crate) fn y_range(weights: &[f64]) -> std::ops::Range<f64> {
    let min = weights.iter().copied().fold(f64::INFINITY, f64::min);
    let max = weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }

    let spread = max - min;
    if spread <= f64::EPSILON {
        return (min - 1.0)..(max + 1.0);
    }

    let padding = spread * 0.1;
    (min - padding)..(max + padding)
}

/// Draws the weight progression of `series` as a line chart with point markers.
pub fn render_series_chart(
    series: &ExerciseSeries,
    options: &ChartOptions,
) -> Result<DynamicImage> {
    let (width, height) = (options.width, options.height);
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    let points = series.points();

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(series.exercise_name(), (CHART_FONT, 28))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range(points.len()), y_range(series.weights()))
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc(options.x_axis_title.as_str())
            .y_desc(options.y_axis_title.as_str())
            .axis_desc_style((CHART_FONT, 18))
            .label_style((CHART_FONT, 14))
            .draw()
            .map_err(chart_error)?;

        let color = options.line_color;
        let line = color.stroke_width(2);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), line))
            .map_err(chart_error)?
            .label(options.series_label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], line));

        chart
            .draw_series(
                points
                    .iter()
                    .map(|point| Circle::new(*point, 4, color.filled())),
            )
            .map_err(chart_error)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .label_font((CHART_FONT, 14))
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    debug!(
        "Rendered {}x{} chart for '{}' with {} points ({:?} to {:?})",
        width,
        height,
        series.exercise_name(),
        points.len(),
        series.dates().first(),
        series.dates().last()
    );

    let image = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| chart_error("chart buffer does not match the requested dimensions"))?;
    Ok(DynamicImage::ImageRgb8(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn x_range_spans_point_indices() {
        assert_eq!(x_range(3), 0.0..2.0);
        assert_eq!(x_range(1), 0.0..1.0);
        assert_eq!(x_range(0), 0.0..1.0);
    }

    #[test]
    fn y_range_pads_spread() {
        let range = y_range(&[10.0, 12.0, 14.0]);
        assert!((range.start - 9.6).abs() < 1e-9);
        assert!((range.end - 14.4).abs() < 1e-9);
    }

    #[test]
    fn y_range_widens_flat_series() {
        assert_eq!(y_range(&[50.0, 50.0]), 49.0..51.0);
    }

    #[test]
    fn default_options_match_report_layout() {
        let options = ChartOptions::default();
        assert_eq!((options.width, options.height), (800, 600));
        assert_eq!(options.x_axis_title, "Date");
        assert_eq!(options.y_axis_title, "Weights (kg)");
    }

    #[test]
    fn renders_chart_with_requested_dimensions() {
        if !fonts::default_fonts_available(None) {
            eprintln!("Skipping renders_chart_with_requested_dimensions: fonts missing.");
            return;
        }
        ensure_chart_font(None).expect("register chart font");

        let series = ExerciseSeries::new(
            "Deadlift",
            vec![100.0, 105.0, 110.0],
            vec![
                chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
                chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            ],
        )
        .unwrap();
        let options = ChartOptions {
            width: 320,
            height: 240,
            ..ChartOptions::default()
        };

        let image = render_series_chart(&series, &options).expect("chart renders");
        let rgb = image.to_rgb8();
        assert_eq!(rgb.dimensions(), (320, 240));
        assert!(
            rgb.pixels().any(|pixel| pixel.0 != [255, 255, 255]),
            "chart should not be blank"
        );
    }
}
