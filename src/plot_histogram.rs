use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use plotters::prelude::*;

use crate::config::AnalysisConfig;
use crate::edges::EdgeDetection;
use crate::error::AnalysisError;
use crate::histogram::HistogramBins;
use crate::luminance::LuminanceReport;

const LUMINANCE_COLOR: RGBColor = RGBColor(128, 128, 128);
const LENGTH_COLOR: RGBColor = RGBColor(220, 30, 30);
const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

fn plot_err<E: std::fmt::Display>(e: E) -> AnalysisError {
    AnalysisError::Plot(e.to_string())
}

/// Renders a bar histogram in memory.
///
/// The bitmap backend is built without a font engine, so the chart carries
/// bars and axes only; callers identify it by file name.
pub fn render_histogram_rgb(
    bins: &HistogramBins,
    color: RGBColor,
    width: u32,
    height: u32,
) -> Result<RgbImage, AnalysisError> {
    if width == 0 || height == 0 {
        return Err(AnalysisError::EmptyImage);
    }

    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| AnalysisError::Plot("width*height overflow".to_string()))?;
    let mut rgb = vec![255u8; pixel_count * 3];

    {
        let root = BitMapBackend::with_buffer(&mut rgb, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let y_max = bins.max_count().max(1) as f64 * 1.05;
        let mut chart = ChartBuilder::on(&root)
            .margin(16)
            .build_cartesian_2d(bins.lower..bins.upper, 0f64..y_max)
            .map_err(plot_err)?;

        let fill = color.mix(0.7).filled();
        chart
            .draw_series(
                bins.iter_bins()
                    .filter(|&(_, _, count)| count > 0)
                    .map(|(start, end, count)| {
                        Rectangle::new([(start, 0.0), (end, count as f64)], fill)
                    }),
            )
            .map_err(plot_err)?;

        let axes = [
            PathElement::new(vec![(bins.lower, 0.0), (bins.upper, 0.0)], BLACK),
            PathElement::new(vec![(bins.lower, 0.0), (bins.lower, y_max)], BLACK),
        ];
        chart.draw_series(axes).map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }

    RgbImage::from_raw(width, height, rgb)
        .ok_or_else(|| AnalysisError::Plot(format!("failed to build {width}x{height} chart")))
}

/// 256-bin luminance chart.
pub fn render_luminance_histogram(
    report: &LuminanceReport,
    config: &AnalysisConfig,
) -> Result<RgbImage, AnalysisError> {
    render_histogram_rgb(
        &report.histogram,
        LUMINANCE_COLOR,
        config.chart_width,
        config.chart_height,
    )
}

/// Histogram of contour vertex counts.
///
/// Takes the lengths of a successful detection only. An empty list renders
/// an empty chart.
pub fn render_length_histogram(
    lengths: &[usize],
    config: &AnalysisConfig,
) -> Result<RgbImage, AnalysisError> {
    let values: Vec<f64> = lengths.iter().map(|&l| l as f64).collect();
    let bins = HistogramBins::from_values(&values, config.length_bins);
    render_histogram_rgb(&bins, LENGTH_COLOR, config.chart_width, config.chart_height)
}

/// Grayscale source on the left, edge mask with traced contours on the right.
pub fn render_edge_panel(detection: &EdgeDetection) -> RgbImage {
    let gray = detection.grayscale.to_gray8();
    let edges = detection.edges.to_gray8();
    let (width, height) = gray.dimensions();

    let mut panel = RgbImage::new(width * 2, height);
    for (x, y, px) in gray.enumerate_pixels() {
        panel.put_pixel(x, y, Rgb([px[0], px[0], px[0]]));
    }
    for (x, y, px) in edges.enumerate_pixels() {
        panel.put_pixel(x + width, y, Rgb([px[0], px[0], px[0]]));
    }

    let offset = width as f32;
    for contour in &detection.contours {
        for pair in contour.points.windows(2) {
            let (r0, c0) = pair[0];
            let (r1, c1) = pair[1];
            draw_line_segment_mut(
                &mut panel,
                (c0 as f32 + offset, r0 as f32),
                (c1 as f32 + offset, r1 as f32),
                CONTOUR_COLOR,
            );
        }
    }

    panel
}

/// Writes a rendered chart to `<out_dir>/<name>_<suffix>.png`.
pub fn save_chart(
    chart: &RgbImage,
    out_dir: &Path,
    name: &str,
    suffix: &str,
) -> Result<PathBuf, AnalysisError> {
    if !out_dir.as_os_str().is_empty() {
        std::fs::create_dir_all(out_dir)?;
    }
    let path = out_dir.join(format!("{name}_{suffix}.png"));
    chart.save(&path)?;
    Ok(path)
}
