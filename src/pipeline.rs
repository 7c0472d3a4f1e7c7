//! Runs the stages in order on one image and collects what they produced.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::edges::{EdgeDetection, EdgeOutcome, detect_edges, save_edge_mask};
use crate::error::AnalysisError;
use crate::image_name::extract_image_name;
use crate::luminance::{ContainerClass, load_image, luminance_histogram};
use crate::plot_histogram::{
    render_edge_panel, render_length_histogram, render_luminance_histogram, save_chart,
};

const DEFAULT_IMAGE_PATH: &str = "images/lena.png";
const DEFAULT_OUT_DIR: &str = "saved_images";
const FALLBACK_NAME: &str = "image";

/// Where to read from and what to write.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub image_path: PathBuf,
    pub out_dir: PathBuf,
    pub write_charts: bool,
    pub write_report: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            image_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            write_charts: false,
            write_report: false,
        }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub name: String,
    pub container: ContainerClass,
    /// `(width, height)` from the image header.
    pub declared_size: (u32, u32),
    /// `(width, height)` of the decoded buffer.
    pub decoded_size: (u32, u32),
    pub edges: EdgeSummary,
    pub charts: Vec<PathBuf>,
}

/// Edge stage result. Shapes are `(rows, cols)`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EdgeSummary {
    Saved {
        threshold: f64,
        grayscale_shape: (usize, usize),
        edges_shape: (usize, usize),
        edge_pixels: usize,
        contour_count: usize,
        closed_contours: usize,
        lengths: Vec<usize>,
        path: PathBuf,
    },
    ShapeMismatch {
        grayscale_shape: (usize, usize),
        edges_shape: (usize, usize),
    },
}

/// Name used for output files, never empty.
pub fn display_name(image_path: &Path) -> String {
    let name = extract_image_name(&image_path.to_string_lossy());
    if name.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        name
    }
}

/// Loads the image, reports luminance, detects edges and persists results.
///
/// Decode failures abort the run. A shape mismatch in the edge stage is
/// recorded in the report and skips the mask and the length histogram.
pub fn run_pipeline(
    options: &PipelineOptions,
    config: &AnalysisConfig,
) -> Result<PipelineReport, AnalysisError> {
    let name = display_name(&options.image_path);
    let loaded = load_image(&options.image_path)?;
    let mut charts = Vec::new();

    let luminance = luminance_histogram(&loaded, &name)?;
    if options.write_charts {
        let chart = render_luminance_histogram(&luminance, config)?;
        charts.push(save_chart(&chart, &options.out_dir, &name, "luminance_histogram")?);
    }

    let outcome = detect_edges(&loaded.image, config)?;
    let (edges, edge_charts) =
        persist_edges(outcome, &options.out_dir, &name, options.write_charts, config)?;
    charts.extend(edge_charts);

    let report = PipelineReport {
        name,
        container: luminance.container,
        declared_size: luminance.declared,
        decoded_size: luminance.decoded,
        edges,
        charts,
    };

    if options.write_report {
        let path = write_report(&report, &options.out_dir)?;
        info!(path = %path.display(), "wrote report");
    }

    Ok(report)
}

/// Writes the edge mask, and the panel and length charts when asked, for a
/// successful detection. A shape mismatch writes nothing.
pub fn persist_edges(
    outcome: EdgeOutcome,
    out_dir: &Path,
    name: &str,
    write_charts: bool,
    config: &AnalysisConfig,
) -> Result<(EdgeSummary, Vec<PathBuf>), AnalysisError> {
    let detection = match outcome {
        EdgeOutcome::Detected(detection) => detection,
        EdgeOutcome::ShapeMismatch { grayscale, edges } => {
            warn!(name = %name, "skipping edge mask and length histogram");
            let summary = EdgeSummary::ShapeMismatch {
                grayscale_shape: grayscale,
                edges_shape: edges,
            };
            return Ok((summary, Vec::new()));
        }
    };

    let path = save_edge_mask(&detection.edges, out_dir, name)?;
    let mut charts = Vec::new();
    if write_charts {
        let panel = render_edge_panel(&detection);
        charts.push(save_chart(&panel, out_dir, name, "edge_panel")?);
        let lengths = render_length_histogram(&detection.lengths(), config)?;
        charts.push(save_chart(&lengths, out_dir, name, "edge_length_histogram")?);
    }
    Ok((summarize(&detection, path), charts))
}

fn summarize(detection: &EdgeDetection, path: PathBuf) -> EdgeSummary {
    EdgeSummary::Saved {
        threshold: detection.threshold,
        grayscale_shape: detection.grayscale.shape(),
        edges_shape: detection.edges.shape(),
        edge_pixels: detection.edges.count(),
        contour_count: detection.contours.len(),
        closed_contours: detection.closed_contours(),
        lengths: detection.lengths(),
        path,
    }
}

/// Writes `<out_dir>/<name>_report.json`.
pub fn write_report(report: &PipelineReport, out_dir: &Path) -> Result<PathBuf, AnalysisError> {
    if !out_dir.as_os_str().is_empty() {
        fs::create_dir_all(out_dir)?;
    }
    let path = out_dir.join(format!("{}_report.json", report.name));
    fs::write(&path, serde_json::to_string_pretty(report)?)?;
    Ok(path)
}
