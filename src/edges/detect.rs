use std::fs;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::{debug, info, warn};

use super::grayscale::GrayscaleImage;
use super::marching_squares::{Contour, find_mask_contours};
use super::morphology::{BinaryMask, disk, morphological_edges};
use super::otsu::otsu_threshold;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

/// Everything produced by a successful edge detection run.
#[derive(Debug, Clone)]
pub struct EdgeDetection {
    pub grayscale: GrayscaleImage,
    pub threshold: f64,
    pub edges: BinaryMask,
    pub contours: Vec<Contour>,
}

impl EdgeDetection {
    /// Vertex count of each contour.
    pub fn lengths(&self) -> Vec<usize> {
        self.contours.iter().map(Contour::len).collect()
    }

    pub fn closed_contours(&self) -> usize {
        self.contours.iter().filter(|c| c.is_closed()).count()
    }
}

/// Outcome of edge detection.
///
/// `ShapeMismatch` carries the `(rows, cols)` of both grids; nothing is
/// persisted in that case.
#[derive(Debug, Clone)]
pub enum EdgeOutcome {
    Detected(EdgeDetection),
    ShapeMismatch {
        grayscale: (usize, usize),
        edges: (usize, usize),
    },
}

/// Runs the full detection on a decoded image.
pub fn detect_edges(
    source: &DynamicImage,
    config: &AnalysisConfig,
) -> Result<EdgeOutcome, AnalysisError> {
    let grayscale = GrayscaleImage::from_dynamic(source)?;
    Ok(detect_edges_in_grayscale(grayscale, config))
}

/// Otsu binarisation, disk morphology, XOR band and contour tracing.
pub fn detect_edges_in_grayscale(
    grayscale: GrayscaleImage,
    config: &AnalysisConfig,
) -> EdgeOutcome {
    let threshold = otsu_threshold(grayscale.as_slice(), config.otsu_bins).unwrap_or_default();
    let binary = BinaryMask::threshold(&grayscale, threshold);
    debug!(threshold, foreground = binary.count(), "binarized");

    let element = disk(config.disk_radius);
    let Some(edges) = morphological_edges(&binary, &element) else {
        return mismatch(grayscale.shape(), binary.shape());
    };
    if edges.shape() != grayscale.shape() {
        return mismatch(grayscale.shape(), edges.shape());
    }

    let contours = find_mask_contours(&edges, config.iso_level);
    debug!(
        edge_pixels = edges.count(),
        contours = contours.len(),
        "traced edge contours"
    );

    EdgeOutcome::Detected(EdgeDetection {
        grayscale,
        threshold,
        edges,
        contours,
    })
}

fn mismatch(grayscale: (usize, usize), edges: (usize, usize)) -> EdgeOutcome {
    warn!(?grayscale, ?edges, "edge mask resolution differs from source");
    EdgeOutcome::ShapeMismatch { grayscale, edges }
}

/// Location of the persisted edge mask for `name`.
pub fn edges_output_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{name}_edges.png"))
}

/// Writes the mask as an 8-bit PNG with values 0 and 255.
pub fn save_edge_mask(
    edges: &BinaryMask,
    out_dir: &Path,
    name: &str,
) -> Result<PathBuf, AnalysisError> {
    if !out_dir.as_os_str().is_empty() {
        fs::create_dir_all(out_dir)?;
    }
    let path = edges_output_path(out_dir, name);
    edges.to_gray8().save(&path)?;
    info!(path = %path.display(), "saved edge mask");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn square_image(size: u32, lo: u32, hi: u32) -> DynamicImage {
        DynamicImage::ImageLuma8(GrayImage::from_fn(size, size, |x, y| {
            if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
                Luma([230u8])
            } else {
                Luma([20u8])
            }
        }))
    }

    #[test]
    fn square_gives_band_and_two_rings() {
        let outcome = detect_edges(&square_image(64, 20, 44), &AnalysisConfig::default())
            .expect("decode");
        let EdgeOutcome::Detected(det) = outcome else {
            panic!("unexpected shape mismatch");
        };
        assert_eq!(det.edges.shape(), (64, 64));
        assert!(det.threshold > 20.0 / 255.0 && det.threshold < 230.0 / 255.0);
        assert!(det.edges.get(20, 32));
        assert!(!det.edges.get(32, 32));
        // Outer and inner rim of the band.
        assert_eq!(det.contours.len(), 2);
        assert_eq!(det.closed_contours(), 2);
        assert_eq!(det.lengths().len(), 2);
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(16, 16, Luma([128u8])));
        let EdgeOutcome::Detected(det) =
            detect_edges(&img, &AnalysisConfig::default()).expect("decode")
        else {
            panic!("unexpected shape mismatch");
        };
        assert_eq!(det.edges.count(), 0);
        assert!(det.contours.is_empty());
    }

    #[test]
    fn empty_image_is_an_error() {
        let img = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            detect_edges(&img, &AnalysisConfig::default()),
            Err(AnalysisError::EmptyImage)
        ));
    }

    #[test]
    fn output_path_uses_name() {
        let path = edges_output_path(Path::new("saved_images"), "lena");
        assert_eq!(path, Path::new("saved_images/lena_edges.png"));
    }
}
