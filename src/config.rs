//! Fixed analysis parameters.

const DISK_RADIUS: u8 = 3;
const ISO_LEVEL: f64 = 0.8;
const OTSU_BINS: usize = 256;
const LENGTH_BINS: usize = 50;
const CHART_WIDTH: u32 = 800;
const CHART_HEIGHT: u32 = 600;

/// Parameters shared by every stage of the analysis.
///
/// The defaults reproduce the reference behaviour and are not meant to be
/// tuned per run; tests construct custom values to exercise edge cases.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Radius of the disk-shaped structuring element.
    pub disk_radius: u8,
    /// Iso-level handed to the marching-squares pass.
    pub iso_level: f64,
    /// Histogram resolution used to pick the Otsu threshold.
    pub otsu_bins: usize,
    pub length_bins: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            disk_radius: DISK_RADIUS,
            iso_level: ISO_LEVEL,
            otsu_bins: OTSU_BINS,
            length_bins: LENGTH_BINS,
            chart_width: CHART_WIDTH,
            chart_height: CHART_HEIGHT,
        }
    }
}
