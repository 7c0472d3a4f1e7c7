use image::{DynamicImage, GrayImage, Luma};

use crate::error::AnalysisError;

// Rec.709 luma weights, applied in R, G, B channel order.
const WEIGHT_R: f64 = 0.2125;
const WEIGHT_G: f64 = 0.7154;
const WEIGHT_B: f64 = 0.0721;

/// Single-channel floating point image with values in `[0, 1]`.
///
/// Stored row-major; `shape()` reports `(rows, cols)`.
#[derive(Debug, Clone, PartialEq)]
pub struct GrayscaleImage {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl GrayscaleImage {
    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Option<Self> {
        if width.checked_mul(height)? != data.len() {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Luminance-weighted sum of the colour channels. Alpha is ignored.
    pub fn from_dynamic(source: &DynamicImage) -> Result<Self, AnalysisError> {
        let rgb = source.to_rgb32f();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(AnalysisError::EmptyImage);
        }

        let data = rgb
            .pixels()
            .map(|px| {
                let luma = WEIGHT_R * px[0] as f64
                    + WEIGHT_G * px[1] as f64
                    + WEIGHT_B * px[2] as f64;
                luma.clamp(0.0, 1.0)
            })
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    /// Rescales to 8 bits for display.
    pub fn to_gray8(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let v = self.data[y as usize * self.width + x as usize];
            Luma([(v * 255.0).round() as u8])
        })
    }
}
