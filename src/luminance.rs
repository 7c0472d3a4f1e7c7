//! Image loading, container classification and the 8-bit luminance histogram.

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageDecoder, ImageReader};
use kornia::{
    image::{Image, ImageSize, allocator::CpuAllocator},
    imgproc,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::AnalysisError;
use crate::histogram::HistogramBins;

type CpuImage<T, const C: usize> = Image<T, C, CpuAllocator>;

/// A decoded image together with the dimensions its header declared.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: DynamicImage,
    /// `(width, height)` read from the container header before decoding.
    pub declared: (u32, u32),
    /// `(width, height)` of the decoded pixel buffer.
    pub decoded: (u32, u32),
}

/// Whether the decoded buffer kept the declared dimensions.
///
/// This only notices resampling on decode. It says nothing about whether the
/// codec itself is lossy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerClass {
    Lossless,
    Lossy,
}

impl std::fmt::Display for ContainerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerClass::Lossless => f.write_str("Lossless compression."),
            ContainerClass::Lossy => f.write_str("Lossy compression."),
        }
    }
}

/// Result of the luminance stage.
#[derive(Debug, Clone)]
pub struct LuminanceReport {
    pub name: String,
    pub container: ContainerClass,
    pub declared: (u32, u32),
    pub decoded: (u32, u32),
    pub histogram: HistogramBins,
}

/// Opens and decodes an image in one pass.
///
/// The header dimensions are taken from the decoder before the pixel data is
/// read. The file handle lives inside the reader and is released on every
/// return path.
pub fn load_image(path: &Path) -> Result<LoadedImage, AnalysisError> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let decoder = reader.into_decoder()?;
    let declared = decoder.dimensions();
    let image = DynamicImage::from_decoder(decoder)?;
    let decoded = (image.width(), image.height());
    debug!(
        path = %path.display(),
        declared_width = declared.0,
        declared_height = declared.1,
        "decoded image"
    );
    Ok(LoadedImage {
        image,
        declared,
        decoded,
    })
}

pub fn classify_container(declared: (u32, u32), decoded: (u32, u32)) -> ContainerClass {
    if declared == decoded {
        ContainerClass::Lossless
    } else {
        ContainerClass::Lossy
    }
}

/// Converts to 8-bit luminance with kornia's BT.601 weighting.
pub fn luminance_u8(source: &DynamicImage) -> Result<GrayImage, AnalysisError> {
    let rgb = source.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(AnalysisError::EmptyImage);
    }

    let image = CpuImage::<u8, 3>::new(
        ImageSize {
            width: width as usize,
            height: height as usize,
        },
        rgb.into_raw(),
        CpuAllocator,
    )?;
    let mut gray = CpuImage::<u8, 1>::from_size_val(image.size(), 0u8, CpuAllocator)?;
    imgproc::color::gray_from_rgb_u8(&image, &mut gray)?;

    GrayImage::from_raw(width, height, gray.as_slice().to_vec()).ok_or(AnalysisError::EmptyImage)
}

/// Classifies the container and bins the luminance of every pixel.
pub fn luminance_histogram(
    loaded: &LoadedImage,
    name: &str,
) -> Result<LuminanceReport, AnalysisError> {
    let container = classify_container(loaded.declared, loaded.decoded);
    info!(name = %name, %container, "container classified");

    let gray = luminance_u8(&loaded.image)?;
    let histogram = HistogramBins::from_u8(gray.as_raw());

    Ok(LuminanceReport {
        name: name.to_string(),
        container,
        declared: loaded.declared,
        decoded: loaded.decoded,
        histogram,
    })
}
