//! Binary morphology on top of `imageproc`'s grayscale operators.
//!
//! Dilation treats pixels outside the image as background and erosion treats
//! them as foreground, so a region touching the border is not eaten away from
//! the outside.

use image::{GrayImage, Luma};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

use super::grayscale::GrayscaleImage;

/// Boolean image, row-major, same grid as the image it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    data: Vec<bool>,
}

impl BinaryMask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![false; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Foreground where intensity is strictly above `threshold`.
    pub fn threshold(gray: &GrayscaleImage, threshold: f64) -> Self {
        Self {
            width: gray.width(),
            height: gray.height(),
            data: gray.as_slice().iter().map(|&v| v > threshold).collect(),
        }
    }

    /// Non-zero pixels become foreground.
    pub fn from_gray8(image: &GrayImage) -> Self {
        Self {
            width: image.width() as usize,
            height: image.height() as usize,
            data: image.as_raw().iter().map(|&v| v != 0).collect(),
        }
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

    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.data[y * self.width + x]
    }

    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// True when every foreground pixel of `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &BinaryMask) -> bool {
        self.shape() == other.shape()
            && self.data.iter().zip(&other.data).all(|(&a, &b)| !a || b)
    }

    /// Pixel-wise exclusive or. `None` when the grids differ.
    pub fn xor(&self, other: &BinaryMask) -> Option<BinaryMask> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(Self {
            width: self.width,
            height: self.height,
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| a ^ b).collect(),
        })
    }

    /// 8-bit rendering with foreground at 255.
    pub fn to_gray8(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.data[y as usize * self.width + x as usize] {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }

    /// Values as `0.0` / `1.0`, for the contour tracer.
    pub fn to_f64(&self) -> Vec<f64> {
        self.data.iter().map(|&v| if v { 1.0 } else { 0.0 }).collect()
    }
}

/// Disk-shaped structuring element: every cell within Euclidean distance
/// `radius` of the centre.
pub fn disk(radius: u8) -> Mask {
    Mask::disk(radius)
}

/// Sets a pixel when any in-image pixel under the element is set.
pub fn dilate(mask: &BinaryMask, element: &Mask) -> BinaryMask {
    BinaryMask::from_gray8(&grayscale_dilate(&mask.to_gray8(), element))
}

/// Keeps a pixel only when every in-image pixel under the element is set.
pub fn erode(mask: &BinaryMask, element: &Mask) -> BinaryMask {
    BinaryMask::from_gray8(&grayscale_erode(&mask.to_gray8(), element))
}

/// Boundary band: pixels where dilation and erosion disagree.
pub fn morphological_edges(mask: &BinaryMask, element: &Mask) -> Option<BinaryMask> {
    let dilated = dilate(mask, element);
    let eroded = erode(mask, element);
    dilated.xor(&eroded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: usize, lo: usize, hi: usize) -> BinaryMask {
        BinaryMask::from_fn(size, size, |x, y| (lo..hi).contains(&x) && (lo..hi).contains(&y))
    }

    #[test]
    fn single_pixel_dilates_to_disk_of_radius_three() {
        let mut mask = BinaryMask::new(11, 11);
        mask.set(5, 5, true);
        let dilated = dilate(&mask, &disk(3));
        assert_eq!(dilated.count(), 29);
        assert!(dilated.get(5, 5));
        assert!(dilated.get(8, 5));
        assert!(dilated.get(7, 7));
        assert!(!dilated.get(8, 6));
    }

    #[test]
    fn dilation_ignores_pixels_outside_image() {
        let mut mask = BinaryMask::new(8, 8);
        mask.set(0, 0, true);
        let dilated = dilate(&mask, &disk(3));
        // Quarter disk: the cells of radius 3 with dx, dy >= 0.
        assert_eq!(dilated.count(), 11);
        assert!(dilated.get(3, 0));
        assert!(dilated.get(2, 2));
    }

    #[test]
    fn erosion_shrinks_square() {
        let mask = square(20, 5, 15);
        let eroded = erode(&mask, &disk(1));
        assert_eq!(eroded.count(), 8 * 8);
        assert!(eroded.get(6, 6));
        assert!(!eroded.get(5, 5));
    }

    #[test]
    fn border_region_is_not_eroded_from_outside() {
        let full = BinaryMask::from_fn(6, 6, |_, _| true);
        let eroded = erode(&full, &disk(3));
        assert_eq!(eroded, full);
    }

    #[test]
    fn erosion_inside_mask_inside_dilation() {
        let mask =
            BinaryMask::from_fn(24, 18, |x, y| (x * 7 + y * 3) % 5 < 2 || (8..16).contains(&x));
        for radius in 0..4 {
            let element = disk(radius);
            let eroded = erode(&mask, &element);
            let dilated = dilate(&mask, &element);
            assert!(eroded.is_subset_of(&mask), "radius {radius}");
            assert!(mask.is_subset_of(&dilated), "radius {radius}");
        }
    }

    #[test]
    fn edges_lie_within_dilation_and_skip_interior() {
        let mask = square(30, 8, 22);
        let element = disk(3);
        let edges = morphological_edges(&mask, &element).expect("same shape");
        let dilated = dilate(&mask, &element);
        let eroded = erode(&mask, &element);

        assert!(edges.is_subset_of(&dilated));
        for y in 0..30 {
            for x in 0..30 {
                if eroded.get(x, y) {
                    assert!(!edges.get(x, y), "interior pixel ({x}, {y}) marked as edge");
                }
            }
        }
        assert!(edges.get(8, 15));
        assert!(edges.get(5, 15));
        assert!(!edges.get(15, 15));
    }

    #[test]
    fn xor_rejects_mismatched_grids() {
        let a = BinaryMask::new(3, 4);
        let b = BinaryMask::new(4, 3);
        assert!(a.xor(&b).is_none());
    }

    #[test]
    fn gray8_round_trip() {
        let mask = BinaryMask::from_fn(9, 7, |x, y| (x + y) % 3 == 0);
        let gray = mask.to_gray8();
        assert!(gray.as_raw().iter().all(|&v| v == 0 || v == 255));
        assert_eq!(BinaryMask::from_gray8(&gray), mask);
    }
}
