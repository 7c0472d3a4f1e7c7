pub mod detect;
pub use detect::{EdgeDetection, EdgeOutcome, detect_edges, save_edge_mask};
pub mod grayscale;
pub use grayscale::GrayscaleImage;
pub mod marching_squares;
pub use marching_squares::{Contour, find_contours, find_mask_contours};
pub mod morphology;
pub use morphology::{BinaryMask, dilate, disk, erode, morphological_edges};
pub mod otsu;
pub use otsu::otsu_threshold;
