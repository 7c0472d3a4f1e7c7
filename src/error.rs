/// Errors that can occur while analysing an image.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("kornia image error: {0}")]
    Kornia(#[from] kornia::image::ImageError),

    #[error("plot rendering failed: {0}")]
    Plot(String),

    #[error("report serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image has zero width or height")]
    EmptyImage,
}
