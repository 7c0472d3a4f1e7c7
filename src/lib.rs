pub mod config;
pub mod edges;
pub mod error;
pub mod histogram;
pub mod image_name;
pub mod luminance;
pub mod pipeline;
pub mod plot_histogram;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use pipeline::{PipelineOptions, PipelineReport, run_pipeline};
