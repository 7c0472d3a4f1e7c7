use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use edge_contours::pipeline::EdgeSummary;
use edge_contours::{AnalysisConfig, PipelineOptions, run_pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "edge_contours",
    about = "Luminance histogram, morphological edge mask and contour lengths for one image",
    version
)]
struct Cli {
    /// Input image
    #[arg(short = 'i', long = "image", default_value = "images/lena.png")]
    image: PathBuf,

    /// Directory receiving the edge mask and charts
    #[arg(short = 'o', long = "out-dir", default_value = "saved_images")]
    out_dir: PathBuf,

    /// Also write the chart PNGs
    #[arg(long = "charts", short = 'c')]
    charts: bool,

    /// Also write a JSON report
    #[arg(long = "report", short = 'r')]
    report: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let options = PipelineOptions {
        image_path: cli.image,
        out_dir: cli.out_dir,
        write_charts: cli.charts,
        write_report: cli.report,
    };

    let report = run_pipeline(&options, &AnalysisConfig::default())?;

    println!("{}", report.container);
    match &report.edges {
        EdgeSummary::Saved {
            grayscale_shape,
            edges_shape,
            contour_count,
            path,
            ..
        } => {
            println!(
                "Original Image Shape (Resolution) ({}): {:?}",
                report.name, grayscale_shape
            );
            println!(
                "Edges Image Shape (Resolution) ({}): {:?}",
                report.name, edges_shape
            );
            println!("Contours found: {contour_count}");
            println!("Image successfully saved to {}", path.display());
        }
        EdgeSummary::ShapeMismatch { .. } => {
            println!("Error: Resolutions of the original and processed images do not match.");
        }
    }
    for chart in &report.charts {
        println!("wrote {}", chart.display());
    }

    Ok(())
}
