//! classify — run a pretrained network over one image
//!
//! Prints the best class, its probability and the mean forward-pass time.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::LazyLock;

use clap::{Parser, ValueEnum};
use dnn_classify::{ClassifyRequest, Config, ModelFiles, classify};
use tracing::debug;

static LONG_VERSION: LazyLock<String> = LazyLock::new(dnn_classify::version_string);

/// Sample of image classification with a pretrained network
#[derive(Parser)]
#[command(name = "classify")]
#[command(version = dnn_classify::PKG_VERSION, long_version = LONG_VERSION.as_str())]
#[command(about = "Classify an image with a pretrained ONNX network")]
struct Args {
    /// Image to process
    #[arg(short, long)]
    image: PathBuf,

    /// Network topology (ONNX graph)
    #[arg(long = "model-txt", visible_alias = "mt")]
    model_txt: PathBuf,

    /// Network weights (the graph file itself or its external data file)
    #[arg(long = "model-bin", visible_alias = "mb")]
    model_bin: PathBuf,

    /// The list of class names
    #[arg(short, long)]
    classes: PathBuf,

    /// Configuration file
    #[arg(long, env = "DNN_CLASSIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Timed forward passes (overrides config)
    #[arg(long)]
    iterations: Option<u32>,

    /// Untimed warm-up passes (overrides config)
    #[arg(long)]
    warmup: Option<u32>,

    /// Execution device: cpu, cuda or cuda:<id> (overrides config)
    #[arg(long)]
    device: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> ExitCode {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> dnn_classify::Result<String> {
    let mut config = Config::load(args.config.as_deref())?;
    if let Some(iterations) = args.iterations {
        config.run.iterations = iterations;
    }
    if let Some(warmup) = args.warmup {
        config.run.warmup = warmup;
    }
    if let Some(device) = args.device {
        config.run.device = device;
    }
    debug!(?config, "resolved configuration");

    let request = ClassifyRequest {
        image: args.image,
        model: ModelFiles::new(args.model_txt, args.model_bin),
        labels: args.classes,
    };

    let report = classify(&request, &config)?;
    match args.format {
        Format::Text => Ok(report.to_string()),
        Format::Json => report.to_json(),
    }
}
