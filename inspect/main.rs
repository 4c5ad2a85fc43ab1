/// mnist-inspect
///
/// Command-line viewer for IDX image/label stream pairs.
///
/// Run with:
///   cargo run --bin mnist-inspect -- --images <file> --labels <file> summary
///
/// Log verbosity follows `RUST_LOG` (default `info`).

mod commands;
mod render;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub source: Source,
    #[command(subcommand)]
    pub command: Commands,
}

/// Which stream pair to open. `--config` wins over the individual paths.
#[derive(Args)]
pub struct Source {
    /// JSON dataset config (see the `config` subcommand)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, default_value = "train-images-idx3-ubyte")]
    pub images: PathBuf,
    #[arg(long, global = true, default_value = "train-labels-idx1-ubyte")]
    pub labels: PathBuf,
    /// Seed for random sample selection
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print sample count, image size and the per-class histogram
    Summary,
    /// Print one sample as ASCII art
    Show {
        /// Global sample index
        #[arg(long, conflicts_with = "label")]
        index: Option<usize>,
        /// Class to pick from; a random member unless --local is given
        #[arg(long)]
        label: Option<u8>,
        /// Position within the class
        #[arg(long, requires = "label")]
        local: Option<usize>,
    },
    /// Render one sample to a PNG file
    Export {
        #[arg(long)]
        index: usize,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 255)]
        alpha: u8,
    },
    /// Write a dataset config file
    Config {
        #[arg(long, default_value = "dataset.json")]
        out: PathBuf,
        /// Require the standard IDX magic numbers
        #[arg(long)]
        strict: bool,
    },
    /// Write a random IDX stream pair, handy for smoke tests
    Synth {
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value_t = 100)]
        count: usize,
        #[arg(long, default_value_t = 28)]
        rows: usize,
        #[arg(long, default_value_t = 28)]
        cols: usize,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = commands::run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
