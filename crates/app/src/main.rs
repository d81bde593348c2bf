use std::path::PathBuf;

use clap::{Parser, Subcommand};
use timefreq_core::{Complex64, TimeFreqSpectrum, TimeSeries};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { rate, samples, json } => run_demo(rate, samples, json.as_deref()),
        Commands::Inspect { input } => run_inspect(&input),
    }
}

fn run_demo(rate: u32, samples: usize, json: Option<&std::path::Path>) -> anyhow::Result<()> {
    tracing::info!(rate, samples, "building demo spectrum");

    let mut spectrum = TimeFreqSpectrum::empty();
    for (freq, epoch) in [(40.0, 0.0), (10.0, 0.5), (25.0, 1.0)] {
        spectrum.append(&sine_row(freq, epoch, rate, samples)?, freq)?;
    }
    // A colliding frequency demonstrates replace-in-place: the 10 Hz row and
    // its epoch are overwritten, the shape stays put.
    spectrum.append(&sine_row(10.0, 2.0, rate, samples)?, 10.0)?;

    for (freq, row) in &spectrum {
        tracing::info!(
            freq,
            epoch = row.epoch(),
            fs = row.fs(),
            first = %row[0],
            "row"
        );
    }
    tracing::info!(
        shape = ?spectrum.shape(),
        range = spectrum.frequency_range()?,
        "spectrum assembled"
    );

    if let Some(path) = json {
        std::fs::write(path, serde_json::to_string_pretty(&spectrum)?)?;
        tracing::info!(?path, "spectrum written");
    }
    Ok(())
}

fn run_inspect(input: &PathBuf) -> anyhow::Result<()> {
    let spectrum: TimeFreqSpectrum = serde_json::from_str(&std::fs::read_to_string(input)?)?;

    tracing::info!(
        ?input,
        shape = ?spectrum.shape(),
        fs = spectrum.fs()?,
        frequencies = ?spectrum.frequencies()?,
        epochs = ?spectrum.epochs()?,
        "spectrum loaded"
    );
    Ok(())
}

fn sine_row(freq: f64, epoch: f64, rate: u32, samples: usize) -> timefreq_core::Result<TimeSeries> {
    let values: Vec<Complex64> = (0..samples)
        .map(|i| {
            let t = i as f64 / rate as f64;
            Complex64::new((std::f64::consts::TAU * freq * t).sin(), 0.0)
        })
        .collect();
    TimeSeries::new(values, epoch, rate)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect uniformly sampled spectra", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble a synthetic spectrum and log its rows in frequency order.
    Demo {
        /// Sample rate shared by every row.
        #[arg(long, default_value_t = 64)]
        rate: u32,
        /// Samples per row.
        #[arg(long, default_value_t = 32)]
        samples: usize,
        /// Optional path for a JSON copy of the assembled spectrum.
        #[arg(short, long)]
        json: Option<PathBuf>,
    },
    /// Load a JSON spectrum and print its shape and axes.
    Inspect {
        /// Path to a spectrum previously written by `demo --json`.
        input: PathBuf,
    },
}
