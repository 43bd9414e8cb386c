//! Random regression runner
//!
//! Generates a seeded command stream, runs it through the reference device
//! and the golden model, and reports the run summary.
//!
//! Usage:
//!   regress --mix all --count 4096 --seed 7
//!   regress --config testbench.json --report summary.json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use testbench::{Mix, ReferenceDut, StimulusConfig, StimulusGenerator, Testbench, TestbenchConfig};
use tracing_subscriber::EnvFilter;

/// Order book oracle regression
#[derive(Parser, Debug)]
#[command(name = "regress")]
#[command(about = "Run a seeded random regression against the reference order book device")]
struct Args {
    /// Stimulus seed
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of commands to issue
    #[arg(long, default_value_t = 4096)]
    count: usize,

    /// Opcode mix
    #[arg(long, value_enum, default_value_t = Mix::All)]
    mix: Mix,

    /// Testbench configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the run summary here as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TestbenchConfig::load(path)?,
        None => TestbenchConfig::default(),
    };

    let mut generator = StimulusGenerator::new(
        args.mix.bag(),
        StimulusConfig {
            seed: args.seed,
            ..StimulusConfig::default()
        },
    );
    let dut = ReferenceDut::new(config.engine.clone(), config.dut.clone());
    let mut tb = Testbench::new(dut, config);
    tb.extend(generator.generate(args.count));

    tracing::info!(seed = args.seed, count = args.count, mix = ?args.mix, "Starting regression");
    let summary = tb.run().context("regression failed")?;

    let json = serde_json::to_string_pretty(&summary)?;
    match &args.report {
        Some(path) => {
            std::fs::write(path, &json).with_context(|| format!("writing report to {}", path.display()))?;
            tracing::info!(path = %path.display(), "Report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
