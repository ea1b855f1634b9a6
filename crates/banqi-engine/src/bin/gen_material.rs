use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use banqi_engine::{init_logging, MaterialTable, DEFAULT_TABLE_PATH};
use clap::Parser;
use tracing::info;

/// Computes the material score table and writes it as little-endian i32s.
#[derive(Debug, Parser)]
#[command(name = "gen-material", version)]
struct Args {
    #[arg(long, short, default_value = DEFAULT_TABLE_PATH)]
    output: PathBuf,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let started = Instant::now();
    let table = MaterialTable::generate();
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "generated material table");

    table
        .write_to(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(path = %args.output.display(), "wrote material table");
    Ok(())
}
