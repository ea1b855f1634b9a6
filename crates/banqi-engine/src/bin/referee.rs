use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use banqi_core::Referee;
use banqi_engine::init_logging;
use clap::Parser;
use tracing::debug;

/// Line-oriented game referee: START, STATE, MOVE, FLIP, QUIT.
#[derive(Debug, Parser)]
#[command(name = "referee", version)]
struct Args {
    /// Seed for flip outcomes; random when absent.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let mut referee = args.seed.map_or_else(Referee::new, Referee::with_seed);

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading command")?;
        debug!(command = %line.trim(), "received");
        let response = referee.handle(&line);
        for reply in &response.lines {
            writeln!(stdout, "{reply}").context("writing reply")?;
        }
        stdout.flush().context("flushing reply")?;
        if response.quit {
            break;
        }
    }
    Ok(())
}
