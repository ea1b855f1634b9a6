use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use banqi_core::{Move, Request, SearchLimits, Searcher, OPENING_FLIP};
use banqi_engine::{
    init_logging, AlphaBetaConfig, AlphaBetaSearcher, MaterialTable, TableEval, TimeConfig,
    DEFAULT_TABLE_PATH,
};
use clap::Parser;
use tracing::{info, warn};

/// Reads one position per line on stdin and answers with a move.
#[derive(Debug, Parser)]
#[command(name = "agent", version)]
struct Args {
    /// Fixed search depth; without it the clock decides.
    #[arg(long)]
    depth: Option<u8>,
    #[arg(long, default_value = DEFAULT_TABLE_PATH)]
    material_table: PathBuf,
    #[arg(long, default_value_t = TimeConfig::default().min_ms)]
    min_ms: u64,
    #[arg(long, default_value_t = TimeConfig::default().max_ms)]
    max_ms: u64,
    /// log2 of the transposition table entry count.
    #[arg(long, default_value_t = AlphaBetaConfig::default().tt_bits)]
    tt_bits: u32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let table = Arc::new(MaterialTable::load_or_zeroed(&args.material_table));
    let config = AlphaBetaConfig {
        tt_bits: args.tt_bits,
        max_depth: args.depth.unwrap_or(AlphaBetaConfig::default().max_depth),
        seed: args.seed,
        time: TimeConfig {
            min_ms: args.min_ms,
            max_ms: args.max_ms,
            ..TimeConfig::default()
        },
        ..AlphaBetaConfig::default()
    };
    let mut searcher = AlphaBetaSearcher::with_eval(config, Box::new(TableEval::new(table)));
    let limits = SearchLimits {
        depth: args.depth,
        ..SearchLimits::default()
    };
    info!(?config, "agent ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line.context("reading request")?;
        if line.trim().is_empty() {
            continue;
        }
        let request = match Request::parse(&line) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, line = %line.trim(), "ignoring unparseable request");
                continue;
            }
        };
        if request.is_notification() {
            continue;
        }

        let result = searcher.search(&request.position, limits);
        // Nothing is legal only once the game is over; answer something well-formed.
        let mv = result.best_move.unwrap_or(Move::flip(OPENING_FLIP));
        writeln!(stdout, "{mv}").context("writing move")?;
        stdout.flush().context("flushing move")?;
    }
    Ok(())
}
