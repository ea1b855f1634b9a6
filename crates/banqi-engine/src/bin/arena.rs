use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use banqi_core::{Color, Game, GameStatus, SearchLimits, Searcher};
use banqi_engine::{
    init_logging, AlphaBetaConfig, AlphaBetaSearcher, MaterialTable, MonteCarloConfig,
    MonteCarloSearcher, TableEval,
};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};

const MAX_PLIES: u32 = 1_000;

/// Plays the alpha-beta searcher against the Monte-Carlo player.
#[derive(Debug, Parser)]
#[command(name = "arena", version)]
struct Args {
    #[arg(long, short = 'n', default_value_t = 20)]
    games: u32,
    #[arg(long, default_value_t = 4)]
    depth: u8,
    /// Random playouts per root move for the Monte-Carlo player.
    #[arg(long, default_value_t = 32)]
    playouts: u32,
    /// Start with every piece face down.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    hidden: bool,
    #[arg(long)]
    material_table: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Print one JSON record per finished game on stdout.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    AlphaBetaWin,
    MonteCarloWin,
    Draw,
}

#[derive(Debug, Clone, Serialize)]
struct GameRecord {
    game: u32,
    alphabeta_color: &'static str,
    plies: u32,
    outcome: Outcome,
    reason: Option<String>,
    final_fen: String,
}

fn play_game(args: &Args, game_number: u32, table: &Arc<MaterialTable>) -> Result<GameRecord> {
    let seed = args.seed.wrapping_add(u64::from(game_number));
    let mut game = Game::with_seed(args.hidden, seed);
    let mut alphabeta = AlphaBetaSearcher::with_eval(
        AlphaBetaConfig {
            max_depth: args.depth,
            seed,
            ..AlphaBetaConfig::default()
        },
        Box::new(TableEval::new(Arc::clone(table))),
    );
    let mut montecarlo = MonteCarloSearcher::new(MonteCarloConfig {
        playouts: args.playouts,
        seed,
    });
    let ab_limits = SearchLimits {
        depth: Some(args.depth),
        ..SearchLimits::default()
    };

    // With a face-down start the colours are settled by the opening flip,
    // so engines alternate who moves first instead.
    let alphabeta_first = game_number % 2 == 0;
    let mut alphabeta_color = (!game.position().is_all_hidden()).then(|| {
        if alphabeta_first {
            game.turn()
        } else {
            game.turn().opposite()
        }
    });
    let mut plies = 0u32;

    while !game.status().is_over() && plies < MAX_PLIES {
        let turn = game.turn();
        let alphabeta_to_move = match alphabeta_color {
            Some(color) => color == turn,
            None => alphabeta_first,
        };
        let result = if alphabeta_to_move {
            alphabeta.search(game.position(), ab_limits)
        } else {
            montecarlo.search(game.position(), SearchLimits::default())
        };
        let Some(mv) = result.best_move else {
            break;
        };

        let mover_is_alphabeta = alphabeta_to_move;
        if let Err(err) = game.play(mv) {
            warn!(%err, %mv, "engine produced an illegal move");
        }
        plies += 1;
        if alphabeta_color.is_none() && !game.position().is_all_hidden() {
            // After the opening flip the mover owns the revealed colour.
            let opener = game
                .history()
                .first()
                .and_then(|entry| entry.piece)
                .and_then(|piece| piece.color)
                .context("opening flip revealed no colour")?;
            alphabeta_color = Some(if mover_is_alphabeta {
                opener
            } else {
                opener.opposite()
            });
        }
    }

    let status = game.status();
    let ab_color = alphabeta_color.unwrap_or(Color::Red);
    let outcome = match status {
        GameStatus::Win(winner, _) if winner == ab_color => Outcome::AlphaBetaWin,
        GameStatus::Win(_, _) => Outcome::MonteCarloWin,
        _ => Outcome::Draw,
    };

    Ok(GameRecord {
        game: game_number,
        alphabeta_color: ab_color.name(),
        plies,
        outcome,
        reason: status.reason().map(|reason| reason.to_string()),
        final_fen: game.fen(),
    })
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let table = Arc::new(match &args.material_table {
        Some(path) => MaterialTable::load(path)
            .with_context(|| format!("loading material table {}", path.display()))?,
        None => MaterialTable::zeroed(),
    });

    info!(
        games = args.games,
        depth = args.depth,
        playouts = args.playouts,
        "starting arena"
    );

    let mut stdout = io::stdout().lock();
    let (mut ab_wins, mut mc_wins, mut draws) = (0u32, 0u32, 0u32);
    for game_number in 0..args.games {
        let record = play_game(&args, game_number, &table)?;
        match record.outcome {
            Outcome::AlphaBetaWin => ab_wins += 1,
            Outcome::MonteCarloWin => mc_wins += 1,
            Outcome::Draw => draws += 1,
        }
        info!(
            game = game_number + 1,
            plies = record.plies,
            outcome = ?record.outcome,
            alphabeta = record.alphabeta_color,
            "game finished"
        );
        if args.json {
            let line = serde_json::to_string(&record).context("encoding game record")?;
            writeln!(stdout, "{line}").context("writing game record")?;
        }
    }

    info!(
        alphabeta = ab_wins,
        montecarlo = mc_wins,
        draws,
        "AlphaBeta: {ab_wins}W/{mc_wins}L/{draws}D"
    );
    Ok(())
}
