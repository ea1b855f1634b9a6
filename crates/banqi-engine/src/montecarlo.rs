use std::time::{Duration, Instant};

use banqi_core::{Move, Position, Score, SearchLimits, SearchResult, Searcher, OPENING_FLIP};
use rand::rngs::StdRng;
use rand::SeedableRng;

const DEFAULT_PLAYOUTS: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloConfig {
    /// Random playouts per root move.
    pub playouts: u32,
    pub seed: u64,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            playouts: DEFAULT_PLAYOUTS,
            seed: 0,
        }
    }
}

/// Flat Monte-Carlo player: every root move gets the same number of random
/// playouts and the best average wins. Used as a sparring partner.
#[derive(Debug, Clone)]
pub struct MonteCarloSearcher {
    config: MonteCarloConfig,
    rng: StdRng,
}

impl MonteCarloSearcher {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }
}

impl Default for MonteCarloSearcher {
    fn default() -> Self {
        Self::new(MonteCarloConfig::default())
    }
}

impl Searcher for MonteCarloSearcher {
    fn search(&mut self, position: &Position, limits: SearchLimits) -> SearchResult {
        let moves = position.moves();
        if moves.is_empty() {
            return SearchResult {
                best_move: None,
                score: Score(-1),
                nodes_searched: 0,
            };
        }
        if position.is_all_hidden() {
            return SearchResult {
                best_move: Some(Move::flip(OPENING_FLIP)),
                score: Score(0),
                nodes_searched: 0,
            };
        }

        let started_at = Instant::now();
        let deadline = limits.time_ms.map(Duration::from_millis);
        let playouts = limits
            .nodes
            .map(|nodes| (nodes / moves.len() as u64).max(1) as u32)
            .unwrap_or(self.config.playouts)
            .max(1);

        let me = position.turn;
        let mut best = (moves[0], i64::MIN);
        let mut nodes = 0u64;

        for &mv in &moves {
            if deadline.is_some_and(|limit| started_at.elapsed() >= limit) {
                break;
            }
            let mut total = 0i64;
            for _ in 0..playouts {
                let mut child = position.clone();
                if child.make_move(mv, &mut self.rng).is_err() {
                    continue;
                }
                let result = i64::from(child.simulate(&mut self.rng));
                // `simulate` reports from the child's mover; a flip may keep us on move.
                total += if child.turn == me { result } else { -result };
                nodes += 1;
            }
            if total > best.1 {
                best = (mv, total);
            }
        }

        let score = (best.1.max(-i64::from(playouts)) * 100 / i64::from(playouts)) as i32;
        SearchResult {
            best_move: Some(best.0),
            score: Score(score),
            nodes_searched: nodes,
        }
    }
}
