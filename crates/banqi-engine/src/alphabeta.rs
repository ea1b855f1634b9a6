use std::time::{Duration, Instant};

use arrayvec::ArrayVec;
use banqi_core::{
    Bag, Color, Evaluator, GameStatus, Move, MoveList, Piece, PieceType, Position, Score,
    SearchLimits, SearchResult, Searcher, Square, OPENING_FLIP,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::classical::MaterialEval;
use crate::ordering::{order_moves, HistoryTable};
use crate::time_control::TimeConfig;
use crate::tt::{Bound, Entry, Probe, TranspositionTable, DEFAULT_TT_BITS};

/// Score of a won position before the remaining-depth bonus.
pub const WIN_SCORE: i32 = 20_000;
/// Scores at or beyond this are forced results; deepening stops on one.
pub const FORCE_WIN_THRESHOLD: i32 = 10_000;
const INFINITY: i32 = 30_000;

const DEFAULT_MAX_DEPTH: u8 = 12;
const DEFAULT_POLL_INTERVAL: u64 = 256;
const DEFAULT_CHANCE_REDUCTION: u8 = 1;
const DEFAULT_FLIP_BUDGET: u8 = 2;
const DEFAULT_QUIET_SUPPRESSION: u16 = 20;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaBetaConfig {
    /// Transposition table size as log2 of the entry count.
    pub tt_bits: u32,
    pub max_depth: u8,
    /// Nodes visited between two deadline checks.
    pub poll_interval: u64,
    /// Extra plies dropped when a flip is expanded into its outcomes.
    pub chance_reduction: u8,
    /// Chance nodes allowed on one path before outcomes are scored statically.
    pub flip_budget: u8,
    /// No-progress count from which quiet moves lose their history bonus.
    pub quiet_suppression_threshold: u16,
    pub time: TimeConfig,
    pub seed: u64,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            tt_bits: DEFAULT_TT_BITS,
            max_depth: DEFAULT_MAX_DEPTH,
            poll_interval: DEFAULT_POLL_INTERVAL,
            chance_reduction: DEFAULT_CHANCE_REDUCTION,
            flip_budget: DEFAULT_FLIP_BUDGET,
            quiet_suppression_threshold: DEFAULT_QUIET_SUPPRESSION,
            time: TimeConfig::default(),
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaBetaResult {
    pub best_move: Option<Move>,
    pub score: Score,
    /// Last fully completed depth; 0 when no search ran.
    pub depth: u8,
    pub nodes: u64,
}

/// Value of a flip averaged over the identities it may reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChanceValue {
    pub score: i32,
    /// Sum of the identity weights; the number of pieces left to reveal.
    pub weight: u32,
    pub min: i32,
    pub max: i32,
}

pub struct AlphaBetaSearcher {
    config: AlphaBetaConfig,
    tt: TranspositionTable,
    eval: Box<dyn Evaluator>,
    history: HistoryTable,
    rng: StdRng,
    nodes: u64,
    node_limit: Option<u64>,
    time_limit: Option<Duration>,
    started_at: Instant,
    last_completed_depth: u8,
    known_bag: Option<Bag>,
    searches: u32,
}

impl std::fmt::Debug for AlphaBetaSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaBetaSearcher")
            .field("config", &self.config)
            .field("tt", &self.tt.len())
            .field("eval", &"<Evaluator>")
            .field("nodes", &self.nodes)
            .field("node_limit", &self.node_limit)
            .field("time_limit", &self.time_limit)
            .field("last_completed_depth", &self.last_completed_depth)
            .field("known_bag", &self.known_bag)
            .field("searches", &self.searches)
            .finish()
    }
}

impl AlphaBetaSearcher {
    pub fn new(config: AlphaBetaConfig) -> Self {
        Self::with_eval(config, Box::new(MaterialEval::new()))
    }

    pub fn with_eval(config: AlphaBetaConfig, eval: Box<dyn Evaluator>) -> Self {
        Self {
            config,
            tt: TranspositionTable::with_bits(config.tt_bits),
            eval,
            history: HistoryTable::default(),
            rng: StdRng::seed_from_u64(config.seed),
            nodes: 0,
            node_limit: None,
            time_limit: None,
            started_at: Instant::now(),
            last_completed_depth: 0,
            known_bag: None,
            searches: 0,
        }
    }

    pub fn config(&self) -> &AlphaBetaConfig {
        &self.config
    }

    pub fn transposition_table(&self) -> &TranspositionTable {
        &self.tt
    }

    /// Forgets everything learned about the current game.
    pub fn new_game(&mut self) {
        self.tt.clear();
        self.history.clear();
        self.known_bag = None;
        self.searches = 0;
    }

    pub fn search_with_info(
        &mut self,
        position: &Position,
        limits: SearchLimits,
    ) -> AlphaBetaResult {
        self.nodes = 0;
        self.last_completed_depth = 0;
        self.node_limit = limits.nodes;
        self.started_at = Instant::now();
        self.history.halve();

        let mut working = position.clone();
        working.history.clear();
        self.refine_bag(&mut working);

        let moves = working.moves();
        if moves.is_empty() {
            return AlphaBetaResult {
                best_move: None,
                score: Score(self.terminal_score(&working, 0).unwrap_or(-WIN_SCORE)),
                depth: 0,
                nodes: 0,
            };
        }
        if working.is_all_hidden() {
            return self.immediate(Move::flip(OPENING_FLIP));
        }
        if moves.len() == 1 {
            return self.immediate(moves[0]);
        }

        let time_ms = limits
            .time_ms
            .or_else(|| limits.depth.is_none().then(|| self.move_budget(&working)));
        self.time_limit = time_ms.map(Duration::from_millis);
        self.searches += 1;

        let max_depth = limits.depth.unwrap_or(self.config.max_depth).max(1);
        let suppress = self.suppress_quiet(&working);
        let tt_move = self.tt.get(working.zobrist_hash).and_then(|entry| entry.best_move);
        let mut root_moves = moves;
        order_moves(&working, &mut root_moves, tt_move, &self.history, suppress);

        // Used if not even depth 1 completes.
        let mut best_move = root_moves[0];
        let mut best_score = self.evaluate(&working);

        for depth in 1..=max_depth {
            if self.should_stop() {
                break;
            }
            match self.search_root(&mut working, depth, &root_moves) {
                Ok((mv, score)) => {
                    best_move = mv;
                    best_score = score;
                    self.last_completed_depth = depth;
                    debug!(
                        depth,
                        score,
                        nodes = self.nodes,
                        best = %mv,
                        "completed depth"
                    );
                }
                Err(AbortSearch) => break,
            }
            if best_score >= FORCE_WIN_THRESHOLD {
                break;
            }
            order_moves(&working, &mut root_moves, Some(best_move), &self.history, suppress);
        }

        AlphaBetaResult {
            best_move: Some(best_move),
            score: Score(best_score),
            depth: self.last_completed_depth,
            nodes: self.nodes,
        }
    }

    /// Runs one fixed-depth negamax over `position` inside `[alpha, beta]`
    /// without any deadline. The score is from the side to move's view.
    pub fn search_window(
        &mut self,
        position: &Position,
        depth: u8,
        alpha: i32,
        beta: i32,
    ) -> Score {
        self.nodes = 0;
        self.node_limit = None;
        self.time_limit = None;
        let mut working = position.clone();
        working.history.clear();
        let score = self
            .negamax(&mut working, depth, alpha, beta, 0, self.config.flip_budget)
            .unwrap_or_default();
        Score(score)
    }

    /// Expected value of flipping `square` for the side to move, searching
    /// each outcome `depth` plies deep.
    pub fn evaluate_flip(
        &mut self,
        position: &Position,
        square: Square,
        depth: u8,
    ) -> Option<ChanceValue> {
        if !position.hidden().contains(square) {
            return None;
        }
        self.nodes = 0;
        self.node_limit = None;
        self.time_limit = None;
        let mut working = position.clone();
        working.history.clear();
        self.chance(&mut working, square, depth, 0, self.config.flip_budget).ok()
    }

    fn immediate(&self, mv: Move) -> AlphaBetaResult {
        AlphaBetaResult {
            best_move: Some(mv),
            score: Score(0),
            depth: 0,
            nodes: 0,
        }
    }

    fn move_budget(&self, position: &Position) -> u64 {
        let plies_played = position.ply.max(self.searches * 2);
        let budget = self.config.time.budget_for(position, plies_played);
        info!(
            budget_ms = budget,
            clock = position.clock(position.turn),
            plies_played,
            "move budget"
        );
        budget
    }

    /// Clamps the root bag to the smallest counts seen so far this game.
    fn refine_bag(&mut self, position: &mut Position) {
        if position.is_all_hidden() {
            self.known_bag = None;
            return;
        }
        if let Some(known) = &self.known_bag {
            position.bag.clamp_to(known);
        }
        self.known_bag = Some(position.bag);
    }

    fn search_root(
        &mut self,
        position: &mut Position,
        depth: u8,
        root_moves: &[Move],
    ) -> Result<(Move, i32), AbortSearch> {
        self.bump_nodes()?;

        let mut alpha = -INFINITY;
        let beta = INFINITY;
        let mut best: Option<(Move, i32)> = None;

        for (index, &mv) in root_moves.iter().enumerate() {
            let Some(score) = self.score_move(
                position,
                mv,
                depth,
                alpha,
                beta,
                0,
                self.config.flip_budget,
                index == 0,
            )?
            else {
                continue;
            };

            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((mv, score));
                if self.is_quiet(position, mv) {
                    self.history.reward(mv, depth);
                }
            }
            alpha = alpha.max(score);
        }

        let (mv, score) = best.ok_or(AbortSearch)?;
        self.tt.store(Entry {
            key: position.zobrist_hash,
            depth,
            score,
            bound: Bound::Exact,
            best_move: Some(mv),
        });
        Ok((mv, score))
    }

    fn negamax(
        &mut self,
        position: &mut Position,
        depth: u8,
        alpha: i32,
        beta: i32,
        ply: u8,
        flip_budget: u8,
    ) -> Result<i32, AbortSearch> {
        self.bump_nodes()?;

        if let Some(score) = self.terminal_score(position, depth) {
            return Ok(score);
        }
        if depth == 0 {
            return Ok(self.evaluate(position));
        }

        let key = position.zobrist_hash;
        let (mut alpha, beta, tt_move) = match self.tt.probe(key, alpha, beta, depth) {
            Probe::Cutoff { score, .. } => return Ok(score),
            Probe::Miss {
                alpha,
                beta,
                best_move,
            } => (alpha, beta, best_move),
        };

        let mut moves: MoveList = position.moves();
        let suppress = self.suppress_quiet(position);
        order_moves(position, &mut moves, tt_move, &self.history, suppress);

        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = None;
        let mut searched = 0usize;

        for mv in moves {
            let Some(score) =
                self.score_move(position, mv, depth, alpha, beta, ply, flip_budget, searched == 0)?
            else {
                continue;
            };
            searched += 1;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
                if self.is_quiet(position, mv) {
                    self.history.reward(mv, depth);
                }
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.tt.store(Entry {
                    key,
                    depth,
                    score: best_score,
                    bound: Bound::Lower,
                    best_move,
                });
                return Ok(best_score);
            }
        }

        let bound = if best_score > original_alpha {
            Bound::Exact
        } else {
            Bound::Upper
        };
        self.tt.store(Entry {
            key,
            depth,
            score: best_score,
            bound,
            best_move,
        });
        Ok(best_score)
    }

    /// Score of one child move from the mover's view. Flips go through the
    /// chance expansion; steps use a null window first unless `first`.
    /// `None` means the move could not be played.
    #[allow(clippy::too_many_arguments)]
    fn score_move(
        &mut self,
        position: &mut Position,
        mv: Move,
        depth: u8,
        alpha: i32,
        beta: i32,
        ply: u8,
        flip_budget: u8,
        first: bool,
    ) -> Result<Option<i32>, AbortSearch> {
        if mv.is_flip() {
            return self
                .chance(position, mv.from, depth, ply, flip_budget)
                .map(|value| Some(value.score));
        }

        if position.make_move(mv, &mut self.rng).is_err() {
            return Ok(None);
        }
        let next = depth.saturating_sub(1);
        let result = if first {
            self.negamax(position, next, -beta, -alpha, ply + 1, flip_budget)
                .map(|score| -score)
        } else {
            self.negamax(position, next, -alpha - 1, -alpha, ply + 1, flip_budget)
                .map(|score| -score)
                .and_then(|score| {
                    if score > alpha && score < beta {
                        self.negamax(position, next, -beta, -alpha, ply + 1, flip_budget)
                            .map(|score| -score)
                    } else {
                        Ok(score)
                    }
                })
        };
        let _ = position.unmake_move();
        result.map(Some)
    }

    /// Averages the flip of `square` over every identity the bag may reveal,
    /// each weighted by its remaining count.
    fn chance(
        &mut self,
        position: &mut Position,
        square: Square,
        depth: u8,
        ply: u8,
        flip_budget: u8,
    ) -> Result<ChanceValue, AbortSearch> {
        self.bump_nodes()?;

        let mover = position.turn;
        let outcomes = flip_outcomes(&position.bag);
        let child_depth = if flip_budget == 0 {
            0
        } else {
            depth.saturating_sub(1 + self.config.chance_reduction)
        };
        let child_budget = flip_budget.saturating_sub(1);

        let mut sum = 0i64;
        let mut weight = 0u32;
        let mut min = INFINITY;
        let mut max = -INFINITY;

        for (piece, count) in outcomes {
            if position.flip_as(square, piece).is_err() {
                continue;
            }
            let child = match self.negamax(
                position,
                child_depth,
                -INFINITY,
                INFINITY,
                ply + 1,
                child_budget,
            ) {
                Ok(score) => score,
                Err(err) => {
                    let _ = position.unmake_move();
                    return Err(err);
                }
            };
            // The opening flip of a Black piece keeps the same side on move.
            let score = if position.turn == mover { child } else { -child };
            let _ = position.unmake_move();

            let count = u32::from(count);
            sum += i64::from(score) * i64::from(count);
            weight += count;
            min = min.min(score);
            max = max.max(score);
        }

        if weight == 0 {
            return Ok(ChanceValue {
                score: 0,
                weight: 0,
                min: 0,
                max: 0,
            });
        }
        Ok(ChanceValue {
            score: (sum / i64::from(weight)) as i32,
            weight,
            min,
            max,
        })
    }

    fn evaluate(&self, position: &Position) -> i32 {
        let score = self
            .eval
            .evaluate(position)
            .0
            .clamp(-(FORCE_WIN_THRESHOLD - 1), FORCE_WIN_THRESHOLD - 1);
        if position.turn == Color::Red {
            score
        } else {
            -score
        }
    }

    /// Score of a finished game from the side to move's view; nearer wins
    /// (more depth left) score higher.
    fn terminal_score(&self, position: &Position, depth: u8) -> Option<i32> {
        match position.status() {
            GameStatus::InPlay => None,
            GameStatus::Draw(_) => Some(0),
            GameStatus::Win(winner, _) => {
                let score = WIN_SCORE + i32::from(depth);
                Some(if winner == position.turn { score } else { -score })
            }
        }
    }

    fn suppress_quiet(&self, position: &Position) -> bool {
        position.no_progress >= self.config.quiet_suppression_threshold
    }

    fn is_quiet(&self, position: &Position, mv: Move) -> bool {
        !mv.is_flip() && position.piece_at(mv.to).is_none()
    }

    fn bump_nodes(&mut self) -> Result<(), AbortSearch> {
        self.nodes = self.nodes.saturating_add(1);
        if self.nodes.is_multiple_of(self.config.poll_interval.max(1)) && self.should_stop() {
            return Err(AbortSearch);
        }
        Ok(())
    }

    fn should_stop(&self) -> bool {
        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            return true;
        }
        self.time_limit
            .is_some_and(|limit| self.started_at.elapsed() >= limit)
    }
}

/// Identities a flip may reveal and their weights. An exhausted bag falls
/// back to every face-up identity at equal weight, matching how a flip is
/// actually drawn in that case.
fn flip_outcomes(bag: &Bag) -> ArrayVec<(Piece, u8), 14> {
    let mut outcomes: ArrayVec<(Piece, u8), 14> = bag.iter().collect();
    if outcomes.is_empty() {
        for color in Color::ALL {
            for piece_type in PieceType::MOVABLE {
                outcomes.push((Piece::new(piece_type, color), 1));
            }
        }
    }
    outcomes
}

impl Default for AlphaBetaSearcher {
    fn default() -> Self {
        Self::new(AlphaBetaConfig::default())
    }
}

impl Searcher for AlphaBetaSearcher {
    fn search(&mut self, position: &Position, limits: SearchLimits) -> SearchResult {
        let result = self.search_with_info(position, limits);
        SearchResult {
            best_move: result.best_move,
            score: result.score,
            nodes_searched: result.nodes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AbortSearch;
