//! Move ordering: hash move, then captures by victim and attacker value,
//! then flips, then quiet steps by history score.

use banqi_core::{Move, PieceType, Position, SQUARE_NB};

/// Capture values used for ordering, indexed by piece type.
pub const CAPTURE_VALUES: [i32; 7] = [
    810, // General
    270, // Advisor
    90,  // Elephant
    18,  // Chariot
    6,   // Horse
    18,  // Cannon
    1,   // Soldier
];

const TT_MOVE_SCORE: i32 = 1_000_000;
const CAPTURE_BASE: i32 = 100_000;
pub const FLIP_SCORE: i32 = 50_000;
const QUIET_CAP: i32 = FLIP_SCORE - 1;

/// Once any entry passes this, every entry is halved.
pub const HISTORY_CEILING: u32 = 1 << 20;
const MAX_BONUS_SHIFT: u8 = 16;

pub fn capture_value(piece_type: PieceType) -> i32 {
    CAPTURE_VALUES.get(piece_type as usize).copied().unwrap_or(0)
}

#[derive(Debug, Clone)]
pub struct HistoryTable {
    scores: [[u32; SQUARE_NB]; SQUARE_NB],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self {
            scores: [[0; SQUARE_NB]; SQUARE_NB],
        }
    }
}

impl HistoryTable {
    pub fn get(&self, mv: Move) -> u32 {
        self.scores[mv.from.index()][mv.to.index()]
    }

    /// Rewards a move that cut off or became the best move at `depth`.
    pub fn reward(&mut self, mv: Move, depth: u8) {
        let bonus = 1u32 << depth.min(MAX_BONUS_SHIFT);
        let slot = &mut self.scores[mv.from.index()][mv.to.index()];
        *slot = slot.saturating_add(bonus);
        if *slot > HISTORY_CEILING {
            self.halve();
        }
    }

    pub fn halve(&mut self) {
        for row in &mut self.scores {
            for score in row.iter_mut() {
                *score /= 2;
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn max(&self) -> u32 {
        self.scores.iter().flatten().copied().max().unwrap_or(0)
    }
}

pub fn move_order_key(
    position: &Position,
    mv: Move,
    tt_move: Option<Move>,
    history: &HistoryTable,
    suppress_quiet: bool,
) -> i32 {
    if tt_move == Some(mv) {
        return TT_MOVE_SCORE;
    }
    if mv.is_flip() {
        return FLIP_SCORE;
    }

    let attacker = position.piece_at(mv.from).map(|piece| piece.piece_type);
    let victim = position.piece_at(mv.to).map(|piece| piece.piece_type);
    match (attacker, victim) {
        (Some(attacker), Some(victim)) => {
            CAPTURE_BASE + capture_value(victim) * 16 - capture_value(attacker)
        }
        _ if suppress_quiet => 0,
        _ => (history.get(mv).min(QUIET_CAP as u32)) as i32,
    }
}

pub fn order_moves(
    position: &Position,
    moves: &mut [Move],
    tt_move: Option<Move>,
    history: &HistoryTable,
    suppress_quiet: bool,
) {
    moves.sort_by_key(|&mv| -move_order_key(position, mv, tt_move, history, suppress_quiet));
}
