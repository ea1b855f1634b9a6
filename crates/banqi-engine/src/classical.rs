use std::sync::Arc;

use banqi_core::{Color, Evaluator, PieceType, Position, Score, Square};

use crate::material::{forced_win_tier, material_counts, MaterialTable};

/// Per-type values, indexed by piece type.
const PIECE_VALUES: [i32; 7] = [
    810, // General
    270, // Advisor
    90,  // Elephant
    18,  // Chariot
    6,   // Horse
    18,  // Cannon
    1,   // Soldier
];

/// Bonus for holding a material balance that wins by force. Kept below the
/// search's early-exit threshold.
pub const FORCED_WIN_BONUS: i32 = 5_000;
const FORCED_WIN_TIER_STEP: i32 = 100;

pub const DEFAULT_TABLE_SCALE: i32 = 10;

#[inline]
pub fn piece_value(piece_type: PieceType) -> i32 {
    PIECE_VALUES.get(piece_type as usize).copied().unwrap_or(0)
}

/// Summed distance from each enemy piece to the nearest own piece that can
/// take it without being taken back. Lower is more threatening.
fn threat_distance(position: &Position, color: Color) -> i32 {
    let enemies = position.pieces_of(color.opposite());
    let own = position.pieces_of(color);
    if own.is_empty() || enemies.is_empty() {
        return 0;
    }

    let mut total = 0i32;
    for target in enemies {
        let Some(victim) = position.piece_at(target) else {
            continue;
        };
        let nearest = own
            .filter_map(|hunter: Square| {
                let attacker = position.piece_at(hunter)?.piece_type;
                let threatens = attacker.can_capture(victim.piece_type)
                    && !victim.piece_type.can_capture(attacker)
                    && attacker != PieceType::Cannon;
                threatens.then(|| i32::from(hunter.distance(target)))
            })
            .min();
        if let Some(distance) = nearest {
            total += distance;
        }
    }
    total
}

fn forced_win_bonus(position: &Position) -> i32 {
    let red = material_counts(position, Color::Red);
    let black = material_counts(position, Color::Black);
    let tier_bonus = |tier: usize| match tier {
        0 => 0,
        tier => FORCED_WIN_BONUS + tier as i32 * FORCED_WIN_TIER_STEP,
    };
    tier_bonus(forced_win_tier(&red, &black)) - tier_bonus(forced_win_tier(&black, &red))
}

fn threat_term(position: &Position) -> i32 {
    threat_distance(position, Color::Black) - threat_distance(position, Color::Red)
}

/// Piece values plus threat distance plus forced-win detection.
#[derive(Debug, Clone, Copy)]
pub struct MaterialEval;

impl MaterialEval {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MaterialEval {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for MaterialEval {
    fn evaluate(&self, position: &Position) -> Score {
        let mut red = 0i32;
        let mut black = 0i32;
        for piece_type in PieceType::MOVABLE {
            let value = piece_value(piece_type);
            red += value * position.count(Color::Red, piece_type) as i32;
            black += value * position.count(Color::Black, piece_type) as i32;
        }
        Score(red - black + threat_term(position) + forced_win_bonus(position))
    }
}

/// Scores material balance through the precomputed table. Without a loaded
/// table it behaves like [`MaterialEval`].
#[derive(Debug, Clone)]
pub struct TableEval {
    table: Arc<MaterialTable>,
    scale: i32,
    fallback: MaterialEval,
}

impl TableEval {
    pub fn new(table: Arc<MaterialTable>) -> Self {
        Self::with_scale(table, DEFAULT_TABLE_SCALE)
    }

    pub fn with_scale(table: Arc<MaterialTable>, scale: i32) -> Self {
        Self {
            table,
            scale,
            fallback: MaterialEval::new(),
        }
    }

    pub fn table(&self) -> &MaterialTable {
        &self.table
    }
}

impl Evaluator for TableEval {
    fn evaluate(&self, position: &Position) -> Score {
        if !self.table.is_loaded() {
            return self.fallback.evaluate(position);
        }
        let material = self.table.lookup(position, Color::Red) * self.scale;
        Score(material + threat_term(position) + forced_win_bonus(position))
    }
}
