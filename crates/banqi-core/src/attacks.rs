//! Pseudo-destination tables.
//!
//! Ordinary pieces step to the orthogonally adjacent squares. The Cannon
//! additionally jumps a single screen along its rank or file; its targets are
//! read from a table indexed by the occupancy bits of that rank and file,
//! gathered with a parallel bit extract.

use std::sync::LazyLock;

use crate::bitboard::{line_mask, Bitboard};
use crate::constants::SQUARE_NB;
use crate::types::{PieceType, Square};

const DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Entries per square in the cannon table: one per subset of a 10-bit mask.
pub const CANNON_ENTRIES: usize = 1 << 10;

struct AttackTables {
    steps: [Bitboard; SQUARE_NB],
    masks: [Bitboard; SQUARE_NB],
    cannon: Box<[Bitboard]>,
}

static TABLES: LazyLock<AttackTables> = LazyLock::new(AttackTables::new);

impl AttackTables {
    fn new() -> Self {
        let mut steps = [Bitboard::EMPTY; SQUARE_NB];
        let mut masks = [Bitboard::EMPTY; SQUARE_NB];
        let mut cannon = vec![Bitboard::EMPTY; SQUARE_NB * CANNON_ENTRIES].into_boxed_slice();

        for square in Square::all() {
            let idx = square.index();
            for (df, dr) in DIRECTIONS {
                if let Some(target) = square.offset(df, dr) {
                    steps[idx].set(target);
                }
            }

            let mask = line_mask(square);
            masks[idx] = mask;

            // Carry-rippler walk over every subset of the mask.
            let mut subset = 0u32;
            loop {
                let occupancy = Bitboard(subset);
                let slot = pext(subset, mask.0) as usize;
                cannon[idx * CANNON_ENTRIES + slot] = sliding_attack(square, occupancy);
                subset = subset.wrapping_sub(mask.0) & mask.0;
                if subset == 0 {
                    break;
                }
            }
        }

        Self {
            steps,
            masks,
            cannon,
        }
    }
}

/// Forces table construction. Lookups build the tables lazily otherwise.
pub fn init() {
    LazyLock::force(&TABLES);
}

#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
#[inline]
pub fn pext(value: u32, mask: u32) -> u32 {
    // SAFETY: the target feature is enabled at compile time.
    unsafe { core::arch::x86_64::_pext_u32(value, mask) }
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
#[inline]
pub fn pext(value: u32, mut mask: u32) -> u32 {
    let mut result = 0u32;
    let mut bit = 1u32;
    while mask != 0 {
        let lowest = mask & mask.wrapping_neg();
        if value & lowest != 0 {
            result |= bit;
        }
        bit <<= 1;
        mask &= mask - 1;
    }
    result
}

/// Cannon destinations by direct ray scan: the adjacent square when it is
/// empty, and the first occupied square beyond exactly one screen.
pub fn sliding_attack(square: Square, occupancy: Bitboard) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for (df, dr) in DIRECTIONS {
        let mut screened = false;
        let mut current = square.offset(df, dr);
        if let Some(adjacent) = current {
            if !occupancy.contains(adjacent) {
                attacks.set(adjacent);
            }
        }
        while let Some(target) = current {
            if occupancy.contains(target) {
                if screened {
                    attacks.set(target);
                    break;
                }
                screened = true;
            }
            current = target.offset(df, dr);
        }
    }
    attacks
}

pub fn step_attacks(square: Square, _occupancy: Bitboard) -> Bitboard {
    TABLES.steps[square.index()]
}

pub fn cannon_attacks(square: Square, occupancy: Bitboard) -> Bitboard {
    let idx = square.index();
    let slot = pext(occupancy.0, TABLES.masks[idx].0) as usize;
    TABLES.cannon[idx * CANNON_ENTRIES + slot]
}

fn no_attacks(_square: Square, _occupancy: Bitboard) -> Bitboard {
    Bitboard::EMPTY
}

type AttackFn = fn(Square, Bitboard) -> Bitboard;

const ATTACK_FNS: [AttackFn; PieceType::COUNT] = [
    step_attacks,   // General
    step_attacks,   // Advisor
    step_attacks,   // Elephant
    step_attacks,   // Chariot
    step_attacks,   // Horse
    cannon_attacks, // Cannon
    step_attacks,   // Soldier
    no_attacks,     // Decoy
    no_attacks,     // Hidden
];

/// Pseudo-destinations of a `piece_type` on `square`. Targets may still hold
/// friendly or uncapturable pieces; the capture rule filters them.
pub fn attacks(piece_type: PieceType, square: Square, occupancy: Bitboard) -> Bitboard {
    ATTACK_FNS[piece_type as usize](square, occupancy)
}
