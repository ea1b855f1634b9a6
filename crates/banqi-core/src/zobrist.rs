use std::sync::LazyLock;

use crate::constants::SQUARE_NB;
use crate::types::{Color, Piece, Square};

/// Seven identities per owner plus one shared face-down slot.
const IDENTITY_SLOTS: usize = 7 * 2 + 1;
const HIDDEN_SLOT: usize = IDENTITY_SLOTS - 1;

static ZOBRIST_KEYS: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[derive(Debug, Clone)]
pub struct ZobristKeys {
    piece_square: [[u64; SQUARE_NB]; IDENTITY_SLOTS],
    side_to_move: u64,
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    &ZOBRIST_KEYS
}

impl ZobristKeys {
    fn new() -> Self {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;

        let mut piece_square = [[0u64; SQUARE_NB]; IDENTITY_SLOTS];
        for row in &mut piece_square {
            for key in row.iter_mut() {
                *key = next_u64(&mut state);
            }
        }

        Self {
            piece_square,
            side_to_move: next_u64(&mut state),
        }
    }

    fn slot(piece: Piece) -> Option<usize> {
        match piece.color {
            None => Some(HIDDEN_SLOT),
            Some(color) if piece.piece_type.is_movable() => {
                Some(color as usize * 7 + piece.piece_type as usize)
            }
            // Decoys carry no key.
            Some(_) => None,
        }
    }

    pub fn piece_key(&self, piece: Piece, square: Square) -> Option<u64> {
        Self::slot(piece).map(|slot| self.piece_square[slot][square.index()])
    }

    pub fn xor_piece(&self, hash: &mut u64, piece: Piece, square: Square) {
        if let Some(key) = self.piece_key(piece, square) {
            *hash ^= key;
        }
    }

    pub fn xor_side_to_move(&self, hash: &mut u64) {
        *hash ^= self.side_to_move;
    }

    pub fn hash_squares(&self, squares: &[Option<Piece>; SQUARE_NB], turn: Color) -> u64 {
        let mut hash = 0u64;
        for square in Square::all() {
            if let Some(piece) = squares[square.index()] {
                self.xor_piece(&mut hash, piece, square);
            }
        }
        if matches!(turn, Color::Black) {
            hash ^= self.side_to_move;
        }
        hash
    }
}

fn next_u64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
