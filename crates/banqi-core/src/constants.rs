use crate::types::Square;

pub const FILE_NB: usize = 8;
pub const RANK_NB: usize = 4;
pub const SQUARE_NB: usize = FILE_NB * RANK_NB;

/// Square flipped when the whole board is still face down.
pub const OPENING_FLIP: Square = Square::D2;

/// Quiet plies in a row after which the game is drawn.
pub const NO_PROGRESS_LIMIT: u16 = 30;

pub const RED: char = 'r';
pub const BLACK: char = 'b';

pub const HIDDEN_CODE: char = '?';

pub const RANK_SEPARATOR: char = '/';

pub const STARTING_FEN: &str = "????????/????????/????????/???????? r";
