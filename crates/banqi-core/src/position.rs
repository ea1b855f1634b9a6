use rand::Rng;
use thiserror::Error;

use crate::bag::Bag;
use crate::bitboard::Bitboard;
use crate::constants::SQUARE_NB;
use crate::fen::{encode_fen, parse_fen, FenError, ParsedFen};
use crate::game::GameStatus;
use crate::movegen::{generate_moves, is_legal_step};
use crate::types::{Color, Move, MoveKind, MoveList, Piece, PieceType, Square};
use crate::zobrist::zobrist_keys;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error("illegal move {0}")]
    IllegalMove(Move),
    #[error("square {0} holds no face-down piece")]
    NotHidden(Square),
    #[error("{0:?} cannot be revealed")]
    BadReveal(Piece),
    #[error("no move to unmake")]
    EmptyHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mv: Move,
    /// Piece taken by a step, or the identity revealed by a flip.
    pub piece: Option<Piece>,
    /// Whether a flip took its identity out of the bag.
    pub from_bag: bool,
    pub turn: Color,
    pub no_progress: u16,
    pub zobrist_hash: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    squares: [Option<Piece>; SQUARE_NB],
    by_type: [Bitboard; PieceType::COUNT],
    by_color: [Bitboard; 2],
    pub turn: Color,
    pub bag: Bag,
    /// Consecutive plies without a capture or a flip.
    pub no_progress: u16,
    /// Remaining seconds, Red then Black.
    pub clock: [f64; 2],
    /// Side that attempted an illegal move, if any.
    pub illegal: Option<Color>,
    pub zobrist_hash: u64,
    pub ply: u32,
    pub history: Vec<HistoryEntry>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// All 32 squares face down, Red to move.
    pub fn new() -> Self {
        let mut position = Self::empty(Color::Red);
        for square in Square::all() {
            position.place(Piece::HIDDEN, square);
        }
        position.bag = Bag::full();
        position
    }

    /// A new game; with `hidden` false every piece is turned up at once.
    pub fn start<R: Rng + ?Sized>(hidden: bool, rng: &mut R) -> Self {
        let mut position = Self::new();
        if !hidden {
            for square in Square::all() {
                let piece = position.bag.sample(rng);
                position.bag.remove(piece);
                position.remove(square);
                position.place(piece, square);
            }
        }
        position
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let parsed = parse_fen(fen)?;
        Ok(Self::from_parsed(parsed))
    }

    pub fn fen(&self) -> String {
        encode_fen(&self.to_parsed_fen(false))
    }

    /// Position text followed by both clocks.
    pub fn fen_with_clocks(&self) -> String {
        encode_fen(&self.to_parsed_fen(true))
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn occupied(&self) -> Bitboard {
        let mut occupied = Bitboard::EMPTY;
        for bb in self.by_type {
            occupied |= bb;
        }
        occupied
    }

    pub fn pieces(&self, piece_type: PieceType) -> Bitboard {
        self.by_type[piece_type as usize]
    }

    /// Face-up pieces owned by `color`.
    pub fn pieces_of(&self, color: Color) -> Bitboard {
        self.by_color[color as usize]
    }

    pub fn pieces_by(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.by_color[color as usize] & self.by_type[piece_type as usize]
    }

    /// Face-up pieces of `color` and `piece_type` on the board.
    pub fn count(&self, color: Color, piece_type: PieceType) -> u32 {
        self.pieces_by(color, piece_type).count()
    }

    pub fn hidden(&self) -> Bitboard {
        self.pieces(PieceType::Hidden)
    }

    pub fn is_all_hidden(&self) -> bool {
        self.hidden().count() as usize == SQUARE_NB
    }

    pub fn clock(&self, color: Color) -> f64 {
        self.clock[color as usize]
    }

    /// Legal moves for the side to move.
    pub fn moves(&self) -> MoveList {
        generate_moves(self, self.turn)
    }

    pub fn moves_for(&self, color: Color) -> MoveList {
        generate_moves(self, color)
    }

    pub fn is_legal(&self, mv: Move) -> bool {
        match mv.kind() {
            MoveKind::Flip => self.hidden().contains(mv.from),
            MoveKind::Step => is_legal_step(self, self.turn, mv),
        }
    }

    /// Plays `mv`. A flip draws its identity from the bag with `rng`.
    ///
    /// The position is left untouched when the move is illegal.
    pub fn make_move<R: Rng + ?Sized>(
        &mut self,
        mv: Move,
        rng: &mut R,
    ) -> Result<(), PositionError> {
        match mv.kind() {
            MoveKind::Flip => {
                if !self.hidden().contains(mv.from) {
                    return Err(PositionError::IllegalMove(mv));
                }
                let piece = self.bag.sample(rng);
                self.flip_as(mv.from, piece)
            }
            MoveKind::Step => {
                if !is_legal_step(self, self.turn, mv) {
                    return Err(PositionError::IllegalMove(mv));
                }
                self.apply_step(mv);
                Ok(())
            }
        }
    }

    /// Turns up the face-down piece on `square` as `piece`.
    pub fn flip_as(&mut self, square: Square, piece: Piece) -> Result<(), PositionError> {
        if !self.hidden().contains(square) {
            return Err(PositionError::NotHidden(square));
        }
        if piece.color.is_none() || !piece.piece_type.is_movable() {
            return Err(PositionError::BadReveal(piece));
        }

        let first_flip = self.is_all_hidden();
        let entry = HistoryEntry {
            mv: Move::flip(square),
            piece: Some(piece),
            from_bag: self.bag.remove(piece),
            turn: self.turn,
            no_progress: self.no_progress,
            zobrist_hash: self.zobrist_hash,
        };

        self.remove(square);
        self.place(piece, square);
        self.history.push(entry);
        self.no_progress = 0;
        self.ply += 1;

        // Whoever opens by turning up a Black piece plays Black.
        if !(first_flip && piece.color == Some(Color::Black)) {
            self.switch_turn();
        }
        Ok(())
    }

    pub fn unmake_move(&mut self) -> Result<(), PositionError> {
        let entry = self.history.pop().ok_or(PositionError::EmptyHistory)?;
        let mv = entry.mv;

        match mv.kind() {
            MoveKind::Flip => {
                if let (true, Some(piece)) = (entry.from_bag, entry.piece) {
                    self.bag.add(piece);
                }
                self.remove(mv.from);
                self.place(Piece::HIDDEN, mv.from);
            }
            MoveKind::Step => {
                if let Some(mover) = self.remove(mv.to) {
                    self.place(mover, mv.from);
                }
                if let Some(captured) = entry.piece {
                    self.place(captured, mv.to);
                }
            }
        }

        self.turn = entry.turn;
        self.no_progress = entry.no_progress;
        self.zobrist_hash = entry.zobrist_hash;
        self.ply = self.ply.saturating_sub(1);
        Ok(())
    }

    /// Hash recomputed from scratch.
    pub fn compute_hash(&self) -> u64 {
        zobrist_keys().hash_squares(&self.squares, self.turn)
    }

    /// Plays random legal moves until the game ends. Returns 1 if the side
    /// to move now wins, -1 if it loses and 0 for a draw.
    pub fn simulate<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let me = self.turn;
        let mut copy = self.clone();
        copy.history.clear();
        loop {
            match copy.status() {
                GameStatus::InPlay => {}
                GameStatus::Draw(_) => return 0,
                GameStatus::Win(color, _) => return if color == me { 1 } else { -1 },
            }
            let moves = copy.moves();
            let mv = moves[rng.gen_range(0..moves.len())];
            if copy.make_move(mv, rng).is_err() {
                return 0;
            }
        }
    }

    fn empty(turn: Color) -> Self {
        let mut position = Self {
            squares: [None; SQUARE_NB],
            by_type: [Bitboard::EMPTY; PieceType::COUNT],
            by_color: [Bitboard::EMPTY; 2],
            turn,
            bag: Bag::empty(),
            no_progress: 0,
            clock: [0.0; 2],
            illegal: None,
            zobrist_hash: 0,
            ply: 0,
            history: Vec::new(),
        };
        if matches!(turn, Color::Black) {
            zobrist_keys().xor_side_to_move(&mut position.zobrist_hash);
        }
        position
    }

    fn from_parsed(parsed: ParsedFen) -> Self {
        let mut position = Self::empty(parsed.turn);
        for square in Square::all() {
            if let Some(piece) = parsed.squares[square.index()] {
                position.place(piece, square);
            }
        }
        if let Some(clock) = parsed.clock {
            position.clock = clock;
        }
        if !position.hidden().is_empty() {
            let mut bag = Bag::full();
            for piece in position.squares.iter().flatten() {
                bag.remove(*piece);
            }
            position.bag = bag;
        }
        position
    }

    fn to_parsed_fen(&self, with_clock: bool) -> ParsedFen {
        ParsedFen {
            squares: self.squares,
            turn: self.turn,
            clock: with_clock.then_some(self.clock),
        }
    }

    fn apply_step(&mut self, mv: Move) {
        let zobrist_hash = self.zobrist_hash;
        let captured = self.remove(mv.to);
        let entry = HistoryEntry {
            mv,
            piece: captured,
            from_bag: false,
            turn: self.turn,
            no_progress: self.no_progress,
            zobrist_hash,
        };
        if let Some(mover) = self.remove(mv.from) {
            self.place(mover, mv.to);
        }
        self.history.push(entry);
        self.no_progress = if captured.is_some() {
            0
        } else {
            self.no_progress.saturating_add(1)
        };
        self.ply += 1;
        self.switch_turn();
    }

    fn switch_turn(&mut self) {
        self.turn = self.turn.opposite();
        zobrist_keys().xor_side_to_move(&mut self.zobrist_hash);
    }

    fn place(&mut self, piece: Piece, square: Square) {
        debug_assert!(self.squares[square.index()].is_none());
        self.squares[square.index()] = Some(piece);
        self.by_type[piece.piece_type as usize].set(square);
        if let Some(color) = piece.color {
            self.by_color[color as usize].set(square);
        }
        zobrist_keys().xor_piece(&mut self.zobrist_hash, piece, square);
    }

    fn remove(&mut self, square: Square) -> Option<Piece> {
        let piece = self.squares[square.index()].take()?;
        self.by_type[piece.piece_type as usize].clear(square);
        if let Some(color) = piece.color {
            self.by_color[color as usize].clear(square);
        }
        zobrist_keys().xor_piece(&mut self.zobrist_hash, piece, square);
        Some(piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STARTING_FEN;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_position_is_face_down() {
        let position = Position::new();
        assert!(position.is_all_hidden());
        assert_eq!(position.bag.total(), 32);
        assert_eq!(position.fen(), STARTING_FEN);
        assert_eq!(position.zobrist_hash, position.compute_hash());
    }

    #[test]
    fn face_up_start_empties_bag() {
        let mut rng = StdRng::seed_from_u64(3);
        let position = Position::start(false, &mut rng);
        assert!(position.hidden().is_empty());
        assert!(position.bag.is_empty());
        for color in Color::ALL {
            for piece_type in PieceType::MOVABLE {
                assert_eq!(
                    position.count(color, piece_type),
                    u32::from(piece_type.initial_count())
                );
            }
        }
        assert_eq!(position.zobrist_hash, position.compute_hash());
    }

    #[test]
    fn first_black_flip_keeps_turn() {
        let mut position = Position::new();
        let black = Piece::new(PieceType::Horse, Color::Black);
        position.flip_as(Square::D2, black).unwrap();
        assert_eq!(position.turn, Color::Red);
        assert_eq!(position.zobrist_hash, position.compute_hash());

        let mut position = Position::new();
        let red = Piece::new(PieceType::Horse, Color::Red);
        position.flip_as(Square::D2, red).unwrap();
        assert_eq!(position.turn, Color::Black);
    }

    #[test]
    fn illegal_step_leaves_position_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut position = Position::from_fen("k7/8/8/7P r").unwrap();
        let before = position.clone();
        let mv = Move::step(Square::A1, Square::H4);
        assert_eq!(
            position.make_move(mv, &mut rng),
            Err(PositionError::IllegalMove(mv))
        );
        assert_eq!(position, before);
    }

    #[test]
    fn unmake_on_empty_history_errors() {
        let mut position = Position::new();
        assert_eq!(position.unmake_move(), Err(PositionError::EmptyHistory));
    }

    #[test]
    fn flip_outside_bag_is_not_returned_to_it() {
        let mut position = Position::from_fen("?7/8/8/7k r").unwrap();
        assert_eq!(position.bag.count(Color::Red, PieceType::General), 0);
        let general = Piece::new(PieceType::General, Color::Red);
        position.flip_as(Square::A1, general).unwrap();
        position.unmake_move().unwrap();
        assert_eq!(position.bag.count(Color::Red, PieceType::General), 0);
        assert_eq!(position.piece_at(Square::A1), Some(Piece::HIDDEN));
    }
}
