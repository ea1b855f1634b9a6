use core::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::constants::NO_PROGRESS_LIMIT;
use crate::movegen::has_moves;
use crate::position::{HistoryEntry, Position, PositionError};
use crate::types::{Color, Move, MoveList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WinReason {
    Elimination,
    DeadPosition,
    IllegalMove,
    NoProgress,
}

impl fmt::Display for WinReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Elimination => "All pieces eliminated.",
            Self::DeadPosition => "Stalemate.",
            Self::IllegalMove => "Illegal move.",
            Self::NoProgress => "30 moves without captures.",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    InPlay,
    Win(Color, WinReason),
    Draw(WinReason),
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        !matches!(self, Self::InPlay)
    }

    pub fn reason(self) -> Option<WinReason> {
        match self {
            Self::InPlay => None,
            Self::Win(_, reason) | Self::Draw(reason) => Some(reason),
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InPlay => f.write_str("IN-PLAY"),
            Self::Win(color, _) => write!(f, "{} WINS", color.name()),
            Self::Draw(_) => f.write_str("DRAW"),
        }
    }
}

impl Position {
    pub fn status(&self) -> GameStatus {
        if self.no_progress >= NO_PROGRESS_LIMIT {
            return GameStatus::Draw(WinReason::NoProgress);
        }

        for loser in [Color::Black, Color::Red] {
            if !has_moves(self, loser) {
                let reason = if self.pieces_of(loser).is_empty() {
                    WinReason::Elimination
                } else {
                    WinReason::DeadPosition
                };
                return GameStatus::Win(loser.opposite(), reason);
            }
        }

        if let Some(offender) = self.illegal {
            return GameStatus::Win(offender.opposite(), WinReason::IllegalMove);
        }
        GameStatus::InPlay
    }

    pub fn is_game_over(&self) -> bool {
        self.status().is_over()
    }
}

/// A game being refereed: a position, its own randomness for flips, and
/// the illegal-move bookkeeping.
#[derive(Debug, Clone)]
pub struct Game {
    position: Position,
    rng: StdRng,
}

impl Game {
    pub fn new(hidden: bool) -> Self {
        Self::with_rng(hidden, StdRng::from_entropy())
    }

    pub fn with_seed(hidden: bool, seed: u64) -> Self {
        Self::with_rng(hidden, StdRng::seed_from_u64(seed))
    }

    fn with_rng(hidden: bool, mut rng: StdRng) -> Self {
        let position = Position::start(hidden, &mut rng);
        Self { position, rng }
    }

    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        Ok(Self {
            position: Position::from_fen(fen)?,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn fen(&self) -> String {
        self.position.fen()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn
    }

    pub fn moves(&self) -> MoveList {
        self.position.moves()
    }

    /// Plays `mv` for the side to move. An illegal move is rejected and
    /// marks that side as the offender.
    pub fn play(&mut self, mv: Move) -> Result<(), PositionError> {
        let turn = self.position.turn;
        self.position.make_move(mv, &mut self.rng).inspect_err(|_| {
            self.position.illegal = Some(turn);
        })
    }

    pub fn undo(&mut self) -> Result<(), PositionError> {
        self.position.unmake_move()
    }

    pub fn status(&self) -> GameStatus {
        self.position.status()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.position.history
    }
}
