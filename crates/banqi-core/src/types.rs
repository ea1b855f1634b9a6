use core::fmt;
use core::str::FromStr;

use arrayvec::ArrayVec;

use crate::constants::{FILE_NB, RANK_NB, SQUARE_NB};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    Red = 0,
    Black = 1,
}

impl Color {
    pub const ALL: [Self; 2] = [Self::Red, Self::Black];

    pub const fn to_code(self) -> char {
        match self {
            Self::Red => 'r',
            Self::Black => 'b',
        }
    }

    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'r' => Some(Self::Red),
            'b' => Some(Self::Black),
            _ => None,
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Black => "BLACK",
        }
    }
}

/// Piece kinds in capture-rank order: a lower discriminant outranks a higher
/// one. `Decoy` and `Hidden` sit outside the rank order.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceType {
    General = 0,
    Advisor = 1,
    Elephant = 2,
    Chariot = 3,
    Horse = 4,
    Cannon = 5,
    Soldier = 6,
    Decoy = 7,
    Hidden = 8,
}

impl PieceType {
    pub const COUNT: usize = 9;

    /// The seven types that move and capture.
    pub const MOVABLE: [Self; 7] = [
        Self::General,
        Self::Advisor,
        Self::Elephant,
        Self::Chariot,
        Self::Horse,
        Self::Cannon,
        Self::Soldier,
    ];

    pub const ALL: [Self; 9] = [
        Self::General,
        Self::Advisor,
        Self::Elephant,
        Self::Chariot,
        Self::Horse,
        Self::Cannon,
        Self::Soldier,
        Self::Decoy,
        Self::Hidden,
    ];

    /// Pieces of this type each side starts with.
    pub const fn initial_count(self) -> u8 {
        match self {
            Self::General => 1,
            Self::Advisor | Self::Elephant | Self::Chariot | Self::Horse | Self::Cannon => 2,
            Self::Soldier => 5,
            Self::Decoy | Self::Hidden => 0,
        }
    }

    pub const fn is_movable(self) -> bool {
        (self as u8) <= (Self::Soldier as u8)
    }

    /// Whether a piece of this type may land on a square holding `victim`.
    ///
    /// Rank order decides, except that the General cannot take a Soldier, a
    /// Soldier can take the General, and a Cannon ignores rank entirely (its
    /// geometry is enforced by the attack table). Decoys and Hidden pieces
    /// are never taken and never take.
    pub const fn can_capture(self, victim: Self) -> bool {
        match (self, victim) {
            (_, Self::Decoy | Self::Hidden) | (Self::Decoy | Self::Hidden, _) => false,
            (Self::Cannon, _) => true,
            (Self::General, Self::Soldier) => false,
            (Self::Soldier, Self::General) => true,
            (attacker, victim) => (attacker as u8) <= (victim as u8),
        }
    }

    pub const fn fen_code(self) -> char {
        match self {
            Self::General => 'k',
            Self::Advisor => 'a',
            Self::Elephant => 'e',
            Self::Chariot => 'r',
            Self::Horse => 'n',
            Self::Cannon => 'c',
            Self::Soldier => 'p',
            Self::Decoy => 'd',
            Self::Hidden => '?',
        }
    }

    pub const fn from_fen_code(code: char) -> Option<Self> {
        match code {
            'k' => Some(Self::General),
            'a' => Some(Self::Advisor),
            'e' => Some(Self::Elephant),
            'r' => Some(Self::Chariot),
            'n' => Some(Self::Horse),
            'c' => Some(Self::Cannon),
            'p' => Some(Self::Soldier),
            'd' => Some(Self::Decoy),
            '?' => Some(Self::Hidden),
            _ => None,
        }
    }
}

/// A piece on a square. `color` is `None` exactly when the piece is still
/// face down.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Option<Color>,
}

impl Piece {
    pub const HIDDEN: Self = Self {
        piece_type: PieceType::Hidden,
        color: None,
    };

    pub const fn new(piece_type: PieceType, color: Color) -> Self {
        debug_assert!(!matches!(piece_type, PieceType::Hidden));
        Self {
            piece_type,
            color: Some(color),
        }
    }

    pub const fn is_hidden(self) -> bool {
        matches!(self.piece_type, PieceType::Hidden)
    }

    pub fn to_char(self) -> char {
        let code = self.piece_type.fen_code();
        match self.color {
            Some(Color::Black) => code.to_ascii_uppercase(),
            _ => code,
        }
    }

    pub fn from_char(ch: char) -> Option<Self> {
        if ch == '?' {
            return Some(Self::HIDDEN);
        }
        let piece_type = PieceType::from_fen_code(ch.to_ascii_lowercase())?;
        if piece_type == PieceType::Hidden {
            return None;
        }
        let color = if ch.is_ascii_uppercase() {
            Color::Black
        } else {
            Color::Red
        };
        Some(Self::new(piece_type, color))
    }
}

/// Board square, `rank * 8 + file`, A1 = 0 and H4 = 31.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Square(u8);

impl Square {
    pub const A1: Self = Self(0);
    pub const D2: Self = Self(11);
    pub const H4: Self = Self(31);

    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < SQUARE_NB {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn new_unchecked(index: u8) -> Self {
        Self(index)
    }

    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if (file as usize) < FILE_NB && (rank as usize) < RANK_NB {
            Some(Self(rank * FILE_NB as u8 + file))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn file(self) -> u8 {
        self.0 % FILE_NB as u8
    }

    pub const fn rank(self) -> u8 {
        self.0 / FILE_NB as u8
    }

    /// Taxicab distance in ranks plus files.
    pub const fn distance(self, other: Self) -> u8 {
        self.file().abs_diff(other.file()) + self.rank().abs_diff(other.rank())
    }

    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = self.file() as i8 + file_delta;
        let rank = self.rank() as i8 + rank_delta;
        if file < 0 || rank < 0 {
            return None;
        }
        Self::from_coords(file as u8, rank as u8)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..SQUARE_NB as u8).map(Self)
    }

    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.chars();
        let file = chars.next()?.to_ascii_uppercase();
        let rank = chars.next()?;
        if chars.next().is_some() || !('A'..='H').contains(&file) || !('1'..='4').contains(&rank)
        {
            return None;
        }
        Self::from_coords(file as u8 - b'A', rank as u8 - b'1')
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.file()) as char, self.rank() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Step,
    Flip,
}

/// A step from one square to another, or a flip when `from == to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
}

impl Move {
    pub const fn step(from: Square, to: Square) -> Self {
        Self { from, to }
    }

    pub const fn flip(square: Square) -> Self {
        Self {
            from: square,
            to: square,
        }
    }

    pub const fn kind(self) -> MoveKind {
        if self.from.0 == self.to.0 {
            MoveKind::Flip
        } else {
            MoveKind::Step
        }
    }

    pub const fn is_flip(self) -> bool {
        matches!(self.kind(), MoveKind::Flip)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            MoveKind::Flip => write!(f, "FLIP {}", self.from),
            MoveKind::Step => write!(f, "MOVE {} {}", self.from, self.to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid move text")]
pub struct ParseMoveError;

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let mv = match tokens.next() {
            Some("FLIP") => {
                let square = tokens.next().and_then(Square::parse).ok_or(ParseMoveError)?;
                Move::flip(square)
            }
            Some("MOVE") => {
                let from = tokens.next().and_then(Square::parse).ok_or(ParseMoveError)?;
                let to = tokens.next().and_then(Square::parse).ok_or(ParseMoveError)?;
                if from == to {
                    return Err(ParseMoveError);
                }
                Move::step(from, to)
            }
            _ => return Err(ParseMoveError),
        };
        if tokens.next().is_some() {
            return Err(ParseMoveError);
        }
        Ok(mv)
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(pub i32);

pub type MoveList = ArrayVec<Move, 256>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn piece_char_round_trip() {
        for piece_type in PieceType::ALL {
            if piece_type == PieceType::Hidden {
                assert_eq!(Piece::from_char('?'), Some(Piece::HIDDEN));
                continue;
            }
            for color in Color::ALL {
                let piece = Piece::new(piece_type, color);
                assert_eq!(Piece::from_char(piece.to_char()), Some(piece));
            }
        }
        assert_eq!(Piece::from_char('K'), Some(Piece::new(PieceType::General, Color::Black)));
        assert_eq!(Piece::from_char('p'), Some(Piece::new(PieceType::Soldier, Color::Red)));
        assert_eq!(Piece::from_char('x'), None);
    }

    #[test]
    fn capture_rule_exceptions() {
        use PieceType::*;

        assert!(General.can_capture(Advisor));
        assert!(!General.can_capture(Soldier));
        assert!(Soldier.can_capture(General));
        assert!(Soldier.can_capture(Soldier));
        assert!(!Soldier.can_capture(Horse));
        assert!(Chariot.can_capture(Chariot));
        assert!(!Horse.can_capture(Chariot));
        assert!(Cannon.can_capture(General));
        assert!(!Cannon.can_capture(Decoy));
        assert!(!General.can_capture(Hidden));
        assert!(!Decoy.can_capture(Soldier));
    }

    #[test]
    fn parse_square() {
        assert_eq!(Square::parse("A1"), Some(Square::A1));
        assert_eq!(Square::parse("D2"), Some(Square::D2));
        assert_eq!(Square::parse("h4"), Some(Square::H4));
        assert_eq!(Square::parse("I1"), None);
        assert_eq!(Square::parse("A5"), None);
        assert_eq!(Square::parse("A12"), None);
        assert_eq!(Square::D2.to_string(), "D2");
    }

    #[test]
    fn move_text_round_trip() {
        let step: Move = "MOVE A1 A2".parse().unwrap();
        assert_eq!(step, Move::step(Square::A1, Square::parse("A2").unwrap()));
        assert_eq!(step.to_string(), "MOVE A1 A2");

        let flip: Move = "FLIP D2".parse().unwrap();
        assert!(flip.is_flip());
        assert_eq!(flip.to_string(), "FLIP D2");

        assert!("MOVE A1".parse::<Move>().is_err());
        assert!("MOVE A1 A1".parse::<Move>().is_err());
        assert!("JUMP A1".parse::<Move>().is_err());
    }

    #[test]
    fn square_distance_is_taxicab() {
        let a1 = Square::A1;
        let h4 = Square::H4;
        assert_eq!(a1.distance(h4), 10);
        assert_eq!(Square::D2.distance(Square::D2), 0);
    }
}
