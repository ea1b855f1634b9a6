use thiserror::Error;

use crate::constants::{FILE_NB, RANK_NB, RANK_SEPARATOR, SQUARE_NB};
use crate::types::{Color, Piece, Square};

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFen {
    pub squares: [Option<Piece>; SQUARE_NB],
    pub turn: Color,
    /// Remaining seconds, Red then Black, when the text carries them.
    pub clock: Option<[f64; 2]>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid fen")]
    Invalid,
    #[error("{0}")]
    Validation(String),
    #[error("invalid piece '{0}'")]
    InvalidPiece(char),
    #[error("invalid side to move '{0}'")]
    InvalidTurn(String),
    #[error("invalid clock '{0}'")]
    InvalidClock(String),
}

pub fn validate_fen(fen: &str) -> Result<(), FenError> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    if parts.len() != 2 && parts.len() != 4 {
        return Err(FenError::Validation(format!(
            "expected 2 or 4 fields, got {}",
            parts.len()
        )));
    }

    let ranks: Vec<&str> = parts[0].split(RANK_SEPARATOR).collect();
    if ranks.len() != RANK_NB {
        return Err(FenError::Validation(format!(
            "expected {RANK_NB} ranks, got {}",
            ranks.len()
        )));
    }

    for (idx, rank) in ranks.iter().enumerate() {
        let mut width = 0usize;
        let mut previous_digit = false;
        for ch in rank.chars() {
            if let Some(run) = ch.to_digit(10) {
                if !(1..=FILE_NB as u32).contains(&run) || previous_digit {
                    return Err(FenError::Validation(format!(
                        "rank {} has a bad empty run",
                        idx + 1
                    )));
                }
                width += run as usize;
                previous_digit = true;
            } else {
                Piece::from_char(ch).ok_or(FenError::InvalidPiece(ch))?;
                width += 1;
                previous_digit = false;
            }
        }
        if width != FILE_NB {
            return Err(FenError::Validation(format!(
                "rank {} covers {width} squares",
                idx + 1
            )));
        }
    }

    parse_turn(parts[1])?;
    for clock in parts.iter().skip(2) {
        parse_clock(clock)?;
    }
    Ok(())
}

pub fn parse_fen(fen: &str) -> Result<ParsedFen, FenError> {
    validate_fen(fen)?;
    let parts: Vec<&str> = fen.split_whitespace().collect();

    let mut squares = [None; SQUARE_NB];
    for (rank, field) in parts[0].split(RANK_SEPARATOR).enumerate() {
        let mut file = 0u8;
        for ch in field.chars() {
            if let Some(run) = ch.to_digit(10) {
                file += run as u8;
                continue;
            }
            let square = Square::from_coords(file, rank as u8).ok_or(FenError::Invalid)?;
            squares[square.index()] = Some(Piece::from_char(ch).ok_or(FenError::InvalidPiece(ch))?);
            file += 1;
        }
    }

    let clock = if parts.len() == 4 {
        Some([parse_clock(parts[2])?, parse_clock(parts[3])?])
    } else {
        None
    };

    Ok(ParsedFen {
        squares,
        turn: parse_turn(parts[1])?,
        clock,
    })
}

pub fn encode_fen(state: &ParsedFen) -> String {
    let mut fen = String::with_capacity(64);
    for rank in 0..RANK_NB as u8 {
        if rank > 0 {
            fen.push(RANK_SEPARATOR);
        }
        let mut empty = 0u8;
        for file in 0..FILE_NB as u8 {
            let square = Square::new_unchecked(rank * FILE_NB as u8 + file);
            match state.squares[square.index()] {
                Some(piece) => {
                    if empty > 0 {
                        fen.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    fen.push(piece.to_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            fen.push((b'0' + empty) as char);
        }
    }

    fen.push(' ');
    fen.push(state.turn.to_code());
    if let Some([red, black]) = state.clock {
        fen.push_str(&format!(" {red} {black}"));
    }
    fen
}

fn parse_turn(token: &str) -> Result<Color, FenError> {
    let mut chars = token.chars();
    match (chars.next().and_then(Color::from_code), chars.next()) {
        (Some(color), None) => Ok(color),
        _ => Err(FenError::InvalidTurn(token.to_string())),
    }
}

fn parse_clock(token: &str) -> Result<f64, FenError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FenError::InvalidClock(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceType;

    #[test]
    fn ranks_run_from_one_to_four() {
        let parsed = parse_fen("k7/8/8/7P b").unwrap();
        assert_eq!(
            parsed.squares[Square::A1.index()],
            Some(Piece::new(PieceType::General, Color::Red))
        );
        assert_eq!(
            parsed.squares[Square::H4.index()],
            Some(Piece::new(PieceType::Soldier, Color::Black))
        );
        assert_eq!(parsed.turn, Color::Black);
        assert_eq!(parsed.clock, None);
    }

    #[test]
    fn clocks_are_seconds() {
        let parsed = parse_fen("????????/????????/????????/???????? r 899.5 -9999").unwrap();
        assert_eq!(parsed.clock, Some([899.5, -9999.0]));
        assert_eq!(
            encode_fen(&parsed),
            "????????/????????/????????/???????? r 899.5 -9999"
        );
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(matches!(parse_fen("8/8/8 r"), Err(FenError::Validation(_))));
        assert!(matches!(parse_fen("9/8/8/8 r"), Err(FenError::Validation(_))));
        assert!(matches!(parse_fen("7/8/8/8 r"), Err(FenError::Validation(_))));
        assert!(matches!(parse_fen("44/8/8/8 r"), Err(FenError::Validation(_))));
        assert_eq!(parse_fen("x7/8/8/8 r"), Err(FenError::InvalidPiece('x')));
        assert!(matches!(parse_fen("8/8/8/8 w"), Err(FenError::InvalidTurn(_))));
        assert!(matches!(parse_fen("8/8/8/8 r 1.0 abc"), Err(FenError::InvalidClock(_))));
        assert!(matches!(parse_fen("8/8/8/8 r 1.0"), Err(FenError::Validation(_))));
    }
}
