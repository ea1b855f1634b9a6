//! Line protocols spoken with the surrounding driver.
//!
//! The referee side answers `START`, `STATE`, `MOVE`, `FLIP` and `QUIT`.
//! The agent side reads one position line per request and answers with a
//! single move line.

use core::str::FromStr;

use thiserror::Error;

use crate::game::Game;
use crate::position::{Position, PositionError};
use crate::types::Move;

/// Clock value below which a request only informs the agent of the
/// opponent's move.
pub const NOT_YOUR_TURN_CLOCK: f64 = -1.0;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Bad Command")]
    BadStart,
    #[error("Invalid Move Format")]
    InvalidMove,
    #[error("Unknown command")]
    Unknown,
    #[error("Run START first")]
    NotStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start { hidden: bool },
    State,
    Play(Move),
    Quit,
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("START") => {
                let hidden = tokens
                    .next()
                    .and_then(|token| token.parse::<i32>().ok())
                    .ok_or(ProtocolError::BadStart)?;
                Ok(Self::Start {
                    hidden: hidden != 0,
                })
            }
            Some("STATE") => Ok(Self::State),
            Some("MOVE" | "FLIP") => line
                .trim()
                .parse::<Move>()
                .map(Self::Play)
                .map_err(|_| ProtocolError::InvalidMove),
            Some("QUIT") => Ok(Self::Quit),
            _ => Err(ProtocolError::Unknown),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Response {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Response {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn error(err: ProtocolError) -> Self {
        Self::line(format!("ERR {err}"))
    }
}

/// Referee state machine: at most one game at a time.
#[derive(Debug, Default)]
pub struct Referee {
    game: Option<Game>,
    seed: Option<u64>,
}

impl Referee {
    pub fn new() -> Self {
        Self::default()
    }

    /// Games are dealt from `seed` instead of system entropy.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            game: None,
            seed: Some(seed),
        }
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn handle(&mut self, line: &str) -> Response {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(ProtocolError::InvalidMove) if self.game.is_none() => {
                return Response::error(ProtocolError::NotStarted)
            }
            Err(err) => return Response::error(err),
        };

        match command {
            Command::Start { hidden } => {
                let game = match self.seed {
                    Some(seed) => {
                        self.seed = Some(seed.wrapping_add(1));
                        Game::with_seed(hidden, seed)
                    }
                    None => Game::new(hidden),
                };
                self.game = Some(game);
                Response::line("OK")
            }
            Command::State => {
                let Some(game) = &self.game else {
                    return Response::error(ProtocolError::NotStarted);
                };
                let status = game.status();
                let mut lines = vec![status.to_string(), game.fen()];
                if let Some(reason) = status.reason() {
                    lines.push(reason.to_string());
                }
                lines.push("OK".to_string());
                Response { lines, quit: false }
            }
            Command::Play(mv) => {
                let Some(game) = &mut self.game else {
                    return Response::error(ProtocolError::NotStarted);
                };
                // Illegal moves still answer OK; STATE reports the outcome.
                let _ = game.play(mv);
                Response::line("OK")
            }
            Command::Quit => {
                self.game = None;
                Response {
                    lines: vec!["BYE".to_string()],
                    quit: true,
                }
            }
        }
    }
}

/// One agent request: a position to move in, or a notification.
#[derive(Debug, Clone)]
pub struct Request {
    pub position: Position,
}

impl Request {
    pub fn parse(line: &str) -> Result<Self, PositionError> {
        Ok(Self {
            position: Position::from_fen(line.trim())?,
        })
    }

    /// The driver signals "not your turn" with a deeply negative clock for
    /// the side to move.
    pub fn is_notification(&self) -> bool {
        self.position.clock(self.position.turn) < NOT_YOUR_TURN_CLOCK
    }
}
