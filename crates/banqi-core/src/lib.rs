pub mod attacks;
pub mod bag;
pub mod bitboard;
pub mod constants;
pub mod eval;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod position;
pub mod protocol;
pub mod search;
pub mod types;
pub mod zobrist;

pub use attacks::{attacks, cannon_attacks, pext, sliding_attack, step_attacks};
pub use bag::Bag;
pub use bitboard::{line_mask, Bitboard};
pub use constants::{NO_PROGRESS_LIMIT, OPENING_FLIP, SQUARE_NB, STARTING_FEN};
pub use eval::Evaluator;
pub use fen::{encode_fen, parse_fen, validate_fen, FenError, ParsedFen};
pub use game::{Game, GameStatus, WinReason};
pub use movegen::{destinations, generate_captures, generate_moves, has_moves, is_legal_step};
pub use position::{HistoryEntry, Position, PositionError};
pub use protocol::{Command, ProtocolError, Referee, Request, Response, NOT_YOUR_TURN_CLOCK};
pub use search::{SearchLimits, SearchResult, Searcher};
pub use types::{Color, Move, MoveKind, MoveList, ParseMoveError, Piece, PieceType, Score, Square};
pub use zobrist::{zobrist_keys, ZobristKeys};
