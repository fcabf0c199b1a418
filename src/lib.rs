//! Chess rules engine.
//!
//! A self-contained library covering board representation, legal move
//! generation with full special-rule handling (castling, en passant,
//! promotion), game-state classification (check, checkmate, stalemate,
//! fifty-move draw), and notation codecs (FEN, UCI, SAN, PGN export).
//!
//! The engine is synchronous and allocation-light: every operation is a
//! bounded computation over a 64-square board, all failures are returned
//! as [`types::ChessError`] values, and a [`board::Position`] is an
//! immutable value — applying a move yields a new position. Sessions,
//! transport, persistence and clocks are the host's concern; one
//! [`game::Game`] per in-progress game is the intended ownership model.
//!
//! ```
//! use chess_rules::{Game, GameStatus};
//!
//! let mut game = Game::new();
//! assert_eq!(game.legal_moves().len(), 20);
//! assert_eq!(game.make_uci_move("e2e4").unwrap(), "e4");
//! assert_eq!(game.status(), GameStatus::Normal);
//! ```

pub mod attacks;
pub mod board;
pub mod game;
pub mod movegen;
pub mod pgn;
pub mod san;
pub mod types;
pub mod uci;
pub mod zobrist;

pub use board::{MoveOutcome, Position, STARTING_FEN};
pub use game::{classify, Game, MoveRecord};
pub use movegen::{legal_moves, legal_moves_from};
pub use pgn::to_pgn;
pub use san::{move_to_san, parse_san};
pub use types::*;
pub use uci::{decode_uci, encode_uci};
