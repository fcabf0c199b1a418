//! Stateful game controller wrapping `Position`.
//!
//! `Game` owns one position value per game session (no shared globals),
//! manages move history, value-snapshot undo, repetition tracking, and
//! status detection. It is the surface the surrounding session/transport
//! layer interacts with.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::board::Position;
use crate::movegen;
use crate::san;
use crate::types::{ChessError, Color, GameStatus, Move, Piece, PieceType, Square};
use crate::uci;

// =========================================================================
// Classification
// =========================================================================

/// Classify a position: pure function, re-derivable at any time.
///
/// Checkmate and stalemate are rule-terminal and take priority over the
/// fifty-move draw; the draw in turn outranks a plain check, since it can
/// be claimed even mid-check sequence.
pub fn classify(pos: &Position) -> GameStatus {
    let has_moves = !movegen::legal_moves(pos).is_empty();
    let in_check = pos.is_in_check();

    if !has_moves {
        return if in_check {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        };
    }
    if pos.halfmove_clock >= 100 {
        return GameStatus::FiftyMoveDraw;
    }
    if in_check {
        GameStatus::Check
    } else {
        GameStatus::Normal
    }
}

// =========================================================================
// MoveRecord
// =========================================================================

/// A recorded move in the game history.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    /// The move that was played.
    pub mv: Move,
    /// SAN notation for the move, computed at move time.
    pub san: String,
    /// Game status after the move.
    pub status_after: GameStatus,
}

// =========================================================================
// Game
// =========================================================================

/// A complete chess game with history, undo, and status tracking.
#[derive(Clone, Debug)]
pub struct Game {
    // Core state
    position: Position,
    history: Vec<MoveRecord>,
    /// Position before each recorded move; undo pops one back.
    snapshots: Vec<Position>,
    /// Keys of all positions reached (including the current one), for
    /// threefold-repetition queries.
    repetition_keys: Vec<u64>,

    status: GameStatus,

    // Metadata
    pub id: String,
    pub white_player: String,
    pub black_player: String,
    pub created_at: DateTime<Utc>,

    started_from_fen: bool,
    starting_fen: String,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        Self::with_position(Position::starting(), false)
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        Ok(Self::with_position(Position::from_fen(fen)?, true))
    }

    fn with_position(position: Position, started_from_fen: bool) -> Self {
        let starting_fen = position.to_fen();
        let key = position.zobrist_key();
        let status = classify(&position);
        let game = Game {
            position,
            history: Vec::new(),
            snapshots: Vec::new(),
            repetition_keys: vec![key],
            status,
            id: Uuid::new_v4().to_string(),
            white_player: "Player".into(),
            black_player: "Player".into(),
            created_at: Utc::now(),
            started_from_fen,
            starting_fen,
        };
        tracing::debug!(game_id = %game.id, fen = %game.starting_fen, "game created");
        game
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Current game status.
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Side to move.
    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    /// Completed move history.
    pub fn move_history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.position)
    }

    /// Legal moves from a specific square.
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Move> {
        movegen::legal_moves_from(&self.position, sq)
    }

    /// Whether the game is over.
    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Current position as FEN.
    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// Whether the game was started from a custom FEN.
    pub fn started_from_fen(&self) -> bool {
        self.started_from_fen
    }

    /// The starting FEN.
    pub fn starting_fen(&self) -> &str {
        &self.starting_fen
    }

    /// Fullmove number.
    pub fn fullmove_number(&self) -> u16 {
        self.position.fullmove_number
    }

    /// Halfmove clock (for the fifty-move rule).
    pub fn halfmove_clock(&self) -> u16 {
        self.position.halfmove_clock
    }

    // -----------------------------------------------------------------
    // Make move
    // -----------------------------------------------------------------

    /// Play a move. Returns the SAN notation of the move played.
    ///
    /// The caller only needs to supply origin, destination and promotion
    /// choice; the move is matched against the legal-move set and the
    /// matching move's flags are used. Returns `ChessError::GameOver` if
    /// the game is finished, `ChessError::InvalidMove` if no legal move
    /// matches.
    pub fn make_move(&mut self, mv: Move) -> Result<String, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }

        let legal = self.legal_moves();
        let canonical = legal
            .iter()
            .find(|m| m.from == mv.from && m.to == mv.to && m.promotion == mv.promotion)
            .copied()
            .ok_or_else(|| {
                tracing::warn!(game_id = %self.id, mv = %mv, "rejected illegal move");
                ChessError::InvalidMove {
                    from: mv.from.to_algebraic(),
                    to: mv.to.to_algebraic(),
                    reason: "not a legal move".into(),
                }
            })?;

        let outcome = self.position.apply_move(canonical)?;
        let status = classify(&outcome.position);
        let san = san::move_to_san(
            &self.position,
            canonical,
            &legal,
            outcome.gives_check,
            status == GameStatus::Checkmate,
        );

        self.snapshots
            .push(std::mem::replace(&mut self.position, outcome.position));
        self.repetition_keys.push(self.position.zobrist_key());
        self.status = status;
        self.history.push(MoveRecord {
            mv: canonical,
            san: san.clone(),
            status_after: status,
        });

        tracing::debug!(game_id = %self.id, mv = %canonical, san = %san, status = %status, "move played");
        Ok(san)
    }

    /// Decode a UCI move string against the current position and play it.
    pub fn make_uci_move(&mut self, uci_move: &str) -> Result<String, ChessError> {
        let mv = uci::decode_uci(uci_move, &self.position)?;
        self.make_move(mv)
    }

    // -----------------------------------------------------------------
    // Undo move
    // -----------------------------------------------------------------

    /// Undo the last move. Returns the move that was undone.
    pub fn undo_move(&mut self) -> Result<Move, ChessError> {
        let record = self.history.pop().ok_or(ChessError::NothingToUndo)?;
        let previous = self
            .snapshots
            .pop()
            .expect("snapshot stack tracks history");
        self.repetition_keys.pop();

        self.position = previous;
        self.status = classify(&self.position);
        Ok(record.mv)
    }

    // -----------------------------------------------------------------
    // Draw-adjacent queries
    // -----------------------------------------------------------------

    /// Has the current position occurred three or more times in this game?
    pub fn is_threefold_repetition(&self) -> bool {
        let current = *self
            .repetition_keys
            .last()
            .expect("at least the current position is recorded");
        self.repetition_keys
            .iter()
            .filter(|&&k| k == current)
            .count()
            >= 3
    }

    /// Neither side can possibly deliver checkmate: K vs K, K+minor vs K,
    /// or K+B vs K+B with both bishops on the same square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = [0u32; 2];
        let mut bishop_square_color = [None::<u8>; 2];

        for sq in Square::all() {
            let Some(piece) = self.position.piece_at(sq) else {
                continue;
            };
            match piece.kind {
                PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
                PieceType::King => {}
                PieceType::Knight => minors[piece.color.index()] += 1,
                PieceType::Bishop => {
                    minors[piece.color.index()] += 1;
                    bishop_square_color[piece.color.index()] =
                        Some((sq.file() + sq.rank()) & 1);
                }
            }
        }

        match minors {
            // K vs K, or K+minor vs K.
            [0, 0] | [1, 0] | [0, 1] => true,
            // K+B vs K+B: drawn only when both bishops live on the same
            // square colour.
            [1, 1] => match bishop_square_color {
                [Some(w), Some(b)] => w == b,
                _ => false,
            },
            _ => false,
        }
    }

    // -----------------------------------------------------------------
    // Board array (for host display layers)
    // -----------------------------------------------------------------

    /// Generate an 8×8 board array (row-major, rank 8 first → rank 1 last).
    /// Empty squares are empty strings; pieces are like "wP", "bK".
    pub fn board_array(&self) -> [[String; 8]; 8] {
        let mut board: [[String; 8]; 8] =
            std::array::from_fn(|_| std::array::from_fn(|_| String::new()));
        for row in 0..8u8 {
            for file in 0..8u8 {
                let sq = Square::from_file_rank(file, 7 - row);
                if let Some(Piece { color, kind }) = self.position.piece_at(sq) {
                    let c = match color {
                        Color::White => 'w',
                        Color::Black => 'b',
                    };
                    board[row as usize][file as usize] = format!("{c}{}", kind.letter());
                }
            }
        }
        board
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
