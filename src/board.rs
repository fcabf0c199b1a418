//! Mailbox chess position representation.
//!
//! `Position` stores piece placement as a 64-slot array of optional pieces,
//! plus side to move, castling rights, en-passant square, move counters,
//! and a cached king square per side. The cache is maintained on every
//! move application so check detection never has to rescan the board.
//!
//! A `Position` is an immutable value: applying a move produces a *new*
//! position and leaves the original untouched, so a rejected move can
//! never leak half-applied state.

use crate::attacks;
use crate::types::{
    CastlingRights, ChessError, Color, Move, Piece, PieceType, Square,
};
use crate::zobrist;

/// The standard starting position in FEN.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A complete chess position.
///
/// Board layout follows LERF (Little-Endian Rank-File) mapping:
/// a1 = 0, b1 = 1, … h1 = 7, a2 = 8, … h8 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// Piece placement, indexed by square.
    squares: [Option<Piece>; 64],

    /// Whose turn it is.
    pub side_to_move: Color,

    /// Castling availability (K/Q/k/q).
    pub castling_rights: CastlingRights,

    /// En-passant target square (the square *behind* the double-pushed pawn).
    pub en_passant: Option<Square>,

    /// Half-move clock for the fifty-move rule (reset on pawn move or capture).
    pub halfmove_clock: u16,

    /// Full-move number (starts at 1, incremented after Black moves).
    pub fullmove_number: u16,

    /// Cached king squares: `kings[color]`. Never stale — updated whenever
    /// a king moves and rebuilt on FEN load.
    kings: [Square; 2],
}

// ---------------------------------------------------------------------------
// MoveOutcome
// ---------------------------------------------------------------------------

/// Everything a successful move application produces: the successor
/// position, what was captured (if anything), and whether the move put the
/// new side to move in check.
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    pub position: Position,
    pub captured: Option<Piece>,
    pub gives_check: bool,
}

// ---------------------------------------------------------------------------
// Construction & queries
// ---------------------------------------------------------------------------

impl Position {
    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is always valid")
    }

    /// What piece (if any) is on a given square?
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.0 as usize]
    }

    /// Cached king square for the given colour.
    #[inline]
    pub fn king_sq(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Is `sq` attacked by any piece of colour `by`?
    #[inline]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        attacks::is_square_attacked(self, sq, by)
    }

    /// Is the side-to-move's king currently in check?
    #[inline]
    pub fn is_in_check(&self) -> bool {
        let king = self.king_sq(self.side_to_move);
        self.is_square_attacked(king, !self.side_to_move)
    }

    /// Occupied squares holding pieces of `color`, a1 first.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| {
            self.piece_at(sq)
                .filter(|p| p.color == color)
                .map(|p| (sq, p))
        })
    }

    /// Deterministic position key covering placement, side to move,
    /// castling rights and en-passant file (not the move counters).
    #[inline]
    pub fn zobrist_key(&self) -> u64 {
        zobrist::hash(self)
    }

    #[inline]
    fn take_piece(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.0 as usize].take()
    }

    #[inline]
    fn set_piece(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.0 as usize] = piece;
    }
}

// ---------------------------------------------------------------------------
// Move application
// ---------------------------------------------------------------------------

impl Position {
    /// Apply a move, producing the successor position.
    ///
    /// The caller is expected to pass a move from the legal-move set; as a
    /// defence in depth the executor re-checks king safety after applying
    /// the side effects and rejects the move if the mover's king would be
    /// left attacked. On any error the original position is untouched.
    pub fn apply_move(&self, mv: Move) -> Result<MoveOutcome, ChessError> {
        let us = self.side_to_move;
        let them = !us;

        let piece = self
            .piece_at(mv.from)
            .ok_or_else(|| illegal(mv, "no piece on origin square"))?;
        if piece.color != us {
            return Err(illegal(mv, "piece belongs to the opponent"));
        }

        let mut next = self.clone();

        // Capture first, so the destination is free for the mover.
        let captured = if mv.flags.is_en_passant() {
            next.take_piece(behind(mv.to, us))
        } else {
            match next.piece_at(mv.to) {
                Some(target) if target.color == us => {
                    return Err(illegal(mv, "destination occupied by own piece"));
                }
                Some(_) => next.take_piece(mv.to),
                None => None,
            }
        };

        // Move the piece, promoting if requested.
        next.take_piece(mv.from);
        let landing = match mv.promotion {
            Some(kind) => Piece::new(us, kind),
            None => piece,
        };
        next.set_piece(mv.to, Some(landing));
        if piece.kind == PieceType::King {
            next.kings[us.index()] = mv.to;
        }

        // Castling relocates the rook as well.
        if mv.flags.is_castling() {
            let (rook_from, rook_to) = castling_rook_squares(mv.to)
                .ok_or_else(|| illegal(mv, "not a castling destination"))?;
            let rook = next.take_piece(rook_from);
            next.set_piece(rook_to, rook);
        }

        // Castling rights: one-way transitions keyed on the squares a move
        // touches, which also covers a rook captured on its home corner.
        next.castling_rights.0 &=
            CASTLING_MASK[mv.from.0 as usize] & CASTLING_MASK[mv.to.0 as usize];

        // En-passant eligibility lasts exactly one move.
        next.en_passant = if mv.flags.is_double_push() {
            Some(behind(mv.to, us))
        } else {
            None
        };

        // Clocks.
        next.halfmove_clock = if piece.kind == PieceType::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock + 1
        };
        if us == Color::Black {
            next.fullmove_number += 1;
        }

        next.side_to_move = them;

        // Defence in depth: the mover's king must not be left attacked.
        if next.is_square_attacked(next.king_sq(us), them) {
            return Err(illegal(mv, "move leaves own king in check"));
        }

        let gives_check = next.is_in_check();
        Ok(MoveOutcome {
            position: next,
            captured,
            gives_check,
        })
    }
}

fn illegal(mv: Move, reason: &str) -> ChessError {
    ChessError::InvalidMove {
        from: mv.from.to_algebraic(),
        to: mv.to.to_algebraic(),
        reason: reason.to_string(),
    }
}

/// The square one rank behind `sq` from `color`'s point of view. Both the
/// en-passant target after a double push and the captured pawn's square in
/// an en-passant capture sit there.
#[inline]
fn behind(sq: Square, color: Color) -> Square {
    Square((sq.0 as i8 - 8 * color.pawn_direction()) as u8)
}

/// For a king-destination square (after castling), return (rook_from, rook_to).
fn castling_rook_squares(king_to: Square) -> Option<(Square, Square)> {
    match king_to.0 {
        // White kingside: king e1→g1, rook h1→f1.
        6 => Some((Square(7), Square(5))),
        // White queenside: king e1→c1, rook a1→d1.
        2 => Some((Square(0), Square(3))),
        // Black kingside: king e8→g8, rook h8→f8.
        62 => Some((Square(63), Square(61))),
        // Black queenside: king e8→c8, rook a8→d8.
        58 => Some((Square(56), Square(59))),
        _ => None,
    }
}

/// Mask table indexed by square index. When a move touches a square, AND
/// the castling rights with this mask. E.g. if a rook on a1 moves (or is
/// captured), remove White-queenside. The king's home square removes both
/// of that side's rights.
#[rustfmt::skip]
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [0b1111u8; 64];
    // a1 (0): remove white-queenside
    mask[0]  = 0b1111 & !CastlingRights::WHITE_QUEENSIDE;
    // e1 (4): remove both white rights
    mask[4]  = 0b1111 & !(CastlingRights::WHITE_KINGSIDE | CastlingRights::WHITE_QUEENSIDE);
    // h1 (7): remove white-kingside
    mask[7]  = 0b1111 & !CastlingRights::WHITE_KINGSIDE;
    // a8 (56): remove black-queenside
    mask[56] = 0b1111 & !CastlingRights::BLACK_QUEENSIDE;
    // e8 (60): remove both black rights
    mask[60] = 0b1111 & !(CastlingRights::BLACK_KINGSIDE | CastlingRights::BLACK_QUEENSIDE);
    // h8 (63): remove black-kingside
    mask[63] = 0b1111 & !CastlingRights::BLACK_KINGSIDE;
    mask
};

// ---------------------------------------------------------------------------
// FEN parsing & generation
// ---------------------------------------------------------------------------

impl Position {
    /// Parse a FEN string into a `Position`.
    ///
    /// Validates all 6 fields (piece placement, side to move, castling,
    /// en passant, halfmove clock, fullmove number), rejects boards without
    /// exactly one king per side, and rebuilds the king-square cache.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(ChessError::InvalidFen(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }

        // ----- Field 1: Piece placement -----
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidFen(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut squares = [None; 64];
        let mut kings = [None, None];

        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8; // FEN starts from rank 8
            let mut file: u8 = 0;
            for ch in rank_str.chars() {
                if file > 7 {
                    return Err(ChessError::InvalidFen(format!(
                        "too many squares in rank {}",
                        rank + 1
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidFen(format!(
                            "invalid empty count '{ch}' in rank {}",
                            rank + 1
                        )));
                    }
                    file += digit as u8;
                } else if let Some(piece) = Piece::from_char(ch) {
                    let sq = Square::from_file_rank(file, rank);
                    if piece.kind == PieceType::King {
                        if kings[piece.color.index()].is_some() {
                            return Err(ChessError::InvalidFen(format!(
                                "{} has more than one king",
                                piece.color
                            )));
                        }
                        kings[piece.color.index()] = Some(sq);
                    }
                    squares[sq.0 as usize] = Some(piece);
                    file += 1;
                } else {
                    return Err(ChessError::InvalidFen(format!(
                        "invalid character '{ch}' in piece placement"
                    )));
                }
            }
            if file != 8 {
                return Err(ChessError::InvalidFen(format!(
                    "rank {} has {} squares instead of 8",
                    rank + 1,
                    file
                )));
            }
        }

        let kings = match kings {
            [Some(white), Some(black)] => [white, black],
            [None, _] => {
                return Err(ChessError::InvalidFen("white has no king".to_string()));
            }
            [_, None] => {
                return Err(ChessError::InvalidFen("black has no king".to_string()));
            }
        };

        // ----- Field 2: Side to move -----
        let side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(ChessError::InvalidFen(format!(
                    "invalid side to move: '{other}'"
                )));
            }
        };

        // ----- Field 3: Castling availability -----
        let castling_rights = CastlingRights::from_fen(fields[2]).ok_or_else(|| {
            ChessError::InvalidFen(format!("invalid castling string: '{}'", fields[2]))
        })?;

        // ----- Field 4: En passant target square -----
        let en_passant = if fields[3] == "-" {
            None
        } else {
            let ep_sq = Square::from_algebraic(fields[3]).ok_or_else(|| {
                ChessError::InvalidFen(format!("invalid en passant square: '{}'", fields[3]))
            })?;
            // The target must be on rank 3 (White pushed) or rank 6 (Black pushed).
            let rank = ep_sq.rank();
            if rank != 2 && rank != 5 {
                return Err(ChessError::InvalidFen(format!(
                    "en passant square {} is not on rank 3 or 6",
                    fields[3]
                )));
            }
            Some(ep_sq)
        };

        // ----- Field 5: Halfmove clock -----
        let halfmove_clock = fields[4].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid halfmove clock: '{}'", fields[4]))
        })?;

        // ----- Field 6: Fullmove number -----
        let fullmove_number = fields[5].parse::<u16>().map_err(|_| {
            ChessError::InvalidFen(format!("invalid fullmove number: '{}'", fields[5]))
        })?;
        if fullmove_number == 0 {
            return Err(ChessError::InvalidFen(
                "fullmove number must be >= 1".to_string(),
            ));
        }

        Ok(Position {
            squares,
            side_to_move,
            castling_rights,
            en_passant,
            halfmove_clock,
            fullmove_number,
            kings,
        })
    }

    /// Export the position as a FEN string.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(80);

        // ----- Field 1: Piece placement -----
        for rank in (0..8).rev() {
            let mut empty_count = 0u8;
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                match self.piece_at(sq) {
                    Some(piece) => {
                        if empty_count > 0 {
                            fen.push((b'0' + empty_count) as char);
                            empty_count = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => {
                        empty_count += 1;
                    }
                }
            }
            if empty_count > 0 {
                fen.push((b'0' + empty_count) as char);
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        // ----- Field 2: Side to move -----
        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        // ----- Field 3: Castling -----
        fen.push(' ');
        fen.push_str(&self.castling_rights.to_fen());

        // ----- Field 4: En passant -----
        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_algebraic()),
            None => fen.push('-'),
        }

        // ----- Field 5: Halfmove clock -----
        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());

        // ----- Field 6: Fullmove number -----
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }

    // -----------------------------------------------------------------------
    // Board display (8×8 text grid)
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line string (rank 8 at top), useful for
    /// debugging.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for rank in (0..8).rev() {
            s.push((b'1' + rank) as char);
            s.push(' ');
            for file in 0..8 {
                let sq = Square::from_file_rank(file, rank);
                let ch = match self.piece_at(sq) {
                    Some(piece) => piece.to_char(),
                    None => '.',
                };
                s.push(ch);
                if file < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
