//! Attack detection over the mailbox board.
//!
//! Works purely with pseudo-legal attack patterns: a square is "attacked"
//! if some piece of the attacking colour could capture onto it, ignoring
//! pins and whose turn it is. Check detection and the castling safety
//! check both build on this, so it must never call back into the
//! legality-filtered move generator.

use crate::board::Position;
use crate::types::{Color, Piece, PieceType, Square};

// =========================================================================
// Direction tables
// =========================================================================

/// Orthogonal ray directions as (file, rank) deltas.
pub const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// Diagonal ray directions as (file, rank) deltas.
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// The eight knight jumps.
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// The eight king steps.
pub const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Offset a square by a (file, rank) delta, `None` when it falls off the
/// board. The single place edge handling lives.
#[inline]
pub fn shift(sq: Square, df: i8, dr: i8) -> Option<Square> {
    let file = sq.file() as i8 + df;
    let rank = sq.rank() as i8 + dr;
    if (0..8).contains(&file) && (0..8).contains(&rank) {
        Some(Square::from_file_rank(file as u8, rank as u8))
    } else {
        None
    }
}

// =========================================================================
// Attack queries
// =========================================================================

/// Is `sq` attacked by any piece of colour `by`?
pub fn is_square_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    // Pawns: a pawn of `by` attacks sq from one rank toward its own side.
    let pawn_rank_delta = -by.pawn_direction();
    for df in [-1i8, 1] {
        if let Some(s) = shift(sq, df, pawn_rank_delta) {
            if pos.piece_at(s) == Some(Piece::new(by, PieceType::Pawn)) {
                return true;
            }
        }
    }

    // Knights.
    for &(df, dr) in &KNIGHT_JUMPS {
        if let Some(s) = shift(sq, df, dr) {
            if pos.piece_at(s) == Some(Piece::new(by, PieceType::Knight)) {
                return true;
            }
        }
    }

    // Enemy king (adjacency only; kings cannot give check in a legal game
    // but the castling safety check still needs this pattern).
    for &(df, dr) in &KING_STEPS {
        if let Some(s) = shift(sq, df, dr) {
            if pos.piece_at(s) == Some(Piece::new(by, PieceType::King)) {
                return true;
            }
        }
    }

    // Rook / queen along ranks and files.
    if ray_hits(pos, sq, by, &ROOK_DIRS, PieceType::Rook) {
        return true;
    }

    // Bishop / queen along diagonals.
    if ray_hits(pos, sq, by, &BISHOP_DIRS, PieceType::Bishop) {
        return true;
    }

    false
}

/// Walk each ray from `sq`; true if the first occupied square holds a
/// `by`-coloured `slider` or queen.
fn ray_hits(pos: &Position, sq: Square, by: Color, dirs: &[(i8, i8)], slider: PieceType) -> bool {
    for &(df, dr) in dirs {
        let mut cur = sq;
        while let Some(s) = shift(cur, df, dr) {
            match pos.piece_at(s) {
                None => cur = s,
                Some(p) => {
                    if p.color == by && (p.kind == slider || p.kind == PieceType::Queen) {
                        return true;
                    }
                    break;
                }
            }
        }
    }
    false
}

// =========================================================================
// Tests
// =========================================================================
