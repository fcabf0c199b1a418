//! Legal move generation.
//!
//! Pipeline:
//!   1. Generate pseudo-legal moves per piece type (ignoring pins and
//!      check evasion).
//!   2. Filter: apply each move to a scratch copy and keep it only if the
//!      mover's king is not attacked afterwards.
//!
//! Simulate-and-check keeps the generator simple and correct on a 64-square
//! board; there is no incremental pin or discovered-check tracking.

use crate::attacks::{self, BISHOP_DIRS, KING_STEPS, KNIGHT_JUMPS, ROOK_DIRS};
use crate::board::Position;
use crate::types::{Color, Move, MoveFlags, PieceType, Square};

// =========================================================================
// Public API
// =========================================================================

/// Generate all legal moves for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut pseudo = Vec::with_capacity(64);
    generate_pseudo_legal(pos, &mut pseudo);

    // Keep only moves after which the mover's king is safe. `apply_move`
    // performs exactly that check (and carries out all special-move side
    // effects first), so a successful application is the legality test.
    pseudo
        .into_iter()
        .filter(|&mv| pos.apply_move(mv).is_ok())
        .collect()
}

/// Generate all legal moves originating from a specific square.
///
/// Defensive: an empty square or one holding the opponent's piece simply
/// yields no moves.
pub fn legal_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    match pos.piece_at(from) {
        Some(piece) if piece.color == pos.side_to_move => legal_moves(pos)
            .into_iter()
            .filter(|m| m.from == from)
            .collect(),
        _ => Vec::new(),
    }
}

// =========================================================================
// Pseudo-legal generation (internal)
// =========================================================================

fn generate_pseudo_legal(pos: &Position, moves: &mut Vec<Move>) {
    let us = pos.side_to_move;
    for (from, piece) in pos.pieces_of(us) {
        match piece.kind {
            PieceType::Pawn => generate_pawn_moves(pos, from, us, moves),
            PieceType::Knight => generate_leaper_moves(pos, from, us, &KNIGHT_JUMPS, moves),
            PieceType::King => generate_leaper_moves(pos, from, us, &KING_STEPS, moves),
            PieceType::Bishop => generate_slider_moves(pos, from, us, &BISHOP_DIRS, moves),
            PieceType::Rook => generate_slider_moves(pos, from, us, &ROOK_DIRS, moves),
            PieceType::Queen => {
                generate_slider_moves(pos, from, us, &BISHOP_DIRS, moves);
                generate_slider_moves(pos, from, us, &ROOK_DIRS, moves);
            }
        }
    }
    generate_castling_moves(pos, us, moves);
}

// =========================================================================
// Pawn moves
// =========================================================================

fn generate_pawn_moves(pos: &Position, from: Square, us: Color, moves: &mut Vec<Move>) {
    let dir = us.pawn_direction();
    let (start_rank, promo_rank): (u8, u8) = match us {
        Color::White => (1, 6), // rank 2 start, rank 7 promotes on push
        Color::Black => (6, 1), // rank 7 start, rank 2 promotes on push
    };
    let from_rank = from.rank();

    // --- Single push (blocked by any occupant) ---
    if let Some(to) = attacks::shift(from, 0, dir) {
        if pos.piece_at(to).is_none() {
            if from_rank == promo_rank {
                add_promotions(from, to, MoveFlags::NONE, moves);
            } else {
                moves.push(Move::new(from, to));
            }

            // --- Double push, only from the home rank through an empty square ---
            if from_rank == start_rank {
                if let Some(to2) = attacks::shift(from, 0, dir * 2) {
                    if pos.piece_at(to2).is_none() {
                        moves.push(Move::with_flags(from, to2, MoveFlags::DOUBLE_PUSH));
                    }
                }
            }
        }
    }

    // --- Diagonal captures (including promotion captures) and en passant ---
    for df in [-1i8, 1] {
        let Some(to) = attacks::shift(from, df, dir) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(target) if target.color != us => {
                if from_rank == promo_rank {
                    add_promotions(from, to, MoveFlags::CAPTURE, moves);
                } else {
                    moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
                }
            }
            None if pos.en_passant == Some(to) => {
                moves.push(Move::with_flags(
                    from,
                    to,
                    MoveFlags::CAPTURE | MoveFlags::EN_PASSANT,
                ));
            }
            _ => {}
        }
    }
}

/// Add all four promotion variants for a pawn push or capture.
fn add_promotions(from: Square, to: Square, extra_flags: MoveFlags, moves: &mut Vec<Move>) {
    for &promo in &PieceType::PROMOTIONS {
        moves.push(Move::with_promotion(from, to, promo, extra_flags));
    }
}

// =========================================================================
// Knight and king moves (fixed offsets)
// =========================================================================

fn generate_leaper_moves(
    pos: &Position,
    from: Square,
    us: Color,
    offsets: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in offsets {
        let Some(to) = attacks::shift(from, df, dr) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(target) if target.color == us => {}
            Some(_) => moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE)),
            None => moves.push(Move::new(from, to)),
        }
    }
}

// =========================================================================
// Slider moves (bishop, rook, queen)
// =========================================================================

fn generate_slider_moves(
    pos: &Position,
    from: Square,
    us: Color,
    dirs: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in dirs {
        let mut cur = from;
        while let Some(to) = attacks::shift(cur, df, dr) {
            match pos.piece_at(to) {
                None => {
                    moves.push(Move::new(from, to));
                    cur = to;
                }
                Some(target) => {
                    if target.color != us {
                        moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
                    }
                    break;
                }
            }
        }
    }
}

// =========================================================================
// Castling
// =========================================================================

fn generate_castling_moves(pos: &Position, us: Color, moves: &mut Vec<Move>) {
    let them = !us;
    let rank = us.back_rank();

    // Structural precondition: the king must actually stand on its original
    // square (file e). Rights alone are not trusted, so a displaced king in
    // a hand-built position can never produce a castling move.
    let king_from = Square::from_file_rank(4, rank);
    if pos.king_sq(us) != king_from {
        return;
    }

    // Can't castle out of check.
    if pos.is_square_attacked(king_from, them) {
        return;
    }

    // Kingside: king e→g, path through f and g must be clear and not attacked.
    if pos.castling_rights.can_castle_kingside(us) {
        let f_sq = Square::from_file_rank(5, rank);
        let g_sq = Square::from_file_rank(6, rank);
        if pos.piece_at(f_sq).is_none()
            && pos.piece_at(g_sq).is_none()
            && !pos.is_square_attacked(f_sq, them)
            && !pos.is_square_attacked(g_sq, them)
        {
            moves.push(Move::with_flags(king_from, g_sq, MoveFlags::CASTLING));
        }
    }

    // Queenside: king e→c, path through b, c, d must be clear; c and d not
    // attacked (the rook may pass through an attacked b-square).
    if pos.castling_rights.can_castle_queenside(us) {
        let b_sq = Square::from_file_rank(1, rank);
        let c_sq = Square::from_file_rank(2, rank);
        let d_sq = Square::from_file_rank(3, rank);
        if pos.piece_at(b_sq).is_none()
            && pos.piece_at(c_sq).is_none()
            && pos.piece_at(d_sq).is_none()
            && !pos.is_square_attacked(c_sq, them)
            && !pos.is_square_attacked(d_sq, them)
        {
            moves.push(Move::with_flags(king_from, c_sq, MoveFlags::CASTLING));
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
