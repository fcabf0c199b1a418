//! UCI move encoding and decoding.
//!
//! The wire form is bare coordinates — "e2e4", or "e7e8q" with a promotion
//! letter — and carries no flags, so decoding has to infer the special-move
//! kind from the position the move will be applied to: a pawn stepping
//! diagonally onto an empty square is an en-passant capture, a king moving
//! more than one file is castling, a pawn advancing two ranks is a double
//! push.

use crate::board::Position;
use crate::types::{ChessError, Move, MoveFlags, PieceType, Square};

/// Encode a move in UCI coordinate notation.
pub fn encode_uci(mv: Move) -> String {
    mv.to_string()
}

/// Decode a UCI move string against the position it will be applied to.
///
/// Rejects malformed strings; it does not check legality beyond requiring
/// a piece on the origin square (the flag inference needs one).
pub fn decode_uci(s: &str, pos: &Position) -> Result<Move, ChessError> {
    if !s.is_ascii() || (s.len() != 4 && s.len() != 5) {
        return Err(ChessError::InvalidUci(format!(
            "expected 4 or 5 ASCII characters, got '{s}'"
        )));
    }

    let from = Square::from_algebraic(&s[0..2])
        .ok_or_else(|| ChessError::InvalidSquare(s[0..2].to_string()))?;
    let to = Square::from_algebraic(&s[2..4])
        .ok_or_else(|| ChessError::InvalidSquare(s[2..4].to_string()))?;

    let promotion = match s.chars().nth(4) {
        None => None,
        Some(c) => Some(
            PieceType::from_promotion_char(c)
                .ok_or_else(|| ChessError::InvalidPromotion(c.to_string()))?,
        ),
    };

    let piece = pos
        .piece_at(from)
        .ok_or_else(|| ChessError::InvalidUci(format!("no piece on {from} for move '{s}'")))?;

    let mut flags = MoveFlags::NONE;
    let file_delta = (from.file() as i8 - to.file() as i8).abs();
    let rank_delta = (from.rank() as i8 - to.rank() as i8).abs();

    match piece.kind {
        PieceType::Pawn => {
            if file_delta == 1 && pos.piece_at(to).is_none() {
                // Diagonal step onto an empty square: only en passant does that.
                flags = flags | MoveFlags::CAPTURE | MoveFlags::EN_PASSANT;
            } else if rank_delta == 2 {
                flags = flags | MoveFlags::DOUBLE_PUSH;
            }
        }
        PieceType::King => {
            if file_delta > 1 {
                flags = flags | MoveFlags::CASTLING;
            }
        }
        _ => {}
    }

    if pos.piece_at(to).is_some() {
        flags = flags | MoveFlags::CAPTURE;
    }

    Ok(Move {
        from,
        to,
        promotion,
        flags,
    })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn decode_plain_move() {
        let p = Position::starting();
        let mv = decode_uci("g1f3", &p).unwrap();
        assert_eq!(mv.from, sq("g1"));
        assert_eq!(mv.to, sq("f3"));
        assert_eq!(mv.promotion, None);
        assert_eq!(mv.flags, MoveFlags::NONE);
    }

    #[test]
    fn decode_infers_double_push() {
        let p = Position::starting();
        let mv = decode_uci("e2e4", &p).unwrap();
        assert!(mv.flags.is_double_push());
        assert!(!mv.flags.is_capture());
    }

    #[test]
    fn decode_infers_capture() {
        let p = pos("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2");
        let mv = decode_uci("e4d5", &p).unwrap();
        assert!(mv.flags.is_capture());
        assert!(!mv.flags.is_en_passant());
    }

    #[test]
    fn decode_infers_en_passant() {
        let p = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        let mv = decode_uci("e5f6", &p).unwrap();
        assert!(mv.flags.is_en_passant());
        assert!(mv.flags.is_capture());
    }

    #[test]
    fn decode_infers_castling_both_directions() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let ks = decode_uci("e1g1", &p).unwrap();
        assert!(ks.flags.is_castling());

        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R b KQkq - 0 1");
        let qs = decode_uci("e8c8", &p).unwrap();
        assert!(qs.flags.is_castling());
    }

    #[test]
    fn decode_king_single_step_is_not_castling() {
        let p = pos("4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        let mv = decode_uci("e1f1", &p).unwrap();
        assert!(!mv.flags.is_castling());
    }

    #[test]
    fn decode_promotion() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let mv = decode_uci("e7e8q", &p).unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Queen));

        let mv = decode_uci("e7e8n", &p).unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Knight));
    }

    #[test]
    fn decode_promotion_capture() {
        let p = pos("5r1k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let mv = decode_uci("e7f8q", &p).unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Queen));
        assert!(mv.flags.is_capture());
        assert!(!mv.flags.is_en_passant());
    }

    #[test]
    fn decode_rejects_bad_length() {
        let p = Position::starting();
        assert!(decode_uci("", &p).is_err());
        assert!(decode_uci("e2", &p).is_err());
        assert!(decode_uci("e2e4qq", &p).is_err());
    }

    #[test]
    fn decode_rejects_bad_squares() {
        let p = Position::starting();
        assert!(decode_uci("z9e4", &p).is_err());
        assert!(decode_uci("e2i9", &p).is_err());
    }

    #[test]
    fn decode_rejects_bad_promotion_letter() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        assert!(decode_uci("e7e8k", &p).is_err());
        assert!(decode_uci("e7e8p", &p).is_err());
    }

    #[test]
    fn decode_rejects_empty_origin() {
        let p = Position::starting();
        assert!(decode_uci("e4e5", &p).is_err());
    }

    #[test]
    fn encode_round_trip() {
        let p = Position::starting();
        for mv in crate::movegen::legal_moves(&p) {
            let s = encode_uci(mv);
            let back = decode_uci(&s, &p).unwrap();
            assert_eq!(back.from, mv.from, "round-trip from for '{s}'");
            assert_eq!(back.to, mv.to, "round-trip to for '{s}'");
            assert_eq!(back.promotion, mv.promotion, "round-trip promo for '{s}'");
            assert_eq!(back.flags, mv.flags, "round-trip flags for '{s}'");
        }
    }

    #[test]
    fn encode_promotion_lowercase() {
        let mv = Move::with_promotion(sq("a7"), sq("a8"), PieceType::Rook, MoveFlags::NONE);
        assert_eq!(encode_uci(mv), "a7a8r");
    }
}
