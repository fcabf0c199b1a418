//! Standard Algebraic Notation (SAN) generation and parsing.
//!
//! SAN examples: `e4`, `Nf3`, `Bxe5`, `O-O`, `e8=Q+`, `Raxd1#`.

use crate::board::Position;
use crate::movegen;
use crate::types::{ChessError, Move, PieceType, Square};

// =========================================================================
// SAN generation
// =========================================================================

/// Convert a move to SAN notation.
///
/// `legal` should be the full legal-move list for `pos` (passed in to avoid
/// redundant generation; disambiguation needs it). `is_check` and
/// `is_checkmate` describe the position *after* the move and drive the
/// `+`/`#` suffix — the caller knows them once the move has been applied.
pub fn move_to_san(
    pos: &Position,
    mv: Move,
    legal: &[Move],
    is_check: bool,
    is_checkmate: bool,
) -> String {
    let mut san = if mv.flags.is_castling() {
        if mv.to.file() > mv.from.file() {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        }
    } else {
        san_body(pos, mv, legal)
    };

    if is_checkmate {
        san.push('#');
    } else if is_check {
        san.push('+');
    }
    san
}

fn san_body(pos: &Position, mv: Move, legal: &[Move]) -> String {
    let piece = match pos.piece_at(mv.from) {
        Some(p) => p,
        // Nothing on the origin square: fall back to coordinates rather
        // than panicking on a caller mistake.
        None => return mv.to_string(),
    };

    let mut san = String::with_capacity(8);

    if piece.kind == PieceType::Pawn {
        if mv.flags.is_capture() {
            // Departure file prefix on captures: "exd5".
            san.push((b'a' + mv.from.file()) as char);
            san.push('x');
        }
        san.push_str(&mv.to.to_algebraic());

        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(promo.letter());
        }
    } else {
        san.push(piece.kind.letter());
        san.push_str(&disambiguation(pos, mv, piece.kind, legal));

        if mv.flags.is_capture() {
            san.push('x');
        }

        san.push_str(&mv.to.to_algebraic());
    }

    san
}

/// Disambiguation string for a piece move: empty when the move is unique,
/// otherwise origin file, then origin rank, then the full origin square —
/// escalating only as far as needed.
fn disambiguation(pos: &Position, mv: Move, kind: PieceType, legal: &[Move]) -> String {
    let us = pos.side_to_move;

    // Other legal moves by the same piece type to the same destination.
    let rivals: Vec<&Move> = legal
        .iter()
        .filter(|m| {
            m.to == mv.to
                && m.from != mv.from
                && !m.flags.is_castling()
                && pos
                    .piece_at(m.from)
                    .map(|p| p.color == us && p.kind == kind)
                    .unwrap_or(false)
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let file_clashes = rivals.iter().any(|m| m.from.file() == mv.from.file());
    let rank_clashes = rivals.iter().any(|m| m.from.rank() == mv.from.rank());

    let file_char = (b'a' + mv.from.file()) as char;
    let rank_char = (b'1' + mv.from.rank()) as char;
    match (file_clashes, rank_clashes) {
        (false, _) => file_char.to_string(),
        (true, false) => rank_char.to_string(),
        (true, true) => format!("{file_char}{rank_char}"),
    }
}

// =========================================================================
// SAN parsing
// =========================================================================

/// Parse a SAN string and return the corresponding legal move.
///
/// Accepts standard SAN: `e4`, `Nf3`, `Bxe5`, `O-O`, `O-O-O`, `e8=Q`, etc.
/// Check/checkmate/annotation suffixes (`+`, `#`, `!`, `?`) are ignored.
pub fn parse_san(pos: &Position, san: &str) -> Result<Move, ChessError> {
    let legal = movegen::legal_moves(pos);
    let san = san.trim_end_matches(['+', '#', '!', '?']);

    // Castling.
    if san == "O-O" || san == "0-0" {
        return find_castling(pos, &legal, true);
    }
    if san == "O-O-O" || san == "0-0-0" {
        return find_castling(pos, &legal, false);
    }

    let chars: Vec<char> = san.chars().collect();
    if chars.is_empty() {
        return Err(ChessError::InvalidMove {
            from: String::new(),
            to: String::new(),
            reason: "empty SAN string".into(),
        });
    }

    // Detect promotion.
    let (chars, promotion) = if chars.len() >= 2 && chars[chars.len() - 2] == '=' {
        let promo_char = chars[chars.len() - 1];
        let promo = PieceType::from_promotion_char(promo_char)
            .ok_or_else(|| ChessError::InvalidPromotion(promo_char.to_string()))?;
        (&chars[..chars.len() - 2], Some(promo))
    } else {
        (&chars[..], None)
    };

    // Determine piece type from a leading uppercase letter.
    let (kind, rest) = if chars[0].is_uppercase() && "NBRQK".contains(chars[0]) {
        let pt = match chars[0] {
            'N' => PieceType::Knight,
            'B' => PieceType::Bishop,
            'R' => PieceType::Rook,
            'Q' => PieceType::Queen,
            'K' => PieceType::King,
            _ => unreachable!(),
        };
        (pt, &chars[1..])
    } else {
        (PieceType::Pawn, chars)
    };

    // Strip the capture marker.
    let rest: Vec<char> = rest.iter().copied().filter(|&c| c != 'x').collect();

    // The last two characters are the destination square.
    if rest.len() < 2 {
        return Err(ChessError::InvalidMove {
            from: String::new(),
            to: san.to_string(),
            reason: "SAN too short".into(),
        });
    }

    let dest_str: String = rest[rest.len() - 2..].iter().collect();
    let dest = Square::from_algebraic(&dest_str)
        .ok_or_else(|| ChessError::InvalidSquare(dest_str.clone()))?;

    // Disambiguation characters (0, 1, or 2 chars before the destination).
    let disambig = &rest[..rest.len() - 2];
    let disambig_file: Option<u8> = disambig
        .iter()
        .find(|c| c.is_ascii_lowercase())
        .map(|&c| c as u8 - b'a');
    let disambig_rank: Option<u8> = disambig
        .iter()
        .find(|c| c.is_ascii_digit())
        .map(|&c| c as u8 - b'1');

    // Find the matching legal move.
    let us = pos.side_to_move;
    let candidates: Vec<&Move> = legal
        .iter()
        .filter(|m| {
            if m.to != dest || m.flags.is_castling() {
                return false;
            }
            match pos.piece_at(m.from) {
                Some(p) if p.color == us && p.kind == kind => {}
                _ => return false,
            }
            if let Some(f) = disambig_file {
                if m.from.file() != f {
                    return false;
                }
            }
            if let Some(r) = disambig_rank {
                if m.from.rank() != r {
                    return false;
                }
            }
            m.promotion == promotion
        })
        .collect();

    match candidates.len() {
        0 => Err(ChessError::InvalidMove {
            from: String::new(),
            to: san.to_string(),
            reason: format!("no legal move matches SAN '{san}'"),
        }),
        1 => Ok(*candidates[0]),
        _ => Err(ChessError::InvalidMove {
            from: String::new(),
            to: san.to_string(),
            reason: format!("ambiguous SAN '{san}': {} candidates", candidates.len()),
        }),
    }
}

fn find_castling(pos: &Position, legal: &[Move], kingside: bool) -> Result<Move, ChessError> {
    let king_sq = pos.king_sq(pos.side_to_move);
    let target_file = if kingside { 6 } else { 2 };

    legal
        .iter()
        .find(|m| m.flags.is_castling() && m.from == king_sq && m.to.file() == target_file)
        .copied()
        .ok_or_else(|| ChessError::InvalidMove {
            from: king_sq.to_algebraic(),
            to: String::new(),
            reason: format!(
                "castling {} not legal",
                if kingside { "kingside" } else { "queenside" }
            ),
        })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MoveFlags;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn san(fen: &str, from: &str, to: &str, flags: MoveFlags) -> String {
        let p = pos(fen);
        let legal = movegen::legal_moves(&p);
        let mv = Move::with_flags(sq(from), sq(to), flags);
        move_to_san(&p, mv, &legal, false, false)
    }

    // -------------------------------------------------------------------
    // Pawn moves
    // -------------------------------------------------------------------

    #[test]
    fn san_pawn_push() {
        assert_eq!(
            san(
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "e2",
                "e4",
                MoveFlags::DOUBLE_PUSH
            ),
            "e4"
        );
    }

    #[test]
    fn san_pawn_capture() {
        assert_eq!(
            san(
                "rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2",
                "e4",
                "d5",
                MoveFlags::CAPTURE
            ),
            "exd5"
        );
    }

    #[test]
    fn san_pawn_promotion() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let legal = movegen::legal_moves(&p);
        let mv = Move::with_promotion(sq("e7"), sq("e8"), PieceType::Queen, MoveFlags::NONE);
        assert_eq!(move_to_san(&p, mv, &legal, false, false), "e8=Q");
        assert_eq!(move_to_san(&p, mv, &legal, true, false), "e8=Q+");
    }

    #[test]
    fn san_en_passant() {
        assert_eq!(
            san(
                "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
                "e5",
                "f6",
                MoveFlags::CAPTURE | MoveFlags::EN_PASSANT
            ),
            "exf6"
        );
    }

    // -------------------------------------------------------------------
    // Piece moves
    // -------------------------------------------------------------------

    #[test]
    fn san_knight_move() {
        assert_eq!(
            san(
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "g1",
                "f3",
                MoveFlags::NONE
            ),
            "Nf3"
        );
    }

    #[test]
    fn san_bishop_capture() {
        assert_eq!(
            san(
                "rnbqk1nr/pppp1ppp/4p3/8/1b6/2N5/PPPPPPPP/R1BQKBNR b KQkq - 2 2",
                "b4",
                "c3",
                MoveFlags::CAPTURE
            ),
            "Bxc3"
        );
    }

    // -------------------------------------------------------------------
    // Check and checkmate suffixes
    // -------------------------------------------------------------------

    #[test]
    fn san_check_suffix() {
        let p = pos("4k3/8/8/8/8/8/8/4KR2 w - - 0 1");
        let legal = movegen::legal_moves(&p);
        let mv = Move::new(sq("f1"), sq("f8"));
        assert_eq!(move_to_san(&p, mv, &legal, true, false), "Rf8+");
    }

    #[test]
    fn san_checkmate_suffix_wins_over_check() {
        let p = pos("4k3/8/8/8/8/8/8/4KR2 w - - 0 1");
        let legal = movegen::legal_moves(&p);
        let mv = Move::new(sq("f1"), sq("f8"));
        assert_eq!(move_to_san(&p, mv, &legal, true, true), "Rf8#");
    }

    // -------------------------------------------------------------------
    // Castling
    // -------------------------------------------------------------------

    #[test]
    fn san_castling_kingside() {
        assert_eq!(
            san(
                "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1",
                "e1",
                "g1",
                MoveFlags::CASTLING
            ),
            "O-O"
        );
    }

    #[test]
    fn san_castling_queenside() {
        assert_eq!(
            san(
                "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1",
                "e1",
                "c1",
                MoveFlags::CASTLING
            ),
            "O-O-O"
        );
    }

    // -------------------------------------------------------------------
    // Disambiguation
    // -------------------------------------------------------------------

    #[test]
    fn san_rook_file_disambiguation() {
        // Rooks on a1 and h1 can both reach e1.
        assert_eq!(
            san("4k3/8/8/8/8/4K3/8/R6R w - - 0 1", "a1", "e1", MoveFlags::NONE),
            "Rae1"
        );
    }

    #[test]
    fn san_rook_rank_disambiguation() {
        // Rooks on a1 and a8 share a file, so the rank disambiguates.
        assert_eq!(
            san("R3k3/8/8/8/8/8/8/R3K3 w - - 0 1", "a1", "a4", MoveFlags::NONE),
            "R1a4"
        );
    }

    #[test]
    fn san_no_disambiguation_when_unique() {
        assert_eq!(
            san("4k3/8/8/8/8/4K3/8/R7 w - - 0 1", "a1", "e1", MoveFlags::NONE),
            "Re1"
        );
    }

    // -------------------------------------------------------------------
    // SAN parsing
    // -------------------------------------------------------------------

    #[test]
    fn parse_san_pawn_push() {
        let p = Position::starting();
        let mv = parse_san(&p, "e4").unwrap();
        assert_eq!(mv.from, sq("e2"));
        assert_eq!(mv.to, sq("e4"));
        assert!(mv.flags.is_double_push());
    }

    #[test]
    fn parse_san_knight_move() {
        let p = Position::starting();
        let mv = parse_san(&p, "Nf3").unwrap();
        assert_eq!(mv.from, sq("g1"));
        assert_eq!(mv.to, sq("f3"));
    }

    #[test]
    fn parse_san_castling() {
        let p = pos("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1");
        let mv = parse_san(&p, "O-O").unwrap();
        assert_eq!(mv.to.file(), 6);
        assert!(mv.flags.is_castling());
    }

    #[test]
    fn parse_san_promotion() {
        let p = pos("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let mv = parse_san(&p, "e8=Q").unwrap();
        assert_eq!(mv.promotion, Some(PieceType::Queen));
    }

    #[test]
    fn parse_san_strips_suffixes() {
        let p = Position::starting();
        let mv = parse_san(&p, "e4+?!").unwrap();
        assert_eq!(mv.to, sq("e4"));
    }

    #[test]
    fn parse_san_invalid() {
        let p = Position::starting();
        assert!(parse_san(&p, "Qh5").is_err()); // queen cannot reach h5 yet
        assert!(parse_san(&p, "").is_err());
        assert!(parse_san(&p, "O-O").is_err()); // castling not available
    }

    #[test]
    fn parse_san_ambiguous_errors() {
        // Two rooks reach e1 and the SAN names neither.
        let p = pos("4k3/8/8/8/8/4K3/8/R6R w - - 0 1");
        assert!(parse_san(&p, "Re1").is_err());
        assert!(parse_san(&p, "Rae1").is_ok());
        assert!(parse_san(&p, "Rhe1").is_ok());
    }

    // -------------------------------------------------------------------
    // Round-trip: generate SAN then parse it back
    // -------------------------------------------------------------------

    #[test]
    fn san_round_trip_starting_position() {
        round_trip_all("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    }

    #[test]
    fn san_round_trip_kiwipete() {
        round_trip_all("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    }

    #[test]
    fn san_round_trip_promotions() {
        round_trip_all("5r1k/4P3/8/8/8/8/8/4K3 w - - 0 1");
    }

    fn round_trip_all(fen: &str) {
        let p = pos(fen);
        let legal = movegen::legal_moves(&p);
        for mv in &legal {
            let san_str = move_to_san(&p, *mv, &legal, false, false);
            let parsed = parse_san(&p, &san_str)
                .unwrap_or_else(|e| panic!("failed to parse SAN '{san_str}': {e}"));
            assert_eq!(parsed, *mv, "round-trip mismatch for SAN '{san_str}'");
        }
    }
}
