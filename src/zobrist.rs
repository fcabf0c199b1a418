//! Zobrist position keys.
//!
//! Each aspect of a position (piece on square, side to move, castling
//! rights, en-passant file) gets a pseudo-random 64-bit key; a position's
//! key is the XOR of the applicable keys. Positions are immutable values
//! here, so keys are recomputed per position rather than maintained
//! incrementally — a full pass over at most 32 pieces. Move counters are
//! deliberately excluded so repeated positions compare equal.

use crate::board::Position;
use crate::types::{Piece, Square};
use std::sync::OnceLock;

const CASTLING_KEYS: usize = 16;
const EP_KEYS: usize = 8;

/// Pre-computed key tables, initialised once per process.
pub struct ZobristKeys {
    /// `piece[piece_index][square]`, piece index 0..12.
    piece: [[u64; 64]; 12],
    /// XOR this when it is Black's turn to move.
    side_to_move: u64,
    /// One key per possible castling bitmask (0..15).
    castling: [u64; CASTLING_KEYS],
    /// One key per possible en-passant file.
    en_passant: [u64; EP_KEYS],
}

static KEYS: OnceLock<ZobristKeys> = OnceLock::new();

/// Get a reference to the global key tables.
pub fn keys() -> &'static ZobristKeys {
    KEYS.get_or_init(ZobristKeys::init)
}

/// Compute the key of a position.
pub fn hash(pos: &Position) -> u64 {
    let zk = keys();
    let mut h = 0u64;

    for sq in Square::all() {
        if let Some(piece) = pos.piece_at(sq) {
            h ^= zk.piece_key(piece, sq);
        }
    }

    if pos.side_to_move == crate::types::Color::Black {
        h ^= zk.side_to_move;
    }

    h ^= zk.castling[pos.castling_rights.0 as usize];

    if let Some(ep) = pos.en_passant {
        h ^= zk.en_passant[ep.file() as usize];
    }

    h
}

impl ZobristKeys {
    /// Key for a specific piece on a specific square.
    #[inline]
    pub fn piece_key(&self, piece: Piece, sq: Square) -> u64 {
        self.piece[piece.index()][sq.0 as usize]
    }

    /// Generate all keys from a fixed seed so hashes are reproducible
    /// across runs and builds.
    fn init() -> Self {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut next = move || splitmix64(&mut state);

        let mut piece = [[0u64; 64]; 12];
        for per_piece in &mut piece {
            for key in per_piece.iter_mut() {
                *key = next();
            }
        }

        let side_to_move = next();

        let mut castling = [0u64; CASTLING_KEYS];
        for key in &mut castling {
            *key = next();
        }

        let mut en_passant = [0u64; EP_KEYS];
        for key in &mut en_passant {
            *key = next();
        }

        ZobristKeys {
            piece,
            side_to_move,
            castling,
            en_passant,
        }
    }
}

/// splitmix64 step: simple, fast, and well distributed.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
