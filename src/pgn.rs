//! PGN (Portable Game Notation) export.
//!
//! Produces the Seven Tag Roster plus move text with move numbers, with
//! SetUp/FEN tags when the game began from a custom position.

use crate::game::Game;
use crate::types::{Color, GameStatus};

/// Export a game as a PGN string.
pub fn to_pgn(game: &Game) -> String {
    let mut pgn = String::with_capacity(512);

    let date = game.created_at.format("%Y.%m.%d").to_string();
    let result = result_string(game);

    pgn.push_str("[Event \"Casual Game\"]\n");
    pgn.push_str("[Site \"chess-rules\"]\n");
    pgn.push_str(&format!("[Date \"{date}\"]\n"));
    pgn.push_str("[Round \"-\"]\n");
    pgn.push_str(&format!("[White \"{}\"]\n", game.white_player));
    pgn.push_str(&format!("[Black \"{}\"]\n", game.black_player));
    pgn.push_str(&format!("[Result \"{result}\"]\n"));

    if game.started_from_fen() {
        pgn.push_str("[SetUp \"1\"]\n");
        pgn.push_str(&format!("[FEN \"{}\"]\n", game.starting_fen()));
    }

    pgn.push('\n');

    let history = game.move_history();
    if history.is_empty() {
        pgn.push_str(result);
        pgn.push('\n');
        return pgn;
    }

    // Who moved first and from which move number, read off the starting FEN.
    let first_mover_white = !game.starting_fen().contains(" b ");
    let start_fullmove: u32 = game
        .starting_fen()
        .split_whitespace()
        .nth(5)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    let mut move_num = start_fullmove;
    let mut white_turn = first_mover_white;
    let mut line = String::new();

    for (i, record) in history.iter().enumerate() {
        let token = if white_turn {
            format!("{}. {}", move_num, record.san)
        } else if i == 0 {
            // Black moves first from a custom position: "N... move".
            format!("{}... {}", move_num, record.san)
        } else {
            record.san.clone()
        };

        push_token(&mut pgn, &mut line, &token);

        if !white_turn {
            move_num += 1;
        }
        white_turn = !white_turn;
    }

    push_token(&mut pgn, &mut line, result);
    pgn.push_str(&line);
    pgn.push('\n');

    pgn
}

/// Append a token to the current line, wrapping at ~80 characters.
fn push_token(pgn: &mut String, line: &mut String, token: &str) {
    if !line.is_empty() && line.len() + 1 + token.len() > 80 {
        pgn.push_str(line);
        pgn.push('\n');
        line.clear();
    }
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(token);
}

/// PGN result marker. On checkmate the side to move is the loser; the two
/// engine-detected draws score ½–½; anything else is still in progress.
fn result_string(game: &Game) -> &'static str {
    match game.status() {
        GameStatus::Checkmate => match game.side_to_move() {
            Color::White => "0-1",
            Color::Black => "1-0",
        },
        GameStatus::Stalemate | GameStatus::FiftyMoveDraw => "1/2-1/2",
        GameStatus::Normal | GameStatus::Check => "*",
    }
}

// =========================================================================
// Tests
// =========================================================================
