//! Exhaustive move counting, used to validate move generation against known
//! node counts.

use crate::board::{apply_to_board, Board, Player};
use crate::movegen::generate_moves;

/// Number of leaf positions reachable in exactly `depth` plies.
pub fn perft(board: &Board, player: Player, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(board, player);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0;
    for mv in &moves {
        let mut child = *board;
        apply_to_board(&mut child, mv);
        nodes += perft(&child, player.opponent(), depth - 1);
    }

    nodes
}
