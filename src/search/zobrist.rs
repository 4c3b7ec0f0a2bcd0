//! Zobrist keys for (piece, square) pairs plus a side-to-move key.
//!
//! The table is an explicitly constructed value injected wherever hashing is
//! needed, never a process global; seeding it makes every key deterministic,
//! which the hash tests rely on.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::board::{Board, Player, Square};

pub const DEFAULT_SEED: u64 = 0x00D1_CE5E_ED00_2B57;

const PIECE_KINDS: usize = 4;

pub struct Zobrist {
    table: [[u64; 32]; PIECE_KINDS],
    side: u64,
}

impl Zobrist {
    pub fn new(seed: u64) -> Zobrist {
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut table = [[0u64; 32]; PIECE_KINDS];
        for kind in &mut table {
            for value in kind.iter_mut() {
                *value = rng.gen();
            }
        }

        Zobrist {
            table,
            side: rng.gen(),
        }
    }

    fn kind(square: Square) -> Option<usize> {
        match square {
            Square::Empty => None,
            Square::BlackMan => Some(0),
            Square::WhiteMan => Some(1),
            Square::BlackKing => Some(2),
            Square::WhiteKing => Some(3),
        }
    }

    /// Key contribution of one occupied square; zero for `Empty`, so callers
    /// can XOR unconditionally.
    pub fn piece(&self, square: Square, index: u8) -> u64 {
        match Zobrist::kind(square) {
            Some(kind) => self.table[kind][index as usize],
            None => 0,
        }
    }

    /// Toggled into the key whenever White is the side to move.
    pub fn side_to_move(&self) -> u64 {
        self.side
    }

    /// From-scratch key of a board and side to move. The incremental updates
    /// in `GamePosition::apply_move` must always agree with this.
    pub fn compute(&self, board: &Board, turn: Player) -> u64 {
        let mut key = 0;

        for (index, &square) in board.iter().enumerate() {
            key ^= self.piece(square, index as u8);
        }

        if turn == Player::White {
            key ^= self.side;
        }

        key
    }
}

impl Default for Zobrist {
    fn default() -> Zobrist {
        Zobrist::new(DEFAULT_SEED)
    }
}
