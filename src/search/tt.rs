//! Transposition table: Zobrist key of (board, side to move) mapped to the
//! best result known for that position.
//!
//! Stores overwrite unconditionally; probes only answer when the stored
//! entry was computed at least as deep as the caller is about to search.
//! Two positions that collide on the full 64-bit key silently overwrite
//! each other; there is no signature verification beyond the key itself.

use std::collections::HashMap;

use crate::board::Move;
use crate::search::eval::Eval;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub depth: u32,
    pub eval: Eval,
    pub best: Option<Move>,
}

#[derive(Debug, Default)]
pub struct TranspositionTable {
    map: HashMap<u64, Entry>,
}

impl TranspositionTable {
    pub fn new() -> TranspositionTable {
        TranspositionTable {
            map: HashMap::with_capacity(1 << 16),
        }
    }

    pub fn store(&mut self, key: u64, depth: u32, eval: Eval, best: Option<Move>) {
        self.map.insert(key, Entry { depth, eval, best });
    }

    /// Entry for `key`, but only if it was computed at `min_depth` or
    /// deeper; a shallower entry is a miss and must be re-searched.
    pub fn probe(&self, key: u64, min_depth: u32) -> Option<Entry> {
        self.map
            .get(&key)
            .filter(|entry| entry.depth >= min_depth)
            .copied()
    }

    /// Emptied at the start of every game so no key from a previous game
    /// can leak into a new one.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
