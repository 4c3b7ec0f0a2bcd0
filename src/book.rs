//! Opening book: exact position lookup to a list of candidate replies.
//!
//! Keys are the canonical `GamePosition::to_fen` strings, so any transposed
//! or rotated position simply misses and the engine searches instead. Book
//! files are JSON objects mapping a position to its reply moves; a compiled-in
//! table of standard first-move replies serves as the default.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use thiserror::Error;

use crate::board::{GamePosition, Move, ParseError, START_POSITION};

#[derive(Debug, Error)]
pub enum BookError {
    #[error("cannot read book file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed book file: {0}")]
    Format(#[from] serde_json::Error),
    #[error("bad move {notation:?} for position {position:?}: {source}")]
    BadMove {
        position: String,
        notation: String,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct BookFile {
    entries: HashMap<String, Vec<String>>,
}

#[derive(Debug)]
pub struct OpeningBook {
    entries: HashMap<String, Vec<Move>>,
    rng: SmallRng,
}

impl OpeningBook {
    pub fn empty(seed: u64) -> OpeningBook {
        OpeningBook {
            entries: HashMap::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// The compiled-in table: every legal first move for Black, and one
    /// solid White reply to each of them.
    pub fn builtin(seed: u64) -> OpeningBook {
        let mut book = OpeningBook::empty(seed);

        book.insert_line(
            START_POSITION,
            &["9-13", "9-14", "10-14", "10-15", "11-15", "11-16", "12-16"],
        );

        // Replies to each of the seven openings, reachable because the first
        // move of a game never captures or promotes
        let replies = [
            ("9-13", "22-18"),
            ("9-14", "22-18"),
            ("10-14", "22-17"),
            ("10-15", "22-18"),
            ("11-15", "23-19"),
            ("11-16", "22-18"),
            ("12-16", "24-20"),
        ];

        for (opening, reply) in replies {
            let position = position_after(opening);
            book.insert_line(&position, &[reply]);
        }

        book
    }

    /// Loads a JSON book, replacing the current entries. Every move string
    /// must parse; a single bad entry rejects the whole file.
    pub fn load(path: &Path, seed: u64) -> Result<OpeningBook, BookError> {
        let text = fs::read_to_string(path)?;
        let file: BookFile = serde_json::from_str(&text)?;

        let mut book = OpeningBook::empty(seed);
        for (position, notations) in file.entries {
            let mut moves = Vec::with_capacity(notations.len());
            for notation in notations {
                let mv = notation.parse().map_err(|source| BookError::BadMove {
                    position: position.clone(),
                    notation: notation.clone(),
                    source,
                })?;
                moves.push(mv);
            }
            book.entries.insert(position, moves);
        }

        log::info!("loaded opening book with {} positions", book.entries.len());
        Ok(book)
    }

    fn insert_line(&mut self, position: &str, notations: &[&str]) {
        let moves = notations
            .iter()
            .map(|notation| notation.parse().expect("builtin book move"))
            .collect();
        self.entries.insert(position.to_string(), moves);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One reply for `position`, chosen uniformly among its book moves.
    /// `None` on a miss or an empty reply list; the caller searches then.
    pub fn lookup(&mut self, position: &GamePosition) -> Option<Move> {
        let replies = self.entries.get(&position.to_fen())?;
        replies.choose(&mut self.rng).copied()
    }
}

/// Position reached from the start by one move, in canonical notation.
fn position_after(notation: &str) -> String {
    let zobrist = crate::search::zobrist::Zobrist::default();
    let mut position = GamePosition::start(&zobrist);
    let mv: Move = notation.parse().expect("builtin book move");
    position.apply_move(&mv, &zobrist);
    position.to_fen()
}
