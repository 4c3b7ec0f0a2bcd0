//! A draughts (8x8 checkers) engine: board and move model, legal move
//! generation with mandatory capture chains, a depth-bounded minimax search
//! with a transposition table and draw detection, an opening book and a
//! background-thread engine session behind a line-based text protocol.

pub mod board;
pub mod book;
pub mod engine;
pub mod movegen;
pub mod perft;
pub mod proto;
pub mod search;

pub use board::{GamePosition, Move, Player, Square, START_POSITION};
pub use engine::{Engine, EngineError, GoOptions};
