pub mod eval;
pub mod minimax;
pub mod node;
pub mod tt;
pub mod zobrist;
