//! Search tree bookkeeping for draw detection.
//!
//! Nodes along the current search path live in one arena and each points to
//! its parent, but only while the side keeps shuffling kings: an advancement
//! (a capture or a man move) makes every earlier position unrepeatable, so
//! the child of such a move starts a fresh chain. Threefold repetition and
//! the inactivity rule are both answered by walking that chain.

use crate::board::{is_advancement, Board, GamePosition, Move, Player};

/// Plies without a capture or man move after which the game is drawn.
pub const QUIET_DRAW_PLIES: u32 = 80;

#[derive(Debug, Clone)]
struct SearchNode {
    board: Board,
    turn: Player,
    quiet_plies: u32,
    prev: Option<usize>,
}

#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: Vec<SearchNode>,
}

impl NodeArena {
    pub fn new() -> NodeArena {
        NodeArena { nodes: Vec::new() }
    }

    fn push(&mut self, position: &GamePosition, prev: Option<usize>) -> usize {
        self.nodes.push(SearchNode {
            board: position.board,
            turn: position.turn,
            quiet_plies: position.quiet_plies,
            prev,
        });
        self.nodes.len() - 1
    }

    /// Rebuilds the repetition chain from the game played so far and roots
    /// the search at `position`. Each history entry is the position a move
    /// was played from together with that move; entries before the last
    /// advancement never make it into the chain.
    pub fn seed(&mut self, position: &GamePosition, history: &[(GamePosition, Move)]) -> usize {
        self.nodes.clear();

        let mut prev = None;
        for (before, mv) in history {
            if is_advancement(&before.board, mv) {
                prev = None;
            } else {
                prev = Some(self.push(before, prev));
            }
        }

        self.push(position, prev)
    }

    /// Appends the position reached by one move of the search. A zero quiet
    /// counter means the move was an advancement, which severs the chain.
    pub fn push_child(&mut self, parent: usize, child: &GamePosition) -> usize {
        let prev = if child.quiet_plies == 0 {
            None
        } else {
            Some(parent)
        };
        self.push(child, prev)
    }

    /// Backtracks the most recent `push_child`.
    pub fn pop(&mut self) {
        self.nodes.pop();
    }

    fn is_threefold(&self, index: usize) -> bool {
        let node = &self.nodes[index];
        let mut count = 0;
        let mut cursor = Some(index);

        while let Some(at) = cursor {
            let earlier = &self.nodes[at];
            if earlier.board == node.board && earlier.turn == node.turn {
                count += 1;
                if count == 3 {
                    return true;
                }
            }
            cursor = earlier.prev;
        }

        false
    }

    fn is_stalled(&self, index: usize) -> bool {
        self.nodes[index].quiet_plies >= QUIET_DRAW_PLIES
    }

    /// Draw by threefold repetition or by the inactivity rule.
    pub fn is_draw(&self, index: usize) -> bool {
        self.is_stalled(index) || self.is_threefold(index)
    }
}
