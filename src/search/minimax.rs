//! Depth-bounded minimax over the full move tree.
//!
//! Black minimizes and White maximizes the signed static score. There is no
//! pruning; the transposition table and the depth bound are the only things
//! keeping the tree finite. The search cooperates with cancellation through
//! a shared stop flag and continuously publishes the best root move found so
//! far, so a stopped search always leaves a playable answer behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::board::{GamePosition, Move, Player};
use crate::movegen::generate_moves;
use crate::search::eval::{static_eval, Eval, EvalWeights, DRAW_SCORE, EVAL_MAX, EVAL_MIN};
use crate::search::node::NodeArena;
use crate::search::tt::TranspositionTable;
use crate::search::zobrist::Zobrist;

pub struct Search<'a> {
    zobrist: &'a Zobrist,
    tt: &'a mut TranspositionTable,
    weights: EvalWeights,
    stop: Arc<AtomicBool>,
    best_shared: Arc<Mutex<Option<Move>>>,
    arena: NodeArena,
    nodes_visited: u64,
}

impl<'a> Search<'a> {
    pub fn new(
        zobrist: &'a Zobrist,
        tt: &'a mut TranspositionTable,
        weights: EvalWeights,
        stop: Arc<AtomicBool>,
        best_shared: Arc<Mutex<Option<Move>>>,
    ) -> Search<'a> {
        Search {
            zobrist,
            tt,
            weights,
            stop,
            best_shared,
            arena: NodeArena::new(),
            nodes_visited: 0,
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn publish(&self, mv: Move) {
        let mut slot = self
            .best_shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(mv);
    }

    /// Searches `position` to `max_depth` plies. `history` is the game played
    /// so far, used to seed repetition detection. `max_time` is advisory and
    /// only reported; honoring it is the caller's business via the stop flag.
    pub fn run(
        &mut self,
        position: &GamePosition,
        history: &[(GamePosition, Move)],
        max_depth: u32,
        max_time: Duration,
    ) -> (Option<Move>, Eval) {
        let started = Instant::now();
        log::debug!(
            "searching {} to depth {} (time hint {:?})",
            position.to_fen(),
            max_depth,
            max_time
        );

        let root = self.arena.seed(position, history);
        let (best, eval) = self.search_root(position, root, max_depth);

        log::info!(
            "searched {} nodes in {:?}, best {} eval {}",
            self.nodes_visited,
            started.elapsed(),
            best.map_or_else(|| "none".to_string(), |mv| mv.to_string()),
            eval
        );

        (best, eval)
    }

    fn search_root(
        &mut self,
        position: &GamePosition,
        root: usize,
        depth: u32,
    ) -> (Option<Move>, Eval) {
        self.nodes_visited += 1;

        if self.arena.is_draw(root) {
            return (None, DRAW_SCORE);
        }

        let moves = generate_moves(&position.board, position.turn);
        if moves.is_empty() {
            return (None, static_eval(&position.board, &self.weights));
        }

        let maximizing = position.turn == Player::White;
        let mut best_move = None;
        let mut best_eval = if maximizing { EVAL_MIN } else { EVAL_MAX };

        for mv in &moves {
            let mut child = position.clone();
            child.apply_move(mv, self.zobrist);

            let node = self.arena.push_child(root, &child);
            let eval = self.minimax(&child, node, depth.saturating_sub(1));
            self.arena.pop();

            if self.stopped() {
                // A truncated child carries a shallow value; it must never
                // displace a fully searched sibling. With nothing searched
                // yet it is still the best answer available.
                if best_move.is_none() {
                    best_move = Some(*mv);
                    best_eval = eval;
                    self.publish(*mv);
                }
                log::debug!("search truncated after {} nodes", self.nodes_visited);
                return (best_move, best_eval);
            }

            let better = if maximizing {
                eval > best_eval
            } else {
                eval < best_eval
            };

            if best_move.is_none() || better {
                best_move = Some(*mv);
                best_eval = eval;
                // Published immediately so a stop request at any moment can
                // still be answered with the best move seen so far
                self.publish(*mv);
            }
        }

        self.tt.store(position.key, depth, best_eval, best_move);

        (best_move, best_eval)
    }

    fn minimax(&mut self, position: &GamePosition, node: usize, depth: u32) -> Eval {
        self.nodes_visited += 1;

        // Draws outrank everything else, including table hits: a repeated
        // position scores zero here no matter what was stored for it
        if self.arena.is_draw(node) {
            return DRAW_SCORE;
        }

        if self.stopped() || depth == 0 {
            return static_eval(&position.board, &self.weights);
        }

        if let Some(entry) = self.tt.probe(position.key, depth) {
            return entry.eval;
        }

        let moves = generate_moves(&position.board, position.turn);
        if moves.is_empty() {
            // No moves means the side to move has lost; the signed static
            // score already says so, no mate sentinel needed
            return static_eval(&position.board, &self.weights);
        }

        let maximizing = position.turn == Player::White;
        let mut best_move = None;
        let mut best_eval = if maximizing { EVAL_MIN } else { EVAL_MAX };

        for mv in &moves {
            let mut child = position.clone();
            child.apply_move(mv, self.zobrist);

            let child_node = self.arena.push_child(node, &child);
            let eval = self.minimax(&child, child_node, depth - 1);
            self.arena.pop();

            if self.stopped() {
                // The subtree fold is incomplete; fall back to the static
                // score and store nothing
                return static_eval(&position.board, &self.weights);
            }

            let better = if maximizing {
                eval > best_eval
            } else {
                eval < best_eval
            };

            if best_move.is_none() || better {
                best_move = Some(*mv);
                best_eval = eval;
            }
        }

        self.tt.store(position.key, depth, best_eval, best_move);

        best_eval
    }
}
