//! Static evaluation: material, positioning and crowdedness, each with its
//! own tunable weight. Scores are signed from White's point of view: White
//! ahead is positive, Black ahead is negative.

use crate::board::{Board, Player};
use crate::movegen::diagonal_neighbors;

pub type Eval = i32;

/// Sentinel bounds for minimax comparisons. No attainable static score gets
/// anywhere near these.
pub const EVAL_MIN: Eval = -1_000_000;
pub const EVAL_MAX: Eval = 1_000_000;

pub const DRAW_SCORE: Eval = 0;

/// Search-time evaluation weights, snapshotted from the engine's parameter
/// table when a search starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalWeights {
    pub material_pawn: Eval,
    pub material_king: Eval,
    pub positioning_pawn: Eval,
    pub positioning_king: Eval,
    pub crowdness: Eval,
}

impl Default for EvalWeights {
    fn default() -> EvalWeights {
        EvalWeights {
            material_pawn: 100,
            material_king: 160,
            positioning_pawn: 4,
            positioning_king: 6,
            crowdness: 2,
        }
    }
}

// Men are rewarded for advancing toward their promotion rank; Black promotes
// on row 7, White on row 0, hence the mirrored tables.
#[rustfmt::skip]
const BLACK_MAN_TABLE: [Eval; 32] = [
    0, 0, 0, 0,
    1, 1, 1, 1,
    2, 2, 2, 2,
    3, 3, 3, 3,
    4, 4, 4, 4,
    5, 5, 5, 5,
    6, 6, 6, 6,
    7, 7, 7, 7,
];

#[rustfmt::skip]
const WHITE_MAN_TABLE: [Eval; 32] = [
    7, 7, 7, 7,
    6, 6, 6, 6,
    5, 5, 5, 5,
    4, 4, 4, 4,
    3, 3, 3, 3,
    2, 2, 2, 2,
    1, 1, 1, 1,
    0, 0, 0, 0,
];

// Kings want the center; the table depends only on the square, not on the
// side owning the king.
#[rustfmt::skip]
const KING_TABLE: [Eval; 32] = [
    0, 0, 0, 0,
    1, 1, 1, 1,
    2, 2, 2, 2,
    3, 3, 3, 3,
    3, 3, 3, 3,
    2, 2, 2, 2,
    1, 1, 1, 1,
    0, 0, 0, 0,
];

/// Signed static score of a board, folded in a single scan over the 32
/// squares.
pub fn static_eval(board: &Board, weights: &EvalWeights) -> Eval {
    let mut eval = 0;

    for (index, &square) in board.iter().enumerate() {
        let Some(owner) = square.owner() else {
            continue;
        };

        let mut score = if square.is_king() {
            weights.material_king + weights.positioning_king * KING_TABLE[index]
        } else {
            let table = match owner {
                Player::Black => &BLACK_MAN_TABLE,
                Player::White => &WHITE_MAN_TABLE,
            };
            weights.material_pawn + weights.positioning_pawn * table[index]
        };

        let mut friendly = 0;
        for neighbor in diagonal_neighbors(index as u8) {
            if board[neighbor as usize].belongs_to(owner) {
                friendly += 1;
            }
        }

        // A fully enclosed piece is not four times as safe as one with a
        // single supporter; cap the contribution
        score += weights.crowdness * if friendly == 4 { 3 } else { friendly };

        eval += match owner {
            Player::White => score,
            Player::Black => -score,
        };
    }

    eval
}
