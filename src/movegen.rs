//! Legal move generation.
//!
//! Captures are mandatory: if any capture chain exists for the side to move,
//! only capture moves are returned. Chains are found by a depth-first walk
//! over jump directions on a private copy of the board; only chains that can
//! jump no further are emitted, never prefixes.

use crate::board::{Board, CapturePath, Move, Player, Square, MAX_JUMPS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reach {
    Adjacent = 1,
    Jump = 2,
}

/// Neighboring square index in a diagonal direction, or `None` at the edge
/// of the board. The numeric offsets depend on the parity of the starting
/// row; a result only counts if its row differs by exactly the step size.
fn step(index: u8, direction: Direction, reach: Reach) -> Option<u8> {
    let start = index as i32;
    let even_row = (start / 4) % 2 == 0;
    let jump = reach == Reach::Jump;
    let mut target = start;

    match direction {
        Direction::NorthEast => {
            target -= if even_row { 3 } else { 4 };
            if jump {
                target -= if even_row { 4 } else { 3 };
            }
        }
        Direction::NorthWest => {
            target -= if even_row { 4 } else { 5 };
            if jump {
                target -= if even_row { 5 } else { 4 };
            }
        }
        Direction::SouthEast => {
            target += if even_row { 5 } else { 4 };
            if jump {
                target += if even_row { 4 } else { 5 };
            }
        }
        Direction::SouthWest => {
            target += if even_row { 4 } else { 3 };
            if jump {
                target += if even_row { 3 } else { 4 };
            }
        }
    }

    if !(0..=31).contains(&target) {
        return None;
    }

    if (target / 4 - start / 4).abs() != reach as i32 {
        return None;
    }

    Some(target as u8)
}

/// Men move along their two forward diagonals, kings along all four. The
/// enumeration order here fixes the order of the generated move list.
fn directions(player: Player, king: bool) -> &'static [Direction] {
    if king {
        &[
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
    } else {
        match player {
            Player::Black => &[Direction::SouthEast, Direction::SouthWest],
            Player::White => &[Direction::NorthEast, Direction::NorthWest],
        }
    }
}

/// Up to four adjacent dark squares of a square, for the crowding term of
/// the evaluation.
pub(crate) fn diagonal_neighbors(index: u8) -> impl Iterator<Item = u8> {
    [
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::SouthEast,
        Direction::SouthWest,
    ]
    .into_iter()
    .filter_map(move |direction| step(index, direction, Reach::Adjacent))
}

struct JumpCtx {
    board: Board,
    source: u8,
    path: Vec<u8>,
}

/// Extends the current capture chain from `at` in every direction. Returns
/// true if no further jump was possible, which makes the caller's chain
/// terminal.
fn extend_jumps(
    ctx: &mut JumpCtx,
    at: u8,
    player: Player,
    king: bool,
    moves: &mut Vec<Move>,
) -> bool {
    if ctx.path.len() == MAX_JUMPS {
        return true;
    }

    let mut terminal = true;

    for &direction in directions(player, king) {
        let Some(enemy) = step(at, direction, Reach::Adjacent) else {
            continue;
        };
        let Some(target) = step(at, direction, Reach::Jump) else {
            continue;
        };

        if !ctx.board[enemy as usize].belongs_to(player.opponent())
            || ctx.board[target as usize] != Square::Empty
        {
            continue;
        }

        terminal = false;

        ctx.path.push(target);

        // Remove the jumped piece and relocate ours so the recursion cannot
        // jump the same piece twice or land on an occupied square
        let removed = std::mem::replace(&mut ctx.board[enemy as usize], Square::Empty);
        ctx.board.swap(at as usize, target as usize);

        if extend_jumps(ctx, target, player, king, moves) {
            moves.push(Move::Capture {
                from: ctx.source,
                path: CapturePath::from_slice(&ctx.path),
            });
        }

        ctx.board.swap(at as usize, target as usize);
        ctx.board[enemy as usize] = removed;

        ctx.path.pop();
    }

    terminal
}

fn generate_piece_captures(
    board: &Board,
    player: Player,
    index: u8,
    king: bool,
    moves: &mut Vec<Move>,
) {
    let mut ctx = JumpCtx {
        board: *board,
        source: index,
        path: Vec::new(),
    };

    extend_jumps(&mut ctx, index, player, king, moves);
}

fn generate_piece_moves(
    board: &Board,
    player: Player,
    index: u8,
    king: bool,
    moves: &mut Vec<Move>,
) {
    for &direction in directions(player, king) {
        let Some(target) = step(index, direction, Reach::Adjacent) else {
            continue;
        };

        if board[target as usize] != Square::Empty {
            continue;
        }

        moves.push(Move::Normal {
            from: index,
            to: target,
        });
    }
}

/// All legal moves for `player`, in a stable order: ascending source square,
/// then direction enumeration order. Empty when the side has no move, which
/// ends the game.
pub fn generate_moves(board: &Board, player: Player) -> Vec<Move> {
    let mut moves = Vec::new();

    for index in 0..32u8 {
        let square = board[index as usize];
        if square.belongs_to(player) {
            generate_piece_captures(board, player, index, square.is_king(), &mut moves);
        }
    }

    // Captures are mandatory; normal moves only exist when no capture does
    if !moves.is_empty() {
        return moves;
    }

    for index in 0..32u8 {
        let square = board[index as usize];
        if square.belongs_to(player) {
            generate_piece_moves(board, player, index, square.is_king(), &mut moves);
        }
    }

    moves
}
