//! Board, piece and move representation for 8x8 draughts.
//!
//! Only the 32 dark squares are playable. Internally they are indexed 0..=31
//! row by row; the text protocol numbers them 1..=32. Black sits on squares
//! 1..=12 and advances toward higher indices, White sits on 21..=32 and
//! advances toward lower indices.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::search::zobrist::Zobrist;

/// Longest capture chain a single piece can play in one turn.
pub const MAX_JUMPS: usize = 9;

pub const START_POSITION: &str =
    "B:B1,2,3,4,5,6,7,8,9,10,11,12:W21,22,23,24,25,26,27,28,29,30,31,32";

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed position string")]
    InvalidPosition,
    #[error("square number out of range 1..=32")]
    SquareOutOfRange,
    #[error("duplicate square in position")]
    DuplicateSquare,
    #[error("malformed move string")]
    InvalidMove,
}

/// Contents of one playable square. Bit 0 marks black, bit 1 white,
/// bit 2 a king; `Empty` has no bits set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Square {
    #[default]
    Empty = 0b000,
    BlackMan = 0b001,
    WhiteMan = 0b010,
    BlackKing = 0b101,
    WhiteKing = 0b110,
}

impl Square {
    pub fn is_black(self) -> bool {
        self as u8 & 0b001 != 0
    }

    pub fn is_white(self) -> bool {
        self as u8 & 0b010 != 0
    }

    pub fn is_king(self) -> bool {
        self as u8 & 0b100 != 0
    }

    pub fn belongs_to(self, player: Player) -> bool {
        self as u8 & player as u8 != 0
    }

    pub fn owner(self) -> Option<Player> {
        if self.is_black() {
            Some(Player::Black)
        } else if self.is_white() {
            Some(Player::White)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Player {
    Black = 0b001,
    White = 0b010,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    fn letter(self) -> char {
        match self {
            Player::Black => 'B',
            Player::White => 'W',
        }
    }
}

pub type Board = [Square; 32];

/// Board row (0..=7) of a square index.
pub(crate) fn board_row(index: u8) -> u8 {
    index / 4
}

/// Index of the square jumped over between two capture endpoints.
///
/// Works on 0-based indices; the parity of the starting row decides which
/// of the two candidate midpoints is the dark square.
pub(crate) fn jumped_square(from: u8, to: u8) -> u8 {
    let sum = from as i32 + to as i32 + 2; // 1-based numbers
    let mid = if (from / 4) % 2 == 0 {
        (sum + 1) / 2
    } else {
        (sum - 1) / 2
    };
    (mid - 1) as u8
}

/// Ordered landing squares of a capture chain, one per jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapturePath {
    squares: [u8; MAX_JUMPS],
    len: u8,
}

impl CapturePath {
    pub fn from_slice(landings: &[u8]) -> CapturePath {
        debug_assert!(!landings.is_empty() && landings.len() <= MAX_JUMPS);

        let mut path = CapturePath::default();
        for &square in landings {
            path.push(square);
        }
        path
    }

    pub fn push(&mut self, square: u8) {
        debug_assert!((self.len as usize) < MAX_JUMPS);

        self.squares[self.len as usize] = square;
        self.len += 1;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.squares[..self.len as usize]
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn last(&self) -> u8 {
        debug_assert!(self.len > 0);
        self.squares[self.len as usize - 1]
    }
}

/// One move: a single diagonal step, or a chain of jumps by one piece.
/// Equality is structural. "No move at all" is spelled `Option<Move>::None`
/// by the search and the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Normal { from: u8, to: u8 },
    Capture { from: u8, path: CapturePath },
}

impl Move {
    pub fn from(&self) -> u8 {
        match self {
            Move::Normal { from, .. } | Move::Capture { from, .. } => *from,
        }
    }

    /// Final square the moving piece ends up on.
    pub fn landing(&self) -> u8 {
        match self {
            Move::Normal { to, .. } => *to,
            Move::Capture { path, .. } => path.last(),
        }
    }

    pub fn is_capture(&self) -> bool {
        matches!(self, Move::Capture { .. })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Normal { from, to } => write!(f, "{}-{}", from + 1, to + 1),
            Move::Capture { from, path } => {
                write!(f, "{}", from + 1)?;
                for &square in path.as_slice() {
                    write!(f, "x{}", square + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Move {
    type Err = ParseError;

    /// Parses `"11-15"` or `"6x13x4"`. The normal/capture classification
    /// comes from the diagonal distance of the first step; chain geometry
    /// beyond that is validated by move generation, not here.
    fn from_str(s: &str) -> Result<Move, ParseError> {
        let mut squares = Vec::new();

        for token in s.split(['-', 'x']) {
            let number: u8 = token.parse().map_err(|_| ParseError::InvalidMove)?;
            if !(1..=32).contains(&number) {
                return Err(ParseError::SquareOutOfRange);
            }
            squares.push(number - 1);
        }

        if squares.len() < 2 {
            return Err(ParseError::InvalidMove);
        }

        let distance = (squares[0] as i32 - squares[1] as i32).abs();

        match distance {
            3..=5 => {
                if squares.len() != 2 {
                    return Err(ParseError::InvalidMove);
                }
                Ok(Move::Normal {
                    from: squares[0],
                    to: squares[1],
                })
            }
            7 | 9 => {
                if squares.len() > 1 + MAX_JUMPS {
                    return Err(ParseError::InvalidMove);
                }
                Ok(Move::Capture {
                    from: squares[0],
                    path: CapturePath::from_slice(&squares[1..]),
                })
            }
            _ => Err(ParseError::InvalidMove),
        }
    }
}

/// True if the move resets the draw-by-inactivity counter: any capture, or
/// any move by a man. Must be asked before the move is applied.
pub fn is_advancement(board: &Board, mv: &Move) -> bool {
    mv.is_capture() || !board[mv.from() as usize].is_king()
}

fn crown(board: &mut Board, index: u8) {
    let square = board[index as usize];

    if square.is_black() && board_row(index) == 7 {
        board[index as usize] = Square::BlackKing;
    } else if square.is_white() && board_row(index) == 0 {
        board[index as usize] = Square::WhiteKing;
    }
}

/// Applies a move to a bare board: relocation, removal of jumped pieces and
/// promotion, but no hash or counter bookkeeping. Promotion happens only on
/// the final landing square, never mid-chain.
pub(crate) fn apply_to_board(board: &mut Board, mv: &Move) {
    match mv {
        Move::Normal { from, to } => {
            board.swap(*from as usize, *to as usize);
            crown(board, *to);
        }
        Move::Capture { from, path } => {
            let mut at = *from;
            for &square in path.as_slice() {
                let jumped = jumped_square(at, square);
                board[jumped as usize] = Square::Empty;
                at = square;
            }
            board.swap(*from as usize, at as usize);
            crown(board, at);
        }
    }
}

/// Full game position: board, side to move, plies without a capture or man
/// move, and the incrementally maintained Zobrist key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GamePosition {
    pub board: Board,
    pub turn: Player,
    pub quiet_plies: u32,
    pub key: u64,
}

impl GamePosition {
    pub fn start(zobrist: &Zobrist) -> GamePosition {
        let mut board = [Square::Empty; 32];

        for index in 0..12 {
            board[index] = Square::BlackMan;
        }
        for index in 20..32 {
            board[index] = Square::WhiteMan;
        }

        let key = zobrist.compute(&board, Player::Black);

        GamePosition {
            board,
            turn: Player::Black,
            quiet_plies: 0,
            key,
        }
    }

    /// Parses the colon/comma position notation,
    /// e.g. `"B:W18,24,27,K10:B12,16,20"`. Fails without partial state on
    /// any structural violation.
    pub fn from_fen(fen: &str, zobrist: &Zobrist) -> Result<GamePosition, ParseError> {
        let parts: Vec<&str> = fen.split(':').collect();

        if parts.len() != 3 {
            return Err(ParseError::InvalidPosition);
        }

        let turn = parse_side(parts[0])?;

        let mut board = [Square::Empty; 32];
        let mut seen = [false; 32];
        let mut side_letters = [' '; 2];

        for (section, letter_slot) in parts[1..].iter().zip(side_letters.iter_mut()) {
            let mut chars = section.chars();
            let side = match chars.next() {
                Some('B') => Player::Black,
                Some('W') => Player::White,
                _ => return Err(ParseError::InvalidPosition),
            };
            *letter_slot = side.letter();

            for token in chars.as_str().split(',') {
                let (king, digits) = match token.strip_prefix('K') {
                    Some(rest) => (true, rest),
                    None => (false, token),
                };

                let number: u8 = digits.parse().map_err(|_| ParseError::InvalidPosition)?;
                if !(1..=32).contains(&number) {
                    return Err(ParseError::SquareOutOfRange);
                }

                let index = (number - 1) as usize;
                if seen[index] {
                    return Err(ParseError::DuplicateSquare);
                }
                seen[index] = true;

                board[index] = match (side, king) {
                    (Player::Black, false) => Square::BlackMan,
                    (Player::Black, true) => Square::BlackKing,
                    (Player::White, false) => Square::WhiteMan,
                    (Player::White, true) => Square::WhiteKing,
                };
            }
        }

        if side_letters[0] == side_letters[1] {
            return Err(ParseError::InvalidPosition);
        }

        let key = zobrist.compute(&board, turn);

        Ok(GamePosition {
            board,
            turn,
            quiet_plies: 0,
            key,
        })
    }

    /// Canonical text form of the position: turn, then Black's pieces, then
    /// White's, each in ascending square order. Used as the opening book key.
    pub fn to_fen(&self) -> String {
        let mut out = String::new();
        out.push(self.turn.letter());

        for player in [Player::Black, Player::White] {
            out.push(':');
            out.push(player.letter());

            let mut first = true;
            for (index, square) in self.board.iter().enumerate() {
                if !square.belongs_to(player) {
                    continue;
                }
                if !first {
                    out.push(',');
                }
                first = false;
                if square.is_king() {
                    out.push('K');
                }
                out.push_str(&(index + 1).to_string());
            }
        }

        out
    }

    /// Plays a move, flipping the turn and maintaining the Zobrist key by
    /// XOR deltas: every vacated square is XORed out, the landing square is
    /// XORed in after promotion, and the side-to-move key is toggled. The
    /// result always equals a from-scratch recomputation.
    pub fn apply_move(&mut self, mv: &Move, zobrist: &Zobrist) {
        let advancement = is_advancement(&self.board, mv);
        let from = mv.from();
        let landing = mv.landing();

        self.key ^= zobrist.piece(self.board[from as usize], from);

        if let Move::Capture { from, path } = mv {
            let mut at = *from;
            for &square in path.as_slice() {
                let jumped = jumped_square(at, square);
                self.key ^= zobrist.piece(self.board[jumped as usize], jumped);
                at = square;
            }
        }

        apply_to_board(&mut self.board, mv);

        self.key ^= zobrist.piece(self.board[landing as usize], landing);
        self.key ^= zobrist.side_to_move();

        self.turn = self.turn.opponent();
        self.quiet_plies = if advancement { 0 } else { self.quiet_plies + 1 };
    }
}

fn parse_side(s: &str) -> Result<Player, ParseError> {
    match s {
        "B" => Ok(Player::Black),
        "W" => Ok(Player::White),
        _ => Err(ParseError::InvalidPosition),
    }
}
