use pretty_assertions::assert_eq;

use draughtbot::board::{GamePosition, Move, Player};
use draughtbot::movegen::generate_moves;
use draughtbot::search::zobrist::Zobrist;

fn moves_of(fen: &str) -> Vec<String> {
    let zobrist = Zobrist::default();
    let position = GamePosition::from_fen(fen, &zobrist).unwrap();
    generate_moves(&position.board, position.turn)
        .iter()
        .map(Move::to_string)
        .collect()
}

#[test]
fn seven_openings_from_the_start() {
    let zobrist = Zobrist::default();
    let position = GamePosition::start(&zobrist);
    let moves = generate_moves(&position.board, position.turn);

    let notations: Vec<String> = moves.iter().map(Move::to_string).collect();
    assert_eq!(
        notations,
        ["9-14", "9-13", "10-15", "10-14", "11-16", "11-15", "12-16"]
    );
}

#[test]
fn captures_are_mandatory() {
    // The man on 10 has two quiet steps, but the capture on 17 must be played
    let moves = moves_of("B:B10,14:W17");
    assert_eq!(moves, ["14x21"]);
}

#[test]
fn capture_chains_extend_to_the_end() {
    let moves = moves_of("B:B14:W17,25");
    // Only the full chain is legal, never the one-jump prefix
    assert_eq!(moves, ["14x21x30"]);
}

#[test]
fn chains_can_branch() {
    // The man on 14 can jump either neighbor; each branch is its own move
    let moves = moves_of("B:B14:W17,18");
    assert_eq!(moves, ["14x23", "14x21"]);
}

#[test]
fn men_never_move_backward() {
    let moves = moves_of("W:B1:W18");
    assert_eq!(moves, ["18-15", "18-14"]);

    let moves = moves_of("B:B18:W32");
    assert_eq!(moves, ["18-23", "18-22"]);
}

#[test]
fn kings_move_in_all_four_directions() {
    let moves = moves_of("B:BK18:W32");
    assert_eq!(moves, ["18-15", "18-14", "18-23", "18-22"]);
}

#[test]
fn kings_capture_backward() {
    let moves = moves_of("W:B18:WK14,K32");
    assert!(moves.contains(&"14x23".to_string()), "moves: {moves:?}");
}

#[test]
fn edge_squares_have_no_off_board_moves() {
    // Square 5 sits on the left edge; only one forward diagonal exists
    let moves = moves_of("B:B5:W32");
    assert_eq!(moves, ["5-9"]);
}

#[test]
fn generated_moves_round_trip_through_notation() {
    let fens = [
        "B:B10,14:W17",
        "B:B14:W17,25",
        "B:BK18:W32",
        "W:B18:WK14,K32",
        "W:B14,15,22:W26,27,30",
    ];

    let zobrist = Zobrist::default();
    let start = GamePosition::start(&zobrist);
    let mut boards = vec![(start.board, start.turn)];
    for fen in fens {
        let position = GamePosition::from_fen(fen, &zobrist).unwrap();
        boards.push((position.board, position.turn));
    }

    for (board, turn) in boards {
        for mv in generate_moves(&board, turn) {
            let reparsed: Move = mv.to_string().parse().unwrap();
            assert_eq!(reparsed, mv);
        }
    }
}

#[test]
fn blocked_pieces_have_no_moves() {
    let zobrist = Zobrist::default();
    // White's men on 21..24 are walled in by their own back ranks at start
    let position = GamePosition::start(&zobrist);
    let white_moves = generate_moves(&position.board, Player::White);
    assert!(white_moves.iter().all(|mv| mv.from() >= 20));
}
