use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;

use draughtbot::board::{GamePosition, Move};
use draughtbot::movegen::generate_moves;
use draughtbot::search::eval::{EvalWeights, DRAW_SCORE};
use draughtbot::search::minimax::Search;
use draughtbot::search::node::{NodeArena, QUIET_DRAW_PLIES};
use draughtbot::search::tt::TranspositionTable;
use draughtbot::search::zobrist::Zobrist;

fn run(
    position: &GamePosition,
    history: &[(GamePosition, Move)],
    depth: u32,
    stop: Arc<AtomicBool>,
) -> (Option<Move>, i32) {
    let zobrist = Zobrist::default();
    let mut tt = TranspositionTable::new();
    let best = Arc::new(Mutex::new(None));

    let mut search = Search::new(
        &zobrist,
        &mut tt,
        EvalWeights::default(),
        stop,
        Arc::clone(&best),
    );

    let result = search.run(position, history, depth, Duration::from_secs(5));

    // The shared slot always ends up agreeing with the returned move
    assert_eq!(*best.lock().unwrap(), result.0);
    result
}

fn position(fen: &str) -> GamePosition {
    GamePosition::from_fen(fen, &Zobrist::default()).unwrap()
}

fn no_stop() -> Arc<AtomicBool> {
    Arc::new(AtomicBool::new(false))
}

#[test]
fn finds_the_forced_capture() {
    let (best, _) = run(&position("W:B14:W18"), &[], 3, no_stop());
    assert_eq!(best.unwrap().to_string(), "18x9");
}

#[test]
fn avoids_hanging_a_man() {
    // Moving the man on 14 lets White jump it; 10-15 keeps both men
    let (best, eval) = run(&position("B:B10,14:W22"), &[], 2, no_stop());
    assert_eq!(best.unwrap().to_string(), "10-15");
    assert!(eval < 0, "Black is a man up, eval {eval}");
}

#[test]
fn stopped_search_still_reports_a_move() {
    let zobrist = Zobrist::default();
    let start = GamePosition::start(&zobrist);

    let stop = Arc::new(AtomicBool::new(true));
    let (best, _) = run(&start, &[], 30, stop);

    // Depth 30 would run practically forever; the pre-set stop flag makes
    // the search return after the first root move
    assert!(best.is_some());
}

#[test]
fn truncated_siblings_never_displace_a_searched_move() {
    let zobrist = Zobrist::default();

    // King shuffle history: the first root move 6-2 repeats a position for
    // the third time and folds to a draw in two nodes. Every other root
    // move opens a tree far too big for depth 25, so once the stop flag
    // rises those siblings come back with shallow static scores. Black is
    // a man up here, so any such score looks better than the draw; it
    // still must not displace the one move that was actually searched.
    let mut current =
        GamePosition::from_fen("W:BK2,9,10,11:WK21,25,K32", &zobrist).unwrap();
    let mut history = Vec::new();
    for notation in ["21-17", "2-6", "17-21", "6-2", "21-17", "2-6", "17-21"] {
        let mv: Move = notation.parse().unwrap();
        let legal = generate_moves(&current.board, current.turn);
        assert!(legal.contains(&mv), "{notation} not legal");
        history.push((current.clone(), mv));
        current.apply_move(&mv, &zobrist);
    }

    let stop = no_stop();
    let best = Arc::new(Mutex::new(None));

    // Raise the stop flag the moment the first root move is published
    let watcher = {
        let stop = Arc::clone(&stop);
        let best = Arc::clone(&best);
        std::thread::spawn(move || {
            while best.lock().unwrap().is_none() {
                std::thread::yield_now();
            }
            stop.store(true, Ordering::Relaxed);
        })
    };

    let mut tt = TranspositionTable::new();
    let mut search = Search::new(
        &zobrist,
        &mut tt,
        EvalWeights::default(),
        Arc::clone(&stop),
        Arc::clone(&best),
    );
    let (mv, eval) = search.run(&current, &history, 25, Duration::from_secs(5));
    watcher.join().unwrap();

    assert_eq!(mv.unwrap().to_string(), "6-2");
    assert_eq!(eval, DRAW_SCORE);
    assert_eq!(
        best.lock().unwrap().map(|m| m.to_string()),
        Some("6-2".to_string())
    );
}

#[test]
fn threefold_repetition_is_a_draw() {
    let zobrist = Zobrist::default();
    let mut current = GamePosition::from_fen("B:BK1:WK32", &zobrist).unwrap();
    let mut history = Vec::new();

    // Two full king shuffles put the starting position on the board for
    // the third time
    for notation in ["1-6", "32-27", "6-1", "27-32", "1-6", "32-27", "6-1", "27-32"] {
        let mv: Move = notation.parse().unwrap();
        history.push((current.clone(), mv));
        current.apply_move(&mv, &zobrist);
    }

    let root = {
        let mut arena = NodeArena::new();
        let index = arena.seed(&current, &history);
        arena.is_draw(index)
    };
    assert!(root, "repetition not detected");

    let (best, eval) = run(&current, &history, 4, no_stop());
    assert_eq!(best, None);
    assert_eq!(eval, DRAW_SCORE);
}

#[test]
fn advancement_resets_repetition_history() {
    let zobrist = Zobrist::default();
    let mut current = GamePosition::from_fen("B:BK1,12:WK32", &zobrist).unwrap();
    let mut history = Vec::new();

    // Same shuffle, but a man move in the middle severs the chain
    for notation in ["1-6", "32-27", "6-1", "27-32", "12-16", "32-27", "16-20", "27-32"] {
        let mv: Move = notation.parse().unwrap();
        history.push((current.clone(), mv));
        current.apply_move(&mv, &zobrist);
    }

    let mut arena = NodeArena::new();
    let index = arena.seed(&current, &history);
    assert!(!arena.is_draw(index));
}

#[test]
fn eighty_quiet_plies_is_a_draw() {
    let zobrist = Zobrist::default();
    let mut stalled = GamePosition::from_fen("B:BK1:WK32", &zobrist).unwrap();
    stalled.quiet_plies = QUIET_DRAW_PLIES;

    let (best, eval) = run(&stalled, &[], 4, no_stop());
    assert_eq!(best, None);
    assert_eq!(eval, DRAW_SCORE);
}

#[test]
fn no_legal_moves_means_no_best_move() {
    // The man on 28 is wedged against the white king on 32
    let (best, _) = run(&position("B:B28:WK32"), &[], 4, no_stop());
    assert_eq!(best, None);
}
