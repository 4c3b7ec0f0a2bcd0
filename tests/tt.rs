use pretty_assertions::assert_eq;

use draughtbot::board::Move;
use draughtbot::search::tt::TranspositionTable;

#[test]
fn probe_misses_on_shallower_entries() {
    let mut tt = TranspositionTable::new();
    let mv: Move = "11-15".parse().unwrap();
    tt.store(7, 3, 42, Some(mv));

    assert!(tt.probe(7, 4).is_none());

    let entry = tt.probe(7, 3).unwrap();
    assert_eq!(entry.depth, 3);
    assert_eq!(entry.eval, 42);
    assert_eq!(entry.best, Some(mv));

    // A deeper requirement satisfied by a deeper entry
    assert!(tt.probe(7, 2).is_some());
}

#[test]
fn probe_misses_on_unknown_keys() {
    let mut tt = TranspositionTable::new();
    tt.store(1, 5, 0, None);

    assert!(tt.probe(2, 0).is_none());
}

#[test]
fn store_overwrites_unconditionally() {
    let mut tt = TranspositionTable::new();
    tt.store(9, 6, 100, None);
    // A shallower result still replaces the deeper one
    tt.store(9, 2, -5, None);

    assert!(tt.probe(9, 6).is_none());
    let entry = tt.probe(9, 2).unwrap();
    assert_eq!(entry.eval, -5);
    assert_eq!(tt.len(), 1);
}

#[test]
fn clear_empties_the_table() {
    let mut tt = TranspositionTable::new();
    tt.store(1, 1, 1, None);
    tt.store(2, 2, 2, None);
    assert_eq!(tt.len(), 2);

    tt.clear();
    assert!(tt.is_empty());
    assert!(tt.probe(1, 0).is_none());
}
