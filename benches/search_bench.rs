use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use draughtbot::board::GamePosition;
use draughtbot::search::eval::EvalWeights;
use draughtbot::search::minimax::Search;
use draughtbot::search::tt::TranspositionTable;
use draughtbot::search::zobrist::Zobrist;

fn search_benchmark(c: &mut Criterion) {
    let zobrist = Zobrist::default();
    let position = GamePosition::start(&zobrist);

    let mut group = c.benchmark_group("search");
    for depth in [4u32, 6] {
        group.bench_function(format!("depth_{depth}"), |b| {
            b.iter(|| {
                let mut tt = TranspositionTable::new();
                let stop = Arc::new(AtomicBool::new(false));
                let best = Arc::new(Mutex::new(None));
                let mut search =
                    Search::new(&zobrist, &mut tt, EvalWeights::default(), stop, best);
                search.run(black_box(&position), &[], depth, Duration::from_secs(60))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, search_benchmark);
criterion_main!(benches);
