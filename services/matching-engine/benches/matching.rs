//! Matching engine benchmarks
//!
//! - resting inserts spread over many levels
//! - an incoming order sweeping a deep ask ladder
//! - cancels from the middle of a long queue

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use lob_types::ids::OrderId;
use lob_types::numeric::{FixedPrice, Quantity};
use lob_types::order::{Order, Side};
use lob_types::sequence::{CountingSequencer, Sequencer};
use matching_engine::MatchingEngine;

fn order(seq: &mut CountingSequencer, id: u64, side: Side, cents: u64, qty: u64) -> Order {
    seq.admit(
        OrderId::new(id),
        side,
        FixedPrice::new(cents as i64, 2).unwrap(),
        Quantity::from_u64(qty),
    )
    .unwrap()
}

/// 1,000 asks over 100 levels starting at 100.00
fn deep_ask_book() -> (MatchingEngine, CountingSequencer) {
    let mut engine = MatchingEngine::new();
    let mut seq = CountingSequencer::new();
    for id in 1..=1_000u64 {
        let o = order(&mut seq, id, Side::SELL, 10_000 + id % 100, 1);
        engine.submit(o).unwrap();
    }
    (engine, seq)
}

fn bench_resting_inserts(c: &mut Criterion) {
    c.bench_function("rest_1000_orders", |b| {
        b.iter(|| {
            let mut engine = MatchingEngine::new();
            let mut seq = CountingSequencer::new();
            for id in 1..=1_000u64 {
                let side = if id % 2 == 0 { Side::BUY } else { Side::SELL };
                let cents = if side == Side::BUY { 9_900 - id % 50 } else { 10_100 + id % 50 };
                engine.submit(order(&mut seq, id, side, cents, 1)).unwrap();
            }
            black_box(engine)
        })
    });
}

fn bench_sweep(c: &mut Criterion) {
    c.bench_function("sweep_500_of_1000_asks", |b| {
        b.iter_batched(
            deep_ask_book,
            |(mut engine, mut seq)| {
                let sweep = order(&mut seq, 10_001, Side::BUY, 20_000, 500);
                black_box(engine.submit(sweep).unwrap())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_cancel_mid_queue(c: &mut Criterion) {
    c.bench_function("cancel_from_middle_of_level", |b| {
        b.iter_batched(
            || {
                let mut engine = MatchingEngine::new();
                let mut seq = CountingSequencer::new();
                for id in 1..=1_000u64 {
                    engine.submit(order(&mut seq, id, Side::BUY, 9_900, 1)).unwrap();
                }
                engine
            },
            |mut engine| black_box(engine.cancel(OrderId::new(500)).unwrap()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_resting_inserts, bench_sweep, bench_cancel_mid_queue);
criterion_main!(benches);
