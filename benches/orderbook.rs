//! Benchmarks for order book operations.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use binance_depth_sync::orderbook::logic::{apply_levels, apply_update, classify};
use binance_depth_sync::orderbook::OrderBookState;
use binance_depth_sync::types::{DepthUpdate, Level};

fn level(price: f64, qty: f64) -> Level {
    (format!("{:.2}", price), format!("{:.4}", qty))
}

fn populated_book(size: usize) -> OrderBookState {
    let mut book = OrderBookState::new("BENCHUSDT");
    let bids: Vec<Level> = (0..size).map(|i| level(50_000.0 - i as f64, 1.0)).collect();
    let asks: Vec<Level> = (0..size).map(|i| level(50_001.0 + i as f64, 1.0)).collect();
    apply_levels(&mut book.bids, &bids);
    apply_levels(&mut book.asks, &asks);
    book
}

fn bench_apply_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_update");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let mut book = populated_book(size);

            // A typical 100ms diff: a few changes and one removal per side
            let update = DepthUpdate::new(
                "BENCHUSDT",
                1,
                5,
                vec![
                    level(50_000.0, 2.5),
                    level(49_999.0, 0.3),
                    level(49_998.0, 0.0),
                ],
                vec![
                    level(50_001.0, 1.7),
                    level(50_002.0, 0.0),
                    level(50_003.0, 4.1),
                ],
            );

            b.iter(|| {
                apply_update(&mut book, black_box(&update));
            });
        });
    }

    group.finish();
}

fn bench_classify(c: &mut Criterion) {
    let update = DepthUpdate::new("BENCHUSDT", 1_001, 1_010, vec![], vec![]);

    c.bench_function("classify", |b| {
        b.iter(|| black_box(classify(black_box(&update), black_box(1_000))));
    });
}

fn bench_top_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_bids");

    for size in [10, 100, 1000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let book = populated_book(size);

            b.iter(|| {
                black_box(book.top_bids(10));
            });
        });
    }

    group.finish();
}

fn bench_spread(c: &mut Criterion) {
    let book = populated_book(500);

    c.bench_function("orderbook_spread", |b| {
        b.iter(|| {
            black_box(book.spread());
        });
    });
}

criterion_group!(
    benches,
    bench_apply_update,
    bench_classify,
    bench_top_levels,
    bench_spread
);
criterion_main!(benches);
