//! Order book performance benchmarks (Criterion).
//!
//! Run: `cargo bench` or `cargo bench --bench book`.

use clob_engine::order_gen::{Generator, GeneratorConfig};
use clob_engine::{OrderBook, OrderId, Price};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

fn bench_add_order_throughput(c: &mut Criterion) {
    const N: usize = 1000;
    let mut group = c.benchmark_group("book");
    group.throughput(Throughput::Elements(N as u64));
    group.bench_function("add_order_1000", |b| {
        b.iter_batched(
            || {
                let config = GeneratorConfig {
                    seed: 42,
                    num_orders: N,
                    tif_gtc_ratio: 1.0,
                    tif_ioc_ratio: 0.0,
                    ..Default::default()
                };
                let book = OrderBook::new("AAPL");
                let orders = Generator::new(config).all_orders();
                (book, orders)
            },
            |(mut book, orders)| {
                for mut order in orders {
                    let _ = book.add_order(&mut order);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_cancel_order(c: &mut Criterion) {
    const RESTING: usize = 500;
    const CANCELS_PER_ITER: usize = 100;
    let mut group = c.benchmark_group("book");
    group.throughput(Throughput::Elements(CANCELS_PER_ITER as u64));
    group.bench_function("cancel_order_100_after_500_resting", |b| {
        b.iter_batched(
            || {
                let config = GeneratorConfig {
                    seed: 123,
                    num_orders: RESTING,
                    tif_gtc_ratio: 1.0,
                    tif_ioc_ratio: 0.0,
                    ..Default::default()
                };
                let mut book = OrderBook::new("AAPL");
                let orders = Generator::new(config).all_orders();
                let mut cancel_ids = Vec::with_capacity(CANCELS_PER_ITER);
                for mut order in orders {
                    let id = order.id();
                    book.add_order(&mut order);
                    if cancel_ids.len() < CANCELS_PER_ITER && book.get_order(id).is_some() {
                        cancel_ids.push(id);
                    }
                }
                (book, cancel_ids)
            },
            |(mut book, cancel_ids)| {
                for id in cancel_ids {
                    book.cancel_order(id);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_modify_order(c: &mut Criterion) {
    const RESTING: usize = 200;
    const MODIFIES: usize = 50;
    let mut group = c.benchmark_group("book");
    group.throughput(Throughput::Elements(MODIFIES as u64));
    group.bench_function("modify_order_50_after_200_resting", |b| {
        b.iter_batched(
            || {
                let config = GeneratorConfig {
                    seed: 456,
                    num_orders: RESTING,
                    tif_gtc_ratio: 1.0,
                    tif_ioc_ratio: 0.0,
                    ..Default::default()
                };
                let mut book = OrderBook::new("AAPL");
                let orders = Generator::new(config).all_orders();
                let mut targets: Vec<(OrderId, Price)> = Vec::with_capacity(MODIFIES);
                for mut order in orders {
                    let id = order.id();
                    book.add_order(&mut order);
                    if targets.len() < MODIFIES {
                        if let Some(resting) = book.get_order(id) {
                            targets.push((id, resting.price() + Price::from_raw(1)));
                        }
                    }
                }
                (book, targets)
            },
            |(mut book, targets)| {
                for (id, new_price) in targets {
                    let _ = book.modify_order(id, Some(new_price), None);
                }
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_add_order_throughput,
    bench_cancel_order,
    bench_modify_order
);
criterion_main!(benches);
