//! Criterion benchmarks for the linesim engine.
//!
//! Two benchmark groups:
//! - `short_chain`: mine + 5 stations + dock, warmed up so every tree is busy
//! - `long_chain`: mine + 500 stations + dock, the cost of one step at scale

use criterion::{Criterion, criterion_group, criterion_main};
use linesim_core::test_utils::*;

fn bench_short_chain(c: &mut Criterion) {
    let mut engine = chain(5, 42);
    engine.advance(1_000);
    c.bench_function("short_chain_step", |b| {
        b.iter(|| engine.step());
    });
}

fn bench_long_chain(c: &mut Criterion) {
    let mut engine = chain(500, 42);
    engine.advance(1_000);
    c.bench_function("long_chain_step", |b| {
        b.iter(|| engine.step());
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut engine = chain(500, 42);
    engine.advance(100);
    c.bench_function("long_chain_snapshot", |b| {
        b.iter(|| engine.snapshot());
    });
}

criterion_group!(benches, bench_short_chain, bench_long_chain, bench_snapshot);
criterion_main!(benches);
