//! Solver benchmarks.
//!
//! Each iteration builds a fresh manager and solves a conjunction of random
//! byte comparisons over one symbolic object, the typical shape of path
//! constraints in a symbolic executor.
//!
//! Run with:
//! ```bash
//! cargo bench --bench fast_cex
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fastcex::expr::ExprManager;
use fastcex::range::ValueRange;
use fastcex::reference::ExprRef;
use fastcex::solver::{FastCexSolver, IncompleteSolver, Query};
use fastcex::types::ArrayId;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// `n` constraints `lo <= x[i] < hi` over an object of `size` bytes.
fn build_bounds(em: &ExprManager, x: ArrayId, size: u64, n: usize, rng: &mut ChaCha8Rng) -> Vec<ExprRef> {
    (0..n)
        .map(|_| {
            let byte = em.mk_read_byte(x, rng.gen_range(0..size));
            let lo: u64 = rng.gen_range(0..128);
            let hi: u64 = rng.gen_range(128..=255);
            em.mk_and(
                em.mk_ule(em.mk_constant(lo, 8), byte),
                em.mk_ult(byte, em.mk_constant(hi, 8)),
            )
        })
        .collect()
}

fn bench_initial_values(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_initial_values");

    for &size in &[4u64, 16, 64, 256] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(size);
                let em = ExprManager::default();
                let x = em.mk_array("x", size);
                let constraints = build_bounds(&em, x, size, size as usize, &mut rng);
                let query = Query::with_false(&em, constraints);
                FastCexSolver::new(&em).compute_initial_values(&query, &[x])
            })
        });
    }

    group.finish();
}

fn bench_words(c: &mut Criterion) {
    let mut group = c.benchmark_group("word_constraints");

    for &bytes in &[2u64, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(bytes), &bytes, |b, &bytes| {
            b.iter(|| {
                let em = ExprManager::default();
                let x = em.mk_array("x", 16);
                let word = em.mk_read_le(x, 0, bytes);
                let width = 8 * bytes as u32;
                let c = em.mk_eq(word, em.mk_constant(0x0102_0304_0506_0708, width));
                let query = Query::with_false(&em, vec![c]);
                FastCexSolver::new(&em).compute_initial_values(&query, &[x])
            })
        });
    }

    group.finish();
}

fn bench_range_ops(c: &mut Criterion) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let ranges: Vec<(ValueRange, ValueRange)> = (0..1024)
        .map(|_| {
            let (a, b): (u64, u64) = (rng.gen(), rng.gen());
            let (c, d): (u64, u64) = (rng.gen(), rng.gen());
            (ValueRange::new(a.min(b), a.max(b)), ValueRange::new(c.min(d), c.max(d)))
        })
        .collect();

    c.bench_function("range_and_or", |b| {
        b.iter(|| {
            ranges
                .iter()
                .map(|(l, r)| l.binary_and(r).max() ^ l.binary_or(r).min())
                .fold(0u64, |acc, v| acc ^ v)
        })
    });
}

criterion_group!(benches, bench_initial_values, bench_words, bench_range_ops);
criterion_main!(benches);
