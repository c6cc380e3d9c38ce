//! Benchmark – number formatting and parsing in `jsoncore::number`
#![allow(missing_docs)]

use std::{io::Write as _, time::Duration};

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jsoncore::number::{parse, schubfach, write};
use rand::{Rng, SeedableRng, rngs::SmallRng};

fn sample_doubles(n: usize) -> Vec<f64> {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let v = f64::from_bits(rng.random());
        if v.is_finite() {
            out.push(v);
        }
    }
    out
}

fn sample_longs(n: usize) -> Vec<i64> {
    let mut rng = SmallRng::seed_from_u64(0x1009);
    (0..n)
        .map(|_| rng.random::<i64>() >> rng.random_range(0..63))
        .collect()
}

fn sample_size() -> usize {
    if cfg!(feature = "bench-fast") { 64 } else { 4096 }
}

fn bench_write_doubles(c: &mut Criterion) {
    let values = sample_doubles(sample_size());
    let mut group = c.benchmark_group("write_double");
    group.bench_function("schubfach", |b| {
        let mut out = Vec::with_capacity(32 * values.len());
        b.iter(|| {
            out.clear();
            for &v in &values {
                schubfach::write_double(black_box(v), &mut out);
            }
            black_box(out.len());
        });
    });
    group.bench_function("std_debug", |b| {
        let mut out = Vec::with_capacity(32 * values.len());
        b.iter(|| {
            out.clear();
            for &v in &values {
                write!(out, "{:?}", black_box(v)).unwrap();
            }
            black_box(out.len());
        });
    });
    group.finish();
}

fn bench_write_longs(c: &mut Criterion) {
    let values = sample_longs(sample_size());
    let mut group = c.benchmark_group("write_long");
    group.bench_function("jsoncore", |b| {
        let mut out = Vec::with_capacity(20 * values.len());
        b.iter(|| {
            out.clear();
            for &v in &values {
                write::write_long(black_box(v), &mut out);
            }
            black_box(out.len());
        });
    });
    group.bench_function("std_display", |b| {
        let mut out = Vec::with_capacity(20 * values.len());
        b.iter(|| {
            out.clear();
            for &v in &values {
                write!(out, "{}", black_box(v)).unwrap();
            }
            black_box(out.len());
        });
    });
    group.finish();
}

fn bench_parse_doubles(c: &mut Criterion) {
    let texts: Vec<String> = sample_doubles(sample_size())
        .into_iter()
        .map(schubfach::double_to_string)
        .collect();
    let mut group = c.benchmark_group("parse_double");
    for fast in [false, true] {
        group.bench_with_input(BenchmarkId::new("fast", fast), &fast, |b, &fast| {
            b.iter(|| {
                for text in &texts {
                    black_box(parse::parse_double(black_box(text), fast).unwrap());
                }
            });
        });
    }
    group.finish();
}

fn bench_parse_longs(c: &mut Criterion) {
    let texts: Vec<String> = sample_longs(sample_size())
        .into_iter()
        .map(|v| v.unsigned_abs().to_string())
        .collect();
    c.bench_function("parse_long_digits", |b| {
        b.iter(|| {
            for text in &texts {
                let digits = text.as_bytes();
                match digits.len() {
                    0..=9 => {
                        black_box(parse::parse_int(black_box(digits)));
                    }
                    10..=18 => {
                        black_box(parse::parse_long(black_box(digits)));
                    }
                    _ => {
                        black_box(parse::parse_long19(black_box(digits)));
                    }
                }
            }
        });
    });
}

fn criterion() -> Criterion {
    let mut c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c = c
            .warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10);
    } else {
        c = c
            .warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(10));
    }
    c
}

criterion_group! { name = benches; config = criterion(); targets = bench_write_doubles, bench_write_longs, bench_parse_doubles, bench_parse_longs }
criterion_main!(benches);
