use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use topids::parsers::{IdValueParser, RecordParser};
use topids::{compute_top_k, IgnoreDiscards, Record, TopKRequest, TopKSelector};

/// Deterministic `id_value` lines with a sprinkling of malformed ones
fn synthetic_input(lines: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(lines * 20);
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    for i in 0..lines {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        if i % 97 == 0 {
            out.extend_from_slice(b"garbage line\n");
        } else {
            out.extend_from_slice(format!("{:010}_{}\n", i, state % 1_000_000_007).as_bytes());
        }
    }
    out
}

fn bench_parse_line(c: &mut Criterion) {
    let parser = IdValueParser::new();
    c.bench_function("parse_line_valid", |b| {
        b.iter(|| black_box(parser.parse_line(black_box(b"1426828011_350"), 1, false)));
    });
    c.bench_function("parse_line_malformed", |b| {
        b.iter(|| black_box(parser.parse_line(black_box(b"not a record"), 1, false)));
    });
}

fn bench_selector_offer(c: &mut Criterion) {
    let values: Vec<i64> = (0..10_000).map(|i| (i * 7919) % 10_007).collect();
    let mut group = c.benchmark_group("selector_offer");
    group.throughput(Throughput::Elements(values.len() as u64));

    for k in [1usize, 10, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(k), &k, |b, &k| {
            b.iter(|| {
                let mut selector = TopKSelector::new(std::num::NonZeroUsize::new(k).unwrap());
                for (i, value) in values.iter().enumerate() {
                    selector.offer(Record::new(i.to_string(), *value));
                }
                black_box(selector.into_records())
            });
        });
    }
    group.finish();
}

fn bench_compute_top_k(c: &mut Criterion) {
    let input = synthetic_input(100_000);
    let mut group = c.benchmark_group("compute_top_k");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("k3_default_chunks", |b| {
        b.iter(|| black_box(compute_top_k(black_box(&input[..]), 3).unwrap()));
    });

    for chunk_size in [64usize, 4096, 65536] {
        group.bench_with_input(
            BenchmarkId::new("k100_chunk", chunk_size),
            &chunk_size,
            |b, &chunk_size| {
                let request = TopKRequest::new(100).chunk_size(chunk_size);
                b.iter(|| {
                    black_box(
                        request
                            .run_reader(black_box(&input[..]), &mut IgnoreDiscards)
                            .unwrap(),
                    )
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_line,
    bench_selector_offer,
    bench_compute_top_k
);
criterion_main!(benches);
