//! Performance benchmarks for replay, diffing and merging.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use edit_replay::{
    compute_chunked_diffs, diff_lines, merge_chunks, replay_documents, DocumentId, Operation,
    ReplayConfig,
};

/// Line-by-line typing with a long pause every `burst` lines.
fn typing_log(lines: usize, burst: usize) -> Vec<Operation> {
    let mut len = 0;
    let mut ts = 0;
    (0..lines)
        .map(|i| {
            ts += if i % burst == 0 { 300_000 } else { 250 };
            let line = format!("let value_{} = compute({});\n", i, i);
            let op = Operation::insert(ts, len, &line).with_version(i as u64);
            len += line.chars().count();
            op
        })
        .collect()
}

/// Benchmark replay with varying log lengths
fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay");

    for ops in [100, 1_000, 10_000] {
        let log = typing_log(ops, 50);
        group.bench_with_input(BenchmarkId::new("operations", ops), &log, |b, log| {
            b.iter(|| black_box(compute_chunked_diffs(log, 100_000).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark line diffs of growing documents with a change in the middle
fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff_lines");

    for lines in [100, 1_000, 5_000] {
        let old: String = (0..lines).map(|i| format!("line {}\n", i)).collect();
        let new = old.replacen(&format!("line {}\n", lines / 2), "changed\nlines\n", 1);
        group.bench_with_input(BenchmarkId::new("lines", lines), &(old, new), |b, (old, new)| {
            b.iter(|| black_box(diff_lines(old, new)));
        });
    }

    group.finish();
}

/// Benchmark merging chunk diffs
fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for chunks in [10, 100, 500] {
        let log = typing_log(chunks * 10, 10);
        let chunks_out = compute_chunked_diffs(&log, 100_000).unwrap();
        group.bench_with_input(BenchmarkId::new("chunks", chunks), &chunks_out, |b, chunks| {
            b.iter(|| black_box(merge_chunks(chunks).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark parallel replay of many documents
fn bench_parallel(c: &mut Criterion) {
    let jobs: Vec<(DocumentId, Vec<Operation>)> = (0..64)
        .map(|i| (DocumentId::new(format!("doc-{}", i)), typing_log(500, 25)))
        .collect();
    let config = ReplayConfig::default();

    c.bench_function("replay_documents_64", |b| {
        b.iter(|| black_box(replay_documents(jobs.clone(), &config)));
    });
}

criterion_group!(benches, bench_replay, bench_diff, bench_merge, bench_parallel);
criterion_main!(benches);
