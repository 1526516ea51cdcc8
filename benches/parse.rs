//! Parsing benchmarks for flashcsv
//!
//! Measures the scanner primitives, field extraction, and full-file
//! iteration (single-threaded and parallel) over a generated table.

use std::io::Write;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flashcsv::{scan, CheckedReader, FieldRef, ParallelReader, TurboReader};
use tempfile::TempDir;

fn generate_csv(dir: &TempDir, rows: usize) -> PathBuf {
    let path = dir.path().join("bench.csv");
    let mut file = std::io::BufWriter::new(std::fs::File::create(&path).unwrap());
    file.write_all(b"id,price,qty,symbol\n").unwrap();
    for i in 0..rows {
        writeln!(file, "{},{}.{:02},{},SYM{}", i, i % 1000, i % 100, i % 50, i % 16).unwrap();
    }
    path
}

fn bench_scanners(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    let mut line = vec![b'x'; 4096];
    line[4000] = b',';
    group.throughput(Throughput::Bytes(line.len() as u64));

    group.bench_function("find_field_end_4k", |b| {
        b.iter(|| scan::find_field_end(black_box(&line), b','));
    });

    let mut no_match = vec![b'x'; 4096];
    no_match[4090] = b'\n';
    group.bench_function("find_newline_4k", |b| {
        b.iter(|| scan::find_newline(black_box(&no_match)));
    });

    let short = b"ab,cd";
    group.bench_function("find_field_end_short", |b| {
        b.iter(|| scan::find_field_end(black_box(short), b','));
    });

    group.finish();
}

fn bench_field_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("field");

    group.bench_function("parse_i64", |b| {
        let field = FieldRef::new(b"123456789");
        b.iter(|| black_box(field).parse::<i64>());
    });

    group.bench_function("parse_f64_fast_path", |b| {
        let field = FieldRef::new(b"1234.5678");
        b.iter(|| black_box(field).parse::<f64>());
    });

    group.bench_function("parse_f64_exponent", |b| {
        let field = FieldRef::new(b"1.23e4");
        b.iter(|| black_box(field).parse::<f64>());
    });

    group.bench_function("parse_bool", |b| {
        let field = FieldRef::new(b"true");
        b.iter(|| black_box(field).parse::<bool>());
    });

    group.bench_function("parse_date", |b| {
        let field = FieldRef::new(b"2024-06-01");
        b.iter(|| black_box(field).parse_date());
    });

    group.finish();
}

fn bench_iteration(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let path = generate_csv(&dir, 100_000);
    let bytes = std::fs::metadata(&path).unwrap().len();

    let mut group = c.benchmark_group("iterate");
    group.throughput(Throughput::Bytes(bytes));
    group.sample_size(20);

    group.bench_function("turbo_100k_rows", |b| {
        b.iter(|| {
            let mut reader = TurboReader::<4, b','>::open(&path);
            let mut rows = 0usize;
            reader.for_each_raw(|_| rows += 1);
            black_box(rows)
        });
    });

    group.bench_function("checked_100k_rows", |b| {
        b.iter(|| {
            let mut reader = CheckedReader::<4, b','>::open(&path);
            let mut rows = 0usize;
            reader.for_each(|_| rows += 1);
            black_box(rows)
        });
    });

    group.bench_function("turbo_100k_rows_sum_column", |b| {
        b.iter(|| {
            let mut reader = TurboReader::<4, b','>::open(&path);
            let mut total = 0i64;
            reader.for_each(|fields| total += fields[0].value_or(0i64));
            black_box(total)
        });
    });

    for workers in [2usize, 4] {
        group.bench_function(format!("parallel_100k_rows_{}_workers", workers), |b| {
            b.iter(|| {
                let reader = ParallelReader::<4, b','>::open(&path, workers);
                black_box(reader.for_each_parallel(|_: &[FieldRef<'_>; 4]| {}))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scanners, bench_field_extraction, bench_iteration);
criterion_main!(benches);
