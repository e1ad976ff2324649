//! Performance benchmarks for vturls components.
//!
//! These benchmarks measure report decoding and domain normalization, the
//! two CPU-bound steps between network round trips, so large reports and
//! long domain lists stay cheap to process.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use std::io::Cursor;

use vturls::domain_input::{clean_domain, read_domains};
use vturls::report::parse_undetected_urls;

/// Report body with `count` undetected-URL records, every tenth one malformed.
fn generate_report(count: usize) -> String {
    let records: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            if i % 10 == 9 {
                serde_json::json!([i, "not-a-url"])
            } else {
                serde_json::json!([
                    format!("http://sub{}.example.com/path/{}", i % 37, i),
                    format!("{:064x}", i),
                    0,
                    70,
                    "2024-05-01 10:00:00"
                ])
            }
        })
        .collect();

    serde_json::json!({
        "response_code": 1,
        "verbose_msg": "Domain found in dataset",
        "undetected_urls": records,
    })
    .to_string()
}

/// Benchmark report decoding with different report sizes
fn bench_report_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("report_decoding");

    for &size in &[10, 100, 1_000, 10_000] {
        let body = generate_report(size);
        group.throughput(Throughput::Bytes(body.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("parse_undetected_urls", size),
            &body,
            |b, body| b.iter(|| parse_undetected_urls(black_box(body))),
        );
    }

    group.finish();
}

/// Benchmark domain normalization
fn bench_domain_input(c: &mut Criterion) {
    let mut group = c.benchmark_group("domain_input");

    let inputs = [
        "example.com",
        "https://example.com",
        "http://sub.example.org",
        "   spaced.example.net   ",
        "https://a.b.c.d.example.co.uk",
    ];

    group.bench_function("clean_domain", |b| {
        b.iter(|| {
            for input in &inputs {
                black_box(clean_domain(input));
            }
        })
    });

    let list: String = (0..5_000)
        .map(|i| format!("https://host{}.example.com\n\n", i))
        .collect();
    group.throughput(Throughput::Bytes(list.len() as u64));
    group.bench_function("read_domains_5000", |b| {
        b.iter(|| read_domains(Cursor::new(black_box(list.as_bytes()))))
    });

    group.finish();
}

criterion_group!(benches, bench_report_decoding, bench_domain_input);

criterion_main!(benches);
