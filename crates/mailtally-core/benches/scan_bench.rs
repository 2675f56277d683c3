//! Extraction performance benchmarks.
//!
//! Run with: cargo bench -p mailtally-core

#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use mailtally_core::{extract, find_all_money_values, Currency};
use std::hint::black_box;

/// Generate a synthetic receipt body with N line items.
fn generate_receipt(num_items: usize) -> String {
    let items = ["Coffee", "Bagel", "Shipping", "Gift wrap", "Warranty"];
    let mut body = String::from("Thank you for shopping with us!\n\n");
    let mut total_cents = 0u64;

    for i in 0..num_items {
        let cents = 199 + (i as u64 * 37) % 10_000;
        total_cents += cents;
        body.push_str(&format!(
            "{:<20} ${}.{:02}\n",
            items[i % items.len()],
            cents / 100,
            cents % 100
        ));
    }

    let total = format!("${}.{:02}", total_cents / 100, total_cents % 100);
    body.push_str(&format!("\nSubtotal {total}\nTotal {total}\n"));
    body
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");

    for size in [10, 100, 1000] {
        let body = generate_receipt(size);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| find_all_money_values(black_box(body), "$"));
        });
    }

    group.finish();
}

fn bench_extract(c: &mut Criterion) {
    let usd = Currency::new("USD", "$", 2);
    let mut group = c.benchmark_group("extract");

    for size in [10, 100, 1000] {
        let body = generate_receipt(size);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| extract(black_box(body), &usd));
        });
    }

    group.finish();
}

fn bench_no_marker(c: &mut Criterion) {
    // Long text without a single marker: the scanner's worst case is linear.
    let body = "lorem ipsum dolor sit amet ".repeat(10_000);
    c.bench_function("scan_no_marker", |b| {
        b.iter(|| find_all_money_values(black_box(&body), "USD"));
    });
}

criterion_group!(benches, bench_scan, bench_extract, bench_no_marker);
criterion_main!(benches);
