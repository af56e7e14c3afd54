//! Symbol lookup benchmarks.
//!
//! Fixture groups run over in-memory libraries; the `native` group goes
//! through the real process-wide lookup and is skipped when it degraded.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use syslookup_bench::{PRIMARY_EXPORTS, fixture_lookup};
use syslookup_core::FallbackTable;
use system_lookup::SystemLookup;

fn bench_fixture_find(c: &mut Criterion) {
    let lookup = fixture_lookup();
    let mut group = c.benchmark_group("fixture_find");

    let cases = [
        ("primary_hit", PRIMARY_EXPORTS[0]),
        ("fallback_hit", "printf"),
        ("fallback_last", "gmtime"),
        ("miss", "no_such_symbol_xyz"),
    ];
    for (label, name) in cases {
        group.bench_with_input(BenchmarkId::new(label, name), name, |b, name| {
            b.iter(|| black_box(lookup.find(black_box(name))));
        });
    }
    group.finish();
}

fn bench_fallback_table(c: &mut Criterion) {
    let table = FallbackTable::windows_ucrt();
    let mut group = c.benchmark_group("fallback_table");

    group.bench_function("ordinal_of_all", |b| {
        b.iter(|| {
            for name in table.names() {
                black_box(table.ordinal_of(black_box(name)));
            }
        });
    });
    group.finish();
}

fn bench_native_find(c: &mut Criterion) {
    let lookup = SystemLookup::global();
    if lookup.is_degraded() {
        eprintln!("native lookup degraded: {:?}", lookup.status().degraded_cause);
        return;
    }
    let mut group = c.benchmark_group("native_find");

    for name in ["strlen", "printf", "no_such_symbol_xyz"] {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| black_box(lookup.find(black_box(name))));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_fixture_find,
    bench_fallback_table,
    bench_native_find
);
criterion_main!(benches);
