//! Benchmarks for profile expansion and CI matrix grouping.

use bundle_synthesis::matrix::{self, Cell};
use bundle_synthesis::profile::ProfileSpec;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn cells(profiles: usize) -> Vec<Cell> {
    let schemes = ["static", "shared", "none"];
    (0..profiles)
        .flat_map(|p| {
            // every third profile misses one scheme, so groups differ
            let take = if p % 3 == 0 { 2 } else { 3 };
            schemes[..take]
                .iter()
                .map(move |s| (format!("profile{}", p), s.to_string()))
        })
        .collect()
}

fn bench_group(c: &mut Criterion) {
    let mut group = c.benchmark_group("matrix_build");
    for profiles in [8, 64, 256] {
        let cells = cells(profiles);
        group.bench_with_input(BenchmarkId::from_parameter(profiles), &cells, |b, cells| {
            b.iter(|| matrix::build(black_box(cells)))
        });
    }
    group.finish();
}

fn bench_expand(c: &mut Criterion) {
    let spec = ProfileSpec::from(vec![
        "vs2019",
        "vs2017{|d}",
        "vs2019{|-x86}",
        "gcc{5|6|7|8}",
        "gcc{5|6|7|8}-x86",
        "gcc{5|6|7|8}-armv7",
    ]);
    c.bench_function("profile_expand", |b| b.iter(|| black_box(&spec).expand()));
}

criterion_group!(benches, bench_group, bench_expand);
criterion_main!(benches);
