//! Benchmarks for layering and reachability.
//!
//! Graphs are layered chains of `width` packages per layer, each package
//! depending on every package of the previous layer.

use bundle_synthesis::graph::DependencyGraph;
use bundle_synthesis::layout::Layout;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn layered_graph(depth: usize, width: usize) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for layer in 0..depth {
        for i in 0..width {
            let name = format!("l{}p{}", layer, i);
            graph.add_node(name.clone());
            if layer > 0 {
                for j in 0..width {
                    graph.add_edge(name.clone(), format!("l{}p{}", layer - 1, j));
                }
            }
        }
    }
    graph
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_of");
    for (depth, width) in [(5, 4), (10, 10), (20, 10)] {
        let graph = layered_graph(depth, width);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", depth, width)),
            &graph,
            |b, graph| b.iter(|| Layout::of(black_box(graph))),
        );
    }
    group.finish();
}

fn bench_has_path(c: &mut Criterion) {
    let graph = layered_graph(20, 10);
    c.bench_function("has_path_top_to_bottom", |b| {
        b.iter(|| black_box(&graph).has_path("l19p0", "l0p9"))
    });
}

criterion_group!(benches, bench_layout, bench_has_path);
criterion_main!(benches);
