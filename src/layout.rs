//! # Layering Engine
//!
//! Partitions a [`DependencyGraph`] into build layers. Packages in the same
//! layer do not depend on each other and can be built in parallel; every
//! package may assume all earlier layers are already built.
//!
//! ## Process
//!
//! 1.  **Leaf Collection**: Collect every remaining node with no remaining
//!     dependencies. That set becomes the next layer.
//!
//! 2.  **Peeling**: Remove the layer's nodes from the working copy and drop
//!     them from every remaining node's dependency set.
//!
//! 3.  **Repeat** until no nodes remain. An iteration that finds no leaf while
//!     nodes remain means the graph contains a cycle, which is reported as
//!     [`Error::CycleDetected`] naming one cycle found among the remaining
//!     nodes.
//!
//! Layer `i` therefore holds exactly the nodes whose longest dependency path
//! has length `i`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;

/// Packages that can be built in parallel.
pub type Layer = BTreeSet<String>;

/// Ordered sequence of layers, dependencies first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Layout {
    layers: Vec<Layer>,
}

impl Layout {
    /// Layer `graph`. Fails with [`Error::CycleDetected`] if it is not a DAG.
    pub fn of(graph: &DependencyGraph) -> Result<Self> {
        let mut remaining = graph.adjacency();
        let mut layers: Vec<Layer> = Vec::new();

        while !remaining.is_empty() {
            let layer: Layer = remaining
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(name, _)| name.clone())
                .collect();

            if layer.is_empty() {
                return Err(Error::CycleDetected {
                    cycle: describe_cycle(&remaining),
                });
            }

            for name in &layer {
                remaining.remove(name);
            }
            for deps in remaining.values_mut() {
                deps.retain(|dep| !layer.contains(dep));
            }
            layers.push(layer);
        }

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Layer> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Index of the layer holding `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.contains(name))
    }

    /// Total number of packages across all layers.
    pub fn package_count(&self) -> usize {
        self.layers.iter().map(BTreeSet::len).sum()
    }

    /// Keep only the packages in `keep`, dropping layers left empty.
    pub fn restricted_to(&self, keep: &BTreeSet<String>) -> Self {
        let layers = self
            .layers
            .iter()
            .map(|layer| layer.intersection(keep).cloned().collect::<Layer>())
            .filter(|layer| !layer.is_empty())
            .collect();
        Self { layers }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, layer) in self.layers.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            let names: Vec<&str> = layer.iter().map(String::as_str).collect();
            write!(f, "{}: {}", index, names.join(", "))?;
        }
        Ok(())
    }
}

/// Walk dependencies from the first remaining node until a node repeats.
///
/// Every remaining node still has a remaining dependency, so the walk always
/// closes a cycle.
fn describe_cycle(remaining: &BTreeMap<String, BTreeSet<String>>) -> String {
    let Some(start) = remaining.keys().next() else {
        return String::new();
    };

    let mut path: Vec<&str> = Vec::new();
    let mut current = start.as_str();
    loop {
        if let Some(pos) = path.iter().position(|n| *n == current) {
            let mut cycle = path[pos..].to_vec();
            cycle.push(current);
            return cycle.join(" -> ");
        }
        path.push(current);
        match remaining
            .get(current)
            .and_then(|deps| deps.iter().find(|d| remaining.contains_key(*d)))
        {
            Some(next) => current = next.as_str(),
            None => {
                let names: Vec<&str> = remaining.keys().map(String::as_str).collect();
                return names.join(", ");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)], nodes: &[&str]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for node in nodes {
            graph.add_node(*node);
        }
        for (from, to) in edges {
            graph.add_edge(*from, *to);
        }
        graph
    }

    fn layer(names: &[&str]) -> Layer {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_layout_diamond() {
        // app -> {ssl, zlib}, ssl -> zlib
        let g = graph(&[("app", "ssl"), ("app", "zlib"), ("ssl", "zlib")], &[]);
        let layout = Layout::of(&g).unwrap();
        assert_eq!(
            layout.layers(),
            &[layer(&["zlib"]), layer(&["ssl"]), layer(&["app"])]
        );
    }

    #[test]
    fn test_layout_longest_path_wins() {
        // a -> c directly and a -> b -> c: a lands after b
        let g = graph(&[("a", "c"), ("a", "b"), ("b", "c")], &["d"]);
        let layout = Layout::of(&g).unwrap();
        assert_eq!(layout.index_of("c"), Some(0));
        assert_eq!(layout.index_of("d"), Some(0));
        assert_eq!(layout.index_of("b"), Some(1));
        assert_eq!(layout.index_of("a"), Some(2));
        assert_eq!(layout.package_count(), 4);
    }

    #[test]
    fn test_layout_empty_graph() {
        let layout = Layout::of(&DependencyGraph::new()).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn test_layout_two_package_cycle() {
        let g = graph(&[("alpha", "beta"), ("beta", "alpha")], &[]);
        let err = Layout::of(&g).unwrap_err();
        match err {
            Error::CycleDetected { cycle } => assert_eq!(cycle, "alpha -> beta -> alpha"),
            other => panic!("Expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn test_layout_cycle_above_valid_layers() {
        // base is fine, x <-> y sit on top of it
        let g = graph(&[("x", "y"), ("y", "x"), ("x", "base")], &[]);
        let err = Layout::of(&g).unwrap_err();
        assert!(err.to_string().contains("x -> y -> x"));
    }

    #[test]
    fn test_layout_self_loop() {
        let g = graph(&[("a", "a")], &[]);
        assert!(matches!(Layout::of(&g), Err(Error::CycleDetected { .. })));
    }

    #[test]
    fn test_restricted_to_drops_empty_layers() {
        let g = graph(&[("app", "ssl"), ("ssl", "zlib")], &[]);
        let layout = Layout::of(&g).unwrap();
        let restricted = layout.restricted_to(&layer(&["app", "zlib"]));
        assert_eq!(restricted.layers(), &[layer(&["zlib"]), layer(&["app"])]);
    }

    #[test]
    fn test_display() {
        let g = graph(&[("app", "ssl"), ("app", "zlib")], &["misc"]);
        let layout = Layout::of(&g).unwrap();
        insta::assert_snapshot!(layout.to_string(), @r"
        0: misc, ssl, zlib
        1: app
        ");
    }

    #[test]
    fn test_serialize_as_nested_lists() {
        let g = graph(&[("b", "a")], &[]);
        let layout = Layout::of(&g).unwrap();
        assert_eq!(
            serde_json::to_string(&layout).unwrap(),
            r#"[["a"],["b"]]"#
        );
    }
}
