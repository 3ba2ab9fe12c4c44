//! # Dependency Graph
//!
//! A minimal directed graph over package names, stored as an adjacency set
//! per node. Edges point from a dependent to its dependency. Only the
//! operations the resolver needs are provided: adding nodes and edges,
//! neighbour lookup, node iteration and path existence.
//!
//! Nodes and neighbours are kept in `BTreeMap`/`BTreeSet` so every iteration
//! is sorted and results are reproducible across runs.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Directed graph keyed by package name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    adjacency: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` as a node. Adding an existing node is a no-op.
    pub fn add_node(&mut self, name: impl Into<String>) {
        self.adjacency.entry(name.into()).or_default();
    }

    /// Add the edge `from -> to`, creating either node if missing.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let to = to.into();
        self.add_node(to.clone());
        self.adjacency.entry(from.into()).or_default().insert(to);
    }

    /// Remove the edge `from -> to`. Returns whether it was present.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        self.adjacency
            .get_mut(from)
            .is_some_and(|targets| targets.remove(to))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.adjacency.contains_key(name)
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.adjacency
            .get(from)
            .is_some_and(|targets| targets.contains(to))
    }

    /// Direct dependencies of `name` (empty for unknown nodes).
    pub fn neighbors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.adjacency
            .get(name)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// All nodes, sorted.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    /// All edges as `(from, to)` pairs, sorted.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.adjacency.iter().flat_map(|(from, targets)| {
            targets.iter().map(move |to| (from.as_str(), to.as_str()))
        })
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Whether a directed path leads from `from` to `to`.
    ///
    /// A node reaches itself only through a cycle; the trivial empty path
    /// does not count.
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        let mut visited = BTreeSet::new();
        let mut queue: VecDeque<&str> = self.neighbors(from).collect();
        while let Some(node) = queue.pop_front() {
            if node == to {
                return true;
            }
            if visited.insert(node) {
                queue.extend(self.neighbors(node));
            }
        }
        false
    }

    /// Owned copy of the adjacency sets, used by the layering engine.
    pub(crate) fn adjacency(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.adjacency.clone()
    }
}
