//! Property-based tests for layering, matrix grouping and profile expansion.
//!
//! Random DAGs are generated by only allowing edges from a higher-numbered
//! node to a lower-numbered one.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;

    use crate::error::Error;
    use crate::graph::DependencyGraph;
    use crate::layout::Layout;
    use crate::matrix::{self, Cell};
    use crate::profile::expand_expression;
    use proptest::prelude::*;

    fn node(i: usize) -> String {
        format!("pkg{:02}", i)
    }

    /// Node count plus edges `(from, to)` with `from > to`.
    fn dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
        (1usize..16).prop_flat_map(|n| {
            let edges = prop::collection::vec((0..n, 0..n), 0..40).prop_map(|pairs| {
                pairs
                    .into_iter()
                    .filter(|(a, b)| a != b)
                    .map(|(a, b)| (a.max(b), a.min(b)))
                    .collect::<Vec<_>>()
            });
            (Just(n), edges)
        })
    }

    fn build(n: usize, edges: &[(usize, usize)]) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for i in 0..n {
            graph.add_node(node(i));
        }
        for (from, to) in edges {
            graph.add_edge(node(*from), node(*to));
        }
        graph
    }

    // ============================================================================
    // Layout::of property tests
    // ============================================================================

    proptest! {
        /// Property: every node lands in exactly one layer
        #[test]
        fn layout_partitions_all_nodes((n, edges) in dag()) {
            let graph = build(n, &edges);
            let layout = Layout::of(&graph).unwrap();

            prop_assert_eq!(layout.package_count(), n);
            let union: BTreeSet<&str> = layout
                .iter()
                .flat_map(|layer| layer.iter().map(String::as_str))
                .collect();
            let nodes: BTreeSet<&str> = graph.nodes().collect();
            prop_assert_eq!(union, nodes);
            prop_assert!(layout.iter().all(|layer| !layer.is_empty()));
        }

        /// Property: dependencies always sit in an earlier layer
        #[test]
        fn layout_orders_edges((n, edges) in dag()) {
            let graph = build(n, &edges);
            let layout = Layout::of(&graph).unwrap();

            for (from, to) in graph.edges() {
                let from_index = layout.index_of(from).unwrap();
                let to_index = layout.index_of(to).unwrap();
                prop_assert!(
                    to_index < from_index,
                    "{} (layer {}) depends on {} (layer {})",
                    from, from_index, to, to_index
                );
            }
        }

        /// Property: a layer index is the longest dependency path length
        #[test]
        fn layout_index_is_longest_path((n, edges) in dag()) {
            let graph = build(n, &edges);
            let layout = Layout::of(&graph).unwrap();

            // nodes only depend on lower indices, so one ascending pass suffices
            let mut depth = vec![0usize; n];
            for i in 0..n {
                let longest = graph
                    .neighbors(&node(i))
                    .filter_map(|dep| dep.strip_prefix("pkg"))
                    .filter_map(|idx| idx.parse::<usize>().ok())
                    .map(|j| depth[j] + 1)
                    .max()
                    .unwrap_or(0);
                depth[i] = longest;
                prop_assert_eq!(layout.index_of(&node(i)), Some(longest));
            }
        }

        /// Property: closing any path into a loop is reported, never looped on
        #[test]
        fn layout_detects_back_edge((n, edges) in dag()) {
            let mut graph = build(n, &edges);
            let Some((from, to)) = edges.first().copied() else {
                return Ok(());
            };
            graph.add_edge(node(to), node(from));
            let is_cycle = matches!(Layout::of(&graph), Err(Error::CycleDetected { .. }));
            prop_assert!(is_cycle);
        }
    }

    // ============================================================================
    // matrix::build property tests
    // ============================================================================

    fn cell_lists() -> impl Strategy<Value = Vec<Cell>> {
        prop::collection::vec(("p[0-5]", "(static|shared|none)"), 0..30)
    }

    proptest! {
        /// Property: entries cover exactly the input cells with disjoint profiles
        #[test]
        fn matrix_entries_cover_cells(cells in cell_lists()) {
            let entries = matrix::build(&cells);

            let mut seen = BTreeSet::new();
            for entry in &entries {
                for profile in &entry.profiles {
                    prop_assert!(seen.insert(profile.clone()), "profile {} repeated", profile);
                }
            }

            let covered: BTreeSet<Cell> = entries
                .iter()
                .flat_map(|e| {
                    e.profiles
                        .iter()
                        .flat_map(move |p| e.schemes.iter().map(move |s| (p.clone(), s.clone())))
                })
                .collect();
            let expected: BTreeSet<Cell> = cells.into_iter().collect();
            prop_assert_eq!(covered, expected);
        }

        /// Property: no two entries share a scheme set
        #[test]
        fn matrix_scheme_sets_distinct(cells in cell_lists()) {
            let entries = matrix::build(&cells);
            let distinct: BTreeSet<_> = entries.iter().map(|e| e.schemes.clone()).collect();
            prop_assert_eq!(distinct.len(), entries.len());
        }
    }

    // ============================================================================
    // expand_expression property tests
    // ============================================================================

    proptest! {
        /// Property: one output per distinct alternative
        #[test]
        fn expansion_yields_each_alternative(
            name in "[a-z][a-z0-9]{0,6}",
            alts in prop::collection::btree_set("[a-z0-9]{1,3}", 1..5),
            suffix in "(-[a-z0-9]{1,4})?",
        ) {
            let alts: Vec<String> = alts.into_iter().collect();
            let expr = format!("{}{{{}}}{}", name, alts.join("|"), suffix);
            let expanded = expand_expression(&expr).unwrap();

            let expected: BTreeSet<String> = alts
                .iter()
                .map(|alt| format!("{}{}{}", name, alt, suffix))
                .collect();
            prop_assert_eq!(expanded, expected);
        }

        /// Property: an unmatched brace is always rejected
        #[test]
        fn expansion_rejects_unclosed_brace(name in "[a-z]{1,6}", alt in "[a-z0-9|]{0,6}") {
            let expr = format!("{}{{{}", name, alt);
            prop_assert!(expand_expression(&expr).is_err());
        }
    }
}
