// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Materialization Order
//!
//! Edges are generated only from later units to earlier ones, so every
//! generated graph is acyclic. The order must contain each unit once and
//! place every prerequisite before its dependents.

use cim_deployment::domain::UnitId;
use cim_deployment::{DependencyError, DependencyGraph};
use proptest::prelude::*;

fn units(count: usize) -> Vec<UnitId> {
    (0..count)
        .map(|i| UnitId::new(format!("Unit{}", i)).unwrap())
        .collect()
}

/// Unit count plus acyclic edges `(dependent, prerequisite)` with dependent > prerequisite
fn acyclic_graph() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..=8).prop_flat_map(|count| {
        let edge = (1..count).prop_flat_map(|dependent| (Just(dependent), 0..dependent));
        (Just(count), prop::collection::vec(edge, 0..=12))
    })
}

fn build(count: usize, edges: &[(usize, usize)]) -> (Vec<UnitId>, DependencyGraph) {
    let ids = units(count);
    let mut graph = DependencyGraph::new();
    for id in &ids {
        graph.add_unit(id.clone());
    }
    for &(dependent, prerequisite) in edges {
        graph
            .add_dependency(&ids[dependent], &ids[prerequisite])
            .unwrap();
    }
    (ids, graph)
}

proptest! {
    /// Property: every edge is respected and every unit appears once
    #[test]
    fn prop_order_respects_edges((count, edges) in acyclic_graph()) {
        let (ids, graph) = build(count, &edges);
        let order = graph.topological_order().unwrap();

        prop_assert_eq!(order.len(), ids.len());
        let position = |id: &UnitId| order.iter().position(|o| o == id).unwrap();
        for &(dependent, prerequisite) in &edges {
            prop_assert!(position(&ids[prerequisite]) < position(&ids[dependent]));
        }
    }

    /// Property: the order is a pure function of the declaration
    #[test]
    fn prop_order_is_deterministic((count, edges) in acyclic_graph()) {
        let (_, first) = build(count, &edges);
        let (_, second) = build(count, &edges);
        prop_assert_eq!(first.topological_order(), second.topological_order());
    }

    /// Property: closing any path back on itself is reported as a cycle
    #[test]
    fn prop_back_edge_is_cycle(count in 2usize..=8) {
        let ids = units(count);
        let mut graph = DependencyGraph::new();
        for id in &ids {
            graph.add_unit(id.clone());
        }
        for pair in ids.windows(2) {
            graph.add_dependency(&pair[1], &pair[0]).unwrap();
        }
        graph.add_dependency(&ids[0], &ids[count - 1]).unwrap();

        prop_assert!(matches!(
            graph.topological_order(),
            Err(DependencyError::Cycle(_))
        ));
    }
}
