// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Grouping of curve edges into intersection curves

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One connected component of curve edges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntersectionCurve {
    /// Arena vertex ids in walk order; a closed curve does not repeat its start
    pub vertices: Vec<usize>,
    /// Undirected edges of the component, sorted
    pub edges: Vec<(usize, usize)>,
    /// Every vertex of the component has even degree
    pub closed: bool,
}

impl IntersectionCurve {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

/// Split `edges` into connected components and order each one.
///
/// A walk starts at the lowest vertex of odd degree when there is one,
/// otherwise at the lowest vertex, and always takes the lowest unused edge.
/// Branching components (coplanar contact regions) are walked greedily and
/// keep every edge in `edges` even when the walk cannot cover them.
pub fn group_curves(edges: &[(usize, usize)]) -> Vec<IntersectionCurve> {
    let mut adjacency: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &(a, b) in edges {
        if a == b {
            continue;
        }
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }
    for neighbors in adjacency.values_mut() {
        neighbors.sort_unstable();
        neighbors.dedup();
    }

    let mut assigned: AHashSet<usize> = AHashSet::new();
    let mut curves = Vec::new();

    for &root in adjacency.keys() {
        if assigned.contains(&root) {
            continue;
        }

        let mut component = vec![root];
        assigned.insert(root);
        let mut cursor = 0;
        while cursor < component.len() {
            let vertex = component[cursor];
            cursor += 1;
            for &next in &adjacency[&vertex] {
                if assigned.insert(next) {
                    component.push(next);
                }
            }
        }
        component.sort_unstable();

        let mut component_edges: Vec<(usize, usize)> = component
            .iter()
            .flat_map(|&a| adjacency[&a].iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
            .collect();
        component_edges.sort_unstable();

        let degree = |v: &usize| adjacency[v].len();
        let closed = component.iter().all(|v| degree(v) % 2 == 0);
        let start = component
            .iter()
            .copied()
            .find(|v| degree(v) % 2 == 1)
            .unwrap_or(component[0]);

        curves.push(IntersectionCurve {
            vertices: walk(&adjacency, start, closed),
            edges: component_edges,
            closed,
        });
    }

    curves
}

fn walk(adjacency: &BTreeMap<usize, Vec<usize>>, start: usize, closed: bool) -> Vec<usize> {
    let mut used: AHashSet<(usize, usize)> = AHashSet::new();
    let mut path = vec![start];
    let mut current = start;

    loop {
        let next = adjacency[&current]
            .iter()
            .copied()
            .find(|&n| !used.contains(&(current.min(n), current.max(n))));
        let Some(next) = next else {
            break;
        };
        used.insert((current.min(next), current.max(next)));
        if closed && next == start {
            break;
        }
        path.push(next);
        current = next;
    }

    path
}
