//! Topological ordering of the constraint graph.
//!
//! Vertices are numbered so that every dependency (operand) receives a
//! strictly smaller number than its dependants (the operators that use
//! it), i.e. operands first, results last. Computed with an explicit-stack
//! iterative DFS (push on first visit, finalize and assign a number on
//! second visit) so that deep expression chains never blow the call stack.

use crate::types::{Edge, VertexId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct TopoIndex {
    /// Vertex id -> position in `order_list`.
    order: BTreeMap<VertexId, u32>,
    /// Ascending topological order: operands before the operators that use them.
    order_list: Vec<VertexId>,
}

impl TopoIndex {
    pub fn compute(
        vertex_ids: &BTreeSet<VertexId>,
        forward: &BTreeMap<VertexId, BTreeSet<Edge>>,
    ) -> Self {
        let mut order = BTreeMap::new();
        let mut visited: BTreeSet<VertexId> = BTreeSet::new();
        let mut order_list = Vec::with_capacity(vertex_ids.len());
        let mut counter: u32 = 0;

        for start in vertex_ids {
            if visited.contains(start) {
                continue;
            }
            let mut stack = vec![start.clone()];
            while let Some(top) = stack.last().cloned() {
                if !visited.contains(&top) {
                    visited.insert(top.clone());
                    if let Some(edges) = forward.get(&top) {
                        for edge in edges {
                            if !visited.contains(&edge.to) {
                                stack.push(edge.to.clone());
                            }
                        }
                    }
                } else {
                    if !order.contains_key(&top) {
                        order.insert(top.clone(), counter);
                        order_list.push(top.clone());
                        counter += 1;
                    }
                    stack.pop();
                }
            }
        }

        Self { order, order_list }
    }

    #[must_use]
    pub fn position(&self, id: &VertexId) -> Option<u32> {
        self.order.get(id).copied()
    }

    /// Ascending order: operands before dependants.
    #[must_use]
    pub fn order_list(&self) -> &[VertexId] {
        &self.order_list
    }

    /// Vertices strictly after the given position in ascending order.
    #[must_use]
    pub fn after(&self, position: u32) -> &[VertexId] {
        let start = position as usize + 1;
        if start >= self.order_list.len() {
            &[]
        } else {
            &self.order_list[start..]
        }
    }
}
