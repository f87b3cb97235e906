//! Indirect-depth propagation.
//!
//! `idep(v)` measures how deeply `v` is nested inside indirect memory
//! addressing: a vertex with no incoming edges (nothing depends on it — a
//! query or constraint root) has `idep = 0`; every other vertex inherits
//! the maximum `idep` of the vertices that use it as an operand, plus one
//! for each use that crosses an indirect (index) edge. Propagation walks
//! vertices in descending topological order (dependants before their
//! operands) so that every parent's `idep` is already known.

use crate::topo::TopoIndex;
use crate::types::{Edge, VertexId};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct IDepMap {
    idep: BTreeMap<VertexId, u32>,
}

impl IDepMap {
    pub fn compute(topo: &TopoIndex, reverse: &BTreeMap<VertexId, std::collections::BTreeSet<Edge>>) -> Self {
        let mut idep = BTreeMap::new();

        for vertex in topo.order_list().iter().rev() {
            let incoming = reverse.get(vertex);
            let value = match incoming {
                None => 0,
                Some(edges) if edges.is_empty() => 0,
                Some(edges) => edges
                    .iter()
                    .map(|e| {
                        let parent_idep = idep.get(&e.from).copied().unwrap_or(0);
                        parent_idep + e.weight.idep_increment()
                    })
                    .max()
                    .unwrap_or(0),
            };
            idep.insert(vertex.clone(), value);
        }

        Self { idep }
    }

    #[must_use]
    pub fn get(&self, id: &VertexId) -> u32 {
        self.idep.get(id).copied().unwrap_or(0)
    }

    /// Maximum `idep` across the whole graph, or 0 if the graph is empty.
    #[must_use]
    pub fn max_idep(&self) -> u32 {
        self.idep.values().copied().max().unwrap_or(0)
    }
}
