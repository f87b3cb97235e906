//! Index from instruction identifier to the vertices it produces.

use crate::types::{KInst, Vertex, VertexId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct KInstIndex {
    nodes: BTreeMap<KInst, BTreeSet<VertexId>>,
}

impl KInstIndex {
    pub fn build(vertices: &BTreeMap<VertexId, Vertex>) -> Self {
        let mut nodes: BTreeMap<KInst, BTreeSet<VertexId>> = BTreeMap::new();
        for vertex in vertices.values() {
            if let Some(kinst) = &vertex.kinst {
                nodes.entry(kinst.clone()).or_default().insert(vertex.id.clone());
            }
        }
        Self { nodes }
    }

    #[must_use]
    pub fn nodes_of(&self, kinst: &KInst) -> Option<&BTreeSet<VertexId>> {
        self.nodes.get(kinst)
    }

    #[must_use]
    pub fn contains(&self, kinst: &KInst) -> bool {
        self.nodes.contains_key(kinst)
    }

    pub fn kinsts(&self) -> impl Iterator<Item = &KInst> {
        self.nodes.keys()
    }

    /// Total bytes required to record every kinst in `kinsts`, using each
    /// kinst's representative vertex (the lowest-ordered vertex id it
    /// produces) for `freq`/`width`. A kinst absent from the index (e.g. a
    /// target vertex whose own kinst was deleted from a residual subgraph)
    /// contributes nothing — its cost is accounted for by the caller using
    /// the original, unfiltered graph's index instead.
    pub fn recording_size(
        &self,
        vertices: &BTreeMap<VertexId, Vertex>,
        kinsts: &BTreeSet<KInst>,
        ptwrite: bool,
    ) -> u64 {
        kinsts
            .iter()
            .filter_map(|k| self.representative(vertices, k))
            .map(|v| if ptwrite { v.freq * 8 } else { v.freq * u64::from(v.width) / 8 })
            .sum()
    }

    fn representative<'v>(&self, vertices: &'v BTreeMap<VertexId, Vertex>, kinst: &KInst) -> Option<&'v Vertex> {
        let id = self.nodes.get(kinst)?.iter().next()?;
        vertices.get(id)
    }
}
