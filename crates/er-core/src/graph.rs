//! `GraphStore`: the immutable constraint graph and its derived indices.
//!
//! A `GraphStore` is built once from a flat vertex/edge description and
//! never mutates afterward; every transformation (e.g. deleting a vertex
//! set) produces a new `GraphStore` with its topological order, indirect
//! depth, post-dominator sets, and kinst index recomputed.

use crate::error::EngineError;
use crate::idep::IDepMap;
use crate::kinst::KInstIndex;
use crate::postdom::PostDomMap;
use crate::topo::TopoIndex;
use crate::types::{Edge, EdgeWeight, Vertex, VertexId, VertexKind};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
pub struct GraphStore {
    vertices: BTreeMap<VertexId, Vertex>,
    forward: BTreeMap<VertexId, BTreeSet<Edge>>,
    reverse: BTreeMap<VertexId, BTreeSet<Edge>>,
    topo: TopoIndex,
    idep: IDepMap,
    post_dom: PostDomMap,
    kinst_index: KInstIndex,
}

impl GraphStore {
    /// Build a `GraphStore` from a flat vertex list and edge list.
    ///
    /// Vertices whose `kind` is [`VertexKind::Dummy`] (no `Kind` attribute
    /// in the source wire format) are dropped, along with any edge that
    /// touches a dropped vertex. Any edge weight other than `1.0`/`1.5` is
    /// a fatal [`EngineError::InvalidEdgeWeight`].
    pub fn from_description(
        vertices: impl IntoIterator<Item = Vertex>,
        edges: impl IntoIterator<Item = (VertexId, VertexId, f64)>,
    ) -> Result<Self, EngineError> {
        let vertices: BTreeMap<VertexId, Vertex> = vertices
            .into_iter()
            .filter(|v| !matches!(v.kind, VertexKind::Dummy))
            .map(|v| (v.id.clone(), v))
            .collect();

        let mut forward: BTreeMap<VertexId, BTreeSet<Edge>> = BTreeMap::new();
        let mut reverse: BTreeMap<VertexId, BTreeSet<Edge>> = BTreeMap::new();

        for (from, to, raw_weight) in edges {
            if !vertices.contains_key(&from) || !vertices.contains_key(&to) {
                continue;
            }
            let weight = EdgeWeight::from_f64(raw_weight).ok_or(EngineError::InvalidEdgeWeight {
                from: from.clone(),
                to: to.clone(),
                weight: raw_weight,
            })?;
            let edge = Edge {
                from: from.clone(),
                to: to.clone(),
                weight,
            };
            forward.entry(from).or_default().insert(edge.clone());
            reverse.entry(to).or_default().insert(edge);
        }

        Ok(Self::assemble(vertices, forward, reverse))
    }

    fn assemble(
        vertices: BTreeMap<VertexId, Vertex>,
        forward: BTreeMap<VertexId, BTreeSet<Edge>>,
        reverse: BTreeMap<VertexId, BTreeSet<Edge>>,
    ) -> Self {
        let ids: BTreeSet<VertexId> = vertices.keys().cloned().collect();
        let post_dom = PostDomMap::compute(&ids, &forward, &reverse);
        Self::assemble_with_post_dom(vertices, forward, reverse, post_dom)
    }

    fn assemble_with_post_dom(
        vertices: BTreeMap<VertexId, Vertex>,
        forward: BTreeMap<VertexId, BTreeSet<Edge>>,
        reverse: BTreeMap<VertexId, BTreeSet<Edge>>,
        post_dom: PostDomMap,
    ) -> Self {
        let ids: BTreeSet<VertexId> = vertices.keys().cloned().collect();
        let topo = TopoIndex::compute(&ids, &forward);
        let idep = IDepMap::compute(&topo, &reverse);
        let kinst_index = KInstIndex::build(&vertices);

        Self {
            vertices,
            forward,
            reverse,
            topo,
            idep,
            post_dom,
            kinst_index,
        }
    }

    /// Build a new `GraphStore` with every vertex in `deleted` (and every
    /// edge touching one) removed. Topological order, indirect depth, and
    /// the kinst index are recomputed from scratch; the post-dominator
    /// relation is carried through from the parent instead of
    /// recomputed, per [`PostDomMap::carry_through`] — a sound
    /// over-approximation, since deleting vertices can only shrink the
    /// true relation further, and cheap enough to make repeated
    /// `subgraph` calls during recursive optimization affordable.
    #[must_use]
    pub fn subgraph(&self, deleted: &BTreeSet<VertexId>) -> Self {
        let vertices: BTreeMap<VertexId, Vertex> = self
            .vertices
            .iter()
            .filter(|(id, _)| !deleted.contains(*id))
            .map(|(id, v)| (id.clone(), v.clone()))
            .collect();

        let forward = Self::filter_adjacency(&self.forward, &vertices);
        let reverse = Self::filter_adjacency(&self.reverse, &vertices);
        let surviving: BTreeSet<VertexId> = vertices.keys().cloned().collect();
        let post_dom = self.post_dom.carry_through(&surviving);

        Self::assemble_with_post_dom(vertices, forward, reverse, post_dom)
    }

    fn filter_adjacency(
        adjacency: &BTreeMap<VertexId, BTreeSet<Edge>>,
        surviving: &BTreeMap<VertexId, Vertex>,
    ) -> BTreeMap<VertexId, BTreeSet<Edge>> {
        adjacency
            .iter()
            .filter(|(id, _)| surviving.contains_key(*id))
            .map(|(id, edges)| {
                let filtered: BTreeSet<Edge> = edges
                    .iter()
                    .filter(|e| surviving.contains_key(&e.from) && surviving.contains_key(&e.to))
                    .cloned()
                    .collect();
                (id.clone(), filtered)
            })
            .collect()
    }

    #[must_use]
    pub fn vertex(&self, id: &VertexId) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    #[must_use]
    pub fn vertices(&self) -> &BTreeMap<VertexId, Vertex> {
        &self.vertices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Outgoing edges (this vertex's own operands).
    #[must_use]
    pub fn outgoing(&self, id: &VertexId) -> &BTreeSet<Edge> {
        static EMPTY: BTreeSet<Edge> = BTreeSet::new();
        self.forward.get(id).unwrap_or(&EMPTY)
    }

    /// Incoming edges (vertices that use this one as an operand).
    #[must_use]
    pub fn incoming(&self, id: &VertexId) -> &BTreeSet<Edge> {
        static EMPTY: BTreeSet<Edge> = BTreeSet::new();
        self.reverse.get(id).unwrap_or(&EMPTY)
    }

    #[must_use]
    pub fn topo(&self) -> &TopoIndex {
        &self.topo
    }

    #[must_use]
    pub fn idep_of(&self, id: &VertexId) -> u32 {
        self.idep.get(id)
    }

    #[must_use]
    pub fn max_idep(&self) -> u32 {
        self.idep.max_idep()
    }

    #[must_use]
    pub fn post_dom_of(&self, id: &VertexId) -> BTreeSet<VertexId> {
        self.post_dom.get(id)
    }

    #[must_use]
    pub fn kinst_index(&self) -> &KInstIndex {
        &self.kinst_index
    }
}
