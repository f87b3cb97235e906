//! Cheapest-set-to-concretize search, memoized per `(vertex, allow_pointer)`.
//!
//! For a target vertex, walks its operand subtree bottom-up (an iterative
//! DFS to avoid recursion depth limits on deep expressions) and at each
//! vertex chooses the cheaper of "record my own kinst" versus "record
//! whatever my children need", deduplicating children whose concretization
//! is already implied by a sibling's post-dominator set.

use crate::graph::GraphStore;
use crate::types::{KInst, VertexId};
use std::collections::BTreeMap;
use std::collections::BTreeSet;

pub struct MustConcretize<'g> {
    graph: &'g GraphStore,
    ptwrite: bool,
    memo: BTreeMap<(VertexId, bool), BTreeSet<VertexId>>,
}

impl<'g> MustConcretize<'g> {
    /// `ptwrite` selects the cost model used to compare "record self"
    /// against "record my children": `true` charges the flat 8-byte
    /// minimum per kinst, `false` charges `freq * width / 8`, matching
    /// [`crate::config::Config::ptwrite`].
    #[must_use]
    pub fn new(graph: &'g GraphStore, ptwrite: bool) -> Self {
        Self {
            graph,
            ptwrite,
            memo: BTreeMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.memo.clear();
    }

    /// The set of vertex ids that must be concretized to make `target`
    /// concrete, as vertex ids (not yet mapped to kinsts — a vertex with
    /// no valid `kinst` may still appear here, marking a dead end with no
    /// instruction that could ever concretize it).
    pub fn compute_ids(&mut self, target: &VertexId, allow_pointer: bool) -> BTreeSet<VertexId> {
        if !self.graph.contains(target) {
            tracing::debug!(vertex = %target, "MustConcretize: target absent from graph, nothing to record");
            return BTreeSet::new();
        }

        let mut stack = vec![target.clone()];
        let mut visited: BTreeSet<VertexId> = BTreeSet::new();

        while let Some(top) = stack.last().cloned() {
            if self.memo.contains_key(&(top.clone(), allow_pointer)) {
                stack.pop();
                continue;
            }
            if visited.contains(&top) {
                let result = self.finalize(&top, allow_pointer);
                self.memo.insert((top, allow_pointer), result);
                stack.pop();
            } else {
                visited.insert(top.clone());
                for edge in self.graph.outgoing(&top) {
                    if !self.memo.contains_key(&(edge.to.clone(), allow_pointer)) {
                        stack.push(edge.to.clone());
                    }
                }
            }
        }

        self.memo.get(&(target.clone(), allow_pointer)).cloned().unwrap_or_default()
    }

    /// Convenience wrapper over [`Self::compute_ids`] that maps the result
    /// down to the kinsts that actually need recording.
    pub fn compute_kinsts(&mut self, target: &VertexId, allow_pointer: bool) -> BTreeSet<KInst> {
        self.compute_ids(target, allow_pointer)
            .iter()
            .filter_map(|id| self.graph.vertex(id).and_then(|v| v.kinst.clone()))
            .collect()
    }

    fn finalize(&self, vertex_id: &VertexId, allow_pointer: bool) -> BTreeSet<VertexId> {
        let Some(vertex) = self.graph.vertex(vertex_id) else {
            return BTreeSet::new();
        };

        let mut child_union: BTreeSet<VertexId> = BTreeSet::new();
        let mut any_child_non_recordable = false;
        for edge in self.graph.outgoing(vertex_id) {
            let child_result = self.memo.get(&(edge.to.clone(), allow_pointer)).cloned().unwrap_or_default();
            for id in &child_result {
                let recordable = self.graph.vertex(id).is_some_and(|v| v.kinst.is_some());
                if !recordable {
                    any_child_non_recordable = true;
                }
            }
            child_union.extend(child_result);
        }
        if any_child_non_recordable {
            child_union.clear();
        }

        let deduped: BTreeSet<VertexId> = if child_union.is_empty() {
            child_union
        } else {
            child_union
                .iter()
                .filter(|candidate| {
                    let pd = self.graph.post_dom_of(candidate);
                    pd.is_empty() || !pd.is_subset(&child_union)
                })
                .cloned()
                .collect()
        };

        let child_kinsts: BTreeSet<KInst> = deduped
            .iter()
            .filter_map(|id| self.graph.vertex(id).and_then(|v| v.kinst.clone()))
            .collect();
        let child_bytes = self
            .graph
            .kinst_index()
            .recording_size(self.graph.vertices(), &child_kinsts, self.ptwrite);

        let self_cost: Option<u64> = match &vertex.kinst {
            Some(_) if allow_pointer || !vertex.is_pointer => {
                Some(if self.ptwrite { vertex.freq * 8 } else { vertex.freq * u64::from(vertex.width) / 8 })
            }
            _ => None,
        };

        if child_bytes > 0 && self_cost.is_none_or(|sc| child_bytes <= sc) {
            deduped
        } else if vertex.kind.is_constant() {
            BTreeSet::new()
        } else {
            BTreeSet::from([vertex_id.clone()])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphStore;
    use crate::types::{Category, Vertex, VertexKind};

    fn vertex(id: &str, kind: VertexKind, kinst: Option<&str>, is_pointer: bool) -> Vertex {
        Vertex {
            id: VertexId::new(id),
            kind,
            kinst: kinst.and_then(KInst::parse),
            width: 8,
            freq: 1,
            is_pointer,
            category: Category::Normal,
            root: None,
            label: None,
            dbg_info: None,
        }
    }

    #[test]
    fn constant_target_needs_nothing() {
        let vertices = vec![vertex("c", VertexKind::Constant, None, false)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let mut mc = MustConcretize::new(&graph, true);
        assert!(mc.compute_ids(&VertexId::new("c"), true).is_empty());
    }

    #[test]
    fn absent_target_needs_nothing() {
        let vertices = vec![vertex("c", VertexKind::Constant, None, false)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let mut mc = MustConcretize::new(&graph, true);
        assert!(mc.compute_ids(&VertexId::new("missing"), true).is_empty());
    }

    #[test]
    fn leaf_with_kinst_records_itself() {
        let vertices = vec![vertex("read", VertexKind::Read, Some("0x1"), false)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let mut mc = MustConcretize::new(&graph, true);
        let result = mc.compute_ids(&VertexId::new("read"), true);
        assert_eq!(result, BTreeSet::from([VertexId::new("read")]));
    }

    #[test]
    fn disallowed_pointer_falls_back_to_children() {
        // op (pointer, has own kinst) -> leaf (kinst, cheaper than self when disallowed)
        let vertices = vec![
            vertex("op", VertexKind::Other(1), Some("0xop"), true),
            vertex("leaf", VertexKind::Read, Some("0xleaf"), false),
        ];
        let edges = vec![(VertexId::new("op"), VertexId::new("leaf"), 1.0)];
        let graph = GraphStore::from_description(vertices, edges).unwrap();
        let mut mc = MustConcretize::new(&graph, true);
        let result = mc.compute_ids(&VertexId::new("op"), false);
        assert_eq!(result, BTreeSet::from([VertexId::new("leaf")]));
    }

    /// Two calls on the same vertex against a frozen graph with the same
    /// `allow_pointer` must return equal sets, memoized or not.
    #[test]
    fn idempotent_across_repeated_calls() {
        let vertices = vec![
            vertex("op", VertexKind::Other(1), Some("0xop"), true),
            vertex("leaf", VertexKind::Read, Some("0xleaf"), false),
        ];
        let edges = vec![(VertexId::new("op"), VertexId::new("leaf"), 1.0)];
        let graph = GraphStore::from_description(vertices, edges).unwrap();

        let mut mc = MustConcretize::new(&graph, true);
        let first = mc.compute_ids(&VertexId::new("op"), false);
        let second = mc.compute_ids(&VertexId::new("op"), false);
        assert_eq!(first, second);

        let mut fresh = MustConcretize::new(&graph, true);
        let third = fresh.compute_ids(&VertexId::new("op"), false);
        assert_eq!(first, third);
    }

    #[test]
    fn memo_is_cleared_between_phases() {
        let vertices = vec![vertex("read", VertexKind::Read, Some("0x1"), false)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let mut mc = MustConcretize::new(&graph, true);
        mc.compute_ids(&VertexId::new("read"), true);
        mc.clear();
        assert!(mc.memo.is_empty());
    }
}
