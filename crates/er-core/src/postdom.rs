//! Post-dominator sets over the constraint graph.
//!
//! Treats the DAG as a reverse-flow problem over successors (a vertex's
//! outgoing/operand edges): a vertex with no successors post-dominates
//! only itself (empty set, by convention — the vertex itself is added by
//! callers that need it, mirroring the dominator-set convention of
//! excluding self). Every other vertex starts at the universal set and is
//! refined monotonically downward until a worklist-driven fixed point.

use crate::types::{Edge, VertexId};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Clone)]
pub struct PostDomMap {
    sets: BTreeMap<VertexId, BTreeSet<VertexId>>,
}

impl PostDomMap {
    pub fn compute(
        vertex_ids: &BTreeSet<VertexId>,
        forward: &BTreeMap<VertexId, BTreeSet<Edge>>,
        reverse: &BTreeMap<VertexId, BTreeSet<Edge>>,
    ) -> Self {
        let mut sets: BTreeMap<VertexId, BTreeSet<VertexId>> = BTreeMap::new();
        let mut worklist: VecDeque<VertexId> = VecDeque::new();

        for id in vertex_ids {
            let has_successors = forward.get(id).is_some_and(|edges| !edges.is_empty());
            if has_successors {
                sets.insert(id.clone(), vertex_ids.clone());
            } else {
                sets.insert(id.clone(), BTreeSet::new());
                worklist.push_back(id.clone());
            }
        }

        while let Some(changed) = worklist.pop_front() {
            let Some(predecessors) = reverse.get(&changed) else {
                continue;
            };
            for edge in predecessors {
                let n = &edge.from;
                let successors: BTreeSet<VertexId> = forward
                    .get(n)
                    .map(|edges| edges.iter().map(|e| e.to.clone()).collect())
                    .unwrap_or_default();
                if successors.is_empty() {
                    continue;
                }

                let mut new_pd: Option<BTreeSet<VertexId>> = None;
                for s in &successors {
                    let candidate = sets.get(s).cloned().unwrap_or_default();
                    new_pd = Some(match new_pd {
                        None if successors.len() == 1 => {
                            let mut only = candidate;
                            only.insert(s.clone());
                            only
                        }
                        None => candidate,
                        Some(acc) => acc.intersection(&candidate).cloned().collect(),
                    });
                }
                let Some(new_pd) = new_pd else { continue };

                if sets.get(n) != Some(&new_pd) {
                    sets.insert(n.clone(), new_pd);
                    worklist.push_back(n.clone());
                }
            }
        }

        Self { sets }
    }

    #[must_use]
    pub fn get(&self, id: &VertexId) -> BTreeSet<VertexId> {
        self.sets.get(id).cloned().unwrap_or_default()
    }

    /// Carries a post-dominator map through a vertex deletion without
    /// recomputing the fixed point: keeps the entry for every surviving
    /// vertex, with deleted ids stripped out of each set. This is a sound
    /// over-approximation — deleting vertices can only shrink the true
    /// post-dominator relation further — kept for callers that need the
    /// cheap `GraphStore::subgraph` path described by the Lifecycle note.
    #[must_use]
    pub fn carry_through(&self, surviving: &BTreeSet<VertexId>) -> Self {
        let sets = self
            .sets
            .iter()
            .filter(|(id, _)| surviving.contains(*id))
            .map(|(id, set)| (id.clone(), set.intersection(surviving).cloned().collect()))
            .collect();
        Self { sets }
    }
}
