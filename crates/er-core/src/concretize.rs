//! Closure-under-concretization and recordable-instruction candidate scoring.

use crate::config::Config;
use crate::error::EngineError;
use crate::graph::GraphStore;
use crate::types::{KInst, VertexId};
use std::collections::{BTreeMap, BTreeSet};

/// A candidate: recording `kinst` concretizes `concretized_nodes` at
/// `record_size` bytes. Borrows the graph it was computed over so that
/// cost fields never drift out of sync with the vertex attributes they
/// were derived from.
#[derive(Debug, Clone)]
pub struct RecordableInst<'g> {
    graph: &'g GraphStore,
    pub kinst: KInst,
    pub rec_nodes: BTreeSet<VertexId>,
    pub hidden_nodes: BTreeSet<VertexId>,
    pub concretized_nodes: BTreeSet<VertexId>,
    pub record_size: u64,
    pub node_reduction: usize,
    pub coverage_score: f64,
    pub coverage_score_freq: f64,
    pub node_reduction_per_byte: f64,
    pub remain_score: Option<f64>,
    pub max_idep: Option<u32>,
}

impl<'g> RecordableInst<'g> {
    pub fn new(
        graph: &'g GraphStore,
        kinst: KInst,
        rec_nodes: BTreeSet<VertexId>,
        hidden_nodes: BTreeSet<VertexId>,
        concretized_nodes: BTreeSet<VertexId>,
        config: &Config,
    ) -> Result<Self, EngineError> {
        let representative = rec_nodes
            .iter()
            .next()
            .and_then(|id| graph.vertex(id))
            .ok_or_else(|| EngineError::UnknownVertex(VertexId::new(kinst.as_str())))?;

        if representative.width == 0 {
            return Err(EngineError::ZeroWidthRecordable { kinst: kinst.clone() });
        }

        let record_size = if config.ptwrite {
            representative.freq * 8
        } else {
            representative.freq * u64::from(representative.width) / 8
        };

        let coverage_score: f64 = concretized_nodes
            .iter()
            .filter_map(|id| graph.vertex(id))
            .map(|v| (f64::from(v.width) / 8.0) * f64::from(1 + graph.idep_of(&v.id)))
            .sum();

        let node_reduction = concretized_nodes.len();
        let record_size_f = record_size as f64;
        let coverage_score_freq = if record_size_f > 0.0 { coverage_score / record_size_f } else { 0.0 };
        let node_reduction_per_byte = if record_size_f > 0.0 {
            node_reduction as f64 / record_size_f
        } else {
            0.0
        };

        let (remain_score, max_idep) = if config.subgraph_scoring {
            let residual = graph.subgraph(&concretized_nodes);
            let score: f64 = residual
                .vertices()
                .values()
                .map(|v| (f64::from(v.width) / 8.0) * f64::from(1 + residual.idep_of(&v.id)))
                .sum();
            (Some(score), Some(residual.max_idep()))
        } else {
            (None, None)
        };

        Ok(Self {
            graph,
            kinst,
            rec_nodes,
            hidden_nodes,
            concretized_nodes,
            record_size,
            node_reduction,
            coverage_score,
            coverage_score_freq,
            node_reduction_per_byte,
            remain_score,
            max_idep,
        })
    }

    #[must_use]
    pub fn graph(&self) -> &'g GraphStore {
        self.graph
    }
}

/// Total record size across every candidate in a plan (cost additivity).
#[must_use]
pub fn total_record_size(plan: &[RecordableInst<'_>]) -> u64 {
    plan.iter().map(|r| r.record_size).sum()
}

/// Sanity-checks a combined plan before it is trusted for a report: no two
/// candidates' `concretized_nodes` may overlap, and no vertex may be
/// attributed to (`rec_nodes` of) two distinct kinsts. `analyze_recordable`
/// never itself combines more than one freshly-computed candidate per
/// call, so this is for callers assembling a multi-candidate plan greedily
/// (e.g. repeatedly re-running `analyze_recordable` with a growing
/// `initial_selection`) before printing or persisting it.
pub fn validate_plan(plan: &[RecordableInst<'_>]) -> Result<(), EngineError> {
    for (i, a) in plan.iter().enumerate() {
        for b in &plan[i + 1..] {
            if !a.concretized_nodes.is_disjoint(&b.concretized_nodes) {
                return Err(EngineError::OverlappingConcretizedSets {
                    a: a.kinst.clone(),
                    b: b.kinst.clone(),
                });
            }
        }
    }

    let mut colored: BTreeMap<VertexId, KInst> = BTreeMap::new();
    for candidate in plan {
        for node in &candidate.rec_nodes {
            if let Some(prior) = colored.insert(node.clone(), candidate.kinst.clone()) {
                if prior != candidate.kinst {
                    return Err(EngineError::DoubleColoredVertex {
                        vertex: node.clone(),
                        first: prior,
                        second: candidate.kinst.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

/// Repeatedly adds any vertex whose every operand is either a constant or
/// already in `set`, until a fixed point. Only vertices with at least one
/// outgoing edge (operators) are ever added; a leaf symbolic vertex is
/// never implicitly concretized.
#[must_use]
pub fn closure(graph: &GraphStore, seed: &BTreeSet<VertexId>) -> BTreeSet<VertexId> {
    let mut set = seed.clone();
    for vertex_id in graph.topo().order_list() {
        if set.contains(vertex_id) {
            continue;
        }
        let outgoing = graph.outgoing(vertex_id);
        if outgoing.is_empty() {
            continue;
        }
        let all_known = outgoing.iter().all(|e| {
            graph
                .vertex(&e.to)
                .is_some_and(|t| t.kind.is_constant())
                || set.contains(&e.to)
        });
        if all_known {
            set.insert(vertex_id.clone());
        }
    }
    set
}

/// Extends `seed` by assuming `kinst` is also recorded, starting the scan
/// just past `hint_position` in topological order (everything up to that
/// point was already accounted for by the caller's existing selection).
/// Any newly-concretized vertex that became reachable only because one of
/// its operands was already in `seed` (not because of `kinst` itself) is
/// reported as `hidden_nodes` — it would have been concretized anyway,
/// but only once `kinst`'s prerequisites are also in place.
pub fn analyze_single_kinst<'g>(
    graph: &'g GraphStore,
    config: &Config,
    kinst: &KInst,
    seed: &BTreeSet<VertexId>,
    hint_position: u32,
) -> Result<RecordableInst<'g>, EngineError> {
    let rec_nodes = graph
        .kinst_index()
        .nodes_of(kinst)
        .cloned()
        .unwrap_or_default();

    let mut local = seed.clone();
    local.extend(rec_nodes.iter().cloned());

    let mut hidden = BTreeSet::new();
    for vertex_id in graph.topo().after(hint_position) {
        if local.contains(vertex_id) {
            continue;
        }
        let Some(vertex) = graph.vertex(vertex_id) else { continue };
        if vertex.kind.is_constant() {
            continue;
        }
        let outgoing = graph.outgoing(vertex_id);
        if outgoing.is_empty() {
            continue;
        }

        let mut const_count = 0usize;
        let mut known_count = 0usize;
        for e in outgoing {
            if graph.vertex(&e.to).is_some_and(|t| t.kind.is_constant()) {
                const_count += 1;
            } else if local.contains(&e.to) {
                known_count += 1;
            }
        }

        if const_count + known_count == outgoing.len() {
            local.insert(vertex_id.clone());
            if known_count > 0 && vertex.kinst.is_some() {
                hidden.insert(vertex_id.clone());
            }
        }
    }

    let concretized_nodes: BTreeSet<VertexId> = local.difference(seed).cloned().collect();
    RecordableInst::new(graph, kinst.clone(), rec_nodes, hidden, concretized_nodes, config)
}

/// Given an `initial_selection` (possibly empty), returns one candidate
/// plan per not-yet-checked kinst: `initial_selection` extended by one
/// additional `RecordableInst`.
pub fn analyze_recordable<'g>(
    graph: &'g GraphStore,
    config: &Config,
    initial_selection: &[RecordableInst<'g>],
) -> Result<Vec<Vec<RecordableInst<'g>>>, EngineError> {
    let mut seed: BTreeSet<VertexId> = BTreeSet::new();
    let mut already_concretized: BTreeSet<VertexId> = BTreeSet::new();
    for candidate in initial_selection {
        seed.extend(candidate.rec_nodes.iter().cloned());
        seed.extend(candidate.hidden_nodes.iter().cloned());
        already_concretized.extend(candidate.concretized_nodes.iter().cloned());
    }

    let expanded = closure(graph, &seed);
    if expanded != already_concretized {
        tracing::warn!(
            expected = already_concretized.len(),
            recomputed = expanded.len(),
            "initial selection's concretized set was not pre-simplified; recomputing locally"
        );
    }

    let mut checked: BTreeSet<VertexId> = seed.clone();
    let mut plans = Vec::new();

    for vertex_id in graph.topo().order_list() {
        if checked.contains(vertex_id) {
            continue;
        }
        let Some(vertex) = graph.vertex(vertex_id) else { continue };
        let Some(kinst) = &vertex.kinst else { continue };

        let position = graph.topo().position(vertex_id).unwrap_or(0);
        let candidate = analyze_single_kinst(graph, config, kinst, &expanded, position)?;

        if let Some(nodes) = graph.kinst_index().nodes_of(kinst) {
            checked.extend(nodes.iter().cloned());
        }

        let mut plan = initial_selection.to_vec();
        plan.push(candidate);
        plans.push(plan);
    }

    Ok(plans)
}
