//! Two-phase recursive optimization of a recording set.
//!
//! Phase one forbids recording pointer-valued kinsts and iterates
//! [`MustConcretize`] to a fixed point; phase two repeats the process with
//! pointer recording allowed, seeded from phase one's result. Within each
//! phase, every tracked kinst is re-examined against a residual subgraph
//! that assumes every *other* tracked kinst has already been concretized —
//! if re-running `MustConcretize` there turns up a strictly cheaper (or
//! equally cheap but smaller) replacement, the kinst is swapped out.

use crate::config::Config;
use crate::graph::GraphStore;
use crate::must_concretize::MustConcretize;
use crate::types::{KInst, VertexId};
use std::collections::{BTreeMap, BTreeSet};

/// Runs the two-phase recursive optimizer over `targets` and returns the
/// final kinst recording set.
#[must_use]
pub fn recursive_optimize(graph: &GraphStore, targets: &BTreeSet<VertexId>, config: Config) -> BTreeSet<KInst> {
    let mut mc = MustConcretize::new(graph, config.ptwrite);

    let phase1_cfg = Config {
        allow_pointer: false,
        ..config
    };
    let phase1_seed = initial_recording_set(&mut mc, targets, phase1_cfg.allow_pointer);
    let phase1 = fixed_point(graph, phase1_cfg, kinst_map(graph, &phase1_seed));

    mc.clear();

    let phase2_cfg = Config {
        allow_pointer: true,
        ..config
    };
    let phase2_seed = seed_from_kinsts(graph, &phase1);
    let phase2 = fixed_point(graph, phase2_cfg, phase2_seed);

    phase2
}

fn initial_recording_set(
    mc: &mut MustConcretize<'_>,
    targets: &BTreeSet<VertexId>,
    allow_pointer: bool,
) -> BTreeSet<VertexId> {
    let mut result = BTreeSet::new();
    for target in targets {
        result.extend(mc.compute_ids(target, allow_pointer));
    }
    result
}

fn kinst_map(graph: &GraphStore, ids: &BTreeSet<VertexId>) -> BTreeMap<KInst, BTreeSet<VertexId>> {
    let mut map: BTreeMap<KInst, BTreeSet<VertexId>> = BTreeMap::new();
    for id in ids {
        if let Some(kinst) = graph.vertex(id).and_then(|v| v.kinst.clone()) {
            map.entry(kinst).or_default().insert(id.clone());
        }
    }
    map
}

fn seed_from_kinsts(graph: &GraphStore, kinsts: &BTreeSet<KInst>) -> BTreeMap<KInst, BTreeSet<VertexId>> {
    let mut map = BTreeMap::new();
    for kinst in kinsts {
        if let Some(nodes) = graph.kinst_index().nodes_of(kinst) {
            map.insert(kinst.clone(), nodes.clone());
        }
    }
    map
}

fn fixed_point(
    graph: &GraphStore,
    config: Config,
    mut tracked: BTreeMap<KInst, BTreeSet<VertexId>>,
) -> BTreeSet<KInst> {
    loop {
        let before = tracked.clone();
        let keys: Vec<KInst> = tracked.keys().cloned().collect();

        for kinst in keys {
            let Some(own_nodes) = tracked.get(&kinst).cloned() else {
                continue;
            };

            let other_concretized: BTreeSet<VertexId> = tracked
                .iter()
                .filter(|(k, _)| **k != kinst)
                .flat_map(|(_, nodes)| nodes.iter().cloned())
                .collect();
            let deleted = crate::concretize::closure(graph, &other_concretized);
            let residual = graph.subgraph(&deleted);

            let mut residual_mc = MustConcretize::new(&residual, config.ptwrite);
            let mut replacement_ids: BTreeSet<VertexId> = BTreeSet::new();
            for node in &own_nodes {
                replacement_ids.extend(residual_mc.compute_ids(node, config.allow_pointer));
            }
            let replacement = kinst_map(&residual, &replacement_ids);

            let replacement_kinsts: BTreeSet<KInst> = replacement.keys().cloned().collect();
            let replacement_cost =
                graph
                    .kinst_index()
                    .recording_size(graph.vertices(), &replacement_kinsts, config.ptwrite);
            let self_cost = graph.kinst_index().recording_size(
                graph.vertices(),
                &BTreeSet::from([kinst.clone()]),
                config.ptwrite,
            );

            let labels_pointer = own_nodes.iter().any(|id| graph.vertex(id).is_some_and(|v| v.is_pointer));

            let should_replace = !replacement_kinsts.contains(&kinst)
                && (replacement_cost < self_cost
                    || (replacement_cost == self_cost && replacement_kinsts.len() == 1)
                    || (!config.allow_pointer && labels_pointer));

            if should_replace {
                tracked.remove(&kinst);
                for (k, nodes) in replacement {
                    tracked.entry(k).or_default().extend(nodes);
                }
            }
        }

        if tracked == before {
            break;
        }
    }

    tracked.into_keys().collect()
}
