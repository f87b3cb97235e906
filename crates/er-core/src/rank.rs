//! Heuristic ranking of recordable-instruction plans.
//!
//! Each ranking function sorts a batch of candidate plans (as produced by
//! [`crate::concretize::analyze_recordable`]) so the caller can pick
//! `plans[0]` as the next greedy choice. The first four favor the plan
//! whose newest candidate scores lowest on cheap-but-effective metrics;
//! the fifth is a worst-first comparator used to prune the least
//! promising plans before a deeper search.

use crate::concretize::{total_record_size, RecordableInst};

/// The plan's newest candidate, or `None` for a (malformed) empty plan —
/// callers treat that as the most benign possible key rather than panic.
fn last_candidate<'a, 'g>(plan: &'a [RecordableInst<'g>]) -> Option<&'a RecordableInst<'g>> {
    plan.last()
}

/// Ascending by `coverage_score` of the plan's newest candidate.
pub fn sort_by_coverage_score(plans: &mut [Vec<RecordableInst<'_>>]) {
    plans.sort_by(|a, b| {
        let score_a = last_candidate(a).map_or(0.0, |c| c.coverage_score);
        let score_b = last_candidate(b).map_or(0.0, |c| c.coverage_score);
        score_a.total_cmp(&score_b)
    });
}

/// Ascending by `coverage_score_freq` of the plan's newest candidate.
pub fn sort_by_coverage_score_freq(plans: &mut [Vec<RecordableInst<'_>>]) {
    plans.sort_by(|a, b| {
        let score_a = last_candidate(a).map_or(0.0, |c| c.coverage_score_freq);
        let score_b = last_candidate(b).map_or(0.0, |c| c.coverage_score_freq);
        score_a.total_cmp(&score_b)
    });
}

/// Ascending by `node_reduction` of the plan's newest candidate.
pub fn sort_by_node_reduction(plans: &mut [Vec<RecordableInst<'_>>]) {
    plans.sort_by_key(|plan| last_candidate(plan).map_or(0, |c| c.node_reduction));
}

/// Ascending by `node_reduction_per_byte` of the plan's newest candidate.
pub fn sort_by_node_reduction_per_byte(plans: &mut [Vec<RecordableInst<'_>>]) {
    plans.sort_by(|a, b| {
        let score_a = last_candidate(a).map_or(0.0, |c| c.node_reduction_per_byte);
        let score_b = last_candidate(b).map_or(0.0, |c| c.node_reduction_per_byte);
        score_a.total_cmp(&score_b)
    });
}

/// Descending (worst first) by `(max_idep, total record_size, remain_score)`
/// of the plan as a whole. Requires subgraph scoring to have been enabled
/// when the candidates were built; missing fields — and empty plans — sort
/// as the most benign value (0) so they never dominate the comparison.
pub fn sort_worst_first(plans: &mut [Vec<RecordableInst<'_>>]) {
    plans.sort_by(|a, b| {
        let key_a = worst_first_key(a);
        let key_b = worst_first_key(b);
        key_b
            .0
            .cmp(&key_a.0)
            .then_with(|| key_b.1.cmp(&key_a.1))
            .then_with(|| key_b.2.total_cmp(&key_a.2))
    });
}

fn worst_first_key(plan: &[RecordableInst<'_>]) -> (u32, u64, f64) {
    let (max_idep, remain_score) = last_candidate(plan)
        .map(|last| (last.max_idep.unwrap_or(0), last.remain_score.unwrap_or(0.0)))
        .unwrap_or_default();
    (max_idep, total_record_size(plan), remain_score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::graph::GraphStore;
    use crate::types::{Category, KInst, Vertex, VertexKind};

    fn vertex(id: &str, kinst: &str, width: u32) -> Vertex {
        Vertex {
            id: crate::types::VertexId::new(id),
            kind: VertexKind::Other(1),
            kinst: KInst::parse(kinst),
            width,
            freq: 1,
            is_pointer: false,
            category: Category::Normal,
            root: None,
            label: None,
            dbg_info: None,
        }
    }

    #[test]
    fn sort_by_node_reduction_orders_ascending() {
        let vertices = vec![vertex("a", "0xa", 8), vertex("b", "0xb", 64)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let config = Config::default();
        let mut plans = crate::concretize::analyze_recordable(&graph, &config, &[]).unwrap();
        sort_by_node_reduction(&mut plans);
        let first = last_candidate(&plans[0]).unwrap().node_reduction;
        let second = last_candidate(&plans[1]).unwrap().node_reduction;
        assert!(first <= second);
    }

    #[test]
    fn sort_by_coverage_score_orders_ascending() {
        let vertices = vec![vertex("a", "0xa", 8), vertex("b", "0xb", 64)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let config = Config::default();
        let mut plans = crate::concretize::analyze_recordable(&graph, &config, &[]).unwrap();
        sort_by_coverage_score(&mut plans);
        let first = last_candidate(&plans[0]).unwrap().coverage_score;
        let second = last_candidate(&plans[1]).unwrap().coverage_score;
        assert!(first <= second);
    }

    #[test]
    fn empty_plan_slice_is_a_no_op() {
        let mut plans: Vec<Vec<RecordableInst<'_>>> = Vec::new();
        sort_worst_first(&mut plans);
        assert!(plans.is_empty());
    }
}
