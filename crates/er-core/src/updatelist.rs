//! Array-update-driven target selection (`--recordUN` / `--getUN`).
//!
//! Walks `UpdateNode`/`Read` vertices grouped by their array's root name,
//! and treats the indirect (index) operand of every qualifying access as
//! an optimization target once its indirect depth clears a threshold.
//! Feeds those targets into the same two-phase [`crate::optimize`].

use crate::config::Config;
use crate::graph::GraphStore;
use crate::optimize::recursive_optimize;
use crate::types::{EdgeWeight, KInst, VertexId, VertexKind};
use std::collections::BTreeSet;

/// The set of index-operand vertices that should be concretized for the
/// given array names, filtered by minimum indirect depth.
#[must_use]
pub fn update_list_targets(graph: &GraphStore, array_names: &BTreeSet<String>, idep_threshold: u32) -> BTreeSet<VertexId> {
    let mut targets = BTreeSet::new();

    for vertex_id in graph.topo().order_list() {
        let Some(vertex) = graph.vertex(vertex_id) else { continue };
        if !matches!(vertex.kind, VertexKind::UpdateNode | VertexKind::Read) {
            continue;
        }
        let Some(root) = vertex.root_name() else { continue };
        if !array_names.contains(root) {
            continue;
        }

        for edge in graph.outgoing(vertex_id) {
            if edge.weight == EdgeWeight::Indirect && graph.idep_of(&edge.to) >= idep_threshold {
                targets.insert(edge.to.clone());
            }
        }
    }

    targets
}

/// Runs the recursive optimizer over the array-update targets.
#[must_use]
pub fn update_list_concretize(
    graph: &GraphStore,
    array_names: &BTreeSet<String>,
    idep_threshold: u32,
    config: Config,
) -> BTreeSet<KInst> {
    let targets = update_list_targets(graph, array_names, idep_threshold);
    recursive_optimize(graph, &targets, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Vertex};

    fn update_node(id: &str, root: &str) -> Vertex {
        Vertex {
            id: VertexId::new(id),
            kind: VertexKind::UpdateNode,
            kinst: None,
            width: 8,
            freq: 1,
            is_pointer: false,
            category: Category::Normal,
            root: Some(root.to_string()),
            label: None,
            dbg_info: None,
        }
    }

    fn index_vertex(id: &str, kinst: &str) -> Vertex {
        Vertex {
            id: VertexId::new(id),
            kind: VertexKind::Other(1),
            kinst: KInst::parse(kinst),
            width: 8,
            freq: 1,
            is_pointer: false,
            category: Category::Normal,
            root: None,
            label: None,
            dbg_info: None,
        }
    }

    #[test]
    fn selects_indirect_targets_above_threshold() {
        let vertices = vec![update_node("un", "buf[32]"), index_vertex("idx", "0x1")];
        let edges = vec![(VertexId::new("un"), VertexId::new("idx"), 1.5)];
        let graph = GraphStore::from_description(vertices, edges).unwrap();

        let names = BTreeSet::from(["buf".to_string()]);
        let targets = update_list_targets(&graph, &names, 0);
        assert_eq!(targets, BTreeSet::from([VertexId::new("idx")]));
    }

    #[test]
    fn ignores_arrays_not_in_the_name_set() {
        let vertices = vec![update_node("un", "other[32]"), index_vertex("idx", "0x1")];
        let edges = vec![(VertexId::new("un"), VertexId::new("idx"), 1.5)];
        let graph = GraphStore::from_description(vertices, edges).unwrap();

        let names = BTreeSet::from(["buf".to_string()]);
        let targets = update_list_targets(&graph, &names, 0);
        assert!(targets.is_empty());
    }
}
