//! # Scenario Tests
//!
//! End-to-end scenarios exercising the full pipeline (`GraphStore` ->
//! `MustConcretize`/`recursive_optimize`) against small, hand-built
//! constraint graphs whose correct recording set can be checked by hand.

use er_core::types::{Category, KInst, Vertex, VertexId, VertexKind};
use er_core::{recursive_optimize, update_list_targets, Config, GraphStore, MustConcretize};
use std::collections::BTreeSet;

fn vertex(id: &str, kind: VertexKind, kinst: Option<&str>, is_pointer: bool, root: Option<&str>) -> Vertex {
    Vertex {
        id: VertexId::new(id),
        kind,
        kinst: kinst.and_then(KInst::parse),
        width: 32,
        freq: 1,
        is_pointer,
        category: Category::Normal,
        root: root.map(str::to_string),
        label: None,
        dbg_info: None,
    }
}

mod simple_chains {
    use super::*;

    /// A target that is already a constant needs nothing recorded.
    #[test]
    fn constant_target_has_empty_recording_set() {
        let vertices = vec![vertex("c", VertexKind::Constant, None, false, None)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let targets = BTreeSet::from([VertexId::new("c")]);
        let result = recursive_optimize(&graph, &targets, Config::default());
        assert!(result.is_empty());
    }

    /// A leaf symbolic read with a valid kinst must record itself.
    #[test]
    fn leaf_read_records_its_own_kinst() {
        let vertices = vec![vertex("read", VertexKind::Read, Some("0xread"), false, None)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let targets = BTreeSet::from([VertexId::new("read")]);
        let result = recursive_optimize(&graph, &targets, Config::default());
        assert_eq!(result, BTreeSet::from([KInst::parse("0xread").unwrap()]));
    }

    /// An operator whose every operand is constant still must record its
    /// own kinst when analyzed directly: a zero-cost child union never
    /// satisfies the "> 0" cost requirement, so there is no free ride for
    /// a non-constant vertex. The caller is expected to pre-filter via
    /// `closure` before asking for vertices that are already free.
    #[test]
    fn operator_over_constants_still_records_itself() {
        let vertices = vec![
            vertex("op", VertexKind::Other(1), Some("0xop"), false, None),
            vertex("c1", VertexKind::Constant, None, false, None),
            vertex("c2", VertexKind::Constant, None, false, None),
        ];
        let edges = vec![
            (VertexId::new("op"), VertexId::new("c1"), 1.0),
            (VertexId::new("op"), VertexId::new("c2"), 1.0),
        ];
        let graph = GraphStore::from_description(vertices, edges).unwrap();
        let targets = BTreeSet::from([VertexId::new("op")]);
        let result = recursive_optimize(&graph, &targets, Config::default());
        assert_eq!(result, BTreeSet::from([KInst::parse("0xop").unwrap()]));
    }

    /// But running `closure` first (as the CLI shell does before calling
    /// into `MustConcretize`/`recursive_optimize`) correctly recognizes
    /// the operator as free, since both its operands are constants.
    #[test]
    fn closure_recognizes_operator_over_constants_as_free() {
        let vertices = vec![
            vertex("op", VertexKind::Other(1), Some("0xop"), false, None),
            vertex("c1", VertexKind::Constant, None, false, None),
            vertex("c2", VertexKind::Constant, None, false, None),
        ];
        let edges = vec![
            (VertexId::new("op"), VertexId::new("c1"), 1.0),
            (VertexId::new("op"), VertexId::new("c2"), 1.0),
        ];
        let graph = GraphStore::from_description(vertices, edges).unwrap();
        let closed = er_core::closure(&graph, &BTreeSet::new());
        assert!(closed.contains(&VertexId::new("op")));
    }
}

mod pointer_handling {
    use super::*;

    /// With pointer recording disallowed, a pointer-valued operator must
    /// fall back to whatever its non-pointer operand needs instead of
    /// recording itself.
    #[test]
    fn disallowing_pointers_forces_fallback_to_operand() {
        let mut operand = vertex("operand", VertexKind::Read, Some("0xoperand"), false, None);
        operand.freq = 2; // pricier than ptr_op's own recording once pointers are allowed
        let vertices = vec![vertex("ptr_op", VertexKind::Other(1), Some("0xptr"), true, None), operand];
        let edges = vec![(VertexId::new("ptr_op"), VertexId::new("operand"), 1.0)];
        let graph = GraphStore::from_description(vertices, edges).unwrap();

        let mut mc = MustConcretize::new(&graph, true);
        let disallowed = mc.compute_kinsts(&VertexId::new("ptr_op"), false);
        assert_eq!(disallowed, BTreeSet::from([KInst::parse("0xoperand").unwrap()]));

        mc.clear();
        let allowed = mc.compute_kinsts(&VertexId::new("ptr_op"), true);
        assert_eq!(allowed, BTreeSet::from([KInst::parse("0xptr").unwrap()]));
    }
}

mod post_dominator_dedup {
    use super::*;

    /// Two operands of a target whose concretization is already implied
    /// by a shared post-dominating ancestor collapse to one recording.
    #[test]
    fn shared_ancestor_deduplicates_children() {
        // target -> mid -> shared (shared post-dominates mid within target's subtree)
        let vertices = vec![
            vertex("target", VertexKind::Other(1), Some("0xtarget"), false, None),
            vertex("mid", VertexKind::Other(1), Some("0xmid"), false, None),
            vertex("shared", VertexKind::Read, Some("0xshared"), false, None),
        ];
        let edges = vec![
            (VertexId::new("target"), VertexId::new("mid"), 1.0),
            (VertexId::new("mid"), VertexId::new("shared"), 1.0),
        ];
        let graph = GraphStore::from_description(vertices, edges).unwrap();
        let mut mc = MustConcretize::new(&graph, true);
        let result = mc.compute_kinsts(&VertexId::new("target"), true);
        // "shared" is the cheapest single recording that concretizes the whole chain.
        assert_eq!(result, BTreeSet::from([KInst::parse("0xshared").unwrap()]));
    }
}

mod update_list {
    use super::*;

    /// Only indirect-edge operands of update nodes touching a named array,
    /// at or above the configured indirect-depth threshold, become targets.
    #[test]
    fn only_matching_array_and_threshold_become_targets() {
        let vertices = vec![
            vertex("un_match", VertexKind::UpdateNode, None, false, Some("buf[64]")),
            vertex("idx_match", VertexKind::Other(1), Some("0xidx"), false, None),
            vertex("un_other", VertexKind::UpdateNode, None, false, Some("other[64]")),
            vertex("idx_other", VertexKind::Other(1), Some("0xother"), false, None),
        ];
        let edges = vec![
            (VertexId::new("un_match"), VertexId::new("idx_match"), 1.5),
            (VertexId::new("un_other"), VertexId::new("idx_other"), 1.5),
        ];
        let graph = GraphStore::from_description(vertices, edges).unwrap();
        let names = BTreeSet::from(["buf".to_string()]);
        let targets = update_list_targets(&graph, &names, 0);
        assert_eq!(targets, BTreeSet::from([VertexId::new("idx_match")]));
    }
}

mod unreachable_targets {
    use super::*;

    /// A target id that simply is not in the graph contributes nothing
    /// and does not panic — this is a recoverable condition, not fatal.
    #[test]
    fn target_absent_from_graph_yields_empty_set() {
        let vertices = vec![vertex("only", VertexKind::Constant, None, false, None)];
        let graph = GraphStore::from_description(vertices, Vec::new()).unwrap();
        let targets = BTreeSet::from([VertexId::new("does-not-exist")]);
        let result = recursive_optimize(&graph, &targets, Config::default());
        assert!(result.is_empty());
    }
}
