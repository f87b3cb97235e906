//! Error type for the constraint-graph analyzer.

use crate::types::{KInst, VertexId};
use thiserror::Error;

/// Fatal conditions raised while building or analyzing a [`crate::graph::GraphStore`].
///
/// These are the only conditions the engine treats as fatal; everything
/// else (unreachable targets, empty plans, vertices absent from the graph)
/// is a recoverable condition reported via `tracing::warn!`.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("edge {from} -> {to} has invalid weight {weight} (must be 1.0 or 1.5)")]
    InvalidEdgeWeight {
        from: VertexId,
        to: VertexId,
        weight: f64,
    },

    #[error("recordable instruction {kinst} has zero width")]
    ZeroWidthRecordable { kinst: KInst },

    #[error("concretized-node sets of {a} and {b} overlap")]
    OverlappingConcretizedSets { a: KInst, b: KInst },

    #[error("vertex {vertex} was colored by both {first} and {second}")]
    DoubleColoredVertex {
        vertex: VertexId,
        first: KInst,
        second: KInst,
    },

    #[error("vertex {0} was not found in the graph")]
    UnknownVertex(VertexId),
}
