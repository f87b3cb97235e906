//! # Core Type Definitions
//!
//! Vertex, edge, and identifier types for the constraint-graph analyzer.
//!
//! Per the design notes on dynamic attribute access: `kind` is a closed
//! enum and `ispointer` a `bool`, both canonicalized once at load time by
//! the JSON loader in `apps/er-analyze`. No string comparison against
//! `"0"`/`"true"`/etc. happens anywhere in this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// VERTEX & INSTRUCTION IDENTIFIERS
// =============================================================================

/// Opaque, globally unique identifier for a vertex in the constraint graph.
///
/// Interned behind `Arc<str>` because the same id is shared across many
/// structures (adjacency maps, post-dominator sets, memo tables) once a
/// `GraphStore` is built.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VertexId(Arc<str>);

impl VertexId {
    #[must_use]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VertexId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VertexId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Identifier of a program instruction ("kinst"). Never `"N/A"` or empty —
/// use [`KInst::parse`] to construct one from wire data, which enforces
/// that invariant at the boundary.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KInst(Arc<str>);

impl KInst {
    /// Parse a raw `kinst` attribute, returning `None` if it is absent,
    /// empty, or the literal sentinel `"N/A"`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || raw == "N/A" {
            None
        } else {
            Some(Self(Arc::from(raw)))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for KInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for KInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// VERTEX KIND / CATEGORY
// =============================================================================

/// The closed set of vertex kinds recognized in the wire format.
///
/// `Other` carries the raw numeric operator tag for every kind beyond the
/// three that the analyzer treats specially; the analyzer never inspects
/// which operator it is, only whether a vertex is a `Constant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VertexKind {
    Constant,
    Read,
    UpdateNode,
    Other(i64),
    /// A "dummy" vertex with no `Kind` attribute at all, used only by the
    /// (out of scope) visualization pipeline to scale edge widths.
    /// `GraphStore::from_description` filters these out on ingest.
    Dummy,
}

impl VertexKind {
    #[must_use]
    pub const fn is_constant(self) -> bool {
        matches!(self, Self::Constant)
    }
}

/// Vertex category, used only at the boundary to auto-select `Query`
/// vertices as analysis targets (see `er-analyze`'s `--ignore-evaluation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Normal,
    Query,
    Constraint,
}

// =============================================================================
// EDGE WEIGHT
// =============================================================================

/// The only two valid edge weights: a direct operand (`1.0`) or an
/// indirect/index operand (`1.5`, e.g. a symbolic array index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeWeight {
    Direct,
    Indirect,
}

impl EdgeWeight {
    /// Parse a raw wire weight. Any value other than `1.0`/`1.5` is a
    /// fatal input error.
    pub fn from_f64(raw: f64) -> Option<Self> {
        if raw == 1.0 {
            Some(Self::Direct)
        } else if raw == 1.5 {
            Some(Self::Indirect)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Direct => 1.0,
            Self::Indirect => 1.5,
        }
    }

    /// Contribution to indirect depth: 1 for an indirect edge, 0 otherwise.
    #[must_use]
    pub const fn idep_increment(self) -> u32 {
        match self {
            Self::Direct => 0,
            Self::Indirect => 1,
        }
    }
}

/// A directed edge from a dependant (operator) to a dependency (operand).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
    pub weight: EdgeWeight,
}

// =============================================================================
// VERTEX
// =============================================================================

/// One symbolic expression in the constraint graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub kind: VertexKind,
    pub kinst: Option<KInst>,
    pub width: u32,
    pub freq: u64,
    pub is_pointer: bool,
    pub category: Category,
    /// Array-name attribute used by the update-list pass, may include a
    /// bracketed size suffix (e.g. `"buf[64]"`).
    pub root: Option<String>,
    pub label: Option<String>,
    pub dbg_info: Option<String>,
}

impl Vertex {
    /// The `root` attribute with any bracketed size suffix stripped.
    #[must_use]
    pub fn root_name(&self) -> Option<&str> {
        self.root.as_deref().map(|r| r.split('[').next().unwrap_or(r))
    }
}
