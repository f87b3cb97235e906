//! # er-core
//!
//! Constraint-graph analyzer for symbolic execution traces: given an
//! expression DAG and a set of target vertices, selects the cheapest set
//! of program instructions ("kinsts") to record at replay time so that
//! every target becomes concrete.
//!
//! ## Architectural constraints
//!
//! - Pure Rust: no async, no network dependencies, no I/O. Loading a graph
//!   from disk and formatting a report are the CLI shell's job
//!   (`apps/er-analyze`), not this crate's.
//! - Deterministic: `BTreeMap`/`BTreeSet` only, never `HashMap`/`HashSet`.
//! - Immutable after construction: [`graph::GraphStore`] and every derived
//!   index never mutate once built; every transformation allocates a new
//!   `GraphStore`.

pub mod concretize;
pub mod config;
pub mod error;
pub mod graph;
pub mod idep;
pub mod kinst;
pub mod must_concretize;
pub mod optimize;
pub mod postdom;
pub mod rank;
pub mod topo;
pub mod types;
pub mod updatelist;

pub use concretize::{analyze_recordable, analyze_single_kinst, closure, total_record_size, validate_plan, RecordableInst};
pub use config::Config;
pub use error::EngineError;
pub use graph::GraphStore;
pub use idep::IDepMap;
pub use kinst::KInstIndex;
pub use must_concretize::MustConcretize;
pub use optimize::recursive_optimize;
pub use postdom::PostDomMap;
pub use topo::TopoIndex;
pub use types::{Category, Edge, EdgeWeight, KInst, Vertex, VertexId, VertexKind};
pub use updatelist::{update_list_concretize, update_list_targets};
