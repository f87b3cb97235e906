//! CLI-level error type: wraps I/O, JSON, and engine failures into the
//! single stderr line + exit code mandated by the error handling design.

use er_core::types::VertexId;
use er_core::EngineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    #[error("unknown vertex id '{0}' named on the command line")]
    UnknownTarget(VertexId),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
