//! Library surface of the `er-analyze` CLI shell, split out from `main.rs`
//! so integration tests can exercise the loader and report formatting
//! without spawning the binary.

pub mod cli;
pub mod error;
pub mod loader;
pub mod report;
