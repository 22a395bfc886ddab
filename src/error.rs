//! Engine-level error types.
//!
//! Only structural problems cross the engine boundary as errors. Reference
//! and cycle defects are recorded as violations in the report, and step
//! failures are recorded on the step itself.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by document loading and by [`crate::Engine::run`].
#[derive(Debug, Error)]
pub enum EngineError {
    /// Two or more nodes share the same ID. Fatal before any execution.
    #[error("duplicate node id: '{0}'")]
    DuplicateNodeId(String),

    /// The graph has a cycle and the engine is configured to abort on one.
    #[error("dependency cycle detected among nodes: {}", .0.join(", "))]
    CycleDetected(Vec<String>),

    /// A document could not be decoded.
    #[error("failed to parse {format} document: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// A document file could not be read or written.
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document or report could not be encoded.
    #[error("failed to encode {format} output: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    /// A step was handed to the trace recorder in a state it cannot accept.
    #[error("cannot record step '{node_id}': {reason}")]
    InvalidStep {
        node_id: String,
        reason: &'static str,
    },
}

impl EngineError {
    /// True for errors raised by graph validation (as opposed to I/O).
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::DuplicateNodeId(_) | Self::CycleDetected(_))
    }
}
