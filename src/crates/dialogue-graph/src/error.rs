//! Error types for graph construction and turn execution.
//!
//! All errors implement `std::error::Error` via `thiserror`. The only class
//! that should abort a service is [`GraphError::Validation`] raised at
//! compile time - everything else is per-turn and recoverable by ending the
//! turn.

use thiserror::Error;

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while building, validating, or executing a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Graph structure is invalid (missing targets, dangling nodes).
    /// Raised at compile time; services should treat this as fatal at
    /// startup and refuse to accept turns.
    #[error("Graph validation failed: {0}")]
    Validation(String),

    /// Execution reached a node id that does not exist.
    #[error("Node '{0}' not found in graph")]
    MissingNode(String),

    /// A node executor returned an error.
    #[error("Node '{node}' execution failed: {message}")]
    NodeExecution { node: String, message: String },

    /// A conditional router returned a target outside its branch map.
    #[error("Router at '{node}' returned unknown target '{target}'")]
    InvalidRoute { node: String, target: String },

    /// The turn did not reach END within the step limit. Guards against
    /// routing cycles; the turn is aborted rather than left spinning.
    #[error("Turn aborted after {0} steps without reaching the end of the graph")]
    StepLimit(usize),

    /// Checkpoint store failure while loading or saving state.
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] dialogue_checkpoint::CheckpointError),

    /// State could not be serialized for checkpointing.
    #[error("State serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A model invocation failed. Node implementations usually recover this
    /// locally; it propagates only when a caller chooses to.
    #[error("Model invocation failed: {0}")]
    Llm(String),
}
