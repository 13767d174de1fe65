//! Agent error types.

use thiserror::Error;

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;

/// Errors surfaced by the agent facade.
///
/// Per-turn failures (model call, tool execution, extraction parse) are
/// recovered inside the graph nodes and never reach this type. What remains
/// is graph construction at startup and checkpoint plumbing.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Graph construction or execution failure.
    #[error(transparent)]
    Graph(#[from] dialogue_graph::GraphError),

    /// Checkpoint store failure while loading or saving a conversation.
    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] dialogue_checkpoint::CheckpointError),
}
