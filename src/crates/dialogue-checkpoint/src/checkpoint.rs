//! Checkpoint data structures: the snapshot itself and the config that
//! addresses it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted snapshot of conversation state for one thread.
///
/// The `state` field is an opaque JSON value owned by the caller; the store
/// never interprets it. Snapshots are whole-state: each save replaces the
/// previous snapshot for the thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Thread (conversation) identifier this snapshot belongs to
    pub thread_id: String,

    /// When this snapshot was created
    pub created_at: DateTime<Utc>,

    /// Serialized conversation state
    pub state: serde_json::Value,
}

impl Checkpoint {
    /// Create a checkpoint for the given thread, stamped with the current time.
    pub fn new(thread_id: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            thread_id: thread_id.into(),
            created_at: Utc::now(),
            state,
        }
    }
}

/// Addresses a checkpoint by thread id.
///
/// Thread ids are opaque strings chosen by the caller; a fresh id starts a
/// fresh conversation while the old one remains addressable.
///
/// # Examples
///
/// ```rust
/// use dialogue_checkpoint::CheckpointConfig;
///
/// let config = CheckpointConfig::new("session-1");
/// assert_eq!(config.thread_id, "session-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    /// Thread (conversation) identifier
    pub thread_id: String,
}

impl CheckpointConfig {
    /// Create a config addressing the given thread.
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
        }
    }
}
