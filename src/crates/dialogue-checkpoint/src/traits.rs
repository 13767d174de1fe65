//! The [`CheckpointSaver`] trait - the store boundary for conversation state.
//!
//! Implement this trait to persist conversations in a custom backend. The
//! contract is deliberately small: one latest snapshot per thread id,
//! replaced atomically on save.
//!
//! # Implementing a Custom Backend
//!
//! ```rust,ignore
//! use dialogue_checkpoint::{Checkpoint, CheckpointSaver, Result};
//! use async_trait::async_trait;
//!
//! pub struct SqliteCheckpointer {
//!     pool: sqlx::SqlitePool,
//! }
//!
//! #[async_trait]
//! impl CheckpointSaver for SqliteCheckpointer {
//!     async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
//!         // SELECT state FROM checkpoints WHERE thread_id = ?
//!         todo!()
//!     }
//!
//!     async fn save(&self, checkpoint: Checkpoint) -> Result<()> {
//!         // INSERT ... ON CONFLICT (thread_id) DO UPDATE
//!         todo!()
//!     }
//!
//!     async fn delete_thread(&self, thread_id: &str) -> Result<()> {
//!         // DELETE FROM checkpoints WHERE thread_id = ?
//!         todo!()
//!     }
//! }
//! ```

use crate::checkpoint::Checkpoint;
use async_trait::async_trait;
use thiserror::Error;

/// Result type for checkpoint operations.
pub type Result<T> = std::result::Result<T, CheckpointError>;

/// Errors raised by checkpoint backends.
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Snapshot could not be serialized or deserialized.
    #[error("Checkpoint serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend storage failure (connection lost, disk full, ...).
    #[error("Checkpoint storage error: {0}")]
    Storage(String),
}

/// Storage backend for conversation checkpoints.
///
/// Implementations must be `Send + Sync`; the runtime shares them across
/// conversations via `Arc<dyn CheckpointSaver>`. Loading and saving for a
/// given thread id must each be atomic; the runtime guarantees it never runs
/// two turns for the same thread concurrently.
#[async_trait]
pub trait CheckpointSaver: Send + Sync {
    /// Load the latest snapshot for a thread, or `None` for a fresh thread.
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>>;

    /// Save a snapshot, replacing any previous one for the same thread.
    async fn save(&self, checkpoint: Checkpoint) -> Result<()>;

    /// Remove a thread's snapshot entirely.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;
}
