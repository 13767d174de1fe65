//! In-memory checkpoint backend.
//!
//! [`InMemoryCheckpointSaver`] keeps the latest snapshot per thread in a
//! `HashMap` behind an async `RwLock`. It is the reference implementation of
//! [`CheckpointSaver`]: fine for tests, demos, and single-process services;
//! state is lost on shutdown.
//!
//! # Example
//!
//! ```rust
//! use dialogue_checkpoint::{Checkpoint, CheckpointSaver, InMemoryCheckpointSaver};
//! use serde_json::json;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dialogue_checkpoint::Result<()> {
//! let saver = InMemoryCheckpointSaver::new();
//!
//! saver.save(Checkpoint::new("thread-1", json!({"turn": 1}))).await?;
//! let loaded = saver.load("thread-1").await?;
//! assert!(loaded.is_some());
//!
//! // Unknown threads load as empty
//! assert!(saver.load("thread-2").await?.is_none());
//! # Ok(())
//! # }
//! ```

use crate::checkpoint::Checkpoint;
use crate::traits::{CheckpointSaver, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Thread-safe in-memory checkpoint store.
///
/// Cloning is cheap and shares the underlying map.
#[derive(Clone, Default)]
pub struct InMemoryCheckpointSaver {
    threads: Arc<RwLock<HashMap<String, Checkpoint>>>,
}

impl InMemoryCheckpointSaver {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads with a saved snapshot.
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }

    /// Drop all snapshots.
    pub async fn clear(&self) {
        self.threads.write().await.clear();
    }
}

#[async_trait]
impl CheckpointSaver for InMemoryCheckpointSaver {
    async fn load(&self, thread_id: &str) -> Result<Option<Checkpoint>> {
        Ok(self.threads.read().await.get(thread_id).cloned())
    }

    async fn save(&self, checkpoint: Checkpoint) -> Result<()> {
        self.threads
            .write()
            .await
            .insert(checkpoint.thread_id.clone(), checkpoint);
        Ok(())
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.threads.write().await.remove(thread_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_save_and_load() {
        let saver = InMemoryCheckpointSaver::new();

        saver
            .save(Checkpoint::new("t1", json!({"messages": ["hola"]})))
            .await
            .unwrap();

        let loaded = saver.load("t1").await.unwrap().unwrap();
        assert_eq!(loaded.thread_id, "t1");
        assert_eq!(loaded.state["messages"][0], "hola");
    }

    #[tokio::test]
    async fn test_missing_thread_is_empty() {
        let saver = InMemoryCheckpointSaver::new();
        assert!(saver.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_previous_snapshot() {
        let saver = InMemoryCheckpointSaver::new();

        saver.save(Checkpoint::new("t1", json!({"v": 1}))).await.unwrap();
        saver.save(Checkpoint::new("t1", json!({"v": 2}))).await.unwrap();

        let loaded = saver.load("t1").await.unwrap().unwrap();
        assert_eq!(loaded.state["v"], 2);
        assert_eq!(saver.thread_count().await, 1);
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let saver = InMemoryCheckpointSaver::new();

        saver.save(Checkpoint::new("a", json!({"who": "a"}))).await.unwrap();
        saver.save(Checkpoint::new("b", json!({"who": "b"}))).await.unwrap();

        assert_eq!(saver.load("a").await.unwrap().unwrap().state["who"], "a");
        assert_eq!(saver.load("b").await.unwrap().unwrap().state["who"], "b");
    }

    #[tokio::test]
    async fn test_delete_thread() {
        let saver = InMemoryCheckpointSaver::new();

        saver.save(Checkpoint::new("t1", json!({}))).await.unwrap();
        saver.delete_thread("t1").await.unwrap();

        assert!(saver.load("t1").await.unwrap().is_none());
        assert_eq!(saver.thread_count().await, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let saver = InMemoryCheckpointSaver::new();

        saver.save(Checkpoint::new("a", json!({}))).await.unwrap();
        saver.save(Checkpoint::new("b", json!({}))).await.unwrap();
        saver.clear().await;

        assert_eq!(saver.thread_count().await, 0);
    }
}
