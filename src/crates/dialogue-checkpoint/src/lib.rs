//! # dialogue-checkpoint - Conversation State Persistence
//!
//! **Trait-based checkpoint abstractions** for persisting and restoring
//! conversation state between turns. A checkpoint is a snapshot of the full
//! conversation state for one thread (conversation id), saved after each
//! completed turn and loaded before the next one.
//!
//! ## Overview
//!
//! Checkpoints enable:
//!
//! - **Multi-turn continuity** - A dialogue resumes across independent
//!   invocations with its accumulated state intact
//! - **Thread isolation** - Distinct conversation ids never share state
//! - **Pluggable backends** - The [`CheckpointSaver`] trait is the seam for
//!   PostgreSQL, SQLite, Redis, or any other store
//!
//! ## Core Concepts
//!
//! ### 1. CheckpointSaver Trait
//!
//! The [`CheckpointSaver`] trait defines the store boundary the graph runtime
//! depends on:
//!
//! - **`load()`** - Retrieve the latest snapshot for a thread, if any
//! - **`save()`** - Replace the snapshot for a thread (last writer wins)
//! - **`delete_thread()`** - Drop a thread's snapshot entirely
//!
//! The store keeps exactly one snapshot per thread. Concurrency control
//! across turns on the *same* thread is the caller's responsibility; the
//! runtime assumes at most one in-flight turn per conversation id.
//!
//! ### 2. Checkpoint Structure
//!
//! A [`Checkpoint`] carries the thread id, a creation timestamp, and the
//! serialized state as a JSON value. The state shape is owned by the caller;
//! this crate never inspects it.
//!
//! ### 3. Implementation Strategy
//!
//! [`InMemoryCheckpointSaver`] is the reference implementation, suitable for
//! tests, demos, and single-process deployments. Production backends
//! implement [`CheckpointSaver`] against their storage of choice.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dialogue_checkpoint::{CheckpointConfig, InMemoryCheckpointSaver};
//! use std::sync::Arc;
//!
//! let saver = Arc::new(InMemoryCheckpointSaver::new());
//! let compiled = graph.compile()?.with_checkpointer(saver);
//!
//! let config = CheckpointConfig::new("conversation-42");
//! let state = compiled.load_state(&config).await?.unwrap_or_default();
//! ```

pub mod checkpoint;
pub mod memory;
pub mod traits;

pub use checkpoint::{Checkpoint, CheckpointConfig};
pub use memory::InMemoryCheckpointSaver;
pub use traits::{CheckpointError, CheckpointSaver, Result};
