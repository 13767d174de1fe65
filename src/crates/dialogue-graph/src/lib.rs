//! # dialogue-graph - Turn-Based Conversation Routing
//!
//! **A small state-machine substrate for conversational agents**: a directed
//! graph of async nodes and routing functions that drives one dialogue turn
//! at a time over a typed, checkpointable state.
//!
//! ## Overview
//!
//! `dialogue-graph` provides:
//!
//! - **Typed state** - The graph is generic over your state type; nodes
//!   receive it, transform it, and hand it back
//! - **Conditional routing** - Pure decision functions pick the next node
//!   from the current state
//! - **Turn semantics** - One external input drives exactly one pass from
//!   [`START`] to [`END`]; the turn ends, state is persisted, and the graph
//!   waits for the next input
//! - **Checkpoint/resume** - Per-thread snapshots via the
//!   [`dialogue_checkpoint`] store boundary
//! - **Fail-fast validation** - Structural errors surface at
//!   [`compile()`](StateGraph::compile), never mid-turn
//!
//! ## Core Concepts
//!
//! ### 1. StateGraph - Builder API
//!
//! [`StateGraph`] is the entry point. Add nodes (async functions from state
//! to state), direct edges, and conditional edges (router + branch map),
//! then compile into a [`CompiledGraph`].
//!
//! ### 2. Turn Execution
//!
//! Execution is sequential and single-path: the edge out of [`START`]
//! (usually conditional - the entry router) selects the first node; each
//! node's outgoing edge selects the next; reaching [`END`] completes the
//! turn. A step limit guards against accidental cycles - when routing goes
//! wrong the safe action is to terminate the turn, not to loop.
//!
//! ### 3. Collaborator Boundaries
//!
//! The [`llm`] module defines the [`ChatModel`](llm::ChatModel) trait (the
//! model call boundary), and the [`tool`] module the [`ToolRegistry`] (read
//! -only capabilities the model may request). Both are injected
//! capabilities: construct them explicitly and capture them in node
//! closures - there is no process-wide registry.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dialogue_graph::{StateGraph, END, START};
//! use serde::{Deserialize, Serialize};
//! use std::collections::HashMap;
//!
//! #[derive(Clone, Default, Serialize, Deserialize)]
//! struct ChatState {
//!     transcript: Vec<String>,
//! }
//!
//! let mut graph = StateGraph::new();
//!
//! graph.add_node("reply", |mut state: ChatState| {
//!     Box::pin(async move {
//!         state.transcript.push("hello".to_string());
//!         Ok(state)
//!     })
//! });
//!
//! graph.add_edge(START, "reply");
//! graph.add_edge("reply", END);
//!
//! let compiled = graph.compile()?;
//! let result = compiled.invoke(ChatState::default()).await?;
//! ```

pub mod builder;
pub mod compiled;
pub mod error;
pub mod graph;
pub mod llm;
pub mod messages;
pub mod tool;

pub use builder::StateGraph;
pub use compiled::CompiledGraph;
pub use dialogue_checkpoint::CheckpointConfig;
pub use error::{GraphError, Result};
pub use graph::{Edge, Graph, NodeExecutor, NodeId, NodeSpec, RouterFn, END, START};
pub use messages::{Message, MessageRole};
pub use tool::{Tool, ToolCall, ToolCallResult, ToolDefinition, ToolError, ToolOutput, ToolRegistry};
