//! Agent facade.
//!
//! [`Recommender`] compiles the graph once at construction (fail-fast: a
//! structural error refuses to start, never surfaces mid-conversation) and
//! exposes one operation: feed a user message into a conversation thread
//! and get the assistant's reply back.

use crate::error::Result;
use crate::nodes::{build_graph, AgentCore};
use crate::prompts;
use crate::state::ConversationState;
use dialogue_checkpoint::{CheckpointConfig, CheckpointSaver};
use dialogue_graph::llm::ChatModel;
use dialogue_graph::{CompiledGraph, Message, MessageRole, ToolRegistry};
use std::sync::Arc;
use tracing::info;

/// The conversational recommendation agent.
///
/// One instance serves any number of conversation threads; per-thread state
/// lives in the checkpoint store, not in the agent.
pub struct Recommender {
    graph: CompiledGraph<ConversationState>,
}

impl Recommender {
    /// Build the agent from its collaborators.
    ///
    /// Fails only if the graph structure is invalid, which is a programming
    /// error surfaced at startup.
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        checkpointer: Arc<dyn CheckpointSaver>,
    ) -> Result<Self> {
        let core = Arc::new(AgentCore::new(model, Arc::new(tools)));
        let graph = build_graph(core)?.with_checkpointer(checkpointer);
        Ok(Self { graph })
    }

    /// Run one conversation turn.
    ///
    /// Loads the thread's state (or starts fresh), appends the user
    /// message, drives the graph to the end of the turn, persists the
    /// resulting state, and returns the assistant's reply.
    pub async fn respond(&self, thread_id: &str, user_text: &str) -> Result<String> {
        let config = CheckpointConfig::new(thread_id);

        let mut state = self
            .graph
            .load_state(&config)
            .await?
            .unwrap_or_default();
        if state.messages.is_empty() {
            info!(thread_id, "starting new conversation");
        }

        state.push_message(Message::human(user_text));
        let state = self.graph.invoke_with_config(state, &config).await?;

        // A pending tool request is not a reply; skip it if the turn was
        // cut short by misconfiguration.
        let reply = state
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant && !m.is_tool_request())
            .map(|m| m.content.clone())
            .unwrap_or_else(|| prompts::GENERIC_APOLOGY.to_string());
        Ok(reply)
    }

    /// Inspect a thread's persisted state without running a turn.
    pub async fn state(&self, thread_id: &str) -> Result<Option<ConversationState>> {
        let config = CheckpointConfig::new(thread_id);
        Ok(self.graph.load_state(&config).await?)
    }
}
