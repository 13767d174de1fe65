//! Model call boundary.
//!
//! [`ChatModel`] is the single seam between graph nodes and a language
//! model. Nodes hold it as `Arc<dyn ChatModel>`; production code plugs in an
//! HTTP client, tests plug in a scripted stand-in.

use crate::error::Result;
use crate::messages::Message;
use crate::tool::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat completion request: the conversation so far plus the tools the
/// model may call.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    /// Tools the model may request; empty means tool calling is disabled
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Build a plain request with no tools.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            tools: Vec::new(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Advertise tools to the model.
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// The assistant message, possibly carrying tool calls
    pub message: Message,
    pub usage: Option<UsageMetadata>,
}

/// The model call boundary.
///
/// Implementations must be safe to share across turns and threads.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one chat completion.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}
