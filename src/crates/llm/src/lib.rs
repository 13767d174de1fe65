//! # llm - Chat Model Clients
//!
//! HTTP clients implementing the [`ChatModel`](dialogue_graph::llm::ChatModel)
//! boundary from `dialogue-graph`.
//!
//! The only provider here is [`OpenAiClient`], which speaks the
//! OpenAI-compatible `/chat/completions` wire format with tool calling. That
//! format is also served by many self-hosted gateways, so pointing
//! [`RemoteLlmConfig::base_url`] elsewhere covers most deployments.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::{OpenAiClient, RemoteLlmConfig};
//!
//! let config = RemoteLlmConfig::from_env(
//!     "OPENAI_API_KEY",
//!     "https://api.openai.com/v1",
//!     "gpt-4o-mini",
//! )?;
//! let client = OpenAiClient::new(config)?;
//! ```

pub mod config;
pub mod error;
pub mod openai;

pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use openai::OpenAiClient;
