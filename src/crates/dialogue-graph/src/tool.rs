//! Tool calling: definitions, calls, results, and the registry.
//!
//! Tools are read-only capabilities the model may request during a turn.
//! The [`ToolRegistry`] executes requested calls and always produces a
//! [`ToolCallResult`]; executor failures become structured error payloads in
//! the conversation, never propagated errors, so the model can read the
//! failure and adjust.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors a tool executor can raise. The registry converts these into
/// error payloads; they never cross the registry boundary.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The arguments did not match the tool's schema.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool ran but could not produce a result.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

/// Schema advertised to the model for one tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name the model calls it by
    pub name: String,
    /// What the tool does, for the model's benefit
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: Value,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call id, echoed back in the result
    pub id: String,
    /// Name of the requested tool
    pub name: String,
    /// Arguments object
    pub args: Value,
}

/// Outcome of executing one tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolOutput {
    /// The tool produced a result.
    Success { content: Value },
    /// The tool failed; the message is surfaced to the model.
    Error { error: String },
}

/// A completed tool call: the request id and name plus its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub id: String,
    pub name: String,
    pub output: ToolOutput,
}

impl ToolCallResult {
    /// Render the output as the JSON payload of a tool message.
    pub fn content(&self) -> Value {
        match &self.output {
            ToolOutput::Success { content } => content.clone(),
            ToolOutput::Error { error } => json!({ "error": error }),
        }
    }
}

type ToolExecutor =
    Arc<dyn Fn(Value) -> BoxFuture<'static, std::result::Result<Value, ToolError>> + Send + Sync>;

/// An executable tool: definition plus its async executor.
#[derive(Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object
    pub input_schema: Value,
    executor: ToolExecutor,
}

impl Tool {
    /// Build a tool from its schema and executor.
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        executor: F,
    ) -> Self
    where
        F: Fn(Value) -> BoxFuture<'static, std::result::Result<Value, ToolError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            executor: Arc::new(executor),
        }
    }

    /// The schema advertised to the model.
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.input_schema.clone(),
        }
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Registry of the tools available in a turn.
///
/// Execution never fails at the registry boundary: unknown tools and
/// executor errors become [`ToolOutput::Error`] results the model can read.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Replaces any previous tool with the same name.
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// True when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Names of all registered tools.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Definitions of all registered tools, for the model request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(Tool::definition).collect()
    }

    /// Execute one requested call.
    ///
    /// Unknown tools and executor failures are returned as
    /// [`ToolOutput::Error`]; the conversation continues either way.
    pub async fn execute_tool_call(&self, call: &ToolCall) -> ToolCallResult {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "requested tool is not registered");
            return ToolCallResult {
                id: call.id.clone(),
                name: call.name.clone(),
                output: ToolOutput::Error {
                    error: format!("unknown tool '{}'", call.name),
                },
            };
        };

        debug!(tool = %call.name, call_id = %call.id, "executing tool call");
        let output = match (tool.executor)(call.args.clone()).await {
            Ok(content) => ToolOutput::Success { content },
            Err(err) => {
                warn!(tool = %call.name, error = %err, "tool execution failed");
                ToolOutput::Error {
                    error: err.to_string(),
                }
            }
        };

        ToolCallResult {
            id: call.id.clone(),
            name: call.name.clone(),
            output,
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tool_names())
            .finish()
    }
}
