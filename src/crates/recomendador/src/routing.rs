//! Routing decisions.
//!
//! Pure functions from [`ConversationState`] to the next node name. Any
//! state a router cannot classify routes to [`END`]: when routing goes
//! wrong the safe action is to terminate the turn, not to guess.

use crate::state::{BookRecord, ConversationState};
use dialogue_graph::{MessageRole, NodeId, END};
use serde_json::Value;
use tracing::{info, warn};

/// Node names.
pub const NODE_LLM: &str = "llm";
pub const NODE_TOOLS: &str = "tools";
pub const NODE_GATHER_PREFERENCES: &str = "gather_preferences";
pub const NODE_PROCESS_USER_RESPONSE: &str = "process_user_response";
pub const NODE_GENERATE_RECOMMENDATIONS: &str = "generate_recommendations";
pub const NODE_GENERATE_EXPLANATIONS: &str = "generate_explanations";
pub const NODE_FORMAT_OUTPUT: &str = "format_output";

/// Entry router: pick the first node of the turn from the last message.
///
/// - empty log: bootstrap the first assistant turn via the model
/// - user message: extract preferences first
/// - tool result: let the model interpret it
/// - assistant or system message: terminate; every node that appends an
///   assistant message already owns its outgoing edge, so landing here
///   means the turn is done
pub fn route_entry(state: &ConversationState) -> NodeId {
    let Some(last) = state.last_message() else {
        info!("entry: empty log, bootstrapping via model");
        return NODE_LLM.to_string();
    };

    match last.role {
        MessageRole::Human => NODE_PROCESS_USER_RESPONSE.to_string(),
        MessageRole::Tool => NODE_LLM.to_string(),
        MessageRole::Assistant | MessageRole::System => {
            info!(role = ?last.role, "entry: nothing to do, ending turn");
            END.to_string()
        }
    }
}

/// Post-model router: decide what follows the model's reply.
///
/// Evaluated in order: tool request, missing preferences, pending search
/// results, plain conversational reply.
pub fn route_after_llm(state: &ConversationState, tools_available: bool) -> NodeId {
    let Some(last) = state.last_message() else {
        warn!("post-model routing with empty log");
        return END.to_string();
    };

    if last.role != MessageRole::Assistant {
        warn!(role = ?last.role, "post-model routing expected an assistant message, ending turn");
        return END.to_string();
    }

    if last.is_tool_request() {
        if tools_available {
            return NODE_TOOLS.to_string();
        }
        warn!("model requested tools but none are registered, ending turn");
        return END.to_string();
    }

    if !state.preferences.contains(crate::state::PREFERRED_GENRES) {
        info!("preferences still missing, gathering");
        return NODE_GATHER_PREFERENCES.to_string();
    }

    // The model just replied to a search result: if any valid records came
    // back, move on to recommendations. Otherwise the model's own reply
    // already told the user the search came up empty.
    if let Some(prev) = state.penultimate_message() {
        if prev.role == MessageRole::Tool
            && prev.name.as_deref() == Some(crate::catalog::SEARCH_BOOKS)
        {
            let valid = serde_json::from_str::<Value>(&prev.content)
                .map(|payload| BookRecord::parse_results(&payload))
                .unwrap_or_default();
            if !valid.is_empty() {
                return NODE_GENERATE_RECOMMENDATIONS.to_string();
            }
            info!("search produced no usable records, ending turn");
            return END.to_string();
        }
    }

    END.to_string()
}

/// Post-recommendation router: explain the picks, or go straight to
/// formatting when the recommendation step already emitted its message.
pub fn route_after_recommendations(state: &ConversationState) -> NodeId {
    use crate::state::RecommendationOutcome::*;

    match state.outcome {
        Some(MissingPreferences) | Some(NoResults) => NODE_FORMAT_OUTPUT.to_string(),
        _ if !state.recommendations.is_empty() => NODE_GENERATE_EXPLANATIONS.to_string(),
        _ => NODE_FORMAT_OUTPUT.to_string(),
    }
}
