//! Graph nodes and graph assembly.
//!
//! [`AgentCore`] holds the injected collaborators (chat model, tool
//! registry) and implements each node as an async method on the
//! [`ConversationState`]. [`build_graph`] wires the nodes and routers into
//! an executable graph.
//!
//! Failure policy: model and tool failures are recovered inside the node
//! that hit them. A node returning `Err` would abort the whole turn, so the
//! only errors that escape a node here are structural ones.

use crate::prompts;
use crate::recommend::select_recommendations;
use crate::routing::{
    route_after_llm, route_after_recommendations, route_entry, NODE_FORMAT_OUTPUT,
    NODE_GATHER_PREFERENCES, NODE_GENERATE_EXPLANATIONS, NODE_GENERATE_RECOMMENDATIONS, NODE_LLM,
    NODE_PROCESS_USER_RESPONSE, NODE_TOOLS,
};
use crate::state::{ConversationState, RecommendationOutcome};
use dialogue_graph::llm::{ChatModel, ChatRequest};
use dialogue_graph::{
    CompiledGraph, Message, MessageRole, Result, StateGraph, ToolRegistry, END, START,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Sampling temperature for every model call. Recommendations should be
/// reproducible, not creative.
const TEMPERATURE: f32 = 0.0;

/// The agent's collaborators plus its node implementations.
pub struct AgentCore {
    model: Arc<dyn ChatModel>,
    tools: Arc<ToolRegistry>,
}

impl AgentCore {
    pub fn new(model: Arc<dyn ChatModel>, tools: Arc<ToolRegistry>) -> Self {
        Self { model, tools }
    }

    /// Main model node: invoke the model with the full history and append
    /// its reply. A failed invocation is recovered into a fixed apology.
    pub async fn call_model(&self, mut state: ConversationState) -> Result<ConversationState> {
        let mut request =
            ChatRequest::new(state.messages.clone()).with_temperature(TEMPERATURE);
        if !self.tools.is_empty() {
            request = request.with_tools(self.tools.definitions());
        }

        match self.model.chat(request).await {
            Ok(response) => state.push_message(response.message),
            Err(e) => {
                warn!(error = %e, "model invocation failed, recovering with apology");
                state.push_message(Message::assistant(prompts::MODEL_FAILURE_APOLOGY));
            }
        }
        Ok(state)
    }

    /// Extract preference updates from the latest user message via a
    /// dedicated, tool-free model call.
    pub async fn process_user_response(
        &self,
        mut state: ConversationState,
    ) -> Result<ConversationState> {
        let Some(last) = state.last_message() else {
            warn!("no user message to process for preferences");
            return Ok(state);
        };
        if last.role != MessageRole::Human {
            warn!("no user message to process for preferences");
            return Ok(state);
        }

        let prompt = prompts::extraction_prompt(&state.preferences.as_json(), &last.content);
        let request =
            ChatRequest::new(vec![Message::human(prompt)]).with_temperature(TEMPERATURE);

        let content = match self.model.chat(request).await {
            Ok(response) => response.message.content,
            Err(e) => {
                warn!(error = %e, "preference extraction call failed, keeping current preferences");
                return Ok(state);
            }
        };

        let stripped = prompts::strip_json_fences(&content);
        if stripped.is_empty() || stripped == "{}" {
            return Ok(state);
        }

        match serde_json::from_str::<Value>(stripped) {
            Ok(Value::Object(updates)) => {
                state.preferences.merge(updates);
                info!(preferences = %state.preferences.as_json(), "updated preferences");
            }
            Ok(_) => {
                warn!("extraction output was valid JSON but not an object, keeping current preferences");
            }
            Err(e) => {
                warn!(error = %e, "failed to parse extraction output, keeping current preferences");
            }
        }
        Ok(state)
    }

    /// Execute every tool call from the last assistant message, appending
    /// one tool-result message per call.
    pub async fn execute_tools(&self, mut state: ConversationState) -> Result<ConversationState> {
        let calls = state
            .last_message()
            .filter(|m| m.is_tool_request())
            .map(|m| m.tool_calls.clone())
            .unwrap_or_default();

        if calls.is_empty() {
            warn!("tool node reached without a pending tool request");
            return Ok(state);
        }

        for call in calls {
            let result = self.tools.execute_tool_call(&call).await;
            state.push_message(
                Message::tool(result.content().to_string(), result.id).with_name(result.name),
            );
        }
        Ok(state)
    }

    /// Ask a clarifying question tailored to the missing preference fields.
    pub async fn gather_preferences(
        &self,
        mut state: ConversationState,
    ) -> Result<ConversationState> {
        let question = if state.preferences.preferred_genres().is_empty() {
            prompts::ASK_GENRES
        } else if state.preferences.liked_authors().is_empty() {
            prompts::ASK_AUTHORS
        } else {
            prompts::ASK_REFINEMENT
        };
        state.push_message(Message::assistant(question));
        Ok(state)
    }

    /// Select up to three recommendations from the latest valid search
    /// results, tagging the outcome for downstream routing.
    pub async fn generate_recommendations(
        &self,
        mut state: ConversationState,
    ) -> Result<ConversationState> {
        let records = state.latest_search_records();

        if state.preferences.is_empty() {
            warn!("cannot recommend without preferences");
            state.push_message(Message::assistant(prompts::MISSING_PREFERENCES_MESSAGE));
            state.outcome = Some(RecommendationOutcome::MissingPreferences);
            return Ok(state);
        }

        if records.is_empty() {
            warn!("cannot recommend without valid search results");
            state.push_message(Message::assistant(prompts::NO_RESULTS_MESSAGE));
            state.outcome = Some(RecommendationOutcome::NoResults);
            return Ok(state);
        }

        let recommendations =
            select_recommendations(&state.preferences.preferred_genres(), &records);
        info!(count = recommendations.len(), "selected recommendations");

        state.search_results = records;
        state.recommendations = recommendations;
        state.outcome = Some(RecommendationOutcome::Selected);
        Ok(state)
    }

    /// Produce one short justification per recommended book. A failed call
    /// substitutes a fixed fallback for that book only.
    pub async fn generate_explanations(
        &self,
        mut state: ConversationState,
    ) -> Result<ConversationState> {
        let mut explanations = std::collections::BTreeMap::new();
        let preferences = state.preferences.as_json();

        for book in &state.recommendations {
            let prompt = prompts::explanation_prompt(&preferences, book);
            let request =
                ChatRequest::new(vec![Message::human(prompt)]).with_temperature(TEMPERATURE);

            let explanation = match self.model.chat(request).await {
                Ok(response) => response.message.content.trim().to_string(),
                Err(e) => {
                    warn!(book_id = book.id, error = %e, "explanation call failed, using fallback");
                    prompts::EXPLANATION_FALLBACK.to_string()
                }
            };
            explanations.insert(book.id.to_string(), explanation);
        }

        info!(count = explanations.len(), "generated explanations");
        state.explanations = explanations;
        Ok(state)
    }

    /// Render the final user-facing message for the turn.
    pub async fn format_output(&self, mut state: ConversationState) -> Result<ConversationState> {
        if state.recommendations.is_empty() {
            match state.outcome {
                Some(RecommendationOutcome::MissingPreferences)
                | Some(RecommendationOutcome::NoResults) => {
                    // The tagged message is already the last entry in the
                    // log; re-emitting it would duplicate it.
                    return Ok(state);
                }
                _ => {
                    state.push_message(Message::assistant(prompts::GENERIC_APOLOGY));
                    return Ok(state);
                }
            }
        }

        let mut parts = vec![prompts::RECOMMENDATIONS_INTRO.to_string()];
        for book in &state.recommendations {
            let explanation = state
                .explanations
                .get(&book.id.to_string())
                .map(String::as_str)
                .unwrap_or(prompts::DEFAULT_EXPLANATION);
            let rating = book
                .average_rating
                .map(|r| format!(" (Rating: {r:.1}/5)"))
                .unwrap_or_default();

            parts.push(format!("\n- **{}** por {}{}:", book.title, book.author, rating));
            parts.push(format!("  *Por qué te podría gustar:* {explanation}"));
        }
        parts.push(prompts::RECOMMENDATIONS_CLOSING.to_string());

        state.push_message(Message::assistant(parts.join("\n")));
        Ok(state)
    }
}

type NodeFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = Result<ConversationState>> + Send>>;

macro_rules! node {
    ($core:expr, $method:ident) => {{
        let core = Arc::clone($core);
        move |state: ConversationState| -> NodeFuture {
            let core = Arc::clone(&core);
            Box::pin(async move { core.$method(state).await })
        }
    }};
}

/// Assemble and compile the conversation graph.
///
/// Structural problems (a misnamed branch target, a dangling node) surface
/// here at startup, never mid-turn.
pub fn build_graph(core: Arc<AgentCore>) -> Result<CompiledGraph<ConversationState>> {
    let tools_available = !core.tools.is_empty();
    let mut graph = StateGraph::new();

    graph.add_node(NODE_LLM, node!(&core, call_model));
    graph.add_node(NODE_PROCESS_USER_RESPONSE, node!(&core, process_user_response));
    graph.add_node(NODE_GATHER_PREFERENCES, node!(&core, gather_preferences));
    graph.add_node(NODE_GENERATE_RECOMMENDATIONS, node!(&core, generate_recommendations));
    graph.add_node(NODE_GENERATE_EXPLANATIONS, node!(&core, generate_explanations));
    graph.add_node(NODE_FORMAT_OUTPUT, node!(&core, format_output));
    if tools_available {
        graph.add_node(NODE_TOOLS, node!(&core, execute_tools));
    }

    let entry_branches: HashMap<String, String> = [
        (NODE_PROCESS_USER_RESPONSE, NODE_PROCESS_USER_RESPONSE),
        (NODE_LLM, NODE_LLM),
        (END, END),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    graph.add_conditional_edge(START, route_entry, entry_branches);

    let mut llm_branches: HashMap<String, String> = [
        (NODE_GATHER_PREFERENCES, NODE_GATHER_PREFERENCES),
        (NODE_GENERATE_RECOMMENDATIONS, NODE_GENERATE_RECOMMENDATIONS),
        (END, END),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    if tools_available {
        llm_branches.insert(NODE_TOOLS.to_string(), NODE_TOOLS.to_string());
    }
    graph.add_conditional_edge(
        NODE_LLM,
        move |state: &ConversationState| route_after_llm(state, tools_available),
        llm_branches,
    );

    let rec_branches: HashMap<String, String> = [
        (NODE_GENERATE_EXPLANATIONS, NODE_GENERATE_EXPLANATIONS),
        (NODE_FORMAT_OUTPUT, NODE_FORMAT_OUTPUT),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    graph.add_conditional_edge(
        NODE_GENERATE_RECOMMENDATIONS,
        route_after_recommendations,
        rec_branches,
    );

    graph.add_edge(NODE_PROCESS_USER_RESPONSE, NODE_LLM);
    graph.add_edge(NODE_GATHER_PREFERENCES, END);
    graph.add_edge(NODE_GENERATE_EXPLANATIONS, NODE_FORMAT_OUTPUT);
    graph.add_edge(NODE_FORMAT_OUTPUT, END);
    if tools_available {
        graph.add_edge(NODE_TOOLS, NODE_LLM);
    }

    graph.compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BookRecord;
    use async_trait::async_trait;
    use dialogue_graph::llm::ChatResponse;
    use dialogue_graph::GraphError;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted model: pops one canned step per chat call.
    struct ScriptedModel {
        script: Mutex<VecDeque<std::result::Result<Message, String>>>,
    }

    impl ScriptedModel {
        fn new(steps: Vec<std::result::Result<Message, String>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(steps.into()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
            let step = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .expect("scripted model ran out of steps");
            match step {
                Ok(message) => Ok(ChatResponse {
                    message,
                    usage: None,
                }),
                Err(reason) => Err(GraphError::Llm(reason)),
            }
        }
    }

    fn core_with(steps: Vec<std::result::Result<Message, String>>) -> AgentCore {
        AgentCore::new(ScriptedModel::new(steps), Arc::new(ToolRegistry::new()))
    }

    fn book(id: i64, title: &str, genre: &str) -> BookRecord {
        BookRecord {
            id,
            title: title.to_string(),
            author: "Autor".to_string(),
            genre: Some(genre.to_string()),
            average_rating: Some(4.0),
        }
    }

    #[tokio::test]
    async fn test_call_model_recovers_failure_with_apology() {
        let core = core_with(vec![Err("connection refused".to_string())]);
        let mut state = ConversationState::default();
        state.push_message(Message::human("hola"));

        let state = core.call_model(state).await.unwrap();
        let last = state.last_message().unwrap();
        assert_eq!(last.role, MessageRole::Assistant);
        assert_eq!(last.content, prompts::MODEL_FAILURE_APOLOGY);
    }

    #[tokio::test]
    async fn test_process_user_response_merges_extracted_preferences() {
        let core = core_with(vec![Ok(Message::assistant(
            "```json\n{\"preferred_genres\": [\"Ciencia Ficción\"]}\n```",
        ))]);
        let mut state = ConversationState::default();
        state.push_message(Message::human("Me gusta la ciencia ficción"));

        let state = core.process_user_response(state).await.unwrap();
        assert_eq!(
            state.preferences.preferred_genres(),
            vec!["Ciencia Ficción"]
        );
    }

    #[tokio::test]
    async fn test_process_user_response_parse_failure_keeps_preferences() {
        let core = core_with(vec![Ok(Message::assistant("esto no es JSON"))]);
        let mut state = ConversationState::default();
        state
            .preferences
            .merge(json!({"preferred_genres": ["Terror"]}).as_object().cloned().unwrap());
        state.push_message(Message::human("mmm"));

        let state = core.process_user_response(state).await.unwrap();
        assert_eq!(state.preferences.preferred_genres(), vec!["Terror"]);
    }

    #[tokio::test]
    async fn test_process_user_response_non_object_json_keeps_preferences() {
        let core = core_with(vec![Ok(Message::assistant("[1, 2, 3]"))]);
        let mut state = ConversationState::default();
        state.push_message(Message::human("hola"));

        let state = core.process_user_response(state).await.unwrap();
        assert!(state.preferences.is_empty());
    }

    #[tokio::test]
    async fn test_gather_preferences_priority_order() {
        let core = core_with(vec![]);

        let state = core
            .gather_preferences(ConversationState::default())
            .await
            .unwrap();
        assert_eq!(state.last_message().unwrap().content, prompts::ASK_GENRES);

        let mut state = ConversationState::default();
        state
            .preferences
            .merge(json!({"preferred_genres": ["Fantasía"]}).as_object().cloned().unwrap());
        let state = core.gather_preferences(state).await.unwrap();
        assert_eq!(state.last_message().unwrap().content, prompts::ASK_AUTHORS);

        let mut state = ConversationState::default();
        state.preferences.merge(
            json!({"preferred_genres": ["Fantasía"], "liked_authors": ["Sanderson"]})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let state = core.gather_preferences(state).await.unwrap();
        assert_eq!(state.last_message().unwrap().content, prompts::ASK_REFINEMENT);
    }

    #[tokio::test]
    async fn test_generate_recommendations_without_preferences() {
        let core = core_with(vec![]);
        let mut state = ConversationState::default();
        state.push_message(
            Message::tool(
                json!([{"id": 1, "title": "Dune", "author": "Herbert"}]).to_string(),
                "call-1",
            )
            .with_name(crate::catalog::SEARCH_BOOKS),
        );

        let state = core.generate_recommendations(state).await.unwrap();
        assert_eq!(state.outcome, Some(RecommendationOutcome::MissingPreferences));
        assert!(state.recommendations.is_empty());
        assert_eq!(
            state.last_message().unwrap().content,
            prompts::MISSING_PREFERENCES_MESSAGE
        );
    }

    #[tokio::test]
    async fn test_generate_recommendations_error_only_results() {
        let core = core_with(vec![]);
        let mut state = ConversationState::default();
        state
            .preferences
            .merge(json!({"preferred_genres": ["Fantasía"]}).as_object().cloned().unwrap());
        state.push_message(
            Message::tool(json!([{"error": "backend down"}]).to_string(), "call-1")
                .with_name(crate::catalog::SEARCH_BOOKS),
        );

        let state = core.generate_recommendations(state).await.unwrap();
        assert_eq!(state.outcome, Some(RecommendationOutcome::NoResults));
        assert!(state.recommendations.is_empty());
        assert_eq!(state.last_message().unwrap().content, prompts::NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn test_generate_recommendations_selects_and_normalizes() {
        let core = core_with(vec![]);
        let mut state = ConversationState::default();
        state
            .preferences
            .merge(json!({"preferred_genres": ["fantasía"]}).as_object().cloned().unwrap());
        state.push_message(
            Message::tool(
                json!([
                    {"id": 1, "title": "A", "author": "X", "genre": "Terror"},
                    {"id": 2, "title": "B", "author": "X", "genre": "Fantasía"},
                    {"error": "partial failure"},
                    {"id": 3, "title": "C", "author": "X", "genre": "Drama"}
                ])
                .to_string(),
                "call-1",
            )
            .with_name(crate::catalog::SEARCH_BOOKS),
        );

        let state = core.generate_recommendations(state).await.unwrap();
        assert_eq!(state.outcome, Some(RecommendationOutcome::Selected));
        // Error entry dropped from the normalized search results
        assert_eq!(state.search_results.len(), 3);
        let ids: Vec<i64> = state.recommendations.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[tokio::test]
    async fn test_generate_explanations_isolates_per_book_failure() {
        // Second explanation call fails; first and third succeed
        let core = core_with(vec![
            Ok(Message::assistant("Te encantará por su mundo.")),
            Err("timeout".to_string()),
            Ok(Message::assistant("Un clásico del género.")),
        ]);

        let mut state = ConversationState::default();
        state.recommendations = vec![
            book(1, "A", "Fantasía"),
            book(2, "B", "Fantasía"),
            book(3, "C", "Fantasía"),
        ];

        let state = core.generate_explanations(state).await.unwrap();
        assert_eq!(state.explanations["1"], "Te encantará por su mundo.");
        assert_eq!(state.explanations["2"], prompts::EXPLANATION_FALLBACK);
        assert_eq!(state.explanations["3"], "Un clásico del género.");
    }

    #[tokio::test]
    async fn test_format_output_reuses_tagged_message() {
        let core = core_with(vec![]);
        let mut state = ConversationState::default();
        state.push_message(Message::assistant(prompts::NO_RESULTS_MESSAGE));
        state.outcome = Some(RecommendationOutcome::NoResults);

        let before = state.messages.len();
        let state = core.format_output(state).await.unwrap();
        // No duplicate message appended
        assert_eq!(state.messages.len(), before);
        assert_eq!(state.last_message().unwrap().content, prompts::NO_RESULTS_MESSAGE);
    }

    #[tokio::test]
    async fn test_format_output_generic_apology() {
        let core = core_with(vec![]);
        let state = core
            .format_output(ConversationState::default())
            .await
            .unwrap();
        assert_eq!(state.last_message().unwrap().content, prompts::GENERIC_APOLOGY);
    }

    #[tokio::test]
    async fn test_format_output_renders_recommendations() {
        let core = core_with(vec![]);
        let mut state = ConversationState::default();
        state.recommendations = vec![book(1, "Dune", "Ciencia Ficción")];
        state
            .explanations
            .insert("1".to_string(), "Porque sí.".to_string());
        state.outcome = Some(RecommendationOutcome::Selected);

        let state = core.format_output(state).await.unwrap();
        let content = &state.last_message().unwrap().content;
        assert!(content.contains("Aquí tienes algunas recomendaciones"));
        assert!(content.contains("**Dune** por Autor (Rating: 4.0/5):"));
        assert!(content.contains("*Por qué te podría gustar:* Porque sí."));
        assert!(content.contains("¿Te gustaría obtener más detalles"));
    }

    #[tokio::test]
    async fn test_format_output_default_explanation() {
        let core = core_with(vec![]);
        let mut state = ConversationState::default();
        state.recommendations = vec![book(7, "Sin Explicar", "Drama")];

        let state = core.format_output(state).await.unwrap();
        assert!(state
            .last_message()
            .unwrap()
            .content
            .contains(prompts::DEFAULT_EXPLANATION));
    }

    #[test]
    fn test_build_graph_compiles_with_and_without_tools() {
        let core = Arc::new(core_with(vec![]));
        assert!(build_graph(core).is_ok());

        let registry = crate::catalog::catalog_tools(Arc::new(
            crate::catalog::MemoryCatalog::with_sample_books(),
        ));
        let core = Arc::new(AgentCore::new(
            ScriptedModel::new(vec![]),
            Arc::new(registry),
        ));
        assert!(build_graph(core).is_ok());
    }
}
