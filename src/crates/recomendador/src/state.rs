//! Conversation state.
//!
//! [`ConversationState`] is the record that flows through the routing graph:
//! the append-only message log plus the fields derived from it (preferences,
//! search results, recommendations, explanations). The whole record
//! serializes with serde so it can ride inside a checkpoint.

use dialogue_graph::{Message, MessageRole};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Preference key holding the user's preferred genres.
pub const PREFERRED_GENRES: &str = "preferred_genres";

/// Preference key holding the user's liked authors.
pub const LIKED_AUTHORS: &str = "liked_authors";

/// Extracted user preferences: an open-keyed map from preference name to a
/// string or list of strings.
///
/// Keys are open because the extraction model may surface anything
/// ("disliked_genres", "mentioned_books"); the agent itself only interprets
/// [`PREFERRED_GENRES`] and [`LIKED_AUTHORS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Preferences {
    entries: BTreeMap<String, Value>,
}

impl Preferences {
    /// True when no preferences are known.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a raw preference value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// True when the key is present (pruning guarantees a non-falsy value).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Shallow-merge extracted updates over the current map: new values win
    /// on key collision, then falsy values are pruned.
    pub fn merge(&mut self, updates: Map<String, Value>) {
        for (key, value) in updates {
            self.entries.insert(key, value);
        }
        self.entries.retain(|_, v| !is_falsy(v));
    }

    /// Preferred genres normalized to a list of strings.
    ///
    /// A bare string becomes a one-element list; non-string list items and
    /// values of any other shape are discarded.
    pub fn preferred_genres(&self) -> Vec<String> {
        normalize_string_list(self.entries.get(PREFERRED_GENRES))
    }

    /// Liked authors, normalized the same way as genres.
    pub fn liked_authors(&self) -> Vec<String> {
        normalize_string_list(self.entries.get(LIKED_AUTHORS))
    }

    /// The raw map as a JSON object, for embedding in prompts.
    pub fn as_json(&self) -> Value {
        Value::Object(self.entries.clone().into_iter().collect())
    }
}

fn normalize_string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

/// One validated book record from a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

impl BookRecord {
    /// Parse a search tool payload into validated records.
    ///
    /// The payload is expected to be a JSON array; entries carrying an
    /// `error` or `not_found` marker, non-objects, and objects that do not
    /// deserialize into a record are dropped. Anything that is not an array
    /// yields no records.
    pub fn parse_results(payload: &Value) -> Vec<BookRecord> {
        let Some(items) = payload.as_array() else {
            return Vec::new();
        };

        items
            .iter()
            .filter(|item| {
                item.is_object()
                    && item.get("error").is_none()
                    && item.get("not_found").is_none()
            })
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    }
}

/// Why the recommendation step ended the way it did.
///
/// Carried on the state so downstream routing reads an explicit tag instead
/// of matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationOutcome {
    /// No preferences were known; the user was asked for more.
    MissingPreferences,
    /// No usable search results were available.
    NoResults,
    /// Recommendations were selected.
    Selected,
}

/// The full per-conversation state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Append-only conversation log.
    pub messages: Vec<Message>,
    /// Extracted user preferences.
    #[serde(default)]
    pub preferences: Preferences,
    /// Most recent validated search results.
    #[serde(default)]
    pub search_results: Vec<BookRecord>,
    /// At most 3 records drawn from `search_results`.
    #[serde(default)]
    pub recommendations: Vec<BookRecord>,
    /// Stringified record id -> short justification.
    #[serde(default)]
    pub explanations: BTreeMap<String, String>,
    /// Tag left by the recommendation step for downstream routing.
    #[serde(default)]
    pub outcome: Option<RecommendationOutcome>,
}

impl ConversationState {
    /// Append a message to the log.
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// The second-to-last message, if any.
    pub fn penultimate_message(&self) -> Option<&Message> {
        self.messages.len().checked_sub(2).map(|i| &self.messages[i])
    }

    /// The most recent assistant message, scanning backwards.
    pub fn last_assistant_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
    }

    /// Validated records from the most recent search tool result, scanning
    /// backwards through the log. Returns an empty list when no search ran
    /// or every entry carried an error marker.
    pub fn latest_search_records(&self) -> Vec<BookRecord> {
        for msg in self.messages.iter().rev() {
            if msg.role == MessageRole::Tool
                && msg.name.as_deref() == Some(crate::catalog::SEARCH_BOOKS)
                && !msg.content.is_empty()
            {
                if let Ok(payload) = serde_json::from_str::<Value>(&msg.content) {
                    let records = BookRecord::parse_results(&payload);
                    if !records.is_empty() {
                        return records;
                    }
                }
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_merge_new_values_win() {
        let mut prefs = Preferences::default();
        prefs.merge(obj(json!({"preferred_genres": ["Fantasía"]})));
        prefs.merge(obj(json!({"preferred_genres": ["Ciencia Ficción"]})));

        assert_eq!(prefs.preferred_genres(), vec!["Ciencia Ficción"]);
    }

    #[test]
    fn test_merge_is_order_independent_for_distinct_keys() {
        let mut a = Preferences::default();
        a.merge(obj(json!({"preferred_genres": ["Fantasía"]})));
        a.merge(obj(json!({"liked_authors": ["Sanderson"]})));

        let mut b = Preferences::default();
        b.merge(obj(json!({"liked_authors": ["Sanderson"]})));
        b.merge(obj(json!({"preferred_genres": ["Fantasía"]})));

        assert_eq!(a, b);
    }

    #[test]
    fn test_merge_prunes_falsy_values() {
        let mut prefs = Preferences::default();
        prefs.merge(obj(json!({
            "preferred_genres": ["Terror"],
            "liked_authors": [],
            "notes": "",
            "other": null
        })));

        assert!(prefs.contains("preferred_genres"));
        assert!(!prefs.contains("liked_authors"));
        assert!(!prefs.contains("notes"));
        assert!(!prefs.contains("other"));
    }

    #[test]
    fn test_merge_can_remove_a_key_with_falsy_update() {
        let mut prefs = Preferences::default();
        prefs.merge(obj(json!({"liked_authors": ["King"]})));
        prefs.merge(obj(json!({"liked_authors": []})));

        assert!(!prefs.contains("liked_authors"));
    }

    #[test]
    fn test_preferred_genres_normalization() {
        let mut prefs = Preferences::default();
        prefs.merge(obj(json!({"preferred_genres": "Fantasía"})));
        assert_eq!(prefs.preferred_genres(), vec!["Fantasía"]);

        prefs.merge(obj(json!({"preferred_genres": ["Terror", 42, "Drama"]})));
        assert_eq!(prefs.preferred_genres(), vec!["Terror", "Drama"]);

        prefs.merge(obj(json!({"preferred_genres": {"weird": true}})));
        assert!(prefs.preferred_genres().is_empty());
    }

    #[test]
    fn test_parse_results_drops_markers_and_garbage() {
        let payload = json!([
            {"id": 1, "title": "Dune", "author": "Herbert", "genre": "Ciencia Ficción", "average_rating": 4.5},
            {"error": "backend down"},
            {"not_found": "no such book"},
            "not an object",
            {"id": 2, "title": "Mistborn", "author": "Sanderson"}
        ]);

        let records = BookRecord::parse_results(&payload);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Dune");
        assert_eq!(records[1].genre, None);
    }

    #[test]
    fn test_parse_results_non_array_is_empty() {
        assert!(BookRecord::parse_results(&json!({"error": "x"})).is_empty());
        assert!(BookRecord::parse_results(&json!("texto")).is_empty());
    }

    #[test]
    fn test_latest_search_records_scans_backwards() {
        let mut state = ConversationState::default();
        state.push_message(
            Message::tool(
                json!([{"id": 1, "title": "Old", "author": "A"}]).to_string(),
                "call-1",
            )
            .with_name(crate::catalog::SEARCH_BOOKS),
        );
        state.push_message(Message::assistant("ok"));
        state.push_message(
            Message::tool(
                json!([{"id": 2, "title": "New", "author": "B"}]).to_string(),
                "call-2",
            )
            .with_name(crate::catalog::SEARCH_BOOKS),
        );

        let records = state.latest_search_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "New");
    }

    #[test]
    fn test_latest_search_records_ignores_other_tools() {
        let mut state = ConversationState::default();
        state.push_message(
            Message::tool(json!({"id": 1, "title": "X"}).to_string(), "call-1")
                .with_name(crate::catalog::GET_BOOK_DETAILS),
        );

        assert!(state.latest_search_records().is_empty());
    }

    #[test]
    fn test_last_assistant_message_skips_later_entries() {
        let mut state = ConversationState::default();
        state.push_message(Message::assistant("primera"));
        state.push_message(Message::tool("[]", "call-1"));
        state.push_message(Message::human("hola"));

        assert_eq!(state.last_assistant_message().unwrap().content, "primera");
    }

    #[test]
    fn test_state_serde_round_trip() {
        let mut state = ConversationState::default();
        state.push_message(Message::human("hola"));
        state
            .preferences
            .merge(obj(json!({"preferred_genres": ["Fantasía"]})));
        state.outcome = Some(RecommendationOutcome::Selected);

        let value = serde_json::to_value(&state).unwrap();
        let back: ConversationState = serde_json::from_value(value).unwrap();

        assert_eq!(back.messages.len(), 1);
        assert_eq!(back.preferences.preferred_genres(), vec!["Fantasía"]);
        assert_eq!(back.outcome, Some(RecommendationOutcome::Selected));
    }

    fn pref_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (-3i64..3).prop_map(|n| json!(n)),
            "[a-z]{0,5}".prop_map(Value::String),
            proptest::collection::vec("[a-z]{1,4}".prop_map(Value::String), 0..3)
                .prop_map(Value::Array),
        ]
    }

    proptest! {
        #[test]
        fn prop_merge_keeps_exactly_the_non_falsy_entries(
            updates in proptest::collection::btree_map("[a-z]{1,8}", pref_value(), 0..8),
        ) {
            let mut prefs = Preferences::default();
            prefs.merge(updates.clone().into_iter().collect());

            for (key, value) in &updates {
                prop_assert_eq!(prefs.contains(key), !is_falsy(value));
            }
            prop_assert_eq!(
                prefs.is_empty(),
                updates.values().all(is_falsy)
            );
        }
    }
}
