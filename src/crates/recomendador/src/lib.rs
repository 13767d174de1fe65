//! # recomendador - Conversational Book Recommendations
//!
//! A turn-based recommendation agent built on [`dialogue_graph`]: each user
//! message drives one pass through a routing graph that extracts reading
//! preferences, lets the model search a book catalog through tools, narrows
//! the results to at most three recommendations, explains each pick, and
//! renders the final reply.
//!
//! ## Turn Flow
//!
//! ```text
//!            ┌─────────────► process_user_response ──► llm
//! START ─────┤                                          │
//!            └─(tool result)──────────────────────────► llm
//!                                                       │
//!              ┌────────── tools ◄──(tool call)─────────┤
//!              │             │                          │
//!              └─────────────┘        gather_preferences┤──► END
//!                                                       │
//!                                 generate_recommendations
//!                                                       │
//!                            generate_explanations ─► format_output ─► END
//! ```
//!
//! State is checkpointed per conversation thread, so a dialogue resumes
//! across independent invocations of [`Recommender::respond`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use recomendador::{catalog_tools, MemoryCatalog, Recommender};
//! use dialogue_checkpoint::InMemoryCheckpointSaver;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(MemoryCatalog::with_sample_books());
//! let registry = catalog_tools(catalog);
//! let saver = Arc::new(InMemoryCheckpointSaver::new());
//!
//! let agent = Recommender::new(model, registry, saver)?;
//! let reply = agent.respond("thread-1", "Me encanta la ciencia ficción").await?;
//! ```

pub mod agent;
pub mod catalog;
pub mod error;
pub mod nodes;
pub mod prompts;
pub mod recommend;
pub mod routing;
pub mod state;

pub use agent::Recommender;
pub use catalog::{catalog_tools, BookCatalog, BookDetails, CatalogError, MemoryCatalog};
pub use error::{AgentError, Result};
pub use state::{BookRecord, ConversationState, Preferences, RecommendationOutcome};
