//! Turn execution over a validated graph.
//!
//! [`CompiledGraph`] walks one dialogue turn: the edge out of
//! [`START`] picks the first node, each node's outgoing edge picks the next,
//! and reaching [`END`] completes the turn. Execution is sequential and
//! single-path; a step limit aborts the turn if routing cycles.
//!
//! With a checkpointer attached, [`load_state`](CompiledGraph::load_state)
//! restores a thread's snapshot and
//! [`invoke_with_config`](CompiledGraph::invoke_with_config) persists the
//! state after the turn completes.

use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, NodeId, END, START};
use dialogue_checkpoint::{Checkpoint, CheckpointConfig, CheckpointSaver};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Default maximum node executions per turn.
const DEFAULT_STEP_LIMIT: usize = 25;

/// An executable, validated conversation graph.
pub struct CompiledGraph<S> {
    graph: Graph<S>,
    checkpointer: Option<Arc<dyn CheckpointSaver>>,
    step_limit: usize,
}

impl<S> CompiledGraph<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(graph: Graph<S>) -> Self {
        Self {
            graph,
            checkpointer: None,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }

    /// Attach a checkpoint store for per-thread persistence.
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn CheckpointSaver>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    /// Override the per-turn step limit.
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = limit;
        self
    }

    /// Execute one turn: run from [`START`] to [`END`] and return the final
    /// state. Does not touch the checkpointer.
    pub async fn invoke(&self, state: S) -> Result<S> {
        let mut state = state;
        let mut current = self.next_target(START, &state)?;
        let mut steps = 0usize;

        while current != END {
            if steps >= self.step_limit {
                return Err(GraphError::StepLimit(self.step_limit));
            }
            steps += 1;

            let spec = self
                .graph
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::MissingNode(current.clone()))?;

            debug!(node = %current, step = steps, "executing node");
            state = (spec.executor)(state).await.map_err(|err| match err {
                e @ GraphError::StepLimit(_) => e,
                e => GraphError::NodeExecution {
                    node: current.clone(),
                    message: e.to_string(),
                },
            })?;

            current = self.next_target(&current, &state)?;
        }

        debug!(steps, "turn complete");
        Ok(state)
    }

    /// Resolve the transition out of `from` against the current state.
    fn next_target(&self, from: &str, state: &S) -> Result<NodeId> {
        let edge = self
            .graph
            .edges
            .get(from)
            .ok_or_else(|| GraphError::MissingNode(from.to_string()))?;

        match edge {
            Edge::Direct(to) => Ok(to.clone()),
            Edge::Conditional { router, branches } => {
                let target = router(state);
                debug!(node = %from, target = %target, "routing decision");
                // Branch maps are validated at compile time; the router's
                // answer still has to land inside them.
                let known = target == END
                    || branches.values().any(|t| *t == target)
                    || branches.contains_key(&target);
                if !known {
                    return Err(GraphError::InvalidRoute {
                        node: from.to_string(),
                        target,
                    });
                }
                // Branch labels may differ from node ids; translate if the
                // router returned a label.
                if let Some(to) = branches.get(&target) {
                    Ok(to.clone())
                } else {
                    Ok(target)
                }
            }
        }
    }
}

impl<S> CompiledGraph<S>
where
    S: Clone + Send + Sync + Serialize + DeserializeOwned + 'static,
{
    /// Load the saved state for a thread, if any.
    ///
    /// Returns `Ok(None)` when the thread has no snapshot or no checkpointer
    /// is attached.
    pub async fn load_state(&self, config: &CheckpointConfig) -> Result<Option<S>> {
        let Some(checkpointer) = &self.checkpointer else {
            return Ok(None);
        };
        match checkpointer.load(&config.thread_id).await? {
            Some(checkpoint) => {
                let state = serde_json::from_value(checkpoint.state)?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    /// Execute one turn and persist the resulting state under the thread id
    /// in `config`.
    ///
    /// The snapshot is written only after the turn completes; a failed turn
    /// leaves the previous snapshot untouched.
    pub async fn invoke_with_config(&self, state: S, config: &CheckpointConfig) -> Result<S> {
        let state = self.invoke(state).await?;

        if let Some(checkpointer) = &self.checkpointer {
            let snapshot = serde_json::to_value(&state)?;
            checkpointer
                .save(Checkpoint::new(&config.thread_id, snapshot))
                .await?;
        }

        Ok(state)
    }
}
