//! Core graph data structures.
//!
//! A graph is a set of named nodes (async state transformers), edges
//! (direct or conditional transitions), and an entry point. The structure
//! here is built through [`StateGraph`](crate::StateGraph) and executed by
//! [`CompiledGraph`](crate::CompiledGraph).
//!
//! # Structure
//!
//! ```text
//! START ──(entry router)──► node ──► node ──► ... ──► END
//! ```
//!
//! Every node has exactly one outgoing transition per turn: either a
//! [`Edge::Direct`] edge, or a [`Edge::Conditional`] edge whose router
//! inspects the state and names the next node (or [`END`]). The branch map
//! on conditional edges declares every target the router may return; it is
//! checked at compile time so a bad route is a startup error, not a
//! mid-conversation surprise.

use crate::error::Result;
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::sync::Arc;

/// Node identifier - unique name for each node in the graph.
pub type NodeId = String;

/// Virtual entry point of the graph. Does not execute any logic; its
/// outgoing edge decides the first real node of a turn.
pub const START: &str = "__start__";

/// Virtual exit point of the graph. Routing to `END` completes the turn.
pub const END: &str = "__end__";

/// Async node executor: consumes the state, returns the transformed state.
pub type NodeExecutor<S> = Arc<dyn Fn(S) -> BoxFuture<'static, Result<S>> + Send + Sync>;

/// Routing function for conditional edges: inspects the state and names the
/// next node (or [`END`]). Must be pure - no side effects.
pub type RouterFn<S> = Arc<dyn Fn(&S) -> NodeId + Send + Sync>;

/// A transition out of a node.
pub enum Edge<S> {
    /// Unconditional transition to a specific node.
    Direct(NodeId),

    /// Dynamic transition: the router picks the target from the state.
    Conditional {
        /// Decision function evaluated against the current state
        router: RouterFn<S>,
        /// Every target the router may return, keyed by branch label.
        /// Used for compile-time validation.
        branches: HashMap<String, NodeId>,
    },
}

impl<S> Clone for Edge<S> {
    fn clone(&self) -> Self {
        match self {
            Edge::Direct(to) => Edge::Direct(to.clone()),
            Edge::Conditional { router, branches } => Edge::Conditional {
                router: Arc::clone(router),
                branches: branches.clone(),
            },
        }
    }
}

impl<S> std::fmt::Debug for Edge<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edge::Direct(to) => f.debug_tuple("Direct").field(to).finish(),
            Edge::Conditional { branches, .. } => f
                .debug_struct("Conditional")
                .field("router", &"<function>")
                .field("branches", branches)
                .finish(),
        }
    }
}

/// Node definition: a name plus its executor.
pub struct NodeSpec<S> {
    /// Node name (matches its key in the graph)
    pub name: NodeId,
    /// Async function that transforms the state
    pub executor: NodeExecutor<S>,
}

impl<S> Clone for NodeSpec<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<S> std::fmt::Debug for NodeSpec<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeSpec")
            .field("name", &self.name)
            .field("executor", &"<function>")
            .finish()
    }
}

/// The graph structure: nodes, edges, entry point.
///
/// Built through [`StateGraph`](crate::StateGraph); validated before
/// compilation.
#[derive(Debug)]
pub struct Graph<S> {
    /// All nodes, keyed by id
    pub nodes: HashMap<NodeId, NodeSpec<S>>,
    /// Outgoing transition per node (including [`START`])
    pub edges: HashMap<NodeId, Edge<S>>,
}

impl<S> Default for Graph<S> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
        }
    }
}

impl<S> Graph<S> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Replaces any previous node with the same id.
    pub fn add_node(&mut self, id: NodeId, spec: NodeSpec<S>) {
        self.nodes.insert(id, spec);
    }

    /// Set the outgoing transition for a node. A node has exactly one
    /// transition; adding a second replaces the first.
    pub fn add_edge(&mut self, from: NodeId, edge: Edge<S>) {
        self.edges.insert(from, edge);
    }

    /// Validate the graph structure.
    ///
    /// Checks:
    /// - [`START`] has an outgoing edge
    /// - every edge target (direct, and every conditional branch) is [`END`]
    ///   or an existing node
    /// - every node has an outgoing edge (a node with nowhere to go would
    ///   strand the turn)
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.edges.contains_key(START) {
            return Err(format!("no edge out of {START}: the graph has no entry"));
        }

        let target_ok = |t: &str| t == END || self.nodes.contains_key(t);

        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(format!("edge from unknown node '{from}'"));
            }
            match edge {
                Edge::Direct(to) => {
                    if !target_ok(to) {
                        return Err(format!("edge '{from}' -> '{to}': target does not exist"));
                    }
                }
                Edge::Conditional { branches, .. } => {
                    for (label, to) in branches {
                        if !target_ok(to) {
                            return Err(format!(
                                "conditional edge '{from}' branch '{label}' -> '{to}': target does not exist"
                            ));
                        }
                    }
                }
            }
        }

        for id in self.nodes.keys() {
            if !self.edges.contains_key(id) {
                return Err(format!("node '{id}' has no outgoing edge"));
            }
        }

        Ok(())
    }
}
