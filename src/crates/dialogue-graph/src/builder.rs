//! Graph builder API.
//!
//! [`StateGraph`] collects nodes and edges, then [`compile`](StateGraph::compile)s
//! them into an executable [`CompiledGraph`]. Compilation validates the
//! structure so routing mistakes fail at startup.

use crate::compiled::CompiledGraph;
use crate::error::{GraphError, Result};
use crate::graph::{Edge, Graph, NodeId, NodeSpec, RouterFn};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Builder for conversation graphs.
///
/// Generic over the state type `S` that flows through the nodes.
///
/// # Example
///
/// ```rust,ignore
/// let mut graph = StateGraph::new();
/// graph.add_node("greet", |state: MyState| Box::pin(async move { Ok(state) }));
/// graph.add_edge(START, "greet");
/// graph.add_edge("greet", END);
/// let compiled = graph.compile()?;
/// ```
pub struct StateGraph<S> {
    graph: Graph<S>,
}

impl<S> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            graph: Graph::new(),
        }
    }

    /// Add a node: a name plus an async function from state to state.
    ///
    /// The function receives the state by value and returns the transformed
    /// state. Registering a second node under the same name replaces the
    /// first.
    pub fn add_node<F>(&mut self, name: impl Into<NodeId>, executor: F) -> &mut Self
    where
        F: Fn(S) -> Pin<Box<dyn Future<Output = Result<S>> + Send>> + Send + Sync + 'static,
    {
        let name = name.into();
        let spec = NodeSpec {
            name: name.clone(),
            executor: Arc::new(executor),
        };
        self.graph.add_node(name, spec);
        self
    }

    /// Add a direct edge: after `from` completes, execution moves to `to`.
    ///
    /// `from` may be [`START`](crate::START) and `to` may be
    /// [`END`](crate::END).
    pub fn add_edge(&mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> &mut Self {
        self.graph.add_edge(from.into(), Edge::Direct(to.into()));
        self
    }

    /// Add a conditional edge: after `from` completes, `router` inspects the
    /// state and returns the name of the next node (or [`END`](crate::END)).
    ///
    /// `branches` declares every target the router may return; targets are
    /// validated at compile time and the router's answer is checked against
    /// them at runtime.
    pub fn add_conditional_edge<R>(
        &mut self,
        from: impl Into<NodeId>,
        router: R,
        branches: HashMap<String, NodeId>,
    ) -> &mut Self
    where
        R: Fn(&S) -> NodeId + Send + Sync + 'static,
    {
        let router: RouterFn<S> = Arc::new(router);
        self.graph
            .add_edge(from.into(), Edge::Conditional { router, branches });
        self
    }

    /// Validate the structure and produce an executable graph.
    ///
    /// Fails with [`GraphError::Validation`] if any edge targets a missing
    /// node, any node has no outgoing edge, or there is no entry edge.
    pub fn compile(self) -> Result<CompiledGraph<S>>
    where
        S: Clone + Send + Sync + 'static,
    {
        self.graph.validate().map_err(GraphError::Validation)?;
        Ok(CompiledGraph::new(self.graph))
    }
}
