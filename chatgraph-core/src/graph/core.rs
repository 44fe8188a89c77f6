use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, warn};

use super::*;
use crate::checkpoint::{Checkpointer, Interrupt};
use crate::node::*;
use crate::types::*;

pub const START: &str = "_START_";
pub const END: &str = "_END_";

/// Steps a single run may take before it is aborted.
pub const DEFAULT_RECURSION_LIMIT: usize = 25;

/// A graph that executes nodes in a defined order
pub struct Graph<S, BuildState = NotBuilt>
where
    S: GraphState,
{
    pub(crate) graph_name: String,
    pub(crate) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(crate) edges: HashMap<String, Edge<S>>,
    pub(crate) configs: HashMap<String, NodeConfig>,
    pub(crate) recursion_limit: usize,
    pub(crate) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    _build_state: std::marker::PhantomData<BuildState>,
}

impl<S, B> Debug for Graph<S, B>
where
    S: GraphState,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut nodes: Vec<&String> = self.nodes.keys().collect();
        nodes.sort();
        f.debug_struct("Graph")
            .field("graph_name", &self.graph_name)
            .field("nodes", &nodes)
            .field("edges", &self.edges)
            .field("recursion_limit", &self.recursion_limit)
            .field("checkpointer", &self.checkpointer.is_some())
            .finish()
    }
}

impl<S> Graph<S, NotBuilt>
where
    S: GraphState,
{
    /// Create a new graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            graph_name: name.into(),
            nodes: HashMap::new(),
            edges: HashMap::new(),
            configs: HashMap::new(),
            recursion_limit: DEFAULT_RECURSION_LIMIT,
            checkpointer: None,
            _build_state: std::marker::PhantomData,
        }
    }

    /// Add a node to the graph
    pub fn add_node<N>(&mut self, node: N) -> &mut Self
    where
        N: Node<S> + 'static,
    {
        self.nodes.insert(node.name().to_string(), Arc::new(node));
        self
    }

    /// Add a direct edge between nodes
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.insert(from.into(), Edge::Direct(to.into()));
        self
    }

    /// Add a conditional edge from a node. The condition sees the state as
    /// it is after the node ran and returns the next node name (or END).
    pub fn add_conditional_edge<F>(&mut self, from: impl Into<String>, condition: F) -> &mut Self
    where
        F: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.edges
            .insert(from.into(), Edge::Conditional(Arc::new(condition)));
        self
    }

    /// Configure a node with specific settings
    pub fn configure_node(&mut self, name: impl Into<String>, config: NodeConfig) -> &mut Self {
        self.configs.insert(name.into(), config);
        self
    }

    pub fn recursion_limit(&mut self, limit: usize) -> &mut Self {
        self.recursion_limit = limit;
        self
    }

    /// Validate the structure and make the graph ready for execution.
    ///
    /// Nodes without an outgoing edge are allowed; they must route with a
    /// `Command`.
    pub fn build(self) -> GraphResult<Graph<S, Built>> {
        match self.edges.get(START) {
            None => {
                return Err(GraphError::InvalidGraph(format!(
                    "graph '{}' has no edge from START",
                    self.graph_name
                )))
            }
            Some(edge) if edge.fixed_target() == Some(END) => {
                return Err(GraphError::InvalidGraph(
                    "START cannot connect directly to END".into(),
                ))
            }
            _ => {}
        }

        for (from, edge) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(GraphError::InvalidGraph(format!(
                    "edge from unknown node '{}'",
                    from
                )));
            }
            if let Some(to) = edge.fixed_target() {
                if to != END && !self.nodes.contains_key(to) {
                    return Err(GraphError::InvalidGraph(format!(
                        "edge '{}' -> '{}' targets an unknown node",
                        from, to
                    )));
                }
            }
        }

        Ok(Graph {
            graph_name: self.graph_name,
            nodes: self.nodes,
            edges: self.edges,
            configs: self.configs,
            recursion_limit: self.recursion_limit,
            checkpointer: None,
            _build_state: std::marker::PhantomData,
        })
    }
}

/// Position of a run inside the graph.
#[derive(Debug, Clone)]
pub(crate) struct Cursor<S> {
    pub state: S,
    /// Last node that completed, or START
    pub current: String,
    /// Pending jump from a `Command` or an interrupted node
    pub goto: Option<String>,
    pub resume: Option<Value>,
    /// Nodes executed on the thread, across runs
    pub step: usize,
    /// Nodes executed by this run; bounded by the recursion limit
    pub run_steps: usize,
}

impl<S> Cursor<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            current: START.to_string(),
            goto: None,
            resume: None,
            step: 0,
            run_steps: 0,
        }
    }
}

pub(crate) enum StepOutcome {
    Advanced,
    Finished,
    Interrupted(Interrupt),
}

impl<S> Graph<S, Built>
where
    S: GraphState,
{
    /// Persist every step of every run in this checkpointer. Runs must then
    /// carry a `thread_id` on their context.
    pub fn with_checkpointer(mut self, checkpointer: Arc<dyn Checkpointer<S>>) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn name(&self) -> &str {
        &self.graph_name
    }

    /// Run the graph from START to END with an initial state, without
    /// touching the checkpointer.
    pub async fn run(&self, ctx: &Context, initial_state: S) -> GraphResult<S> {
        let mut cursor = Cursor::new(initial_state);
        loop {
            match self.step(ctx, &mut cursor).await? {
                StepOutcome::Advanced => continue,
                StepOutcome::Finished => return Ok(cursor.state),
                StepOutcome::Interrupted(interrupt) => {
                    return Err(GraphError::Interrupted(interrupt.node))
                }
            }
        }
    }

    fn next_from(&self, current: &str, state: &S) -> GraphResult<String> {
        match self.edges.get(current) {
            Some(edge) => Ok(edge.resolve(state)),
            None => Err(GraphError::InvalidTransition(format!(
                "No transition defined from node: {}",
                current
            ))),
        }
    }

    /// Execute the next node and fold its output into the cursor.
    pub(crate) async fn step(
        &self,
        ctx: &Context,
        cursor: &mut Cursor<S>,
    ) -> GraphResult<StepOutcome> {
        let next_node = match cursor.goto.take() {
            Some(target) => target,
            None => self.next_from(&cursor.current, &cursor.state)?,
        };

        if next_node == END {
            debug!(graph = %self.graph_name, steps = cursor.run_steps, "reached END");
            return Ok(StepOutcome::Finished);
        }

        if cursor.run_steps >= self.recursion_limit {
            return Err(GraphError::RecursionLimit(self.recursion_limit));
        }

        let node = self
            .nodes
            .get(&next_node)
            .ok_or_else(|| GraphError::NodeNotFound(next_node.clone()))?;

        let config = self.configs.get(&next_node).cloned().unwrap_or_default();
        let resume = cursor.resume.take();

        debug!(
            graph = %self.graph_name,
            node = %next_node,
            step = cursor.step,
            resumed = resume.is_some(),
            "executing node"
        );

        let mut attempts = 0;
        let output = loop {
            attempts += 1;
            let node_ctx = ctx.next_node_context().with_resume(resume.clone());
            let attempt = node.process(&node_ctx, cursor.state.clone());
            match tokio::time::timeout(config.timeout, attempt).await {
                Ok(Ok(output)) => break Ok(output),

                Ok(Err(e)) if attempts < config.max_retries => {
                    warn!(
                        node = %next_node,
                        attempt = attempts,
                        error = %e,
                        "node failed, retrying"
                    );
                    continue;
                }
                Ok(Err(e)) => break Err(e),

                Err(_) if attempts < config.max_retries => {
                    warn!(node = %next_node, attempt = attempts, "node timed out, retrying");
                    continue;
                }
                Err(_) => {
                    break Err(NodeError::Execution(format!(
                        "Node {} timed out after {} attempts",
                        next_node, attempts
                    )))
                }
            }
        }?;

        match output {
            NodeOutput::Full(new_state) => cursor.state = new_state,
            NodeOutput::Updates(updates) => cursor.state.apply_many(updates),
            NodeOutput::Command(command) => {
                cursor.state.apply_many(command.updates);
                cursor.goto = command.goto;
            }
            NodeOutput::Interrupt(value) => {
                debug!(node = %next_node, "node interrupted");
                cursor.goto = Some(next_node.clone());
                return Ok(StepOutcome::Interrupted(Interrupt {
                    node: next_node,
                    value,
                }));
            }
        }

        cursor.step += 1;
        cursor.run_steps += 1;
        cursor.current = next_node;
        Ok(StepOutcome::Advanced)
    }
}

#[async_trait]
impl<S> Node<S> for Graph<S, Built>
where
    S: GraphState,
{
    async fn process(&self, ctx: &Context, state: S) -> NodeResult<S> {
        let new_state = self
            .run(ctx, state)
            .await
            .map_err(|e| NodeError::SubgraphExecution(e.to_string()))?;
        Ok(NodeOutput::Full(new_state))
    }

    fn name(&self) -> &str {
        &self.graph_name
    }
}
