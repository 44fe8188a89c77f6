use crate::{GraphError, GraphState, NodeError};
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::result::Result;

/// What a node hands back to the graph.
pub enum NodeOutput<S>
where
    S: GraphState,
{
    /// The node has produced an entirely new state.
    Full(S),

    /// The node has produced zero or more updates to the existing state.
    Updates(Vec<S::Update>),

    /// Updates plus an explicit jump, bypassing the node's outgoing edge.
    Command(Command<S>),

    /// Pause the run and surface `Value` to the caller. The node runs again
    /// once the thread is resumed, with the resume value on its `Context`.
    Interrupt(Value),
}

impl<S: GraphState> Debug for NodeOutput<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeOutput::Full(state) => f.debug_tuple("Full").field(state).finish(),
            NodeOutput::Updates(updates) => f.debug_tuple("Updates").field(updates).finish(),
            NodeOutput::Command(command) => f.debug_tuple("Command").field(command).finish(),
            NodeOutput::Interrupt(value) => f.debug_tuple("Interrupt").field(value).finish(),
        }
    }
}

/// Routing instruction returned by a node.
pub struct Command<S: GraphState> {
    pub goto: Option<String>,
    pub updates: Vec<S::Update>,
}

impl<S: GraphState> Command<S> {
    pub fn goto(node: impl Into<String>) -> Self {
        Self {
            goto: Some(node.into()),
            updates: Vec::new(),
        }
    }

    pub fn update(mut self, update: S::Update) -> Self {
        self.updates.push(update);
        self
    }

    pub fn updates(mut self, updates: impl IntoIterator<Item = S::Update>) -> Self {
        self.updates.extend(updates);
        self
    }
}

impl<S: GraphState> Default for Command<S> {
    fn default() -> Self {
        Self {
            goto: None,
            updates: Vec::new(),
        }
    }
}

impl<S: GraphState> Debug for Command<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("goto", &self.goto)
            .field("updates", &self.updates)
            .finish()
    }
}

impl<S: GraphState> From<Command<S>> for NodeOutput<S> {
    fn from(command: Command<S>) -> Self {
        NodeOutput::Command(command)
    }
}

pub type NodeResult<S> = Result<NodeOutput<S>, NodeError>;

pub type GraphResult<T> = Result<T, GraphError>;
