use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::completion::CompletionError;

/// Failure of a tool call. Reported back to the model, not raised.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ToolError {
    #[error("Schema: {0}")]
    Schema(String),

    #[error("Execution: {0}")]
    Execution(String),

    #[error("Serialization: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Serialization(err.to_string())
    }
}

/// Failure inside a node.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum NodeError {
    #[error("Node execution: {0}")]
    Execution(String),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Model: {0}")]
    ModelError(String),

    #[error("Subgraph execution: {0}")]
    SubgraphExecution(String),
}

impl From<CompletionError> for NodeError {
    fn from(err: CompletionError) -> Self {
        NodeError::ModelError(err.to_string())
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        NodeError::Execution(err.to_string())
    }
}

/// Failure of a run, a build or a checkpoint lookup.
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error("Model: {0}")]
    ModelError(String),

    #[error("Checkpoint: {0}")]
    Checkpoint(String),

    /// A node paused the run but the caller has no thread to resume it on.
    #[error("Interrupted at node: {0}")]
    Interrupted(String),

    #[error("Recursion limit of {0} steps reached without hitting END")]
    RecursionLimit(usize),
}

impl From<CompletionError> for GraphError {
    fn from(err: CompletionError) -> Self {
        GraphError::ModelError(err.to_string())
    }
}

impl From<CheckpointError> for GraphError {
    fn from(err: CheckpointError) -> Self {
        GraphError::Checkpoint(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_error_bubbles_into_graph_error() {
        let err: GraphError = NodeError::Tool(ToolError::Execution("boom".into())).into();
        assert_eq!(err.to_string(), "Execution: boom");
    }

    #[test]
    fn test_errors_serialize_tagged() {
        let err = GraphError::RecursionLimit(25);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["type"], "RecursionLimit");
        assert_eq!(value["message"], 25);

        let err = GraphError::from(CheckpointError::ThreadIdRequired);
        assert!(err.to_string().contains("thread_id"));
    }
}
