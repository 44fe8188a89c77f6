//! ChatGraph is a small runtime for stateful, LLM-driven conversation graphs.

#![allow(unused_extern_crates)]
extern crate self as chatgraph_core;

pub mod checkpoint;
pub mod completion;
pub mod graph;
pub mod node;
pub mod tool;
pub mod types;

pub use async_trait::async_trait;

pub mod prelude {
    //! Convenient re-exports of commonly used types
    pub use crate::checkpoint::{
        Checkpoint, CheckpointError, Checkpointer, Interrupt, MemorySaver, SqliteSaver,
    };
    pub use crate::completion::{
        init_chat_model, ChatClient, ChatClientImpl, ChatCompletionCallOptions,
        ChatCompletionRequestOptions, ChatModel, CompletionError, LangSmithTracer, ModelSpec,
        StructuredModel, TracingError, TracingProvider,
    };
    pub use crate::graph::{
        Built, Condition, Edge, Graph, NotBuilt, RunOutcome, StateSnapshot, StreamEvent, END,
        START,
    };
    pub use crate::node::{Context, FunctionNode, Node, NodeConfig};
    pub use crate::tool::{tools_condition, DynTool, NoParams, ToolFunction, ToolNode, ToolRegistry};
    pub use crate::types::{
        add_messages, buffer_string, Command, GraphError, GraphResult, GraphState, Message,
        MessageHistory, MessageType, MessagesState, MessagesStateUpdate, NodeError, NodeOutput,
        NodeResult, ToolCall, ToolError,
    };
    pub use chatgraph_macros::{tools, State};
}

// Re-export main types
pub use prelude::*;
