mod error;
mod message;
mod result;
mod state;

pub use error::{GraphError, NodeError, ToolError};
pub use message::{
    add_messages, buffer_string, to_request_messages, Message, MessageHistory, MessageType,
    MessagesState, MessagesStateUpdate, ToolCall,
};
pub use result::{Command, GraphResult, NodeOutput, NodeResult};
pub use state::GraphState;
