use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionResponseMessage, ChatCompletionToolType, FunctionCall,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

use crate::State;

/// Represents different types of messages in the system
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Human,
    AI,
    System,
    Tool,
}

impl MessageType {
    /// Speaker prefix used when a conversation is flattened into a prompt.
    pub fn prefix(&self) -> &'static str {
        match self {
            MessageType::Human => "Human",
            MessageType::AI => "AI",
            MessageType::System => "System",
            MessageType::Tool => "Tool",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            MessageType::Human => "Human Message",
            MessageType::AI => "Ai Message",
            MessageType::System => "System Message",
            MessageType::Tool => "Tool Message",
        }
    }
}

/// Represents a tool call with its arguments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub args: HashMap<String, Value>,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        args: HashMap<String, Value>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    pub fn args_value(&self) -> Value {
        Value::Object(self.args.clone().into_iter().collect())
    }
}

/// Represents a message in the system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub message_type: MessageType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional: Option<HashMap<String, Value>>,
}

impl Message {
    fn with_type(message_type: MessageType, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message_type,
            content: content.into(),
            name: None,
            tool_calls: None,
            tool_call_id: None,
            status: None,
            additional: None,
        }
    }

    /// Creates a new human message
    pub fn human(content: impl Into<String>) -> Self {
        Self::with_type(MessageType::Human, content)
    }

    /// Creates a new AI message
    pub fn ai(content: impl Into<String>) -> Self {
        Self::with_type(MessageType::AI, content)
    }

    /// Creates a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_type(MessageType::System, content)
    }

    /// Creates a new tool message answering `tool_call_id`
    pub fn tool(
        content: impl Into<String>,
        tool_call_id: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        let mut message = Self::with_type(MessageType::Tool, content);
        message.tool_call_id = Some(tool_call_id.into());
        message.status = Some(status.into());
        message
    }

    /// Replaces the generated id, e.g. to overwrite an earlier message.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds tool calls to the message
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = Some(tool_calls);
        self
    }

    /// Adds additional data to the message
    pub fn with_additional(mut self, additional: HashMap<String, Value>) -> Self {
        self.additional = Some(additional);
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }

    /// Banner-style rendering used by the interactive demos.
    pub fn pretty_repr(&self) -> String {
        let mut out = format!("{:=^80}", format!(" {} ", self.message_type.title()));
        if let Some(name) = &self.name {
            out.push_str(&format!("\nName: {}", name));
        }
        out.push_str("\n\n");
        out.push_str(&self.content);
        if let Some(calls) = &self.tool_calls {
            if !calls.is_empty() {
                out.push_str("\nTool Calls:");
                for call in calls {
                    out.push_str(&format!("\n  {} ({})", call.name, call.id));
                    out.push_str(&format!("\n Call ID: {}", call.id));
                    out.push_str("\n  Args:");
                    let mut args: Vec<_> = call.args.iter().collect();
                    args.sort_by(|a, b| a.0.cmp(b.0));
                    for (key, value) in args {
                        out.push_str(&format!("\n    {}: {}", key, value));
                    }
                }
            }
        }
        out
    }

    pub fn pretty_print(&self) {
        println!("{}", self.pretty_repr());
    }

    /// Converts to the wire format expected by the completion API.
    pub fn to_request_message(&self) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        let message = match self.message_type {
            MessageType::Human => ChatCompletionRequestUserMessageArgs::default()
                .content(self.content.clone())
                .build()?
                .into(),
            MessageType::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(self.content.clone())
                .build()?
                .into(),
            MessageType::AI => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                args.content(self.content.clone());
                if let Some(calls) = &self.tool_calls {
                    if !calls.is_empty() {
                        args.tool_calls(
                            calls
                                .iter()
                                .map(|call| ChatCompletionMessageToolCall {
                                    id: call.id.clone(),
                                    r#type: ChatCompletionToolType::Function,
                                    function: FunctionCall {
                                        name: call.name.clone(),
                                        arguments: call.args_value().to_string(),
                                    },
                                })
                                .collect::<Vec<_>>(),
                        );
                    }
                }
                args.build()?.into()
            }
            MessageType::Tool => ChatCompletionRequestToolMessageArgs::default()
                .content(self.content.clone())
                .tool_call_id(self.tool_call_id.clone().unwrap_or_default())
                .build()?
                .into(),
        };
        Ok(message)
    }

    /// Builds an AI message from a completion choice. Tool-call arguments
    /// that are not a JSON object are kept under an `"input"` key.
    pub fn from_response(response: &ChatCompletionResponseMessage) -> Self {
        let message = Message::ai(response.content.clone().unwrap_or_default());
        match &response.tool_calls {
            Some(calls) if !calls.is_empty() => message.with_tool_calls(
                calls
                    .iter()
                    .map(|call| {
                        ToolCall::new(
                            call.id.clone(),
                            call.function.name.clone(),
                            parse_tool_arguments(&call.function.arguments),
                        )
                    })
                    .collect(),
            ),
            _ => message,
        }
    }
}

fn parse_tool_arguments(raw: &str) -> HashMap<String, Value> {
    if raw.trim().is_empty() {
        return HashMap::new();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        Ok(other) => HashMap::from([("input".to_string(), other)]),
        Err(_) => HashMap::from([("input".to_string(), Value::String(raw.to_string()))]),
    }
}

/// Converts a history into request messages.
pub fn to_request_messages(
    messages: &[Message],
) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    messages.iter().map(Message::to_request_message).collect()
}

/// Reducer for message lists: an incoming message replaces the existing one
/// with the same id, anything else is appended.
pub fn add_messages(existing: &mut Vec<Message>, incoming: Vec<Message>) {
    for message in incoming {
        match existing.iter_mut().find(|m| m.id == message.id) {
            Some(slot) => *slot = message,
            None => existing.push(message),
        }
    }
}

/// Flattens messages into `Speaker: content` lines for prompt templates.
pub fn buffer_string(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.message_type.prefix(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Represents the state of messages in a conversation
#[derive(State, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesState {
    #[update(messages)]
    pub messages: Vec<Message>,
}

impl MessagesState {
    /// Creates a new empty message state
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the state
    pub fn add_message(&mut self, message: Message) {
        add_messages(&mut self.messages, vec![message]);
    }

    /// Gets the last message in the state
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// States that carry a conversation, used by tool routing and printing.
pub trait MessageHistory: crate::GraphState {
    fn messages(&self) -> &[Message];

    /// The update that appends (or replaces) the given messages.
    fn messages_update(messages: Vec<Message>) -> Self::Update;

    fn last_message(&self) -> Option<&Message> {
        self.messages().last()
    }
}

impl MessageHistory for MessagesState {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_update(messages: Vec<Message>) -> MessagesStateUpdate {
        MessagesStateUpdate::Messages(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphState;

    #[test]
    fn test_message_creation() {
        let human_msg = Message::human("Hello");
        assert_eq!(human_msg.message_type, MessageType::Human);

        let ai_msg = Message::ai("Hi there");
        assert_eq!(ai_msg.message_type, MessageType::AI);
        assert_ne!(ai_msg.id, human_msg.id);

        let system_msg = Message::system("System prompt");
        assert_eq!(system_msg.message_type, MessageType::System);

        let tool_msg = Message::tool("Result", "call_1", "success");
        assert_eq!(tool_msg.message_type, MessageType::Tool);
        assert_eq!(tool_msg.status, Some("success".to_string()));
        assert_eq!(tool_msg.tool_call_id, Some("call_1".to_string()));
    }

    #[test]
    fn test_add_messages_appends_and_replaces_by_id() {
        let first = Message::human("Hello").with_id("1");
        let second = Message::ai("Hi").with_id("2");
        let mut messages = vec![first, second];

        add_messages(
            &mut messages,
            vec![Message::ai("Hi, corrected").with_id("2"), Message::human("Bye")],
        );

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].content, "Hi, corrected");
        assert_eq!(messages[2].content, "Bye");
    }

    #[test]
    fn test_message_state_update() {
        let mut state = MessagesState::new();
        state.apply(MessagesStateUpdate::Messages(vec![Message::human("Hello")]));
        state.add_message(Message::ai("Hi"));

        assert_eq!(state.messages.len(), 2);
        let last_msg = state.last_message().unwrap();
        assert_eq!(last_msg.message_type, MessageType::AI);
    }

    #[test]
    fn test_buffer_string() {
        let messages = vec![
            Message::human("Translate: the tree"),
            Message::ai("el árbol"),
        ];
        assert_eq!(
            buffer_string(&messages),
            "Human: Translate: the tree\nAI: el árbol"
        );
    }

    #[test]
    fn test_pretty_repr_banner() {
        let repr = Message::ai("Hello").pretty_repr();
        let banner = repr.lines().next().unwrap();
        assert_eq!(banner.chars().count(), 80);
        assert!(banner.contains(" Ai Message "));
        assert!(repr.ends_with("Hello"));
    }

    #[test]
    fn test_parse_tool_arguments() {
        let args = parse_tool_arguments(r#"{"item_name": "Hat"}"#);
        assert_eq!(args["item_name"], "Hat");
        assert!(parse_tool_arguments("").is_empty());
        assert_eq!(parse_tool_arguments("[1]")["input"], serde_json::json!([1]));
    }

    #[test]
    fn test_request_message_conversion() {
        let call = ToolCall::new("call_1", "add_item_to_packlist", HashMap::new());
        let ai = Message::ai("").with_tool_calls(vec![call]);
        match ai.to_request_message().unwrap() {
            ChatCompletionRequestMessage::Assistant(msg) => {
                let calls = msg.tool_calls.unwrap();
                assert_eq!(calls[0].function.name, "add_item_to_packlist");
                assert_eq!(calls[0].function.arguments, "{}");
            }
            other => panic!("expected assistant message, got {:?}", other),
        }

        let tool = Message::tool("ok", "call_1", "success");
        assert!(matches!(
            tool.to_request_message().unwrap(),
            ChatCompletionRequestMessage::Tool(_)
        ));
    }
}
