use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use tracing::warn;

use super::ToolRegistry;
use crate::graph::END;
use crate::node::{Context, Node};
use crate::types::{Message, MessageHistory, NodeOutput, NodeResult};

/// Conventional name of the tool-executing node.
pub const TOOLS_NODE: &str = "tools";

/// Runs every tool call of the last AI message and appends one tool message
/// per call. Failures become `error` tool messages so the model can react.
pub struct ToolNode<S> {
    name: String,
    registry: ToolRegistry,
    _state: PhantomData<fn() -> S>,
}

impl<S> ToolNode<S> {
    pub fn new(registry: ToolRegistry) -> Self {
        Self::named(TOOLS_NODE, registry)
    }

    pub fn named(name: impl Into<String>, registry: ToolRegistry) -> Self {
        Self {
            name: name.into(),
            registry,
            _state: PhantomData,
        }
    }
}

impl<S> Debug for ToolNode<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolNode")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .finish()
    }
}

fn render(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

#[async_trait]
impl<S> Node<S> for ToolNode<S>
where
    S: MessageHistory,
{
    async fn process(&self, _ctx: &Context, state: S) -> NodeResult<S> {
        let calls = state
            .last_message()
            .and_then(|message| message.tool_calls.clone())
            .unwrap_or_default();

        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let message = match self.registry.call(&call.name, call.args_value()).await {
                Ok(value) => Message::tool(render(value), call.id.clone(), "success"),
                Err(e) => {
                    warn!(tool = %call.name, error = %e, "tool call failed");
                    Message::tool(format!("Error: {}", e), call.id.clone(), "error")
                }
            };
            results.push(message.with_name(call.name));
        }

        Ok(NodeOutput::Updates(vec![S::messages_update(results)]))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Routes to the tools node when the last message requests tool calls.
pub fn tools_condition<S: MessageHistory>(state: &S) -> String {
    match state.last_message() {
        Some(message) if message.has_tool_calls() => TOOLS_NODE.to_string(),
        _ => END.to_string(),
    }
}
