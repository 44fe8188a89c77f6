use async_openai::types::{
    ChatCompletionNamedToolChoice, ChatCompletionTool, ChatCompletionToolChoiceOption,
    ChatCompletionToolType, FunctionName, FunctionObject,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use tracing::debug;

use super::{ChatModel, CompletionError};
use crate::node::Context;
use crate::tool::parameters_schema;
use crate::types::Message;

/// A chat model whose replies are parsed into `T`.
///
/// The request forces a single tool whose parameters are `T`'s schema; the
/// tool-call arguments are the answer. Endpoints that ignore the forced tool
/// and reply in plain text are handled by parsing a JSON object out of the
/// content.
pub struct StructuredModel<T> {
    model: ChatModel,
    tool_name: String,
    schema: Value,
    _output: PhantomData<fn() -> T>,
}

impl<T> Clone for StructuredModel<T> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            tool_name: self.tool_name.clone(),
            schema: self.schema.clone(),
            _output: PhantomData,
        }
    }
}

impl<T> Debug for StructuredModel<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructuredModel")
            .field("model", &self.model)
            .field("tool_name", &self.tool_name)
            .finish()
    }
}

impl<T> StructuredModel<T>
where
    T: JsonSchema + DeserializeOwned,
{
    pub(crate) fn new(model: ChatModel) -> Self {
        let tool_name = T::schema_name()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        Self {
            model,
            tool_name,
            schema: parameters_schema::<T>(),
            _output: PhantomData,
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    fn tool(&self) -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: self.tool_name.clone(),
                description: Some(format!("Respond with a {} object.", self.tool_name)),
                parameters: Some(self.schema.clone()),
                strict: None,
            },
        }
    }

    pub async fn invoke(&self, ctx: &Context, messages: &[Message]) -> Result<T, CompletionError> {
        let mut options = self.model.options().clone();
        options.tools = Some(vec![self.tool()]);
        options.tool_choice = Some(ChatCompletionToolChoiceOption::Named(
            ChatCompletionNamedToolChoice {
                r#type: ChatCompletionToolType::Function,
                function: FunctionName {
                    name: self.tool_name.clone(),
                },
            },
        ));

        let response = self.model.complete(ctx, messages, options).await?;

        let call = response.tool_calls.as_ref().and_then(|calls| {
            calls
                .iter()
                .find(|call| call.function.name == self.tool_name)
                .or_else(|| calls.first())
        });
        if let Some(call) = call {
            return serde_json::from_str(&call.function.arguments).map_err(|e| {
                CompletionError::Parse(format!("{} arguments: {}", self.tool_name, e))
            });
        }

        debug!(tool = %self.tool_name, "no tool call in reply, parsing content");
        parse_json_content(response.content.as_deref().unwrap_or_default())
    }

    pub async fn invoke_prompt(&self, ctx: &Context, prompt: &str) -> Result<T, CompletionError> {
        self.invoke(ctx, &[Message::human(prompt)]).await
    }
}

/// Parses a JSON object from model text: a ```json fenced block, or the
/// outermost `{ ... }` span.
pub fn parse_json_content<T: DeserializeOwned>(content: &str) -> Result<T, CompletionError> {
    let text = content.trim();
    let candidate = if let Some(start) = text.find("```") {
        let body = &text[start + 3..];
        let body = body.strip_prefix("json").unwrap_or(body);
        match body.find("```") {
            Some(end) => &body[..end],
            None => body,
        }
    } else {
        match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => &text[start..=end],
            _ => text,
        }
    };
    serde_json::from_str(candidate.trim()).map_err(|e| CompletionError::Parse(e.to_string()))
}
