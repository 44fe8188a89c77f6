use async_openai::types::{ChatCompletionResponseMessage, ChatCompletionTool};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    create_chat_completion_request, ChatClient, ChatCompletionCallOptions,
    ChatCompletionRequestOptions, CompletionError, StructuredModel,
};
use crate::node::Context;
use crate::types::{to_request_messages, Message};

/// A client bound to a model name and request options.
///
/// Cheap to clone; binding tools or structured output returns a new handle
/// over the same client.
#[derive(Clone)]
pub struct ChatModel {
    client: Arc<dyn ChatClient>,
    options: ChatCompletionRequestOptions,
}

impl Debug for ChatModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("model", &self.options.model)
            .field("tools", &self.options.tools.as_ref().map_or(0, Vec::len))
            .finish()
    }
}

impl ChatModel {
    pub fn new(client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self::with_options(client, ChatCompletionRequestOptions::for_model(model))
    }

    pub fn with_options(
        client: Arc<dyn ChatClient>,
        options: ChatCompletionRequestOptions,
    ) -> Self {
        Self { client, options }
    }

    pub fn model_name(&self) -> &str {
        &self.options.model
    }

    pub fn options(&self) -> &ChatCompletionRequestOptions {
        &self.options
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    /// Offer these tools on every call; the model decides when to use them.
    pub fn bind_tools(&self, tools: Vec<ChatCompletionTool>) -> Self {
        let mut bound = self.clone();
        bound.options.tools = Some(tools);
        bound.options.tool_choice = None;
        bound
    }

    pub fn with_structured_output<T>(&self) -> StructuredModel<T>
    where
        T: JsonSchema + DeserializeOwned,
    {
        StructuredModel::new(self.clone())
    }

    /// Sends the history and returns the reply as an AI message, tool calls
    /// included.
    pub async fn invoke(
        &self,
        ctx: &Context,
        messages: &[Message],
    ) -> Result<Message, CompletionError> {
        let response = self.complete(ctx, messages, self.options.clone()).await?;
        Ok(Message::from_response(&response))
    }

    /// Single human turn.
    pub async fn invoke_prompt(
        &self,
        ctx: &Context,
        prompt: &str,
    ) -> Result<Message, CompletionError> {
        self.invoke(ctx, &[Message::human(prompt)]).await
    }

    pub(crate) async fn complete(
        &self,
        ctx: &Context,
        messages: &[Message],
        options: ChatCompletionRequestOptions,
    ) -> Result<ChatCompletionResponseMessage, CompletionError> {
        let request = create_chat_completion_request(to_request_messages(messages)?, options)?;
        let call_options = ChatCompletionCallOptions::new(
            Some(Uuid::new_v4().to_string()),
            Some(ctx.trace_id.clone()),
        );
        let response = self.client.complete(request, Some(call_options)).await?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(CompletionError::EmptyResponse)
    }
}
