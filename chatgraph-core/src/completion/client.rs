use super::{CompletionError, TracingProvider};
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client as OpenAIClient,
};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ChatCompletionRequestOptions {
    pub model: String,
    pub temperature: Option<f32>,
    pub tools: Option<Vec<ChatCompletionTool>>,
    pub tool_choice: Option<ChatCompletionToolChoiceOption>,
}

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.0;

impl Default for ChatCompletionRequestOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE.into(),
            tools: None,
            tool_choice: None,
        }
    }
}

impl ChatCompletionRequestOptions {
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatCompletionCallOptions {
    pub trace_id: Option<String>,
    pub parent_trace_id: Option<String>,
}

impl ChatCompletionCallOptions {
    pub fn new(trace_id: Option<String>, parent_trace_id: Option<String>) -> Self {
        Self {
            trace_id,
            parent_trace_id,
        }
    }
}

/// Builds a non-streaming request from a history and options.
pub fn create_chat_completion_request(
    messages: Vec<ChatCompletionRequestMessage>,
    options: ChatCompletionRequestOptions,
) -> Result<CreateChatCompletionRequest, CompletionError> {
    let mut builder = CreateChatCompletionRequestArgs::default();
    builder.model(options.model).messages(messages);
    if let Some(temperature) = options.temperature {
        builder.temperature(temperature);
    }
    if let Some(tools) = options.tools.filter(|tools| !tools.is_empty()) {
        builder.tools(tools);
    }
    if let Some(tool_choice) = options.tool_choice {
        builder.tool_choice(tool_choice);
    }
    Ok(builder.build()?)
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        request: CreateChatCompletionRequest,
        options: Option<ChatCompletionCallOptions>,
    ) -> Result<CreateChatCompletionResponse, CompletionError>;
}

pub struct ChatClientImpl {
    client: OpenAIClient<OpenAIConfig>,
    tracer: Option<Arc<dyn TracingProvider>>,
}

impl ChatClientImpl {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new().with_api_key(api_key))
    }

    /// Any OpenAI-compatible endpoint: set the api base on `config`.
    pub fn with_config(config: OpenAIConfig) -> Self {
        Self {
            client: OpenAIClient::with_config(config),
            tracer: None,
        }
    }

    pub fn with_tracer(self, tracer: Arc<dyn TracingProvider>) -> Self {
        Self {
            client: self.client,
            tracer: Some(tracer),
        }
    }
}

#[async_trait]
impl ChatClient for ChatClientImpl {
    async fn complete(
        &self,
        request: CreateChatCompletionRequest,
        options: Option<ChatCompletionCallOptions>,
    ) -> Result<CreateChatCompletionResponse, CompletionError> {
        let trace_id = options
            .as_ref()
            .and_then(|o| o.trace_id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let parent_trace_id = options.as_ref().and_then(|o| o.parent_trace_id.clone());

        // Tracing failures are logged; they never fail the call
        if let Some(tracer) = &self.tracer {
            let inputs = serde_json::to_value(&request)
                .unwrap_or_else(|_| json!({ "error": "Failed to serialize request" }));
            if let Err(e) = tracer
                .start_trace(
                    &trace_id,
                    "chat_completion",
                    "llm",
                    &inputs,
                    parent_trace_id,
                    Some(SystemTime::now()),
                )
                .await
            {
                warn!(error = %e, "could not start trace");
            }
        }

        debug!(model = %request.model, messages = request.messages.len(), "chat completion");
        let response = self.client.chat().create(request).await?;

        if let Some(tracer) = &self.tracer {
            let outputs = serde_json::to_value(&response)
                .unwrap_or_else(|_| json!({ "error": "Failed to serialize response" }));
            if let Err(e) = tracer
                .end_trace(&trace_id, &outputs, Some(SystemTime::now()))
                .await
            {
                warn!(error = %e, "could not end trace");
            }
        }

        Ok(response)
    }
}
