//! Chat-completion access over any OpenAI-compatible endpoint.

mod client;
mod model;
mod provider;
mod structured;
mod tracing;

pub use self::client::{
    create_chat_completion_request, ChatClient, ChatClientImpl, ChatCompletionCallOptions,
    ChatCompletionRequestOptions,
};
pub use self::model::ChatModel;
pub use self::provider::{init_chat_model, ModelSpec, Provider};
pub use self::structured::{parse_json_content, StructuredModel};
pub use self::tracing::{LangSmithTracer, TracingError, TracingProvider, LANGSMITH_ENDPOINT};

use async_openai::error::OpenAIError;

/// Error type for model calls
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error(transparent)]
    OpenAI(#[from] OpenAIError),

    #[error(transparent)]
    Tracing(#[from] TracingError),

    #[error("missing API key: set {0}")]
    MissingApiKey(String),

    #[error("invalid model spec '{0}'")]
    InvalidModelSpec(String),

    #[error("model returned no choices")]
    EmptyResponse,

    #[error("could not parse structured output: {0}")]
    Parse(String),
}
