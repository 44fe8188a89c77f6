use async_openai::config::OpenAIConfig;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

use super::{ChatClientImpl, ChatModel, CompletionError, LangSmithTracer};

const GEMINI_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const OLLAMA_BASE: &str = "http://localhost:11434/v1";

/// Hosts reachable through the OpenAI wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    /// Gemini through its OpenAI-compatible endpoint
    GoogleGenAI,
    Ollama,
}

impl Provider {
    pub fn id(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::GoogleGenAI => "google_genai",
            Provider::Ollama => "ollama",
        }
    }

    /// Environment variables consulted for the API key, in order.
    pub fn api_key_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::OpenAI => &["OPENAI_API_KEY"],
            Provider::GoogleGenAI => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Provider::Ollama => &[],
        }
    }

    fn api_base(&self) -> Option<String> {
        match self {
            Provider::OpenAI => std::env::var("OPENAI_BASE_URL").ok(),
            Provider::GoogleGenAI => Some(GEMINI_OPENAI_BASE.to_string()),
            Provider::Ollama => Some(
                std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| OLLAMA_BASE.to_string()),
            ),
        }
    }
}

impl FromStr for Provider {
    type Err = CompletionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "google_genai" | "google" | "gemini" => Ok(Provider::GoogleGenAI),
            "ollama" => Ok(Provider::Ollama),
            other => Err(CompletionError::InvalidModelSpec(format!(
                "unknown provider '{}'",
                other
            ))),
        }
    }
}

/// A `provider:model` pair such as `google_genai:gemini-2.5-flash-lite`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: Provider,
    pub model: String,
}

impl ModelSpec {
    /// Splits on the first `:`. Without a prefix, `gemini-*` names go to
    /// Google and everything else to OpenAI.
    pub fn parse(spec: &str) -> Result<Self, CompletionError> {
        let spec = spec.trim();
        let (provider, model) = match spec.split_once(':') {
            Some((provider, model)) => (provider.parse::<Provider>()?, model.trim()),
            None if spec.starts_with("gemini") => (Provider::GoogleGenAI, spec),
            None => (Provider::OpenAI, spec),
        };
        if model.is_empty() {
            return Err(CompletionError::InvalidModelSpec(spec.to_string()));
        }
        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }

    fn api_key(&self) -> Result<String, CompletionError> {
        let vars = self.provider.api_key_vars();
        if vars.is_empty() {
            // Ollama ignores the key but the client still sends a header
            return Ok(self.provider.id().to_string());
        }
        vars.iter()
            .find_map(|var| std::env::var(var).ok().filter(|key| !key.is_empty()))
            .ok_or_else(|| CompletionError::MissingApiKey(vars.join(" or ")))
    }

    pub fn client_config(&self) -> Result<OpenAIConfig, CompletionError> {
        let mut config = OpenAIConfig::new().with_api_key(self.api_key()?);
        if let Some(base) = self.provider.api_base() {
            config = config.with_api_base(base);
        }
        Ok(config)
    }
}

impl FromStr for ModelSpec {
    type Err = CompletionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelSpec::parse(s)
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider.id(), self.model)
    }
}

/// Builds a chat model from a `provider:model` string, reading the API key
/// from the environment. Calls are traced to LangSmith when
/// `LANGSMITH_API_KEY` is set.
pub fn init_chat_model(spec: &str) -> Result<ChatModel, CompletionError> {
    let spec = ModelSpec::parse(spec)?;
    let mut client = ChatClientImpl::with_config(spec.client_config()?);
    if let Some(tracer) = LangSmithTracer::from_env() {
        client = client.with_tracer(Arc::new(tracer));
    }
    debug!(model = %spec, "initialised chat model");
    Ok(ChatModel::new(Arc::new(client), spec.model))
}
