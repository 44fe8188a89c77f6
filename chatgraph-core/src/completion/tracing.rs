use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::SystemTime;

pub const LANGSMITH_ENDPOINT: &str = "https://api.smith.langchain.com";

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Tracing HttpError: {0}")]
    HttpError(String),
    #[error("Tracing Other: {0}")]
    Other(String),
}

/// Receives one run per model call, keyed by the caller's trace id.
#[async_trait]
pub trait TracingProvider: Send + Sync {
    async fn start_trace(
        &self,
        trace_id: &str,
        name: &str,
        trace_type: &str,
        inputs: &Value,
        parent_trace_id: Option<String>,
        start_time: Option<SystemTime>,
    ) -> Result<(), TracingError>;

    async fn end_trace(
        &self,
        trace_id: &str,
        outputs: &Value,
        end_time: Option<SystemTime>,
    ) -> Result<(), TracingError>;
}

/// Posts runs to the LangSmith REST API.
pub struct LangSmithTracer {
    pub base_url: String,
    /// Sent as the `x-api-key` header
    pub api_key: String,
    pub project: Option<String>,
    pub http_client: Client,
}

impl LangSmithTracer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: LANGSMITH_ENDPOINT.to_string(),
            api_key: api_key.into(),
            project: None,
            http_client: Client::new(),
        }
    }

    /// Reads `LANGSMITH_API_KEY`, plus the optional `LANGSMITH_ENDPOINT` and
    /// `LANGSMITH_PROJECT`. Returns `None` when no key is set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LANGSMITH_API_KEY").ok().filter(|k| !k.is_empty())?;
        let mut tracer = Self::new(api_key);
        if let Ok(endpoint) = std::env::var("LANGSMITH_ENDPOINT") {
            tracer.base_url = endpoint.trim_end_matches('/').to_string();
        }
        tracer.project = std::env::var("LANGSMITH_PROJECT").ok();
        Some(tracer)
    }

    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<(), TracingError> {
        let resp = request
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|err| TracingError::HttpError(err.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "No response body".to_string());
            return Err(TracingError::HttpError(format!(
                "{} failed: HTTP {}: {}",
                what, status, text
            )));
        }
        Ok(())
    }
}

fn timestamp(time: Option<SystemTime>) -> String {
    DateTime::<Utc>::from(time.unwrap_or_else(SystemTime::now))
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Serialize)]
struct StartRunBody<'a> {
    id: &'a str,
    name: &'a str,
    run_type: &'a str,
    inputs: &'a Value,
    start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_name: Option<&'a str>,
}

#[derive(Serialize)]
struct EndRunBody<'a> {
    outputs: &'a Value,
    end_time: String,
}

#[async_trait]
impl TracingProvider for LangSmithTracer {
    async fn start_trace(
        &self,
        trace_id: &str,
        name: &str,
        trace_type: &str,
        inputs: &Value,
        parent_trace_id: Option<String>,
        start_time: Option<SystemTime>,
    ) -> Result<(), TracingError> {
        let body = StartRunBody {
            id: trace_id,
            name,
            run_type: trace_type,
            inputs,
            start_time: timestamp(start_time),
            parent_run_id: parent_trace_id,
            session_name: self.project.as_deref(),
        };
        let url = format!("{}/runs", self.base_url);
        self.send(self.http_client.post(&url).json(&body), "start_trace")
            .await
    }

    async fn end_trace(
        &self,
        trace_id: &str,
        outputs: &Value,
        end_time: Option<SystemTime>,
    ) -> Result<(), TracingError> {
        let body = EndRunBody {
            outputs,
            end_time: timestamp(end_time),
        };
        let url = format!("{}/runs/{}", self.base_url, trace_id);
        self.send(self.http_client.patch(&url).json(&body), "end_trace")
            .await
    }
}
