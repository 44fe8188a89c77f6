use serde_json::Value;
use std::collections::HashMap;

/// Context for node execution
#[derive(Debug, Clone)]
pub struct Context {
    /// Parent trace identifier
    pub parent_trace_id: Option<String>,
    /// Unique identifier for tracing
    pub trace_id: String,
    /// Conversation thread; required when the graph has a checkpointer
    pub thread_id: Option<String>,
    /// Per-run configurable values (model name, ...)
    pub metadata: HashMap<String, String>,
    pub(crate) resume: Option<Value>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

impl Context {
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            parent_trace_id: None,
            trace_id: trace_id.into(),
            thread_id: None,
            metadata: HashMap::new(),
            resume: None,
        }
    }

    /// Fresh trace id bound to a conversation thread.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self::default().with_thread_id(thread_id)
    }

    pub fn with_parent_trace_id(mut self, parent_trace_id: impl Into<String>) -> Self {
        self.parent_trace_id = Some(parent_trace_id.into());
        self
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn configurable(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Value passed to `Graph::resume` when this node is re-run after an
    /// interrupt. `None` on a regular execution.
    pub fn resume_value(&self) -> Option<&Value> {
        self.resume.as_ref()
    }

    /// Child context for a single node attempt: new trace id, same thread and
    /// configuration, parented to this trace.
    pub fn next_node_context(&self) -> Self {
        Self {
            parent_trace_id: Some(self.trace_id.clone()),
            trace_id: uuid::Uuid::new_v4().to_string(),
            thread_id: self.thread_id.clone(),
            metadata: self.metadata.clone(),
            resume: None,
        }
    }

    pub(crate) fn with_resume(mut self, resume: Option<Value>) -> Self {
        self.resume = resume;
        self
    }
}
