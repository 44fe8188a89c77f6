use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use tracing::debug;

use super::{ChatCompletionTool, ToolFunction};
use crate::types::ToolError;

/// JSON-in, JSON-out view of a tool, usable as a trait object.
#[async_trait]
pub trait DynTool: Send + Sync {
    fn tool_name(&self) -> &str;

    fn tool_schema(&self) -> ChatCompletionTool;

    async fn call_json(&self, args: Value) -> Result<Value, ToolError>;
}

#[async_trait]
impl<T> DynTool for T
where
    T: ToolFunction + 'static,
{
    fn tool_name(&self) -> &str {
        <T as ToolFunction>::name()
    }

    fn tool_schema(&self) -> ChatCompletionTool {
        <T as ToolFunction>::get_schema()
    }

    async fn call_json(&self, args: Value) -> Result<Value, ToolError> {
        let params: T::Params = serde_json::from_value(args).map_err(|e| {
            ToolError::Schema(format!(
                "invalid arguments for {}: {}",
                <T as ToolFunction>::name(),
                e
            ))
        })?;
        let response = self.execute(params).await?;
        Ok(serde_json::to_value(response)?)
    }
}

/// Tools by name, in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn DynTool>>,
    index: HashMap<String, usize>,
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool. A tool with the same name is replaced.
    pub fn register<T>(&mut self, tool: T) -> &mut Self
    where
        T: ToolFunction + 'static,
    {
        self.register_dyn(Arc::new(tool))
    }

    pub fn register_dyn(&mut self, tool: Arc<dyn DynTool>) -> &mut Self {
        let name = tool.tool_name().to_string();
        match self.index.get(&name) {
            Some(&slot) => self.tools[slot] = tool,
            None => {
                self.index.insert(name, self.tools.len());
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn with<T>(mut self, tool: T) -> Self
    where
        T: ToolFunction + 'static,
    {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn DynTool>> {
        self.index.get(name).map(|&slot| &self.tools[slot])
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|tool| tool.tool_name()).collect()
    }

    /// Schemas to bind to a chat model.
    pub fn schemas(&self) -> Vec<ChatCompletionTool> {
        self.tools.iter().map(|tool| tool.tool_schema()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub async fn call(&self, name: &str, args: Value) -> Result<Value, ToolError> {
        let tool = self.get(name).ok_or_else(|| {
            ToolError::Execution(format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.names().join(", ")
            ))
        })?;
        debug!(tool = name, "calling tool");
        tool.call_json(args).await
    }
}
