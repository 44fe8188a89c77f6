//! Typed tools the model can call.
//!
//! A [`ToolFunction`] is usually generated by `#[tools(...)]` from an async
//! method. [`ToolRegistry`] erases the types so a [`ToolNode`] can dispatch
//! calls by name.

mod node;
mod registry;

pub use node::{tools_condition, ToolNode, TOOLS_NODE};
pub use registry::{DynTool, ToolRegistry};

use async_trait::async_trait;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::ToolError;

pub use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};

/// Parameters of a tool that takes no arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NoParams {}

/// JSON schema for `T` with every subschema inlined, as function-calling
/// endpoints expect a self-contained object schema.
pub fn parameters_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|settings| {
            settings.inline_subschemas = true;
        })
        .into_generator();
    let root = generator.into_root_schema_for::<T>();
    let mut schema = serde_json::to_value(root).unwrap_or_else(|_| json!({ "type": "object" }));
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
        map.remove("title");
        map.remove("definitions");
    }
    schema
}

/// Trait that must be implemented by tool functions
#[async_trait]
pub trait ToolFunction: Send + Sync {
    /// The parameter type for the tool
    type Params: JsonSchema + DeserializeOwned + Send;
    /// The response type for the tool
    type Response: Serialize + Send;

    /// Get the name of the tool
    fn name() -> &'static str;

    /// Get a description of what the tool does
    fn description() -> &'static str;

    /// Get the JSON Schema for the tool's parameters
    fn parameters_schema() -> Value {
        parameters_schema::<Self::Params>()
    }

    /// Get the complete tool schema for the completion API
    fn get_schema() -> ChatCompletionTool {
        ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: Self::name().to_string(),
                description: Some(Self::description().to_string()),
                parameters: Some(Self::parameters_schema()),
                strict: None,
            },
        }
    }

    /// Execute the tool with the given parameters
    async fn execute(&self, params: Self::Params) -> Result<Self::Response, ToolError>;
}
