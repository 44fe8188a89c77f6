use chatgraph_core::Context;

pub const DEFAULT_MODEL: &str = "google_genai:gemini-2.5-flash-lite";

/// Runtime settings for the workflows.
///
/// Each field is looked up in the environment first (upper-cased field name),
/// then in the run's configurable values, then falls back to its default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub llm_model: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            llm_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl Configuration {
    pub fn from_context(ctx: &Context) -> Self {
        Self::resolve(ctx, |key| std::env::var(key).ok())
    }

    fn resolve(ctx: &Context, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let field = |name: &str| {
            env(&name.to_ascii_uppercase())
                .filter(|v| !v.is_empty())
                .or_else(|| ctx.configurable(name).map(str::to_string))
        };
        if let Some(model) = field("llm_model") {
            config.llm_model = model;
        }
        config
    }
}
