use chatgraph::{configurable_chatbot_graph, run_chat_loop, ModelFactory};
use chatgraph_core::{init_chat_model, Context};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

/// Chat with a model chosen per run. `LLM_MODEL` in the environment wins
/// over `--model`.
#[derive(Parser)]
struct Cli {
    /// Passed to the graph as the `llm_model` configurable
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chatgraph=debug,warn")),
        )
        .init();

    let cli = Cli::parse();
    info!(model = ?cli.model, "starting configurable chatbot");
    let factory: ModelFactory = Arc::new(init_chat_model);
    let graph = configurable_chatbot_graph(factory)?;

    let mut ctx = Context::default();
    if let Some(model) = cli.model {
        ctx = ctx.with_metadata("llm_model", model);
    }
    run_chat_loop(&graph, &ctx, "Goodbye!").await?;
    Ok(())
}
