use chatgraph::{rated_chatbot_graph, run_chat_loop, ModelFactory};
use chatgraph_core::{init_chat_model, Context};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

/// Chat with a model and have a second call rate each answer from 1 to 10.
#[derive(Parser)]
struct Cli {
    /// Model for the answers; ratings always use the default model
    #[arg(short, long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("chatgraph=info,warn")),
        )
        .init();

    let cli = Cli::parse();
    info!(model = ?cli.model, "starting rated chatbot");
    let factory: ModelFactory = Arc::new(init_chat_model);
    let graph = rated_chatbot_graph(factory)?;

    let mut ctx = Context::default();
    if let Some(model) = cli.model {
        ctx = ctx.with_metadata("llm_model", model);
    }
    run_chat_loop(&graph, &ctx, "Goodbye!").await?;
    Ok(())
}
