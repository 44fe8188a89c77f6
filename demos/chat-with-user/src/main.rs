use chatgraph::{chat_with_user_graph, run_chat_loop, AgentState, DEFAULT_MODEL};
use chatgraph_core::{init_chat_model, Context, MemorySaver};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

/// Chat with an assistant that decides when the conversation needs a summary.
#[derive(Parser)]
struct Cli {
    #[arg(short, long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    info!(model = %cli.model, "starting chat with user");
    let graph = chat_with_user_graph(init_chat_model(&cli.model)?)?
        .with_checkpointer(Arc::new(MemorySaver::<AgentState>::new()));
    let ctx = Context::for_thread("chat_with_user");

    run_chat_loop(&graph, &ctx, "Goodbye!").await?;

    if let Some(snapshot) = graph.get_state(&ctx).await? {
        if !snapshot.state.summary.is_empty() {
            println!("\nSummary:\n{}", snapshot.state.summary);
        }
    }
    Ok(())
}
