use chatgraph::{basic_chatbot_graph, run_chat_loop, DEFAULT_MODEL};
use chatgraph_core::{init_chat_model, Context, MemorySaver};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

/// Chat with a model that remembers the conversation until the process exits.
#[derive(Parser)]
struct Cli {
    #[arg(short, long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(short, long, default_value = "1")]
    thread: String,
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
    info!(model = %cli.model, "starting chatbot with in-memory history");
    let graph = basic_chatbot_graph(init_chat_model(&cli.model)?)?
        .with_checkpointer(Arc::new(MemorySaver::new()));
    run_chat_loop(&graph, &Context::for_thread(cli.thread), "Goodbye!").await?;
    Ok(())
}
