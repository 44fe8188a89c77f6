use chatgraph::{basic_chatbot_graph, run_chat_loop, DEFAULT_MODEL};
use chatgraph_core::{init_chat_model, Context};
use clap::Parser;
use tracing::info;

/// Chat with a model; every turn starts a fresh conversation.
#[derive(Parser)]
struct Cli {
    /// Model as `provider:model`
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
    info!(model = %cli.model, "starting basic chatbot");
    let graph = basic_chatbot_graph(init_chat_model(&cli.model)?)?;
    run_chat_loop(&graph, &Context::default(), "Goodbye!").await?;
    Ok(())
}
