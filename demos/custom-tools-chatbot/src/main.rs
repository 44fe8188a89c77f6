use chatgraph::{run_chat_loop, tools_chatbot_graph, Packlist, DEFAULT_MODEL};
use chatgraph_core::{init_chat_model, Context};
use clap::Parser;
use tracing::info;

/// Chat with a model that can read and update a trip packlist.
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
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    info!(model = %cli.model, "starting packlist chatbot");
    let packlist = Packlist::default();
    let graph = tools_chatbot_graph(init_chat_model(&cli.model)?, packlist.registry())?;
    run_chat_loop(&graph, &Context::default(), "Goodbye!").await?;

    let packed = packlist.packed();
    if !packed.is_empty() {
        println!("Packed this session: {}", packed.join(", "));
    }
    Ok(())
}
