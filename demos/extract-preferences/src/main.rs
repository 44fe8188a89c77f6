use chatgraph::preferences::{extract_preferences, SAMPLE_CONVERSATION};
use chatgraph::DEFAULT_MODEL;
use chatgraph_core::{init_chat_model, Context};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Extract telegram and trust-fall preferences from a conversation.
#[derive(Parser)]
struct Cli {
    #[arg(short, long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Conversation transcript; defaults to a built-in sample
    #[arg(short, long)]
    file: Option<PathBuf>,
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
    info!(model = %cli.model, file = ?cli.file, "extracting preferences");
    let conversation = match &cli.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => SAMPLE_CONVERSATION.to_string(),
    };

    let model = init_chat_model(&cli.model)?;
    let preferences = extract_preferences(&Context::default(), &model, &conversation).await?;

    println!("=== Extracted Preferences ===");
    println!("{}", serde_json::to_string_pretty(&preferences)?);
    Ok(())
}
