use chatgraph::{basic_chatbot_graph, run_chat_loop, DEFAULT_MODEL};
use chatgraph_core::{init_chat_model, Context, MessagesState, SqliteSaver};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Chat with a model; the conversation is kept in SQLite across runs.
#[derive(Parser)]
struct Cli {
    #[arg(short, long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, default_value = "checkpoints.sqlite")]
    db: PathBuf,

    #[arg(short, long, default_value = "chatbot_conversation")]
    thread: String,

    /// Print the stored conversation and exit
    #[arg(long)]
    history: bool,
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
    info!(model = %cli.model, db = %cli.db.display(), thread = %cli.thread, "opening chat history");
    let saver: SqliteSaver<MessagesState> = SqliteSaver::new(&cli.db)?;
    let graph =
        basic_chatbot_graph(init_chat_model(&cli.model)?)?.with_checkpointer(Arc::new(saver));
    let ctx = Context::for_thread(cli.thread);

    if cli.history {
        if let Some(snapshot) = graph.get_state(&ctx).await? {
            for message in &snapshot.state.messages {
                message.pretty_print();
            }
        }
        return Ok(());
    }

    run_chat_loop(&graph, &ctx, "Goodbye! Your conversation has been saved to SQLite.").await?;
    Ok(())
}
