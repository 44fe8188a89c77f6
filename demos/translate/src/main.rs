use chatgraph::translate::{
    translate_graph_with_prompts, GlossaryManager, TranslateState, TranslateStateUpdate,
    TranslationPrompts,
};
use chatgraph::DEFAULT_MODEL;
use chatgraph_core::{init_chat_model, Context, MemorySaver, Message, MessageHistory, RunOutcome};
use clap::Parser;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Translate text, review each translation, and let corrections grow the
/// glossary.
#[derive(Parser)]
struct Cli {
    #[arg(short, long, env = "LLM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(short, long, env = "GLOSSARY_PATH", default_value = "glossary_en_es.json")]
    glossary: PathBuf,

    #[arg(long, default_value = "English")]
    from: String,

    #[arg(long, default_value = "Spanish")]
    to: String,
}

fn read(rl: &mut DefaultEditor, prompt: &str) -> anyhow::Result<Option<String>> {
    match rl.readline(&format!("{} ", prompt.cyan().bold())) {
        Ok(line) => {
            let line = line.trim().to_string();
            if !line.is_empty() {
                rl.add_history_entry(&line)?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn show(outcome: &RunOutcome<TranslateState>) {
    match outcome.interrupt() {
        Some(interrupt) => {
            let text = interrupt.value["text_to_revise"].as_str().unwrap_or_default();
            println!("{}\n{}\n", "To revise:".yellow().bold(), text);
        }
        None => println!("{}", outcome.state().current_translation),
    }
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
    info!(model = %cli.model, from = %cli.from, to = %cli.to, "starting translator");
    let glossary = Arc::new(GlossaryManager::new(&cli.glossary));
    let graph = translate_graph_with_prompts(
        init_chat_model(&cli.model)?,
        glossary.clone(),
        TranslationPrompts::new(&cli.from, &cli.to),
    )?
    .with_checkpointer(Arc::new(MemorySaver::new()));

    println!(
        "{} glossary at {}. Empty feedback accepts a translation, {} quits.",
        "Translator".green().bold(),
        glossary.path().display(),
        "quit".yellow()
    );

    let mut rl = DefaultEditor::new()?;
    let mut turn = 0;
    while let Some(text) = read(&mut rl, "Text:")? {
        if text.eq_ignore_ascii_case("quit") {
            break;
        }
        if text.is_empty() {
            continue;
        }

        // one thread per text keeps each review history separate
        turn += 1;
        let ctx = Context::for_thread(format!("translate-{turn}"));
        let input = vec![TranslateStateUpdate::Messages(vec![Message::human(text)])];
        let mut outcome = graph.invoke(&ctx, input).await?;
        show(&outcome);

        while outcome.is_interrupted() {
            match read(&mut rl, "Feedback:")? {
                Some(feedback) if !feedback.is_empty() => {
                    outcome = graph.resume(&ctx, json!(feedback)).await?;
                    let state = outcome.state();
                    println!(
                        "{} (iteration {})\n{}",
                        "Translation:".green().bold(),
                        state.translate_iterations,
                        state.current_translation
                    );
                    if let Some(note) = state.last_message() {
                        println!("{} {}\n", "Glossary:".magenta().bold(), note.content);
                    }
                }
                _ => break,
            }
        }
    }

    println!("{}", "Goodbye!".green());
    Ok(())
}
