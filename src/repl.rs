use chatgraph_core::prelude::*;
use colored::Colorize;
use futures::StreamExt;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use thiserror::Error;
use tracing::debug;

/// Asked once when stdin closes before the user quit.
pub const FALLBACK_QUESTION: &str = "What do you know about LangGraph?";

#[derive(Debug, Error)]
pub enum ReplError {
    #[error(transparent)]
    Readline(#[from] ReadlineError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub fn is_exit_command(line: &str) -> bool {
    matches!(line.trim().to_ascii_lowercase().as_str(), "quit" | "exit" | "q")
}

/// Streams one human turn through the graph, handing every event to
/// `on_event`.
pub async fn stream_turn<S, F>(
    graph: &Graph<S, Built>,
    ctx: &Context,
    input: &str,
    mut on_event: F,
) -> Result<(), GraphError>
where
    S: MessageHistory + Default,
    F: FnMut(&StreamEvent<S>),
{
    let input = vec![S::messages_update(vec![Message::human(input)])];
    let mut events = graph.stream(ctx, input);
    while let Some(event) = events.next().await {
        on_event(&event?);
    }
    Ok(())
}

/// Prints the newest message of a values event, or the interrupt payload.
pub fn print_event<S: MessageHistory>(event: &StreamEvent<S>) {
    match event {
        StreamEvent::Values(state) => {
            if let Some(message) = state.last_message() {
                println!("{}", message.pretty_repr());
            }
        }
        StreamEvent::Interrupt(interrupt) => {
            println!(
                "{} {} {}",
                "Interrupted at".yellow().bold(),
                interrupt.node.cyan(),
                interrupt.value
            );
        }
    }
}

/// Reads user lines until `quit`, `exit` or `q`, streaming each through the
/// graph. On end of input the fallback question is asked once.
pub async fn run_chat_loop<S>(
    graph: &Graph<S, Built>,
    ctx: &Context,
    goodbye: &str,
) -> Result<(), ReplError>
where
    S: MessageHistory + Default,
{
    println!(
        "Chatbot started! Type {} to end the conversation.",
        "'quit', 'exit', or 'q'".yellow()
    );
    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline(&format!("{} ", "User:".cyan().bold())) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if is_exit_command(line) {
                    println!("{}", goodbye.green());
                    break;
                }
                rl.add_history_entry(line)?;
                stream_turn(graph, ctx, line, print_event).await?;
            }
            Err(ReadlineError::Interrupted) => {
                println!("\n{}", goodbye.green());
                break;
            }
            Err(ReadlineError::Eof) => {
                debug!("stdin closed, asking fallback question");
                println!("{} {}", "User:".cyan().bold(), FALLBACK_QUESTION);
                stream_turn(graph, ctx, FALLBACK_QUESTION, print_event).await?;
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
