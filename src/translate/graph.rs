use async_trait::async_trait;
use chatgraph_core::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::glossary::{Glossary, GlossaryManager};
use super::matcher::{format_glossary, match_words_from_glossary};
use super::prompts::TranslationPrompts;

pub const INITIAL_TRANSLATION: &str = "initial_translation";
pub const SUPERVISOR: &str = "supervisor";
pub const REFINE_TRANSLATION: &str = "refine_translation";
pub const IMPROVE_GLOSSARY: &str = "improve_glossary";

#[derive(State, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslateState {
    #[update(messages)]
    pub messages: Vec<Message>,
    pub original_text: String,
    pub current_translation: String,
    /// Glossary entries found in `original_text`
    pub words_to_match: Glossary,
    pub translate_iterations: u32,
}

impl MessageHistory for TranslateState {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_update(messages: Vec<Message>) -> TranslateStateUpdate {
        TranslateStateUpdate::Messages(messages)
    }
}

/// A correction extracted from reviewer feedback. Empty fields mean the
/// feedback held no term substitution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GlossaryUpdate {
    /// Term as written in the original text
    #[serde(default)]
    pub source: String,
    /// Corrected translation given by the reviewer
    #[serde(default)]
    pub target: String,
    /// Short imperative note on when to use the translation
    #[serde(default)]
    pub note: String,
}

impl GlossaryUpdate {
    pub fn is_empty(&self) -> bool {
        self.source.trim().is_empty() || self.target.trim().is_empty()
    }
}

/// Shared by every node of one translate graph.
#[derive(Debug)]
struct Translator {
    model: ChatModel,
    glossary: Arc<GlossaryManager>,
    prompts: TranslationPrompts,
}

fn last_content(state: &TranslateState) -> Result<&str, NodeError> {
    state
        .last_message()
        .map(|m| m.content.as_str())
        .ok_or_else(|| NodeError::Execution("translate state has no messages".into()))
}

fn tail(messages: &[Message], n: usize) -> &[Message] {
    &messages[messages.len().saturating_sub(n)..]
}

#[derive(Debug)]
struct InitialTranslation(Arc<Translator>);

#[async_trait]
impl Node<TranslateState> for InitialTranslation {
    async fn process(&self, ctx: &Context, state: TranslateState) -> NodeResult<TranslateState> {
        let text = last_content(&state)?.to_string();

        let glossary = self.0.glossary.load_glossary().await?;
        let found = match_words_from_glossary(&glossary, &text);
        debug!(matched = found.len(), total = glossary.len(), "glossary lookup");

        let prompt = self.0.prompts.first_translation(&text, &format_glossary(&found));
        let reply = self.0.model.invoke_prompt(ctx, &prompt).await?;
        let translation = reply.content.clone();

        Ok(NodeOutput::Command(
            Command::goto(SUPERVISOR)
                .update(TranslateStateUpdate::Messages(vec![Message::ai(&translation)]))
                .update(TranslateStateUpdate::CurrentTranslation(translation))
                .update(TranslateStateUpdate::WordsToMatch(found))
                .update(TranslateStateUpdate::TranslateIterations(1))
                .update(TranslateStateUpdate::OriginalText(text)),
        ))
    }

    fn name(&self) -> &str {
        INITIAL_TRANSLATION
    }
}

/// Pauses for human review. The resume value is the reviewer's feedback.
#[derive(Debug)]
struct Supervisor;

#[async_trait]
impl Node<TranslateState> for Supervisor {
    async fn process(&self, ctx: &Context, state: TranslateState) -> NodeResult<TranslateState> {
        let Some(value) = ctx.resume_value() else {
            return Ok(NodeOutput::Interrupt(
                json!({ "text_to_revise": last_content(&state)? }),
            ));
        };

        let feedback = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        debug!(%feedback, "review received");
        Ok(NodeOutput::Command(
            Command::goto(REFINE_TRANSLATION)
                .update(TranslateStateUpdate::Messages(vec![Message::human(feedback)])),
        ))
    }

    fn name(&self) -> &str {
        SUPERVISOR
    }
}

#[derive(Debug)]
struct RefineTranslation(Arc<Translator>);

#[async_trait]
impl Node<TranslateState> for RefineTranslation {
    async fn process(&self, ctx: &Context, state: TranslateState) -> NodeResult<TranslateState> {
        // no glossary here: the reviewer's correction is the only steer
        let prompt = self
            .0
            .prompts
            .improve_translation(&buffer_string(tail(&state.messages, 2)), "");
        let reply = self.0.model.invoke_prompt(ctx, &prompt).await?;
        let translation = reply.content.clone();

        Ok(NodeOutput::Command(
            Command::goto(IMPROVE_GLOSSARY)
                .update(TranslateStateUpdate::Messages(vec![Message::ai(&translation)]))
                .update(TranslateStateUpdate::CurrentTranslation(translation))
                .update(TranslateStateUpdate::TranslateIterations(
                    state.translate_iterations + 1,
                )),
        ))
    }

    fn name(&self) -> &str {
        REFINE_TRANSLATION
    }
}

#[derive(Debug)]
struct ImproveGlossary(Arc<Translator>);

#[async_trait]
impl Node<TranslateState> for ImproveGlossary {
    async fn process(&self, ctx: &Context, state: TranslateState) -> NodeResult<TranslateState> {
        let prompt = self
            .0
            .prompts
            .improve_glossary(&buffer_string(tail(&state.messages, 3)), &state.original_text);

        let update = match self
            .0
            .model
            .with_structured_output::<GlossaryUpdate>()
            .invoke_prompt(ctx, &prompt)
            .await
        {
            Ok(update) => update,
            // the model may answer `null` when it sees no correction
            Err(CompletionError::Parse(e)) => {
                warn!(error = %e, "unparseable glossary update, skipping");
                GlossaryUpdate::default()
            }
            Err(e) => return Err(e.into()),
        };

        if update.is_empty() {
            debug!("no glossary correction in feedback");
        } else {
            self.0
                .glossary
                .add_source(update.source.trim(), update.target.trim(), &update.note)
                .await?;
            info!(source = %update.source, target = %update.target, "learned glossary term");
        }

        let note = if update.note.is_empty() {
            "No glossary update.".to_string()
        } else {
            update.note
        };
        Ok(NodeOutput::Command(
            Command::goto(SUPERVISOR)
                .update(TranslateStateUpdate::Messages(vec![Message::ai(note)])),
        ))
    }

    fn name(&self) -> &str {
        IMPROVE_GLOSSARY
    }
}

/// English to Spanish translation with human review and glossary learning.
///
/// The run stops at `supervisor` with `{"text_to_revise": ...}` after every
/// translation. Resuming with feedback refines the translation, stores any
/// term correction in the glossary and stops at `supervisor` again. Attach a
/// checkpointer before running, interrupts need one to be resumed.
pub fn translate_graph(
    model: ChatModel,
    glossary: Arc<GlossaryManager>,
) -> GraphResult<Graph<TranslateState, Built>> {
    translate_graph_with_prompts(model, glossary, TranslationPrompts::default())
}

pub fn translate_graph_with_prompts(
    model: ChatModel,
    glossary: Arc<GlossaryManager>,
    prompts: TranslationPrompts,
) -> GraphResult<Graph<TranslateState, Built>> {
    let translator = Arc::new(Translator {
        model,
        glossary,
        prompts,
    });

    let mut graph = Graph::new("translate");
    graph
        .add_node(InitialTranslation(translator.clone()))
        .add_node(Supervisor)
        .add_node(RefineTranslation(translator.clone()))
        .add_node(ImproveGlossary(translator))
        .add_edge(START, INITIAL_TRANSLATION);
    graph.build()
}
