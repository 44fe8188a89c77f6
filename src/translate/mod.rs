//! Translation with human review and a glossary that learns from it.
//!
//! ```text
//! START -> initial_translation -> supervisor <-> refine_translation
//!                                      ^                |
//!                                      +-- improve_glossary
//! ```
//!
//! `supervisor` interrupts after each translation; the reviewer's reply is
//! the resume value. `improve_glossary` turns a correction in that reply into
//! a glossary entry used by later translations.

mod glossary;
mod graph;
mod matcher;
mod prompts;

pub use glossary::{Glossary, GlossaryEntry, GlossaryError, GlossaryManager};
pub use graph::{
    translate_graph, translate_graph_with_prompts, GlossaryUpdate, TranslateState,
    TranslateStateUpdate, IMPROVE_GLOSSARY, INITIAL_TRANSLATION, REFINE_TRANSLATION, SUPERVISOR,
};
pub use matcher::{format_glossary, match_words_from_glossary};
pub use prompts::TranslationPrompts;
