use regex::{escape, RegexBuilder};
use tracing::warn;

use super::glossary::Glossary;

/// Entries whose key appears in `text` as a whole word or phrase, ignoring
/// case. Keys may contain spaces or punctuation; only the characters right
/// around an occurrence must not be word characters.
pub fn match_words_from_glossary(glossary: &Glossary, text: &str) -> Glossary {
    glossary
        .iter()
        .filter(|(key, _)| contains_term(text, key))
        .map(|(key, entry)| (key.clone(), entry.clone()))
        .collect()
}

fn contains_term(text: &str, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return false;
    }
    let pattern = format!(r"(?:^|\W){}(?:\W|$)", escape(term));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(text),
        Err(e) => {
            warn!(term, error = %e, "skipping unmatchable glossary key");
            false
        }
    }
}

/// One `key: value (comment)` line per entry, in key order.
pub fn format_glossary(glossary: &Glossary) -> String {
    glossary
        .iter()
        .map(|(key, entry)| format!("{}: {} ({})", key, entry.value, entry.comment))
        .collect::<Vec<_>>()
        .join("\n")
}
