const TRANSLATION_INSTRUCTIONS: &str = "
You are a translation agent from {source} to {target}.

You have a glossary of words that you can use to translate the text.
Between brackets you will find the comment of the word, this gives context of when the glossary should be used.
Be very strict and analyze the context to just use the glossary when necessary.
Respect the case of the original word, even if the case in the glossary is different. Example: (Tree) should be (Árbol)

{glossary}
";

const FIRST_TRANSLATION: &str = "
Translate the following text to {target}:
{text_to_translate}

Follow the instructions:
{translation_instructions}
";

const IMPROVE_TRANSLATION: &str = "
These are the last two messages that have been exchanged so far from the user asking for the translation:
<Messages>
{messages}
</Messages>

Take a look at the feedback made by the user and improve the translation. Following the instructions
{translation_instructions}
";

const IMPROVE_GLOSSARY: &str = "
You are an assistant that extracts glossary updates from user feedback.

The last messages exchanged between the AI and the human.
<Messages>
{messages}
</Messages>

The original {source} text. Extract the source word from the original text.
<OriginalText>
{original_text}
</OriginalText>

Your task is to identify when the human requests a word substitution or correction.

Very important:

* `source` must always come from the **original {source} text**, never from the AI's output.
* `target` must be the **corrected word/phrase provided by the human**.
* `note` small note to be able to use the glossary in the future, be concise and imperative. (Use x instead of y)

Return only a JSON object in this format:

```json
{
  \"source\": \"<word in {source} from original text>\",
  \"target\": \"<corrected translation from user>\",
  \"note\": \"<short explanation>\"
}
```

If no correction is detected, return empty strings for every field.
";

/// Prompt templates for one language pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationPrompts {
    pub source_language: String,
    pub target_language: String,
}

impl Default for TranslationPrompts {
    fn default() -> Self {
        Self::new("English", "Spanish")
    }
}

impl TranslationPrompts {
    pub fn new(source_language: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Fills `template` in one pass, so substituted text is never scanned for
    /// placeholders again.
    fn fill(&self, template: &str, vars: &[(&str, &str)]) -> String {
        let languages = [
            ("source", self.source_language.as_str()),
            ("target", self.target_language.as_str()),
        ];
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let hit = languages.iter().chain(vars).find_map(|(name, value)| {
                let tail = after.strip_prefix(*name)?.strip_prefix('}')?;
                Some((*value, tail))
            });
            match hit {
                Some((value, tail)) => {
                    out.push_str(value);
                    rest = tail;
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// How to use the glossary; `glossary` is already formatted.
    pub fn translation_instructions(&self, glossary: &str) -> String {
        self.fill(TRANSLATION_INSTRUCTIONS, &[("glossary", glossary)])
    }

    pub fn first_translation(&self, text: &str, glossary: &str) -> String {
        let instructions = self.translation_instructions(glossary);
        self.fill(
            FIRST_TRANSLATION,
            &[
                ("translation_instructions", instructions.as_str()),
                ("text_to_translate", text),
            ],
        )
    }

    pub fn improve_translation(&self, messages: &str, glossary: &str) -> String {
        let instructions = self.translation_instructions(glossary);
        self.fill(
            IMPROVE_TRANSLATION,
            &[("translation_instructions", instructions.as_str()), ("messages", messages)],
        )
    }

    pub fn improve_glossary(&self, messages: &str, original_text: &str) -> String {
        self.fill(
            IMPROVE_GLOSSARY,
            &[("messages", messages), ("original_text", original_text)],
        )
    }
}
