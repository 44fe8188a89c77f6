use chatgraph_core::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A preference and the sentence that revealed it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutputFormat {
    pub preference: String,
    pub sentence_preference_revealed: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TelegramPreferences {
    #[serde(default)]
    pub preferred_encoding: Vec<OutputFormat>,
    #[serde(default)]
    pub favorite_telegram_operators: Vec<OutputFormat>,
    #[serde(default)]
    pub preferred_telegram_paper: Vec<OutputFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MorseCode {
    #[serde(default)]
    pub preferred_key_type: Vec<OutputFormat>,
    #[serde(default)]
    pub favorite_morse_abbreviations: Vec<OutputFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Semaphore {
    #[serde(default)]
    pub preferred_flag_color: Vec<OutputFormat>,
    #[serde(default)]
    pub semaphore_skill_level: Vec<OutputFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrustFallPreferences {
    #[serde(default)]
    pub preferred_fall_height: Vec<OutputFormat>,
    #[serde(default)]
    pub trust_level: Vec<OutputFormat>,
    #[serde(default)]
    pub preferred_catching_technique: Vec<OutputFormat>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommunicationPreferences {
    #[serde(default)]
    pub telegram: TelegramPreferences,
    #[serde(default)]
    pub morse_code: MorseCode,
    #[serde(default)]
    pub semaphore: Semaphore,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UserPreferences {
    #[serde(default)]
    pub communication_preferences: CommunicationPreferences,
    #[serde(default)]
    pub trust_fall_preferences: TrustFallPreferences,
}

/// Preferences a customer revealed while ordering a telegram.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TelegramAndTrustFallPreferences {
    #[serde(default)]
    pub pertinent_user_preferences: UserPreferences,
}

pub const SAMPLE_CONVERSATION: &str = r#"Operator: How may I assist with your telegram, sir?
Customer: I need to send a message about our trust fall exercise.
Operator: Certainly. Morse code or standard encoding?
Customer: Morse, please. I love using a straight key.
Operator: Excellent. What's your message?
Customer: Tell him I'm ready for a higher fall, and I prefer the diamond formation for catching.
Operator: Done. Shall I use our "Daredevil" paper for this daring message?
Customer: Perfect! Send it by your fastest carrier pigeon.
Operator: It'll be there within the hour, sir."#;

pub fn extraction_prompt(conversation: &str) -> String {
    format!(
        "Extract the preferences from the following conversation:\n<convo>\n{}\n</convo>",
        conversation
    )
}

/// Forces the model to fill [`TelegramAndTrustFallPreferences`] from the
/// conversation.
pub async fn extract_preferences(
    ctx: &Context,
    model: &ChatModel,
    conversation: &str,
) -> Result<TelegramAndTrustFallPreferences, CompletionError> {
    model
        .with_structured_output::<TelegramAndTrustFallPreferences>()
        .invoke_prompt(ctx, &extraction_prompt(conversation))
        .await
}
