mod common;

use chatgraph::chat_with_user::*;
use chatgraph::preferences::*;
use chatgraph::rating::*;
use chatgraph::ModelFactory;
use chatgraph_core::prelude::*;
use common::*;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_rated_chatbot_scores_last_answer() {
    let (model, requests) = scripted_model(vec![
        text_response("Paris is the capital of France."),
        text_response("9"),
    ]);
    let factory: ModelFactory = Arc::new(move |_: &str| Ok(model.clone()));
    let graph = rated_chatbot_graph(factory).unwrap();

    let outcome = graph
        .invoke(
            &Context::default(),
            vec![MessagesStateUpdate::Messages(vec![Message::human(
                "Capital of France?",
            )])],
        )
        .await
        .unwrap();

    let contents: Vec<&str> = outcome
        .state()
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(
        contents,
        vec!["Capital of France?", "Paris is the capital of France.", "9"]
    );

    let requests = requests.lock().unwrap();
    let rating = &requests[1];
    assert_eq!(rating.messages.len(), 3);
    assert_eq!(message_role(rating, 0), "system");
    assert_eq!(message_text(rating, 0), RATING_PROMPT);
    assert_eq!(message_role(rating, 1), "assistant");
    assert_eq!(message_text(rating, 1), "Paris is the capital of France.");
    assert_eq!(message_text(rating, 2), RATING_REQUEST);
}

fn user_turn(text: &str) -> Vec<AgentStateUpdate> {
    vec![AgentStateUpdate::Messages(vec![Message::human(text)])]
}

#[tokio::test]
async fn test_chat_with_user_answers_directly() {
    let (model, requests) = scripted_model(vec![tool_call_response(&[(
        "call_1",
        "ChatWithUserResponse",
        json!({ "needs_summary": false, "summary_guidelines": "", "answer": "It is 4." }),
    )])]);
    let graph = chat_with_user_graph(model).unwrap();

    let outcome = graph
        .invoke(&Context::default(), user_turn("What is 2 + 2?"))
        .await
        .unwrap();

    let state = outcome.into_state();
    assert_eq!(state.messages.last().unwrap().content, "It is 4.");
    assert!(state.summary.is_empty());
    assert!(message_text(&requests.lock().unwrap()[0], 0).contains("Human: What is 2 + 2?"));
}

#[tokio::test]
async fn test_chat_with_user_creates_summary() {
    let (model, requests) = scripted_model(vec![
        tool_call_response(&[(
            "call_1",
            "ChatWithUserResponse",
            json!({
                "needs_summary": true,
                "summary_guidelines": "Summarize the report request in two lines",
                "answer": ""
            }),
        )]),
        text_response("The user wants a report on rivers."),
    ]);
    let graph = chat_with_user_graph(model).unwrap();

    let outcome = graph
        .invoke(
            &Context::default(),
            user_turn("Summarize what I asked for the rivers report"),
        )
        .await
        .unwrap();

    let state = outcome.state();
    assert_eq!(state.summary, "The user wants a report on rivers.");
    assert_eq!(
        state.messages.last().unwrap().content,
        "Summarize the report request in two lines"
    );

    let requests = requests.lock().unwrap();
    assert_eq!(message_role(&requests[1], 0), "system");
    assert_eq!(requests[1].messages.len(), 3);
}

#[tokio::test]
async fn test_extract_preferences_from_forced_tool() {
    let (model, requests) = scripted_model(vec![tool_call_response(&[(
        "call_1",
        "TelegramAndTrustFallPreferences",
        json!({
            "pertinent_user_preferences": {
                "communication_preferences": {
                    "morse_code": {
                        "preferred_key_type": [{
                            "preference": "straight key",
                            "sentence_preference_revealed": "I love using a straight key."
                        }]
                    },
                    "telegram": {
                        "preferred_telegram_paper": [{
                            "preference": "Daredevil",
                            "sentence_preference_revealed": "Perfect!"
                        }]
                    }
                },
                "trust_fall_preferences": {
                    "preferred_catching_technique": [{
                        "preference": "diamond formation",
                        "sentence_preference_revealed": "I prefer the diamond formation for catching."
                    }]
                }
            }
        }),
    )])]);

    let prefs = extract_preferences(&Context::default(), &model, SAMPLE_CONVERSATION)
        .await
        .unwrap();

    let user = &prefs.pertinent_user_preferences;
    assert_eq!(
        user.communication_preferences.morse_code.preferred_key_type[0].preference,
        "straight key"
    );
    assert_eq!(
        user.trust_fall_preferences.preferred_catching_technique[0].preference,
        "diamond formation"
    );
    assert!(user.communication_preferences.semaphore.preferred_flag_color.is_empty());

    let requests = requests.lock().unwrap();
    let prompt = message_text(&requests[0], 0);
    assert!(prompt.starts_with("Extract the preferences from the following conversation:"));
    assert!(prompt.contains("Morse, please."));
    let tools = requests[0].tools.as_ref().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0].function.name, "TelegramAndTrustFallPreferences");
}

#[tokio::test]
async fn test_extract_preferences_reports_garbage() {
    let (model, _requests) = scripted_model(vec![text_response("I cannot help with that.")]);
    let err = extract_preferences(&Context::default(), &model, "A: hi")
        .await
        .unwrap_err();
    assert!(matches!(err, CompletionError::Parse(_)));
}
