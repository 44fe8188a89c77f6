mod common;

use chatgraph::chatbot::*;
use chatgraph::repl::stream_turn;
use chatgraph::{Configuration, Packlist};
use chatgraph_core::prelude::*;
use common::*;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn human(text: &str) -> Vec<MessagesStateUpdate> {
    vec![MessagesStateUpdate::Messages(vec![Message::human(text)])]
}

#[tokio::test]
async fn test_basic_chatbot_streams_values() {
    let (model, requests) = scripted_model(vec![text_response("LangGraph builds agents.")]);
    let graph = basic_chatbot_graph(model).unwrap();

    let mut seen = Vec::new();
    stream_turn(&graph, &Context::default(), "What is LangGraph?", |event| {
        if let StreamEvent::Values(state) = event {
            seen.push(state.last_message().unwrap().content.clone());
        }
    })
    .await
    .unwrap();

    assert_eq!(seen, vec!["What is LangGraph?", "LangGraph builds agents."]);
    assert_eq!(requests.lock().unwrap()[0].model, "test-model");
}

#[tokio::test]
async fn test_memory_chatbot_remembers_thread() {
    let (model, requests) = scripted_model(vec![
        text_response("Hi Ana!"),
        text_response("Your name is Ana."),
    ]);
    let graph = basic_chatbot_graph(model)
        .unwrap()
        .with_checkpointer(Arc::new(MemorySaver::new()));
    let ctx = Context::for_thread("1");

    graph.invoke(&ctx, human("I'm Ana")).await.unwrap();
    let outcome = graph.invoke(&ctx, human("What's my name?")).await.unwrap();

    assert_eq!(outcome.state().messages.len(), 4);
    let requests = requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(message_text(&requests[1], 0), "I'm Ana");

    // another thread starts empty
    drop(requests);
    let other = graph.get_state(&Context::for_thread("2")).await.unwrap();
    assert!(other.is_none());
}

#[tokio::test]
async fn test_sqlite_chatbot_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("checkpoints.sqlite");
    let ctx = Context::for_thread("chatbot_conversation");

    {
        let (model, _) = scripted_model(vec![text_response("Noted.")]);
        let graph = basic_chatbot_graph(model)
            .unwrap()
            .with_checkpointer(Arc::new(SqliteSaver::new(&db).unwrap()));
        graph.invoke(&ctx, human("Remember 42")).await.unwrap();
    }

    let (model, requests) = scripted_model(vec![text_response("You said 42.")]);
    let graph = basic_chatbot_graph(model)
        .unwrap()
        .with_checkpointer(Arc::new(SqliteSaver::new(&db).unwrap()));
    graph.invoke(&ctx, human("What did I say?")).await.unwrap();

    assert_eq!(requests.lock().unwrap()[0].messages.len(), 3);
}

#[tokio::test]
async fn test_configurable_chatbot_resolves_model_per_run() {
    let (model, _requests) = scripted_model(vec![text_response("ok")]);
    let asked = Arc::new(Mutex::new(Vec::new()));
    let factory: ModelFactory = {
        let asked = asked.clone();
        Arc::new(move |name: &str| {
            asked.lock().unwrap().push(name.to_string());
            Ok(model.clone())
        })
    };
    let graph = configurable_chatbot_graph(factory).unwrap();
    let ctx = Context::default().with_metadata("llm_model", "openai:gpt-4o-mini");

    graph.invoke(&ctx, human("hello")).await.unwrap();

    let expected = Configuration::from_context(&ctx).llm_model;
    assert_eq!(*asked.lock().unwrap(), vec![expected]);
}

#[tokio::test]
async fn test_configurable_chatbot_surfaces_bad_model() {
    let factory: ModelFactory = Arc::new(|name: &str| {
        Err(CompletionError::InvalidModelSpec(name.to_string()))
    });
    let graph = configurable_chatbot_graph(factory).unwrap();

    let err = graph
        .invoke(&Context::default(), human("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Node(NodeError::ModelError(_))));
}

#[tokio::test]
async fn test_packlist_tools_chatbot() {
    let packlist = Packlist::default();
    let (model, requests) = scripted_model(vec![
        tool_call_response(&[
            ("call_1", "mark_item_as_packed", json!({ "item_name": "Water" })),
            ("call_2", "list_packlist_missing_items", json!({})),
        ]),
        text_response("Water is packed. Still missing: Sunscreen, Snacks."),
    ]);
    let graph = tools_chatbot_graph(model, packlist.registry()).unwrap();

    let outcome = graph
        .invoke(&Context::default(), human("I packed the water, what's left?"))
        .await
        .unwrap();

    let messages = &outcome.state().messages;
    assert_eq!(messages.len(), 5);
    assert_eq!(messages[2].content, "Item Water marked as packed in the packlist");
    assert_eq!(messages[2].name.as_deref(), Some("mark_item_as_packed"));
    assert_eq!(messages[3].content, r#"["Sunscreen","Snacks"]"#);
    assert_eq!(packlist.packed(), vec!["Water"]);

    let requests = requests.lock().unwrap();
    let mut offered: Vec<String> = requests[0]
        .tools
        .as_ref()
        .unwrap()
        .iter()
        .map(|tool| tool.function.name.clone())
        .collect();
    offered.sort();
    assert_eq!(
        offered,
        vec![
            "add_item_to_packlist",
            "list_packlist_missing_items",
            "mark_item_as_packed"
        ]
    );
    assert_eq!(message_role(&requests[1], 2), "tool");
}
