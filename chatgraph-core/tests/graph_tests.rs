mod common;

use chatgraph_core::prelude::*;
use common::*;
use futures::StreamExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(State, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CounterState {
    #[update(replace)]
    count: i32,
    #[update(append)]
    history: Vec<String>,
}

// Custom test node
#[derive(Debug)]
struct IncrementNode {
    amount: i32,
}

#[async_trait::async_trait]
impl Node<CounterState> for IncrementNode {
    async fn process(&self, _ctx: &Context, state: CounterState) -> NodeResult<CounterState> {
        Ok(NodeOutput::Updates(vec![
            CounterStateUpdate::Count(state.count + self.amount),
            CounterStateUpdate::History(vec![format!("increment_{}", self.amount)]),
        ]))
    }

    fn name(&self) -> &str {
        "increment"
    }
}

#[tokio::test]
async fn test_basic_counter_flow() {
    let double_node = FunctionNode::new("double", |_ctx, mut state: CounterState| async move {
        state.count *= 2;
        state.history.push("double".into());
        Ok(NodeOutput::Full(state))
    });

    let built_graph = {
        let mut graph = Graph::new("g");
        graph
            .add_node(IncrementNode { amount: 5 })
            .add_node(double_node)
            .add_edge(START, "increment")
            .add_edge("increment", "double")
            .add_edge("double", END);
        graph.build().unwrap()
    };

    let final_state = built_graph
        .run(&Context::new("test"), CounterState { count: 10, ..Default::default() })
        .await
        .unwrap();

    assert_eq!(final_state.count, 30); // (10 + 5) * 2
    assert_eq!(final_state.history, vec!["increment_5", "double"]);
}

fn human(text: &str) -> Vec<MessagesStateUpdate> {
    vec![MessagesStateUpdate::Messages(vec![Message::human(text)])]
}

fn chatbot_node(model: ChatModel) -> impl Node<MessagesState> {
    FunctionNode::new("chatbot", move |ctx: Context, state: MessagesState| {
        let model = model.clone();
        async move {
            let reply = model.invoke(&ctx, &state.messages).await?;
            Ok(NodeOutput::Updates(vec![MessagesStateUpdate::Messages(vec![reply])]))
        }
    })
}

fn chatbot_graph(model: ChatModel) -> Graph<MessagesState, Built> {
    let mut graph = Graph::new("chatbot");
    graph
        .add_node(chatbot_node(model))
        .add_edge(START, "chatbot")
        .add_edge("chatbot", END);
    graph.build().unwrap()
}

#[tokio::test]
async fn test_memory_keeps_history_per_thread() {
    let (model, requests) = scripted_model(vec![
        text_response("Hi Will!"),
        text_response("Your name is Will."),
        text_response("I don't know your name."),
    ]);
    let graph = chatbot_graph(model).with_checkpointer(Arc::new(MemorySaver::new()));

    let thread = Context::for_thread("1");
    graph
        .invoke(&thread, human("Hi, I'm Will"))
        .await
        .unwrap();
    let outcome = graph
        .invoke(&thread, human("What's my name?"))
        .await
        .unwrap();
    assert_eq!(outcome.state().messages.len(), 4);
    assert_eq!(outcome.state().last_message().unwrap().content, "Your name is Will.");

    let other = Context::for_thread("2");
    let outcome = graph
        .invoke(&other, human("What's my name?"))
        .await
        .unwrap();
    assert_eq!(outcome.state().messages.len(), 2);

    let requests = requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[2].messages.len(), 1);
}

#[tokio::test]
async fn test_sqlite_history_survives_new_saver() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoints.sqlite");
    let thread = Context::for_thread("chatbot_conversation");

    {
        let (model, _) = scripted_model(vec![text_response("Nice to meet you")]);
        let saver = SqliteSaver::<MessagesState>::new(&path).unwrap();
        let graph = chatbot_graph(model).with_checkpointer(Arc::new(saver));
        graph
            .invoke(&thread, human("I like tea"))
            .await
            .unwrap();
    }

    let (model, requests) = scripted_model(vec![text_response("You like tea")]);
    let saver = SqliteSaver::<MessagesState>::new(&path).unwrap();
    let graph = chatbot_graph(model).with_checkpointer(Arc::new(saver));

    let snapshot = graph.get_state(&thread).await.unwrap().unwrap();
    assert_eq!(snapshot.state.messages.len(), 2);

    let events: Vec<_> = graph
        .stream(&thread, human("What do I like?"))
        .map(|event| event.unwrap())
        .collect()
        .await;
    assert_eq!(events.len(), 2);
    match &events[1] {
        StreamEvent::Values(state) => {
            assert_eq!(state.messages.len(), 4);
            assert_eq!(state.messages[3].content, "You like tea");
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(requests.lock().unwrap()[0].messages.len(), 3);
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CityParams {
    pub city: String,
}

#[derive(Clone)]
pub struct WeatherTools;

#[tools(get_weather = "Current weather for a city")]
impl WeatherTools {
    async fn get_weather(&self, params: CityParams) -> String {
        format!("It is sunny in {}", params.city)
    }
}

#[tokio::test]
async fn test_tool_loop_until_final_answer() {
    let registry = ToolRegistry::new().with(WeatherToolsGetWeather(WeatherTools));
    let (model, requests) = scripted_model(vec![
        tool_call_response(&[("call_1", "get_weather", json!({"city": "Rome"}))]),
        text_response("It's sunny in Rome."),
    ]);
    let model = model.bind_tools(registry.schemas());

    let graph = {
        let mut graph = Graph::new("tools");
        graph
            .add_node(chatbot_node(model))
            .add_node(ToolNode::new(registry))
            .add_edge(START, "chatbot")
            .add_conditional_edge("chatbot", tools_condition::<MessagesState>)
            .add_edge("tools", "chatbot");
        graph.build().unwrap()
    };

    let outcome = graph
        .invoke(&Context::default(), human("Weather in Rome?"))
        .await
        .unwrap();

    let types: Vec<MessageType> = outcome
        .state()
        .messages
        .iter()
        .map(|m| m.message_type)
        .collect();
    assert_eq!(
        types,
        vec![MessageType::Human, MessageType::AI, MessageType::Tool, MessageType::AI]
    );
    assert_eq!(outcome.state().messages[2].content, "It is sunny in Rome");

    let requests = requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[1].tools.as_ref().unwrap()[0].function.name, "get_weather");
}
