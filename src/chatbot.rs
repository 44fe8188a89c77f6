use chatgraph_core::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::config::Configuration;

pub const CHATBOT: &str = "chatbot";

/// Builds a model from a `provider:model` string, `init_chat_model` in
/// production.
pub type ModelFactory = Arc<dyn Fn(&str) -> Result<ChatModel, CompletionError> + Send + Sync>;

fn chatbot_node(model: ChatModel) -> impl Node<MessagesState> {
    FunctionNode::new(CHATBOT, move |ctx: Context, state: MessagesState| {
        let model = model.clone();
        async move {
            let reply = model.invoke(&ctx, &state.messages).await?;
            Ok(NodeOutput::Updates(vec![MessagesStateUpdate::Messages(vec![reply])]))
        }
    })
}

/// `START -> chatbot -> END`; the model sees the whole history.
pub fn basic_chatbot_graph(model: ChatModel) -> GraphResult<Graph<MessagesState, Built>> {
    let mut graph = Graph::new("basic_chatbot");
    graph
        .add_node(chatbot_node(model))
        .add_edge(START, CHATBOT)
        .add_edge(CHATBOT, END);
    graph.build()
}

/// Like [`basic_chatbot_graph`], but the model is picked per run from
/// [`Configuration`].
pub fn configurable_chatbot_graph(
    factory: ModelFactory,
) -> GraphResult<Graph<MessagesState, Built>> {
    let node = FunctionNode::new(CHATBOT, move |ctx: Context, state: MessagesState| {
        let factory = factory.clone();
        async move {
            let config = Configuration::from_context(&ctx);
            debug!(model = %config.llm_model, "configured chatbot model");
            let model = factory(&config.llm_model)?;
            let reply = model.invoke(&ctx, &state.messages).await?;
            Ok(NodeOutput::Updates(vec![MessagesStateUpdate::Messages(vec![reply])]))
        }
    });

    let mut graph = Graph::new("configurable_chatbot");
    graph
        .add_node(node)
        .add_edge(START, CHATBOT)
        .add_edge(CHATBOT, END);
    graph.build()
}

/// Chatbot that may call the registry's tools. Tool results go back to the
/// model until it answers without tool calls.
pub fn tools_chatbot_graph(
    model: ChatModel,
    registry: ToolRegistry,
) -> GraphResult<Graph<MessagesState, Built>> {
    let model = model.bind_tools(registry.schemas());

    let mut graph = Graph::new("tools_chatbot");
    graph
        .add_node(chatbot_node(model))
        .add_node(ToolNode::new(registry))
        .add_edge(START, CHATBOT)
        .add_conditional_edge(CHATBOT, tools_condition::<MessagesState>)
        .add_edge(chatgraph_core::tool::TOOLS_NODE, CHATBOT);
    graph.build()
}
