use chatgraph_core::prelude::*;
use tracing::info;

use crate::chatbot::{ModelFactory, CHATBOT};
use crate::config::Configuration;

pub const RATE_RESPONSE: &str = "rate_response";
pub const RATING_PROMPT: &str =
    "Give a punctuation from 1 to 10 to the response made by the chatbot.";
pub const RATING_REQUEST: &str = "Please rate the chatbot's response from 1 to 10.";

/// The chatbot answers with the configured model, then a second call with
/// the default model scores that answer. Both replies end up in the history.
pub fn rated_chatbot_graph(factory: ModelFactory) -> GraphResult<Graph<MessagesState, Built>> {
    let chat_factory = factory.clone();
    let chatbot = FunctionNode::new(CHATBOT, move |ctx: Context, state: MessagesState| {
        let factory = chat_factory.clone();
        async move {
            let model_name = Configuration::from_context(&ctx).llm_model;
            info!(model = %model_name, "generating chatbot response");
            let reply = factory(&model_name)?.invoke(&ctx, &state.messages).await?;
            Ok(NodeOutput::Command(
                Command::goto(RATE_RESPONSE)
                    .update(MessagesStateUpdate::Messages(vec![Message::ai(reply.content)])),
            ))
        }
    });

    let rate = FunctionNode::new(RATE_RESPONSE, move |ctx: Context, state: MessagesState| {
        let factory = factory.clone();
        async move {
            let answer = state
                .last_message()
                .cloned()
                .ok_or_else(|| NodeError::Execution("nothing to rate".into()))?;
            let messages = [
                Message::system(RATING_PROMPT),
                answer,
                Message::human(RATING_REQUEST),
            ];
            let rating = factory(&Configuration::default().llm_model)?
                .invoke(&ctx, &messages)
                .await?;
            info!(rating = %rating.content, "rated chatbot response");
            Ok(NodeOutput::Command(
                Command::goto(END)
                    .update(MessagesStateUpdate::Messages(vec![Message::ai(rating.content)])),
            ))
        }
    });

    let mut graph = Graph::new("rated_chatbot");
    graph
        .add_node(chatbot)
        .add_node(rate)
        .add_edge(START, CHATBOT)
        .add_edge(RATE_RESPONSE, END);
    graph.build()
}
