use async_trait::async_trait;
use chatgraph_core::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CHAT_WITH_USER: &str = "chat_with_user";
pub const CREATE_SUMMARY: &str = "create_summary";

const CHAT_WITH_USER_INSTRUCTIONS: &str = r#"
These are the messages that have been exchanged so far from the user asking for the report:
<Messages>
{messages}
</Messages>

Assess whether you need to create a summary of the conversation, or if it is not necessary, just answer the questions.

Respond in valid JSON format with these exact keys:
"needs_summary": boolean,
"summary_guidelines": "<guidelines for the summary of the conversation>",
"answer": "<answer to the user's question>"

If you need to create a summary of the conversation, return:
"needs_summary": true,
"summary_guidelines": "<guidelines for the summary of the conversation>",
"answer": ""

If you do not need to create a summary of the conversation, return:
"needs_summary": false,
"summary_guidelines": "",
"answer": "<answer to the user's question>"

For the answer when no summary is needed:
- Keep the message concise and professional
"#;

const SUMMARY_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that generates a summary of the user's messages.";

#[derive(State, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    #[update(messages)]
    pub messages: Vec<Message>,
    pub summary: String,
}

impl MessageHistory for AgentState {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_update(messages: Vec<Message>) -> AgentStateUpdate {
        AgentStateUpdate::Messages(messages)
    }
}

/// Decision of the chat_with_user node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChatWithUserResponse {
    /// Whether the user needs a summary of the conversation.
    pub needs_summary: bool,
    /// Guidelines for the summary of the conversation.
    #[serde(default)]
    pub summary_guidelines: String,
    /// Answer to the user's question.
    #[serde(default)]
    pub answer: String,
}

pub fn chat_with_user_prompt(messages: &[Message]) -> String {
    CHAT_WITH_USER_INSTRUCTIONS.replace("{messages}", &buffer_string(messages))
}

#[derive(Debug)]
struct ChatWithUser(ChatModel);

#[async_trait]
impl Node<AgentState> for ChatWithUser {
    async fn process(&self, ctx: &Context, state: AgentState) -> NodeResult<AgentState> {
        let response = self
            .0
            .with_structured_output::<ChatWithUserResponse>()
            .invoke_prompt(ctx, &chat_with_user_prompt(&state.messages))
            .await?;
        debug!(needs_summary = response.needs_summary, "chat decision");

        let command = if response.needs_summary {
            Command::goto(CREATE_SUMMARY).update(AgentStateUpdate::Messages(vec![Message::ai(
                response.summary_guidelines,
            )]))
        } else {
            Command::goto(END).update(AgentStateUpdate::Messages(vec![Message::ai(
                response.answer,
            )]))
        };
        Ok(NodeOutput::Command(command))
    }

    fn name(&self) -> &str {
        CHAT_WITH_USER
    }
}

#[derive(Debug)]
struct CreateSummary(ChatModel);

#[async_trait]
impl Node<AgentState> for CreateSummary {
    async fn process(&self, ctx: &Context, state: AgentState) -> NodeResult<AgentState> {
        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(SUMMARY_SYSTEM_PROMPT));
        messages.extend(state.messages);

        let summary = self.0.invoke(ctx, &messages).await?;
        Ok(NodeOutput::Command(
            Command::goto(END).update(AgentStateUpdate::Summary(summary.content)),
        ))
    }

    fn name(&self) -> &str {
        CREATE_SUMMARY
    }
}

/// Answers directly, or writes summary guidelines and hands off to
/// `create_summary`, which stores the summary in `AgentState::summary`.
pub fn chat_with_user_graph(model: ChatModel) -> GraphResult<Graph<AgentState, Built>> {
    let mut graph = Graph::new("chat_with_user");
    graph
        .add_node(ChatWithUser(model.clone()))
        .add_node(CreateSummary(model))
        .add_edge(START, CHAT_WITH_USER);
    graph.build()
}
