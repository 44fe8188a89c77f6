//! Chat, tool and translation workflows built on `chatgraph-core`.
//!
//! Every workflow is a function returning a built graph. The demos under
//! `demos/` wire them to a terminal.

pub mod chat_with_user;
pub mod chatbot;
pub mod config;
pub mod packlist;
pub mod preferences;
pub mod rating;
pub mod repl;
pub mod translate;

pub use chat_with_user::{chat_with_user_graph, AgentState, ChatWithUserResponse};
pub use chatbot::{
    basic_chatbot_graph, configurable_chatbot_graph, tools_chatbot_graph, ModelFactory,
};
pub use config::{Configuration, DEFAULT_MODEL};
pub use packlist::Packlist;
pub use preferences::{extract_preferences, TelegramAndTrustFallPreferences};
pub use rating::{rated_chatbot_graph, RATING_PROMPT, RATING_REQUEST};
pub use repl::{run_chat_loop, stream_turn, ReplError, FALLBACK_QUESTION};
pub use translate::{translate_graph, GlossaryManager, TranslateState};
