mod config;
mod context;
mod function;

pub use config::NodeConfig;
pub use context::Context;
pub use function::FunctionNode;

use crate::types::{GraphState, NodeResult};
use async_trait::async_trait;
use std::fmt::Debug;

/// A step of a graph.
///
/// `process` receives a copy of the current state and says what to do with
/// it through [`NodeOutput`](crate::types::NodeOutput): replace it, fold
/// updates into it, jump elsewhere, or pause for input. A paused node is run
/// again on resume with the resume value on its `Context`.
#[async_trait]
pub trait Node<S>: Send + Sync + Debug
where
    S: GraphState,
{
    async fn process(&self, ctx: &Context, state: S) -> NodeResult<S>;

    /// Key used by edges and `Command::goto`.
    fn name(&self) -> &str;
}
