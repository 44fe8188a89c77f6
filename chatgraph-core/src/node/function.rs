use async_trait::async_trait;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::marker::PhantomData;

use crate::node::{Context, Node};
use crate::types::{GraphState, NodeResult};

/// A node backed by an async closure.
///
/// The closure gets its own copy of the node's `Context`, so it can move it
/// straight into the returned future.
pub struct FunctionNode<S, F> {
    name: String,
    f: F,
    _state: PhantomData<fn() -> S>,
}

impl<S, F, Fut> FunctionNode<S, F>
where
    S: GraphState,
    F: Fn(Context, S) -> Fut + Send + Sync,
    Fut: Future<Output = NodeResult<S>> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
            _state: PhantomData,
        }
    }
}

#[async_trait]
impl<S, F, Fut> Node<S> for FunctionNode<S, F>
where
    S: GraphState,
    F: Fn(Context, S) -> Fut + Send + Sync,
    Fut: Future<Output = NodeResult<S>> + Send,
{
    async fn process(&self, ctx: &Context, state: S) -> NodeResult<S> {
        (self.f)(ctx.clone(), state).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<S, F> Debug for FunctionNode<S, F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FunctionNode").field(&self.name).finish()
    }
}
