//! Checkpointed execution: `stream`, `invoke`, `resume` and state inspection.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::core::{Cursor, StepOutcome};
use super::{Built, Graph};
use crate::checkpoint::{Checkpoint, CheckpointError, Checkpointer, Interrupt};
use crate::node::Context;
use crate::types::{GraphError, GraphResult, GraphState};

/// One item of a "values" stream.
#[derive(Debug, Clone)]
pub enum StreamEvent<S> {
    /// Full state after the input was applied or after a node completed
    Values(S),
    /// A node paused the run; resume the thread to continue
    Interrupt(Interrupt),
}

/// How an `invoke` or `resume` call ended.
#[derive(Debug, Clone)]
pub enum RunOutcome<S> {
    Complete(S),
    Interrupted { state: S, interrupt: Interrupt },
}

impl<S> RunOutcome<S> {
    pub fn state(&self) -> &S {
        match self {
            RunOutcome::Complete(state) => state,
            RunOutcome::Interrupted { state, .. } => state,
        }
    }

    pub fn into_state(self) -> S {
        match self {
            RunOutcome::Complete(state) => state,
            RunOutcome::Interrupted { state, .. } => state,
        }
    }

    pub fn interrupt(&self) -> Option<&Interrupt> {
        match self {
            RunOutcome::Complete(_) => None,
            RunOutcome::Interrupted { interrupt, .. } => Some(interrupt),
        }
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupt().is_some()
    }
}

/// Stored state of a thread at one checkpoint.
#[derive(Debug, Clone)]
pub struct StateSnapshot<S> {
    pub checkpoint_id: String,
    pub step: usize,
    pub state: S,
    /// Node that runs when the thread continues; set while interrupted
    pub next: Option<String>,
    pub interrupt: Option<Interrupt>,
    pub created_at: DateTime<Utc>,
}

impl<S> From<Checkpoint<S>> for StateSnapshot<S> {
    fn from(checkpoint: Checkpoint<S>) -> Self {
        Self {
            checkpoint_id: checkpoint.id,
            step: checkpoint.step,
            state: checkpoint.state,
            next: checkpoint.next,
            interrupt: checkpoint.interrupt,
            created_at: checkpoint.created_at,
        }
    }
}

enum Start<S: GraphState> {
    Input(Vec<S::Update>),
    Resume(Value),
}

/// A run in progress. Each call to `next_event` executes at most one node.
struct Execution<'a, S: GraphState> {
    graph: &'a Graph<S, Built>,
    ctx: &'a Context,
    store: Option<(Arc<dyn Checkpointer<S>>, String)>,
    cursor: Cursor<S>,
    initial: Option<S>,
    done: bool,
}

impl<'a, S> Execution<'a, S>
where
    S: GraphState + Default,
{
    async fn start(
        graph: &'a Graph<S, Built>,
        ctx: &'a Context,
        start: Start<S>,
    ) -> GraphResult<Self> {
        let store = match &graph.checkpointer {
            Some(checkpointer) => {
                let thread_id = ctx
                    .thread_id
                    .clone()
                    .ok_or(CheckpointError::ThreadIdRequired)?;
                Some((checkpointer.clone(), thread_id))
            }
            None => None,
        };

        let latest = match &store {
            Some((checkpointer, thread_id)) => checkpointer.get_latest(thread_id).await?,
            None => None,
        };

        let execution = match start {
            Start::Input(input) => {
                let mut cursor = match latest {
                    Some(checkpoint) => {
                        let mut cursor = Cursor::new(checkpoint.state);
                        cursor.step = checkpoint.step;
                        cursor
                    }
                    None => Cursor::new(S::default()),
                };
                cursor.state.apply_many(input);
                Self {
                    graph,
                    ctx,
                    store,
                    initial: Some(cursor.state.clone()),
                    cursor,
                    done: false,
                }
            }
            Start::Resume(value) => {
                let checkpoint = latest.ok_or_else(|| {
                    GraphError::InvalidState("no checkpoint to resume from".into())
                })?;
                let interrupt = checkpoint.interrupt.ok_or_else(|| {
                    GraphError::InvalidState("thread has no pending interrupt".into())
                })?;
                debug!(node = %interrupt.node, "resuming interrupted node");
                let mut cursor = Cursor::new(checkpoint.state);
                cursor.step = checkpoint.step;
                cursor.goto = Some(interrupt.node);
                cursor.resume = Some(value);
                Self {
                    graph,
                    ctx,
                    store,
                    initial: None,
                    cursor,
                    done: false,
                }
            }
        };

        if execution.initial.is_some() {
            execution.save(None).await?;
        }
        Ok(execution)
    }

    async fn save(&self, interrupt: Option<Interrupt>) -> GraphResult<()> {
        if let Some((checkpointer, thread_id)) = &self.store {
            let mut checkpoint =
                Checkpoint::new(thread_id.clone(), self.cursor.step, self.cursor.state.clone());
            if let Some(interrupt) = interrupt {
                checkpoint = checkpoint.with_interrupt(interrupt);
            }
            checkpointer.put(&checkpoint).await?;
            debug!(thread_id = %thread_id, step = checkpoint.step, "checkpoint saved");
        }
        Ok(())
    }

    async fn next_event(&mut self) -> GraphResult<Option<StreamEvent<S>>> {
        if let Some(state) = self.initial.take() {
            return Ok(Some(StreamEvent::Values(state)));
        }
        if self.done {
            return Ok(None);
        }

        match self.graph.step(self.ctx, &mut self.cursor).await {
            Ok(StepOutcome::Advanced) => {
                self.save(None).await?;
                Ok(Some(StreamEvent::Values(self.cursor.state.clone())))
            }
            Ok(StepOutcome::Finished) => {
                self.done = true;
                Ok(None)
            }
            Ok(StepOutcome::Interrupted(interrupt)) => {
                self.done = true;
                self.save(Some(interrupt.clone())).await?;
                Ok(Some(StreamEvent::Interrupt(interrupt)))
            }
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }

    async fn finish(mut self) -> GraphResult<RunOutcome<S>> {
        while let Some(event) = self.next_event().await? {
            if let StreamEvent::Interrupt(interrupt) = event {
                return Ok(RunOutcome::Interrupted {
                    state: self.cursor.state,
                    interrupt,
                });
            }
        }
        Ok(RunOutcome::Complete(self.cursor.state))
    }
}

fn events<'a, S, F>(start: F) -> BoxStream<'a, GraphResult<StreamEvent<S>>>
where
    S: GraphState + Default,
    F: Future<Output = GraphResult<Execution<'a, S>>> + Send + 'a,
{
    Box::pin(async_stream::stream! {
        let mut execution = match start.await {
            Ok(execution) => execution,
            Err(e) => {
                yield Err(e);
                return;
            }
        };
        loop {
            match execution.next_event().await {
                Ok(Some(event)) => yield Ok(event),
                Ok(None) => break,
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    })
}

impl<S> Graph<S, Built>
where
    S: GraphState + Default,
{
    /// Stream the full state after the input and after every node.
    ///
    /// With a checkpointer the run continues from the thread's latest
    /// checkpoint; otherwise it starts from `S::default()`.
    pub fn stream<'a>(
        &'a self,
        ctx: &'a Context,
        input: Vec<S::Update>,
    ) -> BoxStream<'a, GraphResult<StreamEvent<S>>> {
        events(Execution::start(self, ctx, Start::Input(input)))
    }

    /// Run until END or the first interrupt.
    pub async fn invoke(&self, ctx: &Context, input: Vec<S::Update>) -> GraphResult<RunOutcome<S>> {
        Execution::start(self, ctx, Start::Input(input)).await?.finish().await
    }

    /// Re-run the interrupted node of the thread with `value` available as
    /// `ctx.resume_value()`, then continue as `invoke` does.
    pub async fn resume(&self, ctx: &Context, value: Value) -> GraphResult<RunOutcome<S>> {
        Execution::start(self, ctx, Start::Resume(value)).await?.finish().await
    }

    /// Streaming counterpart of [`Graph::resume`]. No initial `Values` event
    /// is emitted.
    pub fn resume_stream<'a>(
        &'a self,
        ctx: &'a Context,
        value: Value,
    ) -> BoxStream<'a, GraphResult<StreamEvent<S>>> {
        events(Execution::start(self, ctx, Start::Resume(value)))
    }

    fn thread(&self, ctx: &Context) -> GraphResult<(Arc<dyn Checkpointer<S>>, String)> {
        let checkpointer = self
            .checkpointer
            .clone()
            .ok_or_else(|| GraphError::InvalidState("graph has no checkpointer".into()))?;
        let thread_id = ctx
            .thread_id
            .clone()
            .ok_or(CheckpointError::ThreadIdRequired)?;
        Ok((checkpointer, thread_id))
    }

    /// Latest snapshot of the context's thread.
    pub async fn get_state(&self, ctx: &Context) -> GraphResult<Option<StateSnapshot<S>>> {
        let (checkpointer, thread_id) = self.thread(ctx)?;
        Ok(checkpointer.get_latest(&thread_id).await?.map(StateSnapshot::from))
    }

    /// Every snapshot of the context's thread, newest first.
    pub async fn get_state_history(&self, ctx: &Context) -> GraphResult<Vec<StateSnapshot<S>>> {
        let (checkpointer, thread_id) = self.thread(ctx)?;
        let mut history: Vec<StateSnapshot<S>> = checkpointer
            .list(&thread_id, None)
            .await?
            .into_iter()
            .map(StateSnapshot::from)
            .collect();
        history.reverse();
        Ok(history)
    }
}
