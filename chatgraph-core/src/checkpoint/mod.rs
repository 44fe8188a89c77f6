//! Per-thread state snapshots.
//!
//! A graph with a checkpointer writes one [`Checkpoint`] after the input is
//! applied, one after every node, and one when a node interrupts. The latest
//! checkpoint of a thread is where the next `invoke` or `resume` starts.
//!
//! | Type | Persistence |
//! |------|-------------|
//! | [`MemorySaver`] | process memory |
//! | [`SqliteSaver`] | SQLite file, survives restarts |

mod memory;
mod sqlite;

pub use memory::MemorySaver;
pub use sqlite::SqliteSaver;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error type for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for CheckpointError {
    fn from(err: serde_json::Error) -> Self {
        CheckpointError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for CheckpointError {
    fn from(err: rusqlite::Error) -> Self {
        CheckpointError::Storage(err.to_string())
    }
}

/// A paused node and the payload it surfaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interrupt {
    pub node: String,
    pub value: Value,
}

/// Snapshot of a thread after a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint<S> {
    pub id: String,
    pub thread_id: String,
    /// Number of nodes executed on this thread so far
    pub step: usize,
    pub state: S,
    /// Node that runs first when the thread continues
    pub next: Option<String>,
    pub interrupt: Option<Interrupt>,
    pub created_at: DateTime<Utc>,
}

impl<S> Checkpoint<S> {
    pub fn new(thread_id: impl Into<String>, step: usize, state: S) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            step,
            state,
            next: None,
            interrupt: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.next = Some(interrupt.node.clone());
        self.interrupt = Some(interrupt);
        self
    }
}

/// Saves and loads checkpoints by thread id.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    /// Persist a checkpoint as the newest one of its thread.
    async fn put(&self, checkpoint: &Checkpoint<S>) -> Result<(), CheckpointError>;

    /// Newest checkpoint of the thread, if any.
    async fn get_latest(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError>;

    /// Checkpoints of the thread, oldest first. With `limit`, only the newest
    /// `limit` entries are returned.
    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Checkpoint<S>>, CheckpointError>;
}
