use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{Checkpoint, CheckpointError, Checkpointer};

/// In-memory checkpointer. Lost when the process exits.
pub struct MemorySaver<S> {
    threads: RwLock<HashMap<String, Vec<Checkpoint<S>>>>,
}

impl<S> MemorySaver<S> {
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
        }
    }
}

impl<S> Default for MemorySaver<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<S> Checkpointer<S> for MemorySaver<S>
where
    S: Clone + Send + Sync + 'static,
{
    async fn put(&self, checkpoint: &Checkpoint<S>) -> Result<(), CheckpointError> {
        let mut threads = self.threads.write().await;
        threads
            .entry(checkpoint.thread_id.clone())
            .or_default()
            .push(checkpoint.clone());
        Ok(())
    }

    async fn get_latest(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let threads = self.threads.read().await;
        Ok(threads.get(thread_id).and_then(|list| list.last().cloned()))
    }

    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Checkpoint<S>>, CheckpointError> {
        let threads = self.threads.read().await;
        let list = threads.get(thread_id).cloned().unwrap_or_default();
        Ok(match limit {
            Some(n) if list.len() > n => list[list.len() - n..].to_vec(),
            _ => list,
        })
    }
}
