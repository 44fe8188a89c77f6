//! SQLite-backed checkpointer. Persistent across process restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use super::{Checkpoint, CheckpointError, Checkpointer, Interrupt};

/// Rows are ordered by insertion (`seq`), so the newest checkpoint of a thread
/// is the one with the highest `seq`. State is stored as JSON.
///
/// Each call opens its own connection inside `spawn_blocking`.
pub struct SqliteSaver<S> {
    db_path: PathBuf,
    _state: PhantomData<fn() -> S>,
}

type Row = (String, String, i64, String, Option<String>, Option<String>, String);

impl<S> SqliteSaver<S>
where
    S: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                checkpoint_id TEXT NOT NULL UNIQUE,
                thread_id TEXT NOT NULL,
                step INTEGER NOT NULL,
                state TEXT NOT NULL,
                next_node TEXT,
                interrupt TEXT,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS checkpoints_thread ON checkpoints (thread_id, seq);
            "#,
        )?;
        Ok(Self {
            db_path,
            _state: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn decode(row: Row) -> Result<Checkpoint<S>, CheckpointError> {
        let (id, thread_id, step, state, next, interrupt, created_at) = row;
        let interrupt = interrupt
            .map(|raw| serde_json::from_str::<Interrupt>(&raw))
            .transpose()?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        Ok(Checkpoint {
            id,
            thread_id,
            step: step as usize,
            state: serde_json::from_str(&state)?,
            next,
            interrupt,
            created_at,
        })
    }

    async fn query(
        &self,
        sql: &'static str,
        thread_id: &str,
        limit: i64,
    ) -> Result<Vec<Row>, CheckpointError> {
        let db_path = self.db_path.clone();
        let thread_id = thread_id.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(params![thread_id, limit], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                    ))
                })?
                .collect::<Result<Vec<Row>, _>>()?;
            Ok::<_, CheckpointError>(rows)
        })
        .await
        .map_err(|e| CheckpointError::Storage(e.to_string()))?
    }
}

const SELECT_NEWEST: &str =
    "SELECT checkpoint_id, thread_id, step, state, next_node, interrupt, created_at
     FROM checkpoints WHERE thread_id = ?1 ORDER BY seq DESC LIMIT ?2";

#[async_trait]
impl<S> Checkpointer<S> for SqliteSaver<S>
where
    S: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn put(&self, checkpoint: &Checkpoint<S>) -> Result<(), CheckpointError> {
        let state = serde_json::to_string(&checkpoint.state)?;
        let interrupt = checkpoint
            .interrupt
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let id = checkpoint.id.clone();
        let thread_id = checkpoint.thread_id.clone();
        let step = checkpoint.step as i64;
        let next = checkpoint.next.clone();
        let created_at = checkpoint.created_at.to_rfc3339();

        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open(&db_path)?;
            conn.execute(
                r#"
                INSERT INTO checkpoints
                (checkpoint_id, thread_id, step, state, next_node, interrupt, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![id, thread_id, step, state, next, interrupt, created_at],
            )?;
            Ok::<(), CheckpointError>(())
        })
        .await
        .map_err(|e| CheckpointError::Storage(e.to_string()))?
    }

    async fn get_latest(&self, thread_id: &str) -> Result<Option<Checkpoint<S>>, CheckpointError> {
        let rows = self.query(SELECT_NEWEST, thread_id, 1).await?;
        rows.into_iter().next().map(Self::decode).transpose()
    }

    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<Checkpoint<S>>, CheckpointError> {
        // SQLite treats a negative LIMIT as "no limit"
        let limit = limit.map(|n| n as i64).unwrap_or(-1);
        let rows = self.query(SELECT_NEWEST, thread_id, limit).await?;
        let mut list = rows
            .into_iter()
            .map(Self::decode)
            .collect::<Result<Vec<_>, _>>()?;
        list.reverse();
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Notes {
        lines: Vec<String>,
    }

    fn notes(lines: &[&str]) -> Notes {
        Notes {
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn round_trips_state_and_interrupt() {
        let dir = tempfile::tempdir().unwrap();
        let saver = SqliteSaver::<Notes>::new(dir.path().join("checkpoints.sqlite")).unwrap();

        saver.put(&Checkpoint::new("t1", 0, notes(&["hi"]))).await.unwrap();
        let paused = Checkpoint::new("t1", 1, notes(&["hi", "hola"])).with_interrupt(Interrupt {
            node: "supervisor".into(),
            value: serde_json::json!({"text_to_revise": "hola"}),
        });
        saver.put(&paused).await.unwrap();

        let latest = saver.get_latest("t1").await.unwrap().unwrap();
        assert_eq!(latest.id, paused.id);
        assert_eq!(latest.step, 1);
        assert_eq!(latest.state, notes(&["hi", "hola"]));
        assert_eq!(latest.next.as_deref(), Some("supervisor"));
        assert_eq!(latest.interrupt, paused.interrupt);

        assert!(saver.get_latest("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn survives_reopen_and_lists_oldest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoints.sqlite");
        {
            let saver = SqliteSaver::<Notes>::new(&path).unwrap();
            for i in 0..3 {
                let line = format!("m{}", i);
                saver
                    .put(&Checkpoint::new("t", i, notes(&[line.as_str()])))
                    .await
                    .unwrap();
            }
        }

        let reopened = SqliteSaver::<Notes>::new(&path).unwrap();
        let steps: Vec<usize> = reopened
            .list("t", None)
            .await
            .unwrap()
            .iter()
            .map(|c| c.step)
            .collect();
        assert_eq!(steps, vec![0, 1, 2]);

        let newest_two: Vec<usize> = reopened
            .list("t", Some(2))
            .await
            .unwrap()
            .iter()
            .map(|c| c.step)
            .collect();
        assert_eq!(newest_two, vec![1, 2]);
    }
}
