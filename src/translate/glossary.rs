use chatgraph_core::NodeError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Source term to its preferred translation.
pub type Glossary = BTreeMap<String, GlossaryEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub value: String,
    #[serde(default)]
    pub comment: String,
}

impl GlossaryEntry {
    pub fn new(value: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            comment: comment.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("Glossary io: {0}")]
    Io(#[from] std::io::Error),

    #[error("Glossary format: {0}")]
    Format(#[from] serde_json::Error),
}

impl From<GlossaryError> for NodeError {
    fn from(err: GlossaryError) -> Self {
        NodeError::Execution(err.to_string())
    }
}

/// A JSON glossary file.
///
/// Reads always go to disk so edits made between runs are picked up. Writes
/// are read-modify-write under a lock, so concurrent `add_source` calls on the
/// same manager do not drop entries.
#[derive(Debug)]
pub struct GlossaryManager {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl GlossaryManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file a new version is written to before it replaces `path`.
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// A missing file is an empty glossary.
    pub async fn load_glossary(&self) -> Result<Glossary, GlossaryError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Glossary::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no glossary file yet");
                Ok(Glossary::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Inserts or overwrites `source` and writes the file back.
    pub async fn add_source(
        &self,
        source: &str,
        target: &str,
        note: &str,
    ) -> Result<(), GlossaryError> {
        let _guard = self.write_lock.lock().await;

        let mut glossary = self.load_glossary().await?;
        glossary.insert(source.to_string(), GlossaryEntry::new(target, note));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(&glossary)?;
        // a torn write must never leave the glossary unreadable
        let staged = self.staging_path();
        tokio::fs::write(&staged, text).await?;
        tokio::fs::rename(&staged, &self.path).await?;

        info!(source, target, entries = glossary.len(), "glossary updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let manager = GlossaryManager::new(dir.path().join("glossary.json"));
        assert!(manager.load_glossary().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_source_overwrites_existing_entry() {
        let dir = tempfile::tempdir().unwrap();
        let manager = GlossaryManager::new(dir.path().join("nested/glossary.json"));

        manager.add_source("bank", "banco", "financial").await.unwrap();
        manager.add_source("bank", "orilla", "river side").await.unwrap();

        let glossary = manager.load_glossary().await.unwrap();
        assert_eq!(glossary.len(), 1);
        assert_eq!(glossary["bank"], GlossaryEntry::new("orilla", "river side"));
    }

    #[tokio::test]
    async fn add_source_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.json");
        let manager = GlossaryManager::new(&path);
        // an interrupted earlier write left a partial staging file behind
        std::fs::write(dir.path().join("glossary.json.tmp"), "{ \"half").unwrap();

        manager.add_source("fish", "pez", "").await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["glossary.json"]);
        assert_eq!(manager.load_glossary().await.unwrap()["fish"].value, "pez");
    }

    #[tokio::test]
    async fn concurrent_adds_keep_every_entry() {
        let dir = tempfile::tempdir().unwrap();
        let manager = Arc::new(GlossaryManager::new(dir.path().join("glossary.json")));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = manager.clone();
                tokio::spawn(async move {
                    manager
                        .add_source(&format!("term{i}"), &format!("termino{i}"), "")
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(manager.load_glossary().await.unwrap().len(), 8);
    }

    #[tokio::test]
    async fn rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glossary.json");
        tokio::fs::write(&path, "[1, 2").await.unwrap();

        let err = GlossaryManager::new(path).load_glossary().await.unwrap_err();
        assert!(matches!(err, GlossaryError::Format(_)));
    }
}
