//! Access to the authoritative document.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use shared::domain::DocumentSnapshot;

#[async_trait]
pub trait DocumentProvider: Send + Sync {
    /// Captures the active document, or `None` when no document is open.
    async fn active_document(&self) -> Option<DocumentSnapshot>;

    /// Replaces the whole current text of the document in one atomic step.
    async fn replace_all(&self, snapshot: &DocumentSnapshot, new_text: &str) -> Result<()>;
}

pub struct NoDocumentProvider;

#[async_trait]
impl DocumentProvider for NoDocumentProvider {
    async fn active_document(&self) -> Option<DocumentSnapshot> {
        None
    }

    async fn replace_all(&self, snapshot: &DocumentSnapshot, _new_text: &str) -> Result<()> {
        Err(anyhow!(
            "no document available to replace '{}'",
            snapshot.source_identifier
        ))
    }
}

/// Treats one file on disk as the active document.
pub struct FileDocumentProvider {
    path: PathBuf,
    language_tag: String,
}

impl FileDocumentProvider {
    pub fn new(path: impl Into<PathBuf>, language_tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            language_tag: language_tag.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.path.with_file_name(format!(".{file_name}.optimize.tmp"))
    }
}

#[async_trait]
impl DocumentProvider for FileDocumentProvider {
    async fn active_document(&self) -> Option<DocumentSnapshot> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Some(DocumentSnapshot::new(
                self.path.display().to_string(),
                self.language_tag.clone(),
                text,
            )),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read document");
                None
            }
        }
    }

    async fn replace_all(&self, snapshot: &DocumentSnapshot, new_text: &str) -> Result<()> {
        let expected = self.path.display().to_string();
        if snapshot.source_identifier != expected {
            return Err(anyhow!(
                "snapshot '{}' does not belong to document '{expected}'",
                snapshot.source_identifier
            ));
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, new_text)
            .await
            .with_context(|| format!("failed to stage '{}'", staging.display()))?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .with_context(|| format!("failed to replace '{expected}'"))?;
        Ok(())
    }
}
