use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::models::FormSubmission;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Failed to write form to {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode form: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Receiver of form posts. The register hands finished forms here and
/// never looks at what the server does with them.
#[async_trait]
pub trait FormTarget: Send + Sync {
    async fn submit(&self, submission: &FormSubmission) -> Result<(), FormError>;
}

/// Prints each form as pretty JSON.
#[derive(Debug, Default)]
pub struct StdoutFormTarget;

#[async_trait]
impl FormTarget for StdoutFormTarget {
    async fn submit(&self, submission: &FormSubmission) -> Result<(), FormError> {
        let json = serde_json::to_string_pretty(submission)?;
        println!("{}", json);
        debug!("Form {} printed to stdout", submission.id);
        Ok(())
    }
}

/// Appends each form as one JSON line to an outbox file.
#[derive(Debug, Clone)]
pub struct OutboxFormTarget {
    path: PathBuf,
}

impl OutboxFormTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every form submitted so far, oldest first. A missing outbox is empty.
    pub async fn read_all(&self) -> Result<Vec<FormSubmission>, FormError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(FormError::from))
            .collect()
    }

    fn io_error(&self, source: std::io::Error) -> FormError {
        FormError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

#[async_trait]
impl FormTarget for OutboxFormTarget {
    async fn submit(&self, submission: &FormSubmission) -> Result<(), FormError> {
        let mut line = serde_json::to_string(submission)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))?;

        info!(
            "Form {} for {} written to {}",
            submission.id,
            submission.action,
            self.path.display()
        );
        Ok(())
    }
}
