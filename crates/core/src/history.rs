//! Module transcript persistence.
//!
//! When a learner leaves a module, the tutor hands the module-scoped log to a
//! `ChatHistoryWriter`. Writes are append-only: every call produces a new
//! record and never replaces an earlier one.

use crate::session::{ChatMessage, MessageRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// The persisted record of one module's conversation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub course: String,
    pub module_id: u32,
    pub messages: Vec<ChatMessage>,
}

impl Transcript {
    /// Builds a transcript, dropping any system-role entries.
    pub fn new(course: impl Into<String>, module_id: u32, messages: &[ChatMessage]) -> Self {
        Self {
            course: course.into(),
            module_id,
            messages: messages
                .iter()
                .filter(|m| m.role != MessageRole::System)
                .cloned()
                .collect(),
        }
    }
}

/// Write-only sink for module transcripts.
#[async_trait]
pub trait ChatHistoryWriter: Send + Sync {
    async fn persist(&self, transcript: &Transcript) -> Result<()>;
}

/// Stores each transcript as a pretty-printed JSON file in a directory.
///
/// Files are named `<course>_module_<id>_<timestamp>.json`; a numeric suffix is
/// added if that name is already taken.
pub struct FileChatHistoryWriter {
    dir: PathBuf,
}

impl FileChatHistoryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_stem(transcript: &Transcript) -> String {
        let course: String = transcript
            .course
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!(
            "{}_module_{}_{}",
            course,
            transcript.module_id,
            Local::now().format("%Y%m%d%H%M%S%3f")
        )
    }
}

#[async_trait]
impl ChatHistoryWriter for FileChatHistoryWriter {
    async fn persist(&self, transcript: &Transcript) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create history dir {}", self.dir.display()))?;

        let body = serde_json::to_vec_pretty(transcript)?;
        let stem = Self::file_stem(transcript);

        let mut attempt = 0u32;
        let (path, mut file) = loop {
            let name = if attempt == 0 {
                format!("{stem}.json")
            } else {
                format!("{stem}-{attempt}.json")
            };
            let path = self.dir.join(name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to create {}", path.display()));
                }
            }
        };

        file.write_all(&body)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        file.flush().await?;

        debug!(path = %path.display(), messages = transcript.messages.len(), "Transcript written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transcript {
        Transcript::new(
            "C++",
            3,
            &[
                ChatMessage::system("hidden"),
                ChatMessage::assistant("📘 Module 3: Pointers"),
                ChatMessage::user("what is a pointer?"),
            ],
        )
    }

    #[test]
    fn test_transcript_drops_system_messages() {
        let transcript = sample();
        assert_eq!(transcript.messages.len(), 2);
        assert!(
            transcript
                .messages
                .iter()
                .all(|m| m.role != MessageRole::System)
        );
    }

    #[tokio::test]
    async fn test_persist_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let history_dir = dir.path().join("chat_history");
        let writer = FileChatHistoryWriter::new(&history_dir);

        writer.persist(&sample()).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(&history_dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);

        let name = entries[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("C___module_3_"));
        assert!(name.ends_with(".json"));

        let stored: Transcript =
            serde_json::from_str(&std::fs::read_to_string(&entries[0]).unwrap()).unwrap();
        assert_eq!(stored, sample());
    }

    #[tokio::test]
    async fn test_repeated_persist_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileChatHistoryWriter::new(dir.path());

        for _ in 0..3 {
            writer.persist(&sample()).await.unwrap();
        }

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_persist_fails_when_dir_is_a_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let writer = FileChatHistoryWriter::new(file.path());

        assert!(writer.persist(&sample()).await.is_err());
    }
}
