use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::Error;
use crate::types::TranscriptChunk;

/// Append-only JSONL sink for [`TranscriptChunk`]s.
///
/// Every chunk is written and flushed individually so an abrupt termination
/// loses at most the line in flight. Prior records are never rewritten.
pub struct TranscriptWriter {
    file: tokio::fs::File,
    path: PathBuf,
}

impl TranscriptWriter {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&mut self, chunk: &TranscriptChunk) -> Result<(), Error> {
        let mut line = serde_json::to_string(chunk)?;
        line.push('\n');

        self.file.write_all(line.as_bytes()).await?;
        self.file.flush().await?;
        Ok(())
    }
}

/// Read all chunks from a transcript file.
///
/// The file may still be growing: a trailing line without a newline is
/// treated as in-flight and skipped. A malformed *complete* line is a real
/// error and fails the whole read.
pub async fn read_chunks(path: impl AsRef<Path>) -> Result<Vec<TranscriptChunk>, Error> {
    let content = tokio::fs::read_to_string(path).await?;

    let complete = match content.rfind('\n') {
        Some(end) => &content[..end],
        None => return Ok(vec![]),
    };

    complete
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(Error::from))
        .collect()
}
