//! Storage hand-off for finished batches.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

use crate::error::SinkError;
use crate::models::DocumentEntry;

/// Accepts completed entries one batch at a time.
///
/// Persistence and indexing are up to the implementation.
#[async_trait]
pub trait BatchSink: Send {
    async fn write_batch(&mut self, batch: &[DocumentEntry]) -> Result<(), SinkError>;

    /// Flush anything buffered. Called once after the last batch.
    async fn finish(&mut self) -> Result<(), SinkError>;
}

/// Writes one JSON object per entry, one entry per line.
pub struct JsonlSink<W> {
    writer: BufWriter<W>,
    written: usize,
}

impl JsonlSink<File> {
    /// Create (or truncate) a JSONL file.
    pub async fn create(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(Self::new(File::create(path).await?))
    }
}

impl JsonlSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            written: 0,
        }
    }

    /// Number of entries written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> BatchSink for JsonlSink<W> {
    async fn write_batch(&mut self, batch: &[DocumentEntry]) -> Result<(), SinkError> {
        for entry in batch {
            let mut line = serde_json::to_vec(entry)?;
            line.push(b'\n');
            self.writer.write_all(&line).await?;
            self.written += 1;
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush().await?;
        Ok(())
    }
}
