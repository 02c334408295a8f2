//! Turns one file into one embedded document entry.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::IndexError;
use crate::models::{DocumentEntry, EmbeddingInput};
use crate::services::aggregator::{WeightedVector, aggregate};
use crate::services::chunker::chunk_tokens;
use crate::services::embedding::EmbeddingClient;
use crate::services::tokenizer::Tokenizer;
use crate::utils::file::read_file_content_async;

/// Something that can turn a file path into a finished entry.
#[async_trait]
pub trait ProcessDocument: Send + Sync {
    async fn process(&self, path: &Path) -> Result<DocumentEntry, IndexError>;
}

/// Reads, chunks, embeds and aggregates a single document.
#[derive(Clone)]
pub struct DocumentProcessor {
    tokenizer: Tokenizer,
    client: EmbeddingClient,
    ctx_length: usize,
}

impl DocumentProcessor {
    pub fn new(tokenizer: Tokenizer, client: EmbeddingClient, ctx_length: usize) -> Self {
        Self {
            tokenizer,
            client,
            ctx_length,
        }
    }

    /// Embed already-loaded text as if it had been read from `path`.
    ///
    /// Chunks are embedded strictly in order, one request at a time. Any
    /// failure discards the chunks embedded so far.
    pub async fn embed_text(&self, path: &Path, content: String) -> Result<DocumentEntry, IndexError> {
        let tokens = self.tokenizer.encode(&content);
        let windows: Vec<_> = chunk_tokens(&tokens, self.ctx_length)?.collect();
        debug!(
            path = %path.display(),
            tokens = tokens.len(),
            chunks = windows.len(),
            "chunked document"
        );

        let mut vectors = Vec::with_capacity(windows.len());
        let mut weights = Vec::with_capacity(windows.len());
        let mut total_tokens = 0u64;

        for (index, window) in windows.into_iter().enumerate() {
            weights.push(window.len());
            let result = self
                .client
                .embed(&EmbeddingInput::Tokens(window))
                .await
                .map_err(|source| IndexError::Embedding {
                    path: path.to_path_buf(),
                    chunk: index,
                    source,
                })?;
            total_tokens += result.total_tokens;
            vectors.push(result.vector);
        }

        let weighted: Vec<_> = vectors
            .iter()
            .zip(weights.iter())
            .map(|(vector, weight)| WeightedVector::new(vector, *weight))
            .collect();

        let embedding =
            aggregate(&weighted, total_tokens).map_err(|source| IndexError::Aggregate {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            chunks = weighted.len(),
            total_tokens,
            "embedded document"
        );

        Ok(DocumentEntry::new(path, content, embedding))
    }
}

#[async_trait]
impl ProcessDocument for DocumentProcessor {
    async fn process(&self, path: &Path) -> Result<DocumentEntry, IndexError> {
        let content = read_file_content_async(path)
            .await
            .map_err(|source| IndexError::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        self.embed_text(path, content).await
    }
}
