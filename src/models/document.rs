use std::path::Path;

use serde::{Deserialize, Serialize};

/// A window of token ids, at most `ctx_length` long.
pub type TokenWindow = Vec<u32>;

/// A group of finished entries handed to the storage layer together.
pub type Batch = Vec<DocumentEntry>;

/// Payload for one embedding request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Text(String),
    Tokens(TokenWindow),
}

impl EmbeddingInput {
    /// Number of tokens when pre-tokenized; `None` for raw text.
    pub fn token_len(&self) -> Option<usize> {
        match self {
            EmbeddingInput::Text(_) => None,
            EmbeddingInput::Tokens(tokens) => Some(tokens.len()),
        }
    }
}

impl From<TokenWindow> for EmbeddingInput {
    fn from(tokens: TokenWindow) -> Self {
        EmbeddingInput::Tokens(tokens)
    }
}

impl From<&str> for EmbeddingInput {
    fn from(text: &str) -> Self {
        EmbeddingInput::Text(text.to_string())
    }
}

/// A vector and the tokens the service billed for it.
///
/// Chunk-level results come straight from the service; document-level
/// results are unit length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub vector: Vec<f64>,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub file_name: String,
    pub file_path: String,
    pub total_tokens: u64,
    /// Length of the content in characters.
    pub file_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub content: String,
    pub embedding: Vec<f64>,
    pub metadata: DocumentMetadata,
}

impl DocumentEntry {
    pub fn new(path: &Path, content: String, embedding: EmbeddingResult) -> Self {
        let metadata = DocumentMetadata {
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            file_path: path.to_string_lossy().to_string(),
            total_tokens: embedding.total_tokens,
            file_length: content.chars().count(),
        };
        Self {
            content,
            embedding: embedding.vector,
            metadata,
        }
    }
}
