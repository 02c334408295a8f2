//! Token encoding shared by chunking and cost estimation.

use std::fmt;
use std::sync::Arc;

use tiktoken_rs::CoreBPE;

use crate::error::TokenizerError;
use crate::models::{TokenWindow, TokenizerConfig};

/// Wraps one named BPE encoding for the whole process.
///
/// Cloning is cheap; all clones share the same encoder.
#[derive(Clone)]
pub struct Tokenizer {
    name: String,
    bpe: Arc<CoreBPE>,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("encoding", &self.name)
            .finish()
    }
}

impl Tokenizer {
    /// Load the encoding named in the configuration.
    pub fn new(config: &TokenizerConfig) -> Result<Self, TokenizerError> {
        Self::from_encoding(&config.encoding)
    }

    /// Load an encoding by name, e.g. `cl100k_base`.
    pub fn from_encoding(name: &str) -> Result<Self, TokenizerError> {
        let loaded = match name {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => return Err(TokenizerError::UnknownEncoding(other.to_string())),
        };
        let bpe = loaded.map_err(|e| TokenizerError::LoadError {
            name: name.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            bpe: Arc::new(bpe),
        })
    }

    /// Encode text into token ids. Special-token markers are treated as plain text.
    pub fn encode(&self, text: &str) -> TokenWindow {
        self.bpe.encode_ordinary(text)
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.encode(text).len()
    }

    pub fn decode(&self, tokens: &[u32]) -> Result<String, TokenizerError> {
        self.bpe
            .decode(tokens.to_vec())
            .map_err(|e| TokenizerError::DecodeError(e.to_string()))
    }
}
