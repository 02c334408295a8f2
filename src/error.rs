//! Error types for the document embedding pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::utils::retry::Retryable;

/// Errors raised while loading the token encoder.
#[derive(Debug, Error)]
pub enum TokenizerError {
    #[error("unknown tokenizer encoding: {0}")]
    UnknownEncoding(String),

    #[error("failed to load tokenizer encoding {name}: {message}")]
    LoadError { name: String, message: String },

    #[error("failed to decode tokens: {0}")]
    DecodeError(String),
}

/// Errors related to window and batch sizing.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("invalid size {0}: must be at least one")]
    InvalidSize(usize),
}

/// Errors related to embedding operations.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to connect to embedding service: {0}")]
    ConnectionError(String),

    #[error("embedding request timed out")]
    Timeout,

    #[error("embedding service error (status {status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("embedding request rejected (status {status}): {body}")]
    ClientError { status: u16, body: String },

    #[error("embedding request failed: {0}")]
    RequestError(String),

    #[error("invalid embedding response: {0}")]
    InvalidResponse(String),

    #[error("embedding has dimension {actual}, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("missing API key: set {0} or embedding.api_key")]
    MissingApiKey(String),
}

impl Retryable for EmbeddingError {
    fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::ConnectionError(_) | EmbeddingError::Timeout => true,
            // 5xx and rate limiting are service-side and transient
            EmbeddingError::ServerError { status, .. } => *status >= 500 || *status == 429,
            EmbeddingError::ClientError { .. }
            | EmbeddingError::RequestError(_)
            | EmbeddingError::InvalidResponse(_)
            | EmbeddingError::DimensionMismatch { .. }
            | EmbeddingError::MissingApiKey(_) => false,
        }
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            EmbeddingError::Timeout
        } else if e.is_connect() {
            EmbeddingError::ConnectionError(e.to_string())
        } else if e.is_decode() {
            EmbeddingError::InvalidResponse(e.to_string())
        } else {
            EmbeddingError::RequestError(e.to_string())
        }
    }
}

/// Errors raised while combining chunk vectors.
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("no chunk embeddings to aggregate")]
    Empty,

    #[error("chunk weights sum to zero")]
    ZeroWeight,

    #[error("chunk {index} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("aggregated vector has near-zero norm ({norm:e})")]
    DegenerateVector { norm: f64 },
}

/// Errors related to processing documents and directories.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is {size} bytes, over the {max} byte limit", path.display())]
    FileTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("directory walk error: {0}")]
    WalkError(String),

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("failed to embed {} (chunk {chunk}): {source}", path.display())]
    Embedding {
        path: PathBuf,
        chunk: usize,
        #[source]
        source: EmbeddingError,
    },

    #[error("failed to aggregate {}: {source}", path.display())]
    Aggregate {
        path: PathBuf,
        #[source]
        source: AggregateError,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] ChunkError),

    #[error("worker task failed: {0}")]
    TaskFailed(String),

    #[error("{failed} of {total} documents failed; first failure: {first}")]
    RunFailed {
        failed: usize,
        total: usize,
        #[source]
        first: Box<IndexError>,
    },
}

/// Errors related to configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Errors related to writing finished batches.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialize error: {0}")]
    JsonError(#[from] serde_json::Error),
}
