mod config;
mod document;
mod output;

pub use config::{
    Config, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_CTX_LENGTH, DEFAULT_EMBEDDING_DIMENSION,
    DEFAULT_EMBEDDING_MODEL, DEFAULT_EMBEDDING_URL, DEFAULT_ENCODING, EmbeddingConfig,
    EstimateConfig, OutputConfig, PipelineConfig, TokenizerConfig,
};
pub use document::{Batch, DocumentEntry, DocumentMetadata, EmbeddingInput, EmbeddingResult, TokenWindow};
pub use output::OutputFormat;
