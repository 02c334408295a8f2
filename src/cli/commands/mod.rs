mod config;
mod embed;
mod estimate;
mod vector;

use anyhow::{Context, Result};

use crate::models::Config;
use crate::services::{DocumentProcessor, EmbeddingClient, Tokenizer};

pub use config::ConfigCommand;
pub use embed::EmbedArgs;
pub use estimate::EstimateArgs;
pub use vector::VectorArgs;

pub use config::handle_config;
pub use embed::handle_embed;
pub use estimate::handle_estimate;
pub use vector::handle_vector;

/// Wire the tokenizer, HTTP client and processor from configuration.
fn build_processor(config: &Config) -> Result<DocumentProcessor> {
    let tokenizer = Tokenizer::new(&config.tokenizer).context("failed to load tokenizer")?;
    let client = EmbeddingClient::from_config(&config.embedding, config.retry.clone())
        .context("failed to create embedding client")?;
    Ok(DocumentProcessor::new(
        tokenizer,
        client,
        config.tokenizer.ctx_length,
    ))
}
