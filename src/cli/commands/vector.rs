//! Vector command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use crate::models::{Config, EmbeddingInput};
use crate::services::{EmbeddingClient, Tokenizer, WeightedVector, aggregate};

#[derive(Debug, Args)]
pub struct VectorArgs {
    /// Text to embed
    #[arg(required = true)]
    pub text: String,
}

/// Embed a single query text and print it as a unit-length vector.
///
/// The text is sent as-is without chunking, so it must fit the model context.
pub async fn handle_vector(args: VectorArgs, config: &Config) -> Result<()> {
    let tokenizer = Tokenizer::new(&config.tokenizer).context("failed to load tokenizer")?;
    let tokens = tokenizer.count_tokens(&args.text);
    if tokens > config.tokenizer.ctx_length {
        anyhow::bail!(
            "text is {tokens} tokens, more than the {} token context",
            config.tokenizer.ctx_length
        );
    }

    let client = EmbeddingClient::from_config(&config.embedding, config.retry.clone())
        .context("failed to create embedding client")?;
    let result = client
        .embed(&EmbeddingInput::Text(args.text))
        .await
        .context("failed to embed text")?;

    let normalized = aggregate(
        &[WeightedVector::new(&result.vector, tokens.max(1))],
        result.total_tokens,
    )
    .context("embedding could not be normalized")?;

    let output = json!({
        "model": client.model(),
        "dimension": normalized.vector.len(),
        "total_tokens": normalized.total_tokens,
        "vector": normalized.vector,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
