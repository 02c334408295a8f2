//! Estimate command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::get_formatter;
use crate::models::{Config, OutputFormat};
use crate::services::{TokenEstimator, Tokenizer};

#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Directory to scan
    #[arg(required = true)]
    pub path: PathBuf,

    /// List token counts for every file
    #[arg(long)]
    pub per_file: bool,

    /// Override the price per 1000 tokens (USD)
    #[arg(long)]
    pub price: Option<f64>,
}

pub async fn handle_estimate(args: EstimateArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let tokenizer = Tokenizer::new(&config.tokenizer).context("failed to load tokenizer")?;
    let estimator = TokenEstimator::new(tokenizer, config.pipeline.clone());
    let price = args.price.unwrap_or(config.estimate.price_per_1k_tokens);

    let root = args.path;
    let per_file = args.per_file;
    // Tokenizing is CPU-bound; keep it off the async workers
    let estimate = tokio::task::spawn_blocking(move || estimator.estimate(&root, price, per_file))
        .await
        .context("estimate task panicked")??;

    print!("{}", formatter.format_estimate(&estimate));
    Ok(())
}
