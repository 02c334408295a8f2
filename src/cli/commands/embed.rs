//! Embed command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::build_processor;
use crate::cli::output::{RunStats, get_formatter};
use crate::models::{Config, OutputFormat};
use crate::services::{BatchSink, DirectoryPipeline, JsonlSink};
use crate::sources::LocalSource;

#[derive(Debug, Args)]
pub struct EmbedArgs {
    /// Directory of documents to embed
    #[arg(required = true)]
    pub path: PathBuf,

    /// Documents processed at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Entries per output batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// JSONL file to write entries to (stdout when omitted)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Show which files would be embedded without calling the service
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn handle_embed(args: EmbedArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let formatter = get_formatter(format);
    let start_time = Instant::now();

    let mut pipeline_config = config.pipeline.clone();
    if let Some(concurrency) = args.concurrency {
        pipeline_config.concurrency = concurrency;
    }
    if let Some(batch_size) = args.batch_size {
        pipeline_config.batch_size = batch_size;
    }

    if args.dry_run {
        // Discovery only; no API key or tokenizer needed
        let files = LocalSource::from_config(&args.path, &pipeline_config)?.collect_files()?;
        print!("{}", formatter.format_file_list(&files));
        return Ok(());
    }

    let processor = build_processor(config)?;
    let pipeline = DirectoryPipeline::new(Arc::new(processor), pipeline_config);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .context("invalid progress template")?,
    );
    spinner.set_message(format!("embedding documents in {}", args.path.display()));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let result = pipeline.run(&args.path).await;
    spinner.finish_and_clear();
    let batches = result.with_context(|| format!("embedding run failed for {}", args.path.display()))?;

    let mut stats = RunStats {
        batches: batches.len() as u64,
        ..Default::default()
    };

    let to_stdout = args.output.is_none();
    let mut sink: Box<dyn BatchSink> = match &args.output {
        Some(path) => Box::new(
            JsonlSink::create(path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(JsonlSink::stdout()),
    };

    for (i, batch) in batches.iter().enumerate() {
        info!(batch = i + 1, entries = batch.len(), "writing batch");
        sink.write_batch(batch).await.context("failed to write batch")?;
        stats.documents += batch.len() as u64;
        stats.total_tokens += batch.iter().map(|e| e.metadata.total_tokens).sum::<u64>();
    }
    sink.finish().await.context("failed to flush output")?;

    stats.duration_ms = start_time.elapsed().as_millis() as u64;
    stats.output = args.output.as_ref().map(|p| p.display().to_string());

    let rendered = formatter.format_run_stats(&stats);
    if to_stdout {
        eprint!("{rendered}");
    } else {
        print!("{rendered}");
    }

    Ok(())
}
