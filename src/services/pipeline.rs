//! Bounded-concurrency fan-out over every document in a directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::error::{ChunkError, IndexError};
use crate::models::{Batch, DocumentEntry, PipelineConfig};
use crate::services::chunker::group;
use crate::services::processor::ProcessDocument;
use crate::sources::LocalSource;

/// Embeds every eligible file under a root with a fixed pool of workers.
#[derive(Clone)]
pub struct DirectoryPipeline {
    processor: Arc<dyn ProcessDocument>,
    config: PipelineConfig,
}

impl DirectoryPipeline {
    pub fn new(processor: Arc<dyn ProcessDocument>, config: PipelineConfig) -> Self {
        Self { processor, config }
    }

    /// Override the number of documents processed at once.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Override the number of entries per output batch.
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Files the pipeline would process under `root`.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, IndexError> {
        LocalSource::from_config(root, &self.config)?.collect_files()
    }

    /// Embed every eligible file under `root` and group the entries into batches.
    ///
    /// Waits for every document before returning. If any document failed,
    /// the whole run fails with the first failure received.
    pub async fn run(&self, root: &Path) -> Result<Vec<Batch>, IndexError> {
        let files = self.discover(root)?;
        let entries = self.process_files(files).await?;
        Ok(group(entries, self.config.batch_size)?.collect())
    }

    /// Embed an explicit list of files with the worker pool.
    pub async fn process_files(&self, files: Vec<PathBuf>) -> Result<Vec<DocumentEntry>, IndexError> {
        let concurrency = self.config.concurrency;
        if concurrency < 1 {
            return Err(ChunkError::InvalidSize(concurrency).into());
        }
        if self.config.batch_size < 1 {
            return Err(ChunkError::InvalidSize(self.config.batch_size).into());
        }

        let total = files.len();
        if total == 0 {
            info!("no files to process");
            return Ok(Vec::new());
        }

        let workers = concurrency.min(total);
        info!(files = total, workers, "starting embedding run");

        let (job_tx, job_rx) = mpsc::channel::<PathBuf>(workers);
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (result_tx, mut result_rx) =
            mpsc::channel::<Result<DocumentEntry, IndexError>>(workers);

        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            let jobs = Arc::clone(&job_rx);
            let results = result_tx.clone();
            let processor = Arc::clone(&self.processor);
            pool.spawn(async move {
                loop {
                    // Lock only long enough to take the next path
                    let next = jobs.lock().await.recv().await;
                    let Some(path) = next else { break };
                    debug!(worker_id, path = %path.display(), "processing");
                    let result = processor.process(&path).await;
                    if results.send(result).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        let feeder = tokio::spawn(async move {
            for path in files {
                if job_tx.send(path).await.is_err() {
                    break;
                }
            }
        });

        let mut entries = Vec::with_capacity(total);
        let mut failures = Vec::new();
        while let Some(result) = result_rx.recv().await {
            match result {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    error!("document failed: {e}");
                    failures.push(e);
                }
            }
        }

        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                failures.push(IndexError::TaskFailed(e.to_string()));
            }
        }
        if let Err(e) = feeder.await {
            failures.push(IndexError::TaskFailed(e.to_string()));
        }

        if !failures.is_empty() {
            let failed = failures.len();
            let first = failures.swap_remove(0);
            error!(failed, total, "embedding run failed");
            return Err(IndexError::RunFailed {
                failed,
                total,
                first: Box::new(first),
            });
        }

        info!(documents = entries.len(), "embedding run complete");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use async_trait::async_trait;

    use crate::models::EmbeddingResult;

    /// Sleeps for a fixed time per document and tracks peak concurrency.
    struct SlowProcessor {
        delay: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fail_name: Option<&'static str>,
    }

    impl SlowProcessor {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                fail_name: None,
            }
        }
    }

    #[async_trait]
    impl ProcessDocument for SlowProcessor {
        async fn process(&self, path: &Path) -> Result<DocumentEntry, IndexError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let name = path.file_name().unwrap().to_string_lossy().to_string();
            if self.fail_name == Some(name.as_str()) {
                return Err(IndexError::FileRead {
                    path: path.to_path_buf(),
                    source: std::io::Error::other("unreadable"),
                });
            }
            Ok(DocumentEntry::new(
                path,
                name,
                EmbeddingResult {
                    vector: vec![1.0, 0.0],
                    total_tokens: 1,
                },
            ))
        }
    }

    fn paths(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("doc{i}.md"))).collect()
    }

    #[tokio::test]
    async fn test_concurrency_bound() {
        let delay = Duration::from_millis(100);
        let processor = Arc::new(SlowProcessor::new(delay));
        let config = PipelineConfig {
            concurrency: 2,
            ..Default::default()
        };
        let pipeline = DirectoryPipeline::new(processor.clone(), config);

        let start = Instant::now();
        let entries = pipeline.process_files(paths(5)).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(entries.len(), 5);
        assert_eq!(processor.peak.load(Ordering::SeqCst), 2);
        // ceil(5 / 2) rounds of work
        assert!(elapsed >= delay * 3, "finished too fast: {elapsed:?}");
        assert!(elapsed < delay * 5, "finished too slow: {elapsed:?}");
    }

    #[tokio::test]
    async fn test_one_failure_fails_run_after_all_documents() {
        let mut slow = SlowProcessor::new(Duration::from_millis(5));
        slow.fail_name = Some("doc3.md");
        let processor = Arc::new(slow);
        let pipeline = DirectoryPipeline::new(processor.clone(), PipelineConfig::default());

        let err = pipeline.process_files(paths(6)).await.unwrap_err();
        match err {
            IndexError::RunFailed {
                failed,
                total,
                first,
            } => {
                assert_eq!(failed, 1);
                assert_eq!(total, 6);
                assert!(first.to_string().contains("doc3.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(processor.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_size_only_changes_grouping() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..7 {
            std::fs::write(dir.path().join(format!("f{i}.md")), "x").unwrap();
        }
        let processor = Arc::new(SlowProcessor::new(Duration::from_millis(1)));

        let mut by_size = Vec::new();
        for batch_size in [1, 3, 10] {
            let pipeline = DirectoryPipeline::new(processor.clone(), PipelineConfig::default())
                .with_batch_size(batch_size);
            let batches = pipeline.run(dir.path()).await.unwrap();
            assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= batch_size));
            assert_eq!(batches.len(), 7usize.div_ceil(batch_size));

            let mut entries: Vec<DocumentEntry> = batches.into_iter().flatten().collect();
            entries.sort_by(|a, b| a.metadata.file_path.cmp(&b.metadata.file_path));
            by_size.push(entries);
        }
        assert_eq!(by_size[0], by_size[1]);
        assert_eq!(by_size[1], by_size[2]);
    }

    #[tokio::test]
    async fn test_empty_directory_yields_no_batches() {
        let dir = tempfile::tempdir().unwrap();
        let processor = Arc::new(SlowProcessor::new(Duration::from_millis(1)));
        let pipeline = DirectoryPipeline::new(processor, PipelineConfig::default());
        assert!(pipeline.run(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_sizes() {
        let processor = Arc::new(SlowProcessor::new(Duration::from_millis(1)));
        let pipeline =
            DirectoryPipeline::new(processor.clone(), PipelineConfig::default()).with_concurrency(0);
        assert!(matches!(
            pipeline.process_files(paths(1)).await,
            Err(IndexError::InvalidArgument(ChunkError::InvalidSize(0)))
        ));

        let pipeline =
            DirectoryPipeline::new(processor, PipelineConfig::default()).with_batch_size(0);
        assert!(matches!(
            pipeline.process_files(paths(1)).await,
            Err(IndexError::InvalidArgument(_))
        ));
    }
}
