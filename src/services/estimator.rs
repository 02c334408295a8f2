//! Token budget estimation without any embedding calls.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::IndexError;
use crate::models::PipelineConfig;
use crate::services::tokenizer::Tokenizer;
use crate::sources::LocalSource;
use crate::utils::file::read_file_content;

/// Token count for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileEstimate {
    pub path: PathBuf,
    pub tokens: usize,
}

/// Projected cost of embedding a directory.
#[derive(Debug, Clone, Serialize)]
pub struct TokenEstimate {
    pub files: usize,
    pub total_tokens: usize,
    pub estimated_cost_usd: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub per_file: Vec<FileEstimate>,
}

/// Counts tokens over the same files, with the same encoding, as the pipeline.
#[derive(Debug, Clone)]
pub struct TokenEstimator {
    tokenizer: Tokenizer,
    config: PipelineConfig,
}

impl TokenEstimator {
    pub fn new(tokenizer: Tokenizer, config: PipelineConfig) -> Self {
        Self { tokenizer, config }
    }

    /// Sum of `count_tokens` over every eligible file under `root`.
    pub fn estimate_tokens(&self, root: &Path) -> Result<usize, IndexError> {
        Ok(self.count_files(root)?.iter().map(|f| f.tokens).sum())
    }

    /// Token totals plus projected cost at `price_per_1k_tokens`.
    pub fn estimate(
        &self,
        root: &Path,
        price_per_1k_tokens: f64,
        include_files: bool,
    ) -> Result<TokenEstimate, IndexError> {
        let per_file = self.count_files(root)?;
        let total_tokens: usize = per_file.iter().map(|f| f.tokens).sum();

        Ok(TokenEstimate {
            files: per_file.len(),
            total_tokens,
            estimated_cost_usd: total_tokens as f64 * price_per_1k_tokens / 1000.0,
            per_file: if include_files { per_file } else { Vec::new() },
        })
    }

    fn count_files(&self, root: &Path) -> Result<Vec<FileEstimate>, IndexError> {
        let files = LocalSource::from_config(root, &self.config)?.collect_files()?;

        files
            .into_iter()
            .map(|path| {
                let content = read_file_content(&path).map_err(|source| IndexError::FileRead {
                    path: path.clone(),
                    source,
                })?;
                let tokens = self.tokenizer.count_tokens(&content);
                debug!(path = %path.display(), tokens, "counted tokens");
                Ok(FileEstimate { path, tokens })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.md"), "hello world").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.md"), "# Heading\n\nSome body text.").unwrap();
        fs::write(dir.path().join("sub/ignored.txt"), "not counted").unwrap();
        dir
    }

    #[test]
    fn test_estimate_matches_sum_of_counts() {
        let dir = fixture();
        let tokenizer = Tokenizer::from_encoding("cl100k_base").unwrap();
        let expected = tokenizer.count_tokens("hello world")
            + tokenizer.count_tokens("# Heading\n\nSome body text.");

        let estimator = TokenEstimator::new(tokenizer, PipelineConfig::default());
        assert_eq!(estimator.estimate_tokens(dir.path()).unwrap(), expected);
    }

    #[test]
    fn test_estimate_independent_of_batching() {
        let dir = fixture();
        let tokenizer = Tokenizer::from_encoding("cl100k_base").unwrap();
        let baseline = TokenEstimator::new(tokenizer.clone(), PipelineConfig::default())
            .estimate_tokens(dir.path())
            .unwrap();

        let config = PipelineConfig {
            batch_size: 1,
            concurrency: 9,
            ..Default::default()
        };
        let other = TokenEstimator::new(tokenizer, config)
            .estimate_tokens(dir.path())
            .unwrap();
        assert_eq!(baseline, other);
    }

    #[test]
    fn test_estimate_cost() {
        let dir = fixture();
        let tokenizer = Tokenizer::from_encoding("cl100k_base").unwrap();
        let estimator = TokenEstimator::new(tokenizer, PipelineConfig::default());

        let estimate = estimator.estimate(dir.path(), 0.0001, true).unwrap();
        assert_eq!(estimate.files, 2);
        assert_eq!(estimate.per_file.len(), 2);
        let expected_cost = estimate.total_tokens as f64 * 0.0001 / 1000.0;
        assert!((estimate.estimated_cost_usd - expected_cost).abs() < 1e-15);

        let summary = estimator.estimate(dir.path(), 0.0001, false).unwrap();
        assert!(summary.per_file.is_empty());
        assert_eq!(summary.total_tokens, estimate.total_tokens);
    }

    #[test]
    fn test_estimate_counts_hidden_directories() {
        let dir = fixture();
        fs::create_dir_all(dir.path().join(".venv")).unwrap();
        fs::write(dir.path().join(".venv/c.md"), "hidden notes").unwrap();

        let tokenizer = Tokenizer::from_encoding("cl100k_base").unwrap();
        let estimator = TokenEstimator::new(tokenizer, PipelineConfig::default());
        let estimate = estimator.estimate(dir.path(), 0.0, false).unwrap();
        assert_eq!(estimate.files, 3);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let tokenizer = Tokenizer::from_encoding("cl100k_base").unwrap();
        let estimator = TokenEstimator::new(tokenizer, PipelineConfig::default());
        assert_eq!(estimator.estimate_tokens(dir.path()).unwrap(), 0);
    }
}
