//! Local file system data source.

use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::IndexError;
use crate::models::PipelineConfig;
use crate::utils::file::has_allowed_extension;

/// Local file system data source.
#[derive(Debug)]
pub struct LocalSource {
    /// Root path to scan
    root: PathBuf,

    /// Extensions to include, without the leading dot
    extensions: Vec<String>,

    /// Patterns to exclude
    exclude_patterns: Vec<Pattern>,

    /// Maximum file size, unlimited when `None`
    max_file_size: Option<u64>,
}

impl LocalSource {
    /// Create a new local source.
    pub fn new(
        root: PathBuf,
        extensions: Vec<String>,
        exclude_patterns: &[String],
        max_file_size: Option<u64>,
    ) -> Result<Self, IndexError> {
        let exclude_patterns = exclude_patterns
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| IndexError::InvalidPattern {
                    pattern: p.clone(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            root,
            extensions,
            exclude_patterns,
            max_file_size,
        })
    }

    /// Create a source using the pipeline's filters.
    pub fn from_config(root: impl Into<PathBuf>, config: &PipelineConfig) -> Result<Self, IndexError> {
        Self::new(
            root.into(),
            config.extensions.clone(),
            &config.exclude_patterns,
            config.max_file_size,
        )
    }

    /// Collect all matching files under the root, in sorted walk order.
    pub fn collect_files(&self) -> Result<Vec<PathBuf>, IndexError> {
        if self.root.is_file() {
            if !self.is_eligible(&self.root) {
                return Ok(Vec::new());
            }
            let size = std::fs::metadata(&self.root)
                .map_err(|e| IndexError::WalkError(e.to_string()))?
                .len();
            self.check_size(&self.root, size)?;
            return Ok(vec![self.root.clone()]);
        }

        if !self.root.is_dir() {
            return Err(IndexError::WalkError(format!(
                "not a directory: {}",
                self.root.display()
            )));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| IndexError::WalkError(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.is_eligible(path) {
                continue;
            }

            if self.max_file_size.is_some() {
                let size = entry
                    .metadata()
                    .map_err(|e| IndexError::WalkError(e.to_string()))?
                    .len();
                self.check_size(path, size)?;
            }

            files.push(path.to_path_buf());
        }

        debug!(root = %self.root.display(), files = files.len(), "collected files");
        Ok(files)
    }

    fn check_size(&self, path: &Path, size: u64) -> Result<(), IndexError> {
        match self.max_file_size {
            Some(max) if size > max => Err(IndexError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                max,
            }),
            _ => Ok(()),
        }
    }

    fn is_eligible(&self, path: &Path) -> bool {
        if !has_allowed_extension(path, &self.extensions) {
            return false;
        }
        let path_str = path.to_string_lossy();
        !self.exclude_patterns.iter().any(|p| p.matches(&path_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_collects_markdown_recursively() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "a");
        write(dir.path(), "nested/deeper/b.md", "b");
        write(dir.path(), "nested/c.txt", "c");

        let source = LocalSource::from_config(dir.path(), &PipelineConfig::default()).unwrap();
        let files = source.collect_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec!["a.md", "nested/deeper/b.md"]);
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "a");
        write(dir.path(), "b.txt", "b");

        let config = PipelineConfig {
            extensions: vec!["txt".to_string()],
            ..Default::default()
        };
        let files = LocalSource::from_config(dir.path(), &config)
            .unwrap()
            .collect_files()
            .unwrap();
        assert_eq!(files, vec![dir.path().join("b.txt")]);
    }

    #[test]
    fn test_defaults_include_hidden_dirs_and_large_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "a");
        write(dir.path(), ".venv/b.md", "b");
        write(dir.path(), "node_modules/pkg/c.md", "c");
        write(dir.path(), "big.md", &"x ".repeat(6 * 1024 * 1024));

        let files = LocalSource::from_config(dir.path(), &PipelineConfig::default())
            .unwrap()
            .collect_files()
            .unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names, vec![".venv/b.md", "a.md", "big.md", "node_modules/pkg/c.md"]);
    }

    #[test]
    fn test_exclude_patterns_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "a");
        write(dir.path(), ".venv/b.md", "b");

        let config = PipelineConfig {
            exclude_patterns: vec!["**/.venv/**".to_string()],
            ..Default::default()
        };
        let files = LocalSource::from_config(dir.path(), &config)
            .unwrap()
            .collect_files()
            .unwrap();
        assert_eq!(files, vec![dir.path().join("a.md")]);
    }

    #[test]
    fn test_oversized_file_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "small.md", "ok");
        write(dir.path(), "big.md", &"x".repeat(100));

        let config = PipelineConfig {
            max_file_size: Some(10),
            ..Default::default()
        };
        let err = LocalSource::from_config(dir.path(), &config)
            .unwrap()
            .collect_files()
            .unwrap_err();
        match err {
            IndexError::FileTooLarge { path, size, max } => {
                assert_eq!(path, dir.path().join("big.md"));
                assert_eq!(size, 100);
                assert_eq!(max, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_root_is_error() {
        let source =
            LocalSource::from_config("/no/such/docvec/root", &PipelineConfig::default()).unwrap();
        assert!(matches!(
            source.collect_files(),
            Err(IndexError::WalkError(_))
        ));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = LocalSource::new(PathBuf::from("."), vec!["md".into()], &["[".into()], None)
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidPattern { .. }));
    }
}
