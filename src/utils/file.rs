//! File utilities for ingestion.

use std::fs;
use std::path::Path;

/// Check whether a path ends in one of the allowed extensions.
///
/// Comparison is case-insensitive and ignores a leading dot in the
/// configured extension, so `"md"` and `".MD"` are equivalent.
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy();
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}

/// Read file content as UTF-8 text.
pub fn read_file_content(path: &Path) -> std::io::Result<String> {
    fs::read_to_string(path)
}

/// Read file content as UTF-8 text without blocking the runtime.
pub async fn read_file_content_async(path: &Path) -> std::io::Result<String> {
    tokio::fs::read_to_string(path).await
}
