//! Utility modules.

pub mod file;
pub mod retry;

pub use file::{has_allowed_extension, read_file_content, read_file_content_async};
pub use retry::{RetryConfig, RetryResult, Retryable, with_retry};
