//! Embedding client for the remote embedding service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::EmbeddingError;
use crate::models::{EmbeddingConfig, EmbeddingInput, EmbeddingResult};
use crate::utils::retry::{RetryConfig, RetryResult, Retryable, with_retry};

/// A single, unretried call to an embedding backend.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed one input. Returns the raw vector and the reported token usage.
    async fn embed(&self, input: &EmbeddingInput) -> Result<EmbeddingResult, EmbeddingError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;
}

/// Request body for the /embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    input: &'a EmbeddingInput,
    model: &'a str,
}

/// Response from the /embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
    #[serde(default)]
    usage: Option<Usage>,
}

impl EmbedResponse {
    /// First embedding in the response, checked against `dimension`.
    ///
    /// Usage reporting is best-effort; a missing count becomes 0.
    fn into_result(self, dimension: usize) -> Result<EmbeddingResult, EmbeddingError> {
        let vector = self
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty data array".to_string()))?;

        if vector.len() != dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }

        let total_tokens = self.usage.and_then(|u| u.total_tokens).unwrap_or(0);
        Ok(EmbeddingResult {
            vector,
            total_tokens,
        })
    }
}

/// Map a non-success HTTP status to an error.
///
/// 5xx and 429 are service-side and become `ServerError`; everything else is
/// a `ClientError`.
fn classify_status(status: u16, body: String) -> EmbeddingError {
    if status >= 500 || status == 429 {
        EmbeddingError::ServerError { status, body }
    } else {
        EmbeddingError::ClientError { status, body }
    }
}

#[derive(Debug, Deserialize)]
struct EmbedData {
    embedding: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: Option<u64>,
}

/// OpenAI-compatible HTTP embedding backend.
#[derive(Debug, Clone)]
pub struct OpenAiEmbeddingService {
    client: Client,
    endpoint: String,
    model: String,
    dimension: usize,
}

impl OpenAiEmbeddingService {
    /// Create a new service with the given configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| EmbeddingError::MissingApiKey(config.api_key_env.clone()))?;

        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|e| EmbeddingError::RequestError(format!("invalid API key: {e}")))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.url.trim_end_matches('/')),
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    /// Full URL of the embeddings endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmbeddingService for OpenAiEmbeddingService {
    async fn embed(&self, input: &EmbeddingInput) -> Result<EmbeddingResult, EmbeddingError> {
        let request = EmbedRequest {
            input,
            model: &self.model,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        parsed.into_result(self.dimension)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Embedding client that retries transient service failures.
#[derive(Clone)]
pub struct EmbeddingClient {
    service: Arc<dyn EmbeddingService>,
    retry: RetryConfig,
}

impl EmbeddingClient {
    /// Wrap any service with the given retry policy.
    pub fn new(service: Arc<dyn EmbeddingService>, retry: RetryConfig) -> Self {
        Self { service, retry }
    }

    /// Build a client backed by the HTTP service.
    pub fn from_config(
        config: &EmbeddingConfig,
        retry: RetryConfig,
    ) -> Result<Self, EmbeddingError> {
        let service = OpenAiEmbeddingService::new(config)?;
        Ok(Self::new(Arc::new(service), retry))
    }

    /// Embed one input, retrying transient errors up to `max_attempts` calls.
    ///
    /// Non-transient errors are logged and returned after the first attempt.
    pub async fn embed(&self, input: &EmbeddingInput) -> Result<EmbeddingResult, EmbeddingError> {
        let result = with_retry(&self.retry, || self.service.embed(input)).await;

        match result {
            RetryResult::Success(embedding) => {
                debug!(
                    model = self.service.model(),
                    input_tokens = input.token_len(),
                    usage = embedding.total_tokens,
                    "embedded input"
                );
                Ok(embedding)
            }
            RetryResult::Failed {
                last_error,
                attempts,
            } => {
                if last_error.is_retryable() {
                    error!(
                        model = self.service.model(),
                        attempts, "embedding retries exhausted: {last_error}"
                    );
                } else {
                    error!(
                        model = self.service.model(),
                        attempts,
                        input_tokens = input.token_len(),
                        error = ?last_error,
                        "non-retryable embedding failure: {last_error}"
                    );
                }
                Err(last_error)
            }
        }
    }

    /// Model identifier of the wrapped service.
    pub fn model(&self) -> &str {
        self.service.model()
    }
}
