//! Outbound collaborator boundaries.
//!
//! The engine never talks to the network directly; it depends on the three
//! traits defined here. Production wiring uses [`CatalogHttpClient`] and
//! [`OpenAiClient`]; tests and the CLI demo substitute in-process fakes.

pub mod catalog;
pub mod openai;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::engine::domain::Product;

pub use catalog::CatalogHttpClient;
pub use openai::OpenAiClient;

/// Failure raised by any outbound collaborator call.
#[derive(Debug, thiserror::Error)]
pub enum ExternalServiceError {
    #[error("{service} request failed: {reason}")]
    Request { service: &'static str, reason: String },
    #[error("{service} returned a malformed payload: {reason}")]
    Payload { service: &'static str, reason: String },
    #[error("{service} timed out after {timeout_ms}ms")]
    Timeout { service: &'static str, timeout_ms: u64 },
}

/// Unranked product lookup by keyword. The keyword is built from occasion and
/// loved tags only; budget is applied downstream as a hard filter.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn search(&self, keyword: &str) -> Result<Vec<Product>, ExternalServiceError>;
}

/// Text embedding collaborator. Must be stable: identical input text yields
/// an identical vector within one process, so repeated queries rank
/// deterministically.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed every text in order; the result has the same length and order
    /// as the input. Batched so one request covers the query text plus all
    /// candidate descriptions.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ExternalServiceError>;
}

/// Chat-completion collaborator used for recommendation explanations only.
/// Failures here are never fatal; the engine falls back to a template.
#[async_trait]
pub trait ExplanationWriter: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ExternalServiceError>;
}

/// Run a collaborator call with a per-attempt timeout and a single retry
/// after a short backoff.
pub(crate) async fn with_retry<T, F, Fut>(
    service: &'static str,
    timeout: Duration,
    backoff: Duration,
    op: F,
) -> Result<T, ExternalServiceError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ExternalServiceError>>,
{
    match attempt(service, timeout, op()).await {
        Ok(value) => Ok(value),
        Err(first) => {
            warn!(service, error = %first, "collaborator call failed, retrying once");
            tokio::time::sleep(backoff).await;
            attempt(service, timeout, op()).await
        }
    }
}

async fn attempt<T, Fut>(
    service: &'static str,
    timeout: Duration,
    fut: Fut,
) -> Result<T, ExternalServiceError>
where
    Fut: Future<Output = Result<T, ExternalServiceError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(ExternalServiceError::Timeout {
            service,
            timeout_ms: timeout.as_millis() as u64,
        }),
    }
}
