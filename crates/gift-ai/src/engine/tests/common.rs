use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::clients::{
    CandidateSource, Embedder, ExplanationWriter, ExternalServiceError,
};
use crate::engine::domain::Product;
use crate::engine::query::{GiftQuery, Occasion};
use crate::engine::{EngineConfig, RecommendationEngine};

pub(super) fn product(id: &str, name: &str, price: f64, attributes: &[&str]) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} gift arrangement"),
        price,
        image_url: None,
        attributes: attributes.iter().map(|a| a.to_string()).collect(),
        popularity_rank: None,
    }
}

pub(super) fn birthday_query() -> GiftQuery {
    GiftQuery {
        occasion: Occasion::Birthday,
        budget_min: None,
        budget_max: Some(50.0),
        same_day_required: false,
        recipient_name: "Maya".to_string(),
        loves: vec!["chocolate".to_string()],
        hates: vec!["nuts".to_string()],
        allergies: vec!["peanuts".to_string()],
        interests: None,
    }
}

/// Candidate source serving a fixed product list.
pub(super) struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    pub(super) fn new(products: Vec<Product>) -> Self {
        Self { products }
    }
}

#[async_trait]
impl CandidateSource for StaticCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<Product>, ExternalServiceError> {
        Ok(self.products.clone())
    }
}

/// Candidate source that answers, but slower than the given delay.
pub(super) struct SlowCatalog {
    delay: Duration,
}

impl SlowCatalog {
    pub(super) fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl CandidateSource for SlowCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<Product>, ExternalServiceError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

/// Candidate source that is always down; the engine must treat this as
/// fatal.
pub(super) struct FailingCatalog;

#[async_trait]
impl CandidateSource for FailingCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<Product>, ExternalServiceError> {
        Err(ExternalServiceError::Request {
            service: "catalog",
            reason: "connection refused".to_string(),
        })
    }
}

/// Deterministic embedder: the vector for a text is the first entry whose
/// key appears in the text. Unknown texts embed to the zero vector, which
/// has zero similarity to everything.
pub(super) struct MappedEmbedder {
    entries: Vec<(String, Vec<f32>)>,
}

impl MappedEmbedder {
    pub(super) fn new(entries: &[(&str, &[f32])]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(key, vector)| (key.to_string(), vector.to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl Embedder for MappedEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ExternalServiceError> {
        Ok(texts
            .iter()
            .map(|text| {
                self.entries
                    .iter()
                    .find(|(key, _)| text.contains(key))
                    .map(|(_, vector)| vector.clone())
                    .unwrap_or_else(|| vec![0.0, 0.0])
            })
            .collect())
    }
}

/// Embedder that is always unavailable; the semantic path must degrade.
pub(super) struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ExternalServiceError> {
        Err(ExternalServiceError::Request {
            service: "embedding",
            reason: "service unavailable".to_string(),
        })
    }
}

/// Writer producing a canned, deterministic explanation.
pub(super) struct CannedWriter;

#[async_trait]
impl ExplanationWriter for CannedWriter {
    async fn complete(&self, _prompt: &str) -> Result<String, ExternalServiceError> {
        Ok("A thoughtful pick for the occasion.".to_string())
    }
}

/// Writer that always fails so explanations fall back to the template.
pub(super) struct FailingWriter;

#[async_trait]
impl ExplanationWriter for FailingWriter {
    async fn complete(&self, _prompt: &str) -> Result<String, ExternalServiceError> {
        Err(ExternalServiceError::Timeout {
            service: "chat",
            timeout_ms: 10,
        })
    }
}

/// Short collaborator timing so retry/backoff paths do not slow tests down.
pub(super) fn fast_config() -> EngineConfig {
    EngineConfig::default()
        .with_collaborator_timing(Duration::from_millis(200), Duration::from_millis(1))
}

pub(super) fn engine<S, E, L>(
    source: S,
    embedder: E,
    writer: L,
    config: EngineConfig,
) -> RecommendationEngine<S, E, L>
where
    S: CandidateSource + 'static,
    E: Embedder + 'static,
    L: ExplanationWriter + 'static,
{
    RecommendationEngine::new(Arc::new(source), Arc::new(embedder), Arc::new(writer), config)
}
