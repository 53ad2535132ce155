//! Path B: embedding similarity between the free-text interests and product
//! descriptions. Runs only when interests text is present, and deliberately
//! skips products the explicit path already claimed so the unique slot
//! surfaces a different angle.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::config::EngineConfig;
use super::domain::Product;
use super::query::NormalizedQuery;
use crate::clients::{with_retry, Embedder, ExternalServiceError};

pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Similarity scores for the products that cleared the (possibly relaxed)
/// threshold, keyed by product id.
pub(crate) async fn score<E: Embedder>(
    embedder: &E,
    query: &NormalizedQuery,
    products: &[Product],
    is_claimed_by_explicit: impl Fn(&Product) -> bool,
    config: &EngineConfig,
) -> Result<HashMap<String, f64>, ExternalServiceError> {
    let Some(interests) = query.interests.as_deref() else {
        return Ok(HashMap::new());
    };

    let eligible: Vec<&Product> = products
        .iter()
        .filter(|product| !is_claimed_by_explicit(product))
        .collect();
    if eligible.is_empty() {
        return Ok(HashMap::new());
    }

    // One batched call covers the interests text plus every eligible
    // product, so a request costs a single round trip.
    let mut texts = Vec::with_capacity(eligible.len() + 1);
    texts.push(interests.to_string());
    texts.extend(
        eligible
            .iter()
            .map(|product| format!("{} {}", product.name, product.description)),
    );

    let vectors = with_retry(
        "embedding",
        config.call_timeout,
        config.retry_backoff,
        || embedder.embed_batch(&texts),
    )
    .await?;

    if vectors.len() != texts.len() {
        return Err(ExternalServiceError::Payload {
            service: "embedding",
            reason: format!("expected {} vectors, received {}", texts.len(), vectors.len()),
        });
    }

    let query_vector = &vectors[0];
    let similarities: Vec<(String, f64)> = eligible
        .iter()
        .zip(vectors[1..].iter())
        .map(|(product, vector)| (product.id.clone(), cosine_similarity(query_vector, vector)))
        .collect();

    let strict = matches_at(&similarities, config.semantic_threshold);
    if strict.len() >= config.min_semantic_matches {
        debug!(
            matches = strict.len(),
            threshold = config.semantic_threshold,
            "semantic path resolved at strict threshold"
        );
        return Ok(strict);
    }

    // A single relaxation step; short or generic interest text frequently
    // clears nothing at the strict bar.
    let relaxed = matches_at(&similarities, config.relaxed_threshold);
    warn!(
        strict_matches = strict.len(),
        relaxed_matches = relaxed.len(),
        threshold = config.relaxed_threshold,
        "semantic threshold relaxed"
    );
    Ok(relaxed)
}

/// Pure selection step: everything strictly above the threshold. Lowering
/// the threshold can only grow the result, which is the property the
/// relaxation relies on.
pub(crate) fn matches_at(similarities: &[(String, f64)], threshold: f64) -> HashMap<String, f64> {
    similarities
        .iter()
        .filter(|(_, similarity)| *similarity > threshold)
        .map(|(id, similarity)| (id.clone(), *similarity))
        .collect()
}
