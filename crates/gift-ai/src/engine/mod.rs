//! The recommendation pipeline.
//!
//! Data flows strictly forward: normalized query → candidate fetch → hard
//! budget filter → explicit and semantic matching (concurrently, over the
//! shared read-only set) → safety gate over the full union → slot
//! categorization → explanations. No stage feeds back upstream and nothing
//! is retained between requests.

pub mod budget;
mod config;
pub mod domain;
mod explain;
mod explicit;
pub mod query;
pub mod router;
mod safety;
mod scoring;
mod semantic;

#[cfg(test)]
mod tests;

pub use budget::BudgetBounds;
pub use config::EngineConfig;
pub use domain::{
    Candidate, Category, EmptyReason, Product, Recommendation, RecommendationSet,
};
pub use query::{GiftQuery, NormalizedQuery, Occasion, Tag, ValidationError, TAG_VOCABULARY};
pub use router::recommendation_router;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::{
    with_retry, CandidateSource, Embedder, ExplanationWriter, ExternalServiceError,
};
use scoring::ScoredPick;

/// Failure that aborts a recommendation request. Everything else degrades:
/// embedding failure collapses the semantic path, chat failure falls back to
/// template explanations, and empty result sets are reported in-band.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("candidate source unavailable: {0}")]
    CandidateSource(#[source] ExternalServiceError),
    #[error("recommendation did not complete within {deadline_ms}ms")]
    DeadlineExceeded { deadline_ms: u64 },
}

/// Stateless engine composing the candidate source, embedder, and
/// explanation writer. One instance serves concurrent requests; nothing is
/// shared between them but the read-only configuration.
pub struct RecommendationEngine<S, E, L> {
    source: Arc<S>,
    embedder: Arc<E>,
    writer: Arc<L>,
    config: EngineConfig,
}

impl<S, E, L> RecommendationEngine<S, E, L>
where
    S: CandidateSource + 'static,
    E: Embedder + 'static,
    L: ExplanationWriter + 'static,
{
    pub fn new(source: Arc<S>, embedder: Arc<E>, writer: Arc<L>, config: EngineConfig) -> Self {
        Self {
            source,
            embedder,
            writer,
            config,
        }
    }

    /// Run the full pipeline for one query, bounded by the request deadline.
    pub async fn recommend(&self, query: GiftQuery) -> Result<RecommendationSet, EngineError> {
        match tokio::time::timeout(self.config.request_deadline, self.run(query)).await {
            Ok(result) => result,
            Err(_) => Err(EngineError::DeadlineExceeded {
                deadline_ms: self.config.request_deadline.as_millis() as u64,
            }),
        }
    }

    async fn run(&self, query: GiftQuery) -> Result<RecommendationSet, EngineError> {
        let query = query.normalize()?;
        let keyword = query.search_keyword();
        info!(
            recipient = %query.recipient_name,
            occasion = query.occasion.label(),
            %keyword,
            "recommendation pipeline started"
        );

        let products = with_retry(
            "catalog",
            self.config.call_timeout,
            self.config.retry_backoff,
            || self.source.search(&keyword),
        )
        .await
        .map_err(EngineError::CandidateSource)?;

        if products.is_empty() {
            info!("catalog returned no candidates");
            return Ok(RecommendationSet::empty(EmptyReason::NoCandidates));
        }

        let fetched = products.len();
        let candidates = budget::apply(products, &query.budget);
        info!(fetched, in_budget = candidates.len(), "budget filter applied");
        if candidates.is_empty() {
            return Ok(RecommendationSet::empty(EmptyReason::BudgetExcludedAll));
        }

        // Both matching paths read the same filtered set and are independent:
        // the semantic path decides explicit-claimed products with the same
        // predicate Path A uses, so neither waits on the other.
        let explicit_future = async {
            candidates
                .iter()
                .map(|product| explicit::score_product(product, &query.loves, &self.config))
                .collect::<Vec<_>>()
        };
        let semantic_future = semantic::score(
            self.embedder.as_ref(),
            &query,
            &candidates,
            |product| explicit::score_product(product, &query.loves, &self.config).score > 0.0,
            &self.config,
        );
        let (evidence, semantic_result) = tokio::join!(explicit_future, semantic_future);

        let semantic_scores: HashMap<String, f64> = match semantic_result {
            Ok(scores) => scores,
            Err(err) => {
                warn!(error = %err, "semantic path degraded; continuing with explicit evidence only");
                HashMap::new()
            }
        };

        let union: Vec<Candidate> = candidates
            .into_iter()
            .zip(evidence)
            .map(|(product, evidence)| {
                let semantic_score = semantic_scores.get(&product.id).copied();
                Candidate {
                    product,
                    explicit_score: evidence.score,
                    matched_loves: evidence.matched,
                    semantic_score,
                }
            })
            .collect();

        // Hard synchronization point: the gate sees the complete union
        // before any ranking happens.
        let gate = safety::SafetyGate::for_query(&query);
        let safe = gate.filter(union);
        if safe.is_empty() {
            info!("safety gate removed every candidate");
            return Ok(RecommendationSet::empty(EmptyReason::SafetyExcludedAll));
        }

        let slots = scoring::categorize(safe, &self.config);
        let (best_match, safe_bet, unique) = tokio::join!(
            self.fill_slot(slots.best_match, Category::BestMatch, &query),
            self.fill_slot(slots.safe_bet, Category::SafeBet, &query),
            self.fill_slot(slots.unique, Category::Unique, &query),
        );

        let set = RecommendationSet {
            best_match,
            safe_bet,
            unique,
            empty_reason: None,
        };

        debug_assert!(
            set.filled().all(|rec| gate.is_safe(&rec.product)),
            "safety gate invariant breached"
        );

        info!(slots = set.filled().count(), "recommendation pipeline complete");
        Ok(set)
    }

    async fn fill_slot(
        &self,
        pick: Option<ScoredPick>,
        category: Category,
        query: &NormalizedQuery,
    ) -> Option<Recommendation> {
        let pick = pick?;
        let explanation = explain::write_explanation(
            self.writer.as_ref(),
            &pick,
            category,
            query,
            &self.config,
        )
        .await;

        Some(Recommendation {
            product: pick.candidate.product,
            score: pick.score,
            category,
            explanation,
        })
    }
}
