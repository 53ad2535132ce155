//! Safety gate: deterministic exclusion of anything matching a hated or
//! allergy tag. This is the one stage that must never be skipped or
//! partially applied, and no model judgment participates in it — exclusion
//! is decided by exact tag matching alone.

use std::collections::BTreeSet;

use tracing::debug;

use super::domain::{Candidate, Product};
use super::explicit::{attribute_stems, text_stems};
use super::query::{stem, tokenize, NormalizedQuery, Tag};

pub(crate) struct SafetyGate {
    banned: Vec<Tag>,
}

impl SafetyGate {
    pub(crate) fn for_query(query: &NormalizedQuery) -> Self {
        Self {
            banned: query.exclusion_tags().cloned().collect(),
        }
    }

    /// The banned tag this product trips on, if any. A token hit anywhere in
    /// the declared attributes or name/description text is enough: the gate
    /// treats "nut-free" as ambiguous and excludes it rather than trusting
    /// the negation.
    pub(crate) fn violation(&self, product: &Product) -> Option<&str> {
        if self.banned.is_empty() {
            return None;
        }

        let mut stems: BTreeSet<String> = attribute_stems(product);
        stems.extend(text_stems(product));

        self.banned
            .iter()
            .find(|tag| {
                tokenize(&tag.value).any(|word| stems.contains(stem(&word)))
            })
            .map(|tag| tag.value.as_str())
    }

    pub(crate) fn is_safe(&self, product: &Product) -> bool {
        self.violation(product).is_none()
    }

    /// Filter the full candidate union. Runs once, after both matching paths
    /// and before any ranking.
    pub(crate) fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let before = candidates.len();
        let kept: Vec<Candidate> = candidates
            .into_iter()
            .filter(|candidate| match self.violation(&candidate.product) {
                Some(tag) => {
                    debug!(
                        product = %candidate.product.name,
                        tag,
                        "safety gate rejected candidate"
                    );
                    false
                }
                None => true,
            })
            .collect();

        debug!(before, after = kept.len(), "safety gate complete");
        kept
    }
}
