//! Blending and slot selection. Category assignment is an ordered sequence
//! of selection rules over a shrinking pool, so a product can never fill two
//! slots.

use std::cmp::Ordering;

use super::config::EngineConfig;
use super::domain::Candidate;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoredPick {
    pub candidate: Candidate,
    pub score: f64,
}

#[derive(Debug, Default)]
pub(crate) struct SlotSelection {
    pub best_match: Option<ScoredPick>,
    pub safe_bet: Option<ScoredPick>,
    pub unique: Option<ScoredPick>,
}

/// Blend each candidate's evidence into one score and fill the three slots
/// in order. Every selection removes its product from the pool.
pub(crate) fn categorize(candidates: Vec<Candidate>, config: &EngineConfig) -> SlotSelection {
    let max_explicit = candidates
        .iter()
        .map(|candidate| candidate.explicit_score)
        .fold(0.0f64, f64::max);

    let mut pool: Vec<ScoredPick> = candidates
        .into_iter()
        .map(|candidate| {
            let explicit_norm = if max_explicit > 0.0 {
                candidate.explicit_score / max_explicit
            } else {
                0.0
            };
            let semantic = candidate.semantic_score.unwrap_or(0.0);
            let score =
                config.explicit_weight * explicit_norm + config.semantic_weight * semantic;
            ScoredPick { candidate, score }
        })
        .collect();

    pool.sort_by(rank_order);

    // Rule 1: best match needs explicit evidence; a purely semantic winner
    // does not qualify here.
    let best_match = take_first(&mut pool, |pick| pick.candidate.has_explicit_evidence());

    // Rule 2: safe bet prefers broad appeal (explicit evidence and no
    // niche/semantic-only angle); otherwise it falls back to the next best
    // remaining candidate of any kind.
    let safe_bet = take_first(&mut pool, |pick| {
        pick.candidate.has_explicit_evidence() && pick.candidate.semantic_score.is_none()
    })
    .or_else(|| take_first(&mut pool, |_| true));

    // Rule 3: unique is reserved for semantic-only evidence; it stays empty
    // rather than repeating an explicit-path pick.
    let unique = take_first(&mut pool, |pick| pick.candidate.is_semantic_only());

    SlotSelection {
        best_match,
        safe_bet,
        unique,
    }
}

/// Deterministic ranking: blended score descending, then price ascending
/// (cheaper wins equal evidence), then catalog popularity, then id.
fn rank_order(a: &ScoredPick, b: &ScoredPick) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.candidate.product.price.total_cmp(&b.candidate.product.price))
        .then_with(|| {
            popularity_key(a.candidate.product.popularity_rank)
                .cmp(&popularity_key(b.candidate.product.popularity_rank))
        })
        .then_with(|| a.candidate.product.id.cmp(&b.candidate.product.id))
}

fn popularity_key(rank: Option<u32>) -> u64 {
    // Unranked products sort after every ranked one.
    rank.map_or(u64::MAX, u64::from)
}

fn take_first(
    pool: &mut Vec<ScoredPick>,
    predicate: impl Fn(&ScoredPick) -> bool,
) -> Option<ScoredPick> {
    let position = pool.iter().position(predicate)?;
    Some(pool.remove(position))
}
