use serde::{Deserialize, Serialize};

/// Catalog product as returned by the candidate source. The engine treats it
/// as read-only; prices are non-negative by construction in the catalog
/// client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Declared attributes (ingredient names) used for exact-tag matching.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Position in the catalog's own result ordering; lower is more popular.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_rank: Option<u32>,
}

/// A product annotated with per-path match evidence. Built during matching,
/// consumed by the safety gate and categorizer, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub product: Product,
    /// Path A weighted tag-hit score, zero when nothing matched.
    pub explicit_score: f64,
    /// Loves tags that contributed to the explicit score.
    pub matched_loves: Vec<String>,
    /// Path B cosine similarity in [0, 1], absent when the semantic path did
    /// not run or did not keep this product.
    pub semantic_score: Option<f64>,
}

impl Candidate {
    pub fn has_explicit_evidence(&self) -> bool {
        self.explicit_score > 0.0
    }

    pub fn is_semantic_only(&self) -> bool {
        self.semantic_score.is_some() && !self.has_explicit_evidence()
    }
}

/// The three result slots, in selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    BestMatch,
    SafeBet,
    Unique,
}

impl Category {
    pub const fn label(self) -> &'static str {
        match self {
            Category::BestMatch => "best_match",
            Category::SafeBet => "safe_bet",
            Category::Unique => "unique",
        }
    }
}

/// A filled result slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub product: Product,
    pub score: f64,
    pub category: Category,
    pub explanation: String,
}

/// Machine-readable cause for an all-null result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    /// The candidate source returned nothing for the keyword.
    NoCandidates,
    /// Candidates existed but none satisfied the budget bounds.
    BudgetExcludedAll,
    /// Budget-qualifying candidates existed but the safety gate removed all
    /// of them.
    SafetyExcludedAll,
}

/// Final response: up to three distinct picks. Any slot may be null; callers
/// must treat partial sets as success. `empty_reason` is set only when all
/// three slots are null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub best_match: Option<Recommendation>,
    pub safe_bet: Option<Recommendation>,
    pub unique: Option<Recommendation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_reason: Option<EmptyReason>,
}

impl RecommendationSet {
    pub fn empty(reason: EmptyReason) -> Self {
        Self {
            best_match: None,
            safe_bet: None,
            unique: None,
            empty_reason: Some(reason),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.best_match.is_none() && self.safe_bet.is_none() && self.unique.is_none()
    }

    /// Filled slots in category order, for iteration-style assertions and
    /// rendering.
    pub fn filled(&self) -> impl Iterator<Item = &Recommendation> {
        [&self.best_match, &self.safe_bet, &self.unique]
            .into_iter()
            .filter_map(|slot| slot.as_ref())
    }
}
