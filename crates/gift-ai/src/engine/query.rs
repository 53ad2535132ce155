use serde::{Deserialize, Serialize};

use super::budget::BudgetBounds;

/// Closed tag vocabulary the UI offers for loves/hates/allergies. Sorted so
/// membership checks can binary-search. Tags outside this list are accepted
/// but flagged non-authoritative, since they may never match catalog
/// attributes.
pub const TAG_VOCABULARY: &[&str] = &[
    "apples",
    "bananas",
    "berries",
    "brownies",
    "candy",
    "caramel",
    "cheesecake",
    "chocolate",
    "citrus",
    "coconut",
    "cookies",
    "dairy",
    "flowers",
    "fruit",
    "gluten",
    "nuts",
    "peanuts",
    "pineapple",
    "popcorn",
    "strawberries",
    "tropical",
    "vegan",
];

/// Gifting occasion selected in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occasion {
    Birthday,
    Anniversary,
    Congratulations,
    GetWell,
    ThankYou,
    Sympathy,
    Holiday,
    JustBecause,
}

impl Occasion {
    pub const fn label(self) -> &'static str {
        match self {
            Occasion::Birthday => "birthday",
            Occasion::Anniversary => "anniversary",
            Occasion::Congratulations => "congratulations",
            Occasion::GetWell => "get well",
            Occasion::ThankYou => "thank you",
            Occasion::Sympathy => "sympathy",
            Occasion::Holiday => "holiday",
            Occasion::JustBecause => "just because",
        }
    }
}

/// Raw recommendation request as collected by the UI. Normalized exactly once
/// via [`GiftQuery::normalize`]; the engine only ever sees the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GiftQuery {
    pub occasion: Occasion,
    #[serde(default)]
    pub budget_min: Option<f64>,
    #[serde(default)]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub same_day_required: bool,
    pub recipient_name: String,
    #[serde(default)]
    pub loves: Vec<String>,
    #[serde(default)]
    pub hates: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub interests: Option<String>,
}

/// A normalized preference tag. `authoritative` marks membership in the
/// closed vocabulary; unknown tags still participate in matching but at
/// reduced weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub value: String,
    pub authoritative: bool,
}

/// Canonical, validated query consumed by the pipeline. Immutable after
/// construction; no engine component mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuery {
    pub occasion: Occasion,
    pub budget: BudgetBounds,
    pub same_day_required: bool,
    pub recipient_name: String,
    pub loves: Vec<Tag>,
    pub hates: Vec<Tag>,
    pub allergies: Vec<Tag>,
    pub interests: Option<String>,
}

impl NormalizedQuery {
    /// Search keyword for the candidate source: occasion plus loved tags.
    /// Budget is deliberately absent; it is a post-filter, not a relevance
    /// signal.
    pub fn search_keyword(&self) -> String {
        let mut parts = vec![self.occasion.label().to_string()];
        parts.extend(self.loves.iter().map(|tag| tag.value.clone()));
        parts.join(" ")
    }

    /// Tags that make a product unsafe: hates and allergies combined.
    pub fn exclusion_tags(&self) -> impl Iterator<Item = &Tag> {
        self.hates.iter().chain(self.allergies.iter())
    }
}

/// Rejection raised before the pipeline runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("recipient_name must not be empty")]
    MissingRecipientName,
    #[error("budget_min {min:.2} exceeds budget_max {max:.2}")]
    InvertedBudget { min: f64, max: f64 },
    #[error("budget bounds must be non-negative (found {found:.2})")]
    NegativeBudget { found: f64 },
}

impl GiftQuery {
    /// Validate and canonicalize the query. Tags are lowercased, trimmed,
    /// deduplicated, and flagged against the closed vocabulary. Fails fast
    /// on a missing recipient or malformed budget bounds.
    pub fn normalize(self) -> Result<NormalizedQuery, ValidationError> {
        let recipient_name = self.recipient_name.trim().to_string();
        if recipient_name.is_empty() {
            return Err(ValidationError::MissingRecipientName);
        }

        for bound in [self.budget_min, self.budget_max].into_iter().flatten() {
            if bound < 0.0 {
                return Err(ValidationError::NegativeBudget { found: bound });
            }
        }

        if let (Some(min), Some(max)) = (self.budget_min, self.budget_max) {
            if min > max {
                return Err(ValidationError::InvertedBudget { min, max });
            }
        }

        let interests = self
            .interests
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Ok(NormalizedQuery {
            occasion: self.occasion,
            budget: BudgetBounds {
                min: self.budget_min,
                max: self.budget_max,
            },
            same_day_required: self.same_day_required,
            recipient_name,
            loves: normalize_tags(self.loves),
            hates: normalize_tags(self.hates),
            allergies: normalize_tags(self.allergies),
            interests,
        })
    }
}

fn normalize_tags(raw: Vec<String>) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::with_capacity(raw.len());
    for value in raw {
        if let Some(tag) = normalize_tag(&value) {
            if !tags.iter().any(|existing| existing.value == tag.value) {
                tags.push(tag);
            }
        }
    }
    tags
}

pub(crate) fn normalize_tag(raw: &str) -> Option<Tag> {
    let value = raw
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if value.is_empty() {
        return None;
    }

    let authoritative = TAG_VOCABULARY.binary_search(&value.as_str()).is_ok();
    Some(Tag {
        value,
        authoritative,
    })
}

/// Lowercased alphanumeric tokens of a text, used for exact-tag matching in
/// both the explicit matcher and the safety gate. Splitting on every
/// non-alphanumeric character means "nut-free" yields a "nut" token, which
/// the safety gate treats as a hit: ambiguity resolves to exclusion.
pub(crate) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_lowercase())
}

/// Fold a trailing plural so "nuts" matches "nut". Deliberately minimal;
/// anything fancier stops being an exact, auditable rule.
pub(crate) fn stem(token: &str) -> &str {
    if token.len() > 3 {
        token.strip_suffix('s').unwrap_or(token)
    } else {
        token
    }
}
