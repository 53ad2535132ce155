//! Path A: literal overlap between loved tags and product attributes or
//! name/description text. Exact token matching only; no substring
//! heuristics.

use std::collections::BTreeSet;

use super::config::EngineConfig;
use super::domain::Product;
use super::query::{stem, tokenize, Tag};

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ExplicitEvidence {
    pub score: f64,
    pub matched: Vec<String>,
}

/// Score one product against the loved tags. Attribute hits carry full
/// weight; text-only hits carry less; tags outside the closed vocabulary
/// are discounted further.
pub(crate) fn score_product(
    product: &Product,
    loves: &[Tag],
    config: &EngineConfig,
) -> ExplicitEvidence {
    if loves.is_empty() {
        return ExplicitEvidence::default();
    }

    let attribute_stems = attribute_stems(product);
    let text_stems = text_stems(product);

    let mut evidence = ExplicitEvidence::default();
    for tag in loves {
        let weight = if tag_hits(tag, &attribute_stems) {
            config.attribute_weight
        } else if tag_hits(tag, &text_stems) {
            config.text_weight
        } else {
            continue;
        };

        let factor = if tag.authoritative {
            1.0
        } else {
            config.unverified_tag_factor
        };
        evidence.score += weight * factor;
        evidence.matched.push(tag.value.clone());
    }

    evidence
}

/// Tags can be multi-word ("dark chocolate"); every word must appear in the
/// product token set for the tag to count, keeping the match exact rather
/// than fuzzy.
fn tag_hits(tag: &Tag, stems: &BTreeSet<String>) -> bool {
    let mut words = tokenize(&tag.value).peekable();
    if words.peek().is_none() {
        return false;
    }
    words.all(|word| stems.contains(stem(&word)))
}

pub(crate) fn attribute_stems(product: &Product) -> BTreeSet<String> {
    product
        .attributes
        .iter()
        .flat_map(|attribute| tokenize(attribute))
        .map(|token| stem(&token).to_string())
        .collect()
}

pub(crate) fn text_stems(product: &Product) -> BTreeSet<String> {
    tokenize(&product.name)
        .chain(tokenize(&product.description))
        .map(|token| stem(&token).to_string())
        .collect()
}
