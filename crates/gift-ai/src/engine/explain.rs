//! Explanation generation. Explanations are enrichment, not correctness:
//! any chat-collaborator failure falls back to a deterministic template.

use tracing::warn;

use super::config::EngineConfig;
use super::domain::Category;
use super::query::NormalizedQuery;
use super::scoring::ScoredPick;
use crate::clients::{with_retry, ExplanationWriter};

/// Produce the explanation for one filled slot.
pub(crate) async fn write_explanation<L: ExplanationWriter>(
    writer: &L,
    pick: &ScoredPick,
    category: Category,
    query: &NormalizedQuery,
    config: &EngineConfig,
) -> String {
    let prompt = build_prompt(pick, category, query);

    match with_retry("chat", config.call_timeout, config.retry_backoff, || {
        writer.complete(&prompt)
    })
    .await
    {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => template(pick, category, query),
        Err(err) => {
            warn!(category = category.label(), error = %err, "explanation fallback to template");
            template(pick, category, query)
        }
    }
}

fn build_prompt(pick: &ScoredPick, category: Category, query: &NormalizedQuery) -> String {
    let product = &pick.candidate.product;
    let recipient = &query.recipient_name;

    let category_context = match category {
        Category::BestMatch => format!(
            "This is the BEST MATCH because it aligns with {recipient}'s explicit preferences."
        ),
        Category::SafeBet => format!(
            "This is a SAFE BET, a popular and widely liked choice {recipient} will likely enjoy."
        ),
        Category::Unique => format!(
            "This is SOMETHING UNIQUE, a creative choice based on {recipient}'s lifestyle."
        ),
    };

    let matched = if pick.candidate.matched_loves.is_empty() {
        "none".to_string()
    } else {
        pick.candidate.matched_loves.join(", ")
    };
    let loves = join_tags(query.loves.iter().map(|tag| tag.value.as_str()));

    let description: String = product.description.chars().take(200).collect();

    format!(
        "You are explaining why a product was recommended as a gift.\n\
         \n\
         CATEGORY: {category_context}\n\
         \n\
         PRODUCT:\n\
         - Name: {name}\n\
         - Price: ${price:.2}\n\
         - Description: {description}\n\
         \n\
         RECIPIENT ({recipient}):\n\
         - Loves: {loves}\n\
         - Matched preferences: {matched}\n\
         \n\
         Write a natural, friendly 2-3 sentence explanation. Only mention\n\
         details that appear in the product description, reference their\n\
         matched preferences when relevant, and use {recipient}'s name.",
        name = product.name,
        price = product.price,
    )
}

/// Deterministic fallback when the chat collaborator is unavailable.
pub(crate) fn template(pick: &ScoredPick, category: Category, query: &NormalizedQuery) -> String {
    let product = &pick.candidate.product;
    let recipient = &query.recipient_name;

    match category {
        Category::BestMatch => {
            if pick.candidate.matched_loves.is_empty() {
                format!(
                    "The {} is a great match for {recipient}'s preferences!",
                    product.name
                )
            } else {
                format!(
                    "The {} is a great match for {recipient}, who loves {}.",
                    product.name,
                    pick.candidate.matched_loves.join(" and ")
                )
            }
        }
        Category::SafeBet => format!(
            "The {} is a reliable choice that's popular with many customers.",
            product.name
        ),
        Category::Unique => format!(
            "The {} is a unique option we think {recipient} will love!",
            product.name
        ),
    }
}

fn join_tags<'a>(tags: impl Iterator<Item = &'a str>) -> String {
    let joined: Vec<&str> = tags.collect();
    if joined.is_empty() {
        "not specified".to_string()
    } else {
        joined.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::domain::{Candidate, Product};
    use crate::engine::query::{GiftQuery, Occasion};

    fn query() -> NormalizedQuery {
        GiftQuery {
            occasion: Occasion::Birthday,
            budget_min: None,
            budget_max: Some(50.0),
            same_day_required: false,
            recipient_name: "Ana".to_string(),
            loves: vec!["chocolate".to_string()],
            hates: Vec::new(),
            allergies: Vec::new(),
            interests: None,
        }
        .normalize()
        .expect("valid query")
    }

    fn pick(matched: &[&str]) -> ScoredPick {
        ScoredPick {
            candidate: Candidate {
                product: Product {
                    id: "p1".to_string(),
                    name: "Chocolate Berry Box".to_string(),
                    description: "Strawberries dipped in chocolate.".to_string(),
                    price: 45.0,
                    image_url: None,
                    attributes: vec!["chocolate".to_string()],
                    popularity_rank: Some(1),
                },
                explicit_score: 1.0,
                matched_loves: matched.iter().map(|m| m.to_string()).collect(),
                semantic_score: None,
            },
            score: 0.7,
        }
    }

    #[test]
    fn prompt_names_product_recipient_and_matched_tags() {
        let prompt = build_prompt(&pick(&["chocolate"]), Category::BestMatch, &query());
        assert!(prompt.contains("Chocolate Berry Box"));
        assert!(prompt.contains("Ana"));
        assert!(prompt.contains("Matched preferences: chocolate"));
        assert!(prompt.contains("BEST MATCH"));
    }

    #[test]
    fn template_mentions_matched_loves_for_best_match() {
        let text = template(&pick(&["chocolate"]), Category::BestMatch, &query());
        assert!(text.contains("Ana"));
        assert!(text.contains("chocolate"));
    }

    #[test]
    fn template_is_category_specific() {
        let safe = template(&pick(&[]), Category::SafeBet, &query());
        let unique = template(&pick(&[]), Category::Unique, &query());
        assert!(safe.contains("reliable choice"));
        assert!(unique.contains("unique option"));
    }
}
