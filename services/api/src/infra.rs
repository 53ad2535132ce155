use gift_ai::clients::{CandidateSource, Embedder, ExplanationWriter, ExternalServiceError};
use gift_ai::engine::{Occasion, Product};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_occasion(raw: &str) -> Result<Occasion, String> {
    match raw.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
        "birthday" => Ok(Occasion::Birthday),
        "anniversary" => Ok(Occasion::Anniversary),
        "congratulations" => Ok(Occasion::Congratulations),
        "get well" => Ok(Occasion::GetWell),
        "thank you" => Ok(Occasion::ThankYou),
        "sympathy" => Ok(Occasion::Sympathy),
        "holiday" => Ok(Occasion::Holiday),
        "just because" => Ok(Occasion::JustBecause),
        other => Err(format!("unknown occasion '{other}'")),
    }
}

/// Offline candidate source backing the CLI demo. Mirrors the shape of a
/// real catalog response, ranks included.
#[derive(Default, Clone)]
pub(crate) struct FixtureCatalog;

fn fixture_product(
    id: &str,
    name: &str,
    description: &str,
    price: f64,
    attributes: &[&str],
    rank: u32,
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        price,
        image_url: None,
        attributes: attributes.iter().map(|a| a.to_string()).collect(),
        popularity_rank: Some(rank),
    }
}

pub(crate) fn fixture_products() -> Vec<Product> {
    vec![
        fixture_product(
            "fx-1",
            "Chocolate Dipped Strawberries",
            "A dozen fresh strawberries dipped in semisweet chocolate.",
            44.99,
            &["strawberries", "chocolate"],
            1,
        ),
        fixture_product(
            "fx-2",
            "Rainbow Fruit Basket",
            "Seasonal fruit arranged for sharing.",
            29.99,
            &["fruit", "pineapple", "berries"],
            2,
        ),
        fixture_product(
            "fx-3",
            "Peanut Butter Crunch Box",
            "Crisp peanut butter bites drizzled with chocolate.",
            34.99,
            &["peanuts", "chocolate"],
            3,
        ),
        fixture_product(
            "fx-4",
            "Cookies and Cream Tower",
            "Stacked cookies with a creamy chocolate filling.",
            54.99,
            &["cookies", "chocolate", "dairy"],
            4,
        ),
        fixture_product(
            "fx-5",
            "Tropical Pineapple Crate",
            "Pineapple daisies and tropical fruit for a bright surprise.",
            39.99,
            &["pineapple", "tropical", "fruit"],
            5,
        ),
        fixture_product(
            "fx-6",
            "Caramel Apple Gift Set",
            "Orchard apples coated in soft caramel.",
            24.99,
            &["apples", "caramel"],
            6,
        ),
    ]
}

#[async_trait::async_trait]
impl CandidateSource for FixtureCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<Product>, ExternalServiceError> {
        Ok(fixture_products())
    }
}

const HASH_DIMENSIONS: usize = 64;

/// Deterministic bag-of-words embedder for offline runs. Not semantically
/// meaningful, but stable, which is all the demo needs.
#[derive(Default, Clone)]
pub(crate) struct HashingEmbedder;

fn hash_text(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; HASH_DIMENSIONS];
    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
    {
        let mut hasher = DefaultHasher::new();
        token.to_lowercase().hash(&mut hasher);
        let slot = (hasher.finish() % HASH_DIMENSIONS as u64) as usize;
        vector[slot] += 1.0;
    }
    vector
}

#[async_trait::async_trait]
impl Embedder for HashingEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ExternalServiceError> {
        Ok(texts.iter().map(|text| hash_text(text)).collect())
    }
}

/// Writer stand-in for offline runs; failing here steers every explanation
/// onto the deterministic template path.
#[derive(Default, Clone)]
pub(crate) struct OfflineWriter;

#[async_trait::async_trait]
impl ExplanationWriter for OfflineWriter {
    async fn complete(&self, _prompt: &str) -> Result<String, ExternalServiceError> {
        Err(ExternalServiceError::Request {
            service: "chat",
            reason: "offline demo has no chat collaborator".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn occasion_parsing_accepts_label_variants() {
        assert_eq!(parse_occasion("Birthday"), Ok(Occasion::Birthday));
        assert_eq!(parse_occasion("get-well"), Ok(Occasion::GetWell));
        assert_eq!(parse_occasion("thank_you"), Ok(Occasion::ThankYou));
        assert!(parse_occasion("gala").is_err());
    }

    #[test]
    fn hashed_embeddings_are_stable_and_sized() {
        let a = hash_text("chocolate covered strawberries");
        let b = hash_text("chocolate covered strawberries");
        assert_eq!(a, b);
        assert_eq!(a.len(), HASH_DIMENSIONS);
        assert!(a.iter().sum::<f32>() > 0.0);
    }
}
