//! Public-API pipeline checks: a consumer wiring its own collaborators into
//! the engine and reading the wire-level response shape.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use gift_ai::clients::{
    CandidateSource, Embedder, ExplanationWriter, ExternalServiceError,
};
use gift_ai::engine::{
    EmptyReason, EngineConfig, GiftQuery, Product, RecommendationEngine, RecommendationSet,
};

struct FixedCatalog(Vec<Product>);

#[async_trait]
impl CandidateSource for FixedCatalog {
    async fn search(&self, _keyword: &str) -> Result<Vec<Product>, ExternalServiceError> {
        Ok(self.0.clone())
    }
}

struct NoEmbedder;

#[async_trait]
impl Embedder for NoEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ExternalServiceError> {
        Ok(texts.iter().map(|_| vec![0.0f32]).collect())
    }
}

struct EchoWriter;

#[async_trait]
impl ExplanationWriter for EchoWriter {
    async fn complete(&self, _prompt: &str) -> Result<String, ExternalServiceError> {
        Ok("Picked for the occasion.".to_string())
    }
}

fn catalog_product(id: &str, name: &str, price: f64, attributes: &[&str]) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} arrangement"),
        price,
        image_url: None,
        attributes: attributes.iter().map(|a| a.to_string()).collect(),
        popularity_rank: None,
    }
}

fn engine(products: Vec<Product>) -> RecommendationEngine<FixedCatalog, NoEmbedder, EchoWriter> {
    RecommendationEngine::new(
        Arc::new(FixedCatalog(products)),
        Arc::new(NoEmbedder),
        Arc::new(EchoWriter),
        EngineConfig::default()
            .with_collaborator_timing(Duration::from_millis(200), Duration::from_millis(1)),
    )
}

fn query_from_wire() -> GiftQuery {
    serde_json::from_value(json!({
        "occasion": "birthday",
        "budget_max": 50.0,
        "recipient_name": "Maya",
        "loves": ["chocolate"],
        "hates": ["nuts"],
        "allergies": ["peanuts"]
    }))
    .expect("request body deserializes")
}

#[tokio::test]
async fn request_body_drives_a_full_recommendation() {
    let engine = engine(vec![
        catalog_product("c1", "Chocolate Dipped Strawberries", 45.0, &["chocolate"]),
        catalog_product("c2", "Chocolate Celebration Tower", 60.0, &["chocolate"]),
        catalog_product("c3", "Peanut Crunch Box", 30.0, &["peanuts"]),
    ]);

    let set = engine.recommend(query_from_wire()).await.expect("pipeline runs");
    let best = set.best_match.as_ref().expect("slot filled");
    assert_eq!(best.product.id, "c1");
    assert_eq!(best.explanation, "Picked for the occasion.");
    assert!(set.empty_reason.is_none());
}

#[tokio::test]
async fn response_serializes_with_stable_field_names() {
    let engine = engine(vec![catalog_product(
        "c1",
        "Chocolate Dipped Strawberries",
        45.0,
        &["chocolate"],
    )]);

    let set = engine.recommend(query_from_wire()).await.expect("pipeline runs");
    let body = serde_json::to_value(&set).expect("response serializes");

    assert_eq!(body["best_match"]["category"], "best_match");
    assert_eq!(body["best_match"]["product"]["id"], "c1");
    assert!(body["safe_bet"].is_null());
    assert!(body["unique"].is_null());
    // empty_reason is omitted entirely when any slot is filled.
    assert!(body.get("empty_reason").is_none());
}

#[tokio::test]
async fn empty_reason_round_trips_on_the_wire() {
    let engine = engine(vec![catalog_product(
        "c1",
        "Chocolate Celebration Tower",
        120.0,
        &["chocolate"],
    )]);

    let set = engine.recommend(query_from_wire()).await.expect("pipeline runs");
    assert_eq!(set.empty_reason, Some(EmptyReason::BudgetExcludedAll));

    let body = serde_json::to_value(&set).expect("response serializes");
    assert_eq!(body["empty_reason"], "budget_excluded_all");

    let restored: RecommendationSet =
        serde_json::from_value(body).expect("response deserializes");
    assert_eq!(restored, set);
}

#[tokio::test]
async fn allergy_exclusion_holds_across_the_public_surface() {
    let engine = engine(vec![
        catalog_product("c1", "Nut-Free Chocolate Box", 40.0, &["chocolate"]),
        catalog_product("c2", "Mixed Nut Sampler", 35.0, &["nuts"]),
        catalog_product("c3", "Peanut Brittle Tin", 25.0, &["peanuts", "caramel"]),
    ]);

    let set = engine.recommend(query_from_wire()).await.expect("pipeline runs");
    // "Nut-Free" still tokenizes to a nut hit; ambiguity resolves to
    // exclusion, so nothing survives the gate.
    assert!(set.is_empty());
    assert_eq!(set.empty_reason, Some(EmptyReason::SafetyExcludedAll));
}
