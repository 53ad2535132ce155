//! HTTP surface checks for the recommendation endpoint.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::util::ServiceExt;

use super::common::{
    birthday_query, engine, fast_config, product, CannedWriter, FailingCatalog, MappedEmbedder,
    StaticCatalog,
};
use crate::engine::recommendation_router;

fn post_recommendations(payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/recommendations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn valid_query_returns_recommendation_set() {
    let engine = std::sync::Arc::new(engine(
        StaticCatalog::new(vec![product(
            "choco-45",
            "Chocolate Dipped Strawberries",
            45.0,
            &["chocolate"],
        )]),
        MappedEmbedder::new(&[]),
        CannedWriter,
        fast_config(),
    ));
    let router = recommendation_router(engine);

    let payload = serde_json::to_value(birthday_query()).expect("query serializes");
    let response = router
        .oneshot(post_recommendations(payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let body: Value = serde_json::from_slice(&bytes).expect("json body");
    assert_eq!(body["best_match"]["product"]["id"], "choco-45");
    assert_eq!(body["best_match"]["category"], "best_match");
    assert!(body["safe_bet"].is_null());
}

#[tokio::test]
async fn invalid_query_returns_unprocessable_entity() {
    let engine = std::sync::Arc::new(engine(
        StaticCatalog::new(Vec::new()),
        MappedEmbedder::new(&[]),
        CannedWriter,
        fast_config(),
    ));
    let router = recommendation_router(engine);

    let payload = json!({
        "occasion": "birthday",
        "recipient_name": "   ",
    });
    let response = router
        .oneshot(post_recommendations(payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn catalog_outage_returns_bad_gateway() {
    let engine = std::sync::Arc::new(engine(
        FailingCatalog,
        MappedEmbedder::new(&[]),
        CannedWriter,
        fast_config(),
    ));
    let router = recommendation_router(engine);

    let payload = serde_json::to_value(birthday_query()).expect("query serializes");
    let response = router
        .oneshot(post_recommendations(payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
