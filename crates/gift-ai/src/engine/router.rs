use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::query::GiftQuery;
use super::{EngineError, RecommendationEngine};
use crate::clients::{CandidateSource, Embedder, ExplanationWriter};

/// Router builder exposing the recommendation endpoint.
pub fn recommendation_router<S, E, L>(engine: Arc<RecommendationEngine<S, E, L>>) -> Router
where
    S: CandidateSource + 'static,
    E: Embedder + 'static,
    L: ExplanationWriter + 'static,
{
    Router::new()
        .route(
            "/api/v1/recommendations",
            post(recommend_handler::<S, E, L>),
        )
        .with_state(engine)
}

pub(crate) async fn recommend_handler<S, E, L>(
    State(engine): State<Arc<RecommendationEngine<S, E, L>>>,
    axum::Json(query): axum::Json<GiftQuery>,
) -> Response
where
    S: CandidateSource + 'static,
    E: Embedder + 'static,
    L: ExplanationWriter + 'static,
{
    match engine.recommend(query).await {
        Ok(set) => (StatusCode::OK, axum::Json(set)).into_response(),
        Err(EngineError::Validation(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(EngineError::CandidateSource(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(error @ EngineError::DeadlineExceeded { .. }) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::GATEWAY_TIMEOUT, axum::Json(payload)).into_response()
        }
    }
}
