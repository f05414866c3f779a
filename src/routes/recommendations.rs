use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::RequestId,
    models::{Product, RecommendationRequest},
    routes::AppState,
};

/// Handler for recommendations endpoint
///
/// Only catalog loading can fail here; model trouble degrades inside the
/// recommender and still yields a product list.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<Product>>> {
    tracing::info!(
        request_id = %request_id,
        cart_items = request.cart_items.len(),
        "Processing recommendation request"
    );

    let catalog = state.catalog.load_catalog().await.map_err(|e| {
        tracing::error!(request_id = %request_id, error = %e, "Failed to load catalog");
        e
    })?;

    let recommendations = state
        .recommender
        .recommend(&request.cart_items, &catalog)
        .await;

    tracing::info!(
        request_id = %request_id,
        recommended = recommendations.len(),
        "Recommendations generated"
    );

    Ok(Json(recommendations))
}
