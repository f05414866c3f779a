use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{error::AppResult, models::Product, routes::AppState};

/// Handler for catalog listing endpoint
pub async fn list_products(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Product>>> {
    let catalog = state.catalog.load_catalog().await?;
    Ok(Json(catalog))
}
