//! Product search.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use fashion_store_core::Product;

use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Most results a search returns.
const SEARCH_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Case-insensitive substring match over name, brand, category and
/// description of active products.
#[instrument(skip(state))]
pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Result<Json<Vec<Product>>> {
    let needle = query.q.trim();
    if needle.is_empty() {
        return Err(AppError::BadRequest("search query is required".to_string()));
    }

    let products = ProductRepository::new(state.pool())
        .search(needle, SEARCH_LIMIT)
        .await?;
    Ok(Json(products))
}
