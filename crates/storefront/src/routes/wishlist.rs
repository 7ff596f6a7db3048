//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
};

use fashion_store_core::wire::AddToWishlistRequest;
use fashion_store_core::{ProductId, Wishlist};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::wishlist::WishlistService;
use crate::state::AppState;

pub async fn show(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<Wishlist>> {
    Ok(Json(WishlistService::new(state.pool(), user.id).get().await?))
}

pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<AddToWishlistRequest>,
) -> Result<Json<Wishlist>> {
    let wishlist = WishlistService::new(state.pool(), user.id)
        .add(request.product_id)
        .await?;
    Ok(Json(wishlist))
}

pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Wishlist>> {
    let wishlist = WishlistService::new(state.pool(), user.id)
        .remove(product_id)
        .await?;
    Ok(Json(wishlist))
}
