//! Cart route handlers. Every response is the whole hydrated cart.

use axum::{
    Json,
    extract::{Path, State},
};

use fashion_store_core::wire::{AddToCartRequest, UpdateQuantityRequest};
use fashion_store_core::{Cart, LineId};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::cart::CartService;
use crate::state::AppState;

pub async fn show(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<Cart>> {
    Ok(Json(CartService::new(state.pool(), user.id).get().await?))
}

pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<Cart>> {
    Ok(Json(CartService::new(state.pool(), user.id).add(request).await?))
}

pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(item_id): Path<LineId>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<Cart>> {
    let cart = CartService::new(state.pool(), user.id)
        .update_quantity(item_id, request.quantity)
        .await?;
    Ok(Json(cart))
}

pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(item_id): Path<LineId>,
) -> Result<Json<Cart>> {
    Ok(Json(CartService::new(state.pool(), user.id).remove(item_id).await?))
}

pub async fn clear(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<Cart>> {
    Ok(Json(CartService::new(state.pool(), user.id).clear().await?))
}
