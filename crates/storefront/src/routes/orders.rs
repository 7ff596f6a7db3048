//! Checkout and order history.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use fashion_store_core::wire::PlaceOrderRequest;
use fashion_store_core::{Order, OrderId};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::services::orders::OrderService;
use crate::state::AppState;

/// Place an order from the caller's cart. Amounts are computed here, never
/// taken from the request.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = OrderService::new(state.pool()).place(&user, request).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn index(State(state): State<AppState>, RequireUser(user): RequireUser) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderService::new(state.pool()).list(&user).await?))
}

/// Someone else's order reads as missing unless the caller is an admin.
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    OrderService::new(state.pool())
        .get(&user, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("order {id} not found")))
}
