//! Back-office dashboard, customers and order fulfilment.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::{info, instrument};

use fashion_store_core::wire::StatusChangeRequest;
use fashion_store_core::{AdminStats, CustomerSummary, Order, OrderId, OrderStatus};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::services::admin::AdminService;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn stats(State(state): State<AppState>, RequireAdmin(_): RequireAdmin) -> Result<Json<AdminStats>> {
    Ok(Json(AdminService::new(state.pool()).stats().await?))
}

pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<CustomerSummary>>> {
    Ok(Json(UserRepository::new(state.pool()).list_customers().await?))
}

pub async fn orders(State(state): State<AppState>, RequireAdmin(_): RequireAdmin) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list_all(None).await?))
}

/// Move an order along. Delivered and cancelled orders stay put (`409`).
#[instrument(skip(state, admin, request), fields(admin_id = %admin.id))]
pub async fn set_order_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<Order>> {
    let status = parse_order_status(&request.status)?;
    let order = OrderRepository::new(state.pool())
        .set_status(id, status)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Order not found".to_string()),
            other => other.into(),
        })?;

    info!(order_id = %id, status = status.as_str(), "Order status changed");
    Ok(Json(order))
}

fn parse_order_status(raw: &str) -> Result<OrderStatus> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid status".to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_status() {
        assert_eq!(parse_order_status(" shipped ").unwrap(), OrderStatus::Shipped);
        let err = parse_order_status("lost").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "Invalid status"));
    }
}
