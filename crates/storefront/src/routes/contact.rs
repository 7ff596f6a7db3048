//! Contact form intake and its back-office triage.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{info, instrument};

use fashion_store_core::wire::{ContactReceipt, StatusChangeRequest};
use fashion_store_core::{ContactMessage, ContactMessageId, ContactRequest, ContactStatus};

use crate::db::RepositoryError;
use crate::db::contact::ContactRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub const THANK_YOU: &str = "Thank you for contacting us! We will contact you soon.";

/// Public; no account needed.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    Json(request): Json<ContactRequest>,
) -> Result<(StatusCode, Json<ContactReceipt>)> {
    let message = request
        .validated()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let stored = ContactRepository::new(state.pool()).create(&message).await?;
    info!(contact_id = %stored.id, "Contact message received");
    Ok((
        StatusCode::CREATED,
        Json(ContactReceipt {
            id: stored.id,
            message: THANK_YOU.to_string(),
        }),
    ))
}

pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<ContactMessage>>> {
    Ok(Json(ContactRepository::new(state.pool()).list_recent().await?))
}

#[instrument(skip(state, _admin, request))]
pub async fn set_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ContactMessageId>,
    Json(request): Json<StatusChangeRequest>,
) -> Result<Json<ContactMessage>> {
    let status = request
        .status
        .trim()
        .parse::<ContactStatus>()
        .map_err(|_| AppError::BadRequest("Invalid status".to_string()))?;

    ContactRepository::new(state.pool())
        .set_status(id, status)
        .await
        .map(Json)
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Message not found".to_string()),
            other => other.into(),
        })
}
