//! Account route handlers.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use fashion_store_core::{ProfileUpdate, UserProfile};
use fashion_store_core::wire::{AuthResponse, LoginRequest, RegisterRequest};

use crate::error::Result;
use crate::middleware::{BearerToken, RequireUser};
use crate::services::auth::AuthService;
use crate::state::AppState;

fn auth_service(state: &AppState) -> AuthService<'_> {
    AuthService::new(state.pool(), state.config().token_ttl())
}

#[instrument(skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = auth_service(&state).register(&request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let response = auth_service(&state).login(&request).await?;
    Ok(Json(response))
}

pub async fn profile(RequireUser(user): RequireUser) -> Json<UserProfile> {
    Json(user)
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserProfile>> {
    Ok(Json(auth_service(&state).update_profile(&user, update).await?))
}

#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, BearerToken(token): BearerToken) -> Result<StatusCode> {
    auth_service(&state).logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}
