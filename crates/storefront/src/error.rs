//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Every error body is `{"message": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fashion_store_core::wire::ErrorBody;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::CartServiceError;
use crate::services::auth::AuthError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart, wishlist or checkout operation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartServiceError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but lacks the required role.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) | Self::Cart(CartServiceError::Repository(err)) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::WeakPassword(_)
                | AuthError::InvalidEmail(_)
                | AuthError::MissingName
                | AuthError::InvalidProfile(_) => StatusCode::BAD_REQUEST,
                AuthError::Repository(_) | AuthError::PasswordHash => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Cart(err) => match err {
                CartServiceError::ProductNotFound(_) | CartServiceError::LineNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CartServiceError::Invalid(_) | CartServiceError::EmptyCart => StatusCode::BAD_REQUEST,
                CartServiceError::AlreadyInWishlist(_) | CartServiceError::Contention => {
                    StatusCode::CONFLICT
                }
                CartServiceError::Repository(err) => repository_status(err),
            },
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client is told. Internal details never leave the server.
    fn public_message(&self) -> String {
        match self {
            Self::Database(err) | Self::Cart(CartServiceError::Repository(err)) => match err {
                RepositoryError::NotFound => "Not found".to_string(),
                RepositoryError::Conflict(msg) => msg.clone(),
                RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
                    INTERNAL_MESSAGE.to_string()
                }
            },
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => "Invalid email or password".to_string(),
                AuthError::InvalidToken => "Not authorized, token invalid or expired".to_string(),
                AuthError::UserAlreadyExists => "An account with this email already exists".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::InvalidEmail(_) => "Invalid email address".to_string(),
                AuthError::MissingName => "Name is required".to_string(),
                AuthError::InvalidProfile(err) => err.to_string(),
                AuthError::Repository(_) | AuthError::PasswordHash => INTERNAL_MESSAGE.to_string(),
            },
            Self::Cart(err) => err.to_string(),
            Self::NotFound(msg) | Self::Unauthorized(msg) | Self::Forbidden(msg) | Self::BadRequest(msg) => {
                msg.clone()
            }
            Self::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

const fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = ErrorBody {
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for the authenticated request.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use fashion_store_core::{LineId, ProductId};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_message(err: AppError) -> String {
        let body = to_bytes(err.into_response().into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice::<ErrorBody>(&body).unwrap().message
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(get_status(AppError::NotFound("test".to_string())), StatusCode::NOT_FOUND);
        assert_eq!(get_status(AppError::Unauthorized("test".to_string())), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AppError::Forbidden("test".to_string())), StatusCode::FORBIDDEN);
        assert_eq!(get_status(AppError::BadRequest("test".to_string())), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_error_status_codes() {
        assert_eq!(get_status(AuthError::InvalidToken.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(AuthError::UserAlreadyExists.into()), StatusCode::CONFLICT);
        assert_eq!(
            get_status(AuthError::InvalidProfile(fashion_store_core::ProfileError::BlankName).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AuthError::WeakPassword("too short".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(CartServiceError::LineNotFound(LineId::generate()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CartServiceError::AlreadyInWishlist(ProductId::new(1)).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(get_status(CartServiceError::EmptyCart.into()), StatusCode::BAD_REQUEST);
        assert_eq!(get_status(CartServiceError::Contention.into()), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_duplicate_review_is_conflict() {
        let err = AppError::from(RepositoryError::Conflict("product already reviewed".to_string()));
        assert_eq!(get_status(AppError::from(RepositoryError::Conflict(String::new()))), StatusCode::CONFLICT);
        assert_eq!(get_message(err).await, "product already reviewed");
    }

    #[tokio::test]
    async fn test_final_order_status_is_conflict() {
        let err = AppError::from(RepositoryError::Conflict(
            "order is already delivered and cannot become processing".to_string(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_forbidden_carries_its_message() {
        assert_eq!(
            get_message(AppError::Forbidden("Not authorized as an admin".to_string())).await,
            "Not authorized as an admin"
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::Database(RepositoryError::DataCorruption("users.email".to_string()));
        assert_eq!(get_message(err).await, "Internal server error");

        let err = AppError::Cart(CartServiceError::Repository(RepositoryError::DataCorruption(
            "cart document".to_string(),
        )));
        assert_eq!(get_message(err).await, "Internal server error");
    }

    #[tokio::test]
    async fn test_client_errors_carry_their_message() {
        assert_eq!(get_message(CartServiceError::EmptyCart.into()).await, "cart is empty");
        assert_eq!(
            get_message(AppError::BadRequest("search query is required".to_string())).await,
            "search query is required"
        );
    }
}
