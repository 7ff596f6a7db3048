//! Bearer token extractors.
//!
//! Private routes take [`RequireUser`]; a request without a valid token is
//! rejected with `401` before the handler runs. Back-office routes take
//! [`RequireAdmin`], which additionally rejects non-admins with `403`.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{Span, warn};

use fashion_store_core::{UserProfile, UserRole};

use crate::error::{AppError, set_sentry_user};
use crate::services::auth::AuthService;
use crate::state::AppState;

/// The raw bearer token from the `Authorization` header.
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_bearer)
            .map(|token| Self(token.to_string()))
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))
    }
}

/// Extractor that requires a signed-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub UserProfile);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user = AuthService::new(state.pool(), state.config().token_ttl())
            .authenticate(&token)
            .await?;

        Span::current().record("user_id", user.id.as_i32());
        set_sentry_user(&user.id, Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub UserProfile);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;
        admin_only(user).map(Self)
    }
}

/// Pass `user` through if they hold the admin role.
///
/// # Errors
///
/// Returns `AppError::Forbidden` for any other role.
pub fn admin_only(user: UserProfile) -> Result<UserProfile, AppError> {
    if user.role == UserRole::Admin {
        return Ok(user);
    }
    warn!(user_id = %user.id, "Non-admin tried a back-office route");
    Err(AppError::Forbidden("Not authorized as an admin".to_string()))
}

/// The token in an `Authorization: Bearer <token>` value. The scheme is
/// case-insensitive.
fn parse_bearer(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use fashion_store_core::{Email, UserId};

    fn user(role: UserRole) -> UserProfile {
        UserProfile {
            id: UserId::new(7),
            name: "Asha".to_string(),
            email: Email::parse("asha@example.com").unwrap(),
            phone: None,
            role,
        }
    }

    #[test]
    fn test_admin_passes() {
        assert_eq!(admin_only(user(UserRole::Admin)).unwrap().id, UserId::new(7));
    }

    #[test]
    fn test_customer_is_forbidden() {
        let err = admin_only(user(UserRole::Customer)).unwrap_err();
        assert!(matches!(&err, AppError::Forbidden(msg) if msg == "Not authorized as an admin"));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer("bearer  abc123 "), Some("abc123"));
        assert_eq!(parse_bearer("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("abc123"), None);
    }
}
