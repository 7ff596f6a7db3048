//! Error taxonomy surfaced by every client operation.
//!
//! Transport and storage failures never escape as-is; they are folded into
//! one of six kinds that a UI can act on: show a toast, prompt for login,
//! or retry later.

use fashion_store_core::{AddressError, CartError, ReviewError, WishlistError};
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A product, line or order that was required to exist does not.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate wishlist membership, duplicate review, or a write that lost
    /// an optimistic-concurrency race.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invalid input: quantity, size, colour, address fields.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Missing, expired or revoked credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credentials without the role the operation needs. The session
    /// stays signed in.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Transient network or storage failure.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Map a non-success HTTP status and its error message to a kind.
    #[must_use]
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(message),
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::CONFLICT => Self::Conflict(message),
            _ => Self::Unavailable(message),
        }
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    #[must_use]
    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        err.status().map_or_else(
            || Self::Unavailable(err.to_string()),
            |status| Self::from_status(status, err.to_string()),
        )
    }
}

impl From<crate::storage::StorageError> for StoreError {
    fn from(err: crate::storage::StorageError) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl From<CartError> for StoreError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::LineNotFound(_) => Self::NotFound(err.to_string()),
            CartError::InvalidQuantity | CartError::MissingSize | CartError::MissingColor => {
                Self::Validation(err.to_string())
            }
        }
    }
}

impl From<WishlistError> for StoreError {
    fn from(err: WishlistError) -> Self {
        Self::Conflict(err.to_string())
    }
}

impl From<AddressError> for StoreError {
    fn from(err: AddressError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<ReviewError> for StoreError {
    fn from(err: ReviewError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fashion_store_core::LineId;

    #[test]
    fn test_status_mapping() {
        let kind = |status| StoreError::from_status(status, String::new());
        assert!(matches!(kind(StatusCode::BAD_REQUEST), StoreError::Validation(_)));
        assert!(matches!(kind(StatusCode::UNAUTHORIZED), StoreError::Unauthorized(_)));
        assert!(matches!(kind(StatusCode::FORBIDDEN), StoreError::Forbidden(_)));
        assert!(!kind(StatusCode::FORBIDDEN).is_unauthorized());
        assert!(matches!(kind(StatusCode::NOT_FOUND), StoreError::NotFound(_)));
        assert!(matches!(kind(StatusCode::CONFLICT), StoreError::Conflict(_)));
        assert!(matches!(kind(StatusCode::BAD_GATEWAY), StoreError::Unavailable(_)));
        assert!(matches!(kind(StatusCode::INTERNAL_SERVER_ERROR), StoreError::Unavailable(_)));
    }

    #[test]
    fn test_domain_errors() {
        assert!(matches!(
            StoreError::from(CartError::LineNotFound(LineId::generate())),
            StoreError::NotFound(_)
        ));
        assert!(matches!(
            StoreError::from(CartError::MissingColor),
            StoreError::Validation(_)
        ));
    }
}
