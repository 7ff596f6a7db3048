//! Errors from the cart, wishlist and checkout services.

use fashion_store_core::{AddressError, CartError, LineId, ProductId, WishlistError};
use thiserror::Error;

use crate::db::RepositoryError;

#[derive(Debug, Error)]
pub enum CartServiceError {
    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Unknown or inactive product.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The request breaks a cart, wishlist or address rule.
    #[error("{0}")]
    Invalid(String),

    #[error("cart item {0} not found")]
    LineNotFound(LineId),

    #[error("product {0} is already in the wishlist")]
    AlreadyInWishlist(ProductId),

    #[error("cart is empty")]
    EmptyCart,

    /// Compare-and-swap kept losing to concurrent writers.
    #[error("the list was modified concurrently, please retry")]
    Contention,
}

impl From<CartError> for CartServiceError {
    fn from(e: CartError) -> Self {
        match e {
            CartError::LineNotFound(id) => Self::LineNotFound(id),
            other => Self::Invalid(other.to_string()),
        }
    }
}

impl From<WishlistError> for CartServiceError {
    fn from(e: WishlistError) -> Self {
        match e {
            WishlistError::AlreadyPresent(id) => Self::AlreadyInWishlist(id),
        }
    }
}

impl From<AddressError> for CartServiceError {
    fn from(e: AddressError) -> Self {
        Self::Invalid(e.to_string())
    }
}
