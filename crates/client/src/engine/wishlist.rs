use fashion_store_core::{Product, ProductId, Wishlist};
use tracing::instrument;

use super::Tracked;
use crate::error::StoreError;
use crate::session::Session;

/// Wishlist operations for the current identity.
pub struct WishlistEngine {
    tracked: Tracked<Wishlist>,
}

impl WishlistEngine {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            tracked: Tracked::new(session),
        }
    }

    /// # Errors
    ///
    /// `Unauthorized` if the server rejects the session.
    #[instrument(skip(self))]
    pub async fn get_wishlist(&self) -> Result<Wishlist, StoreError> {
        self.tracked
            .read("wishlist", |stores| async move { stores.wishlist.load().await })
            .await
    }

    /// # Errors
    ///
    /// `Conflict` if the product is already a member, `NotFound` if it does
    /// not exist or is inactive.
    #[instrument(skip(self, hint))]
    pub async fn add_item(&self, product_id: ProductId, hint: Option<Product>) -> Result<Wishlist, StoreError> {
        self.tracked
            .write(|stores| async move { stores.wishlist.add(product_id, hint).await })
            .await
    }

    /// Removing a product that is not a member leaves the wishlist unchanged.
    ///
    /// # Errors
    ///
    /// Any store failure.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, product_id: ProductId) -> Result<Wishlist, StoreError> {
        self.tracked
            .write(|stores| async move { stores.wishlist.remove(product_id).await })
            .await
    }

    /// Membership in the last wishlist seen. No I/O.
    pub async fn is_member(&self, product_id: ProductId) -> bool {
        self.tracked.peek().await.contains(product_id)
    }

    /// Number of entries with resolved product detail.
    pub async fn count(&self) -> usize {
        self.tracked.peek().await.resolved_count()
    }
}
