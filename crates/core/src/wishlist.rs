//! Wishlist aggregate: a set of products keyed by product id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::product::ProductRef;
use crate::types::{LineId, ProductId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WishlistError {
    #[error("product {0} is already in the wishlist")]
    AlreadyPresent(ProductId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    pub id: LineId,
    pub product: ProductRef,
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Wishlist {
    #[serde(default)]
    pub items: Vec<WishlistItem>,
    #[serde(default)]
    pub version: u64,
}

impl Wishlist {
    #[must_use]
    pub fn contains(&self, product: ProductId) -> bool {
        self.items.iter().any(|item| item.product.id() == product)
    }

    /// Insert a product. Unlike carts, a duplicate is rejected rather than merged.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError::AlreadyPresent`] if the product is a member.
    pub fn add(&mut self, product: ProductRef, id: LineId, now: DateTime<Utc>) -> Result<(), WishlistError> {
        let product_id = product.id();
        if self.contains(product_id) {
            return Err(WishlistError::AlreadyPresent(product_id));
        }
        self.items.push(WishlistItem {
            id,
            product,
            added_at: now,
        });
        Ok(())
    }

    /// Remove a product. Removing a non-member leaves the set unchanged.
    /// Returns whether anything was removed.
    pub fn remove(&mut self, product: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.product.id() != product);
        self.items.len() != before
    }

    /// Number of entries whose product detail is known.
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.items.iter().filter(|item| item.product.is_resolved()).count()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &WishlistItem> {
        self.items.iter().filter(|item| !item.product.is_resolved())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::fixtures::product;

    #[test]
    fn test_duplicate_is_rejected() {
        let mut list = Wishlist::default();
        let now = Utc::now();
        assert!(list.add(product(1, 10).into(), LineId::generate(), now).is_ok());
        assert_eq!(
            list.add(ProductId::new(1).into(), LineId::generate(), now),
            Err(WishlistError::AlreadyPresent(ProductId::new(1)))
        );
        assert_eq!(list.items.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut list = Wishlist::default();
        let now = Utc::now();
        let _ = list.add(product(1, 10).into(), LineId::generate(), now);
        let _ = list.add(product(2, 10).into(), LineId::generate(), now);

        assert!(list.remove(ProductId::new(1)));
        let once = list.clone();
        assert!(!list.remove(ProductId::new(1)));
        assert_eq!(list, once);
    }

    #[test]
    fn test_count_excludes_unresolved() {
        let mut list = Wishlist::default();
        let now = Utc::now();
        let _ = list.add(product(1, 10).into(), LineId::generate(), now);
        let _ = list.add(ProductId::new(2).into(), LineId::generate(), now);
        assert_eq!(list.resolved_count(), 1);
        assert_eq!(list.unresolved().count(), 1);
    }
}
