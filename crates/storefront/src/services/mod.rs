//! Business logic between the routes and the repositories.
//!
//! - `admin` - dashboard counters for the back office
//! - `auth` - registration, login and bearer token issuance
//! - `cart` / `wishlist` - versioned per-user documents
//! - `orders` - checkout priced from product rows

pub mod admin;
pub mod auth;
pub mod cart;
mod catalog;
mod error;
pub mod orders;
pub mod wishlist;

pub use error::CartServiceError;

use fashion_store_core::{Cart, ProductRef, UserId, Wishlist};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::db::documents::{DocumentKind, DocumentRepository, Versioned};

/// Attempts at a compare-and-swap write before giving up with `Contention`.
pub const MAX_WRITE_ATTEMPTS: u32 = 3;

/// A list stored as a versioned per-user document.
pub(crate) trait ListDocument: Serialize + DeserializeOwned + Default + Send + Sync {
    const KIND: DocumentKind;

    fn set_version(&mut self, version: i64);

    /// Reduce product references to bare ids; detail is never persisted.
    fn strip(&mut self);
}

impl ListDocument for Cart {
    const KIND: DocumentKind = DocumentKind::Cart;

    fn set_version(&mut self, version: i64) {
        self.version = u64::try_from(version).unwrap_or_default();
    }

    fn strip(&mut self) {
        for item in &mut self.items {
            item.product = ProductRef::from(item.product.id());
        }
    }
}

impl ListDocument for Wishlist {
    const KIND: DocumentKind = DocumentKind::Wishlist;

    fn set_version(&mut self, version: i64) {
        self.version = u64::try_from(version).unwrap_or_default();
    }

    fn strip(&mut self) {
        for item in &mut self.items {
            item.product = ProductRef::from(item.product.id());
        }
    }
}

/// Read a user's document, creating it empty on first access.
pub(crate) async fn load_document<T: ListDocument>(pool: &PgPool, user: UserId) -> Result<T, CartServiceError> {
    let Versioned { mut value, version } = DocumentRepository::new(pool).load::<T>(user, T::KIND).await?;
    value.set_version(version);
    Ok(value)
}

/// Apply `mutate` to the latest version of a document and write it back,
/// retrying on a lost compare-and-swap.
///
/// `mutate` may run more than once; an error from it aborts without writing.
pub(crate) async fn update_document<T, R, F>(
    pool: &PgPool,
    user: UserId,
    mut mutate: F,
) -> Result<(T, R), CartServiceError>
where
    T: ListDocument,
    R: Send,
    F: FnMut(&mut T) -> Result<R, CartServiceError> + Send,
{
    let documents = DocumentRepository::new(pool);
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let Versioned { mut value, version } = documents.load::<T>(user, T::KIND).await?;
        let outcome = mutate(&mut value)?;
        value.strip();
        if let Some(written) = documents.store(user, T::KIND, &value, version).await? {
            value.set_version(written);
            return Ok((value, outcome));
        }
        debug!(attempt, kind = T::KIND.as_str(), %user, "Document version moved, retrying");
    }

    warn!(kind = T::KIND.as_str(), %user, "Gave up after repeated version conflicts");
    Err(CartServiceError::Contention)
}
