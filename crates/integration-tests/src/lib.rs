//! Integration tests for FashionStore.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process scenarios (no services needed)
//! cargo test -p fashion-store-integration-tests
//!
//! # Against a running storefront with a migrated database
//! STOREFRONT_API_URL=http://localhost:3000/api/ \
//!     cargo test -p fashion-store-integration-tests -- --ignored
//! ```
//!
//! # Harness
//!
//! The in-process scenarios drive the real client engines over
//! [`MemoryStore`] guest storage, a [`Catalog`] resolver and a
//! [`FakeServer`] that keeps account carts, wishlists and orders with the
//! same rules the storefront applies.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod fixtures;
pub mod server;
pub mod storage;

use std::sync::Arc;

use fashion_store_client::{FashionStore, LoginMergePolicy, MemoryStore};

pub use catalog::Catalog;
pub use server::FakeServer;
pub use storage::FlakyStore;

/// Password every seeded account uses.
pub const PASSWORD: &str = "correct horse";

/// One client wired to in-memory collaborators.
pub struct Harness {
    pub kv: Arc<MemoryStore>,
    pub catalog: Arc<Catalog>,
    pub server: FakeServer,
    pub store: FashionStore,
}

impl Harness {
    /// Products 1, 2 and 3 priced 100, 250 and 600.
    #[must_use]
    pub fn new(policy: LoginMergePolicy) -> Self {
        let catalog = Catalog::with([
            fixtures::product(1, 100),
            fixtures::product(2, 250),
            fixtures::product(3, 600),
        ]);
        Self::with_catalog(Arc::new(catalog), policy)
    }

    #[must_use]
    pub fn with_catalog(catalog: Arc<Catalog>, policy: LoginMergePolicy) -> Self {
        let kv = Arc::new(MemoryStore::new());
        let server = FakeServer::new(catalog.clone());
        let store = FashionStore::assemble(
            kv.clone(),
            catalog.clone(),
            Arc::new(server.clone()),
            policy,
        );
        Self {
            kv,
            catalog,
            server,
            store,
        }
    }

    /// A fresh client over the same local storage and server, as after an
    /// application restart.
    #[must_use]
    pub fn reopen(&self) -> FashionStore {
        FashionStore::assemble(
            self.kv.clone(),
            self.catalog.clone(),
            Arc::new(self.server.clone()),
            self.store.session.merge_policy(),
        )
    }

    /// Seed an account and sign this client in to it.
    ///
    /// # Panics
    ///
    /// Panics if the login fails.
    pub async fn sign_in(&self, email: &str) -> fashion_store_core::UserProfile {
        self.server.seed_account("Shopper", email, PASSWORD).await;
        self.store
            .session
            .login(email, PASSWORD)
            .await
            .expect("seeded login should succeed")
    }
}
