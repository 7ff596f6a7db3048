//! FashionStore Client - the cart and wishlist engine behind the storefront UI.
//!
//! A visitor's cart and wishlist live in one of two places: local storage
//! while they browse as a guest, or the storefront API once they sign in.
//! This crate hides that split behind two engines that always address the
//! right place for the current identity.
//!
//! # Architecture
//!
//! - [`store`] - `CartStore` / `WishlistStore` / `OrderStore` strategies:
//!   [`LocalStore`] for guests and [`RemoteStore`] for signed-in users
//! - [`resolver`] - product hydration for guest state (cached, 5 minute TTL)
//! - [`engine`] - [`CartEngine`] and [`WishlistEngine`] with last-known-good
//!   snapshots and per-engine mutation sequencing
//! - [`session`] - login, logout, restore and the [`LoginMergePolicy`]
//! - [`checkout`] - order placement
//!
//! # Example
//!
//! ```rust,ignore
//! let config = ClientConfig::from_env()?;
//! let store = FashionStore::open(&config).await?;
//! store.session.restore().await?;
//!
//! let cart = store
//!     .cart
//!     .add_item(ProductId::new(12), 2, Size::M, Color::new("Black", "#000000"), None)
//!     .await?;
//! println!("{} items, total {}", cart.item_count(), cart.totals().total);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod checkout;
pub mod config;
pub mod engine;
pub mod error;
pub mod resolver;
pub mod session;
pub mod storage;
pub mod store;

use std::sync::Arc;

pub use api::ApiClient;
pub use checkout::Checkout;
pub use config::{ClientConfig, ConfigError};
pub use engine::{CartEngine, WishlistEngine};
pub use error::StoreError;
pub use resolver::{HttpResolver, ProductResolver};
pub use session::{AccountService, LoginMergePolicy, Session, SessionContext};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::{CartLineRequest, CartStore, LocalStore, OrderStore, RemoteStore, Stores, WishlistStore};

/// Everything a storefront UI needs, wired together.
pub struct FashionStore {
    pub session: Session,
    pub cart: Arc<CartEngine>,
    pub wishlist: WishlistEngine,
    pub checkout: Checkout,
}

impl FashionStore {
    /// Wire the engines over arbitrary collaborators.
    #[must_use]
    pub fn assemble(
        kv: Arc<dyn KeyValueStore>,
        resolver: Arc<dyn ProductResolver>,
        accounts: Arc<dyn AccountService>,
        policy: LoginMergePolicy,
    ) -> Self {
        let local = Arc::new(LocalStore::new(kv.clone(), resolver));
        let session = Session::new(kv, accounts, Stores::guest(local), policy);
        let cart = Arc::new(CartEngine::new(session.clone()));
        Self {
            wishlist: WishlistEngine::new(session.clone()),
            checkout: Checkout::new(session.clone(), cart.clone()),
            cart,
            session,
        }
    }

    /// File-backed guest state and the HTTP API, as configured.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the data directory cannot be created.
    pub async fn open(config: &ClientConfig) -> Result<Self, StorageError> {
        let kv = Arc::new(FileStore::open(&config.data_dir).await?);
        let api = ApiClient::new(config.api_url.clone());
        let resolver = Arc::new(HttpResolver::new(api.clone()));
        Ok(Self::assemble(kv, resolver, Arc::new(api), config.merge_policy))
    }
}
