//! An in-memory stand-in for the storefront API.
//!
//! Accounts, bearer tokens and the per-user cart, wishlist and order
//! history live in one mutex. Documents keep bare product ids and are
//! hydrated from the [`Catalog`] on every response, and orders are priced
//! from the catalog's current rows, as the storefront does.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use fashion_store_client::{
    AccountService, CartLineRequest, CartStore, OrderStore, StoreError, Stores, WishlistStore,
};
use fashion_store_core::wire::{AuthResponse, LoginRequest, PlaceOrderRequest, RegisterRequest};
use fashion_store_core::{
    Cart, Email, LineId, NewCartLine, Order, OrderId, OrderLine, OrderStatus, Product, ProductId,
    ProductRef, ProfileUpdate, UserId, UserProfile, UserRole, Wishlist, price_lines,
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use crate::catalog::Catalog;

const MIN_PASSWORD_LENGTH: usize = 8;

struct Account {
    profile: UserProfile,
    password: String,
}

#[derive(Default)]
struct ServerState {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    carts: HashMap<UserId, Cart>,
    wishlists: HashMap<UserId, Wishlist>,
    orders: Vec<Order>,
    issued: u64,
}

impl ServerState {
    fn user_for(&self, token: &str) -> Result<UserId, StoreError> {
        self.tokens
            .get(token)
            .copied()
            .ok_or_else(|| StoreError::Unauthorized("Not authorized, token failed".to_owned()))
    }

    fn issue(&mut self, profile: UserProfile) -> AuthResponse {
        self.issued += 1;
        let token = format!("token-{}", self.issued);
        self.tokens.insert(token.clone(), profile.id);
        AuthResponse { token, user: profile }
    }
}

struct ServerInner {
    catalog: Arc<Catalog>,
    state: Mutex<ServerState>,
    offline: AtomicBool,
    forbid_writes: AtomicBool,
}

impl ServerInner {
    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_owned()));
        }
        Ok(())
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.forbid_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Forbidden("Not authorized as an admin".to_owned()));
        }
        Ok(())
    }

    /// Replace each bare id with the current active catalog row. Ids with
    /// no active row stay unresolved.
    async fn hydrate<'a, I>(&self, refs: I)
    where
        I: IntoIterator<Item = &'a mut ProductRef>,
    {
        for slot in refs {
            if let Some(product) = self.catalog.get_active(slot.id()).await {
                *slot = ProductRef::Resolved(product);
            }
        }
    }

    async fn hydrated_cart(&self, mut cart: Cart) -> Cart {
        let refs: Vec<&mut ProductRef> = cart.items.iter_mut().map(|item| &mut item.product).collect();
        self.hydrate(refs).await;
        cart
    }

    async fn hydrated_wishlist(&self, mut wishlist: Wishlist) -> Wishlist {
        let refs: Vec<&mut ProductRef> = wishlist.items.iter_mut().map(|item| &mut item.product).collect();
        self.hydrate(refs).await;
        wishlist
    }

    async fn require_active(&self, id: ProductId) -> Result<Product, StoreError> {
        self.catalog
            .get_active(id)
            .await
            .ok_or_else(|| StoreError::NotFound(format!("product {id} not found")))
    }
}

/// Shared handle to the fake storefront. Cheap to clone.
#[derive(Clone)]
pub struct FakeServer {
    inner: Arc<ServerInner>,
}

impl FakeServer {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            inner: Arc::new(ServerInner {
                catalog,
                state: Mutex::new(ServerState::default()),
                offline: AtomicBool::new(false),
                forbid_writes: AtomicBool::new(false),
            }),
        }
    }

    /// Create an account without issuing a token. Seeding the same email
    /// twice returns the existing profile.
    ///
    /// # Panics
    ///
    /// Panics if `email` is not a valid address.
    #[allow(clippy::unwrap_used)]
    pub async fn seed_account(&self, name: &str, email: &str, password: &str) -> UserProfile {
        let email = Email::parse(email).unwrap();
        let mut state = self.inner.state.lock().await;
        if let Some(account) = state.accounts.iter().find(|a| a.profile.email == email) {
            return account.profile.clone();
        }
        create_account(&mut state, name, email, None, password, UserRole::Customer)
    }

    /// While set, cart writes are refused with `Forbidden` even for a valid
    /// token.
    pub fn set_forbid_writes(&self, forbid: bool) {
        self.inner.forbid_writes.store(forbid, Ordering::SeqCst);
    }

    /// The account as the server currently holds it.
    pub async fn profile_of(&self, user: UserId) -> Option<UserProfile> {
        self.inner
            .state
            .lock()
            .await
            .accounts
            .iter()
            .find(|a| a.profile.id == user)
            .map(|a| a.profile.clone())
    }

    /// While offline every call fails with `Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Invalidate every issued token, as if they had all expired.
    pub async fn expire_tokens(&self) {
        self.inner.state.lock().await.tokens.clear();
    }

    pub async fn live_tokens(&self) -> usize {
        self.inner.state.lock().await.tokens.len()
    }

    /// The stored account cart, hydrated.
    pub async fn cart_of(&self, user: UserId) -> Cart {
        let cart = self
            .inner
            .state
            .lock()
            .await
            .carts
            .get(&user)
            .cloned()
            .unwrap_or_default();
        self.inner.hydrated_cart(cart).await
    }

    pub async fn orders_of(&self, user: UserId) -> Vec<Order> {
        self.inner
            .state
            .lock()
            .await
            .orders
            .iter()
            .filter(|o| o.user_id == user)
            .cloned()
            .collect()
    }
}

fn create_account(
    state: &mut ServerState,
    name: &str,
    email: Email,
    phone: Option<String>,
    password: &str,
    role: UserRole,
) -> UserProfile {
    let id = UserId::new(i32::try_from(state.accounts.len()).unwrap_or(i32::MAX) + 1);
    let profile = UserProfile {
        id,
        name: name.to_owned(),
        email,
        phone,
        role,
    };
    state.accounts.push(Account {
        profile: profile.clone(),
        password: password.to_owned(),
    });
    profile
}

#[async_trait]
impl AccountService for FakeServer {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, StoreError> {
        self.inner.check_online()?;
        let invalid = || StoreError::Unauthorized("Invalid email or password".to_owned());
        let email = Email::parse(&request.email).map_err(|_| invalid())?;

        let mut state = self.inner.state.lock().await;
        let profile = state
            .accounts
            .iter()
            .find(|a| a.profile.email == email && a.password == request.password)
            .map(|a| a.profile.clone())
            .ok_or_else(invalid)?;
        Ok(state.issue(profile))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, StoreError> {
        self.inner.check_online()?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("name is required".to_owned()));
        }
        let email = Email::parse(&request.email).map_err(|e| StoreError::Validation(e.to_string()))?;
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StoreError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let mut state = self.inner.state.lock().await;
        if state.accounts.iter().any(|a| a.profile.email == email) {
            return Err(StoreError::Conflict("User already exists".to_owned()));
        }
        let phone = request
            .phone
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned);
        let profile = create_account(&mut state, name, email, phone, &request.password, UserRole::Customer);
        Ok(state.issue(profile))
    }

    async fn verify(&self, token: &SecretString) -> Result<UserProfile, StoreError> {
        self.inner.check_online()?;
        let state = self.inner.state.lock().await;
        let user = state.user_for(token.expose_secret())?;
        state
            .accounts
            .iter()
            .find(|a| a.profile.id == user)
            .map(|a| a.profile.clone())
            .ok_or_else(|| StoreError::NotFound("user not found".to_owned()))
    }

    async fn revoke(&self, token: &SecretString) -> Result<(), StoreError> {
        self.inner.check_online()?;
        self.inner
            .state
            .lock()
            .await
            .tokens
            .remove(token.expose_secret());
        Ok(())
    }

    async fn update_profile(&self, token: &SecretString, update: &ProfileUpdate) -> Result<UserProfile, StoreError> {
        self.inner.check_online()?;
        let update = update
            .clone()
            .validated()
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let mut state = self.inner.state.lock().await;
        let user = state.user_for(token.expose_secret())?;
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.profile.id == user)
            .ok_or_else(|| StoreError::NotFound("user not found".to_owned()))?;
        update.apply(&mut account.profile);
        Ok(account.profile.clone())
    }

    fn stores_for(&self, token: SecretString) -> Stores {
        let store = Arc::new(AccountStore {
            server: self.inner.clone(),
            token,
        });
        Stores {
            cart: store.clone(),
            wishlist: store.clone(),
            orders: Some(store),
        }
    }
}

/// The account stores one token addresses.
struct AccountStore {
    server: Arc<ServerInner>,
    token: SecretString,
}

impl AccountStore {
    /// Run `mutate` against the caller's cart and persist it with a bumped
    /// version if it succeeds.
    async fn with_cart<F>(&self, mutate: F) -> Result<Cart, StoreError>
    where
        F: FnOnce(&mut Cart) -> Result<(), StoreError> + Send,
    {
        self.server.check_online()?;
        let mut state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        self.server.check_writable()?;
        let mut cart = state.carts.get(&user).cloned().unwrap_or_default();
        mutate(&mut cart)?;
        cart.version += 1;
        state.carts.insert(user, cart.clone());
        drop(state);
        Ok(self.server.hydrated_cart(cart).await)
    }
}

#[async_trait]
impl CartStore for AccountStore {
    async fn load(&self) -> Result<Cart, StoreError> {
        self.server.check_online()?;
        let state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        let cart = state.carts.get(&user).cloned().unwrap_or_default();
        drop(state);
        Ok(self.server.hydrated_cart(cart).await)
    }

    async fn add(&self, request: CartLineRequest) -> Result<Cart, StoreError> {
        request.validate()?;
        self.server.check_online()?;
        let product = self.server.require_active(request.product_id).await?;
        if !product.offers_size(&request.size) {
            return Err(StoreError::Validation(format!(
                "size {} is not available for {}",
                request.size, product.name
            )));
        }
        if !product.offers_color(&request.color) {
            return Err(StoreError::Validation(format!(
                "color {} is not available for {}",
                request.color.name, product.name
            )));
        }

        let line = NewCartLine {
            product: request.product_id.into(),
            quantity: request.quantity,
            size: request.size,
            color: request.color,
        };
        self.with_cart(|cart| {
            cart.add_line(line, LineId::generate)?;
            Ok(())
        })
        .await
    }

    async fn update_quantity(&self, item: LineId, quantity: i64) -> Result<Cart, StoreError> {
        self.with_cart(|cart| {
            cart.update_quantity(item, quantity)?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, item: LineId) -> Result<Cart, StoreError> {
        self.with_cart(|cart| {
            if cart.remove_line(item) {
                Ok(())
            } else {
                Err(StoreError::NotFound(format!("cart item {item} not found")))
            }
        })
        .await
    }

    async fn clear(&self) -> Result<Cart, StoreError> {
        self.with_cart(|cart| {
            cart.clear();
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl WishlistStore for AccountStore {
    async fn load(&self) -> Result<Wishlist, StoreError> {
        self.server.check_online()?;
        let state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        let wishlist = state.wishlists.get(&user).cloned().unwrap_or_default();
        drop(state);
        Ok(self.server.hydrated_wishlist(wishlist).await)
    }

    async fn add(&self, product_id: ProductId, _hint: Option<Product>) -> Result<Wishlist, StoreError> {
        self.server.check_online()?;
        self.server.require_active(product_id).await?;

        let mut state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        let mut wishlist = state.wishlists.get(&user).cloned().unwrap_or_default();
        wishlist.add(product_id.into(), LineId::generate(), Utc::now())?;
        wishlist.version += 1;
        state.wishlists.insert(user, wishlist.clone());
        drop(state);
        Ok(self.server.hydrated_wishlist(wishlist).await)
    }

    async fn remove(&self, product_id: ProductId) -> Result<Wishlist, StoreError> {
        self.server.check_online()?;
        let mut state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        let mut wishlist = state.wishlists.get(&user).cloned().unwrap_or_default();
        if wishlist.remove(product_id) {
            wishlist.version += 1;
            state.wishlists.insert(user, wishlist.clone());
        }
        drop(state);
        Ok(self.server.hydrated_wishlist(wishlist).await)
    }
}

#[async_trait]
impl OrderStore for AccountStore {
    async fn place(&self, request: &PlaceOrderRequest) -> Result<Order, StoreError> {
        request.shipping_address.validate()?;
        self.server.check_online()?;

        let mut state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        let cart = state.carts.get(&user).cloned().unwrap_or_default();
        if cart.is_empty() {
            return Err(StoreError::Validation("cart is empty".to_owned()));
        }

        let mut lines = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = self.server.require_active(item.product.id()).await?;
            lines.push(OrderLine::priced(item, &product));
        }
        let totals = price_lines(&lines);

        let id = OrderId::new(i32::try_from(state.orders.len()).unwrap_or(i32::MAX) + 1);
        let order = Order {
            id,
            user_id: user,
            items: lines,
            shipping_address: request.shipping_address.clone(),
            payment_method: request.payment_method,
            payment_status: request.payment_method.initial_status(),
            status: OrderStatus::default(),
            items_price: totals.subtotal,
            shipping_price: totals.shipping,
            tax_price: totals.tax,
            total_price: totals.total,
            created_at: Utc::now(),
        };
        state.orders.push(order.clone());
        state.carts.insert(
            user,
            Cart {
                items: Vec::new(),
                version: cart.version + 1,
            },
        );
        Ok(order)
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        self.server.check_online()?;
        let state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        Ok(state
            .orders
            .iter()
            .rev()
            .filter(|o| o.user_id == user)
            .cloned()
            .collect())
    }

    async fn get(&self, id: OrderId) -> Result<Order, StoreError> {
        self.server.check_online()?;
        let state = self.server.state.lock().await;
        let user = state.user_for(self.token.expose_secret())?;
        state
            .orders
            .iter()
            .find(|o| o.id == id && o.user_id == user)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("order {id} not found")))
    }
}
