//! Identity transitions: login, registration, logout and start-up restore.
//!
//! The session owns the answer to "which stores do the engines talk to".
//! Every transition swaps the whole [`Stores`] set and bumps an epoch
//! counter; engines tag their snapshots with the epoch they were taken in
//! and discard any snapshot from an earlier one.

use std::sync::Arc;

use async_trait::async_trait;
use fashion_store_core::wire::{AuthResponse, LoginRequest, RegisterRequest};
use fashion_store_core::{Identity, ProfileUpdate, UserProfile};
use secrecy::SecretString;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::api::ApiClient;
use crate::error::StoreError;
use crate::storage::{KeyValueStore, TOKEN_KEY, USER_KEY, load_json, save_json};
use crate::store::{CartLineRequest, RemoteStore, Stores};

/// What happens to guest state when a visitor signs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginMergePolicy {
    /// Guest state stays where it is, untouched, and reappears after logout.
    /// The account's own cart and wishlist are used while signed in.
    #[default]
    KeepSeparate,
    /// Each guest cart line is added to the account cart (quantities sum on
    /// the same variant) and each wishlist entry is added to the account
    /// wishlist. Entries that made it across are removed from guest state;
    /// entries that failed stay behind.
    MergeIntoAccount,
}

/// Authentication backend the session delegates to.
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, StoreError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, StoreError>;
    /// Look up the profile a token belongs to.
    async fn verify(&self, token: &SecretString) -> Result<UserProfile, StoreError>;
    async fn revoke(&self, token: &SecretString) -> Result<(), StoreError>;
    async fn update_profile(&self, token: &SecretString, update: &ProfileUpdate) -> Result<UserProfile, StoreError>;
    /// Stores addressing the account that `token` authenticates.
    fn stores_for(&self, token: SecretString) -> Stores;
}

#[async_trait]
impl AccountService for ApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, StoreError> {
        Self::login(self, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, StoreError> {
        Self::register(self, request).await
    }

    async fn verify(&self, token: &SecretString) -> Result<UserProfile, StoreError> {
        self.profile(token).await
    }

    async fn revoke(&self, token: &SecretString) -> Result<(), StoreError> {
        self.logout(token).await
    }

    async fn update_profile(&self, token: &SecretString, update: &ProfileUpdate) -> Result<UserProfile, StoreError> {
        Self::update_profile(self, token, update).await
    }

    fn stores_for(&self, token: SecretString) -> Stores {
        Stores::remote(Arc::new(RemoteStore::new(self.clone(), token)))
    }
}

/// Identity, epoch and store set, captured together at the start of an
/// engine operation.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub epoch: u64,
    pub authenticated: bool,
    pub stores: Stores,
}

struct SessionState {
    identity: Identity,
    epoch: u64,
    stores: Stores,
}

struct SessionInner {
    kv: Arc<dyn KeyValueStore>,
    accounts: Arc<dyn AccountService>,
    guest: Stores,
    policy: LoginMergePolicy,
    state: RwLock<SessionState>,
    /// Serializes transitions with each other.
    transition: Mutex<()>,
}

/// The current identity and the stores it addresses. Cheap to clone.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// A session starting as a guest. Call [`Session::restore`] to pick up a
    /// stored login.
    #[must_use]
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        accounts: Arc<dyn AccountService>,
        guest: Stores,
        policy: LoginMergePolicy,
    ) -> Self {
        let state = SessionState {
            identity: Identity::Guest,
            epoch: 0,
            stores: guest.clone(),
        };
        Self {
            inner: Arc::new(SessionInner {
                kv,
                accounts,
                guest,
                policy,
                state: RwLock::new(state),
                transition: Mutex::new(()),
            }),
        }
    }

    pub async fn identity(&self) -> Identity {
        self.inner.state.read().await.identity.clone()
    }

    pub async fn epoch(&self) -> u64 {
        self.inner.state.read().await.epoch
    }

    #[must_use]
    pub fn merge_policy(&self) -> LoginMergePolicy {
        self.inner.policy
    }

    pub async fn context(&self) -> SessionContext {
        let state = self.inner.state.read().await;
        SessionContext {
            epoch: state.epoch,
            authenticated: state.identity.is_authenticated(),
            stores: state.stores.clone(),
        }
    }

    /// Pick up a login persisted by an earlier run.
    ///
    /// The stored token is verified with the account service. A rejected
    /// token is forgotten; if the service cannot be reached the stored
    /// profile is trusted so the client keeps working offline.
    ///
    /// An unreachable service with no stored profile starts a guest session
    /// but keeps the token, so the next restore that reaches the service can
    /// still verify it.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if local storage fails, or the account
    /// service's error when it is neither a rejection nor an outage.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Identity, StoreError> {
        let _transition = self.inner.transition.lock().await;

        let Some(raw_token) = self.inner.kv.get(TOKEN_KEY).await? else {
            debug!("No stored session");
            self.enter(Identity::Guest, self.inner.guest.clone()).await;
            return Ok(Identity::Guest);
        };
        let token = SecretString::from(raw_token);
        let stored: Option<UserProfile> = load_json(self.inner.kv.as_ref(), USER_KEY).await?;

        match self.inner.accounts.verify(&token).await {
            Ok(profile) => {
                save_json(self.inner.kv.as_ref(), USER_KEY, &profile).await?;
                info!(user_id = %profile.id, "Restored session");
                Ok(self.authenticate(profile, token).await)
            }
            Err(StoreError::Unauthorized(_) | StoreError::NotFound(_)) => {
                info!("Stored session was rejected, continuing as guest");
                self.forget_credentials().await?;
                self.enter(Identity::Guest, self.inner.guest.clone()).await;
                Ok(Identity::Guest)
            }
            Err(StoreError::Unavailable(reason)) => {
                warn!(reason = %reason, "Account service unreachable, trusting stored session");
                Ok(match stored {
                    Some(profile) => self.authenticate(profile, token).await,
                    None => {
                        debug!("No stored profile, keeping the token for a later restore");
                        self.enter(Identity::Guest, self.inner.guest.clone()).await;
                        Identity::Guest
                    }
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Sign in with email and password.
    ///
    /// Credential failures are returned as-is and never affect the current
    /// identity.
    ///
    /// # Errors
    ///
    /// Returns the account service's error, or `Unavailable` if the
    /// credentials cannot be persisted.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, StoreError> {
        let _transition = self.inner.transition.lock().await;
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.inner.accounts.login(&request).await?;
        self.establish(response).await
    }

    /// Create an account and sign in to it.
    ///
    /// # Errors
    ///
    /// Returns the account service's error (`Conflict` for a taken email,
    /// `Validation` for a weak password), or `Unavailable` if the
    /// credentials cannot be persisted.
    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<UserProfile, StoreError> {
        let _transition = self.inner.transition.lock().await;
        let response = self.inner.accounts.register(&request).await?;
        self.establish(response).await
    }

    /// Sign out and go back to guest state.
    ///
    /// The token is revoked on the server when possible; failing to do so
    /// does not keep the client signed in.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the stored credentials cannot be removed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), StoreError> {
        let _transition = self.inner.transition.lock().await;

        if let Some(raw) = self.inner.kv.get(TOKEN_KEY).await?
            && let Err(e) = self.inner.accounts.revoke(&SecretString::from(raw)).await
        {
            warn!(error = %e, "Could not revoke token on logout");
        }

        self.forget_credentials().await?;
        self.enter(Identity::Guest, self.inner.guest.clone()).await;
        info!("Logged out");
        Ok(())
    }

    /// Change the signed-in user's name or phone and keep the stored
    /// profile in step.
    ///
    /// # Errors
    ///
    /// `Validation` for a blank or overlong name, `Unauthorized` for guests
    /// (a rejected token also signs the session out), or the account
    /// service's error.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, StoreError> {
        let update = update
            .validated()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let ctx = self.context().await;
        let token = match self.inner.kv.get(TOKEN_KEY).await? {
            Some(raw) if ctx.authenticated => SecretString::from(raw),
            _ => return Err(StoreError::Unauthorized("sign in to edit your profile".to_string())),
        };

        match self.inner.accounts.update_profile(&token, &update).await {
            Ok(profile) => {
                let _transition = self.inner.transition.lock().await;
                let mut state = self.inner.state.write().await;
                if state.epoch == ctx.epoch {
                    save_json(self.inner.kv.as_ref(), USER_KEY, &profile).await?;
                    state.identity = Identity::Authenticated(profile.clone());
                    info!(user_id = %profile.id, "Profile updated");
                }
                Ok(profile)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.expire(ctx.epoch).await;
                }
                Err(e)
            }
        }
    }

    /// Implicit logout after the server rejected the token mid-session.
    ///
    /// Only acts if no transition has happened since `epoch`, so a stale
    /// rejection cannot sign out a newer login.
    pub(crate) async fn expire(&self, epoch: u64) {
        let _transition = self.inner.transition.lock().await;
        {
            let state = self.inner.state.read().await;
            if state.epoch != epoch || !state.identity.is_authenticated() {
                return;
            }
        }

        warn!("Session token rejected, signing out");
        if let Err(e) = self.forget_credentials().await {
            warn!(error = %e, "Could not clear stored credentials");
        }
        self.enter(Identity::Guest, self.inner.guest.clone()).await;
    }

    /// Persist the credentials, then switch identity. The profile goes in
    /// before the token: restore keys off the token, so a token without its
    /// profile is never left behind.
    async fn establish(&self, response: AuthResponse) -> Result<UserProfile, StoreError> {
        save_json(self.inner.kv.as_ref(), USER_KEY, &response.user).await?;
        if let Err(e) = self.inner.kv.set(TOKEN_KEY, &response.token).await {
            if let Err(cleanup) = self.inner.kv.remove(USER_KEY).await {
                warn!(error = %cleanup, "Could not roll back stored profile");
            }
            return Err(e.into());
        }

        let profile = response.user;
        info!(user_id = %profile.id, "Signed in");
        self.authenticate(profile.clone(), SecretString::from(response.token))
            .await;

        if self.inner.policy == LoginMergePolicy::MergeIntoAccount {
            let stores = self.context().await.stores;
            self.merge_guest_state(&stores).await;
        }
        Ok(profile)
    }

    async fn authenticate(&self, profile: UserProfile, token: SecretString) -> Identity {
        let stores = self.inner.accounts.stores_for(token);
        let identity = Identity::Authenticated(profile);
        self.enter(identity.clone(), stores).await;
        identity
    }

    async fn enter(&self, identity: Identity, stores: Stores) {
        let mut state = self.inner.state.write().await;
        state.identity = identity;
        state.stores = stores;
        state.epoch += 1;
    }

    async fn forget_credentials(&self) -> Result<(), StoreError> {
        self.inner.kv.remove(TOKEN_KEY).await?;
        self.inner.kv.remove(USER_KEY).await?;
        Ok(())
    }

    /// Replay guest state into the account through the ordinary store
    /// operations, so the account's merge rules apply.
    async fn merge_guest_state(&self, account: &Stores) {
        let guest = &self.inner.guest;

        match guest.cart.load().await {
            Ok(cart) => {
                let mut moved = 0_usize;
                for item in cart.items {
                    let request = CartLineRequest {
                        product_id: item.product.id(),
                        quantity: item.quantity,
                        size: item.size,
                        color: item.color,
                        hint: None,
                    };
                    match account.cart.add(request).await {
                        Ok(_) => {
                            moved += 1;
                            if let Err(e) = guest.cart.remove(item.id).await {
                                warn!(item_id = %item.id, error = %e, "Merged line left in guest cart");
                            }
                        }
                        Err(e) => {
                            warn!(item_id = %item.id, error = %e, "Could not merge guest cart line");
                        }
                    }
                }
                info!(lines = moved, "Merged guest cart into account");
            }
            Err(e) => warn!(error = %e, "Could not read guest cart for merge"),
        }

        match guest.wishlist.load().await {
            Ok(wishlist) => {
                let mut moved = 0_usize;
                for item in wishlist.items {
                    let product_id = item.product.id();
                    match account.wishlist.add(product_id, None).await {
                        Ok(_) | Err(StoreError::Conflict(_)) => {
                            moved += 1;
                            if let Err(e) = guest.wishlist.remove(product_id).await {
                                warn!(product_id = %product_id, error = %e, "Merged entry left in guest wishlist");
                            }
                        }
                        Err(e) => {
                            warn!(product_id = %product_id, error = %e, "Could not merge guest wishlist entry");
                        }
                    }
                }
                info!(entries = moved, "Merged guest wishlist into account");
            }
            Err(e) => warn!(error = %e, "Could not read guest wishlist for merge"),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}
