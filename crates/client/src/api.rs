//! HTTP client for the storefront JSON API.
//!
//! Every non-success response is read as `{ "message": ... }` and mapped to a
//! [`StoreError`] by status code; transport failures become `Unavailable`.

use std::sync::Arc;

use fashion_store_core::wire::{
    AddToCartRequest, AddToWishlistRequest, AuthResponse, ContactReceipt, ErrorBody, LoginRequest,
    PlaceOrderRequest, RegisterRequest, UpdateQuantityRequest,
};
use fashion_store_core::{
    Cart, ContactRequest, LineId, Order, OrderId, Product, ProductId, ProfileUpdate, UserProfile, Wishlist,
};
use reqwest::{Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::error::StoreError;

/// Client for the storefront API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base: Url,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.inner.base.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client rooted at `base` (e.g. `http://localhost:3000/api/`).
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base,
            }),
        }
    }

    #[must_use]
    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
    ) -> Result<RequestBuilder, StoreError> {
        let url = self
            .inner
            .base
            .join(path)
            .map_err(|e| StoreError::Unavailable(format!("invalid API path {path}: {e}")))?;
        let builder = self.inner.client.request(method, url);
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        })
    }

    /// Send a request and decode a JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        let response = check(request.send().await?).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| StoreError::Unavailable(format!("malformed response: {e}")))
    }

    /// Send a request whose success response has no body worth reading.
    async fn send_empty(&self, request: RequestBuilder) -> Result<(), StoreError> {
        check(request.send().await?).await?;
        Ok(())
    }

    fn with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> Result<RequestBuilder, StoreError> {
        Ok(self.request(method, path, token)?.json(body))
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, StoreError> {
        self.send(self.with_body(Method::POST, "auth/login", None, request)?)
            .await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, StoreError> {
        self.send(self.with_body(Method::POST, "auth/register", None, request)?)
            .await
    }

    #[instrument(skip_all)]
    pub async fn profile(&self, token: &SecretString) -> Result<UserProfile, StoreError> {
        self.send(self.request(Method::GET, "auth/profile", Some(token))?)
            .await
    }

    #[instrument(skip_all)]
    pub async fn update_profile(
        &self,
        token: &SecretString,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, StoreError> {
        self.send(self.with_body(Method::PUT, "auth/profile", Some(token), update)?)
            .await
    }

    #[instrument(skip_all)]
    pub async fn logout(&self, token: &SecretString) -> Result<(), StoreError> {
        self.send_empty(self.request(Method::POST, "auth/logout", Some(token))?)
            .await
    }

    // -------------------------------------------------------------------------
    // Catalog
    // -------------------------------------------------------------------------

    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, StoreError> {
        self.send(self.request(Method::GET, &format!("products/{id}"), None)?)
            .await
    }

    // -------------------------------------------------------------------------
    // Cart (not cached - mutable state)
    // -------------------------------------------------------------------------

    #[instrument(skip_all)]
    pub async fn cart(&self, token: &SecretString) -> Result<Cart, StoreError> {
        self.send(self.request(Method::GET, "cart", Some(token))?).await
    }

    #[instrument(skip_all, fields(product_id = %request.product_id, quantity = request.quantity))]
    pub async fn add_to_cart(
        &self,
        token: &SecretString,
        request: &AddToCartRequest,
    ) -> Result<Cart, StoreError> {
        self.send(self.with_body(Method::POST, "cart", Some(token), request)?)
            .await
    }

    #[instrument(skip(self, token), fields(item_id = %item))]
    pub async fn update_cart_item(
        &self,
        token: &SecretString,
        item: LineId,
        quantity: i64,
    ) -> Result<Cart, StoreError> {
        let body = UpdateQuantityRequest { quantity };
        self.send(self.with_body(Method::PUT, &format!("cart/{item}"), Some(token), &body)?)
            .await
    }

    #[instrument(skip(self, token), fields(item_id = %item))]
    pub async fn remove_cart_item(
        &self,
        token: &SecretString,
        item: LineId,
    ) -> Result<Cart, StoreError> {
        self.send(self.request(Method::DELETE, &format!("cart/{item}"), Some(token))?)
            .await
    }

    #[instrument(skip_all)]
    pub async fn clear_cart(&self, token: &SecretString) -> Result<Cart, StoreError> {
        self.send(self.request(Method::DELETE, "cart", Some(token))?)
            .await
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    #[instrument(skip_all)]
    pub async fn wishlist(&self, token: &SecretString) -> Result<Wishlist, StoreError> {
        self.send(self.request(Method::GET, "wishlist", Some(token))?)
            .await
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_wishlist(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> Result<Wishlist, StoreError> {
        let body = AddToWishlistRequest { product_id };
        self.send(self.with_body(Method::POST, "wishlist", Some(token), &body)?)
            .await
    }

    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_wishlist(
        &self,
        token: &SecretString,
        product_id: ProductId,
    ) -> Result<Wishlist, StoreError> {
        self.send(self.request(Method::DELETE, &format!("wishlist/{product_id}"), Some(token))?)
            .await
    }

    // -------------------------------------------------------------------------
    // Orders
    // -------------------------------------------------------------------------

    #[instrument(skip_all, fields(payment_method = %request.payment_method))]
    pub async fn place_order(
        &self,
        token: &SecretString,
        request: &PlaceOrderRequest,
    ) -> Result<Order, StoreError> {
        self.send(self.with_body(Method::POST, "orders", Some(token), request)?)
            .await
    }

    #[instrument(skip_all)]
    pub async fn orders(&self, token: &SecretString) -> Result<Vec<Order>, StoreError> {
        self.send(self.request(Method::GET, "orders", Some(token))?)
            .await
    }

    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(&self, token: &SecretString, id: OrderId) -> Result<Order, StoreError> {
        self.send(self.request(Method::GET, &format!("orders/{id}"), Some(token))?)
            .await
    }

    // -------------------------------------------------------------------------
    // Contact
    // -------------------------------------------------------------------------

    /// Send the contact form. No account needed.
    #[instrument(skip_all)]
    pub async fn submit_contact(&self, request: &ContactRequest) -> Result<ContactReceipt, StoreError> {
        self.send(self.with_body(Method::POST, "contact", None, request)?)
            .await
    }
}

/// Pass successful responses through; turn anything else into a `StoreError`.
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        },
        |b| b.message,
    );
    debug!(status = %status, message = %message, "API request failed");
    Err(StoreError::from_status(status, message))
}
