//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/health                  - Liveness
//! GET    /api/health/ready            - Readiness (database ping)
//!
//! # Auth
//! POST   /api/auth/register           - Create an account, returns {token, user}
//! POST   /api/auth/login              - Returns {token, user}
//! GET    /api/auth/profile            - Current user (auth)
//! PUT    /api/auth/profile            - Change name or phone (auth)
//! POST   /api/auth/logout             - Revoke the bearer token
//!
//! # Catalog
//! GET    /api/products                - ?category&featured&limit&page
//! GET    /api/products/category/{c}   - Products in a category
//! GET    /api/products/{id}           - Product detail
//! GET    /api/products/{id}/reviews   - Reviews with the rating aggregate
//! POST   /api/products/{id}/reviews   - Add a review (auth)
//! GET    /api/search?q=               - Substring search
//! POST   /api/products                - Create (admin)
//! PUT    /api/products/{id}           - Partial update (admin)
//! DELETE /api/products/{id}           - Take off sale (admin)
//! DELETE /api/products/{id}/reviews/{review_id} - Remove a review (admin)
//!
//! # Cart (auth)
//! GET    /api/cart                    - Hydrated cart
//! POST   /api/cart                    - Add a line (merges same variant)
//! DELETE /api/cart                    - Clear
//! PUT    /api/cart/{item_id}          - Set quantity, <= 0 removes
//! DELETE /api/cart/{item_id}          - Remove a line
//!
//! # Wishlist (auth)
//! GET    /api/wishlist
//! POST   /api/wishlist                - Add a product
//! DELETE /api/wishlist/{product_id}   - Remove, silent when absent
//!
//! # Orders (auth)
//! POST   /api/orders                  - Checkout the cart
//! GET    /api/orders                  - Own orders
//! GET    /api/orders/{id}             - One order
//!
//! # Contact
//! POST   /api/contact                 - Submit the contact form
//! GET    /api/contact                 - Newest 100 messages (admin)
//! PUT    /api/contact/{id}/status     - new, read or replied (admin)
//!
//! # Back office (admin)
//! GET    /api/admin/stats             - Counters and recent orders
//! GET    /api/admin/users             - Customer accounts
//! GET    /api/admin/orders            - Every order, newest first
//! PUT    /api/admin/orders/{id}/status - Fulfilment status
//! ```

pub mod admin;
pub mod auth;
pub mod cart;
pub mod contact;
pub mod orders;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .route("/logout", post(auth::logout))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/category/{category}", get(products::by_category))
        .route(
            "/{id}",
            get(products::show).put(products::update).delete(products::remove),
        )
        .route("/{id}/reviews", get(products::reviews).post(products::add_review))
        .route("/{id}/reviews/{review_id}", delete(products::remove_review))
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/{item_id}", put(cart::update).delete(cart::remove))
}

fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show).post(wishlist::add))
        .route("/{product_id}", delete(wishlist::remove))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
}

fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(contact::index).post(contact::submit))
        .route("/{id}/status", put(contact::set_status))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/users", get(admin::users))
        .route("/orders", get(admin::orders))
        .route("/orders/{id}/status", put(admin::set_order_status))
}

/// Create all API routes, to be nested under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .route("/search", get(search::search))
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .nest("/orders", order_routes())
        .nest("/contact", contact_routes())
        .nest("/admin", admin_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
