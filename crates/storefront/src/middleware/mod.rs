//! HTTP middleware stack for the storefront API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (only when an origin is configured)
//! 5. Security headers
//!
//! Authentication is not a layer: private handlers take the
//! [`RequireUser`] extractor, back-office handlers [`RequireAdmin`].

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::{BearerToken, RequireAdmin, RequireUser};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
