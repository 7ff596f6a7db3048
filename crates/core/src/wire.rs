//! JSON request and response bodies of the storefront API.
//!
//! The server and the HTTP client both use these so the field spelling is
//! defined in exactly one place.

use serde::{Deserialize, Serialize};

use crate::account::UserProfile;
use crate::order::ShippingAddress;
use crate::product::{Color, Product, Size};
use crate::review::Review;
use crate::types::{ContactMessageId, PaymentMethod, ProductId};

/// `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

/// `POST /cart`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(default = "one")]
    pub quantity: u32,
    pub size: Size,
    pub color: Color,
}

const fn one() -> u32 {
    1
}

/// `PUT /cart/{itemId}`. Signed so that negative quantities reach the
/// delete-on-nonpositive rule instead of failing deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// `POST /wishlist`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToWishlistRequest {
    pub product_id: ProductId,
}

/// `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// `GET /products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
}

/// `GET /products/{id}/reviews`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewList {
    pub reviews: Vec<Review>,
    pub rating: rust_decimal::Decimal,
    pub num_reviews: i32,
}

/// `PUT /admin/orders/{id}/status`. Kept as text so an unknown status is
/// a 400 with a message rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    pub status: String,
}

/// Successful `POST /contact`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub id: ContactMessageId,
    pub message: String,
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}
