//! Shared test data.

use fashion_store_core::{Category, Color, Product, ProductId, ShippingAddress, Size};
use rust_decimal::Decimal;

/// An active product at a whole-unit price, offered in S/M/L and
/// black/red.
#[must_use]
pub fn product(id: i32, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: "Cotton tee".to_owned(),
        price: Decimal::new(price, 0),
        original_price: Decimal::new(price, 0),
        category: Category::Women,
        brand: "Loom".to_owned(),
        images: vec![format!("/img/{id}.jpg")],
        colors: vec![black(), red()],
        sizes: vec![Size::S, Size::M, Size::L],
        stock: 10,
        rating: Decimal::ZERO,
        num_reviews: 0,
        featured: false,
        is_active: true,
        created_at: None,
    }
}

#[must_use]
pub fn black() -> Color {
    Color::new("Black", "#000000")
}

#[must_use]
pub fn red() -> Color {
    Color::new("Red", "#ff0000")
}

#[must_use]
pub fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Asha Rao".to_owned(),
        phone: "9800000000".to_owned(),
        address: "12 Lake Road".to_owned(),
        city: "Pune".to_owned(),
        state: "MH".to_owned(),
        pincode: "411001".to_owned(),
    }
}

/// Whole-unit decimal.
#[must_use]
pub fn money(units: i64) -> Decimal {
    Decimal::new(units, 0)
}
