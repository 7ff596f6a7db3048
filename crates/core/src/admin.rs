//! Back-office types: catalog edits, the dashboard summary and the
//! customer listing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::product::{Category, Color, Product, Size};
use crate::types::{Email, ProductId, UserId};

/// A new catalog entry, as submitted by an admin or read from a seed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Defaults to `price` when the product is not on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub category: Category,
    pub brand: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
}

impl ProductDraft {
    /// The active, unreviewed product this draft describes. Its id is a
    /// placeholder until the row is inserted.
    #[must_use]
    pub fn into_product(self) -> Product {
        Product {
            id: ProductId::new(0),
            name: self.name.trim().to_owned(),
            description: self.description,
            price: self.price,
            original_price: self.original_price.unwrap_or(self.price),
            category: self.category,
            brand: self.brand.trim().to_owned(),
            images: self.images,
            colors: self.colors,
            sizes: self.sizes,
            stock: self.stock,
            rating: Decimal::ZERO,
            num_reviews: 0,
            featured: self.featured,
            is_active: true,
            created_at: None,
        }
    }
}

/// `PUT /products/{id}`. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub original_price: Option<Decimal>,
    pub category: Option<Category>,
    pub brand: Option<String>,
    pub images: Option<Vec<String>>,
    pub colors: Option<Vec<Color>>,
    pub sizes: Option<Vec<Size>>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product) {
        if let Some(name) = self.name {
            product.name = name.trim().to_owned();
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(original_price) = self.original_price {
            product.original_price = original_price;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(brand) = self.brand {
            product.brand = brand.trim().to_owned();
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(colors) = self.colors {
            product.colors = colors;
        }
        if let Some(sizes) = self.sizes {
            product.sizes = sizes;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(featured) = self.featured {
            product.featured = featured;
        }
    }
}

/// `GET /admin/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Customer accounts; admins are not counted.
    pub total_users: i64,
    /// Active catalog entries.
    pub total_products: i64,
    pub total_orders: i64,
    /// Sum of order totals, cancelled orders excluded.
    pub total_revenue: Decimal,
    /// The ten newest orders.
    pub recent_orders: Vec<Order>,
}

/// One row of `GET /admin/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}
