//! Catalog types: products, their variants, and references to them.

use core::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, UnknownVariant};

/// Department a product is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Men,
    Women,
    Kids,
}

impl Category {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Men => "Men",
            Self::Women => "Women",
            Self::Kids => "Kids",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Category {
    type Err = UnknownVariant;

    /// Case-insensitive, so `/products/category/women` works.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" => Ok(Self::Men),
            "women" => Ok(Self::Women),
            "kids" => Ok(Self::Kids),
            _ => Err(UnknownVariant {
                kind: "category",
                value: s.to_owned(),
            }),
        }
    }
}

/// Garment size.
///
/// The standard letter sizes are enumerated; anything else a product
/// declares (e.g. `"32"` for trousers) is kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Size {
    S,
    M,
    L,
    XL,
    XXL,
    Custom(String),
}

impl Size {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::S => "S",
            Self::M => "M",
            Self::L => "L",
            Self::XL => "XL",
            Self::XXL => "XXL",
            Self::Custom(s) => s,
        }
    }

    /// A size is blank when it is a custom size with no visible characters.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl From<String> for Size {
    fn from(value: String) -> Self {
        match value.trim() {
            "S" => Self::S,
            "M" => Self::M,
            "L" => Self::L,
            "XL" => Self::XL,
            "XXL" => Self::XXL,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for Size {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<Size> for String {
    fn from(size: Size) -> Self {
        match size {
            Size::Custom(s) => s,
            other => other.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A colour variant. Variant identity is the `name`; `code` is display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub name: String,
    /// Hex colour code, e.g. `#000000`.
    pub code: String,
}

impl Color {
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Full product detail, as served by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub original_price: Decimal,
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
    pub rating: Decimal,
    #[serde(default)]
    pub num_reviews: i32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

impl Product {
    /// Whole-percent markdown from `original_price` to `price`, or 0 when the
    /// product is not discounted.
    #[must_use]
    pub fn discount_percentage(&self) -> u32 {
        if self.original_price <= self.price || self.original_price.is_zero() {
            return 0;
        }
        let pct = (self.original_price - self.price) / self.original_price * Decimal::ONE_HUNDRED;
        pct.round().to_u32().unwrap_or(0)
    }

    /// Whether `size` may be ordered. Products that declare no sizes accept any.
    #[must_use]
    pub fn offers_size(&self, size: &Size) -> bool {
        self.sizes.is_empty() || self.sizes.contains(size)
    }

    /// Whether a colour with this name may be ordered. Products that declare
    /// no colours accept any.
    #[must_use]
    pub fn offers_color(&self, color: &Color) -> bool {
        self.colors.is_empty() || self.colors.iter().any(|c| c.name == color.name)
    }

    /// Every catalog rule this product breaks; empty when it may be listed.
    #[must_use]
    pub fn listing_problems(&self) -> Vec<&'static str> {
        let mut problems = Vec::new();
        if self.name.trim().is_empty() {
            problems.push("name is required");
        }
        if self.brand.trim().is_empty() {
            problems.push("brand is required");
        }
        if self.price.is_sign_negative() {
            problems.push("price must not be negative");
        }
        if self.original_price < self.price {
            problems.push("originalPrice is below price");
        }
        if self.images.is_empty() {
            problems.push("at least one image is required");
        }
        if self.stock < 0 {
            problems.push("stock must not be negative");
        }
        if self.sizes.iter().any(Size::is_blank) {
            problems.push("sizes must not be blank");
        }
        problems
    }

    /// First image, used as the thumbnail on order lines.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A reference to a product that may or may not have been hydrated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProductRef {
    /// Only the id is known.
    Unresolved { id: ProductId },
    /// Full detail has been fetched.
    Resolved(Product),
}

impl ProductRef {
    #[must_use]
    pub const fn id(&self) -> ProductId {
        match self {
            Self::Unresolved { id } => *id,
            Self::Resolved(product) => product.id,
        }
    }

    #[must_use]
    pub const fn product(&self) -> Option<&Product> {
        match self {
            Self::Unresolved { .. } => None,
            Self::Resolved(product) => Some(product),
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Unit price, if the product detail is known.
    #[must_use]
    pub fn unit_price(&self) -> Option<Decimal> {
        self.product().map(|p| p.price)
    }
}

impl From<Product> for ProductRef {
    fn from(product: Product) -> Self {
        Self::Resolved(product)
    }
}

impl From<ProductId> for ProductRef {
    fn from(id: ProductId) -> Self {
        Self::Unresolved { id }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;

    use super::{Category, Color, Product, Size};
    use crate::types::ProductId;

    /// A plain active product at the given whole-unit price.
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
            colors: vec![Color::new("Black", "#000000"), Color::new("Red", "#ff0000")],
            sizes: vec![Size::S, Size::M, Size::L],
            stock: 10,
            rating: Decimal::ZERO,
            num_reviews: 0,
            featured: false,
            is_active: true,
            created_at: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::product;
    use super::*;

    #[test]
    fn test_size_parses_standard_and_custom() {
        assert_eq!(Size::from("XL"), Size::XL);
        assert_eq!(Size::from("32"), Size::Custom("32".to_owned()));
        let json = serde_json::to_string(&Size::XXL).unwrap();
        assert_eq!(json, "\"XXL\"");
        let back: Size = serde_json::from_str("\"M\"").unwrap();
        assert_eq!(back, Size::M);
    }

    #[test]
    fn test_category_is_case_insensitive() {
        assert_eq!("women".parse::<Category>().unwrap(), Category::Women);
        assert_eq!("KIDS".parse::<Category>().unwrap(), Category::Kids);
        assert!("pets".parse::<Category>().is_err());
    }

    #[test]
    fn test_discount_percentage() {
        let mut p = product(1, 750);
        p.original_price = Decimal::new(1000, 0);
        assert_eq!(p.discount_percentage(), 25);
        p.original_price = Decimal::new(500, 0);
        assert_eq!(p.discount_percentage(), 0);
    }

    #[test]
    fn test_listing_problems() {
        assert!(product(1, 100).listing_problems().is_empty());

        let mut p = product(1, 100);
        p.brand = " ".to_owned();
        p.original_price = Decimal::new(50, 0);
        p.images.clear();
        assert_eq!(
            p.listing_problems(),
            vec![
                "brand is required",
                "originalPrice is below price",
                "at least one image is required"
            ]
        );
    }

    #[test]
    fn test_variant_offers() {
        let p = product(1, 100);
        assert!(p.offers_size(&Size::M));
        assert!(!p.offers_size(&Size::XXL));
        assert!(p.offers_color(&Color::new("Black", "#111")));
        assert!(!p.offers_color(&Color::new("Teal", "#0ff")));
    }

    #[test]
    fn test_product_ref_tagging() {
        let unresolved = ProductRef::from(ProductId::new(3));
        let json = serde_json::to_value(&unresolved).unwrap();
        assert_eq!(json["state"], "unresolved");
        assert_eq!(json["id"], 3);

        let resolved = ProductRef::from(product(4, 20));
        let json = serde_json::to_value(&resolved).unwrap();
        assert_eq!(json["state"], "resolved");
        assert_eq!(json["name"], "Product 4");
        let back: ProductRef = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), ProductId::new(4));
        assert!(back.is_resolved());
    }
}
