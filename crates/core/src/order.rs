//! Orders created at checkout.
//!
//! An order is a frozen snapshot: line prices are copied from the product
//! rows at the moment of purchase and the derived totals are stored with it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::CartItem;
use crate::pricing::Totals;
use crate::product::{Color, Product, Size};
use crate::types::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("shipping address {0} is required")]
    Missing(&'static str),
}

/// Where an order ships to. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

impl ShippingAddress {
    /// # Errors
    ///
    /// Returns [`AddressError::Missing`] naming the first blank field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let fields = [
            ("name", &self.name),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("pincode", &self.pincode),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(AddressError::Missing(*field)),
            None => Ok(()),
        }
    }
}

/// One purchased product variant, priced at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub size: Size,
    pub color: Color,
    /// Authoritative unit price taken from the product row.
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl OrderLine {
    /// Price a cart line against the current product row. Whatever price the
    /// cart line carries is ignored.
    #[must_use]
    pub fn priced(item: &CartItem, product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            quantity: item.quantity,
            size: item.size.clone(),
            color: item.color.clone(),
            price: product.price,
            image: product.thumbnail().map(str::to_owned),
        }
    }
}

/// Totals for a set of priced order lines.
#[must_use]
pub fn price_lines(lines: &[OrderLine]) -> Totals {
    Totals::from_lines(lines.iter().map(|line| (line.price, line.quantity)))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[must_use]
    pub const fn totals(&self) -> Totals {
        Totals {
            subtotal: self.items_price,
            shipping: self.shipping_price,
            tax: self.tax_price,
            total: self.total_price,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::product::fixtures::product;
    use crate::types::LineId;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Asha".to_owned(),
            phone: "9800000000".to_owned(),
            address: "12 Lake Road".to_owned(),
            city: "Pune".to_owned(),
            state: "MH".to_owned(),
            pincode: "411001".to_owned(),
        }
    }

    #[test]
    fn test_address_requires_every_field() {
        assert!(address().validate().is_ok());

        let mut missing = address();
        missing.pincode = " ".to_owned();
        assert_eq!(missing.validate(), Err(AddressError::Missing("pincode")));

        assert_eq!(
            ShippingAddress::default().validate(),
            Err(AddressError::Missing("name"))
        );
    }

    #[test]
    fn test_line_uses_product_row_price() {
        let mut stale = product(1, 10);
        stale.price = Decimal::ONE;
        let item = CartItem {
            id: LineId::generate(),
            product: stale.into(),
            quantity: 3,
            size: Size::M,
            color: Color::new("Black", "#000000"),
        };
        let current = product(1, 400);

        let line = OrderLine::priced(&item, &current);
        assert_eq!(line.price, Decimal::new(400, 0));
        assert_eq!(line.image.as_deref(), Some("/img/1.jpg"));

        let totals = price_lines(&[line]);
        assert_eq!(totals.subtotal, Decimal::new(1200, 0));
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.tax, Decimal::new(216, 0));
    }
}
