//! Shopping cart aggregate and its mutation rules.
//!
//! Both the guest store (local key/value storage) and the server (per-user
//! document) mutate carts exclusively through these methods, so the merge
//! and delete-on-zero rules are the same whichever side holds the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::Totals;
use crate::product::{Color, ProductRef, Size};
use crate::types::{LineId, ProductId};

/// Rule violations when mutating a cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("size is required")]
    MissingSize,
    #[error("color is required")]
    MissingColor,
    #[error("cart item {0} not found")]
    LineNotFound(LineId),
}

const fn default_quantity() -> u32 {
    1
}

/// One row of a cart: a product in a specific size and colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: LineId,
    pub product: ProductRef,
    /// Stored rows missing a quantity count as 1.
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub size: Size,
    pub color: Color,
}

impl CartItem {
    /// Whether this line is the same product variant as the given triple.
    #[must_use]
    pub fn same_variant(&self, product: ProductId, size: &Size, color: &Color) -> bool {
        self.product.id() == product && &self.size == size && self.color.name == color.name
    }

    /// `unit_price * quantity`, or zero when the product is unresolved.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product
            .unit_price()
            .map_or(Decimal::ZERO, |price| price * Decimal::from(self.quantity))
    }
}

/// A request to put a product variant into a cart.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartLine {
    pub product: ProductRef,
    pub quantity: u32,
    pub size: Size,
    pub color: Color,
}

impl NewCartLine {
    /// Check the request-level constraints (quantity, size, colour present).
    ///
    /// # Errors
    ///
    /// Returns the first violated [`CartError`].
    pub fn validate(&self) -> Result<(), CartError> {
        if self.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if self.size.is_blank() {
            return Err(CartError::MissingSize);
        }
        if self.color.name.trim().is_empty() {
            return Err(CartError::MissingColor);
        }
        Ok(())
    }
}

/// What [`Cart::update_quantity`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    Updated,
    Removed,
}

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Bumped by the server on every persisted write.
    #[serde(default)]
    pub version: u64,
}

impl Cart {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn line(&self, id: LineId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Add a line, or increase the quantity of the existing line for the same
    /// `(product, size, colour name)`. `mint` supplies the id of a new line.
    ///
    /// When the incoming product reference is resolved and the existing one
    /// is not, the existing line is upgraded to the resolved detail.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the request fails validation.
    pub fn add_line(
        &mut self,
        line: NewCartLine,
        mint: impl FnOnce() -> LineId,
    ) -> Result<LineId, CartError> {
        line.validate()?;
        let product_id = line.product.id();

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.same_variant(product_id, &line.size, &line.color))
        {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            if line.product.is_resolved() && !existing.product.is_resolved() {
                existing.product = line.product;
            }
            return Ok(existing.id);
        }

        let id = mint();
        self.items.push(CartItem {
            id,
            product: line.product,
            quantity: line.quantity,
            size: line.size,
            color: line.color,
        });
        Ok(id)
    }

    /// Set a line's quantity. A quantity of zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] if no line has this id.
    pub fn update_quantity(&mut self, id: LineId, quantity: i64) -> Result<QuantityChange, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::LineNotFound(id))?;

        if quantity <= 0 {
            self.items.remove(index);
            return Ok(QuantityChange::Removed);
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(item) = self.items.get_mut(index) {
            item.quantity = quantity;
        }
        Ok(QuantityChange::Updated)
    }

    /// Remove a line. Returns `false` if it was not present.
    pub fn remove_line(&mut self, id: LineId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all rows, resolved or not.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line totals; unresolved lines contribute nothing.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn totals(&self) -> Totals {
        Totals::from_subtotal(self.subtotal())
    }

    /// Lines whose product reference still needs hydration.
    pub fn unresolved(&self) -> impl Iterator<Item = &CartItem> {
        self.items.iter().filter(|item| !item.product.is_resolved())
    }
}
