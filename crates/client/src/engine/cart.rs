use fashion_store_core::{Cart, Color, LineId, Product, ProductId, Size, Totals};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::Tracked;
use crate::error::StoreError;
use crate::session::Session;
use crate::store::CartLineRequest;

/// Cart operations for whoever is currently signed in (or the guest).
pub struct CartEngine {
    tracked: Tracked<Cart>,
}

impl CartEngine {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            tracked: Tracked::new(session),
        }
    }

    /// The current cart. An absent cart is empty; an unreachable store
    /// yields the last cart seen for this identity.
    ///
    /// # Errors
    ///
    /// `Unauthorized` if the server rejects the session.
    #[instrument(skip(self))]
    pub async fn get_cart(&self) -> Result<Cart, StoreError> {
        self.tracked
            .read("cart", |stores| async move { stores.cart.load().await })
            .await
    }

    /// Add `quantity` of a product variant, merging into an existing line
    /// for the same product, size and colour name.
    ///
    /// `hint` is previously fetched product detail; guests store it instead
    /// of resolving the product again.
    ///
    /// # Errors
    ///
    /// `Validation` for a zero quantity, missing size or colour, or a
    /// variant the product does not offer. `NotFound` for an unknown or
    /// inactive product.
    #[instrument(skip(self, color, hint), fields(color = %color.name))]
    pub async fn add_item(
        &self,
        product_id: ProductId,
        quantity: u32,
        size: Size,
        color: Color,
        hint: Option<Product>,
    ) -> Result<Cart, StoreError> {
        let request = CartLineRequest {
            product_id,
            quantity,
            size,
            color,
            hint,
        };
        request.validate()?;
        self.tracked
            .write(|stores| async move { stores.cart.add(request).await })
            .await
    }

    /// Set a line's quantity. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// `NotFound` if the line is not in the cart.
    #[instrument(skip(self))]
    pub async fn update_item_quantity(&self, item: LineId, quantity: i64) -> Result<Cart, StoreError> {
        self.tracked
            .write(|stores| async move { stores.cart.update_quantity(item, quantity).await })
            .await
    }

    /// Remove a line. Removing a line that is not there is a no-op.
    ///
    /// # Errors
    ///
    /// Any store failure other than the line being absent.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, item: LineId) -> Result<Cart, StoreError> {
        match self
            .tracked
            .write(|stores| async move { stores.cart.remove(item).await })
            .await
        {
            Err(StoreError::NotFound(_)) => {
                debug!(item_id = %item, "Cart line already gone");
                self.get_cart().await
            }
            other => other,
        }
    }

    /// # Errors
    ///
    /// Any store failure.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<Cart, StoreError> {
        self.tracked
            .write(|stores| async move { stores.cart.clear().await })
            .await
    }

    /// Sum of quantities in the last cart seen.
    pub async fn item_count(&self) -> u64 {
        self.tracked.peek().await.item_count()
    }

    /// Subtotal of the resolved lines in the last cart seen.
    pub async fn subtotal(&self) -> Decimal {
        self.tracked.peek().await.subtotal()
    }

    pub async fn totals(&self) -> Totals {
        self.tracked.peek().await.totals()
    }

    /// Forget the snapshot after the server emptied the cart (checkout).
    pub(crate) async fn mark_cleared(&self) {
        self.tracked.reset(Cart::default()).await;
    }
}
