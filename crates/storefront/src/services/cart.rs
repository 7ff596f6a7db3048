//! Account carts.

use fashion_store_core::wire::AddToCartRequest;
use fashion_store_core::{Cart, LineId, NewCartLine, ProductRef, QuantityChange, UserId};
use sqlx::PgPool;
use tracing::{info, instrument};

use super::catalog::{hydrate_cart, require_active, require_variant};
use super::{CartServiceError, load_document, update_document};
use crate::db::products::ProductRepository;

/// Cart operations for one signed-in user. Every result is hydrated.
pub struct CartService<'a> {
    pool: &'a PgPool,
    products: ProductRepository<'a>,
    user: UserId,
}

impl<'a> CartService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, user: UserId) -> Self {
        Self {
            pool,
            products: ProductRepository::new(pool),
            user,
        }
    }

    /// The cart, created empty on first access.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` on database failure.
    pub async fn get(&self) -> Result<Cart, CartServiceError> {
        let mut cart: Cart = load_document(self.pool, self.user).await?;
        hydrate_cart(&self.products, &mut cart).await?;
        Ok(cart)
    }

    /// Add a line, merging into an existing line for the same product,
    /// size and colour name.
    ///
    /// # Errors
    ///
    /// `Invalid` for a bad quantity or a variant the product does not offer,
    /// `ProductNotFound` for an unknown or inactive product.
    #[instrument(skip(self, request), fields(user_id = %self.user, product_id = %request.product_id))]
    pub async fn add(&self, request: AddToCartRequest) -> Result<Cart, CartServiceError> {
        let line = NewCartLine {
            product: ProductRef::from(request.product_id),
            quantity: request.quantity,
            size: request.size,
            color: request.color,
        };
        line.validate()?;

        let product = require_active(&self.products, request.product_id).await?;
        require_variant(&product, &line.size, &line.color)?;

        let (mut cart, item_id) = update_document(self.pool, self.user, |cart: &mut Cart| {
            Ok(cart.add_line(line.clone(), LineId::generate)?)
        })
        .await?;

        info!(%item_id, quantity = line.quantity, "Added to cart");
        hydrate_cart(&self.products, &mut cart).await?;
        Ok(cart)
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// `LineNotFound` if the line is not in the cart.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn update_quantity(&self, item: LineId, quantity: i64) -> Result<Cart, CartServiceError> {
        let (mut cart, change) = update_document(self.pool, self.user, |cart: &mut Cart| {
            Ok(cart.update_quantity(item, quantity)?)
        })
        .await?;

        if change == QuantityChange::Removed {
            info!(%item, "Cart line removed by quantity update");
        }
        hydrate_cart(&self.products, &mut cart).await?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// `LineNotFound` if the line is not in the cart.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn remove(&self, item: LineId) -> Result<Cart, CartServiceError> {
        let (mut cart, ()) = update_document(self.pool, self.user, |cart: &mut Cart| {
            if cart.remove_line(item) {
                Ok(())
            } else {
                Err(CartServiceError::LineNotFound(item))
            }
        })
        .await?;

        hydrate_cart(&self.products, &mut cart).await?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns `CartServiceError::Repository` on database failure.
    #[instrument(skip(self), fields(user_id = %self.user))]
    pub async fn clear(&self) -> Result<Cart, CartServiceError> {
        let (cart, ()) = update_document(self.pool, self.user, |cart: &mut Cart| {
            cart.clear();
            Ok(())
        })
        .await?;
        Ok(cart)
    }
}
