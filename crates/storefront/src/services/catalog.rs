//! Product lookups shared by the list and checkout services.

use std::collections::HashMap;

use fashion_store_core::{Cart, Color, Product, ProductId, ProductRef, Size, Wishlist};

use super::CartServiceError;
use crate::db::RepositoryError;
use crate::db::products::ProductRepository;

/// Active products among `ids`, keyed by id.
pub(super) async fn active_products(
    products: &ProductRepository<'_>,
    ids: Vec<ProductId>,
) -> Result<HashMap<ProductId, Product>, RepositoryError> {
    let mut ids = ids;
    ids.sort_unstable();
    ids.dedup();
    Ok(products
        .get_many(&ids)
        .await?
        .into_iter()
        .filter(|p| p.is_active)
        .map(|p| (p.id, p))
        .collect())
}

fn resolve(reference: &mut ProductRef, catalog: &HashMap<ProductId, Product>) {
    if let Some(product) = catalog.get(&reference.id()) {
        *reference = ProductRef::Resolved(product.clone());
    }
}

/// Attach product detail to every line whose product is still active.
/// Lines for removed products stay unresolved.
pub(super) async fn hydrate_cart(products: &ProductRepository<'_>, cart: &mut Cart) -> Result<(), RepositoryError> {
    let ids = cart.items.iter().map(|item| item.product.id()).collect();
    let catalog = active_products(products, ids).await?;
    for item in &mut cart.items {
        resolve(&mut item.product, &catalog);
    }
    Ok(())
}

pub(super) async fn hydrate_wishlist(
    products: &ProductRepository<'_>,
    wishlist: &mut Wishlist,
) -> Result<(), RepositoryError> {
    let ids = wishlist.items.iter().map(|item| item.product.id()).collect();
    let catalog = active_products(products, ids).await?;
    for item in &mut wishlist.items {
        resolve(&mut item.product, &catalog);
    }
    Ok(())
}

/// The product, if it exists and is active.
pub(super) async fn require_active(
    products: &ProductRepository<'_>,
    id: ProductId,
) -> Result<Product, CartServiceError> {
    products
        .get(id)
        .await?
        .filter(|p| p.is_active)
        .ok_or(CartServiceError::ProductNotFound(id))
}

/// Reject variants the product does not offer.
pub(super) fn require_variant(product: &Product, size: &Size, color: &Color) -> Result<(), CartServiceError> {
    if !product.offers_size(size) {
        return Err(CartServiceError::Invalid(format!(
            "size {size} is not available for {}",
            product.name
        )));
    }
    if !product.offers_color(color) {
        return Err(CartServiceError::Invalid(format!(
            "color {} is not available for {}",
            color.name, product.name
        )));
    }
    Ok(())
}
