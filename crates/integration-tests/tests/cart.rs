//! Cart behaviour through the client engine, for guests and accounts.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use fashion_store_client::storage::CART_KEY;
use fashion_store_client::{KeyValueStore, LoginMergePolicy, StoreError};
use fashion_store_core::{Cart, CartItem, LineId, ProductId, ProductRef, Size};
use fashion_store_integration_tests::Harness;
use fashion_store_integration_tests::fixtures::{black, money, red};
use futures::future::join_all;

fn guest() -> Harness {
    Harness::new(LoginMergePolicy::KeepSeparate)
}

// ============================================================================
// Line merging and variants
// ============================================================================

#[tokio::test]
async fn test_same_variant_merges_quantities() {
    let h = guest();
    let x = ProductId::new(1);

    h.store.cart.add_item(x, 2, Size::M, black(), None).await.unwrap();
    let cart = h.store.cart.add_item(x, 3, Size::M, black(), None).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
}

#[tokio::test]
async fn test_size_and_color_make_distinct_lines() {
    let h = guest();
    let x = ProductId::new(1);

    h.store.cart.add_item(x, 1, Size::S, red(), None).await.unwrap();
    let cart = h.store.cart.add_item(x, 1, Size::M, red(), None).await.unwrap();
    assert_eq!(cart.items.len(), 2);

    let cart = h.store.cart.add_item(x, 1, Size::M, black(), None).await.unwrap();
    assert_eq!(cart.items.len(), 3);
}

#[tokio::test]
async fn test_account_cart_merges_like_guest_cart() {
    let h = guest();
    h.sign_in("merge@example.com").await;
    let x = ProductId::new(2);

    h.store.cart.add_item(x, 2, Size::L, red(), None).await.unwrap();
    let cart = h.store.cart.add_item(x, 3, Size::L, red(), None).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert!(cart.items[0].product.is_resolved());
}

// ============================================================================
// Quantity updates and removal
// ============================================================================

#[tokio::test]
async fn test_non_positive_quantity_removes_line() {
    for quantity in [0, -5] {
        let h = guest();
        let cart = h
            .store
            .cart
            .add_item(ProductId::new(1), 2, Size::M, black(), None)
            .await
            .unwrap();
        let line = cart.items[0].id;

        let cart = h.store.cart.update_item_quantity(line, quantity).await.unwrap();
        assert!(cart.is_empty(), "quantity {quantity}");
    }
}

#[tokio::test]
async fn test_update_unknown_line_is_not_found() {
    let h = guest();
    let err = h
        .store
        .cart
        .update_item_quantity(LineId::generate(), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_removing_absent_line_is_a_no_op() {
    let h = guest();
    let cart = h
        .store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap();
    let line = cart.items[0].id;

    h.store.cart.remove_item(line).await.unwrap();
    let cart = h.store.cart.remove_item(line).await.unwrap();
    assert!(cart.is_empty());
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_invalid_requests_are_rejected_without_writing() {
    let h = guest();
    let x = ProductId::new(1);

    let zero = h.store.cart.add_item(x, 0, Size::M, black(), None).await;
    assert!(matches!(zero, Err(StoreError::Validation(_))));

    let blank_size = h
        .store
        .cart
        .add_item(x, 1, Size::Custom(" ".to_owned()), black(), None)
        .await;
    assert!(matches!(blank_size, Err(StoreError::Validation(_))));

    let unoffered = h.store.cart.add_item(x, 1, Size::XXL, black(), None).await;
    assert!(matches!(unoffered, Err(StoreError::Validation(_))));

    let unknown = h
        .store
        .cart
        .add_item(ProductId::new(404), 1, Size::M, black(), None)
        .await;
    assert!(matches!(unknown, Err(StoreError::NotFound(_))));

    assert!(h.kv.get(CART_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_inactive_product_cannot_be_added() {
    let h = guest();
    h.catalog.deactivate(ProductId::new(3)).await;

    let err = h
        .store
        .cart
        .add_item(ProductId::new(3), 1, Size::M, black(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

// ============================================================================
// Counts and totals
// ============================================================================

#[tokio::test]
async fn test_count_is_sum_of_quantities() {
    let h = guest();
    h.store
        .cart
        .add_item(ProductId::new(1), 2, Size::M, black(), None)
        .await
        .unwrap();
    h.store
        .cart
        .add_item(ProductId::new(2), 3, Size::M, black(), None)
        .await
        .unwrap();

    assert_eq!(h.store.cart.item_count().await, 5);
}

#[tokio::test]
async fn test_totals_below_free_shipping() {
    let h = guest();
    h.store
        .cart
        .add_item(ProductId::new(1), 2, Size::M, black(), None)
        .await
        .unwrap();
    h.store
        .cart
        .add_item(ProductId::new(2), 1, Size::S, red(), None)
        .await
        .unwrap();

    // 2 x 100 + 250
    let totals = h.store.cart.totals().await;
    assert_eq!(totals.subtotal, money(450));
    assert_eq!(totals.shipping, money(50));
    assert_eq!(totals.tax, money(81));
    assert_eq!(totals.total, money(581));
}

#[tokio::test]
async fn test_totals_above_free_shipping() {
    let h = guest();
    h.store
        .cart
        .add_item(ProductId::new(3), 2, Size::M, black(), None)
        .await
        .unwrap();

    let totals = h.store.cart.totals().await;
    assert_eq!(totals.subtotal, money(1200));
    assert_eq!(totals.shipping, money(0));
    assert_eq!(totals.tax, money(216));
    assert_eq!(totals.total, money(1416));
}

// ============================================================================
// Hydration and outages
// ============================================================================

fn unresolved_line(id: i32, quantity: u32) -> CartItem {
    CartItem {
        id: LineId::generate(),
        product: ProductRef::from(ProductId::new(id)),
        quantity,
        size: Size::M,
        color: black(),
    }
}

#[tokio::test]
async fn test_partial_hydration_keeps_unresolvable_lines() {
    let h = guest();
    let stored = Cart {
        items: vec![unresolved_line(1, 2), unresolved_line(99, 1)],
        version: 0,
    };
    h.kv.set(CART_KEY, &serde_json::to_string(&stored).unwrap())
        .await
        .unwrap();

    let cart = h.store.cart.get_cart().await.unwrap();

    assert_eq!(cart.items.len(), 2);
    assert!(cart.items[0].product.is_resolved());
    assert!(!cart.items[1].product.is_resolved());
    assert_eq!(cart.item_count(), 3);
    assert_eq!(cart.subtotal(), money(200));
}

#[tokio::test]
async fn test_hydration_retries_after_outage() {
    let h = guest();
    let stored = Cart {
        items: vec![unresolved_line(2, 1)],
        version: 0,
    };
    h.kv.set(CART_KEY, &serde_json::to_string(&stored).unwrap())
        .await
        .unwrap();
    h.catalog.fail(ProductId::new(2)).await;

    let cart = h.store.cart.get_cart().await.unwrap();
    assert!(!cart.items[0].product.is_resolved());

    h.catalog.recover(ProductId::new(2)).await;
    let cart = h.store.cart.get_cart().await.unwrap();
    assert!(cart.items[0].product.is_resolved());
    assert_eq!(cart.subtotal(), money(250));
}

#[tokio::test]
async fn test_outage_serves_last_known_account_cart() {
    let h = guest();
    h.sign_in("offline@example.com").await;
    h.store
        .cart
        .add_item(ProductId::new(1), 4, Size::M, black(), None)
        .await
        .unwrap();

    h.server.set_offline(true);
    let cart = h.store.cart.get_cart().await.unwrap();
    assert_eq!(cart.item_count(), 4);

    let write = h
        .store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await;
    assert!(matches!(write, Err(StoreError::Unavailable(_))));
    assert_eq!(h.store.cart.item_count().await, 4);
}

#[tokio::test]
async fn test_concurrent_guest_adds_are_all_kept() {
    let h = guest();
    let adds = (0..8).map(|_| {
        h.store
            .cart
            .add_item(ProductId::new(1), 1, Size::M, black(), None)
    });
    for result in join_all(adds).await {
        result.unwrap();
    }

    let cart = h.store.cart.get_cart().await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 8);
}
