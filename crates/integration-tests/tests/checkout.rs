//! Order placement and history.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use fashion_store_client::{LoginMergePolicy, StoreError};
use fashion_store_core::{
    OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, RatingSummary, ShippingAddress, Size,
};
use fashion_store_integration_tests::Harness;
use fashion_store_integration_tests::fixtures::{address, black, money, red};

#[tokio::test]
async fn test_empty_cart_blocks_checkout() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("empty@example.com").await;

    let cart = h.store.cart.get_cart().await.unwrap();
    assert!(cart.items.is_empty());

    let err = h
        .store
        .checkout
        .place_order(address(), PaymentMethod::Card)
        .await
        .unwrap_err();

    assert_eq!(err, StoreError::Validation("cart is empty".to_owned()));
    assert!(h.server.orders_of(profile.id).await.is_empty());
}

#[tokio::test]
async fn test_guest_cannot_place_orders() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap();

    let err = h
        .store
        .checkout
        .place_order(address(), PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(h.store.cart.item_count().await, 1);
}

#[tokio::test]
async fn test_incomplete_address_is_rejected() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("address@example.com").await;
    h.store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap();

    let address = ShippingAddress {
        pincode: "  ".to_owned(),
        ..address()
    };
    let err = h
        .store
        .checkout
        .place_order(address, PaymentMethod::Upi)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(h.store.cart.get_cart().await.unwrap().item_count(), 1);
}

#[tokio::test]
async fn test_order_is_priced_from_current_catalog() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("buyer@example.com").await;
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

    // Repriced after the lines went into the cart
    h.catalog.set_price(ProductId::new(2), money(850)).await;

    let order = h
        .store
        .checkout
        .place_order(address(), PaymentMethod::Card)
        .await
        .unwrap();

    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[1].price, money(850));
    assert_eq!(order.items_price, money(1050));
    assert_eq!(order.shipping_price, money(0));
    assert_eq!(order.tax_price, money(189));
    assert_eq!(order.total_price, money(1239));
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.payment_status, PaymentStatus::Completed);

    assert!(h.server.cart_of(profile.id).await.is_empty());
    assert_eq!(h.store.cart.item_count().await, 0);
}

#[tokio::test]
async fn test_cash_on_delivery_stays_pending() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("cod@example.com").await;
    h.store
        .cart
        .add_item(ProductId::new(1), 1, Size::L, red(), None)
        .await
        .unwrap();

    let order = h
        .store
        .checkout
        .place_order(address(), PaymentMethod::Cod)
        .await
        .unwrap();

    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.shipping_price, money(50));
}

#[tokio::test]
async fn test_order_history_is_per_account() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("first@example.com").await;
    h.store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap();
    let first = h
        .store
        .checkout
        .place_order(address(), PaymentMethod::Card)
        .await
        .unwrap();
    h.store.session.logout().await.unwrap();

    h.sign_in("second@example.com").await;
    assert!(h.store.checkout.list_orders().await.unwrap().is_empty());
    let err = h.store.checkout.get_order(first.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
    h.store.session.logout().await.unwrap();

    h.store
        .session
        .login("first@example.com", fashion_store_integration_tests::PASSWORD)
        .await
        .unwrap();
    let orders = h.store.checkout.list_orders().await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(h.store.checkout.get_order(first.id).await.unwrap(), first);
    assert!(matches!(
        h.store.checkout.get_order(OrderId::new(999)).await,
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn test_review_aggregate_rounds_to_two_places() {
    let summary = RatingSummary::from_ratings([5, 4, 4]);
    assert_eq!(summary.num_reviews, 3);
    assert_eq!(summary.rating.to_string(), "4.33");

    assert_eq!(RatingSummary::from_ratings([]), RatingSummary::default());
}
