//! Wishlist membership through the client engine.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use fashion_store_client::storage::WISHLIST_KEY;
use fashion_store_client::{KeyValueStore, LoginMergePolicy, StoreError};
use fashion_store_core::{LineId, ProductId, ProductRef, Wishlist, WishlistItem};
use fashion_store_integration_tests::Harness;

fn guest() -> Harness {
    Harness::new(LoginMergePolicy::KeepSeparate)
}

#[tokio::test]
async fn test_remove_twice_equals_remove_once() {
    let h = guest();
    let p = ProductId::new(1);
    h.store.wishlist.add_item(p, None).await.unwrap();
    h.store.wishlist.add_item(ProductId::new(2), None).await.unwrap();

    let once = h.store.wishlist.remove_item(p).await.unwrap();
    let twice = h.store.wishlist.remove_item(p).await.unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.items.len(), 1);
}

#[tokio::test]
async fn test_account_remove_is_idempotent() {
    let h = guest();
    h.sign_in("idem@example.com").await;
    let p = ProductId::new(3);
    h.store.wishlist.add_item(p, None).await.unwrap();

    let once = h.store.wishlist.remove_item(p).await.unwrap();
    let twice = h.store.wishlist.remove_item(p).await.unwrap();

    assert!(once.items.is_empty());
    assert_eq!(once, twice);
}

#[tokio::test]
async fn test_duplicate_add_is_conflict() {
    for signed_in in [false, true] {
        let h = guest();
        if signed_in {
            h.sign_in("dup@example.com").await;
        }
        let p = ProductId::new(1);
        h.store.wishlist.add_item(p, None).await.unwrap();

        let err = h.store.wishlist.add_item(p, None).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)), "signed in: {signed_in}");
        assert_eq!(h.store.wishlist.count().await, 1);
    }
}

#[tokio::test]
async fn test_unknown_or_inactive_product_is_not_found() {
    let h = guest();
    h.catalog.deactivate(ProductId::new(2)).await;

    let unknown = h.store.wishlist.add_item(ProductId::new(77), None).await;
    assert!(matches!(unknown, Err(StoreError::NotFound(_))));

    let inactive = h.store.wishlist.add_item(ProductId::new(2), None).await;
    assert!(matches!(inactive, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_membership_reads_the_snapshot() {
    let h = guest();
    h.store.wishlist.add_item(ProductId::new(1), None).await.unwrap();

    let lookups = h.catalog.lookups();
    assert!(h.store.wishlist.is_member(ProductId::new(1)).await);
    assert!(!h.store.wishlist.is_member(ProductId::new(2)).await);
    assert_eq!(h.catalog.lookups(), lookups);
}

#[tokio::test]
async fn test_count_ignores_unresolvable_entries() {
    let h = guest();
    let stored = Wishlist {
        items: [1, 404]
            .into_iter()
            .map(|id| WishlistItem {
                id: LineId::generate(),
                product: ProductRef::from(ProductId::new(id)),
                added_at: chrono::Utc::now(),
            })
            .collect(),
        version: 0,
    };
    h.kv.set(WISHLIST_KEY, &serde_json::to_string(&stored).unwrap())
        .await
        .unwrap();

    let wishlist = h.store.wishlist.get_wishlist().await.unwrap();

    assert_eq!(wishlist.items.len(), 2);
    assert_eq!(h.store.wishlist.count().await, 1);
}
