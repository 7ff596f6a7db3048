//! Identity transitions: login, logout, restore, expiry and guest merging.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use fashion_store_client::storage::{CART_KEY, TOKEN_KEY, USER_KEY, WISHLIST_KEY};
use fashion_store_client::{FashionStore, KeyValueStore, LoginMergePolicy, StoreError};
use fashion_store_core::wire::RegisterRequest;
use fashion_store_core::{Cart, Identity, ProductId, ProfileUpdate, Size};
use fashion_store_integration_tests::fixtures::black;
use fashion_store_integration_tests::{FlakyStore, Harness, PASSWORD};

// ============================================================================
// Login, registration and logout
// ============================================================================

#[tokio::test]
async fn test_failed_login_keeps_guest_identity() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.server.seed_account("Asha", "asha@example.com", PASSWORD).await;

    let err = h
        .store
        .session
        .login("asha@example.com", "wrong password")
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Unauthorized(_)));
    assert_eq!(h.store.session.identity().await, Identity::Guest);
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_login_persists_token_and_profile() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("Persist@Example.com").await;

    assert_eq!(profile.email.as_str(), "persist@example.com");
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_some());
    let stored = h.kv.get(USER_KEY).await.unwrap().unwrap();
    assert!(stored.contains("persist@example.com"));
    assert_eq!(
        h.store.session.identity().await,
        Identity::Authenticated(profile)
    );
}

#[tokio::test]
async fn test_register_signs_in_and_rejects_duplicates() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let request = RegisterRequest {
        name: "Ravi".to_owned(),
        email: "ravi@example.com".to_owned(),
        password: "long enough".to_owned(),
        phone: None,
    };

    let profile = h.store.session.register(request.clone()).await.unwrap();
    assert!(h.store.session.identity().await.is_authenticated());
    assert_eq!(profile.name, "Ravi");

    let again = h.reopen().session.register(request).await.unwrap_err();
    assert!(matches!(again, StoreError::Conflict(_)));
}

#[tokio::test]
async fn test_failed_token_write_leaves_no_profile_behind() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.server.seed_account("Asha", "asha@example.com", PASSWORD).await;
    let kv = Arc::new(FlakyStore::new(h.kv.clone()));
    kv.refuse_writes_to(TOKEN_KEY).await;
    let store = FashionStore::assemble(
        kv,
        h.catalog.clone(),
        Arc::new(h.server.clone()),
        LoginMergePolicy::KeepSeparate,
    );

    let err = store.session.login("asha@example.com", PASSWORD).await.unwrap_err();

    assert!(err.is_unavailable());
    assert_eq!(store.session.identity().await, Identity::Guest);
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_none());
    assert!(h.kv.get(USER_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_register_rejects_weak_password() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let err = h
        .store
        .session
        .register(RegisterRequest {
            name: "Ravi".to_owned(),
            email: "ravi@example.com".to_owned(),
            password: "short".to_owned(),
            phone: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(h.store.session.identity().await, Identity::Guest);
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("bye@example.com").await;
    assert_eq!(h.server.live_tokens().await, 1);

    h.store.session.logout().await.unwrap();

    assert_eq!(h.server.live_tokens().await, 0);
    assert_eq!(h.store.session.identity().await, Identity::Guest);
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_none());
    assert!(h.kv.get(USER_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_succeeds_while_offline() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("offline-bye@example.com").await;
    h.server.set_offline(true);

    h.store.session.logout().await.unwrap();

    assert_eq!(h.store.session.identity().await, Identity::Guest);
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_none());
}

// ============================================================================
// Guest state across the boundary
// ============================================================================

#[tokio::test]
async fn test_logout_preserves_guest_wishlist() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.store.wishlist.add_item(ProductId::new(1), None).await.unwrap();
    h.store.wishlist.add_item(ProductId::new(2), None).await.unwrap();
    let before = h.kv.get(WISHLIST_KEY).await.unwrap();

    h.sign_in("keep@example.com").await;
    let account = h.store.wishlist.get_wishlist().await.unwrap();
    assert!(account.items.is_empty());
    h.store.wishlist.add_item(ProductId::new(3), None).await.unwrap();
    h.store.session.logout().await.unwrap();

    assert_eq!(h.kv.get(WISHLIST_KEY).await.unwrap(), before);
    let guest = h.store.wishlist.get_wishlist().await.unwrap();
    assert_eq!(guest.items.len(), 2);
    assert!(!guest.contains(ProductId::new(3)));
}

#[tokio::test]
async fn test_keep_separate_leaves_guest_cart_alone() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.store
        .cart
        .add_item(ProductId::new(1), 2, Size::M, black(), None)
        .await
        .unwrap();

    let profile = h.sign_in("separate@example.com").await;

    assert!(h.store.cart.get_cart().await.unwrap().is_empty());
    assert!(h.server.cart_of(profile.id).await.is_empty());

    h.store.session.logout().await.unwrap();
    assert_eq!(h.store.cart.get_cart().await.unwrap().item_count(), 2);
}

#[tokio::test]
async fn test_merge_into_account_sums_quantities() {
    let h = Harness::new(LoginMergePolicy::MergeIntoAccount);
    let x = ProductId::new(1);

    let profile = h.sign_in("merge@example.com").await;
    h.store.cart.add_item(x, 3, Size::M, black(), None).await.unwrap();
    h.store.wishlist.add_item(ProductId::new(2), None).await.unwrap();
    h.store.session.logout().await.unwrap();

    h.store.cart.add_item(x, 2, Size::M, black(), None).await.unwrap();
    h.store.wishlist.add_item(ProductId::new(2), None).await.unwrap();
    h.store.wishlist.add_item(ProductId::new(3), None).await.unwrap();
    h.store.session.login("merge@example.com", PASSWORD).await.unwrap();

    let account = h.server.cart_of(profile.id).await;
    assert_eq!(account.items.len(), 1);
    assert_eq!(account.items[0].quantity, 5);

    let wishlist = h.store.wishlist.get_wishlist().await.unwrap();
    assert_eq!(wishlist.items.len(), 2);

    let raw = h.kv.get(CART_KEY).await.unwrap().unwrap();
    let guest_cart: Cart = serde_json::from_str(&raw).unwrap();
    assert!(guest_cart.is_empty());

    h.store.session.logout().await.unwrap();
    assert!(h.store.wishlist.get_wishlist().await.unwrap().items.is_empty());
}

#[tokio::test]
async fn test_snapshot_of_previous_identity_is_discarded() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("stale@example.com").await;
    h.store
        .cart
        .add_item(ProductId::new(2), 3, Size::L, black(), None)
        .await
        .unwrap();
    h.store.wishlist.add_item(ProductId::new(2), None).await.unwrap();
    assert_eq!(h.store.cart.item_count().await, 3);

    h.store.session.logout().await.unwrap();

    assert_eq!(h.store.cart.item_count().await, 0);
    assert!(!h.store.wishlist.is_member(ProductId::new(2)).await);
}

// ============================================================================
// Expiry and restore
// ============================================================================

#[tokio::test]
async fn test_rejected_write_signs_out() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("expired@example.com").await;
    h.server.expire_tokens().await;

    let err = h
        .store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.store.session.identity().await, Identity::Guest);
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_none());

    // Subsequent operations address guest state
    let cart = h
        .store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap();
    assert_eq!(cart.item_count(), 1);
    assert!(h.kv.get(CART_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn test_forbidden_write_keeps_session() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("staff@example.com").await;
    h.server.set_forbid_writes(true);

    let err = h
        .store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
    assert!(!err.is_unauthorized());
    assert_eq!(h.store.session.identity().await, Identity::Authenticated(profile));
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_some());

    h.server.set_forbid_writes(false);
    let cart = h
        .store
        .cart
        .add_item(ProductId::new(1), 1, Size::M, black(), None)
        .await
        .unwrap();
    assert_eq!(cart.item_count(), 1);
    assert!(h.kv.get(CART_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_restore_without_stored_session_is_guest() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    assert_eq!(h.store.session.restore().await.unwrap(), Identity::Guest);
}

#[tokio::test]
async fn test_restore_picks_up_valid_session() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("restore@example.com").await;
    h.store
        .cart
        .add_item(ProductId::new(3), 1, Size::S, black(), None)
        .await
        .unwrap();

    let restarted = h.reopen();
    let identity = restarted.session.restore().await.unwrap();

    assert_eq!(identity, Identity::Authenticated(profile));
    assert_eq!(restarted.cart.get_cart().await.unwrap().item_count(), 1);
}

#[tokio::test]
async fn test_restore_forgets_rejected_token() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("revoked@example.com").await;
    h.server.expire_tokens().await;

    let restarted = h.reopen();
    assert_eq!(restarted.session.restore().await.unwrap(), Identity::Guest);
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_none());
    assert!(h.kv.get(USER_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn test_restore_trusts_stored_profile_while_offline() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("travel@example.com").await;
    h.server.set_offline(true);

    let restarted = h.reopen();
    let identity = restarted.session.restore().await.unwrap();

    assert_eq!(identity, Identity::Authenticated(profile));
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_some());
    assert!(restarted.cart.get_cart().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_offline_restore_without_profile_keeps_token() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("noprofile@example.com").await;
    h.kv.remove(USER_KEY).await.unwrap();
    h.server.set_offline(true);

    let offline = h.reopen();
    assert_eq!(offline.session.restore().await.unwrap(), Identity::Guest);
    assert!(h.kv.get(TOKEN_KEY).await.unwrap().is_some());

    h.server.set_offline(false);
    let online = h.reopen();
    assert_eq!(
        online.session.restore().await.unwrap(),
        Identity::Authenticated(profile)
    );
    assert!(h.kv.get(USER_KEY).await.unwrap().is_some());
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_update_refreshes_identity_and_storage() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    h.sign_in("asha@example.com").await;

    let updated = h
        .store
        .session
        .update_profile(ProfileUpdate {
            name: Some("  Asha Rao ".to_owned()),
            phone: Some("555-0101".to_owned()),
        })
        .await
        .unwrap();

    assert_eq!(updated.name, "Asha Rao");
    assert_eq!(updated.phone.as_deref(), Some("555-0101"));
    assert_eq!(
        h.store.session.identity().await,
        Identity::Authenticated(updated.clone())
    );
    assert!(h.kv.get(USER_KEY).await.unwrap().unwrap().contains("Asha Rao"));
    assert_eq!(h.server.profile_of(updated.id).await, Some(updated));
}

#[tokio::test]
async fn test_profile_update_needs_a_signed_in_user() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let err = h
        .store
        .session
        .update_profile(ProfileUpdate {
            name: Some("Guest".to_owned()),
            phone: None,
        })
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_blank_profile_name_is_rejected_locally() {
    let h = Harness::new(LoginMergePolicy::KeepSeparate);
    let profile = h.sign_in("blank@example.com").await;
    h.server.set_offline(true);

    let err = h
        .store
        .session
        .update_profile(ProfileUpdate {
            name: Some("   ".to_owned()),
            phone: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(h.store.session.identity().await, Identity::Authenticated(profile));
}
