//! End-to-end tests against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (`fs-cli migrate`)
//! - At least one seeded product (`fs-cli seed products <file>`)
//! - The storefront running (`cargo run -p fashion-store-storefront`)
//!
//! Run with: `cargo test -p fashion-store-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use fashion_store_client::{
    ApiClient, FashionStore, HttpResolver, LoginMergePolicy, MemoryStore, StoreError,
};
use fashion_store_core::wire::{
    AddToCartRequest, AuthResponse, ContactReceipt, ErrorBody, ProductPage, RegisterRequest,
};
use fashion_store_core::{Cart, PaymentMethod, Product, ReviewDraft, UserProfile};
use futures::future::join_all;
use fashion_store_integration_tests::fixtures::address;
use reqwest::{Client, StatusCode};
use url::Url;

/// Base URL of the API (configurable via environment).
fn api_url() -> Url {
    let raw = std::env::var("STOREFRONT_API_URL").unwrap_or_else(|_| "http://localhost:3000/api/".to_owned());
    Url::parse(&raw).unwrap()
}

fn unique_email() -> String {
    format!("it-{}@example.com", chrono::Utc::now().timestamp_micros())
}

fn client_store() -> FashionStore {
    let api = ApiClient::new(api_url());
    FashionStore::assemble(
        Arc::new(MemoryStore::new()),
        Arc::new(HttpResolver::new(api.clone())),
        Arc::new(api),
        LoginMergePolicy::KeepSeparate,
    )
}

/// Register a fresh customer over plain HTTP.
async fn register_customer(name: &str) -> AuthResponse {
    let resp = Client::new()
        .post(api_url().join("auth/register").unwrap())
        .json(&RegisterRequest {
            name: name.to_owned(),
            email: unique_email(),
            password: "integration-pass".to_owned(),
            phone: None,
        })
        .send()
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

/// First listed product that declares at least one size and colour.
async fn orderable_product() -> Product {
    let page: ProductPage = Client::new()
        .get(api_url().join("products?limit=100").unwrap())
        .send()
        .await
        .expect("Failed to list products")
        .json()
        .await
        .expect("Failed to decode product page");

    page.products
        .into_iter()
        .find(|p| !p.sizes.is_empty() && !p.colors.is_empty())
        .expect("No orderable product seeded")
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_health() {
    let resp = Client::new()
        .get(api_url().join("health").unwrap())
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_cart_requires_token() {
    let resp = Client::new()
        .get(api_url().join("cart").unwrap())
        .send()
        .await
        .expect("Failed to reach storefront");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = resp.json().await.unwrap();
    assert_eq!(body.message, "Not authorized, no token");
}

#[tokio::test]
#[ignore = "Requires running storefront, database and a seeded catalog"]
async fn test_guest_to_order_flow() {
    let product = orderable_product().await;
    let size = product.sizes[0].clone();
    let color = product.colors[0].clone();
    let store = client_store();

    // Guest cart lives locally
    let guest = store
        .cart
        .add_item(product.id, 1, size.clone(), color.clone(), None)
        .await
        .unwrap();
    assert_eq!(guest.item_count(), 1);

    store
        .session
        .register(RegisterRequest {
            name: "Integration".to_owned(),
            email: unique_email(),
            password: "integration-pass".to_owned(),
            phone: None,
        })
        .await
        .unwrap();
    assert!(store.cart.get_cart().await.unwrap().is_empty());

    store
        .cart
        .add_item(product.id, 2, size.clone(), color.clone(), None)
        .await
        .unwrap();
    let cart = store
        .cart
        .add_item(product.id, 3, size, color, None)
        .await
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert!(cart.version > 0);

    let order = store
        .checkout
        .place_order(address(), PaymentMethod::Cod)
        .await
        .unwrap();
    assert_eq!(order.items[0].quantity, 5);
    assert_eq!(order.totals(), fashion_store_core::price_lines(&order.items));
    assert!(store.cart.get_cart().await.unwrap().is_empty());

    let again = store
        .checkout
        .place_order(address(), PaymentMethod::Cod)
        .await
        .unwrap_err();
    assert_eq!(again, StoreError::Validation("cart is empty".to_owned()));

    store.session.logout().await.unwrap();
    assert_eq!(store.cart.get_cart().await.unwrap().item_count(), 1);
}

#[tokio::test]
#[ignore = "Requires running storefront, database and a seeded catalog"]
async fn test_wishlist_round_trip() {
    let product = orderable_product().await;
    let store = client_store();
    store
        .session
        .register(RegisterRequest {
            name: "Wisher".to_owned(),
            email: unique_email(),
            password: "integration-pass".to_owned(),
            phone: None,
        })
        .await
        .unwrap();

    store.wishlist.add_item(product.id, None).await.unwrap();
    let dup = store.wishlist.add_item(product.id, None).await.unwrap_err();
    assert!(matches!(dup, StoreError::Conflict(_)));

    let once = store.wishlist.remove_item(product.id).await.unwrap();
    let twice = store.wishlist.remove_item(product.id).await.unwrap();
    assert!(once.items.is_empty());
    assert_eq!(once.items, twice.items);
}

#[tokio::test]
#[ignore = "Requires running storefront, database and a seeded catalog"]
async fn test_second_review_of_a_product_is_conflict() {
    let product = orderable_product().await;
    let auth = register_customer("Reviewer").await;
    let url = api_url().join(&format!("products/{}/reviews", product.id)).unwrap();
    let draft = ReviewDraft {
        rating: 4,
        comment: "Fits well".to_owned(),
    };

    let first = Client::new()
        .post(url.clone())
        .bearer_auth(&auth.token)
        .json(&draft)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = Client::new()
        .post(url)
        .bearer_auth(&auth.token)
        .json(&ReviewDraft {
            rating: 1,
            comment: "Changed my mind".to_owned(),
        })
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body: ErrorBody = second.json().await.unwrap();
    assert!(!body.message.is_empty());
}

#[tokio::test]
#[ignore = "Requires running storefront, database and a seeded catalog"]
async fn test_concurrent_adds_of_one_variant_are_not_lost() {
    const WRITERS: u32 = 8;

    let product = orderable_product().await;
    let auth = register_customer("Racer").await;
    let client = Client::new();
    let url = api_url().join("cart").unwrap();

    let adds = (1..=WRITERS).map(|quantity| {
        let request = AddToCartRequest {
            product_id: product.id,
            quantity,
            size: product.sizes[0].clone(),
            color: product.colors[0].clone(),
        };
        let call = client.post(url.clone()).bearer_auth(&auth.token).json(&request).send();
        async move { (quantity, call.await.unwrap().status()) }
    });
    let outcomes = join_all(adds).await;

    let mut expected = 0;
    for (quantity, status) in &outcomes {
        match *status {
            StatusCode::OK | StatusCode::CREATED => expected += quantity,
            other => assert_eq!(other, StatusCode::CONFLICT, "add of {quantity} failed"),
        }
    }
    assert!(expected > 0, "every concurrent add was rejected");

    let cart: Cart = client
        .get(url)
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, expected);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_contact_form_is_accepted() {
    let resp = Client::new()
        .post(api_url().join("contact").unwrap())
        .json(&serde_json::json!({
            "name": "Integration",
            "email": unique_email(),
            "message": "Do you ship abroad?",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let receipt: ContactReceipt = resp.json().await.unwrap();
    assert_eq!(receipt.message, "Thank you for contacting us! We will contact you soon.");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_profile_update_round_trip() {
    let auth = register_customer("Before").await;
    let client = Client::new();
    let url = api_url().join("auth/profile").unwrap();

    let updated: UserProfile = client
        .put(url.clone())
        .bearer_auth(&auth.token)
        .json(&serde_json::json!({ "name": " After ", "phone": "555-0199" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.name, "After");
    assert_eq!(updated.phone.as_deref(), Some("555-0199"));

    let fetched: UserProfile = client
        .get(url)
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, updated);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_customer_is_forbidden_from_back_office() {
    let auth = register_customer("Customer").await;
    let client = Client::new();

    for (method, path) in [
        (reqwest::Method::GET, "admin/stats"),
        (reqwest::Method::GET, "admin/users"),
        (reqwest::Method::PUT, "admin/orders/1/status"),
        (reqwest::Method::DELETE, "products/1"),
        (reqwest::Method::GET, "contact"),
    ] {
        let resp = client
            .request(method.clone(), api_url().join(path).unwrap())
            .bearer_auth(&auth.token)
            .json(&serde_json::json!({ "status": "shipped" }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{method} {path}");
        let body: ErrorBody = resp.json().await.unwrap();
        assert_eq!(body.message, "Not authorized as an admin");
    }
}
