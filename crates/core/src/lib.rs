//! FashionStore Core - shared domain types and rules.
//!
//! This crate is used by every FashionStore component:
//! - `client` - the guest/authenticated cart and wishlist engine
//! - `storefront` - the JSON API server
//! - `cli` - migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains types and pure business rules only - no I/O, no
//! database access, no HTTP clients. Cart merging, the pricing policy and
//! review aggregation live here so that the client and the server apply
//! them identically.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, email addresses and status enums
//! - [`product`] - Catalog products, sizes, colours and [`ProductRef`]
//! - [`cart`] / [`wishlist`] - The two shopper-owned lists
//! - [`pricing`] - Shipping and tax policy
//! - [`order`] / [`review`] - Checkout snapshots and product reviews
//! - [`admin`] / [`contact`] - Back-office edits and contact form messages
//! - [`wire`] - API request and response bodies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod admin;
pub mod cart;
pub mod contact;
pub mod order;
pub mod pricing;
pub mod product;
pub mod review;
pub mod types;
pub mod wire;
pub mod wishlist;

pub use account::{Identity, ProfileError, ProfileUpdate, UserProfile};
pub use admin::{AdminStats, CustomerSummary, ProductDraft, ProductPatch};
pub use cart::{Cart, CartError, CartItem, NewCartLine, QuantityChange};
pub use contact::{ContactError, ContactMessage, ContactRequest, NewContactMessage};
pub use order::{AddressError, Order, OrderLine, ShippingAddress, price_lines};
pub use pricing::Totals;
pub use product::{Category, Color, Product, ProductRef, Size};
pub use review::{RatingSummary, Review, ReviewDraft, ReviewError};
pub use types::*;
pub use wishlist::{Wishlist, WishlistError, WishlistItem};
