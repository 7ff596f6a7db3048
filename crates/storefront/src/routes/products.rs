//! Catalog and review route handlers. Writes to the catalog are
//! admin-only.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{info, instrument};

use fashion_store_core::wire::{ProductPage, ReviewList};
use fashion_store_core::{
    Category, Product, ProductDraft, ProductId, ProductPatch, RatingSummary, Review, ReviewDraft, ReviewId,
};

use crate::db::RepositoryError;
use crate::db::products::{ProductFilter, ProductRepository};
use crate::db::reviews::ReviewRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireUser};
use crate::state::AppState;

/// Page size when the client does not ask for one.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest page a client may ask for.
pub const MAX_LIMIT: u32 = 100;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

/// Paging parameters only, for the category listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

/// Page number (1-based) and page size after clamping.
fn paging(limit: Option<u32>, page: Option<u32>) -> (u32, u32) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let page = page.unwrap_or(1).max(1);
    (page, limit)
}

async fn list_page(
    state: &AppState,
    category: Option<Category>,
    featured: Option<bool>,
    page: u32,
    limit: u32,
) -> Result<ProductPage> {
    let filter = ProductFilter {
        category,
        featured,
        limit: i64::from(limit),
        offset: i64::from(page - 1) * i64::from(limit),
    };
    let (products, total) = ProductRepository::new(state.pool()).list(&filter).await?;
    Ok(ProductPage { products, total, page })
}

#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>, Query(query): Query<ListQuery>) -> Result<Json<ProductPage>> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let (page, limit) = paging(query.limit, query.page);

    Ok(Json(list_page(&state, category, query.featured, page, limit).await?))
}

/// Category names are case-insensitive; an unknown category lists nothing.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProductPage>> {
    let (page, limit) = paging(query.limit, query.page);
    let Ok(category) = category.parse::<Category>() else {
        return Ok(Json(ProductPage {
            products: Vec::new(),
            total: 0,
            page,
        }));
    };

    Ok(Json(list_page(&state, Some(category), None, page, limit).await?))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))
}

#[instrument(skip(state))]
pub async fn reviews(State(state): State<AppState>, Path(id): Path<ProductId>) -> Result<Json<ReviewList>> {
    if ProductRepository::new(state.pool()).get(id).await?.is_none() {
        return Err(AppError::NotFound(format!("product {id} not found")));
    }

    let reviews = ReviewRepository::new(state.pool()).list_for_product(id).await?;
    let summary = RatingSummary::from_ratings(reviews.iter().map(|r| r.rating));
    Ok(Json(ReviewList {
        reviews,
        rating: summary.rating,
        num_reviews: summary.num_reviews,
    }))
}

#[instrument(skip(state, user, draft), fields(user_id = %user.id))]
pub async fn add_review(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<ProductId>,
    Json(draft): Json<ReviewDraft>,
) -> Result<(StatusCode, Json<Review>)> {
    let draft = draft
        .validated()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let (review, summary) = ReviewRepository::new(state.pool())
        .create(id, &user, &draft)
        .await?;

    info!(product_id = %id, rating = %summary.rating, num_reviews = summary.num_reviews, "Review added");
    Ok((StatusCode::CREATED, Json(review)))
}

/// Reject a product that breaks the listing rules, naming every problem.
fn check_listing(product: &Product) -> Result<()> {
    let problems = product.listing_problems();
    if problems.is_empty() {
        return Ok(());
    }
    Err(AppError::BadRequest(problems.join("; ")))
}

fn product_not_found(id: ProductId) -> impl FnOnce(RepositoryError) -> AppError {
    move |e| match e {
        RepositoryError::NotFound => AppError::NotFound(format!("product {id} not found")),
        other => other.into(),
    }
}

#[instrument(skip(state, admin, draft), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let product = draft.into_product();
    check_listing(&product)?;

    let products = ProductRepository::new(state.pool());
    let id = products.insert(&product).await?;
    let created = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("product {id} vanished after insert")))?;

    info!(product_id = %id, "Product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partial update; absent fields keep their value.
#[instrument(skip(state, admin, patch), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(patch): Json<ProductPatch>,
) -> Result<Json<Product>> {
    let products = ProductRepository::new(state.pool());
    let mut product = products
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} not found")))?;

    patch.apply(&mut product);
    check_listing(&product)?;

    let updated = products.update(&product).await.map_err(product_not_found(id))?;
    info!(product_id = %id, "Product updated");
    Ok(Json(updated))
}

/// Soft delete: the product leaves the catalog but old orders keep it.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .deactivate(id)
        .await
        .map_err(product_not_found(id))?;

    info!(product_id = %id, "Product deactivated");
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a review and return the recomputed aggregate.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn remove_review(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path((id, review_id)): Path<(ProductId, ReviewId)>,
) -> Result<Json<RatingSummary>> {
    let summary = ReviewRepository::new(state.pool())
        .delete(id, review_id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Review not found".to_string()),
            other => other.into(),
        })?;

    info!(product_id = %id, review_id = %review_id, num_reviews = summary.num_reviews, "Review removed");
    Ok(Json(summary))
}
