//! Product reviews and rating aggregation.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ProductId, ReviewId, UserId};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReviewError {
    #[error("rating must be between 1 and 5")]
    RatingOutOfRange,
    #[error("comment is required")]
    EmptyComment,
}

/// A published review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Reviewer display name at the time of writing.
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A review as submitted by a shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub rating: u8,
    pub comment: String,
}

impl ReviewDraft {
    /// Validate and normalize (trim) the draft.
    ///
    /// # Errors
    ///
    /// Returns a [`ReviewError`] for an out-of-range rating or blank comment.
    pub fn validated(self) -> Result<Self, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewError::RatingOutOfRange);
        }
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(ReviewError::EmptyComment);
        }
        Ok(Self {
            rating: self.rating,
            comment: comment.to_owned(),
        })
    }
}

/// Aggregate rating denormalized onto the product row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Mean rating, two decimal places; zero when there are no reviews.
    pub rating: Decimal,
    pub num_reviews: i32,
}

impl RatingSummary {
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let (sum, count) = ratings
            .into_iter()
            .fold((0_i64, 0_i32), |(sum, count), r| (sum + i64::from(r), count + 1));
        if count == 0 {
            return Self::default();
        }
        let mean = Decimal::from(sum) / Decimal::from(count);
        Self {
            rating: mean.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            num_reviews: count,
        }
    }
}
