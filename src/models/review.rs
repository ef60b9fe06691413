//! Review model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Review model from database.
///
/// Reviews are recorded as-is; nothing recomputes Book.average_rating from
/// them. Seeded ratings stay authoritative until an aggregation pass is
/// decided on.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Review {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Review joined with the author's username for display
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReviewDetails {
    pub id: i32,
    pub user_id: i32,
    pub username: String,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create review request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
}
