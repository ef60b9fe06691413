//! Book (catalog) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    /// Total copies owned by the library or a seller
    pub quantity: i32,
    /// Copies currently loanable/purchasable
    pub available_count: i32,
    pub price: f64,
    pub pages: Option<i32>,
    pub average_rating: f64,
    pub rating_count: i32,
    /// Null means library-owned; set means a marketplace listing
    pub seller_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Create book request (librarian)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    pub pages: Option<i32>,
}

/// Update book request (librarian)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    /// New total stock; the availability delta is derived from it
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
}

/// Marketplace listing request (seller)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateListing {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
}

/// Browse/search query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    /// Substring match against title or author
    pub q: Option<String>,
    /// Exact category filter
    pub category: Option<String>,
}

impl BookQuery {
    pub fn is_empty(&self) -> bool {
        self.q.as_deref().map_or(true, str::is_empty)
            && self.category.as_deref().map_or(true, str::is_empty)
    }
}

/// One category carousel for the default browse view
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryShelf {
    pub category: String,
    pub books: Vec<Book>,
}

/// Browse response: either flat search results or category carousels
#[derive(Debug, Serialize, ToSchema)]
pub struct BrowseResponse {
    pub is_search: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Book>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shelves: Option<Vec<CategoryShelf>>,
    pub categories: Vec<String>,
}

/// Public landing page collections
#[derive(Debug, Serialize, ToSchema)]
pub struct LandingResponse {
    pub new_releases: Vec<Book>,
    pub top_rated: Vec<Book>,
    pub recommended: Vec<Book>,
    pub categories: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_query_counts_as_empty() {
        assert!(BookQuery::default().is_empty());
        assert!(BookQuery { q: Some(String::new()), category: Some(String::new()) }.is_empty());
        assert!(!BookQuery { q: Some("dune".into()), category: None }.is_empty());
        assert!(!BookQuery { q: None, category: Some("Fiction".into()) }.is_empty());
    }
}
