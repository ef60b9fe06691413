//! Reviews repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::review::{Review, ReviewDetails},
};

#[derive(Clone)]
pub struct ReviewsRepository {
    pool: Pool<Postgres>,
}

impl ReviewsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record a review
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        rating: i32,
        comment: Option<&str>,
    ) -> AppResult<Review> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (user_id, book_id, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    /// Reviews for a book with author names, newest first
    pub async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<ReviewDetails>> {
        let rows = sqlx::query_as::<_, ReviewDetails>(
            r#"
            SELECT r.id, r.user_id, u.username, r.rating, r.comment, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.book_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
