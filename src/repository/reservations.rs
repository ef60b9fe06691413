//! Reservations repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::reservation::{Reservation, ReservationDetails, ReservationStatus},
};

#[derive(Clone)]
pub struct ReservationsRepository {
    pool: Pool<Postgres>,
}

impl ReservationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Whether the user already has a pending claim on this book
    pub async fn has_pending(&self, user_id: i32, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM reservations
                WHERE user_id = $1 AND book_id = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Place a reservation with the status the stock level dictates
    pub async fn create(
        &self,
        user_id: i32,
        book_id: i32,
        status: ReservationStatus,
    ) -> AppResult<Reservation> {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (user_id, book_id, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(reservation)
    }

    /// Open reservations (pending and approved) with borrower and book names,
    /// oldest first so the issue queue is fair
    pub async fn list_open(&self) -> AppResult<Vec<ReservationDetails>> {
        let rows = sqlx::query_as::<_, ReservationDetails>(
            r#"
            SELECT r.id, r.user_id, u.username, r.book_id, b.title AS book_title,
                   b.available_count, r.status, r.created_at
            FROM reservations r
            JOIN users u ON u.id = r.user_id
            JOIN books b ON b.id = r.book_id
            WHERE r.status IN ('pending', 'approved')
            ORDER BY r.created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// A user's reservations, newest first
    pub async fn for_user(&self, user_id: i32) -> AppResult<Vec<ReservationDetails>> {
        let rows = sqlx::query_as::<_, ReservationDetails>(
            r#"
            SELECT r.id, r.user_id, u.username, r.book_id, b.title AS book_title,
                   b.available_count, r.status, r.created_at
            FROM reservations r
            JOIN users u ON u.id = r.user_id
            JOIN books b ON b.id = r.book_id
            WHERE r.user_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Cancel an open reservation. Stock never moved when it was placed, so
    /// nothing is restocked here.
    pub async fn cancel(&self, id: i32) -> AppResult<Reservation> {
        let reservation = self.get_by_id(id).await?;

        match reservation.status {
            ReservationStatus::Pending | ReservationStatus::Approved => {}
            other => {
                return Err(AppError::BusinessRule(format!(
                    "Reservation is already {}",
                    other.as_str()
                )));
            }
        }

        let cancelled = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = 'cancelled' WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(cancelled)
    }

    /// Count open reservations (librarian dashboard)
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reservations WHERE status IN ('pending', 'approved')",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
