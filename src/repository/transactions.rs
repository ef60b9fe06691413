//! Transactions repository: loan issue/return flows and marketplace sales.
//!
//! Every flow that touches stock and writes a transaction row runs inside a
//! single database transaction, with a conditional UPDATE guarding the stock
//! counter so concurrent requests cannot oversubscribe a book.

use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::transaction::{fine_for, Transaction, TransactionDetails, TransactionStatus},
};

#[derive(Clone)]
pub struct TransactionsRepository {
    pool: Pool<Postgres>,
}

impl TransactionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Convert an open reservation into an issued loan.
    ///
    /// Takes one available copy, creates the loan with the given period and
    /// marks the reservation fulfilled. The stock decrement is conditional;
    /// if no copy is available nothing is written and the caller gets a
    /// business-rule error.
    pub async fn issue_from_reservation(
        &self,
        reservation_id: i32,
        loan_period_days: i64,
    ) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let reservation: Option<(i32, i32, String)> = sqlx::query_as(
            "SELECT user_id, book_id, status FROM reservations WHERE id = $1 FOR UPDATE",
        )
        .bind(reservation_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (user_id, book_id, status) = reservation.ok_or_else(|| {
            AppError::NotFound(format!("Reservation with id {} not found", reservation_id))
        })?;

        if status != "pending" && status != "approved" {
            return Err(AppError::BusinessRule(format!(
                "Reservation is already {}",
                status
            )));
        }

        let taken = sqlx::query(
            "UPDATE books SET available_count = available_count - 1
             WHERE id = $1 AND available_count >= 1",
        )
        .bind(book_id)
        .execute(&mut *tx)
        .await?;

        if taken.rows_affected() == 0 {
            return Err(AppError::BusinessRule(
                "No copies available to issue".to_string(),
            ));
        }

        let now = Utc::now();
        let due_date = now + Duration::days(loan_period_days);

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, book_id, issued_date, due_date, status, transaction_type)
            VALUES ($1, $2, $3, $4, 'issued', 'borrow')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(due_date)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE reservations SET status = 'fulfilled' WHERE id = $1")
            .bind(reservation_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(transaction)
    }

    /// Close an issued loan: record the return, compute the fine and put the
    /// copy back on the shelf. The restock is capped at quantity so repeated
    /// stock edits cannot inflate availability past the owned total.
    pub async fn confirm_return(&self, transaction_id: i32, daily_fine: f64) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let loan: Option<Transaction> = sqlx::query_as(
            "SELECT * FROM transactions WHERE id = $1 FOR UPDATE",
        )
        .bind(transaction_id)
        .fetch_optional(&mut *tx)
        .await?;

        let loan = loan.ok_or_else(|| {
            AppError::NotFound(format!("Transaction with id {} not found", transaction_id))
        })?;

        if loan.status != TransactionStatus::Issued {
            return Err(AppError::BusinessRule(format!(
                "Loan is already {}",
                loan.status.as_str()
            )));
        }

        let now = Utc::now();
        let fine = loan
            .due_date
            .map(|due| fine_for(due, now, daily_fine))
            .unwrap_or(0.0);

        let closed = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = 'returned', return_date = $1, fine_amount = $2
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(fine)
        .bind(transaction_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE books SET available_count = LEAST(available_count + 1, quantity)
             WHERE id = $1",
        )
        .bind(loan.book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(closed)
    }

    /// Buy one copy of a book: decrement stock, record a completed purchase
    /// and credit the seller's wallet when the book has one. Sold out books
    /// fail the conditional decrement and nothing is written.
    pub async fn purchase(&self, user_id: i32, book_id: i32) -> AppResult<Transaction> {
        let mut tx = self.pool.begin().await?;

        let book: Option<(f64, Option<i32>)> = sqlx::query_as(
            r#"
            UPDATE books
            SET quantity = quantity - 1,
                available_count = GREATEST(available_count - 1, 0)
            WHERE id = $1 AND quantity > 0
            RETURNING price, seller_id
            "#,
        )
        .bind(book_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (price, seller_id) = match book {
            Some(row) => row,
            None => {
                // No row updated: either the book is gone or the stock is empty
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
                        .bind(book_id)
                        .fetch_one(&mut *tx)
                        .await?;
                return if exists {
                    Err(AppError::BusinessRule("Book is sold out".to_string()))
                } else {
                    Err(AppError::NotFound(format!(
                        "Book with id {} not found",
                        book_id
                    )))
                };
            }
        };

        let now = Utc::now();
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions
                (user_id, book_id, issued_date, return_date, status, transaction_type, amount)
            VALUES ($1, $2, $3, $3, 'completed', 'purchase', $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(now)
        .bind(price)
        .fetch_one(&mut *tx)
        .await?;

        if let Some(seller) = seller_id {
            sqlx::query("UPDATE users SET wallet_balance = wallet_balance + $1 WHERE id = $2")
                .bind(price)
                .bind(seller)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(transaction)
    }

    /// A user's open loans with book titles
    pub async fn current_loans_for_user(&self, user_id: i32) -> AppResult<Vec<TransactionDetails>> {
        let loans = sqlx::query_as::<_, TransactionDetails>(
            r#"
            SELECT t.id, t.user_id, u.username, t.book_id, b.title AS book_title,
                   t.issued_date, t.due_date, t.return_date, t.status,
                   t.fine_amount, t.transaction_type, t.amount
            FROM transactions t
            JOIN users u ON u.id = t.user_id
            JOIN books b ON b.id = t.book_id
            WHERE t.user_id = $1 AND t.status = 'issued'
            ORDER BY t.due_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(loans)
    }

    /// A user's full borrowing and purchase history, newest first
    pub async fn history_for_user(&self, user_id: i32) -> AppResult<Vec<TransactionDetails>> {
        let rows = sqlx::query_as::<_, TransactionDetails>(
            r#"
            SELECT t.id, t.user_id, u.username, t.book_id, b.title AS book_title,
                   t.issued_date, t.due_date, t.return_date, t.status,
                   t.fine_amount, t.transaction_type, t.amount
            FROM transactions t
            JOIN users u ON u.id = t.user_id
            JOIN books b ON b.id = t.book_id
            WHERE t.user_id = $1
            ORDER BY t.issued_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Most recent transactions of any kind (admin dashboard)
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<TransactionDetails>> {
        let rows = sqlx::query_as::<_, TransactionDetails>(
            r#"
            SELECT t.id, t.user_id, u.username, t.book_id, b.title AS book_title,
                   t.issued_date, t.due_date, t.return_date, t.status,
                   t.fine_amount, t.transaction_type, t.amount
            FROM transactions t
            JOIN users u ON u.id = t.user_id
            JOIN books b ON b.id = t.book_id
            ORDER BY t.issued_date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// All completed sales with buyer names, newest first
    pub async fn sales(&self) -> AppResult<Vec<TransactionDetails>> {
        let rows = sqlx::query_as::<_, TransactionDetails>(
            r#"
            SELECT t.id, t.user_id, u.username, t.book_id, b.title AS book_title,
                   t.issued_date, t.due_date, t.return_date, t.status,
                   t.fine_amount, t.transaction_type, t.amount
            FROM transactions t
            JOIN users u ON u.id = t.user_id
            JOIN books b ON b.id = t.book_id
            WHERE t.transaction_type = 'purchase'
            ORDER BY t.issued_date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Revenue across all sales
    pub async fn sales_total(&self) -> AppResult<f64> {
        let total: Option<f64> = sqlx::query_scalar(
            "SELECT SUM(amount) FROM transactions WHERE transaction_type = 'purchase'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total.unwrap_or(0.0))
    }

    /// Count loans currently out
    pub async fn count_issued(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE status = 'issued'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count loans out past their due date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE status = 'issued' AND due_date < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
