//! Loan lifecycle service: reservations, issuing, returns and dashboards

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    models::{
        reservation::{Reservation, ReservationDetails, ReservationStatus},
        transaction::{Transaction, TransactionDetails},
    },
    repository::Repository,
};

const LOW_STOCK_THRESHOLD: i32 = 2;

/// Borrower dashboard: open loans, reservations and history
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDashboard {
    pub current_loans: Vec<TransactionDetails>,
    pub reservations: Vec<ReservationDetails>,
    pub history: Vec<TransactionDetails>,
}

/// Circulation counters for the librarian dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct LibrarianDashboard {
    pub total_books: i64,
    pub books_issued: i64,
    pub open_reservations: i64,
    pub overdue_loans: i64,
    pub low_stock_books: i64,
}

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    config: Arc<AppConfig>,
}

impl LoansService {
    pub fn new(repository: Repository, config: Arc<AppConfig>) -> Self {
        Self { repository, config }
    }

    /// Place a reservation. In-stock books get an approved reservation
    /// awaiting pickup; out-of-stock books get a pending one. Stock does not
    /// move until a librarian issues the loan.
    pub async fn reserve(&self, user_id: i32, book_id: i32) -> AppResult<Reservation> {
        let book = self.repository.books.get_by_id(book_id).await?;

        if self.repository.reservations.has_pending(user_id, book_id).await? {
            return Err(AppError::Conflict(
                "You already have a pending reservation for this book".to_string(),
            ));
        }

        let status = if book.available_count < 1 {
            ReservationStatus::Pending
        } else {
            ReservationStatus::Approved
        };

        let reservation = self.repository.reservations.create(user_id, book_id, status).await?;
        tracing::info!(user_id, book_id, status = status.as_str(), "reservation placed");
        Ok(reservation)
    }

    /// Open reservation queue for the issue desk
    pub async fn open_reservations(&self) -> AppResult<Vec<ReservationDetails>> {
        self.repository.reservations.list_open().await
    }

    /// Issue a loan against a reservation
    pub async fn issue(&self, reservation_id: i32) -> AppResult<Transaction> {
        let loan = self
            .repository
            .transactions
            .issue_from_reservation(reservation_id, self.config.loans.loan_period_days)
            .await?;
        tracing::info!(
            transaction_id = loan.id,
            user_id = loan.user_id,
            book_id = loan.book_id,
            "loan issued"
        );
        Ok(loan)
    }

    /// Cancel an open reservation
    pub async fn cancel(&self, reservation_id: i32) -> AppResult<Reservation> {
        let cancelled = self.repository.reservations.cancel(reservation_id).await?;
        tracing::info!(reservation_id, "reservation cancelled");
        Ok(cancelled)
    }

    /// Return desk lookup: a borrower's open loans by username. An unknown
    /// username is an error; a known borrower with nothing out gets an
    /// empty list.
    pub async fn returns_for(&self, username: &str) -> AppResult<Vec<TransactionDetails>> {
        let borrower = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

        self.repository.transactions.current_loans_for_user(borrower.id).await
    }

    /// Confirm a return and settle the fine
    pub async fn confirm_return(&self, transaction_id: i32) -> AppResult<Transaction> {
        let closed = self
            .repository
            .transactions
            .confirm_return(transaction_id, self.config.loans.daily_fine)
            .await?;
        tracing::info!(
            transaction_id,
            fine = closed.fine_amount,
            "loan returned"
        );
        Ok(closed)
    }

    /// Borrower's own dashboard
    pub async fn user_dashboard(&self, user_id: i32) -> AppResult<UserDashboard> {
        let current_loans = self.repository.transactions.current_loans_for_user(user_id).await?;
        let reservations = self.repository.reservations.for_user(user_id).await?;
        let history = self.repository.transactions.history_for_user(user_id).await?;

        Ok(UserDashboard {
            current_loans,
            reservations,
            history,
        })
    }

    /// Circulation counters for librarians
    pub async fn librarian_dashboard(&self) -> AppResult<LibrarianDashboard> {
        let total_books = self.repository.books.count().await?;
        let books_issued = self.repository.transactions.count_issued().await?;
        let open_reservations = self.repository.reservations.count_open().await?;
        let overdue_loans = self.repository.transactions.count_overdue().await?;
        let low_stock_books = self.repository.books.count_low_stock(LOW_STOCK_THRESHOLD).await?;

        Ok(LibrarianDashboard {
            total_books,
            books_issued,
            open_reservations,
            overdue_loans,
            low_stock_books,
        })
    }
}
