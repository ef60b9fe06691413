//! Librarian endpoints: catalog management, the issue desk and the return desk

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, CreateBook, UpdateBook},
        reservation::{Reservation, ReservationDetails},
        transaction::{Transaction, TransactionDetails},
    },
    services::loans::LibrarianDashboard,
    AppState,
};

use super::AuthenticatedUser;

/// Return desk lookup request
#[derive(Deserialize, ToSchema)]
pub struct ReturnsLookupRequest {
    /// Borrower's username
    pub username: String,
}

/// Circulation counters for the librarian dashboard
#[utoipa::path(
    get,
    path = "/librarian/dashboard",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Librarian dashboard", body = LibrarianDashboard),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<LibrarianDashboard>> {
    claims.require_librarian()?;

    let dashboard = state.services.loans.librarian_dashboard().await?;
    Ok(Json(dashboard))
}

/// Full catalog listing for management
#[utoipa::path(
    get,
    path = "/librarian/books",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<Book>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    claims.require_librarian()?;

    let books = state.services.catalog.list_all().await?;
    Ok(Json(books))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/librarian/books",
    tag = "librarian",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid book data"),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    claims.require_librarian()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.create_book(&request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Edit a book; the stock change flows into the availability counter
#[utoipa::path(
    put,
    path = "/librarian/books/{id}",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid book data"),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<Book>> {
    claims.require_librarian()?;
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.update_book(id, &request).await?;
    Ok(Json(book))
}

/// Remove a book from the catalog
#[utoipa::path(
    delete,
    path = "/librarian/books/{id}",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Copies are out on loan")
    )
)]
pub async fn delete_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_librarian()?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Open reservation queue
#[utoipa::path(
    get,
    path = "/librarian/reservations",
    tag = "librarian",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Open reservations", body = Vec<ReservationDetails>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<ReservationDetails>>> {
    claims.require_librarian()?;

    let reservations = state.services.loans.open_reservations().await?;
    Ok(Json(reservations))
}

/// Issue a loan against a reservation
#[utoipa::path(
    post,
    path = "/librarian/reservations/{id}/issue",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    responses(
        (status = 201, description = "Loan issued", body = Transaction),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "No copies available")
    )
)]
pub async fn issue_loan(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    claims.require_librarian()?;

    let loan = state.services.loans.issue(id).await?;
    Ok((StatusCode::CREATED, Json(loan)))
}

/// Cancel an open reservation
#[utoipa::path(
    post,
    path = "/librarian/reservations/{id}/cancel",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Reservation ID")
    ),
    responses(
        (status = 200, description = "Reservation cancelled", body = Reservation),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Reservation not found"),
        (status = 422, description = "Reservation already closed")
    )
)]
pub async fn cancel_reservation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Reservation>> {
    claims.require_librarian()?;

    let cancelled = state.services.loans.cancel(id).await?;
    Ok(Json(cancelled))
}

/// Return desk: look up a borrower's open loans by username
#[utoipa::path(
    post,
    path = "/librarian/returns",
    tag = "librarian",
    security(("bearer_auth" = [])),
    request_body = ReturnsLookupRequest,
    responses(
        (status = 200, description = "Borrower's open loans", body = Vec<TransactionDetails>),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn lookup_returns(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<ReturnsLookupRequest>,
) -> AppResult<Json<Vec<TransactionDetails>>> {
    claims.require_librarian()?;

    let loans = state.services.loans.returns_for(&request.username).await?;
    Ok(Json(loans))
}

/// Confirm a return and settle any fine
#[utoipa::path(
    post,
    path = "/librarian/returns/{transaction_id}/confirm",
    tag = "librarian",
    security(("bearer_auth" = [])),
    params(
        ("transaction_id" = i32, Path, description = "Loan transaction ID")
    ),
    responses(
        (status = 200, description = "Return confirmed", body = Transaction),
        (status = 403, description = "Librarian privileges required"),
        (status = 404, description = "Transaction not found"),
        (status = 422, description = "Loan already closed")
    )
)]
pub async fn confirm_return(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(transaction_id): Path<i32>,
) -> AppResult<Json<Transaction>> {
    claims.require_librarian()?;

    let closed = state.services.loans.confirm_return(transaction_id).await?;
    Ok(Json(closed))
}
