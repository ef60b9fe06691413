//! Member endpoints: browsing, reservations, purchases, reviews and selling

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookQuery, BrowseResponse, CreateListing},
        reservation::Reservation,
        review::{CreateReview, Review},
        transaction::Transaction,
    },
    services::catalog::BookDetails,
    services::loans::UserDashboard,
    AppState,
};

use super::AuthenticatedUser;

/// Borrower dashboard: open loans, reservations and history
#[utoipa::path(
    get,
    path = "/user/dashboard",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Member dashboard", body = UserDashboard),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<UserDashboard>> {
    let dashboard = state.services.loans.user_dashboard(claims.user_id).await?;
    Ok(Json(dashboard))
}

/// Browse the catalog: category carousels by default, flat results when filtered
#[utoipa::path(
    get,
    path = "/user/books",
    tag = "user",
    security(("bearer_auth" = [])),
    params(BookQuery),
    responses(
        (status = 200, description = "Catalog browse results", body = BrowseResponse)
    )
)]
pub async fn browse_books(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<BrowseResponse>> {
    let response = state.services.catalog.browse(&query).await?;
    Ok(Json(response))
}

/// Book page: the book, similar titles and reviews
#[utoipa::path(
    get,
    path = "/user/books/{id}",
    tag = "user",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_details(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetails>> {
    let details = state.services.catalog.book_details(id).await?;
    Ok(Json(details))
}

/// Reserve a book for borrowing
#[utoipa::path(
    post,
    path = "/user/books/{id}/reserve",
    tag = "user",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Reservation placed", body = Reservation),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Already reserved")
    )
)]
pub async fn reserve_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    let reservation = state.services.loans.reserve(claims.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// Buy one copy of a book
#[utoipa::path(
    post,
    path = "/user/books/{id}/buy",
    tag = "user",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 201, description = "Purchase completed", body = Transaction),
        (status = 404, description = "Book not found"),
        (status = 422, description = "Book is sold out")
    )
)]
pub async fn buy_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let sale = state.services.marketplace.buy(claims.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

/// Review a book
#[utoipa::path(
    post,
    path = "/user/books/{id}/reviews",
    tag = "user",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = CreateReview,
    responses(
        (status = 201, description = "Review recorded", body = Review),
        (status = 400, description = "Invalid rating"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn create_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<CreateReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let review = state.services.catalog.add_review(claims.user_id, id, &request).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

/// List a book for sale on the marketplace
#[utoipa::path(
    post,
    path = "/user/sell",
    tag = "user",
    security(("bearer_auth" = [])),
    request_body = CreateListing,
    responses(
        (status = 201, description = "Listing created", body = Book),
        (status = 400, description = "Invalid listing data")
    )
)]
pub async fn sell_book(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateListing>,
) -> AppResult<(StatusCode, Json<Book>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.marketplace.sell(claims.user_id, &request).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// The caller's own marketplace listings
#[utoipa::path(
    get,
    path = "/user/listings",
    tag = "user",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own listings", body = Vec<Book>)
    )
)]
pub async fn my_listings(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Book>>> {
    let listings = state.services.marketplace.my_listings(claims.user_id).await?;
    Ok(Json(listings))
}
