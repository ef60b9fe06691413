//! Catalog service: public landing page, browsing and librarian book management

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::{
            Book, BookQuery, BrowseResponse, CategoryShelf, CreateBook, LandingResponse,
            UpdateBook,
        },
        review::{CreateReview, Review, ReviewDetails},
    },
    repository::Repository,
};

const SHELF_SIZE: i64 = 10;
const SIMILAR_LIMIT: i64 = 6;

/// Book page payload: the book with its neighbours and reviews
#[derive(Debug, Serialize, ToSchema)]
pub struct BookDetails {
    pub book: Book,
    pub similar: Vec<Book>,
    pub reviews: Vec<ReviewDetails>,
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Public landing page collections
    pub async fn landing(&self) -> AppResult<LandingResponse> {
        let new_releases = self.repository.books.new_releases(SHELF_SIZE).await?;
        let top_rated = self.repository.books.top_rated(SHELF_SIZE).await?;
        let recommended = self.repository.books.random_sample(SHELF_SIZE).await?;
        let categories = self.repository.books.distinct_categories().await?;

        Ok(LandingResponse {
            new_releases,
            top_rated,
            recommended,
            categories,
        })
    }

    /// Browse the catalog. With no filters the response is grouped into one
    /// carousel per category; any filter switches to a flat result list.
    pub async fn browse(&self, query: &BookQuery) -> AppResult<BrowseResponse> {
        let categories = self.repository.books.distinct_categories().await?;

        if query.is_empty() {
            let mut shelves = Vec::with_capacity(categories.len());
            for category in &categories {
                let books = self.repository.books.by_category(category, SHELF_SIZE).await?;
                if !books.is_empty() {
                    shelves.push(CategoryShelf {
                        category: category.clone(),
                        books,
                    });
                }
            }
            return Ok(BrowseResponse {
                is_search: false,
                results: None,
                shelves: Some(shelves),
                categories,
            });
        }

        let results = self.repository.books.search(query).await?;
        Ok(BrowseResponse {
            is_search: true,
            results: Some(results),
            shelves: None,
            categories,
        })
    }

    /// A single book with similar titles and its reviews
    pub async fn book_details(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        let similar = self.repository.books.similar_to(&book, SIMILAR_LIMIT).await?;
        let reviews = self.repository.reviews.list_for_book(id).await?;

        Ok(BookDetails {
            book,
            similar,
            reviews,
        })
    }

    /// Full catalog for the librarian management view
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list_all().await
    }

    pub async fn create_book(&self, request: &CreateBook) -> AppResult<Book> {
        let book = self.repository.books.create(request).await?;
        tracing::info!(book_id = book.id, title = %book.title, "book added to catalog");
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, request: &UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, request).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "book removed from catalog");
        Ok(())
    }

    /// Attach a review to a book. Ratings are stored as given; the book's
    /// seeded average is not recomputed.
    pub async fn add_review(&self, user_id: i32, book_id: i32, request: &CreateReview) -> AppResult<Review> {
        // Ensure the book exists before writing the review
        self.repository.books.get_by_id(book_id).await?;
        self.repository
            .reviews
            .create(user_id, book_id, request.rating, request.comment.as_deref())
            .await
    }
}
