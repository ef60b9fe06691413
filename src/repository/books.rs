//! Books repository for catalog and stock operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, CreateListing, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// List the whole catalog (librarian management view)
    pub async fn list_all(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Create a library-owned book; all copies start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, isbn, category, language, publication_year,
                publisher, description, cover_image, quantity, available_count,
                price, pages
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(&book.language)
        .bind(book.publication_year)
        .bind(&book.publisher)
        .bind(&book.description)
        .bind(&book.cover_image)
        .bind(book.quantity)
        .bind(book.price.unwrap_or(0.0))
        .bind(book.pages)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Create a single-copy marketplace listing owned by a seller
    pub async fn create_listing(
        &self,
        seller_id: i32,
        listing: &CreateListing,
        cover_image: Option<&str>,
    ) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                title, author, isbn, category, description, cover_image,
                price, seller_id, quantity, available_count
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 1, 1)
            RETURNING *
            "#,
        )
        .bind(&listing.title)
        .bind(&listing.author)
        .bind(&listing.isbn)
        .bind(&listing.category)
        .bind(&listing.description)
        .bind(cover_image)
        .bind(listing.price)
        .bind(seller_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book. The availability delta is derived from the quantity
    /// change in a single statement; the result is floored at zero so a
    /// shrinking stock can never drive available_count negative.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let updated = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $1,
                author = $2,
                isbn = $3,
                category = $4,
                description = $5,
                price = COALESCE($6, price),
                available_count = GREATEST(available_count + ($7 - quantity), 0),
                quantity = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.category)
        .bind(&book.description)
        .bind(book.price)
        .bind(book.quantity)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))?;

        Ok(updated)
    }

    /// Delete a book. Refused while a copy is out on loan; dependent
    /// reservations and reviews cascade, transaction history cascades with
    /// the row (storage referential policy).
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let active_loans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE book_id = $1 AND status = 'issued'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if active_loans > 0 {
            return Err(AppError::BusinessRule(
                "Book has copies out on loan and cannot be deleted".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Ok(())
    }

    /// Flat search: title/author substring and exact category
    pub async fn search(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        let mut conditions = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(ref q) = query.q {
            if !q.is_empty() {
                params.push(format!("%{}%", q.to_lowercase()));
                conditions.push(format!(
                    "(LOWER(title) LIKE ${0} OR LOWER(author) LIKE ${0})",
                    params.len()
                ));
            }
        }

        if let Some(ref category) = query.category {
            if !category.is_empty() {
                params.push(category.clone());
                conditions.push(format!("category = ${}", params.len()));
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!("SELECT * FROM books {} ORDER BY title", where_clause);

        let mut builder = sqlx::query_as::<_, Book>(&sql);
        for param in &params {
            builder = builder.bind(param);
        }
        let books = builder.fetch_all(&self.pool).await?;

        Ok(books)
    }

    /// Up to `limit` books in one category (browse carousels)
    pub async fn by_category(&self, category: &str, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE category = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Distinct category facets
    pub async fn distinct_categories(&self) -> AppResult<Vec<String>> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM books WHERE category IS NOT NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    /// Most recently added books
    pub async fn new_releases(&self, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Best rated books
    pub async fn top_rated(&self, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY average_rating DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Random sample for the "recommended" shelf
    pub async fn random_sample(&self, limit: i64) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books ORDER BY RANDOM() LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Books in the same category, excluding the book itself; falls back to
    /// a random pick when the category has nothing else to offer
    pub async fn similar_to(&self, book: &Book, limit: i64) -> AppResult<Vec<Book>> {
        let similar = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE category = $1 AND id != $2 LIMIT $3",
        )
        .bind(&book.category)
        .bind(book.id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        if !similar.is_empty() {
            return Ok(similar);
        }

        let fallback = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE id != $1 ORDER BY RANDOM() LIMIT $2",
        )
        .bind(book.id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(fallback)
    }

    /// A seller's marketplace listings
    pub async fn listings_by_seller(&self, seller_id: i32) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE seller_id = $1 ORDER BY created_at DESC",
        )
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Count books running low on available copies
    pub async fn count_low_stock(&self, threshold: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE available_count < $1")
                .bind(threshold)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
