//! Marketplace service: peer-to-peer listings, purchases and seller wallets

use crate::{
    error::AppResult,
    models::{
        book::{Book, CreateListing},
        transaction::Transaction,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MarketplaceService {
    repository: Repository,
}

impl MarketplaceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List a book for sale. Listings are single-copy and owned by the
    /// seller; a cover is derived from the ISBN when one is given.
    pub async fn sell(&self, seller_id: i32, listing: &CreateListing) -> AppResult<Book> {
        let cover_image = listing.isbn.as_deref().map(openlibrary_cover_url);

        let book = self
            .repository
            .books
            .create_listing(seller_id, listing, cover_image.as_deref())
            .await?;

        tracing::info!(book_id = book.id, seller_id, "listing created");
        Ok(book)
    }

    /// Buy one copy. Stock moves atomically and the sale price is credited
    /// to the seller's wallet when the book has one; library-owned books
    /// have no seller and the proceeds go nowhere.
    pub async fn buy(&self, buyer_id: i32, book_id: i32) -> AppResult<Transaction> {
        let sale = self.repository.transactions.purchase(buyer_id, book_id).await?;
        tracing::info!(
            transaction_id = sale.id,
            buyer_id,
            book_id,
            amount = sale.amount,
            "book sold"
        );
        Ok(sale)
    }

    /// The caller's own listings
    pub async fn my_listings(&self, seller_id: i32) -> AppResult<Vec<Book>> {
        self.repository.books.listings_by_seller(seller_id).await
    }
}

/// Open Library serves covers keyed by ISBN
fn openlibrary_cover_url(isbn: &str) -> String {
    format!("https://covers.openlibrary.org/b/isbn/{}-L.jpg", isbn.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_url_from_isbn() {
        assert_eq!(
            openlibrary_cover_url(" 9780441172719 "),
            "https://covers.openlibrary.org/b/isbn/9780441172719-L.jpg"
        );
    }
}
