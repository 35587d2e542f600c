//! Catalog provider contract
//!
//! Every external catalog answers the same two questions. Providers swallow
//! their own transport failures: `None` means "this source has nothing", whatever
//! the reason, and the resolver simply moves on to the next source.

use async_trait::async_trait;

use crate::models::BookRecord;

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Human readable source name, used in logs
    fn name(&self) -> &str;

    /// Look up a single edition by ISBN (10 or 13 digits)
    async fn lookup_by_isbn(&self, isbn: &str) -> Option<BookRecord>;

    /// Best match for a title and author pair
    async fn lookup_by_title_author(&self, title: &str, author: &str) -> Option<BookRecord>;
}
