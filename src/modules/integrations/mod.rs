//! External catalog adapters
//!
//! Google Books is the preferred source; Open Library backfills subjects and
//! anything else Google leaves empty.

pub mod google_books;
pub mod openlibrary;

pub use google_books::GoogleBooksClient;
pub use openlibrary::OpenLibraryClient;

