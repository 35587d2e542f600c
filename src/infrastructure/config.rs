use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::modules::integrations::{google_books, openlibrary};

const API_KEY_FILE: &str = "googleapi.key";

#[derive(Clone, Debug)]
pub struct Config {
    pub csv_path: PathBuf,
    pub google_books_url: String,
    pub google_books_api_key: Option<String>,
    pub openlibrary_url: String,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let google_books_api_key = env::var("GOOGLE_BOOKS_API_KEY")
            .ok()
            .or_else(|| std::fs::read_to_string(API_KEY_FILE).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Self {
            csv_path: env::var("BOOKSCAN_CSV")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("books.csv")),
            google_books_url: env::var("GOOGLE_BOOKS_URL")
                .unwrap_or_else(|_| google_books::DEFAULT_BASE_URL.to_string()),
            google_books_api_key,
            openlibrary_url: env::var("OPENLIBRARY_URL")
                .unwrap_or_else(|_| openlibrary::DEFAULT_BASE_URL.to_string()),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}
