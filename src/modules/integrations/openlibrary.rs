use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::{CatalogProvider, DomainError};
use crate::models::BookRecord;
use crate::modules::scanner;

pub const DEFAULT_BASE_URL: &str = "https://openlibrary.org";

#[derive(Debug, Deserialize)]
struct OpenLibraryResponse {
    #[serde(flatten)]
    books: HashMap<String, OpenLibraryBook>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    title: String,
    subtitle: Option<String>,
    authors: Option<Vec<Named>>,
    publish_date: Option<String>,
    url: Option<String>,
    identifiers: Option<OpenLibraryIdentifiers>,
    subjects: Option<Vec<Named>>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryIdentifiers {
    isbn_13: Option<Vec<String>>,
    isbn_10: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchResponse {
    docs: Vec<OpenLibrarySearchDoc>,
}

#[derive(Debug, Deserialize)]
struct OpenLibrarySearchDoc {
    key: Option<String>,
    title: String,
    subtitle: Option<String>,
    author_name: Option<Vec<String>>,
    first_publish_year: Option<i32>,
    isbn: Option<Vec<String>>,
    subject: Option<Vec<String>>,
}

const SEARCH_FIELDS: &str = "key,title,subtitle,author_name,first_publish_year,isbn,subject";

/// Open Library books and search APIs
pub struct OpenLibraryClient {
    client: reqwest::Client,
    base_url: String,
}

fn known_author(name: &str) -> bool {
    let n = name.trim();
    !n.is_empty() && !n.eq_ignore_ascii_case("unknown author") && !n.eq_ignore_ascii_case("unknown")
}

impl OpenLibraryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, DomainError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Failed to send request: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "Open Library API returned status: {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| {
                DomainError::External(format!("Failed to read response body: {}", e))
            })?;

        serde_json::from_str(&body)
            .map_err(|e| DomainError::External(format!("Failed to parse JSON: {}", e)))
    }

    pub async fn fetch_by_isbn(&self, isbn: &str) -> Result<Option<BookRecord>, DomainError> {
        let url = format!(
            "{}/api/books?bibkeys=ISBN:{}&format=json&jscmd=data",
            self.base_url,
            urlencoding::encode(isbn)
        );
        tracing::debug!("Open Library books query: {}", isbn);

        let mut parsed: OpenLibraryResponse = self.get_json(&url).await?;
        let key = format!("ISBN:{}", isbn);
        Ok(parsed.books.remove(&key).map(book_into_record))
    }

    pub async fn search(&self, title: &str, author: &str) -> Result<Option<BookRecord>, DomainError> {
        let mut url = format!(
            "{}/search.json?title={}&limit=1&fields={}",
            self.base_url,
            urlencoding::encode(title.trim()),
            SEARCH_FIELDS
        );
        if !author.trim().is_empty() {
            url.push_str(&format!("&author={}", urlencoding::encode(author.trim())));
        }
        tracing::debug!("Open Library search: title={} author={}", title, author);

        let parsed: OpenLibrarySearchResponse = self.get_json(&url).await?;
        Ok(parsed
            .docs
            .into_iter()
            .next()
            .map(|doc| self.doc_into_record(doc)))
    }

    fn doc_into_record(&self, doc: OpenLibrarySearchDoc) -> BookRecord {
        let isbns = doc.isbn.unwrap_or_default();
        let isbn13 = isbns
            .iter()
            .find(|i| scanner::is_valid_isbn13(i))
            .cloned();
        let isbn10 = isbns
            .iter()
            .find(|i| scanner::is_valid_isbn10(i))
            .cloned();

        let authors: Vec<String> = doc
            .author_name
            .unwrap_or_default()
            .into_iter()
            .filter(|name| known_author(name))
            .collect();

        BookRecord {
            isbn13,
            isbn10,
            title: doc.title,
            subtitle: doc.subtitle,
            author: authors.join(", "),
            publish_date: doc
                .first_publish_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
            url: doc.key.map(|key| format!("{}{}", self.base_url, key)),
            scanned_input: String::new(),
            tags: doc.subject.unwrap_or_default(),
            ..Default::default()
        }
    }
}

fn book_into_record(book: OpenLibraryBook) -> BookRecord {
    let first = |ids: Option<Vec<String>>| ids.and_then(|v| v.into_iter().next());
    let (isbn13, isbn10) = match book.identifiers {
        Some(ids) => (first(ids.isbn_13), first(ids.isbn_10)),
        None => (None, None),
    };

    let author = book
        .authors
        .unwrap_or_default()
        .into_iter()
        .map(|a| a.name)
        .filter(|name| known_author(name))
        .collect::<Vec<_>>()
        .join(", ");

    BookRecord {
        isbn13,
        isbn10,
        title: book.title,
        subtitle: book.subtitle,
        author,
        publish_date: book.publish_date.unwrap_or_default(),
        url: book.url,
        scanned_input: String::new(),
        tags: book
            .subjects
            .unwrap_or_default()
            .into_iter()
            .map(|s| s.name)
            .collect(),
        ..Default::default()
    }
}

#[async_trait]
impl CatalogProvider for OpenLibraryClient {
    fn name(&self) -> &str {
        "Open Library"
    }

    async fn lookup_by_isbn(&self, isbn: &str) -> Option<BookRecord> {
        match self.fetch_by_isbn(isbn).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Open Library lookup failed for {}: {}", isbn, e);
                None
            }
        }
    }

    async fn lookup_by_title_author(&self, title: &str, author: &str) -> Option<BookRecord> {
        match self.search(title, author).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "Open Library search failed for '{}' by '{}': {}",
                    title,
                    author,
                    e
                );
                None
            }
        }
    }
}
