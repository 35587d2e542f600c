use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::domain::{CatalogProvider, DomainError};
use crate::models::BookRecord;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

#[derive(Debug, Deserialize)]
struct GoogleBooksResponse {
    items: Option<Vec<GoogleBookItem>>,
}

#[derive(Debug, Deserialize)]
struct GoogleBookItem {
    #[serde(rename = "volumeInfo")]
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVolumeInfo {
    title: Option<String>,
    subtitle: Option<String>,
    authors: Option<Vec<String>>,
    published_date: Option<String>,
    info_link: Option<String>,
    industry_identifiers: Option<Vec<IndustryIdentifier>>,
    categories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct IndustryIdentifier {
    #[serde(rename = "type")]
    kind: String,
    identifier: String,
}

/// Google Books volumes API
pub struct GoogleBooksClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build client: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Run a volumes query and map the first hit. `q` must already be URL encoded.
    async fn fetch_first_volume(&self, q: &str) -> Result<Option<BookRecord>, DomainError> {
        let mut url = format!("{}/volumes?q={}&maxResults=1", self.base_url, q);
        if let Some(key) = &self.api_key {
            url.push_str(&format!("&key={}", urlencoding::encode(key)));
        }

        tracing::debug!("Google Books query: q={}", q);

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("Failed to send request: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "Google Books API returned status: {}",
                resp.status()
            )));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| {
                DomainError::External(format!("Failed to read response body: {}", e))
            })?;

        let parsed: GoogleBooksResponse = serde_json::from_str(&body)
            .map_err(|e| DomainError::External(format!("Failed to parse JSON: {}", e)))?;

        Ok(parsed
            .items
            .and_then(|items| items.into_iter().next())
            .and_then(|item| into_record(item.volume_info)))
    }
}

fn into_record(info: GoogleVolumeInfo) -> Option<BookRecord> {
    let title = info.title.filter(|t| !t.trim().is_empty())?;

    let identifiers = info.industry_identifiers.unwrap_or_default();
    let identifier = |kind: &str| {
        identifiers
            .iter()
            .find(|id| id.kind == kind)
            .map(|id| id.identifier.clone())
    };

    Some(BookRecord {
        isbn13: identifier("ISBN_13"),
        isbn10: identifier("ISBN_10"),
        title,
        subtitle: info.subtitle,
        author: info.authors.unwrap_or_default().join(", "),
        publish_date: info.published_date.unwrap_or_default(),
        // Google Books returns http links often, upgrade to https
        url: info.info_link.map(|link| link.replacen("http://", "https://", 1)),
        scanned_input: String::new(),
        // not subjects, only adopted as tags when no catalog has any
        categories: info.categories.unwrap_or_default(),
        ..Default::default()
    })
}

#[async_trait]
impl CatalogProvider for GoogleBooksClient {
    fn name(&self) -> &str {
        "Google Books"
    }

    async fn lookup_by_isbn(&self, isbn: &str) -> Option<BookRecord> {
        let q = format!("isbn:{}", urlencoding::encode(isbn));
        match self.fetch_first_volume(&q).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Google Books lookup failed for {}: {}", isbn, e);
                None
            }
        }
    }

    async fn lookup_by_title_author(&self, title: &str, author: &str) -> Option<BookRecord> {
        let mut q = format!("intitle:{}", urlencoding::encode(title.trim()));
        if !author.trim().is_empty() {
            q.push_str(&format!("+inauthor:{}", urlencoding::encode(author.trim())));
        }
        match self.fetch_first_volume(&q).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(
                    "Google Books search failed for '{}' by '{}': {}",
                    title,
                    author,
                    e
                );
                None
            }
        }
    }
}
