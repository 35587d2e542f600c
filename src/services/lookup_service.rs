//! Lookup Service - ordered catalog providers and the merge policy
//!
//! Providers are queried in precedence order. The first record found is the
//! base; later providers only fill what the base left empty, plus tags. A later
//! provider is skipped once the merged record has no gaps left. Missing subject
//! tags count as a gap, so a catalog that only has genre categories never stops
//! the search for subjects.

use crate::domain::CatalogProvider;
use crate::models::BookRecord;
use crate::modules::scanner::{self, ScanInput};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupQuery {
    /// `alternate` is tried against a provider when `isbn` finds nothing there
    Isbn {
        isbn: String,
        alternate: Option<String>,
    },
    TitleAuthor {
        title: String,
        author: String,
    },
}

impl LookupQuery {
    /// ISBN inputs map straight to a query. Titles need an author first, so they yield `None`.
    pub fn from_scan(input: &ScanInput) -> Option<Self> {
        match input {
            ScanInput::Isbn13(isbn13) => Some(LookupQuery::Isbn {
                isbn: isbn13.clone(),
                alternate: scanner::isbn13_to_isbn10(isbn13),
            }),
            ScanInput::Isbn10 { isbn10, isbn13 } => Some(LookupQuery::Isbn {
                isbn: isbn13.clone(),
                alternate: Some(isbn10.clone()),
            }),
            ScanInput::Title(_) => None,
        }
    }

    pub fn title_author(title: impl Into<String>, author: impl Into<String>) -> Self {
        LookupQuery::TitleAuthor {
            title: title.into(),
            author: author.into(),
        }
    }
}

/// Combine candidates given in precedence order. `None` when there are none.
pub fn merge(candidates: impl IntoIterator<Item = BookRecord>) -> Option<BookRecord> {
    candidates.into_iter().fold(None, |merged, candidate| {
        Some(match merged {
            None => candidate,
            Some(mut base) => {
                base.fill_gaps_from(&candidate);
                base
            }
        })
    })
}

pub struct LookupResolver {
    providers: Vec<Box<dyn CatalogProvider>>,
}

impl LookupResolver {
    pub fn new(providers: Vec<Box<dyn CatalogProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn resolve(&self, query: &LookupQuery) -> Option<BookRecord> {
        let mut merged: Option<BookRecord> = None;

        for provider in &self.providers {
            if merged.as_ref().is_some_and(|m| !m.has_gaps()) {
                break;
            }

            let Some(candidate) = query_provider(provider.as_ref(), query).await else {
                tracing::debug!("{}: no result for {:?}", provider.name(), query);
                continue;
            };
            tracing::debug!("{}: found '{}'", provider.name(), candidate.title);

            merged = merge(merged.into_iter().chain(std::iter::once(candidate)));
        }

        match merged.as_mut() {
            Some(record) => record.adopt_categories(),
            None => tracing::info!("No catalog returned a record for {:?}", query),
        }
        merged
    }
}

async fn query_provider(provider: &dyn CatalogProvider, query: &LookupQuery) -> Option<BookRecord> {
    match query {
        LookupQuery::Isbn { isbn, alternate } => {
            if let Some(record) = provider.lookup_by_isbn(isbn).await {
                return Some(record);
            }
            match alternate {
                Some(alt) => provider.lookup_by_isbn(alt).await,
                None => None,
            }
        }
        LookupQuery::TitleAuthor { title, author } => {
            provider.lookup_by_title_author(title, author).await
        }
    }
}
