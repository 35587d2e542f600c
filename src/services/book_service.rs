//! Catalog Service - the entry point the interactive session talks to
//!
//! Ties together input classification, catalog lookup and the record table.
//! Storage errors are the only errors returned; everything else is an outcome.

use crate::domain::{DomainError, TableStorage};
use crate::infrastructure::{BookTable, StoreResult};
use crate::models::{BookRecord, RecordIdentity};
use crate::modules::scanner::{self, ScanInput};
use crate::services::lookup_service::{LookupQuery, LookupResolver};

#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// The ISBN was already in the table; no catalog was queried
    AlreadyStored(BookRecord),
    Added(BookRecord),
    /// A lookup matched an existing row and refreshed it
    Updated(BookRecord),
    /// No catalog knew the book. The caller may retry with a title and author.
    NotFound,
    /// Free text was scanned; call [`CatalogService::lookup`] with a title and author
    NeedsAuthor(String),
}

impl ScanOutcome {
    /// Success signal for side effects such as a confirmation beep
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ScanOutcome::AlreadyStored(_) | ScanOutcome::Added(_) | ScanOutcome::Updated(_)
        )
    }

    pub fn record(&self) -> Option<&BookRecord> {
        match self {
            ScanOutcome::AlreadyStored(r) | ScanOutcome::Added(r) | ScanOutcome::Updated(r) => {
                Some(r)
            }
            ScanOutcome::NotFound | ScanOutcome::NeedsAuthor(_) => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    pub examined: usize,
    pub updated: usize,
}

pub struct CatalogService<S: TableStorage> {
    table: BookTable<S>,
    resolver: LookupResolver,
}

impl<S: TableStorage> CatalogService<S> {
    pub fn new(table: BookTable<S>, resolver: LookupResolver) -> Self {
        Self { table, resolver }
    }

    pub fn table(&self) -> &BookTable<S> {
        &self.table
    }

    /// Handle one line of scanned or typed input.
    pub async fn scan(&mut self, raw: &str) -> Result<ScanOutcome, DomainError> {
        let input = scanner::classify(raw);
        match LookupQuery::from_scan(&input) {
            Some(query) => self.lookup(query, raw).await,
            None => match input {
                ScanInput::Title(title) => Ok(ScanOutcome::NeedsAuthor(title)),
                _ => Ok(ScanOutcome::NotFound),
            },
        }
    }

    /// Resolve `query` against the catalogs and store the result.
    ///
    /// `scanned_input` is recorded verbatim on the stored row.
    pub async fn lookup(
        &mut self,
        query: LookupQuery,
        scanned_input: &str,
    ) -> Result<ScanOutcome, DomainError> {
        if let LookupQuery::Isbn { isbn, .. } = &query {
            let identity = RecordIdentity::Isbn13(isbn.clone());
            if let Some(existing) = self.table.find_existing(&identity) {
                tracing::info!("{} already in table", isbn);
                return Ok(ScanOutcome::AlreadyStored(existing.clone()));
            }
        }

        let Some(mut record) = self.resolver.resolve(&query).await else {
            return Ok(ScanOutcome::NotFound);
        };
        record.scanned_input = scanned_input.trim().to_string();
        if let LookupQuery::Isbn { isbn, .. } = &query
            && record.isbn13.as_deref().is_none_or(|s| s.trim().is_empty())
        {
            // Catalog omitted the identifier it was queried by
            record.isbn13 = Some(isbn.clone());
        }

        let identity = record.identity();
        let result = self.table.upsert(record)?;
        let stored = self
            .table
            .find_existing(&identity)
            .cloned()
            .ok_or_else(|| DomainError::Internal("upserted record missing".to_string()))?;

        Ok(match result {
            StoreResult::Inserted => ScanOutcome::Added(stored),
            StoreResult::Updated => ScanOutcome::Updated(stored),
        })
    }

    /// Re-query every row that carries an ISBN and fill whatever it is missing.
    ///
    /// The table is written once at the end, and only if something changed.
    pub async fn refresh(&mut self) -> Result<RefreshReport, DomainError> {
        let mut report = RefreshReport::default();
        let candidates: Vec<(RecordIdentity, LookupQuery)> = self
            .table
            .records()
            .iter()
            .filter_map(|r| refresh_query(r).map(|q| (r.identity(), q)))
            .collect();

        for (identity, query) in candidates {
            report.examined += 1;
            let Some(found) = self.resolver.resolve(&query).await else {
                continue;
            };
            if self.table.enrich(&identity, &found) {
                tracing::info!("Refreshed {:?}", identity);
                report.updated += 1;
            }
        }

        if report.updated > 0 {
            self.table.save()?;
        }
        Ok(report)
    }
}

fn refresh_query(record: &BookRecord) -> Option<LookupQuery> {
    let isbn13 = record.isbn13.as_deref().filter(|s| !s.trim().is_empty());
    let isbn10 = record.isbn10.as_deref().filter(|s| !s.trim().is_empty());
    match (isbn13, isbn10) {
        (Some(isbn13), isbn10) => Some(LookupQuery::Isbn {
            isbn: scanner::compact(isbn13),
            alternate: isbn10
                .map(scanner::compact)
                .or_else(|| scanner::isbn13_to_isbn10(isbn13)),
        }),
        (None, Some(isbn10)) => Some(LookupQuery::Isbn {
            isbn: scanner::isbn10_to_isbn13(isbn10).unwrap_or_else(|| scanner::compact(isbn10)),
            alternate: Some(scanner::compact(isbn10)),
        }),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogProvider;
    use crate::infrastructure::MemoryStorage;
    use async_trait::async_trait;

    struct OneBook(BookRecord);

    #[async_trait]
    impl CatalogProvider for OneBook {
        fn name(&self) -> &str {
            "one"
        }

        async fn lookup_by_isbn(&self, isbn: &str) -> Option<BookRecord> {
            (self.0.isbn13.as_deref() == Some(isbn)).then(|| self.0.clone())
        }

        async fn lookup_by_title_author(&self, title: &str, _author: &str) -> Option<BookRecord> {
            self.0.title.eq_ignore_ascii_case(title).then(|| self.0.clone())
        }
    }

    fn swordheart() -> BookRecord {
        BookRecord {
            isbn13: Some("9781250400222".to_string()),
            title: "Swordheart".to_string(),
            author: "T. Kingfisher".to_string(),
            publish_date: "2024-07-02".to_string(),
            ..Default::default()
        }
    }

    fn service(rows: Vec<BookRecord>) -> CatalogService<MemoryStorage> {
        let table = BookTable::open(MemoryStorage::new(rows)).unwrap();
        CatalogService::new(table, LookupResolver::new(vec![Box::new(OneBook(swordheart()))]))
    }

    #[tokio::test]
    async fn test_scan_adds_then_reports_existing() {
        let mut svc = service(vec![]);

        let first = svc.scan("978-1-250-40022-2").await.unwrap();
        assert!(matches!(first, ScanOutcome::Added(_)));
        assert_eq!(first.record().unwrap().scanned_input, "978-1-250-40022-2");

        let second = svc.scan("1250400228").await.unwrap();
        assert!(matches!(second, ScanOutcome::AlreadyStored(_)));
        assert!(second.is_success());
        assert_eq!(svc.table().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_title_needs_author() {
        let mut svc = service(vec![]);
        let outcome = svc.scan("Swordheart").await.unwrap();
        assert_eq!(outcome, ScanOutcome::NeedsAuthor("Swordheart".to_string()));
        assert!(!outcome.is_success());

        let outcome = svc
            .lookup(LookupQuery::title_author("Swordheart", "T. Kingfisher"), "Swordheart")
            .await
            .unwrap();
        assert!(matches!(outcome, ScanOutcome::Added(_)));
    }

    #[tokio::test]
    async fn test_scan_unknown_isbn_not_found() {
        let mut svc = service(vec![]);
        let outcome = svc.scan("9780593312070").await.unwrap();
        assert_eq!(outcome, ScanOutcome::NotFound);
        assert!(svc.table().is_empty());
        assert_eq!(svc.table().storage().saves, 0);
    }

    #[tokio::test]
    async fn test_title_lookup_updates_existing_isbn_row() {
        let mut stored = swordheart();
        stored.publish_date = String::new();
        let mut svc = service(vec![stored]);

        let outcome = svc
            .lookup(LookupQuery::title_author("swordheart", ""), "swordheart")
            .await
            .unwrap();
        assert!(matches!(outcome, ScanOutcome::Updated(_)));
        assert_eq!(outcome.record().unwrap().publish_date, "2024-07-02");
    }

    #[tokio::test]
    async fn test_refresh_fills_missing_fields() {
        let stored = BookRecord {
            isbn13: Some("9781250400222".to_string()),
            title: "Swordheart".to_string(),
            author: "T. Kingfisher".to_string(),
            publish_date: "2024".to_string(),
            ..Default::default()
        };
        let untouched = BookRecord {
            title: "No Identifier".to_string(),
            author: "Anon".to_string(),
            ..Default::default()
        };
        let mut svc = service(vec![stored, untouched]);

        let report = svc.refresh().await.unwrap();
        assert_eq!(
            report,
            RefreshReport {
                examined: 1,
                updated: 1
            }
        );
        assert_eq!(svc.table().storage().saves, 1);
        let refreshed = svc
            .table()
            .find_existing(&RecordIdentity::Isbn13("9781250400222".to_string()))
            .unwrap();
        assert_eq!(refreshed.publish_date, "2024-07-02");

        let again = svc.refresh().await.unwrap();
        assert_eq!(again.updated, 0);
        assert_eq!(svc.table().storage().saves, 1);
    }
}
