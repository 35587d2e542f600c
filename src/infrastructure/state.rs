//! Wiring of the catalog service from configuration

use crate::domain::{CatalogProvider, DomainError};
use crate::infrastructure::config::Config;
use crate::infrastructure::{BookTable, CsvFileStorage};
use crate::modules::integrations::{GoogleBooksClient, OpenLibraryClient};
use crate::services::{CatalogService, LookupResolver};

/// Providers in precedence order: Google Books first, Open Library as backfill
pub fn default_providers(config: &Config) -> Result<Vec<Box<dyn CatalogProvider>>, DomainError> {
    let google = GoogleBooksClient::new(
        config.google_books_url.clone(),
        config.google_books_api_key.clone(),
        config.http_timeout,
    )
    .map_err(DomainError::Internal)?;
    let openlibrary = OpenLibraryClient::new(config.openlibrary_url.clone(), config.http_timeout)
        .map_err(DomainError::Internal)?;

    let providers: Vec<Box<dyn CatalogProvider>> = vec![Box::new(google), Box::new(openlibrary)];
    Ok(providers)
}

/// Load the CSV table named by `config` and attach the default providers
pub fn open_catalog(config: &Config) -> Result<CatalogService<CsvFileStorage>, DomainError> {
    let table = BookTable::open(CsvFileStorage::new(config.csv_path.clone()))?;
    let resolver = LookupResolver::new(default_providers(config)?);
    tracing::debug!("Catalogs in order: {}", resolver.provider_names().join(", "));
    Ok(CatalogService::new(table, resolver))
}
