//! Services Layer
//!
//! Catalog lookup and merge, plus the session-facing catalog service.

pub mod book_service;
pub mod lookup_service;

pub use book_service::{CatalogService, RefreshReport, ScanOutcome};
pub use lookup_service::{LookupQuery, LookupResolver, merge};
