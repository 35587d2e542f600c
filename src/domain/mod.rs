//! Domain layer - Pure business abstractions
//!
//! This layer contains NO I/O: only trait definitions and domain error types.

pub mod catalog;
pub mod errors;
pub mod repositories;

pub use catalog::CatalogProvider;
pub use errors::DomainError;
pub use repositories::*;
