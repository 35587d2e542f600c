//! Storage trait definitions
//!
//! The record table only ever reads everything and writes everything, so the
//! backend contract is two calls. Implementations live in the infrastructure layer.

use super::DomainError;
use crate::models::BookRecord;

/// Whole-table persistence backend for [`BookRecord`] rows
pub trait TableStorage {
    /// Read every stored row, in file order.
    ///
    /// A backend with nothing stored yet returns an empty table, not an error.
    /// Backends may remember layout details of what they read for the next save.
    fn load(&mut self) -> Result<Vec<BookRecord>, DomainError>;

    /// Replace the stored table with `records`
    fn save(&mut self, records: &[BookRecord]) -> Result<(), DomainError>;
}
