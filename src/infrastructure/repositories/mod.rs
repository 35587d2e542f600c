//! Record table and its storage backends

pub mod book_table;
pub mod csv_storage;

pub use book_table::{BookTable, StoreResult, sort_records};
pub use csv_storage::{CsvFileStorage, MemoryStorage};
