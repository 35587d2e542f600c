//! Infrastructure layer - I/O implementations
//!
//! This layer contains:
//! - Configuration loading (config)
//! - Record table and storage backends (repositories)
//! - Service wiring (state)

pub mod config;
pub mod repositories;
pub mod state;

pub use repositories::*;
pub use state::open_catalog;
