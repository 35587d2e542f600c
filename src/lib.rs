pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod modules;
pub mod services;

pub use infrastructure::config;
pub use modules::integrations::google_books;
pub use modules::integrations::openlibrary;
pub use modules::scanner;
