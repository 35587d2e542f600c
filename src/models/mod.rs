pub mod book;
pub mod publish_date;

pub use book::{BookRecord, CSV_HEADERS, RecordIdentity, TAGS_COLUMN};
pub use publish_date::{DateSortKey, PublishDate};
