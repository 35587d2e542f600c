use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

use super::publish_date::PublishDate;
use crate::modules::scanner;

/// Column order of the persisted table. Existing files depend on it.
pub const CSV_HEADERS: [&str; 8] = [
    "ISBN-13",
    "ISBN-10",
    "Title",
    "Subtitle",
    "Author",
    "Publish Date",
    "URL",
    "Scanned Input",
];

/// Optional trailing column holding ", "-joined subject tags
pub const TAGS_COLUMN: &str = "Tags";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "ISBN-13", default)]
    pub isbn13: Option<String>,
    #[serde(rename = "ISBN-10", default)]
    pub isbn10: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Subtitle", default)]
    pub subtitle: Option<String>,
    #[serde(rename = "Author", default)]
    pub author: String,
    #[serde(rename = "Publish Date", default)]
    pub publish_date: String,
    #[serde(rename = "URL", default)]
    pub url: Option<String>,
    #[serde(rename = "Scanned Input", default)]
    pub scanned_input: String,
    /// Subject tags. Persisted only in files that carry a `Tags` column.
    #[serde(skip)]
    pub tags: Vec<String>,
    /// Genre labels from a catalog without subjects, used as tags when nothing better turns up
    #[serde(skip)]
    pub categories: Vec<String>,
    /// Values of unknown columns found in an existing file, keyed by header
    #[serde(skip)]
    pub extra_columns: BTreeMap<String, String>,
}

/// What makes two rows "the same book"
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordIdentity {
    Isbn13(String),
    Isbn10(String),
    TitleAuthor { title: String, author: String },
}

impl RecordIdentity {
    pub fn title_author(title: &str, author: &str) -> Self {
        RecordIdentity::TitleAuthor {
            title: normalize_text(title),
            author: normalize_text(author),
        }
    }
}

fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl BookRecord {
    /// ISBN-13 when known (directly or via a valid ISBN-10), then ISBN-10, then title and author.
    pub fn identity(&self) -> RecordIdentity {
        if let Some(isbn13) = self.isbn13.as_deref().filter(|s| !s.trim().is_empty()) {
            return RecordIdentity::Isbn13(scanner::compact(isbn13));
        }
        if let Some(isbn10) = self.isbn10.as_deref().filter(|s| !s.trim().is_empty()) {
            return match scanner::isbn10_to_isbn13(isbn10) {
                Some(isbn13) => RecordIdentity::Isbn13(isbn13),
                None => RecordIdentity::Isbn10(scanner::compact(isbn10)),
            };
        }
        RecordIdentity::title_author(&self.title, &self.author)
    }

    /// Lowercased final token of the author field, e.g. "kingfisher" for "T. Kingfisher"
    pub fn author_sort_name(&self) -> String {
        self.author
            .split_whitespace()
            .last()
            .map(|token| {
                token
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .unwrap_or_default()
    }

    pub fn parsed_publish_date(&self) -> PublishDate {
        PublishDate::parse(&self.publish_date)
    }

    /// True while a lower-priority catalog could still contribute something.
    pub fn has_gaps(&self) -> bool {
        self.tags.is_empty()
            || !present(&self.isbn13)
            || !present(&self.isbn10)
            || !present(&self.url)
            || self.publish_date.trim().is_empty()
    }

    /// Take `incoming` values wherever they are non-empty. Empty incoming fields leave data alone.
    pub fn overwrite_from(&mut self, incoming: &BookRecord) {
        overwrite_opt(&mut self.isbn13, &incoming.isbn13);
        overwrite_opt(&mut self.isbn10, &incoming.isbn10);
        overwrite_str(&mut self.title, &incoming.title);
        overwrite_opt(&mut self.subtitle, &incoming.subtitle);
        overwrite_str(&mut self.author, &incoming.author);
        overwrite_str(&mut self.publish_date, &incoming.publish_date);
        overwrite_opt(&mut self.url, &incoming.url);
        overwrite_str(&mut self.scanned_input, &incoming.scanned_input);
        self.add_tags(&incoming.tags);
    }

    /// Fill only the fields this record is missing. Returns whether anything changed.
    pub fn fill_gaps_from(&mut self, other: &BookRecord) -> bool {
        let before = self.clone();
        fill_opt(&mut self.isbn13, &other.isbn13);
        fill_opt(&mut self.isbn10, &other.isbn10);
        fill_str(&mut self.title, &other.title);
        fill_opt(&mut self.subtitle, &other.subtitle);
        fill_str(&mut self.author, &other.author);
        fill_str(&mut self.publish_date, &other.publish_date);
        fill_opt(&mut self.url, &other.url);
        fill_str(&mut self.scanned_input, &other.scanned_input);
        self.add_tags(&other.tags);
        if self.categories.is_empty() {
            self.categories.clone_from(&other.categories);
        }
        *self != before
    }

    /// Fall back to categories when no subject tags were found. Categories are consumed either way.
    pub fn adopt_categories(&mut self) {
        let categories = std::mem::take(&mut self.categories);
        if self.tags.is_empty() {
            self.add_tags(&categories);
        }
    }

    /// Append tags not already present (case-insensitive), keeping order.
    pub fn add_tags(&mut self, tags: &[String]) {
        for tag in tags {
            let tag = tag.trim();
            if tag.is_empty() {
                continue;
            }
            if !self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                self.tags.push(tag.to_string());
            }
        }
    }
}

fn overwrite_opt(target: &mut Option<String>, incoming: &Option<String>) {
    if present(incoming) {
        target.clone_from(incoming);
    }
}

fn overwrite_str(target: &mut String, incoming: &str) {
    if !incoming.trim().is_empty() {
        *target = incoming.to_string();
    }
}

fn fill_opt(target: &mut Option<String>, other: &Option<String>) {
    if !present(target) && present(other) {
        target.clone_from(other);
    }
}

fn fill_str(target: &mut String, other: &str) {
    if target.trim().is_empty() && !other.trim().is_empty() {
        *target = other.to_string();
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title: {}", self.title)?;
        if let Some(subtitle) = self.subtitle.as_deref().filter(|s| !s.is_empty()) {
            writeln!(f, "Subtitle: {}", subtitle)?;
        }
        writeln!(f, "Author: {}", self.author)?;
        write!(f, "Published: {}", self.publish_date)?;
        if let Some(url) = self.url.as_deref().filter(|s| !s.is_empty()) {
            write!(f, "\nURL: {}", url)?;
        }
        if !self.tags.is_empty() {
            write!(f, "\nTags: {}", self.tags.join(", "))?;
        }
        Ok(())
    }
}
