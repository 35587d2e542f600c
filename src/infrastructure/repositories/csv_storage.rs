//! CSV and in-memory implementations of TableStorage

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, TableStorage};
use crate::models::{BookRecord, CSV_HEADERS, TAGS_COLUMN};

/// The persisted `books.csv` table
///
/// The fixed columns always come first. Any other columns found on load are
/// remembered and written back after them, so files carrying a `Tags` column
/// or other hand-added columns keep their data.
pub struct CsvFileStorage {
    path: PathBuf,
    extra_headers: Vec<String>,
}

impl CsvFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extra_headers: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Columns beyond the fixed header seen in the last loaded file
    pub fn extra_headers(&self) -> &[String] {
        &self.extra_headers
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "books.csv".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn row<'a>(&self, record: &'a BookRecord, tags: &'a str) -> Vec<&'a str> {
        let opt = |value: &'a Option<String>| value.as_deref().unwrap_or("");
        let mut row = vec![
            opt(&record.isbn13),
            opt(&record.isbn10),
            record.title.as_str(),
            opt(&record.subtitle),
            record.author.as_str(),
            record.publish_date.as_str(),
            opt(&record.url),
            record.scanned_input.as_str(),
        ];
        for header in &self.extra_headers {
            if header == TAGS_COLUMN {
                row.push(tags);
            } else {
                row.push(record.extra_columns.get(header).map_or("", String::as_str));
            }
        }
        row
    }
}

fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

impl TableStorage for CsvFileStorage {
    fn load(&mut self) -> Result<Vec<BookRecord>, DomainError> {
        self.extra_headers.clear();
        if !self.path.exists() {
            tracing::info!("{} not found, starting with an empty table", self.path.display());
            return Ok(Vec::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let headers = rdr.headers()?.clone();
        self.extra_headers = headers
            .iter()
            .filter(|h| !CSV_HEADERS.contains(h))
            .map(String::from)
            .collect();
        if !self.extra_headers.is_empty() {
            tracing::info!("Keeping extra columns: {}", self.extra_headers.join(", "));
        }

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result?;
            let mut record: BookRecord = row.deserialize(Some(&headers))?;
            for (header, value) in headers.iter().zip(row.iter()) {
                if CSV_HEADERS.contains(&header) {
                    continue;
                }
                if header == TAGS_COLUMN {
                    record.add_tags(&split_tags(value));
                } else {
                    record
                        .extra_columns
                        .insert(header.to_string(), value.to_string());
                }
            }
            records.push(record);
        }

        tracing::info!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Write the whole table to a sibling temp file, then rename it over the original.
    fn save(&mut self, records: &[BookRecord]) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        {
            let mut wtr = csv::WriterBuilder::new().from_path(&tmp)?;
            let mut header: Vec<&str> = CSV_HEADERS.to_vec();
            header.extend(self.extra_headers.iter().map(String::as_str));
            wtr.write_record(&header)?;
            for record in records {
                let tags = record.tags.join(", ");
                wtr.write_record(self.row(record, &tags))?;
            }
            wtr.flush()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// In-memory table, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    pub rows: Vec<BookRecord>,
    pub saves: usize,
}

impl MemoryStorage {
    pub fn new(rows: Vec<BookRecord>) -> Self {
        Self { rows, saves: 0 }
    }
}

impl TableStorage for MemoryStorage {
    fn load(&mut self) -> Result<Vec<BookRecord>, DomainError> {
        Ok(self.rows.clone())
    }

    fn save(&mut self, records: &[BookRecord]) -> Result<(), DomainError> {
        self.rows = records.to_vec();
        self.saves += 1;
        Ok(())
    }
}
