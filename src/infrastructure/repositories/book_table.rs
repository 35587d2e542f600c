//! The record table: identity lookup, upsert and display order over a TableStorage

use crate::domain::{DomainError, TableStorage};
use crate::models::{BookRecord, RecordIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreResult {
    Inserted,
    Updated,
}

/// Loaded once, mutated in memory, written back whole after every change.
///
/// Rows are kept in insertion order; callers who need display order ask for
/// [`BookTable::all_records_sorted`].
pub struct BookTable<S: TableStorage> {
    storage: S,
    records: Vec<BookRecord>,
}

impl<S: TableStorage> BookTable<S> {
    pub fn open(mut storage: S) -> Result<Self, DomainError> {
        let records = storage.load()?;
        Ok(Self { storage, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    fn position(&self, identity: &RecordIdentity) -> Option<usize> {
        self.records.iter().position(|r| &r.identity() == identity)
    }

    pub fn find_existing(&self, identity: &RecordIdentity) -> Option<&BookRecord> {
        self.position(identity).map(|i| &self.records[i])
    }

    /// Insert `record`, or merge it into the row with the same identity, then persist.
    pub fn upsert(&mut self, record: BookRecord) -> Result<StoreResult, DomainError> {
        let identity = record.identity();
        let result = match self.position(&identity) {
            Some(i) => {
                self.records[i].overwrite_from(&record);
                StoreResult::Updated
            }
            None => {
                self.records.push(record);
                StoreResult::Inserted
            }
        };

        self.save()?;
        tracing::info!("{:?} record {:?} ({} rows)", result, identity, self.records.len());
        Ok(result)
    }

    fn identity_taken(&self, identity: &RecordIdentity, except: usize) -> bool {
        self.records
            .iter()
            .enumerate()
            .any(|(j, r)| j != except && &r.identity() == identity)
    }

    /// Fill empty fields of the row matching `identity` from `incoming`, without persisting.
    ///
    /// A publish date is also replaced when the incoming one is more precise.
    /// Identifiers are left alone when filling them would give the row the
    /// identity of another row.
    pub fn enrich(&mut self, identity: &RecordIdentity, incoming: &BookRecord) -> bool {
        let Some(i) = self.position(identity) else {
            return false;
        };
        let mut candidate = self.records[i].clone();
        candidate.fill_gaps_from(incoming);

        let new_identity = candidate.identity();
        if &new_identity != identity && self.identity_taken(&new_identity, i) {
            tracing::warn!(
                "Not giving {:?} the identifiers of another row ({:?})",
                identity,
                new_identity
            );
            candidate.isbn13.clone_from(&self.records[i].isbn13);
            candidate.isbn10.clone_from(&self.records[i].isbn10);
            let fallback = candidate.identity();
            if &fallback != identity && self.identity_taken(&fallback, i) {
                return false;
            }
        }

        if incoming.parsed_publish_date().precision() > candidate.parsed_publish_date().precision() {
            tracing::debug!(
                "Publish date upgraded: {} -> {}",
                candidate.publish_date,
                incoming.publish_date
            );
            candidate.publish_date = incoming.publish_date.clone();
        }

        let changed = candidate != self.records[i];
        self.records[i] = candidate;
        changed
    }

    pub fn all_records_sorted(&self) -> Vec<BookRecord> {
        let mut sorted = self.records.clone();
        sort_records(&mut sorted);
        sorted
    }

    /// Rewrite the whole table, in display order.
    pub fn save(&mut self) -> Result<(), DomainError> {
        let sorted = self.all_records_sorted();
        self.storage.save(&sorted)
    }
}

/// Author last name, then publish date with undated rows last. Stable.
pub fn sort_records(records: &mut [BookRecord]) {
    records.sort_by_cached_key(|r| (r.author_sort_name(), r.parsed_publish_date().sort_key()));
}
