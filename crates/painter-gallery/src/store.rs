//! Record store backends

pub mod json_file;
pub mod memory;

use async_trait::async_trait;
use jiff::Timestamp;

use crate::{
    error::{GalleryError, Result},
    record::{ImageRecord, NewImageRecord},
};

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Durable list of image records
///
/// Implementations serialize mutations so concurrent callers cannot lose
/// each other's updates.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records, newest first
    async fn list(&self) -> Result<Vec<ImageRecord>>;

    /// Append a record, assigning its id (when absent) and creation time
    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord>;

    /// Remove a record; `false` when no record had that id
    async fn delete_by_id(&self, id: &str) -> Result<bool>;

    /// Remove every record
    async fn clear(&self) -> Result<()>;
}

/// Records are kept in insertion order; this returns them newest first
///
/// Order follows insertion, not `created_at`, so a clock step cannot
/// reorder the history.
pub(crate) fn newest_first(records: &[ImageRecord]) -> Vec<ImageRecord> {
    records.iter().rev().cloned().collect()
}

pub(crate) fn append(records: &mut Vec<ImageRecord>, record: NewImageRecord) -> Result<ImageRecord> {
    let record = record.into_record(Timestamp::now());

    if records.iter().any(|existing| existing.id == record.id) {
        return Err(GalleryError::Conflict(record.id));
    }

    records.push(record.clone());
    Ok(record)
}

pub(crate) fn remove(records: &mut Vec<ImageRecord>, id: &str) -> bool {
    let before = records.len();
    records.retain(|record| record.id != id);
    records.len() != before
}
