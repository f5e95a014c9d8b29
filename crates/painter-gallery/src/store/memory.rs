use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{RecordStore, append, newest_first, remove};
use crate::{
    error::Result,
    record::{ImageRecord, NewImageRecord},
};

/// Non-durable store, for tests and embedding
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<ImageRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self) -> Result<Vec<ImageRecord>> {
        Ok(newest_first(&self.records.lock().await))
    }

    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord> {
        append(&mut *self.records.lock().await, record)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        Ok(remove(&mut *self.records.lock().await, id))
    }

    async fn clear(&self) -> Result<()> {
        self.records.lock().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::exercise;

    #[tokio::test]
    async fn behaves_like_a_record_store() {
        exercise(&MemoryStore::new()).await;
    }
}
