use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{fs, sync::Mutex};

use super::{RecordStore, append, newest_first, remove};
use crate::{
    error::{GalleryError, Result},
    record::{ImageRecord, NewImageRecord},
};

/// Store backed by a JSON array file
///
/// Every operation loads the whole file and mutations rewrite it through a
/// sibling temporary file and a rename, so readers never observe a partial
/// write. A missing file is an empty collection.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<ImageRecord>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(persistence(&self.path, "read", &e)),
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|e| persistence(&self.path, "parse", &e))
    }

    async fn save(&self, records: &[ImageRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| persistence(parent, "create directory", &e))?;
        }

        let contents = serde_json::to_vec_pretty(records).map_err(|e| persistence(&self.path, "encode", &e))?;

        let temp = self.temp_path();
        fs::write(&temp, contents)
            .await
            .map_err(|e| persistence(&temp, "write", &e))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| persistence(&self.path, "replace", &e))?;

        tracing::debug!(path = %self.path.display(), records = records.len(), "image records saved");

        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn persistence(path: &Path, action: &str, error: &dyn std::fmt::Display) -> GalleryError {
    tracing::error!(path = %path.display(), action, error = %error, "image store failure");
    GalleryError::Persistence(format!("failed to {action} {}: {error}", path.display()))
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<ImageRecord>> {
        let _guard = self.lock.lock().await;
        Ok(newest_first(&self.load().await?))
    }

    async fn insert(&self, record: NewImageRecord) -> Result<ImageRecord> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        let record = append(&mut records, record)?;
        self.save(&records).await?;

        Ok(record)
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;

        let mut records = self.load().await?;
        if !remove(&mut records, id) {
            return Ok(false);
        }
        self.save(&records).await?;

        Ok(true)
    }

    async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.save(&[]).await
    }
}
