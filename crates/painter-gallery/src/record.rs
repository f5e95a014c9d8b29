use jiff::Timestamp;
use painter_core::ImageRef;
use serde::{Deserialize, Serialize};

/// A persisted generation result
///
/// Never updated in place; `created_at` is set once on insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: String,
    pub prompt: String,
    /// Remote URL or `data:` URI of the image
    #[serde(alias = "imageUrl")]
    pub image_url: ImageRef,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_at: Timestamp,
}

/// Record as submitted for insertion, before an id and timestamp are assigned
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewImageRecord {
    /// Caller-chosen id; one is generated when absent
    pub id: Option<String>,
    pub prompt: String,
    pub image_url: ImageRef,
    pub model: Option<String>,
}

impl NewImageRecord {
    pub fn new(prompt: impl Into<String>, image_url: ImageRef) -> Self {
        Self {
            id: None,
            prompt: prompt.into(),
            image_url,
            model: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub(crate) fn into_record(self, created_at: Timestamp) -> ImageRecord {
        let id = self
            .id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        ImageRecord {
            id,
            prompt: self.prompt,
            image_url: self.image_url,
            model: self.model,
            created_at,
        }
    }
}
