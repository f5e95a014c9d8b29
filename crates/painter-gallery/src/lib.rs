#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

mod error;
mod record;
pub mod store;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{delete, get},
};
use painter_core::ImageRef;
use serde::{Deserialize, Serialize};

pub use error::{GalleryError, Result};
pub use record::{ImageRecord, NewImageRecord};
pub use store::{JsonFileStore, MemoryStore, RecordStore};

/// Shared handle to the configured record store
pub type SharedStore = Arc<dyn RecordStore>;

/// Build the record store from configuration
pub fn build_store(config: &painter_config::Config) -> SharedStore {
    tracing::debug!(path = %config.storage.path.display(), "Using JSON file image store");
    Arc::new(JsonFileStore::new(config.storage.path.clone()))
}

/// Create the endpoint router for the image history
pub fn endpoint_router() -> Router<SharedStore> {
    Router::new()
        .route("/api/images", get(list_images).post(save_image))
        .route("/api/images/clear", delete(clear_images))
        .route("/api/images/{id}", delete(delete_image))
}

/// Body of a save request
///
/// The image location is accepted under any of the names front-ends have
/// used for it.
#[derive(Debug, Deserialize)]
struct SaveImageRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    prompt: String,
    #[serde(default, alias = "image_url", alias = "imageUrl")]
    url: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

impl TryFrom<SaveImageRequest> for NewImageRecord {
    type Error = GalleryError;

    fn try_from(request: SaveImageRequest) -> Result<Self> {
        let prompt = request.prompt.trim();
        if prompt.is_empty() {
            return Err(GalleryError::InvalidInput("Prompt is required".to_string()));
        }

        let url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| GalleryError::InvalidInput("Image URL is required".to_string()))?;

        let image_url = url
            .parse::<ImageRef>()
            .map_err(|e| GalleryError::InvalidInput(format!("Invalid image URL: {e}")))?;

        Ok(Self {
            id: request.id,
            prompt: prompt.to_string(),
            image_url,
            model: request.model.filter(|model| !model.trim().is_empty()),
        })
    }
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

async fn list_images(State(store): State<SharedStore>) -> Result<Json<Vec<ImageRecord>>> {
    let records = store.list().await?;
    tracing::debug!(records = records.len(), "Listed image records");
    Ok(Json(records))
}

async fn save_image(
    State(store): State<SharedStore>,
    request: std::result::Result<Json<SaveImageRequest>, JsonRejection>,
) -> Result<Json<ImageRecord>> {
    let Json(request) =
        request.map_err(|rejection| GalleryError::InvalidInput(format!("Invalid request body: {}", rejection.body_text())))?;

    let record = store.insert(request.try_into()?).await?;
    tracing::info!(record_id = %record.id, model = ?record.model, "Image record saved");

    Ok(Json(record))
}

async fn delete_image(State(store): State<SharedStore>, Path(id): Path<String>) -> Result<Json<SuccessResponse>> {
    if !store.delete_by_id(&id).await? {
        tracing::debug!(record_id = %id, "Image record not found for deletion");
        return Err(GalleryError::NotFound(id));
    }

    tracing::info!(record_id = %id, "Image record deleted");
    Ok(Json(SuccessResponse { success: true }))
}

async fn clear_images(State(store): State<SharedStore>) -> Result<Json<SuccessResponse>> {
    store.clear().await?;
    tracing::info!("Image records cleared");
    Ok(Json(SuccessResponse { success: true }))
}
