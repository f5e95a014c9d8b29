#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

mod classify;
mod error;
mod generator;
mod http_client;
mod model;
mod provider;
mod shape;
mod types;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};

pub use error::{FailureKind, ImageGenError, Result};
pub use generator::{ImageGenerator, ImageGeneratorBuilder};
pub use model::Model;
pub use types::{GenerateRequest, GenerateResponse, GeneratedImage};

/// Build the image generator from configuration
///
/// # Errors
///
/// Returns an error if the generator fails to initialize
pub fn build_generator(config: &painter_config::Config) -> anyhow::Result<Arc<ImageGenerator>> {
    let generator = Arc::new(
        ImageGeneratorBuilder::new(&config.imagegen)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize image generator: {e}"))?,
    );
    Ok(generator)
}

/// Create the endpoint router for image generation
pub fn endpoint_router() -> Router<Arc<ImageGenerator>> {
    Router::new().route("/api/generate-image", post(generate))
}

/// Handle image generation requests
async fn generate(
    State(generator): State<Arc<ImageGenerator>>,
    request: std::result::Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let Json(request) = request.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected image generation request body");
        ImageGenError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
    })?;

    tracing::debug!("Image generation handler called for model: {:?}", request.model);

    let generated = generator.generate(&request).await?;

    tracing::debug!("Image generation complete");

    Ok(Json(generated.into()))
}
