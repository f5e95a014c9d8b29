use painter_core::ImageRef;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::Model;

/// Image generation request as received from clients
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Text description of the desired image
    #[serde(default)]
    pub prompt: String,
    /// Model tag; unknown, absent, or non-string values fall back to the provider default
    #[serde(default, deserialize_with = "lenient_tag")]
    pub model: Option<String>,
}

/// Keeps string values and drops anything else a client might send
fn lenient_tag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(tag)) => Some(tag),
        _ => None,
    })
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Validated request handed to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct GenerationRequest {
    /// Trimmed, non-empty prompt
    pub prompt: String,
    /// Model resolved against the provider's supported set
    pub model: Model,
}

/// A successfully generated image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub image: ImageRef,
    pub model: Model,
    pub prompt: String,
}

/// Response body for a successful generation
///
/// Carries `url` for remote images, or `image` plus `mime_type` for
/// embedded payloads.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub model: Model,
    pub prompt: String,
}

impl From<GeneratedImage> for GenerateResponse {
    fn from(generated: GeneratedImage) -> Self {
        let (url, image, mime_type) = match generated.image {
            ImageRef::Url(url) => (Some(url), None, None),
            ImageRef::Base64 { mime_type, data } => (None, Some(data), Some(mime_type)),
        };

        Self {
            url,
            image,
            mime_type,
            model: generated.model,
            prompt: generated.prompt,
        }
    }
}
