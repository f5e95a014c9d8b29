pub(crate) mod hive;
pub(crate) mod openai;

use std::borrow::Cow;

use async_trait::async_trait;
use painter_core::ImageRef;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    classify,
    error::{ImageGenError, Result},
    model::Model,
    shape,
    types::GenerationRequest,
};

/// Trait for image generation provider implementations
#[async_trait]
pub(crate) trait ImageGenProvider: Send + Sync {
    /// Generate one image for an already validated request
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageRef>;

    /// Get the provider name
    fn name(&self) -> &str;

    /// Whether this provider can serve the model
    fn supports(&self, model: Model) -> bool;

    /// Model used when the request names none or an unsupported one
    fn default_model(&self) -> Model;
}

/// Settings shared by every provider implementation
pub(crate) struct ProviderSettings {
    pub name: String,
    pub client: Client,
    pub api_key: Option<SecretString>,
    /// Where the key was expected to come from, for error messages
    pub api_key_env: String,
    pub base_url: Option<String>,
    pub prompt_suffix: Option<String>,
}

impl ProviderSettings {
    /// The credential, or a configuration error when none was provided
    pub fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ImageGenError::Configuration(format!(
                    "no API key configured for provider '{}' (set {})",
                    self.name, self.api_key_env
                ))
            })
    }

    /// Join the configured (or default) base URL with an endpoint path
    pub fn endpoint(&self, default_base_url: &str, path: &str) -> String {
        let base = self.base_url.as_deref().unwrap_or(default_base_url);
        format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// Prompt as sent upstream, with the configured suffix appended
    pub fn prompt<'a>(&self, prompt: &'a str) -> Cow<'a, str> {
        match self.prompt_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => Cow::Owned(format!("{prompt}{suffix}")),
            _ => Cow::Borrowed(prompt),
        }
    }
}

/// Send a prepared provider call and normalize whatever comes back
///
/// Single attempt; transport failures become [`ImageGenError::Provider`]
/// without a status.
pub(crate) async fn submit(request: RequestBuilder) -> Result<ImageRef> {
    let response = request.send().await.map_err(|e| transport_error(&e))?;
    let status = response.status();
    let body = response.text().await.map_err(|e| transport_error(&e))?;

    if !status.is_success() {
        return Err(classify::classify(status.as_u16(), &body));
    }

    shape::extract(&body)
}

fn transport_error(error: &reqwest::Error) -> ImageGenError {
    let message = if error.is_timeout() {
        "provider did not respond before the timeout elapsed".to_string()
    } else if error.is_connect() {
        format!("failed to connect to provider: {error}")
    } else {
        format!("request to provider failed: {error}")
    };

    ImageGenError::Provider { status: None, message }
}
