use async_trait::async_trait;
use painter_core::ImageRef;
use serde::Serialize;

use super::{ImageGenProvider, ProviderSettings, submit};
use crate::{
    error::{ImageGenError, Result},
    model::{Model, Route},
    types::GenerationRequest,
};

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// `OpenAI` image generation provider
pub(crate) struct OpenAiImageGenProvider {
    settings: ProviderSettings,
    default_model: Model,
}

impl OpenAiImageGenProvider {
    pub const DEFAULT_MODEL: Model = Model::DallE3;

    pub fn new(settings: ProviderSettings, default_model: Option<Model>) -> Result<Self> {
        let default_model = default_model.unwrap_or(Self::DEFAULT_MODEL);

        if default_model.route() != Route::OpenAiImages {
            return Err(ImageGenError::Configuration(format!(
                "default model '{default_model}' is not served by provider '{}'",
                settings.name
            )));
        }

        Ok(Self {
            settings,
            default_model,
        })
    }
}

/// Wire format for the `OpenAI` image generation API request
#[derive(Serialize)]
struct OpenAiImageRequest<'a> {
    model: &'static str,
    prompt: &'a str,
    n: u32,
    size: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<&'static str>,
}

#[async_trait]
impl ImageGenProvider for OpenAiImageGenProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageRef> {
        let api_key = self.settings.api_key()?;
        let prompt = self.settings.prompt(&request.prompt);

        let wire_request = OpenAiImageRequest {
            model: request.model.as_str(),
            prompt: &prompt,
            n: 1,
            size: "1024x1024",
            // dall-e-2 rejects the quality parameter
            quality: (request.model == Model::DallE3).then_some("standard"),
        };

        let call = self
            .settings
            .client
            .post(self.settings.endpoint(DEFAULT_BASE_URL, "images/generations"))
            .bearer_auth(api_key)
            .json(&wire_request);

        submit(call).await
    }

    fn name(&self) -> &str {
        &self.settings.name
    }

    fn supports(&self, model: Model) -> bool {
        model.route() == Route::OpenAiImages
    }

    fn default_model(&self) -> Model {
        self.default_model
    }
}
