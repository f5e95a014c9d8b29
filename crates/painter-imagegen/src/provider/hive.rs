use async_trait::async_trait;
use painter_core::ImageRef;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;

use super::{ImageGenProvider, ProviderSettings, submit};
use crate::{
    error::{ImageGenError, Result},
    model::{Model, Route},
    types::GenerationRequest,
};

/// Default Hive API base URL
const DEFAULT_BASE_URL: &str = "https://api.thehive.ai";

const IMAGE_SIZE: ImageSize = ImageSize {
    width: 1024,
    height: 1024,
};

/// TheHive visual generation provider
///
/// Newer models live behind per-model v3 endpoints; older ones are only
/// reachable through the v2 synchronous task API, which uses a different
/// payload and `Token` rather than `Bearer` authorization.
pub(crate) struct HiveProvider {
    settings: ProviderSettings,
    default_model: Model,
}

impl HiveProvider {
    pub const DEFAULT_MODEL: Model = Model::FluxSchnellEnhanced;

    pub fn new(settings: ProviderSettings, default_model: Option<Model>) -> Result<Self> {
        let default_model = default_model.unwrap_or(Self::DEFAULT_MODEL);

        if !serves(default_model) {
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

fn serves(model: Model) -> bool {
    matches!(model.route(), Route::HiveV3 { .. } | Route::HiveV2Task)
}

#[derive(Debug, Clone, Copy, Serialize)]
struct ImageSize {
    width: u32,
    height: u32,
}

/// Wire format for v3 model endpoints
#[derive(Serialize)]
struct V3Request<'a> {
    input: V3Input<'a>,
}

#[derive(Serialize)]
struct V3Input<'a> {
    prompt: &'a str,
    image_size: ImageSize,
    num_inference_steps: u32,
    num_images: u32,
    output_format: &'static str,
}

/// Wire format for the v2 synchronous task endpoint
#[derive(Serialize)]
struct V2TaskRequest<'a> {
    text_data: &'a str,
    options: V2Options,
}

#[derive(Serialize)]
struct V2Options {
    image_size: ImageSize,
    num_images: u32,
    output_format: &'static str,
}

#[async_trait]
impl ImageGenProvider for HiveProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageRef> {
        let api_key = self.settings.api_key()?;
        let prompt = self.settings.prompt(&request.prompt);

        let call = match request.model.route() {
            Route::HiveV3 { path, steps } => self
                .settings
                .client
                .post(self.settings.endpoint(DEFAULT_BASE_URL, &format!("api/v3/{path}")))
                .bearer_auth(api_key)
                .json(&V3Request {
                    input: V3Input {
                        prompt: &prompt,
                        image_size: IMAGE_SIZE,
                        num_inference_steps: steps,
                        num_images: 1,
                        output_format: "png",
                    },
                }),
            Route::HiveV2Task => self
                .settings
                .client
                .post(self.settings.endpoint(DEFAULT_BASE_URL, "api/v2/task/sync"))
                .header(AUTHORIZATION, format!("Token {api_key}"))
                .json(&V2TaskRequest {
                    text_data: &prompt,
                    options: V2Options {
                        image_size: IMAGE_SIZE,
                        num_images: 1,
                        output_format: "png",
                    },
                }),
            Route::OpenAiImages => {
                return Err(ImageGenError::Configuration(format!(
                    "model '{}' is not served by provider '{}'",
                    request.model, self.settings.name
                )));
            }
        };

        submit(call).await
    }

    fn name(&self) -> &str {
        &self.settings.name
    }

    fn supports(&self, model: Model) -> bool {
        serves(model)
    }

    fn default_model(&self) -> Model {
        self.default_model
    }
}
