use painter_config::{ImageGenConfig, ImageGenProviderConfig, ImageGenProviderType};

use crate::{
    error::{ImageGenError, Result},
    http_client,
    model::Model,
    provider::{ImageGenProvider, ProviderSettings, hive::HiveProvider, openai::OpenAiImageGenProvider},
    types::{GenerateRequest, GeneratedImage, GenerationRequest},
};

/// Turns client prompts into provider calls and provider answers into
/// normalized results
///
/// Stateless between calls; holds only the configured provider and limits.
pub struct ImageGenerator {
    provider: Option<Box<dyn ImageGenProvider>>,
    max_prompt_length: usize,
}

impl ImageGenerator {
    /// Generate one image
    ///
    /// The prompt is trimmed and must be non-empty and within the length
    /// limit. An absent, unknown, or unsupported model is replaced by the
    /// provider default. A single provider call is made.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedImage> {
        let prompt = self.normalize_prompt(&request.prompt)?;

        let provider = self.provider.as_deref().ok_or_else(|| {
            ImageGenError::Configuration("no image generation provider configured".to_string())
        })?;

        let model = resolve_model(provider, request.model.as_deref());
        let generation = GenerationRequest { prompt, model };

        tracing::debug!(
            provider = provider.name(),
            model = %model,
            prompt_chars = generation.prompt.chars().count(),
            "sending image generation request"
        );

        match provider.generate(&generation).await {
            Ok(image) => {
                tracing::info!(
                    provider = provider.name(),
                    model = %model,
                    embedded = image.is_embedded(),
                    "image generated"
                );

                Ok(GeneratedImage {
                    image,
                    model,
                    prompt: generation.prompt,
                })
            }
            Err(error) => {
                log_failure(provider.name(), &generation, &error);
                Err(error)
            }
        }
    }

    /// Model a request would be served with
    pub(crate) fn resolve_model(&self, requested: Option<&str>) -> Option<Model> {
        self.provider
            .as_deref()
            .map(|provider| resolve_model(provider, requested))
    }

    fn normalize_prompt(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.trim();

        if prompt.is_empty() {
            return Err(ImageGenError::InvalidInput("Prompt is required".to_string()));
        }

        if prompt.chars().count() > self.max_prompt_length {
            return Err(ImageGenError::InvalidInput(format!(
                "Prompt is too long. Please keep it under {} characters.",
                self.max_prompt_length
            )));
        }

        Ok(prompt.to_string())
    }
}

fn resolve_model(provider: &dyn ImageGenProvider, requested: Option<&str>) -> Model {
    let fallback = provider.default_model();

    let Some(tag) = requested.map(str::trim).filter(|tag| !tag.is_empty()) else {
        return fallback;
    };

    match Model::parse(tag) {
        Some(model) if provider.supports(model) => model,
        Some(model) => {
            tracing::debug!(
                provider = provider.name(),
                requested = %model,
                fallback = %fallback,
                "model not served by provider, using default"
            );
            fallback
        }
        None => {
            tracing::debug!(
                provider = provider.name(),
                requested = tag,
                fallback = %fallback,
                "unknown model, using default"
            );
            fallback
        }
    }
}

fn log_failure(provider: &str, request: &GenerationRequest, error: &ImageGenError) {
    match error {
        ImageGenError::InvalidInput(_) | ImageGenError::ContentRejected { .. } => tracing::warn!(
            provider,
            model = %request.model,
            prompt = %request.prompt,
            kind = %error.kind(),
            provider_status = ?error.provider_status(),
            error = %error,
            "image generation rejected"
        ),
        _ => tracing::error!(
            provider,
            model = %request.model,
            prompt = %request.prompt,
            kind = %error.kind(),
            provider_status = ?error.provider_status(),
            retryable = error.is_retryable(),
            error = %error,
            "image generation failed"
        ),
    }
}

/// Builder for constructing the image generator from configuration
pub struct ImageGeneratorBuilder<'a> {
    config: &'a ImageGenConfig,
}

impl<'a> ImageGeneratorBuilder<'a> {
    pub fn new(config: &'a ImageGenConfig) -> Self {
        Self { config }
    }

    /// Build the generator
    ///
    /// A provider without an API key is accepted here; the missing key is
    /// reported when a generation is attempted.
    pub fn build(self) -> Result<ImageGenerator> {
        let timeout = self
            .config
            .timeout()
            .map_err(|e| ImageGenError::Configuration(e.to_string()))?;
        let client = http_client::build(timeout)?;

        let provider = match self.config.active_provider() {
            Some((name, provider_config)) => {
                tracing::debug!("Initializing image generation provider: {name}");
                Some(build_provider(name, provider_config, client)?)
            }
            None => {
                tracing::warn!("No image generation provider configured");
                None
            }
        };

        Ok(ImageGenerator {
            provider,
            max_prompt_length: self.config.max_prompt_length,
        })
    }
}

fn build_provider(
    name: &str,
    config: &ImageGenProviderConfig,
    client: reqwest::Client,
) -> Result<Box<dyn ImageGenProvider>> {
    let default_model = config
        .default_model
        .as_deref()
        .map(|tag| {
            Model::parse(tag).ok_or_else(|| {
                ImageGenError::Configuration(format!("unknown default model '{tag}' for provider '{name}'"))
            })
        })
        .transpose()?;

    if config.api_key.is_none() {
        tracing::warn!(
            provider = name,
            env = config.api_key_env(),
            "image generation provider has no API key; requests will fail until one is configured"
        );
    }

    let settings = ProviderSettings {
        name: name.to_string(),
        client,
        api_key: config.api_key.clone(),
        api_key_env: config.api_key_env().to_string(),
        base_url: config.base_url.clone(),
        prompt_suffix: config.prompt_suffix.clone(),
    };

    let provider: Box<dyn ImageGenProvider> = match config.provider_type {
        ImageGenProviderType::Hive => Box::new(HiveProvider::new(settings, default_model)?),
        ImageGenProviderType::Openai => Box::new(OpenAiImageGenProvider::new(settings, default_model)?),
    };

    Ok(provider)
}

#[cfg(test)]
mod tests {
    use painter_config::{ImageGenConfig, ImageGenProviderConfig, ImageGenProviderType};
    use painter_core::ImageRef;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const IMAGE_URL: &str = "https://cdn.example.com/generated.png";
    const PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    fn provider_config(provider_type: ImageGenProviderType, base_url: &str) -> ImageGenProviderConfig {
        let mut provider = ImageGenProviderConfig::new(provider_type);
        provider.api_key = Some(SecretString::from("test-key"));
        provider.base_url = Some(base_url.to_string());
        provider
    }

    fn config_with(provider: ImageGenProviderConfig) -> ImageGenConfig {
        let mut config = ImageGenConfig::default();
        config.providers.clear();
        config.providers.insert("test".to_string(), provider);
        config
    }

    fn generator(config: &ImageGenConfig) -> ImageGenerator {
        ImageGeneratorBuilder::new(config).build().unwrap()
    }

    fn hive_generator(server: &MockServer) -> ImageGenerator {
        generator(&config_with(provider_config(ImageGenProviderType::Hive, &server.uri())))
    }

    #[tokio::test]
    async fn hive_v3_default_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/hive/flux-schnell-enhanced"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({ "input": { "prompt": "a red fox", "num_images": 1 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "task-1",
                "output": [{ "url": IMAGE_URL }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generated = hive_generator(&server)
            .generate(&GenerateRequest::new("  a red fox  "))
            .await
            .unwrap();

        assert_eq!(generated.image, ImageRef::url(IMAGE_URL).unwrap());
        assert_eq!(generated.model, Model::FluxSchnellEnhanced);
        assert_eq!(generated.prompt, "a red fox");
    }

    #[tokio::test]
    async fn hive_explicit_v3_model() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/black-forest-labs/flux-schnell"))
            .and(body_partial_json(json!({ "input": { "num_inference_steps": 4 } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "output": [{ "url": IMAGE_URL }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generated = hive_generator(&server)
            .generate(&GenerateRequest::new("a red fox").with_model("flux-schnell"))
            .await
            .unwrap();

        assert_eq!(generated.model, Model::FluxSchnell);
    }

    #[tokio::test]
    async fn hive_legacy_model_uses_task_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v2/task/sync"))
            .and(header("authorization", "Token test-key"))
            .and(body_partial_json(json!({ "text_data": "a red fox" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": [{ "response": { "output": [{ "url": IMAGE_URL }] } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generated = hive_generator(&server)
            .generate(&GenerateRequest::new("a red fox").with_model("sdxl"))
            .await
            .unwrap();

        assert_eq!(generated.image, ImageRef::url(IMAGE_URL).unwrap());
        assert_eq!(generated.model, Model::Sdxl);
    }

    #[tokio::test]
    async fn unsupported_model_is_coerced_to_default() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v3/hive/flux-schnell-enhanced"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "url": IMAGE_URL })))
            .expect(2)
            .mount(&server)
            .await;

        let generator = hive_generator(&server);

        for tag in ["dall-e-3", "not-a-model"] {
            let generated = generator
                .generate(&GenerateRequest::new("a red fox").with_model(tag))
                .await
                .unwrap();
            assert_eq!(generated.model, Model::FluxSchnellEnhanced, "tag: {tag}");
        }
    }

    #[tokio::test]
    async fn resolve_model_reports_substitution() {
        let server = MockServer::start().await;
        let generator = hive_generator(&server);

        assert_eq!(generator.resolve_model(None), Some(Model::FluxSchnellEnhanced));
        assert_eq!(generator.resolve_model(Some("SDXL-enhanced")), Some(Model::SdxlEnhanced));
        assert_eq!(generator.resolve_model(Some("dall-e-2")), Some(Model::FluxSchnellEnhanced));
    }

    #[tokio::test]
    async fn empty_prompt_rejected_without_calling_provider() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let generator = hive_generator(&server);

        for prompt in ["", "   \n\t"] {
            let err = generator.generate(&GenerateRequest::new(prompt)).await.unwrap_err();
            assert_eq!(err, ImageGenError::InvalidInput("Prompt is required".to_string()));
        }
    }

    #[tokio::test]
    async fn overlong_prompt_rejected() {
        let server = MockServer::start().await;
        let mut config = config_with(provider_config(ImageGenProviderType::Hive, &server.uri()));
        config.max_prompt_length = 10;

        let err = generator(&config)
            .generate(&GenerateRequest::new("ééééééééééé"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::InvalidInput(ref m) if m.contains("too long")));

        // exactly at the limit is fine to send
        assert_eq!(generator(&config).normalize_prompt("éééééééééé").unwrap().chars().count(), 10);
    }

    #[tokio::test]
    async fn missing_api_key_is_configuration_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut provider = provider_config(ImageGenProviderType::Hive, &server.uri());
        provider.api_key = None;

        let err = generator(&config_with(provider))
            .generate(&GenerateRequest::new("a red fox"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::Configuration(ref m) if m.contains("HIVE_API_KEY")));
        assert_eq!(err.status_code().as_u16(), 500);
    }

    #[tokio::test]
    async fn no_provider_is_configuration_error() {
        let mut config = ImageGenConfig::default();
        config.providers.clear();

        let generator = generator(&config);
        assert_eq!(generator.resolve_model(Some("sdxl")), None);

        let err = generator.generate(&GenerateRequest::new("a red fox")).await.unwrap_err();
        assert!(matches!(err, ImageGenError::Configuration(_)));
    }

    #[tokio::test]
    async fn quota_error_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "message": "You exceeded your current quota",
                    "type": "insufficient_quota"
                }
            })))
            .mount(&server)
            .await;

        let err = hive_generator(&server)
            .generate(&GenerateRequest::new("a red fox"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::QuotaExceeded { status: 429, .. }));
        assert_eq!(err.status_code().as_u16(), 402);
    }

    #[tokio::test]
    async fn rate_limit_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let err = hive_generator(&server)
            .generate(&GenerateRequest::new("a red fox"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::RateLimited { status: 429, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn server_error_is_generic_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "internal failure" })))
            .expect(1)
            .mount(&server)
            .await;

        let err = hive_generator(&server)
            .generate(&GenerateRequest::new("a red fox"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ImageGenError::Provider {
                status: Some(500),
                message: "internal failure".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn unrecognized_success_body_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "task-1", "status": "pending" })))
            .mount(&server)
            .await;

        let err = hive_generator(&server)
            .generate(&GenerateRequest::new("a red fox"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "url": IMAGE_URL }))
                    .set_delay(std::time::Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let mut config = config_with(provider_config(ImageGenProviderType::Hive, &server.uri()));
        config.timeout = "200ms".to_string();

        let err = generator(&config)
            .generate(&GenerateRequest::new("a red fox"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::Provider { status: None, .. }));
    }

    #[tokio::test]
    async fn openai_base64_with_prompt_suffix() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "dall-e-3",
                "prompt": "a red fox. High quality, detailed image.",
                "n": 1,
                "size": "1024x1024",
                "quality": "standard"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1_700_000_000,
                "data": [{ "b64_json": PNG }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut provider = provider_config(ImageGenProviderType::Openai, &server.uri());
        provider.prompt_suffix = Some(". High quality, detailed image.".to_string());

        let generated = generator(&config_with(provider))
            .generate(&GenerateRequest::new("a red fox"))
            .await
            .unwrap();

        assert_eq!(generated.image, ImageRef::from_base64(PNG, None).unwrap());
        assert_eq!(generated.model, Model::DallE3);
        // the suffix is not echoed back
        assert_eq!(generated.prompt, "a red fox");
    }

    #[tokio::test]
    async fn openai_content_policy() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": "content_policy_violation",
                    "message": "Your request was rejected as a result of our safety system."
                }
            })))
            .mount(&server)
            .await;

        let err = generator(&config_with(provider_config(ImageGenProviderType::Openai, &server.uri())))
            .generate(&GenerateRequest::new("something rejected").with_model("dall-e-2"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImageGenError::ContentRejected { status: 400, .. }));
    }

    #[test]
    fn invalid_default_model_rejected_at_build() {
        let mut provider = provider_config(ImageGenProviderType::Openai, "http://localhost");
        provider.default_model = Some("flux-schnell".to_string());
        assert!(ImageGeneratorBuilder::new(&config_with(provider)).build().is_err());

        let mut provider = provider_config(ImageGenProviderType::Hive, "http://localhost");
        provider.default_model = Some("unknown".to_string());
        assert!(ImageGeneratorBuilder::new(&config_with(provider)).build().is_err());
    }

    #[test]
    fn configured_default_model_used() {
        let mut provider = provider_config(ImageGenProviderType::Hive, "http://localhost");
        provider.default_model = Some("sdxl".to_string());

        let generator = generator(&config_with(provider));
        assert_eq!(generator.resolve_model(Some("dall-e-3")), Some(Model::Sdxl));
    }
}
