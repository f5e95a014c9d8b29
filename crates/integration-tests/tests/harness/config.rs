//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;
use std::path::Path;

use painter_config::{Config, ImageGenProviderConfig, ImageGenProviderType};
use secrecy::SecretString;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with storage and static files under `dir`
    ///
    /// No provider is configured until one is added.
    pub fn new(dir: &Path) -> Self {
        let mut config = Config::default();
        config.server.listen_address = SocketAddr::from(([127, 0, 0, 1], 0));
        config.server.static_dir = dir.join("build");
        config.storage.path = dir.join("storage/images.json");
        config.imagegen.providers.clear();

        Self { config }
    }

    /// Add a Hive provider pointed at a mock backend
    pub fn with_hive_provider(self, base_url: &str) -> Self {
        self.with_provider("hive", ImageGenProviderType::Hive, base_url)
    }

    /// Add an OpenAI provider pointed at a mock backend
    pub fn with_openai_provider(self, base_url: &str) -> Self {
        self.with_provider("openai", ImageGenProviderType::Openai, base_url)
    }

    fn with_provider(mut self, name: &str, provider_type: ImageGenProviderType, base_url: &str) -> Self {
        let mut provider = ImageGenProviderConfig::new(provider_type);
        provider.api_key = Some(SecretString::from("test-key"));
        provider.base_url = Some(base_url.to_owned());

        self.config.imagegen.providers.insert(name.to_owned(), provider);
        self
    }

    /// Drop the credential from every configured provider
    pub fn without_api_key(mut self) -> Self {
        for provider in self.config.imagegen.providers.values_mut() {
            provider.api_key = None;
        }
        self
    }

    /// Append `suffix` to every prompt sent upstream
    pub fn with_prompt_suffix(mut self, suffix: &str) -> Self {
        for provider in self.config.imagegen.providers.values_mut() {
            provider.prompt_suffix = Some(suffix.to_owned());
        }
        self
    }

    /// Set the outbound provider timeout
    pub fn with_timeout(mut self, timeout: &str) -> Self {
        self.config.imagegen.timeout = timeout.to_owned();
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
