use std::time::Duration;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;

/// Top-level image generation configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageGenConfig {
    /// Upper bound for a single outbound provider call (e.g. "60s")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Longest accepted prompt, in characters
    #[serde(default = "default_max_prompt_length")]
    pub max_prompt_length: usize,
    /// Provider configurations keyed by name; the first entry is the active provider
    #[serde(default = "default_providers")]
    pub providers: IndexMap<String, ImageGenProviderConfig>,
}

impl Default for ImageGenConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            max_prompt_length: default_max_prompt_length(),
            providers: default_providers(),
        }
    }
}

impl ImageGenConfig {
    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout string is not a valid duration
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout)
            .map_err(|e| anyhow::anyhow!("invalid imagegen timeout '{}': {e}", self.timeout))
    }

    /// The provider requests are routed to
    pub fn active_provider(&self) -> Option<(&String, &ImageGenProviderConfig)> {
        self.providers.first()
    }
}

fn default_timeout() -> String {
    "60s".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_prompt_length() -> usize {
    1000
}

fn default_providers() -> IndexMap<String, ImageGenProviderConfig> {
    let mut providers = IndexMap::new();
    providers.insert("hive".to_string(), ImageGenProviderConfig::new(ImageGenProviderType::Hive));
    providers
}

/// Configuration for a single image generation provider
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageGenProviderConfig {
    /// Provider type
    #[serde(rename = "type")]
    pub provider_type: ImageGenProviderType,
    /// API key; when unset it is read from `api_key_env` at startup
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// Text appended to every prompt before it is sent
    #[serde(default)]
    pub prompt_suffix: Option<String>,
    /// Model used when a request names none or an unsupported one
    #[serde(default)]
    pub default_model: Option<String>,
}

impl ImageGenProviderConfig {
    pub fn new(provider_type: ImageGenProviderType) -> Self {
        Self {
            provider_type,
            api_key: None,
            api_key_env: None,
            base_url: None,
            prompt_suffix: None,
            default_model: None,
        }
    }

    /// Name of the environment variable the API key is read from
    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider_type.default_api_key_env())
    }
}

/// Supported image generation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageGenProviderType {
    /// TheHive visual generation API
    Hive,
    /// `OpenAI` image generation
    Openai,
}

impl ImageGenProviderType {
    pub const fn default_api_key_env(self) -> &'static str {
        match self {
            Self::Hive => "HIVE_API_KEY",
            Self::Openai => "OPENAI_API_KEY",
        }
    }
}
