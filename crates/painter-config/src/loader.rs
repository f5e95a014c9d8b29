use std::{
    net::{Ipv4Addr, SocketAddr},
    path::Path,
};

use secrecy::SecretString;

use crate::Config;

/// Listen on all interfaces at this port
const PORT_ENV: &str = "PORT";
/// Overrides the record file location
const STORAGE_PATH_ENV: &str = "PAINTER_STORAGE_PATH";

impl Config {
    /// Load configuration
    ///
    /// Reads the TOML file when a path is given (defaults otherwise), applies
    /// environment overrides, then validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, TOML parsing fails, or
    /// validation fails
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
                Self::from_toml(&raw)?
            }
            None => Self::default(),
        };

        config.apply_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from a TOML string without applying the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or contains unknown keys
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        toml::from_str(raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }

    /// Apply environment overrides
    ///
    /// Provider API keys are only read here; a missing key is not an error at
    /// this point and surfaces on the first generation request instead.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is set but is not a valid port number
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Some(port) = non_empty_var(PORT_ENV) {
            let port: u16 = port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid {PORT_ENV} value '{port}': {e}"))?;
            self.server.listen_address = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        }

        if let Some(path) = non_empty_var(STORAGE_PATH_ENV) {
            self.storage.path = path.into();
        }

        for (name, provider) in &mut self.imagegen.providers {
            if provider.api_key.is_some() {
                continue;
            }

            match non_empty_var(provider.api_key_env()) {
                Some(key) => provider.api_key = Some(SecretString::from(key)),
                None => tracing::debug!(
                    provider = %name,
                    env = %provider.api_key_env(),
                    "no API key found for image generation provider"
                ),
            }
        }

        Ok(())
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if limits are zero, the timeout is invalid, or the
    /// health path is not absolute
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.imagegen.max_prompt_length == 0 {
            anyhow::bail!("imagegen.max_prompt_length must be greater than 0");
        }

        if self.imagegen.timeout()?.is_zero() {
            anyhow::bail!("imagegen.timeout must be greater than 0");
        }

        if self.server.health.enabled && !self.server.health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/'");
        }

        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
