#![allow(clippy::must_use_candidate)]

pub mod imagegen;
mod loader;
pub mod server;
pub mod storage;
pub mod telemetry;

use serde::Deserialize;

pub use imagegen::*;
pub use server::*;
pub use storage::*;
pub use telemetry::*;

/// Top-level painter configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Image generation provider configuration
    #[serde(default)]
    pub imagegen: ImageGenConfig,
    /// Record storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
