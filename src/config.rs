//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.vidpulse.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::cli::OutputFormat;
use crate::fetch::MetadataConfig;
use crate::submission::SubmissionConfig;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".vidpulse.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Collection/analysis service settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// Video provider settings.
    #[serde(default)]
    pub youtube: YoutubeConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output format of the page view.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            verbose: false,
        }
    }
}

/// Collection and analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the service.
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    /// Provider segment of `POST /collect/{provider}`.
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Maximum comments to collect per submission.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Pause between a successful submission and opening the analysis view.
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            provider: default_provider(),
            max_results: default_max_results(),
            timeout_seconds: default_timeout(),
            redirect_delay_ms: default_redirect_delay(),
        }
    }
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_provider() -> String {
    "youtube".to_string()
}

fn default_max_results() -> u32 {
    50
}

fn default_timeout() -> u64 {
    60 // analysis runs the sentiment model synchronously
}

fn default_redirect_delay() -> u64 {
    1000
}

/// YouTube Data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// Base URL of the Data API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Usually supplied through `YOUTUBE_API_KEY`.
    #[serde(default)]
    pub api_key: String,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
        }
    }
}

fn default_api_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.vidpulse.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments (and their env fallbacks) take precedence, but only
    /// when they were actually provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.backend_url {
            self.backend.base_url = url.clone();
        }
        if let Some(ref key) = args.api_key {
            self.youtube.api_key = key.clone();
        }
        if let Some(ref api_url) = args.youtube_api_url {
            self.youtube.api_url = api_url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.backend.timeout_seconds = timeout;
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Settings injected into the metadata fetcher.
    pub fn metadata_config(&self) -> MetadataConfig {
        MetadataConfig {
            api_url: self.youtube.api_url.clone(),
            api_key: self.youtube.api_key.clone(),
        }
    }

    /// Settings for the submission controller.
    pub fn submission_config(&self, max_results: Option<u32>) -> SubmissionConfig {
        SubmissionConfig {
            base_url: self.backend.base_url.clone(),
            provider: self.backend.provider.clone(),
            max_results: max_results.unwrap_or(self.backend.max_results),
            redirect_delay: Duration::from_millis(self.backend.redirect_delay_ms),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
