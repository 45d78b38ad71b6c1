//! Service configuration.
//!
//! Loaded from TOML, then overridden from the environment. Every section has
//! defaults, so an absent file yields a working configuration as long as at
//! least one provider API key is set.

use crate::gateway::{adapters::OpenAiProviderConfig, domain::RoleBudgets};
use crate::pipeline::{ExhaustionPolicy, PipelineSettings, SettingsError};
use crate::review::{ReviewGateConfig, ReviewPreset};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_ENV: &str = "CABINET_CONFIG";
/// Environment variable overriding the database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
/// Environment variable overriding the bind address.
pub const BIND_ENV: &str = "CABINET_BIND";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid configuration TOML.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Pipeline settings are out of range.
    #[error(transparent)]
    Pipeline(#[from] SettingsError),
    /// A provider entry is unusable.
    #[error("provider {name}: {reason}")]
    InvalidProvider {
        /// Provider name.
        name: String,
        /// What is wrong.
        reason: &'static str,
    },
    /// No provider has an API key.
    #[error("no model provider has an API key; set one of: {0}")]
    NoUsableProviders(String),
}

/// Root configuration document.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CabinetConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Task store settings.
    pub database: DatabaseConfig,
    /// Orchestrator settings.
    pub pipeline: PipelineConfig,
    /// Review gate settings.
    pub review: ReviewConfig,
    /// Providers in fallback order.
    pub providers: Vec<ProviderConfig>,
    /// Output token budget per role.
    pub budgets: RoleBudgets,
}

impl Default for CabinetConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            pipeline: PipelineConfig::default(),
            review: ReviewConfig::default(),
            providers: vec![ProviderConfig::kimi(), ProviderConfig::deepseek()],
            budgets: RoleBudgets::default(),
        }
    }
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3001".to_owned(),
            body_limit_bytes: 10 * 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `[database]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `PostgreSQL` URL; the in-memory store is used when absent.
    pub url: Option<String>,
    /// Connection pool size.
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            pool_size: 8,
        }
    }
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum Executor/Reviewer rounds.
    pub max_retries: u32,
    /// What happens when no round passes.
    pub exhaustion_policy: ExhaustionPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_retries: PipelineSettings::DEFAULT_MAX_RETRIES,
            exhaustion_policy: ExhaustionPolicy::default(),
        }
    }
}

/// `[review]` section.
///
/// Marker lists left unset keep the preset's values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Base configuration.
    pub preset: ReviewPreset,
    /// Verdict labels overriding the preset.
    pub verdict_labels: Option<Vec<String>>,
    /// Pass tokens overriding the preset.
    pub pass_tokens: Option<Vec<String>>,
    /// Fail tokens overriding the preset.
    pub fail_tokens: Option<Vec<String>>,
}

impl ReviewConfig {
    /// Builds the gate configuration.
    #[must_use]
    pub fn gate_config(&self) -> ReviewGateConfig {
        let base = ReviewGateConfig::preset(self.preset);
        ReviewGateConfig {
            verdict_labels: self.verdict_labels.clone().unwrap_or(base.verdict_labels),
            pass_tokens: self.pass_tokens.clone().unwrap_or(base.pass_tokens),
            fail_tokens: self.fail_tokens.clone().unwrap_or(base.fail_tokens),
            unmarked: base.unmarked,
        }
    }
}

/// One `[[providers]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Provider name used in logs.
    pub name: String,
    /// Base URL of the OpenAI-compatible API.
    pub base_url: String,
    /// Model identifier.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// API key; normally filled from `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Network timeout per call, in seconds.
    #[serde(default = "default_provider_timeout_secs")]
    pub timeout_secs: u64,
    /// User-message budget in characters.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

const fn default_provider_timeout_secs() -> u64 {
    120
}

const fn default_max_input_chars() -> usize {
    60_000
}

const fn default_temperature() -> f32 {
    0.7
}

impl ProviderConfig {
    /// Moonshot Kimi defaults.
    #[must_use]
    pub fn kimi() -> Self {
        Self::preset("kimi", "https://api.moonshot.cn/v1", "kimi-k2", "KIMI_API_KEY")
    }

    /// `DeepSeek` defaults.
    #[must_use]
    pub fn deepseek() -> Self {
        Self::preset(
            "deepseek",
            "https://api.deepseek.com/v1",
            "deepseek-chat",
            "DEEPSEEK_API_KEY",
        )
    }

    fn preset(name: &str, base_url: &str, model: &str, api_key_env: &str) -> Self {
        Self {
            name: name.to_owned(),
            base_url: base_url.to_owned(),
            model: model.to_owned(),
            api_key_env: api_key_env.to_owned(),
            api_key: None,
            timeout_secs: default_provider_timeout_secs(),
            max_input_chars: default_max_input_chars(),
            temperature: default_temperature(),
        }
    }
}

impl CabinetConfig {
    /// Parses configuration TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed input.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] for unreadable files and
    /// [`ConfigError::Parse`] for malformed ones.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(source) => Self::from_toml_str(&source),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_empty(DATABASE_URL_ENV) {
            self.database.url = Some(url);
        }
        if let Some(bind) = non_empty(BIND_ENV) {
            self.server.bind = bind;
        }
        for provider in &mut self.providers {
            if let Some(key) = non_empty(&provider.api_key_env) {
                provider.api_key = Some(key);
            }
        }
    }

    /// Returns validated orchestrator settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pipeline`] when `max_retries` is out of range.
    pub fn pipeline_settings(&self) -> Result<PipelineSettings, ConfigError> {
        Ok(PipelineSettings::new(
            self.pipeline.max_retries,
            self.pipeline.exhaustion_policy,
        )?)
    }

    /// Returns connection settings for every provider with an API key, in
    /// fallback order. Providers without a key are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProvider`] for zero budgets or timeouts
    /// and [`ConfigError::NoUsableProviders`] when no provider has a key.
    pub fn provider_settings(&self) -> Result<Vec<OpenAiProviderConfig>, ConfigError> {
        let mut usable = Vec::new();
        for provider in &self.providers {
            if provider.max_input_chars == 0 {
                return Err(ConfigError::InvalidProvider {
                    name: provider.name.clone(),
                    reason: "max_input_chars must be greater than zero",
                });
            }
            if provider.timeout_secs == 0 {
                return Err(ConfigError::InvalidProvider {
                    name: provider.name.clone(),
                    reason: "timeout_secs must be greater than zero",
                });
            }
            let Some(api_key) = provider.api_key.clone() else {
                warn!(
                    provider = %provider.name,
                    env = %provider.api_key_env,
                    "provider has no API key, skipping"
                );
                continue;
            };
            usable.push(OpenAiProviderConfig {
                name: provider.name.clone(),
                base_url: provider.base_url.clone(),
                model: provider.model.clone(),
                api_key,
                timeout: Duration::from_secs(provider.timeout_secs),
                max_input_chars: provider.max_input_chars,
                temperature: provider.temperature,
            });
        }
        if usable.is_empty() {
            let names: Vec<&str> = self
                .providers
                .iter()
                .map(|provider| provider.api_key_env.as_str())
                .collect();
            return Err(ConfigError::NoUsableProviders(names.join(", ")));
        }
        Ok(usable)
    }
}
