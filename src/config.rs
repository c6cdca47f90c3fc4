//! Gateway configuration, loaded from TOML with environment overrides.
//!
//! Every section uses `#[serde(default)]`, so a config file only needs the
//! keys it wants to change. Secrets are normally supplied through the
//! environment rather than written to disk.

use std::path::{Path, PathBuf};

use intel_search::SearchConfig;
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, Result};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "INTEL_GATEWAY_CONFIG";
/// Environment variable holding the LLM provider API key.
pub const LLM_API_KEY_ENV: &str = "INTEL_LLM_API_KEY";
/// Environment variable holding the key callers send as `X-Api-Key`.
pub const INTEL_API_KEY_ENV: &str = "INTEL_API_KEY";

/// Root configuration for the gateway.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP listener.
    pub server: ServerConfig,
    /// Chat-completions provider.
    pub llm: LlmConfig,
    /// Price API.
    pub price: PriceConfig,
    /// Search backends, fetch timeouts and the scrape worker pool.
    pub search: SearchConfig,
    /// Caller authentication for `/api/*`.
    pub auth: AuthConfig,
    /// In-memory activity log.
    pub activity: ActivityConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port; `0` picks a free port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8042,
        }
    }
}

/// Chat-completions provider settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Full URL of the OpenAI-compatible `chat/completions` endpoint.
    pub api_url: String,
    /// Bearer token for the provider.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Per-call timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: "https://llm.chutes.ai/v1/chat/completions".to_owned(),
            api_key: String::new(),
            model: "deepseek-ai/DeepSeek-V3".to_owned(),
            temperature: 0.2,
            timeout_seconds: 45,
        }
    }
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redacted(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Price API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    /// Simple-price endpoint.
    pub api_url: String,
    /// Per-call timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.coingecko.com/api/v3/simple/price".to_owned(),
            timeout_seconds: 10,
        }
    }
}

/// Caller authentication.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Value callers must send in the `X-Api-Key` header.
    pub api_key: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_key", &redacted(&self.api_key))
            .finish()
    }
}

/// Activity log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    /// Entries kept before the oldest is evicted.
    pub capacity: usize,
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self { capacity: 50 }
    }
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| GatewayError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| GatewayError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the config file path: `$INTEL_GATEWAY_CONFIG` if set, otherwise
    /// `dirs::config_dir()/intel-gateway/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .map(|d| d.join("intel-gateway"))
            .unwrap_or_else(|| PathBuf::from("/tmp/intel-gateway"))
            .join("config.toml")
    }

    /// Load from `path` if it exists (defaults otherwise), then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `INTEL_LLM_API_KEY` and `INTEL_API_KEY` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(key) = non_empty(LLM_API_KEY_ENV) {
            self.llm.api_key = key;
        }
        if let Some(key) = non_empty(INTEL_API_KEY_ENV) {
            self.auth.api_key = key;
        }
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.search
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;
        if self.llm.model.trim().is_empty() {
            return Err(GatewayError::Config("llm.model must not be empty".into()));
        }
        if self.llm.timeout_seconds == 0 || self.price.timeout_seconds == 0 {
            return Err(GatewayError::Config(
                "llm.timeout_seconds and price.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.activity.capacity == 0 {
            return Err(GatewayError::Config(
                "activity.capacity must be greater than 0".into(),
            ));
        }
        if self.auth.api_key.trim().is_empty() {
            return Err(GatewayError::Config(format!(
                "auth.api_key is empty; set it in the config file or via {INTEL_API_KEY_ENV}"
            )));
        }
        Ok(())
    }
}
