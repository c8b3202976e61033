use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::analyzer::AnalysisConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProviderConfig,
    pub defaults: DefaultConfig,
    pub limits: Limits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub gemini: Option<ProviderSettings>,
    pub openrouter: Option<ProviderSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultConfig {
    pub provider: String,
}

impl Default for DefaultConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
        }
    }
}

/// Quota policy knobs, named so the caps can be tuned without code changes.
/// Defaults are conservative guards against the hosted APIs' nominal limits
/// (15 requests/minute, 1500/day, ~30K-token context).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Rows kept after preprocessing.
    pub max_rows: usize,
    /// Character budget per chunk.
    pub max_chunk_chars: usize,
    /// Chunks submitted for analysis per run.
    pub max_chunks: usize,
    /// Seconds to pause between successive analysis calls.
    pub request_delay_secs: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_rows: 50,
            max_chunk_chars: 3000,
            max_chunks: 3,
            request_delay_secs: 4,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            providers: ProviderConfig {
                gemini: Some(ProviderSettings {
                    model: Some("gemini-2.5-flash".to_string()),
                    api_key: None,
                }),
                openrouter: Some(ProviderSettings {
                    model: Some("deepseek/deepseek-chat-v3.1:free".to_string()),
                    api_key: None,
                }),
            },
            defaults: DefaultConfig::default(),
            limits: Limits::default(),
        }
    }
}

impl Config {
    /// Load from `.logtriage.toml` in the working directory, then
    /// `~/.config/logtriage/config.toml`, falling back to defaults. A config
    /// file that fails to parse is ignored rather than fatal.
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                let content = fs::read_to_string(&config_path)?;
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    return Ok(config);
                }
            }
        }
        Ok(Config::default())
    }

    /// API key precedence: `{PROVIDER}_API_KEY` environment variable, then
    /// the config file, then none.
    pub fn get_api_key(&self, provider: &str) -> Option<String> {
        if let Ok(key) = env::var(format!("{}_API_KEY", provider.to_uppercase())) {
            return Some(key);
        }
        self.provider_settings(provider)
            .and_then(|p| p.api_key.clone())
    }

    pub fn provider_settings(&self, provider: &str) -> Option<&ProviderSettings> {
        match provider.to_lowercase().as_str() {
            "gemini" => self.providers.gemini.as_ref(),
            "openrouter" => self.providers.openrouter.as_ref(),
            _ => None,
        }
    }

    pub fn get_model(&self, provider: &str) -> Option<String> {
        self.provider_settings(provider).and_then(|p| p.model.clone())
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            max_chunks: self.limits.max_chunks,
            request_delay: Duration::from_secs(self.limits.request_delay_secs),
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(current_dir) = env::current_dir() {
            let project_config = current_dir.join(".logtriage.toml");
            if project_config.exists() {
                return Some(project_config);
            }
        }
        if let Some(home_dir) = dirs::home_dir() {
            let user_config = home_dir
                .join(".config")
                .join("logtriage")
                .join("config.toml");
            if user_config.exists() {
                return Some(user_config);
            }
        }
        None
    }
}
