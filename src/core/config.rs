use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use tracing::debug;

/// Environment variable carrying the primary rate service API key.
pub const EXCHANGE_RATE_API_KEY_VAR: &str = "EXCHANGE_RATE_API_KEY";
/// Environment variable carrying the generative AI API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RateProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeminiProviderConfig {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub exchange_rate: Option<RateProviderConfig>,
    pub exchangerate_host: Option<RateProviderConfig>,
    pub gemini: Option<GeminiProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            exchange_rate: Some(RateProviderConfig {
                base_url: "https://api.exchangerate-api.com/v4".to_string(),
            }),
            exchangerate_host: Some(RateProviderConfig {
                base_url: "https://api.exchangerate.host".to_string(),
            }),
            gemini: Some(GeminiProviderConfig {
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-2.0-flash".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Currency every dashboard normalizes into.
    pub base_currency: String,
    /// Transactions export consumed by the dashboards.
    pub transactions: Option<PathBuf>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Override for the on-disk cache location.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("app", "spendx", "spendx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Directory for the durable insight cache.
    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let proj_dirs = ProjectDirs::from("app", "spendx", "spendx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("cache"))
    }
}

pub fn exchange_rate_api_key() -> Option<String> {
    env::var(EXCHANGE_RATE_API_KEY_VAR).ok().filter(|k| !k.is_empty())
}

pub fn gemini_api_key() -> Option<String> {
    env::var(GEMINI_API_KEY_VAR).ok().filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
base_currency: "USD"
transactions: "exports/transactions.json"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.base_currency, "USD");
        assert_eq!(
            config.transactions,
            Some(PathBuf::from("exports/transactions.json"))
        );
        assert!(config.providers.exchange_rate.is_some());
        assert_eq!(
            config.providers.exchange_rate.unwrap().base_url,
            "https://api.exchangerate-api.com/v4"
        );
        assert_eq!(
            config.providers.gemini.unwrap().model,
            "gemini-2.0-flash"
        );

        let yaml_str_with_providers = r#"
base_currency: "EUR"
providers:
  exchange_rate:
    base_url: "http://example.com/rates"
  exchangerate_host:
    base_url: "http://example.com/host"
  gemini:
    base_url: "http://example.com/ai"
    model: "gemini-test"
"#;
        let config: AppConfig = serde_yaml::from_str(yaml_str_with_providers).unwrap();
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(
            config.providers.exchange_rate.unwrap().base_url,
            "http://example.com/rates"
        );
        assert_eq!(
            config.providers.gemini.unwrap().base_url,
            "http://example.com/ai"
        );
        assert!(config.transactions.is_none());
    }
}
