use crate::domain::plot::CONTENT_SIZE;
use serde::Deserialize;
use std::path::PathBuf;

const CONFIG_FILE: &str = "config/estatevision";
const ENV_PREFIX: &str = "ESTATEVISION";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub viewport: ViewportSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSettings {
    /// Unset or blank means plot detection falls back to the mock grid
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GeminiSettings {
    pub fn configured_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewportSettings {
    #[serde(default = "default_viewport_extent")]
    pub width: f64,
    #[serde(default = "default_viewport_extent")]
    pub height: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: default_viewport_extent(),
            height: default_viewport_extent(),
        }
    }
}

fn default_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_viewport_extent() -> f64 {
    CONTENT_SIZE
}

/// Loads `config/estatevision.*` (optional) overlaid with `ESTATEVISION__*`
/// environment variables, e.g. `ESTATEVISION__GEMINI__API_KEY`.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(CONFIG_FILE).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    #[test]
    fn test_defaults_when_empty() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.gemini.model, "gemini-3-flash-preview");
        assert_eq!(config.gemini.configured_key(), None);
        assert_eq!(config.gemini.timeout_secs, 60);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert_eq!(config.viewport.width, 1000.0);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [gemini]
            api_key = "  "
            model = "gemini-2.5-pro"

            [storage]
            data_dir = "/var/lib/estatevision"

            [viewport]
            width = 1280.0
        "#;
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.gemini.configured_key(), None);
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/estatevision"));
        assert_eq!(config.viewport.width, 1280.0);
        assert_eq!(config.viewport.height, 1000.0);
    }
}
