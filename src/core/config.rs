//! # Configuration
//!
//! Centralizes settings with a clear override hierarchy:
//! defaults → config file → env vars.
//!
//! Config lives at `~/.tern/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! The API credential is never stored here: it comes from the
//! `DEEPSEEK_API_KEY` env var (a `.env` file in the working directory is
//! loaded first, see main). A missing credential is a fatal startup error.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;

use crate::core::state::Model;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TernConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_model: Option<String>,
    pub streaming: Option<bool>,
    pub panel: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
}

pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: Model,
    pub streaming: bool,
    pub panel_visible: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    MissingApiKey,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::MissingApiKey => write!(
                f,
                "DEEPSEEK_API_KEY is not set (export it, or put it in a .env file)"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.tern/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".tern").join("config.toml"))
}

/// Loads and resolves the full startup configuration.
pub fn load() -> Result<ResolvedConfig, ConfigError> {
    let file = load_file()?;
    resolve(
        &file,
        std::env::var("DEEPSEEK_API_KEY").ok(),
        std::env::var("DEEPSEEK_BASE_URL").ok(),
    )
}

/// Loads `~/.tern/config.toml`, generating a commented default if absent.
fn load_file() -> Result<TernConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(TernConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(TernConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config: TernConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &PathBuf) {
    let default_content = r#"# Tern Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars.
# The API key is NOT read from this file: set DEEPSEEK_API_KEY or a .env file.

# [general]
# default_model = "deepseek-chat"    # "deepseek-chat" or "deepseek-coder"
# streaming = false                  # request replies over the streaming endpoint
# panel = true                       # show the status panel at startup

# [api]
# base_url = "https://api.deepseek.com/v1"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapses defaults → config file → env values into concrete settings.
///
/// `api_key` and `env_base_url` are the env-var values (None = not set);
/// they are parameters so resolution stays testable without touching the
/// process environment.
pub fn resolve(
    config: &TernConfig,
    api_key: Option<String>,
    env_base_url: Option<String>,
) -> Result<ResolvedConfig, ConfigError> {
    let api_key = match api_key.filter(|k| !k.is_empty()) {
        Some(k) => k,
        None => return Err(ConfigError::MissingApiKey),
    };

    let base_url = env_base_url
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let model = match config.general.default_model.as_deref() {
        None => Model::default(),
        Some(id) => Model::parse(id).unwrap_or_else(|| {
            warn!("Unknown default_model {id:?} in config, using {}", Model::default().id());
            Model::default()
        }),
    };

    Ok(ResolvedConfig {
        api_key,
        base_url,
        model,
        streaming: config.general.streaming.unwrap_or(false),
        panel_visible: config.general.panel.unwrap_or(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_uses_defaults_when_empty() {
        let config = TernConfig::default();
        let resolved = resolve(&config, Some("sk-test".to_string()), None).unwrap();
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.model, Model::Chat);
        assert!(!resolved.streaming);
        assert!(resolved.panel_visible);
    }

    #[test]
    fn resolve_without_api_key_is_fatal() {
        let config = TernConfig::default();
        assert!(matches!(
            resolve(&config, None, None),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            resolve(&config, Some(String::new()), None),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn resolve_config_values_override_defaults() {
        let config = TernConfig {
            general: GeneralConfig {
                default_model: Some("deepseek-coder".to_string()),
                streaming: Some(true),
                panel: Some(false),
            },
            api: ApiConfig {
                base_url: Some("http://localhost:9999/v1".to_string()),
            },
        };
        let resolved = resolve(&config, Some("sk-test".to_string()), None).unwrap();
        assert_eq!(resolved.model, Model::Coder);
        assert!(resolved.streaming);
        assert!(!resolved.panel_visible);
        assert_eq!(resolved.base_url, "http://localhost:9999/v1");
    }

    #[test]
    fn resolve_env_base_url_wins() {
        let config = TernConfig {
            api: ApiConfig {
                base_url: Some("http://from-file/v1".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve(
            &config,
            Some("sk-test".to_string()),
            Some("http://from-env/v1".to_string()),
        )
        .unwrap();
        assert_eq!(resolved.base_url, "http://from-env/v1");
    }

    #[test]
    fn resolve_unknown_model_falls_back_to_default() {
        let config = TernConfig {
            general: GeneralConfig {
                default_model: Some("gpt-4".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve(&config, Some("sk-test".to_string()), None).unwrap();
        assert_eq!(resolved.model, Model::Chat);
    }

    #[test]
    fn sparse_toml_parses() {
        let toml_str = r#"
[general]
streaming = true
"#;
        let config: TernConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.streaming, Some(true));
        assert!(config.general.default_model.is_none());
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn full_toml_round_trip() {
        let toml_str = r#"
[general]
default_model = "deepseek-coder"
streaming = false
panel = true

[api]
base_url = "http://192.168.1.10:8080/v1"
"#;
        let config: TernConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.default_model.as_deref(), Some("deepseek-coder"));
        assert_eq!(config.general.panel, Some(true));
        assert_eq!(config.api.base_url.as_deref(), Some("http://192.168.1.10:8080/v1"));
    }
}
