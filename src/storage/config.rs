use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_APP_ID: &str = "default-app-id";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub backend: BackendConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    pub sync: SyncConfig,
    pub ui: UiConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// Connection parameters of the hosted identity provider and document store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firestore_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap_token: Option<String>,
    #[serde(default = "default_session_cache")]
    pub session_cache: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncConfig {
    pub poll_interval_seconds: u64,
    pub offline_mode: bool,
    pub offline_database: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiConfig {
    pub theme: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    pub directory: PathBuf,
}

fn default_app_id() -> String {
    DEFAULT_APP_ID.to_string()
}

fn app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("courtesy-cal")
}

fn default_session_cache() -> PathBuf {
    app_config_dir().join("session.json")
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bootstrap_token: None,
            session_cache: default_session_cache(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

impl BackendConfig {
    /// Both the identity provider and the store need a key and a project.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.project_id.is_empty()
    }
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }

    pub fn load_or_create() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            let config = Self::default();
            config.save()?;
            tracing::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    pub fn config_path() -> PathBuf {
        app_config_dir().join("config.toml")
    }

    pub fn log_dir() -> PathBuf {
        app_config_dir()
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn uses_remote_backend(&self) -> bool {
        !self.sync.offline_mode
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = app_config_dir();

        Self {
            backend: BackendConfig {
                api_key: String::new(),
                project_id: String::new(),
                app_id: default_app_id(),
                auth_base_url: None,
                token_base_url: None,
                firestore_base_url: None,
            },
            auth: AuthConfig::default(),
            sync: SyncConfig {
                poll_interval_seconds: 30,
                offline_mode: false,
                offline_database: config_dir.join("events.db"),
            },
            ui: UiConfig {
                theme: "default".to_string(),
            },
            export: ExportConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_polls_every_30_seconds() {
        let config = Config::default();
        assert_eq!(config.sync.poll_interval_seconds, 30);
    }

    #[test]
    fn default_config_uses_default_app_id() {
        let config = Config::default();
        assert_eq!(config.backend.app_id, "default-app-id");
    }

    #[test]
    fn default_backend_is_incomplete() {
        let config = Config::default();
        assert!(!config.backend.is_complete());
        assert!(config.uses_remote_backend());
    }

    #[test]
    fn parse_valid_toml_config() {
        let toml_content = r#"
            [backend]
            api_key = "test_key"
            project_id = "courtesy-test"
            app_id = "secretary-mate"

            [auth]
            bootstrap_token = "custom-token"
            session_cache = "/tmp/session.json"

            [sync]
            poll_interval_seconds = 10
            offline_mode = true
            offline_database = "/tmp/events.db"

            [ui]
            theme = "nord"

            [export]
            directory = "/tmp/exports"
        "#;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config.backend.api_key, "test_key");
        assert_eq!(config.backend.app_id, "secretary-mate");
        assert!(config.backend.is_complete());
        assert_eq!(config.auth.bootstrap_token.as_deref(), Some("custom-token"));
        assert_eq!(config.sync.poll_interval_seconds, 10);
        assert!(!config.uses_remote_backend());
        assert_eq!(config.ui.theme, "nord");
        assert_eq!(config.export.directory, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn missing_app_id_falls_back_to_default() {
        let toml_content = r#"
            [backend]
            api_key = "k"
            project_id = "p"

            [sync]
            poll_interval_seconds = 30
            offline_mode = false
            offline_database = "/tmp/events.db"

            [ui]
            theme = "default"
        "#;

        let config = Config::from_toml(toml_content).unwrap();

        assert_eq!(config.backend.app_id, DEFAULT_APP_ID);
        assert!(config.auth.bootstrap_token.is_none());
    }

    #[test]
    fn default_config_survives_a_toml_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();

        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let invalid_toml = "this is not valid toml";
        let result = Config::from_toml(invalid_toml);
        assert!(result.is_err());
    }
}
