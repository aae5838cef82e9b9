use std::{fs, path::PathBuf};

use common::prelude::PathTokenLifetime;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "filegate";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_PORT: u16 = 8800;
pub const DEFAULT_TITLE: &str = "HTTP File Server";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port for the HTTP server
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory whose contents are browsed and downloaded
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,
    /// Title shown by the front-end
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default)]
    pub allow_upload: bool,
    #[serde(default)]
    pub allow_delete: bool,
    #[serde(default)]
    pub allow_mkdir: bool,
    /// Whether listings include dot-files unless the client says otherwise
    #[serde(default = "default_show_hidden")]
    pub show_hidden: bool,
    /// Front-end assets served for any unmatched route
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Scratch directory for folder archives (system temp dir if unset)
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,
    /// Directory for log files (stdout only if unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// How long download tokens stay valid
    #[serde(default)]
    pub path_token_lifetime: PathTokenLifetime,
    /// Login secret; empty or missing disables authentication
    #[serde(default)]
    pub auth_code: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_root_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_show_hidden() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            root_dir: default_root_dir(),
            title: default_title(),
            allow_upload: false,
            allow_delete: false,
            allow_mkdir: false,
            show_hidden: default_show_hidden(),
            static_dir: None,
            archive_dir: None,
            log_dir: None,
            path_token_lifetime: PathTokenLifetime::default(),
            auth_code: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the filegate directory (~/.filegate)
    pub app_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the filegate directory path (custom or default ~/.filegate)
    pub fn app_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Write a config file into a fresh filegate directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&app_dir)?;

        let config = config.unwrap_or_default();
        let config_toml = toml::to_string_pretty(&config)?;
        fs::write(&config_path, config_toml)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the filegate directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(custom_path)?;
        let config_path = app_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            app_dir,
            config_path,
            config,
        })
    }

    /// Like [`AppState::load`], but an uninitialized directory yields defaults
    pub fn load_or_default(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        match Self::load(custom_path.clone()) {
            Err(StateError::NotInitialized) => {
                let app_dir = Self::app_dir(custom_path)?;
                tracing::debug!(dir = %app_dir.display(), "no config file found, using defaults");
                Ok(Self {
                    config_path: app_dir.join(CONFIG_FILE_NAME),
                    app_dir,
                    config: AppConfig::default(),
                })
            }
            other => other,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("filegate directory already initialized")]
    AlreadyInitialized,

    #[error("filegate directory not initialized. Run 'filegate init' first")]
    NotInitialized,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}
