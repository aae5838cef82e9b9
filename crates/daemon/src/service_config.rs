use std::path::PathBuf;

use common::prelude::PathTokenLifetime;

use crate::state::AppConfig;

/// Fully resolved runtime configuration, built once before the server starts
#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Port the HTTP server listens on (all interfaces)
    pub port: u16,

    // file tree
    /// Directory served to clients
    pub root_dir: PathBuf,
    /// Front-end assets for the fallback route, 404 if not set
    pub static_dir: Option<PathBuf>,
    /// Where folder archives are staged, system temp dir if not set
    pub archive_dir: Option<PathBuf>,

    // features advertised through /base
    pub title: String,
    pub allow_upload: bool,
    pub allow_delete: bool,
    pub allow_mkdir: bool,
    pub show_hidden: bool,

    // auth
    /// Login secret, authentication is disabled when empty
    pub auth_code: Option<String>,
    pub path_token_lifetime: PathTokenLifetime,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}

impl From<AppConfig> for Config {
    fn from(config: AppConfig) -> Self {
        Self {
            port: config.port,
            root_dir: config.root_dir,
            static_dir: config.static_dir,
            archive_dir: config.archive_dir,
            title: config.title,
            allow_upload: config.allow_upload,
            allow_delete: config.allow_delete,
            allow_mkdir: config.allow_mkdir,
            show_hidden: config.show_hidden,
            auth_code: config.auth_code,
            path_token_lifetime: config.path_token_lifetime,
            log_level: tracing::Level::INFO,
            log_dir: config.log_dir,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        AppConfig::default().into()
    }
}
