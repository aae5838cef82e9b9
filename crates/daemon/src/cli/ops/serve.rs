use std::path::PathBuf;

use clap::Args;

use common::prelude::PathTokenLifetime;
use filegate::state::AppState;
use filegate::{spawn_service, ServiceConfig};

#[derive(Args, Debug, Clone)]
pub struct Serve {
    /// Login secret; leave empty to disable authentication
    #[arg(long, env = "AUTH_CODE", hide_env_values = true)]
    pub auth_code: Option<String>,

    /// Directory to serve
    #[arg(long = "root", env = "FILE_PATH")]
    pub root_dir: Option<PathBuf>,

    /// Title shown by the front-end
    #[arg(long, env = "TITLE")]
    pub title: Option<String>,

    #[arg(long, env = "IS_UPDATE")]
    pub allow_upload: Option<bool>,

    #[arg(long, env = "IS_DELETE")]
    pub allow_delete: Option<bool>,

    #[arg(long, env = "IS_MKDIR")]
    pub allow_mkdir: Option<bool>,

    /// List dot-files unless the client asks otherwise
    #[arg(long, env = "SHOW_HIDDEN")]
    pub show_hidden: Option<bool>,

    /// Override HTTP port (default from config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Front-end assets served for unmatched routes
    #[arg(long)]
    pub static_dir: Option<PathBuf>,

    /// Scratch directory for folder archives
    #[arg(long)]
    pub archive_dir: Option<PathBuf>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    /// `process` keeps download tokens until restart, `session` expires them with the session
    #[arg(long)]
    pub path_token_lifetime: Option<PathTokenLifetime>,
}

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("state error: {0}")]
    StateError(#[from] filegate::state::StateError),
}

impl Serve {
    /// Layer the flags over the loaded config
    pub fn service_config(&self, state: AppState) -> ServiceConfig {
        let mut config = state.config;

        if let Some(auth_code) = &self.auth_code {
            config.auth_code = Some(auth_code.clone());
        }
        if let Some(root_dir) = &self.root_dir {
            config.root_dir = root_dir.clone();
        }
        if let Some(title) = self.title.as_ref().filter(|t| !t.is_empty()) {
            config.title = title.clone();
        }
        config.allow_upload = self.allow_upload.unwrap_or(config.allow_upload);
        config.allow_delete = self.allow_delete.unwrap_or(config.allow_delete);
        config.allow_mkdir = self.allow_mkdir.unwrap_or(config.allow_mkdir);
        config.show_hidden = self.show_hidden.unwrap_or(config.show_hidden);
        config.port = self.port.unwrap_or(config.port);
        config.static_dir = self.static_dir.clone().or(config.static_dir);
        config.archive_dir = self.archive_dir.clone().or(config.archive_dir);
        config.log_dir = self.log_dir.clone().or(config.log_dir);
        config.path_token_lifetime = self
            .path_token_lifetime
            .unwrap_or(config.path_token_lifetime);

        let mut service_config = ServiceConfig::from(config);
        service_config.log_level = self.log_level;
        service_config
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Serve {
    type Error = ServeError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // a missing config file just means defaults
        let state = AppState::load_or_default(ctx.config_path.clone())?;
        let config = self.service_config(state);

        spawn_service(&config).await;
        Ok("server stopped".to_string())
    }
}
