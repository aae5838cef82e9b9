use std::path::PathBuf;

use clap::Args;

use filegate::state::{AppConfig, AppState, DEFAULT_PORT};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// HTTP port to record in the config
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory to serve
    #[arg(long = "root", default_value = ".")]
    pub root_dir: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] filegate::state::StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            port: self.port,
            root_dir: self.root_dir.clone(),
            ..AppConfig::default()
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        let output = format!(
            "Initialized filegate directory at: {}\n\
             - Config: {}\n\
             - Port: {}\n\
             - Root: {}\n\
             - Authentication: disabled until auth_code is set",
            state.app_dir.display(),
            state.config_path.display(),
            state.config.port,
            state.config.root_dir.display(),
        );

        Ok(output)
    }
}
