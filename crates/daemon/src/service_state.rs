use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::prelude::Authenticator;

use crate::ServiceConfig;

/// Feature switches and labels reported by `/base`
#[derive(Debug, Clone)]
pub struct Settings {
    pub title: String,
    pub allow_upload: bool,
    pub allow_delete: bool,
    pub allow_mkdir: bool,
    pub show_hidden: bool,
}

#[derive(Debug, Clone)]
pub struct State {
    auth: Arc<Authenticator>,
    root_dir: PathBuf,
    archive_dir: PathBuf,
    static_dir: Option<PathBuf>,
    settings: Arc<Settings>,
}

impl State {
    pub async fn from_config(config: &ServiceConfig) -> Result<Self, StateSetupError> {
        let root_dir = tokio::fs::canonicalize(&config.root_dir)
            .await
            .map_err(|e| StateSetupError::RootDir(config.root_dir.clone(), e))?;
        if !tokio::fs::metadata(&root_dir)
            .await
            .map_err(|e| StateSetupError::RootDir(root_dir.clone(), e))?
            .is_dir()
        {
            return Err(StateSetupError::RootNotADirectory(root_dir));
        }

        let archive_dir = match &config.archive_dir {
            Some(dir) => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| StateSetupError::ArchiveDir(dir.clone(), e))?;
                let dir = tokio::fs::canonicalize(dir)
                    .await
                    .map_err(|e| StateSetupError::ArchiveDir(dir.clone(), e))?;
                if dir.starts_with(&root_dir) {
                    return Err(StateSetupError::ArchiveDirInsideRoot(dir));
                }
                dir
            }
            None => default_archive_dir(&root_dir).await?,
        };

        let auth = Authenticator::new(config.auth_code.clone(), config.path_token_lifetime);
        if auth.is_enabled() {
            tracing::info!(
                lifetime = %auth.path_token_lifetime(),
                "authentication enabled"
            );
        } else {
            tracing::warn!("no auth code configured, authentication is disabled");
        }

        tracing::info!(
            root = %root_dir.display(),
            archives = %archive_dir.display(),
            "serving file tree"
        );

        Ok(Self {
            auth: Arc::new(auth),
            root_dir,
            archive_dir,
            static_dir: config.static_dir.clone(),
            settings: Arc::new(Settings {
                title: config.title.clone(),
                allow_upload: config.allow_upload,
                allow_delete: config.allow_delete,
                allow_mkdir: config.allow_mkdir,
                show_hidden: config.show_hidden,
            }),
        })
    }

    pub fn auth(&self) -> &Authenticator {
        &self.auth
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    pub fn static_dir(&self) -> Option<&Path> {
        self.static_dir.as_deref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

/// The system temp dir, or the user cache dir when the temp dir is served
async fn default_archive_dir(root_dir: &Path) -> Result<PathBuf, StateSetupError> {
    let mut candidates = vec![std::env::temp_dir()];
    if let Some(cache) = dirs::cache_dir() {
        candidates.push(cache.join(crate::state::APP_NAME).join("archives"));
    }

    for candidate in candidates {
        if tokio::fs::create_dir_all(&candidate).await.is_err() {
            continue;
        }
        let Ok(dir) = tokio::fs::canonicalize(&candidate).await else {
            continue;
        };
        if !dir.starts_with(root_dir) {
            return Ok(dir);
        }
        tracing::debug!(dir = %dir.display(), "scratch dir lies inside the root, trying next");
    }

    Err(StateSetupError::NoArchiveDir(root_dir.to_path_buf()))
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("root directory {0:?} is not accessible: {1}")]
    RootDir(PathBuf, #[source] std::io::Error),
    #[error("root {0:?} is not a directory")]
    RootNotADirectory(PathBuf),
    #[error("archive directory {0:?} could not be created: {1}")]
    ArchiveDir(PathBuf, #[source] std::io::Error),
    #[error("archive directory {0:?} lies inside the served root")]
    ArchiveDirInsideRoot(PathBuf),
    #[error("no scratch directory outside {0:?}, set archive_dir")]
    NoArchiveDir(PathBuf),
}
