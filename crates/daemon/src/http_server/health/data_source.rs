use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use http::request::Parts;

use crate::ServiceState;

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("one or more dependencies aren't available")]
    DependencyFailure,
}

/// Something the server needs before it can take traffic
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn is_ready(&self) -> Result<(), DataSourceError>;
}

/// The served root must stay a readable directory
#[derive(Debug, Clone)]
pub struct RootDirReadiness {
    root: PathBuf,
}

impl RootDirReadiness {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DataSource for RootDirReadiness {
    async fn is_ready(&self) -> Result<(), DataSourceError> {
        match tokio::fs::read_dir(&self.root).await {
            Ok(_) => Ok(()),
            Err(e) => {
                tracing::error!(root = %self.root.display(), "readiness: root unreadable: {}", e);
                Err(DataSourceError::DependencyFailure)
            }
        }
    }
}

#[derive(Clone)]
pub struct StateDataSource {
    inner: Arc<dyn DataSource>,
}

impl StateDataSource {
    pub fn new(inner: Arc<dyn DataSource>) -> Self {
        Self { inner }
    }

    pub async fn is_ready(&self) -> Result<(), DataSourceError> {
        self.inner.is_ready().await
    }
}

#[async_trait]
impl FromRequestParts<ServiceState> for StateDataSource {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        Ok(StateDataSource::new(Arc::new(RootDirReadiness::new(
            state.root_dir(),
        ))))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) enum MockReadiness {
        Ready,
        DependencyFailure,
    }

    #[async_trait]
    impl DataSource for MockReadiness {
        async fn is_ready(&self) -> Result<(), DataSourceError> {
            match self {
                MockReadiness::Ready => Ok(()),
                MockReadiness::DependencyFailure => Err(DataSourceError::DependencyFailure),
            }
        }
    }

    #[tokio::test]
    async fn test_root_dir_readiness() {
        let temp = tempfile::tempdir().unwrap();
        assert!(RootDirReadiness::new(temp.path()).is_ready().await.is_ok());

        let missing = RootDirReadiness::new(temp.path().join("gone"));
        assert!(matches!(
            missing.is_ready().await,
            Err(DataSourceError::DependencyFailure)
        ));
    }
}
