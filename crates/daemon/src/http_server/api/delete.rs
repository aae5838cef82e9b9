use axum::extract::{Query, State};
use serde::Deserialize;

use super::{ApiError, Envelope, RequireSession};
use crate::http_server::paths::{display_relative, plain_name, resolve_under_root};
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteParams {
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub file_name: String,
}

/// Remove one file, or one directory if it is empty
pub async fn handler(
    _session: RequireSession,
    State(state): State<ServiceState>,
    Query(params): Query<DeleteParams>,
) -> Result<Envelope<()>, ApiError> {
    if !state.settings().allow_delete {
        return Err(ApiError::Disabled);
    }

    let dir = resolve_under_root(state.root_dir(), &params.file_path)?;
    let target = dir.join(plain_name(&params.file_name)?);

    // never follow a symlink to its target
    let metadata = tokio::fs::symlink_metadata(&target).await?;
    if metadata.is_dir() {
        tokio::fs::remove_dir(&target).await?;
    } else {
        tokio::fs::remove_file(&target).await?;
    }

    tracing::info!(
        path = %display_relative(state.root_dir(), &target),
        "delete: removed entry"
    );
    Ok(Envelope::done())
}
