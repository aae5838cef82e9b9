use axum::extract::{Query, State};
use serde::Deserialize;

use super::{ApiError, Envelope, RequireSession};
use crate::http_server::paths::{display_relative, resolve_under_root};
use crate::ServiceState;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MkdirParams {
    #[serde(default)]
    pub dir_path: String,
}

/// Create a single directory; its parent must already exist
pub async fn handler(
    _session: RequireSession,
    State(state): State<ServiceState>,
    Query(params): Query<MkdirParams>,
) -> Result<Envelope<()>, ApiError> {
    if !state.settings().allow_mkdir {
        return Err(ApiError::Disabled);
    }

    let target = resolve_under_root(state.root_dir(), &params.dir_path)?;
    if target == state.root_dir() {
        return Err(ApiError::BadRequest("no directory name given".into()));
    }

    tokio::fs::create_dir(&target).await?;

    tracing::info!(
        path = %display_relative(state.root_dir(), &target),
        "mkdir: created directory"
    );
    Ok(Envelope::done())
}
