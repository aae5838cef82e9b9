use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use tokio::io::AsyncWriteExt;

use super::{ApiError, Envelope, RequireSession};
use crate::http_server::paths::{display_relative, plain_name, resolve_under_root};
use crate::ServiceState;

const DIR_FIELD: &str = "filePath";
const FILE_FIELD: &str = "file";
const UPLOAD_PREFIX: &str = ".filegate-upload-";

/// Store the uploaded files in the directory named by `filePath`.
///
/// Fields are consumed in order, so `filePath` has to precede the files it
/// applies to. Files sent before any `filePath` land in the root.
pub async fn handler(
    _session: RequireSession,
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<Envelope<Vec<String>>, ApiError> {
    if !state.settings().allow_upload {
        return Err(ApiError::Disabled);
    }

    let root = state.root_dir();
    let mut target_dir = root.to_path_buf();
    let mut stored = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(DIR_FIELD) => {
                let requested = field.text().await?;
                target_dir = resolve_under_root(root, &requested)?;
            }
            Some(FILE_FIELD) => {
                let file_name = field
                    .file_name()
                    .map(upload_name)
                    .transpose()?
                    .ok_or_else(|| ApiError::BadRequest("file field has no file name".into()))?;
                let destination = target_dir.join(&file_name);

                let bytes = store_field(field, &destination).await?;
                tracing::info!(
                    path = %display_relative(root, &destination),
                    bytes,
                    "upload: stored file"
                );
                stored.push(file_name);
            }
            other => {
                tracing::debug!(field = ?other, "upload: ignoring unknown field");
            }
        }
    }

    if stored.is_empty() {
        return Err(ApiError::BadRequest("no file in upload".into()));
    }
    Ok(Envelope::ok(stored))
}

/// Browsers may send a full client-side path; keep only the last segment
fn upload_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    Ok(plain_name(name)?.to_string())
}

/// Stream one field into a temp file beside `destination`, then rename it over.
///
/// An upload that breaks off leaves any existing file at `destination` as it was.
async fn store_field(mut field: Field<'_>, destination: &Path) -> Result<u64, ApiError> {
    let dir = destination
        .parent()
        .ok_or_else(|| ApiError::BadRequest("upload target has no parent".into()))?;
    let staged = tempfile::Builder::new()
        .prefix(UPLOAD_PREFIX)
        .tempfile_in(dir)?;
    let mut file = tokio::fs::File::from_std(staged.reopen()?);

    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    staged.persist(destination).map_err(|e| e.error)?;
    Ok(written)
}
