use std::io;
use std::path::{Path as FsPath, PathBuf};

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use common::prelude::{ArchiveError, AuthError, TempArchive};

use super::api::{Envelope, CODE_UNAUTHORIZED};
use super::paths::{display_relative, plain_name, resolve_under_root, PathError};
use crate::ServiceState;

/// Final segment prefix asking for a zip of the named directory
pub const ARCHIVE_PREFIX: &str = "pkgDir_";
const ARCHIVE_SUFFIX: &str = ".zip";
const ROOT_ARCHIVE_NAME: &str = "root.zip";

/// What a download URL points at, resolved beneath the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadTarget {
    File { path: PathBuf, name: String },
    Archive { dir: PathBuf, name: String },
}

/// Split the part of the URL after the path token into a target.
///
/// The last segment names the file. With the archive prefix it names a
/// directory (minus `.zip`) inside the preceding segments instead, and an
/// empty name means the preceding directory itself.
pub fn parse_target(root: &FsPath, rest: &str) -> Result<DownloadTarget, PathError> {
    let (dirs, last) = rest.rsplit_once('/').unwrap_or(("", rest));
    let parent = resolve_under_root(root, dirs)?;

    match last.strip_prefix(ARCHIVE_PREFIX) {
        Some(archive) => {
            let dir_name = archive.strip_suffix(ARCHIVE_SUFFIX).unwrap_or(archive);
            if dir_name.is_empty() {
                Ok(DownloadTarget::Archive {
                    dir: parent,
                    name: ROOT_ARCHIVE_NAME.to_string(),
                })
            } else {
                let dir_name = plain_name(dir_name)?;
                Ok(DownloadTarget::Archive {
                    dir: parent.join(dir_name),
                    name: format!("{}{}", dir_name, ARCHIVE_SUFFIX),
                })
            }
        }
        None => {
            let name = plain_name(last)?;
            Ok(DownloadTarget::File {
                path: parent.join(name),
                name: name.to_string(),
            })
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path((token, rest)): Path<(String, String)>,
    request: Request,
) -> Response {
    let decision = state.auth().check_path_token(&token, Utc::now());
    if !decision.message().is_empty() {
        tracing::info!("download: {}", decision.message());
    }
    if !decision.is_authorized() {
        let envelope =
            Envelope::<()>::failure(CODE_UNAUTHORIZED, AuthError::PathTokenRejected.to_string());
        return (StatusCode::FORBIDDEN, axum::Json(envelope)).into_response();
    }

    match serve(&state, &rest, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn serve(
    state: &ServiceState,
    rest: &str,
    request: Request,
) -> Result<Response, DownloadError> {
    match parse_target(state.root_dir(), rest)? {
        DownloadTarget::Archive { dir, name } => {
            tracing::info!(
                dir = %display_relative(state.root_dir(), &dir),
                "download: archiving directory"
            );
            serve_archive(state.archive_dir().to_path_buf(), dir, &name).await
        }
        DownloadTarget::File { path, name } => {
            tracing::info!(
                path = %display_relative(state.root_dir(), &path),
                "download: serving file"
            );
            serve_file(path, &name, request).await
        }
    }
}

async fn serve_archive(
    scratch_dir: PathBuf,
    dir: PathBuf,
    name: &str,
) -> Result<Response, DownloadError> {
    let archive =
        tokio::task::spawn_blocking(move || TempArchive::build_in(&scratch_dir, &dir)).await??;

    let file = tokio::fs::File::from_std(archive.open()?);
    let len = file.metadata().await?.len();

    // the archive rides along with the stream and is deleted once the body is dropped
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _ = &archive;
        chunk
    });

    let mut response = Response::new(Body::from_stream(stream));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/zip"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    headers.insert(header::CONTENT_DISPOSITION, content_disposition(name));
    Ok(response)
}

async fn serve_file(path: PathBuf, name: &str, request: Request) -> Result<Response, DownloadError> {
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(DownloadError::NotFound),
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        return Err(DownloadError::IsDirectory);
    }

    let response = match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let mut response = response.map(Body::new);
    if response.status().is_success() {
        response
            .headers_mut()
            .insert(header::CONTENT_DISPOSITION, content_disposition(name));
    }
    Ok(response)
}

/// `attachment` with an ASCII fallback name and the exact UTF-8 name per RFC 5987
pub fn content_disposition(name: &str) -> HeaderValue {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();

    let mut encoded = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }

    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("file not found")]
    NotFound,
    #[error("target is a directory, request it as an archive")]
    IsDirectory,
    #[error("archive failed: {0}")]
    Archive(#[from] ArchiveError),
    #[error("archive task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl DownloadError {
    /// Body sent to the client; the full error with server paths only goes to the log
    fn client_message(&self) -> &'static str {
        match self {
            DownloadError::Path(_) => "invalid path",
            DownloadError::NotFound => "file not found",
            DownloadError::IsDirectory => "target is a directory, request it as an archive",
            DownloadError::Archive(ArchiveError::NotADirectory(_)) => "directory not found",
            DownloadError::Archive(_) | DownloadError::Join(_) => "archive failed",
            DownloadError::Io(_) => "download failed",
        }
    }
}

impl IntoResponse for DownloadError {
    fn into_response(self) -> Response {
        let status = match &self {
            DownloadError::Path(_) | DownloadError::IsDirectory => StatusCode::BAD_REQUEST,
            DownloadError::NotFound | DownloadError::Archive(ArchiveError::NotADirectory(_)) => {
                StatusCode::NOT_FOUND
            }
            DownloadError::Archive(_) | DownloadError::Join(_) | DownloadError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!("download: {}", self);
        } else {
            tracing::warn!("download: {}", self);
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain")],
            self.client_message(),
        )
            .into_response()
    }
}
