use std::cmp::Ordering;
use std::fs::Metadata;
use std::time::SystemTime;

use axum::extract::{Query, State};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::{ApiError, Envelope, RequireSession};
use crate::http_server::paths::{display_relative, resolve_under_root};
use crate::ServiceState;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const MODIFIED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default)]
    pub file_path: String,
    /// Parsed leniently; anything but a bool falls back to the server default
    #[serde(default)]
    pub show_hidden: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedEntry {
    pub name: String,
    /// The directory that was listed, as requested
    pub path: String,
    /// Extension after the last dot, or `folder`
    pub file_type: String,
    /// Human readable size, empty for directories
    pub size: String,
    pub bytes: u64,
    pub modified: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

pub async fn handler(
    _session: RequireSession,
    State(state): State<ServiceState>,
    Query(params): Query<QueryParams>,
) -> Result<Envelope<Vec<ListedEntry>>, ApiError> {
    let dir = resolve_under_root(state.root_dir(), &params.file_path)?;
    let show_hidden = params
        .show_hidden
        .as_deref()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(state.settings().show_hidden);

    let mut read_dir = tokio::fs::read_dir(&dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !show_hidden && name.starts_with('.') {
            continue;
        }

        // follow symlinks, fall back to the link itself when dangling
        let metadata = match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) => metadata,
            Err(_) => entry.metadata().await?,
        };
        entries.push(listed_entry(name, &params.file_path, &metadata));
    }

    entries.sort_by(|a, b| match (a.kind, b.kind) {
        (EntryKind::Dir, EntryKind::File) => Ordering::Less,
        (EntryKind::File, EntryKind::Dir) => Ordering::Greater,
        _ => a.name.cmp(&b.name),
    });

    tracing::info!(
        dir = %display_relative(state.root_dir(), &dir),
        entries = entries.len(),
        "query: listed directory"
    );
    Ok(Envelope::ok(entries))
}

fn listed_entry(name: String, requested: &str, metadata: &Metadata) -> ListedEntry {
    let modified = metadata
        .modified()
        .map(format_modified)
        .unwrap_or_default();

    if metadata.is_dir() {
        ListedEntry {
            name,
            path: requested.to_string(),
            file_type: "folder".to_string(),
            size: String::new(),
            bytes: 0,
            modified,
            kind: EntryKind::Dir,
        }
    } else {
        let file_type = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();
        ListedEntry {
            file_type,
            name,
            path: requested.to_string(),
            size: format_size(metadata.len()),
            bytes: metadata.len(),
            modified,
            kind: EntryKind::File,
        }
    }
}

fn format_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(MODIFIED_FORMAT).to_string()
}

/// `1536` renders as `1.50KB`, whole values drop the decimals
pub fn format_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if (size * 100.0) as u64 % 100 == 0 {
        format!("{}{}", size as u64, SIZE_UNITS[unit])
    } else {
        format!("{:.2}{}", size, SIZE_UNITS[unit])
    }
}
