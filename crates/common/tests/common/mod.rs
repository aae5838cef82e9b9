//! Shared test utilities for auth and archive integration tests
#![allow(dead_code)]

use std::fs;
use std::io::{Read, Seek};
use std::path::Path;

use chrono::{DateTime, Duration, Utc};

/// Fixed reference instant so expiry arithmetic is exact
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}

/// Create `relative` (with `/` separators) under `root`, making parents as needed
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = relative
        .split('/')
        .fold(root.to_path_buf(), |acc, part| acc.join(part));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Entry names of a zip archive in stored order
pub fn entry_names<R: Read + Seek>(reader: R) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(reader).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Read one entry of a zip archive fully
pub fn entry_contents<R: Read + Seek>(reader: R, name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(reader).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut buf = Vec::new();
    entry.read_to_end(&mut buf).unwrap();
    buf
}
