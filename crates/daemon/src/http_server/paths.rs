use std::path::{Component, Path, PathBuf};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path segment {0:?} escapes the served directory")]
    Traversal(String),
    #[error("path segment {0:?} is not a plain name")]
    NotAName(String),
}

/// Resolve a client-supplied relative path beneath `root`.
///
/// Both `/` and `\` separate segments. Empty and `.` segments are skipped, so
/// a leading slash still means "relative to the root". `..` and anything that
/// does not parse as a single normal path component (drive prefixes, for one)
/// are rejected.
pub fn resolve_under_root(root: &Path, relative: &str) -> Result<PathBuf, PathError> {
    let mut resolved = root.to_path_buf();
    for segment in relative.split(['/', '\\']) {
        if segment.is_empty() || segment == "." {
            continue;
        }
        resolved.push(plain_name(segment)?);
    }
    Ok(resolved)
}

/// Check that `name` is exactly one normal path component
pub fn plain_name(name: &str) -> Result<&str, PathError> {
    if name == ".." {
        return Err(PathError::Traversal(name.to_string()));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        (Some(Component::ParentDir), _) => Err(PathError::Traversal(name.to_string())),
        _ => Err(PathError::NotAName(name.to_string())),
    }
}

/// Render `path` relative to `root` with forward slashes, for log lines
pub fn display_relative(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if relative.as_os_str().is_empty() => "/".to_string(),
        Ok(relative) => format!("/{}", relative.to_string_lossy().replace('\\', "/")),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_nested_segments() {
        let root = Path::new("/srv/files");
        assert_eq!(
            resolve_under_root(root, "music/2024").unwrap(),
            root.join("music").join("2024")
        );
        assert_eq!(
            resolve_under_root(root, "/music//./2024/").unwrap(),
            root.join("music").join("2024")
        );
        assert_eq!(
            resolve_under_root(root, "music\\2024").unwrap(),
            root.join("music").join("2024")
        );
    }

    #[test]
    fn test_empty_path_is_root() {
        let root = Path::new("/srv/files");
        assert_eq!(resolve_under_root(root, "").unwrap(), root);
        assert_eq!(resolve_under_root(root, "/").unwrap(), root);
    }

    #[test]
    fn test_rejects_parent_segments() {
        let root = Path::new("/srv/files");
        assert_eq!(
            resolve_under_root(root, "../etc"),
            Err(PathError::Traversal("..".to_string()))
        );
        assert!(resolve_under_root(root, "music/../../etc").is_err());
        assert!(resolve_under_root(root, "music\\..\\..").is_err());
    }

    #[test]
    fn test_dotted_names_are_fine() {
        let root = Path::new("/srv/files");
        assert_eq!(
            resolve_under_root(root, ".config/...weird").unwrap(),
            root.join(".config").join("...weird")
        );
    }

    #[test]
    fn test_display_relative() {
        let root = Path::new("/srv/files");
        assert_eq!(display_relative(root, root), "/");
        assert_eq!(display_relative(root, &root.join("a").join("b.txt")), "/a/b.txt");
    }
}
