//! Validation of user-supplied note paths before any file is opened.

use crate::matching::NOTE_EXTENSION;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Segments refused even though they are not dot-prefixed.
const BLOCKED_SEGMENTS: &[&str] = &["_private"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path is syntactically unacceptable.
    #[error("invalid path: {0}")]
    Invalid(String),
    /// The path is well formed but reaches outside the vault or into a
    /// hidden/blocked location.
    #[error("access denied: {0}")]
    Forbidden(String),
    #[error("note not found: {0}")]
    NotFound(String),
}

/// Check a relative note path requested by a client.
///
/// Rejects, in order: non-note extensions, null bytes, backslashes, absolute
/// paths, empty or `..` segments (all `Invalid`), then hidden or blocked
/// segments (`Forbidden`).
pub fn validate_note_path(raw: &str) -> Result<&str, PathError> {
    if !raw.to_lowercase().ends_with(NOTE_EXTENSION) {
        return Err(PathError::Invalid("only .md notes can be read".into()));
    }
    if raw.contains('\0') {
        return Err(PathError::Invalid("path must not contain null bytes".into()));
    }
    if raw.contains('\\') {
        return Err(PathError::Invalid("path must not contain backslashes".into()));
    }
    if raw.starts_with('/') {
        return Err(PathError::Invalid("path must be relative".into()));
    }
    for segment in raw.split('/') {
        if segment.is_empty() {
            return Err(PathError::Invalid("path must not contain empty segments".into()));
        }
        if segment == ".." {
            return Err(PathError::Invalid("path must not contain '..' segments".into()));
        }
    }
    if let Some(segment) = raw
        .split('/')
        .find(|s| s.starts_with('.') || BLOCKED_SEGMENTS.contains(s))
    {
        return Err(PathError::Forbidden(format!(
            "'{segment}' is a blocked or hidden path segment"
        )));
    }
    Ok(raw)
}

/// Validate `raw` and resolve it to an existing note file under `root`.
///
/// Symlinks are followed before the containment check, so a link pointing
/// out of the vault is refused as `Forbidden`.
pub fn resolve_note(root: &Path, raw: &str) -> Result<PathBuf, PathError> {
    let rel = validate_note_path(raw)?;

    let root = root
        .canonicalize()
        .map_err(|_| PathError::NotFound("vault root is unavailable".into()))?;
    let resolved = root
        .join(rel)
        .canonicalize()
        .map_err(|_| PathError::NotFound(raw.to_string()))?;

    if !resolved.starts_with(&root) {
        return Err(PathError::Forbidden("path resolves outside the vault".into()));
    }
    if !resolved.is_file() {
        return Err(PathError::NotFound(raw.to_string()));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    // === validate_note_path ===

    #[test]
    fn accepts_plain_relative_note() {
        assert_eq!(validate_note_path("02-projects/Note Name.md"), Ok("02-projects/Note Name.md"));
    }

    #[test]
    fn rejects_non_notes() {
        assert!(matches!(validate_note_path("image.png"), Err(PathError::Invalid(_))));
    }

    #[test]
    fn rejects_malformed_paths() {
        for raw in ["a\0b.md", "a\\b.md", "/etc/x.md", "a/../b.md", "a//b.md"] {
            assert!(
                matches!(validate_note_path(raw), Err(PathError::Invalid(_))),
                "expected Invalid for {raw:?}"
            );
        }
    }

    #[test]
    fn rejects_hidden_and_blocked_segments() {
        for raw in [".git/config.md", "a/.hidden.md", "_private/diary.md"] {
            assert!(
                matches!(validate_note_path(raw), Err(PathError::Forbidden(_))),
                "expected Forbidden for {raw:?}"
            );
        }
    }

    // === resolve_note ===

    #[test]
    fn resolves_existing_note() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/n.md"), "x").unwrap();

        let resolved = resolve_note(dir.path(), "sub/n.md").unwrap();
        assert!(resolved.ends_with("sub/n.md"));
    }

    #[test]
    fn missing_note_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_note(dir.path(), "nope.md"),
            Err(PathError::NotFound("nope.md".into()))
        );
    }

    #[test]
    fn directory_is_not_a_note() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("folder.md")).unwrap();
        assert!(matches!(
            resolve_note(dir.path(), "folder.md"),
            Err(PathError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_escape_is_forbidden() {
        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("secret.md"), "x").unwrap();
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path().join("secret.md"), dir.path().join("link.md"))
            .unwrap();

        assert!(matches!(
            resolve_note(dir.path(), "link.md"),
            Err(PathError::Forbidden(_))
        ));
    }
}
