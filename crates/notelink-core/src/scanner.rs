//! Vault scanning: enumerate every note under a sandboxed root.
//!
//! The rest of the crate only sees `NoteRecord`s produced through the
//! `NoteSource` trait, so the index and the backlink scanner never touch the
//! filesystem themselves.

use crate::matching::{is_note_path, note_filename};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Directory-name prefixes skipped by default: dot-directories (`.git`,
/// `.obsidian`) and underscore folders (`_private`, `_attachments`).
pub const DEFAULT_SKIP_PREFIXES: &[&str] = &[".", "_"];

/// Failure while enumerating or reading the vault.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("vault root does not exist: {}", .0.display())]
    RootMissing(PathBuf),

    #[error("vault root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to walk vault: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One note file as seen at scan time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteRecord {
    /// `/`-separated path relative to the vault root. Unique within a scan.
    pub path: String,
    /// Raw file contents, frontmatter included.
    pub body: String,
}

impl NoteRecord {
    pub fn new(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }

    /// Bare filename used for link matching, e.g. "Ideas" for "a/Ideas.md".
    pub fn filename(&self) -> Option<&str> {
        note_filename(&self.path)
    }
}

/// Anything that can produce the full set of notes of a vault.
///
/// Implementations must not yield two records with the same `path`, and every
/// `path` must stay beneath the vault root.
pub trait NoteSource: Send + Sync {
    fn scan(&self) -> Result<Vec<NoteRecord>, ScanError>;
}

// ---------------------------------------------------------------------------
// FsVault
// ---------------------------------------------------------------------------

/// A vault rooted at a directory on disk.
///
/// Symlinks are never followed, so nothing outside the root can be reached.
/// Hidden files, skipped directories, non-note files and files that are not
/// valid UTF-8 are left out. Entries are visited in file-name order so the
/// scan order (and with it bucket order in the index) is reproducible.
#[derive(Debug, Clone)]
pub struct FsVault {
    root: PathBuf,
    skip_prefixes: Vec<String>,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            skip_prefixes: DEFAULT_SKIP_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn with_skip_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.skip_prefixes = prefixes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_skipped_dir(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.skip_prefixes
            .iter()
            .any(|prefix| !prefix.is_empty() && name.starts_with(prefix.as_str()))
    }
}

/// Relative `/`-joined path of `path` under `root`, or `None` when a segment
/// is not valid UTF-8.
fn relative_vault_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut segments = Vec::new();
    for component in rel.components() {
        segments.push(component.as_os_str().to_str()?);
    }
    Some(segments.join("/"))
}

impl NoteSource for FsVault {
    fn scan(&self) -> Result<Vec<NoteRecord>, ScanError> {
        if !self.root.exists() {
            return Err(ScanError::RootMissing(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }

        let mut notes = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_skipped_dir(entry));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            let Some(path) = relative_vault_path(&self.root, entry.path()) else {
                tracing::warn!("Skipping non UTF-8 path: {}", entry.path().display());
                continue;
            };
            if !is_note_path(&path) {
                continue;
            }

            let bytes = std::fs::read(entry.path()).map_err(|source| ScanError::Read {
                path: path.clone(),
                source,
            })?;
            match String::from_utf8(bytes) {
                Ok(body) => notes.push(NoteRecord { path, body }),
                Err(_) => tracing::warn!("Skipping {}: not valid UTF-8", path),
            }
        }

        tracing::debug!(
            "Scanned {} notes under {}",
            notes.len(),
            self.root.display()
        );
        Ok(notes)
    }
}

// ---------------------------------------------------------------------------
// MemoryVault
// ---------------------------------------------------------------------------

/// A fixed set of notes held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    notes: Vec<NoteRecord>,
}

impl MemoryVault {
    pub fn new<P, B>(notes: impl IntoIterator<Item = (P, B)>) -> Self
    where
        P: Into<String>,
        B: Into<String>,
    {
        Self {
            notes: notes
                .into_iter()
                .map(|(path, body)| NoteRecord::new(path, body))
                .collect(),
        }
    }
}

impl NoteSource for MemoryVault {
    fn scan(&self) -> Result<Vec<NoteRecord>, ScanError> {
        Ok(self.notes.clone())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
