//! Epoch-based publication of immutable vault snapshots.
//!
//! A `VaultSnapshot` bundles the scanned notes with the filename index built
//! from them. `IndexStore` owns the published snapshot: readers clone an
//! `Arc` and keep a consistent view for as long as they hold it, while a
//! rebuild constructs a fresh snapshot off to the side and swaps it in.

use crate::backlinks::{find_backlinks, Backlink, SnippetOptions};
use crate::filename_index::FilenameIndex;
use crate::resolver::{resolve_links, resolve_target, Resolution, ResolutionVerdict};
use crate::rewrite::rewrite;
use crate::scanner::{NoteRecord, NoteSource, ScanError};
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index not built yet")]
    NotBuilt,

    #[error("index unavailable: {source}")]
    Unavailable {
        #[from]
        source: ScanError,
    },
}

// ---------------------------------------------------------------------------
// VaultSnapshot
// ---------------------------------------------------------------------------

/// Everything one epoch knows about the vault. Never mutated after build.
#[derive(Debug)]
pub struct VaultSnapshot {
    epoch: u64,
    built_at: DateTime<Utc>,
    notes: Vec<NoteRecord>,
    index: FilenameIndex,
    by_path: HashMap<String, usize>,
}

impl VaultSnapshot {
    pub fn build(epoch: u64, notes: Vec<NoteRecord>) -> Self {
        let index = FilenameIndex::build(&notes);
        let by_path = notes
            .iter()
            .enumerate()
            .map(|(i, note)| (note.path.clone(), i))
            .collect();
        Self {
            epoch,
            built_at: Utc::now(),
            notes,
            index,
            by_path,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    /// Notes in scan order.
    pub fn notes(&self) -> &[NoteRecord] {
        &self.notes
    }

    pub fn index(&self) -> &FilenameIndex {
        &self.index
    }

    pub fn note(&self, path: &str) -> Option<&NoteRecord> {
        self.by_path.get(path).map(|&i| &self.notes[i])
    }

    pub fn resolve(&self, target: &str) -> ResolutionVerdict {
        resolve_target(target, &self.index)
    }

    pub fn backlinks(&self, target: &str, options: &SnippetOptions) -> Vec<Backlink> {
        find_backlinks(target, &self.notes, options)
    }

    pub fn rewrite<'a>(&self, body: &'a str) -> Cow<'a, str> {
        rewrite(body, &self.index)
    }

    /// Resolved outgoing links of the note at `path`, in document order.
    /// `None` if the snapshot has no such note.
    pub fn forward_links(&self, path: &str) -> Option<Vec<Resolution>> {
        self.note(path)
            .map(|note| resolve_links(&note.body, &self.index))
    }
}

// ---------------------------------------------------------------------------
// IndexStore
// ---------------------------------------------------------------------------

/// Owner of the published snapshot.
///
/// Builds are serialized by `build_lock`; publication is a single write to
/// `published`, so readers see either the old snapshot or the new one.
pub struct IndexStore {
    source: Arc<dyn NoteSource>,
    published: RwLock<Option<Arc<VaultSnapshot>>>,
    build_lock: Mutex<()>,
    next_epoch: AtomicU64,
}

impl IndexStore {
    pub fn new(source: Arc<dyn NoteSource>) -> Self {
        Self {
            source,
            published: RwLock::new(None),
            build_lock: Mutex::new(()),
            next_epoch: AtomicU64::new(1),
        }
    }

    /// The published snapshot, without building one.
    pub fn current(&self) -> Result<Arc<VaultSnapshot>, IndexError> {
        self.published().ok_or(IndexError::NotBuilt)
    }

    /// The published snapshot, building it first if this epoch has none.
    ///
    /// A failed build leaves the store empty and reports `Unavailable`;
    /// there is no empty stand-in index.
    pub fn snapshot(&self) -> Result<Arc<VaultSnapshot>, IndexError> {
        if let Some(snapshot) = self.published() {
            return Ok(snapshot);
        }

        let _guard = self.build_lock.lock().unwrap_or_else(|e| e.into_inner());
        // Another caller may have finished a build while we waited.
        if let Some(snapshot) = self.published() {
            return Ok(snapshot);
        }
        Ok(self.build_and_publish()?)
    }

    /// Rebuild from the source and swap the result in.
    ///
    /// On failure the previously published snapshot (if any) stays in place.
    pub fn refresh(&self) -> Result<Arc<VaultSnapshot>, ScanError> {
        let _guard = self.build_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.build_and_publish().inspect_err(|e| {
            tracing::warn!("Refresh failed, keeping previous snapshot: {}", e);
        })
    }

    /// End the current epoch. The next `snapshot()` rebuilds.
    ///
    /// Returns the epoch that was dropped, if one was published.
    pub fn invalidate(&self) -> Option<u64> {
        let previous = self
            .published
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take()?;
        tracing::info!("Invalidated index epoch {}", previous.epoch());
        Some(previous.epoch())
    }

    fn published(&self) -> Option<Arc<VaultSnapshot>> {
        self.published
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Caller must hold `build_lock`.
    fn build_and_publish(&self) -> Result<Arc<VaultSnapshot>, ScanError> {
        let start = Instant::now();
        let notes = self.source.scan()?;
        let epoch = self.next_epoch.fetch_add(1, Ordering::Relaxed);
        let snapshot = Arc::new(VaultSnapshot::build(epoch, notes));

        *self.published.write().unwrap_or_else(|e| e.into_inner()) = Some(snapshot.clone());

        tracing::info!(
            "Built index epoch {}: {} notes, {} filenames ({} ambiguous) in {:?}",
            epoch,
            snapshot.notes().len(),
            snapshot.index().len(),
            snapshot.index().ambiguous_filenames().count(),
            start.elapsed()
        );
        if snapshot.index().is_empty() {
            tracing::warn!("Index epoch {} contains no notes", epoch);
        }
        Ok(snapshot)
    }
}
