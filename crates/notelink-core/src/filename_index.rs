use crate::matching::{link_key, note_filename};
use crate::scanner::NoteRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from bare filename to every vault path carrying that filename.
///
/// Buckets keep scan order and are never deduplicated; the first path in a
/// bucket has no special priority beyond being a deterministic default.
/// Keys are case-sensitive. Serializes as `{"filename": ["path", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilenameIndex {
    buckets: BTreeMap<String, Vec<String>>,
}

impl FilenameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index in a single pass over the scanned notes.
    ///
    /// Records whose path is not a note (see `matching::note_filename`) are
    /// left out.
    pub fn build<'a, I>(notes: I) -> Self
    where
        I: IntoIterator<Item = &'a NoteRecord>,
    {
        let mut index = Self::new();
        for note in notes {
            index.insert(&note.path);
        }
        tracing::debug!(
            "Built filename index: {} filenames, {} paths",
            index.len(),
            index.path_count()
        );
        index
    }

    /// Append `path` to its filename's bucket. Returns false if `path` is not
    /// a note path.
    pub fn insert(&mut self, path: &str) -> bool {
        let Some(filename) = note_filename(path) else {
            return false;
        };
        self.buckets
            .entry(filename.to_string())
            .or_default()
            .push(path.to_string());
        true
    }

    /// All paths whose filename matches the raw link `target`.
    pub fn lookup(&self, target: &str) -> &[String] {
        self.buckets
            .get(link_key(target))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, filename: &str) -> bool {
        !self.lookup(filename).is_empty()
    }

    /// Number of distinct filenames.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of paths across all buckets.
    pub fn path_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Filenames shared by two or more paths.
    pub fn ambiguous_filenames(&self) -> impl Iterator<Item = &str> {
        self.buckets
            .iter()
            .filter(|(_, paths)| paths.len() > 1)
            .map(|(name, _)| name.as_str())
    }
}

impl<K, P> FromIterator<(K, Vec<P>)> for FilenameIndex
where
    K: Into<String>,
    P: Into<String>,
{
    /// Assemble an index from ready-made buckets, mostly useful in tests.
    fn from_iter<T: IntoIterator<Item = (K, Vec<P>)>>(iter: T) -> Self {
        let buckets = iter
            .into_iter()
            .map(|(name, paths)| (name.into(), paths.into_iter().map(Into::into).collect()))
            .collect();
        Self { buckets }
    }
}
