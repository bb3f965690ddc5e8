use crate::filename_index::FilenameIndex;
use crate::link_parser::{extract_wikilink_tokens, WikilinkToken};
use crate::matching::link_key;
use serde::Serialize;

/// Outcome of resolving one link target against a `FilenameIndex`.
///
/// A pure function of the target and the index snapshot: the same inputs
/// always give the same verdict within one epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ResolutionVerdict {
    /// Exactly one note carries the filename.
    Resolved { path: String },
    /// Two or more notes carry the filename, in index (scan) order.
    Ambiguous { paths: Vec<String> },
    /// No note carries the filename.
    Missing,
}

impl ResolutionVerdict {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The path a reader lands on without further choice: the unique match,
    /// or the first entry of an ambiguous bucket.
    pub fn default_path(&self) -> Option<&str> {
        match self {
            Self::Resolved { path } => Some(path),
            Self::Ambiguous { paths } => paths.first().map(String::as_str),
            Self::Missing => None,
        }
    }

    /// Every candidate path, in index order.
    pub fn paths(&self) -> &[String] {
        match self {
            Self::Resolved { path } => std::slice::from_ref(path),
            Self::Ambiguous { paths } => paths,
            Self::Missing => &[],
        }
    }
}

/// Resolve a raw link target: trim it, look up its bucket, and classify by
/// bucket size.
///
/// Targets containing `/` are plain filenames like any other, so they only
/// resolve if some note's bare filename contains a `/`, which a scanned vault
/// never produces.
pub fn resolve_target(target: &str, index: &FilenameIndex) -> ResolutionVerdict {
    match index.lookup(link_key(target)) {
        [] => ResolutionVerdict::Missing,
        [path] => ResolutionVerdict::Resolved { path: path.clone() },
        paths => ResolutionVerdict::Ambiguous {
            paths: paths.to_vec(),
        },
    }
}

/// Resolve a parsed token.
pub fn resolve(token: &WikilinkToken, index: &FilenameIndex) -> ResolutionVerdict {
    resolve_target(&token.target, index)
}

/// A token's verdict together with the text shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub target: String,
    pub display: String,
    pub verdict: ResolutionVerdict,
}

impl Resolution {
    pub fn of(token: &WikilinkToken, index: &FilenameIndex) -> Self {
        Self {
            target: token.target.clone(),
            display: token.display_text().to_string(),
            verdict: resolve(token, index),
        }
    }
}

/// Resolve every wikilink in `markdown`, in document order.
pub fn resolve_links(markdown: &str, index: &FilenameIndex) -> Vec<Resolution> {
    extract_wikilink_tokens(markdown)
        .iter()
        .map(|token| Resolution::of(token, index))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
