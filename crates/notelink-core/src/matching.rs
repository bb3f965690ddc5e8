//! Filename matching shared by the index builder, the resolver and the
//! backlink scanner.
//!
//! Matching is case-sensitive, exact, and filename-only: `[[Note]]` matches
//! `Note.md` in any folder but never `note.md`, and directory structure plays
//! no part in it. Every component that compares a link target against a note
//! goes through these functions so "what does this link resolve to" and "what
//! links here" cannot drift apart.

/// Extension of files treated as notes. Compared case-sensitively.
pub const NOTE_EXTENSION: &str = ".md";

/// Bare filename of a vault path: the final `/` segment with the note
/// extension removed.
///
/// Returns `None` for paths that are not notes (wrong or missing extension)
/// or whose stem would be empty.
///
/// Example: `note_filename("02-projects/Note Name.md")` → `Some("Note Name")`
pub fn note_filename(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let stem = segment.strip_suffix(NOTE_EXTENSION)?;
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

/// Returns true if `path` names a note file.
pub fn is_note_path(path: &str) -> bool {
    note_filename(path).is_some()
}

/// Match key of a raw link target. Only leading and trailing whitespace is
/// removed; inner whitespace and case are kept verbatim.
pub fn link_key(target: &str) -> &str {
    target.trim()
}

/// Returns true if a raw link target refers to the note with bare `filename`.
pub fn target_matches(target: &str, filename: &str) -> bool {
    let key = link_key(target);
    !key.is_empty() && key == filename
}
