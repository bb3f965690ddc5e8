//! Hand-off from the core to the Markdown renderer.
//!
//! `rewrite` swaps every wikilink for an inline HTML marker that carries the
//! resolver verdict and the display text. Everything else in the body is
//! copied byte-for-byte. A renderer's sanitizer has to allow exactly
//! `MARKER_ATTRIBUTES` and `MARKER_CLASSES` on `<span>` for markers to survive.

use crate::filename_index::FilenameIndex;
use crate::link_parser::{extract_wikilink_tokens, has_wikilink_open, WikilinkToken};
use crate::resolver::{resolve, ResolutionVerdict};
use std::borrow::Cow;
use std::fmt::Write;

pub const MARKER_CLASSES: &[&str] = &[
    "wikilink",
    "wikilink-resolved",
    "wikilink-ambiguous",
    "wikilink-missing",
];

pub const MARKER_ATTRIBUTES: &[&str] = &["class", "data-target", "data-path", "data-paths"];

/// Replace every wikilink in `body` with a marker.
///
/// Bodies without any wikilink are returned borrowed and untouched.
pub fn rewrite<'a>(body: &'a str, index: &FilenameIndex) -> Cow<'a, str> {
    if !has_wikilink_open(body) {
        return Cow::Borrowed(body);
    }
    let tokens = extract_wikilink_tokens(body);
    if tokens.is_empty() {
        return Cow::Borrowed(body);
    }

    let mut out = String::with_capacity(body.len() + tokens.len() * 80);
    let mut cursor = 0;
    for token in &tokens {
        out.push_str(&body[cursor..token.span_start]);
        push_marker(&mut out, token, &resolve(token, index));
        cursor = token.span_end;
    }
    out.push_str(&body[cursor..]);
    Cow::Owned(out)
}

/// CSS class distinguishing a verdict.
pub fn verdict_class(verdict: &ResolutionVerdict) -> &'static str {
    match verdict {
        ResolutionVerdict::Resolved { .. } => "wikilink-resolved",
        ResolutionVerdict::Ambiguous { .. } => "wikilink-ambiguous",
        ResolutionVerdict::Missing => "wikilink-missing",
    }
}

/// Append the marker for one token, e.g.
/// `<span class="wikilink wikilink-resolved" data-target="Note" data-path="a/Note.md">Note</span>`.
fn push_marker(out: &mut String, token: &WikilinkToken, verdict: &ResolutionVerdict) {
    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "<span class=\"wikilink {}\" data-target=\"{}\"",
        verdict_class(verdict),
        escape_html(&token.target)
    );
    match verdict {
        ResolutionVerdict::Resolved { path } => {
            let _ = write!(out, " data-path=\"{}\"", escape_html(path));
        }
        ResolutionVerdict::Ambiguous { paths } => {
            let json = serde_json::to_string(paths).unwrap_or_else(|_| "[]".to_string());
            let _ = write!(out, " data-paths=\"{}\"", escape_html(&json));
        }
        ResolutionVerdict::Missing => {}
    }
    let _ = write!(out, ">{}</span>", escape_html(token.display_text()));
}

/// Length of `c` once passed through `escape_html`.
pub(crate) fn escaped_len(c: char) -> usize {
    match c {
        '&' | '\'' => 5,
        '<' | '>' => 4,
        '"' => 6,
        _ => 1,
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
