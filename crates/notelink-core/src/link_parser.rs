
use serde::Serialize;

/// A wikilink parsed out of a note body.
///
/// `span_start..span_end` is the byte range of the whole `[[...]]` sequence in
/// the source text, used both for snippet extraction and in-place rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikilinkToken {
    /// Trimmed, never empty.
    pub target: String,
    /// Trimmed text after the first `|`, if there was one.
    pub alias: Option<String>,
    pub span_start: usize,
    pub span_end: usize,
}

impl WikilinkToken {
    /// Text shown to the reader: the alias when present and non-empty,
    /// otherwise the target. Independent of whether the link resolves.
    pub fn display_text(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => &self.target,
        }
    }
}

/// Cheap check used to skip bodies that cannot contain a wikilink.
pub fn has_wikilink_open(text: &str) -> bool {
    text.contains("[[")
}

/// Extract every well-formed wikilink token, in document order.
///
/// Grammar: `[[`, target text containing neither `]` nor `|`, an optional `|`
/// followed by alias text containing no `]`, then `]]`.
///
/// - A `[[` inside an unfinished candidate abandons it and starts over at the
///   inner opener, so `[[a[[b]]` yields only `b`.
/// - In a run of three or more `[`, the last two open the candidate.
/// - A `]` not followed by `]` ends the candidate as malformed.
/// - A target that is empty after trimming produces no token.
///
/// Everything that does not form a token is left to the caller as literal
/// text. The scan is a single forward pass over the bytes; all delimiters are
/// ASCII so every offset it reports is a char boundary.
pub fn extract_wikilink_tokens(markdown: &str) -> Vec<WikilinkToken> {
    let bytes = markdown.as_bytes();
    let mut tokens = Vec::new();
    let mut cursor = 0;

    while let Some(open) = find_opener(bytes, cursor) {
        match scan_candidate(markdown, open) {
            Scan::Token(token) => {
                cursor = token.span_end;
                tokens.push(token);
            }
            Scan::Resume(at) => cursor = at,
        }
    }

    tokens
}

enum Scan {
    Token(WikilinkToken),
    Resume(usize),
}

/// Byte offset of the next opener at or after `from`.
fn find_opener(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i + 1 < bytes.len() {
        if bytes[i] == b'[' && bytes[i + 1] == b'[' {
            let mut open = i;
            while open + 2 < bytes.len() && bytes[open + 2] == b'[' {
                open += 1;
            }
            return Some(open);
        }
        i += 1;
    }
    None
}

/// Scan one candidate starting at the opener `open`.
fn scan_candidate(markdown: &str, open: usize) -> Scan {
    let bytes = markdown.as_bytes();
    let inner_start = open + 2;
    let mut pipe: Option<usize> = None;
    let mut pos = inner_start;

    while pos < bytes.len() {
        match bytes[pos] {
            b'[' if bytes.get(pos + 1) == Some(&b'[') => return Scan::Resume(pos),
            b'|' if pipe.is_none() => pipe = Some(pos),
            b']' => {
                if bytes.get(pos + 1) != Some(&b']') {
                    return Scan::Resume(pos + 1);
                }
                let target = markdown[inner_start..pipe.unwrap_or(pos)].trim();
                if target.is_empty() {
                    return Scan::Resume(pos + 2);
                }
                let alias = pipe.map(|p| markdown[p + 1..pos].trim().to_string());
                return Scan::Token(WikilinkToken {
                    target: target.to_string(),
                    alias,
                    span_start: open,
                    span_end: pos + 2,
                });
            }
            _ => {}
        }
        pos += 1;
    }

    Scan::Resume(bytes.len())
}
