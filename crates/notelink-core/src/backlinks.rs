use crate::link_parser::{extract_wikilink_tokens, has_wikilink_open};
use crate::matching::{link_key, target_matches};
use crate::rewrite::{escape_html, escaped_len};
use crate::scanner::NoteRecord;
use crate::title::note_title;
use serde::{Deserialize, Serialize};

/// Bounds for the context shown around a linked mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnippetOptions {
    /// Characters of context kept on each side of the link.
    pub context_chars: usize,
    /// Hard cap on the snippet length in characters, excluding the ellipses
    /// and `<mark>` tags. With `mark` set, escaped entities count at their
    /// rendered length.
    pub max_chars: usize,
    /// Wrap the link text in `<mark>...</mark>` (the rest is HTML-escaped).
    pub mark: bool,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            context_chars: 50,
            max_chars: 300,
            mark: false,
        }
    }
}

/// A note that mentions the queried filename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Backlink {
    /// Vault path of the mentioning note.
    pub path: String,
    pub title: String,
    /// Context around the first mention.
    pub snippet: String,
    /// Number of wikilinks in the note that target the filename.
    pub mentions: usize,
}

/// Find every note containing a wikilink whose target is `target`.
///
/// Matching uses the same rule as the resolver, but does not require the
/// target to resolve uniquely: a link to an ambiguous filename is still a
/// mention of each note carrying it. A note linking to itself is included.
/// Results follow the order of `notes`; each note appears at most once.
///
/// A blank `target` matches nothing.
pub fn find_backlinks(target: &str, notes: &[NoteRecord], options: &SnippetOptions) -> Vec<Backlink> {
    let filename = link_key(target);
    if filename.is_empty() {
        return Vec::new();
    }

    let mut backlinks = Vec::new();
    for note in notes {
        if !has_wikilink_open(&note.body) {
            continue;
        }

        let mut matching = extract_wikilink_tokens(&note.body)
            .into_iter()
            .filter(|token| target_matches(&token.target, filename));
        let Some(first) = matching.next() else {
            continue;
        };
        let mentions = 1 + matching.count();

        backlinks.push(Backlink {
            path: note.path.clone(),
            title: note_title(&note.body, &note.path),
            snippet: extract_snippet(&note.body, first.span_start, first.span_end, options),
            mentions,
        });
    }

    tracing::debug!(
        "Backlinks for {:?}: {} of {} notes",
        filename,
        backlinks.len(),
        notes.len()
    );
    backlinks
}

/// Context snippet around the byte span `start..end` of `body`.
///
/// Takes up to `context_chars` characters on each side (never more than a
/// quarter of `max_chars`), folds line breaks and tabs into spaces, trims, and
/// wraps the result in `...`. The link text itself is truncated so the whole
/// window stays within `max_chars` characters. When `mark` is set, widths are
/// measured after HTML escaping, so `&` costs five characters.
pub fn extract_snippet(body: &str, start: usize, end: usize, options: &SnippetOptions) -> String {
    let width = |c: char| if options.mark { escaped_len(c) } else { 1 };
    let context = options.context_chars.min(options.max_chars / 4);
    let (window_start, before_len) = start_within(body, start, context, width);
    let (window_end, after_len) = end_within(body, end, context, width);

    let budget = options.max_chars.saturating_sub(before_len + after_len);
    let (link_end, _) = end_within(&body[..end], start, budget, width);

    let before = &body[window_start..start];
    let link = &body[start..link_end];
    let after = &body[end..window_end];

    let snippet = if options.mark {
        format!(
            "{}<mark>{}</mark>{}",
            escape_html(before),
            escape_html(link),
            escape_html(after)
        )
    } else {
        format!("{before}{link}{after}")
    };

    format!("...{}...", fold_whitespace(&snippet).trim())
}

/// Walk back from `end` while the summed width stays within `limit`.
/// Returns the byte offset reached and the width taken.
fn start_within(
    text: &str,
    end: usize,
    limit: usize,
    width: impl Fn(char) -> usize,
) -> (usize, usize) {
    let mut start = end;
    let mut used = 0;
    for (i, c) in text[..end].char_indices().rev() {
        let w = width(c);
        if used + w > limit {
            break;
        }
        used += w;
        start = i;
    }
    (start, used)
}

/// Walk forward from `start` while the summed width stays within `limit`.
fn end_within(
    text: &str,
    start: usize,
    limit: usize,
    width: impl Fn(char) -> usize,
) -> (usize, usize) {
    let mut end = start;
    let mut used = 0;
    for (i, c) in text[start..].char_indices() {
        let w = width(c);
        if used + w > limit {
            break;
        }
        used += w;
        end = start + i + c.len_utf8();
    }
    (end, used)
}

fn fold_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if matches!(c, '\n' | '\r' | '\t') { ' ' } else { c })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn note(path: &str, body: &str) -> NoteRecord {
        NoteRecord::new(path, body)
    }

    fn defaults() -> SnippetOptions {
        SnippetOptions::default()
    }

    // === Matching ===

    #[test]
    fn finds_note_linking_to_target_with_context() {
        let notes = vec![
            note("a.md", "see also [[Note Name]] for details"),
            note("Note Name.md", "the target itself"),
        ];
        let backlinks = find_backlinks("Note Name", &notes, &defaults());
        assert_eq!(backlinks.len(), 1);
        assert_eq!(backlinks[0].path, "a.md");
        assert!(backlinks[0].snippet.contains("see also"), "{}", backlinks[0].snippet);
        assert!(backlinks[0].snippet.contains("for details"), "{}", backlinks[0].snippet);
    }

    #[test]
    fn unknown_filename_returns_empty() {
        let notes = vec![note("a.md", "[[Something]]")];
        assert!(find_backlinks("Nothing", &notes, &defaults()).is_empty());
    }

    #[test]
    fn blank_query_returns_empty() {
        let notes = vec![note("a.md", "[[Something]]")];
        assert!(find_backlinks("  ", &notes, &defaults()).is_empty());
    }

    #[test]
    fn matching_is_case_sensitive() {
        let notes = vec![note("a.md", "[[note]]")];
        assert!(find_backlinks("Note", &notes, &defaults()).is_empty());
    }

    #[test]
    fn alias_links_count() {
        let notes = vec![note("a.md", "read [[Note|this one]] now")];
        let backlinks = find_backlinks("Note", &notes, &defaults());
        assert_eq!(backlinks.len(), 1);
        assert!(backlinks[0].snippet.contains("[[Note|this one]]"));
    }

    #[test]
    fn padded_target_matches_trimmed_query() {
        let notes = vec![note("a.md", "[[  Note  ]]")];
        assert_eq!(find_backlinks(" Note ", &notes, &defaults()).len(), 1);
    }

    #[test]
    fn links_to_ambiguous_filenames_still_count() {
        let notes = vec![
            note("a/ideas.md", "one"),
            note("b/ideas.md", "two"),
            note("c.md", "[[ideas]]"),
        ];
        let backlinks = find_backlinks("ideas", &notes, &defaults());
        assert_eq!(backlinks.len(), 1);
        assert_eq!(backlinks[0].path, "c.md");
    }

    #[test]
    fn self_links_are_included() {
        let notes = vec![note("Loop.md", "I link to [[Loop]]")];
        assert_eq!(find_backlinks("Loop", &notes, &defaults()).len(), 1);
    }

    #[test]
    fn one_entry_per_note_with_mention_count() {
        let notes = vec![note("a.md", "[[X]] first, [[Y]], then [[X|again]]")];
        let backlinks = find_backlinks("X", &notes, &defaults());
        assert_eq!(backlinks.len(), 1);
        assert_eq!(backlinks[0].mentions, 2);
        assert!(backlinks[0].snippet.starts_with("...[[X]] first"));
    }

    #[test]
    fn results_follow_scan_order() {
        let notes = vec![
            note("z.md", "[[T]]"),
            note("a.md", "[[T]]"),
            note("m.md", "nothing"),
            note("b.md", "[[T]]"),
        ];
        let paths: Vec<String> = find_backlinks("T", &notes, &defaults())
            .into_iter()
            .map(|b| b.path)
            .collect();
        assert_eq!(paths, vec!["z.md", "a.md", "b.md"]);
    }

    #[test]
    fn repeated_queries_are_identical() {
        let notes = vec![note("a.md", "x [[T]] y"), note("b.md", "[[T]]")];
        assert_eq!(
            find_backlinks("T", &notes, &defaults()),
            find_backlinks("T", &notes, &defaults())
        );
    }

    #[test]
    fn malformed_links_are_not_mentions() {
        let notes = vec![note("a.md", "[[T] and [T]] and [[|T]]")];
        assert!(find_backlinks("T", &notes, &defaults()).is_empty());
    }

    #[test]
    fn title_comes_from_source_note() {
        let notes = vec![
            note("fm.md", "---\ntitle: Front\n---\n[[T]]"),
            note("h1.md", "# Heading\n[[T]]"),
            note("dir/plain.md", "[[T]]"),
        ];
        let titles: Vec<String> = find_backlinks("T", &notes, &defaults())
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Front", "Heading", "plain"]);
    }

    // === Snippets ===

    #[test]
    fn snippet_folds_newlines() {
        let notes = vec![note("a.md", "line one\nsee [[T]]\nline three")];
        let snippet = &find_backlinks("T", &notes, &defaults())[0].snippet;
        assert_eq!(snippet, "...line one see [[T]] line three...");
    }

    #[test]
    fn snippet_window_is_bounded_by_context() {
        let body = format!("{}[[T]]{}", "a".repeat(200), "b".repeat(200));
        let options = SnippetOptions {
            context_chars: 10,
            ..SnippetOptions::default()
        };
        let snippet = &find_backlinks("T", &[note("a.md", &body)], &options)[0].snippet;
        assert_eq!(snippet, &format!("...{}[[T]]{}...", "a".repeat(10), "b".repeat(10)));
    }

    #[test]
    fn snippet_respects_hard_cap_for_huge_links() {
        let body = format!("before [[T|{}]] after", "x".repeat(10_000));
        let options = SnippetOptions::default();
        let snippet = &find_backlinks("T", &[note("a.md", &body)], &options)[0].snippet;
        let inner = snippet.trim_start_matches("...").trim_end_matches("...");
        assert!(inner.chars().count() <= options.max_chars, "len {}", inner.chars().count());
        assert!(snippet.starts_with("...before [[T|"));
    }

    #[test]
    fn snippet_is_char_boundary_safe() {
        let body = format!("{}[[T]]{}", "é".repeat(80), "日".repeat(80));
        let snippet = &find_backlinks("T", &[note("a.md", &body)], &defaults())[0].snippet;
        assert_eq!(snippet, &format!("...{}[[T]]{}...", "é".repeat(50), "日".repeat(50)));
    }

    #[test]
    fn marked_snippet_escapes_surroundings() {
        let options = SnippetOptions {
            mark: true,
            ..SnippetOptions::default()
        };
        let notes = vec![note("a.md", "a < b [[T]] & c")];
        let snippet = &find_backlinks("T", &notes, &options)[0].snippet;
        assert_eq!(snippet, "...a &lt; b <mark>[[T]]</mark> &amp; c...");
    }

    #[test]
    fn marked_snippet_caps_escaped_length() {
        let body = format!("{}[[T]]{}", "&".repeat(200), "<".repeat(200));
        let options = SnippetOptions {
            max_chars: 40,
            mark: true,
            ..SnippetOptions::default()
        };
        let snippet = &find_backlinks("T", &[note("a.md", &body)], &options)[0].snippet;
        assert_eq!(snippet, "...&amp;&amp;<mark>[[T]]</mark>&lt;&lt;...");
    }

    #[test]
    fn marked_huge_link_stays_under_cap_after_escaping() {
        let body = format!("before [[T|{}]] after", "&".repeat(1_000));
        let options = SnippetOptions {
            mark: true,
            ..SnippetOptions::default()
        };
        let snippet = &find_backlinks("T", &[note("a.md", &body)], &options)[0].snippet;
        let inner = snippet
            .trim_start_matches("...")
            .trim_end_matches("...")
            .replace("<mark>", "")
            .replace("</mark>", "");
        assert!(inner.chars().count() <= options.max_chars, "len {}", inner.chars().count());
        assert!(inner.starts_with("before [[T|&amp;"));
        assert!(inner.ends_with("&amp; after"));
    }

    #[test]
    fn snippet_at_document_edges() {
        assert_eq!(extract_snippet("[[T]]", 0, 5, &defaults()), "...[[T]]...");
    }
}
