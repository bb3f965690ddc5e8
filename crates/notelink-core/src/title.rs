use crate::frontmatter;
use crate::matching::note_filename;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*$").unwrap());

/// Human-readable title of a note.
///
/// Order of preference: frontmatter `title`, the first level-one heading,
/// then the bare filename (or the raw path for non-note paths).
pub fn note_title(content: &str, path: &str) -> String {
    let (fm, body) = frontmatter::split(content);

    if let Some(title) = fm.as_ref().and_then(|fm| fm.get("title")).and_then(scalar_text) {
        return title;
    }

    if let Some(cap) = H1_RE.captures(body) {
        let heading = cap[1].trim();
        if !heading.is_empty() {
            return heading.to_string();
        }
    }

    note_filename(path)
        .unwrap_or_else(|| path.rsplit('/').next().unwrap_or(path))
        .to_string()
}

fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_frontmatter_title() {
        let content = "---\ntitle: \"From Frontmatter\"\n---\n# From Heading\n";
        assert_eq!(note_title(content, "x/File.md"), "From Frontmatter");
    }

    #[test]
    fn falls_back_to_first_h1() {
        let content = "intro\n## Sub\n# Main Heading  \n# Second\n";
        assert_eq!(note_title(content, "x/File.md"), "Main Heading");
    }

    #[test]
    fn heading_inside_frontmatter_is_ignored() {
        let content = "---\ntags: [a]\n---\nno heading here";
        assert_eq!(note_title(content, "notes/Plain.md"), "Plain");
    }

    #[test]
    fn falls_back_to_filename() {
        assert_eq!(note_title("just text", "02-projects/Note Name.md"), "Note Name");
    }

    #[test]
    fn blank_frontmatter_title_is_skipped() {
        let content = "---\ntitle: \"  \"\n---\n# Real\n";
        assert_eq!(note_title(content, "a.md"), "Real");
    }

    #[test]
    fn numeric_title_is_rendered() {
        let content = "---\ntitle: 2024\n---\n";
        assert_eq!(note_title(content, "a.md"), "2024");
    }

    #[test]
    fn crlf_frontmatter_title_is_used() {
        let content = "---\r\ntitle: Win\r\n---\r\n# Heading\r\n";
        assert_eq!(note_title(content, "a/File.md"), "Win");
    }

    #[test]
    fn frontmatter_closed_at_end_of_file() {
        assert_eq!(note_title("---\ntitle: Eof\n---", "a/File.md"), "Eof");
    }

    #[test]
    fn crlf_heading_is_trimmed() {
        assert_eq!(note_title("intro\r\n# Heading\r\nmore", "a/File.md"), "Heading");
    }

    #[test]
    fn hashtag_is_not_a_heading() {
        assert_eq!(note_title("#tag only", "Tagged.md"), "Tagged");
    }
}
