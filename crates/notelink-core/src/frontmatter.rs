use serde_json::{Map, Value};

const DELIMITER: &str = "---";

/// Split a note into its YAML frontmatter and body.
///
/// The first line (after an optional BOM) must be `---` and a later line must
/// be `---` as well; trailing whitespace and `\r` are ignored on both, and the
/// closing line may be the last line of the file. The block in between is
/// parsed as YAML; malformed YAML, or YAML that is not a mapping, is treated as
/// absent and the whole content becomes the body.
pub fn split(content: &str) -> (Option<Map<String, Value>>, &str) {
    let start = if content.starts_with('\u{feff}') {
        '\u{feff}'.len_utf8()
    } else {
        0
    };
    let mut lines = content[start..].split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, content);
    };
    if first.trim_end() != DELIMITER {
        return (None, content);
    }

    let mut offset = start + first.len();
    let mut yaml_lines = Vec::new();
    for line in lines {
        offset += line.len();
        if line.trim_end() == DELIMITER {
            let body = &content[offset..];
            return match parse_yaml_mapping(&yaml_lines.join("\n")) {
                Ok(map) => (Some(map), body),
                Err(reason) => {
                    tracing::warn!("Ignoring frontmatter: {}", reason);
                    (None, content)
                }
            };
        }
        yaml_lines.push(line.trim_end_matches(['\n', '\r']));
    }

    (None, content)
}

/// Parse YAML into a JSON object so callers get uniform `serde_json` values.
fn parse_yaml_mapping(yaml: &str) -> Result<Map<String, Value>, String> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| format!("malformed YAML: {e}"))?;
    let json_value =
        serde_json::to_value(yaml_value).map_err(|e| format!("unrepresentable YAML: {e}"))?;
    match json_value {
        Value::Object(map) => Ok(map),
        _ => Err("frontmatter is not a mapping".to_string()),
    }
}
