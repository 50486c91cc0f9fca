/// Marker that opens a title line.
const TITLE_MARKER: &str = "# ";

/// Split `content` into a title taken from a leading `# ` heading and the body after it.
///
/// The heading must start at byte 0 and be terminated by a newline; a lone
/// heading line with nothing after it is left in the body as-is.
/// Leading whitespace of the body (spaces, tabs, `\r`, `\n`) is stripped.
pub fn extract_title(content: &str) -> (String, String) {
    if let Some(rest) = content.strip_prefix(TITLE_MARKER) {
        if let Some(eol) = rest.find('\n') {
            let title = &rest[..eol];
            let body = rest[eol..].trim_start_matches(is_body_padding);
            return (title.to_string(), body.to_string());
        }
    }
    (String::new(), content.to_string())
}

fn is_body_padding(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}
