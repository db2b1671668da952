//! HTML sanitization for text that may have passed through a generation step.

use once_cell::sync::Lazy;
use regex::Regex;

/// Opening tag of the wrapper span the editing surface uses to colour
/// AI-added text.
static AI_MARKER_OPEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<span\b[^>]*\bclass\s*=\s*["'][^"']*\bai-added\b[^"']*["'][^>]*>"#)
        .expect("valid marker regex")
});
static SPAN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)span\b[^>]*>").expect("valid regex"));

/// Replaces every provenance marker span with its bare content. The marker's
/// closing tag is found by span depth, so ordinary spans inside it survive
/// intact. An unclosed marker loses only its opening tag.
pub fn strip_provenance_markers(html: &str) -> String {
    let mut current = html.to_string();
    while let Some(open) = AI_MARKER_OPEN.find(&current) {
        let rest = &current[open.end()..];
        let mut depth = 0usize;
        let mut close = None;
        for caps in SPAN_TAG.captures_iter(rest) {
            if caps[1].is_empty() {
                depth += 1;
                continue;
            }
            if depth == 0 {
                close = caps.get(0).map(|m| m.range());
                break;
            }
            depth -= 1;
        }

        let mut next = String::with_capacity(current.len());
        next.push_str(&current[..open.start()]);
        match close {
            Some(close) => {
                next.push_str(&rest[..close.start]);
                next.push_str(&rest[close.end..]);
            }
            None => next.push_str(rest),
        }
        current = next;
    }
    current
}

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
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
    out
}

/// Returns an href safe to interpolate, or `#` for disallowed schemes.
/// Accepts `http`, `https`, `mailto`, fragment and relative targets. The input
/// may already be HTML-escaped.
pub fn safe_href(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let allowed = lower.starts_with("http://")
        || lower.starts_with("https://")
        || lower.starts_with("mailto:")
        || lower.starts_with('#')
        || lower.starts_with('/')
        || !lower.contains(':');
    if allowed && !trimmed.is_empty() {
        trimmed.to_string()
    } else {
        "#".to_string()
    }
}
