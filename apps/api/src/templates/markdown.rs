//! Markdown-lite inline renderer for free-text fields.
//!
//! Order is fixed: block-tag stripping, escaping, bold, italic, link, inline
//! code, then newline → `<br>`. Line breaks must come last or they split the
//! other patterns' matches. Link targets are set aside before emphasis runs,
//! so underscores and stars inside a URL stay literal.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::templates::sanitize::{escape_html, safe_href, strip_provenance_markers};

static BLOCK_OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:h[1-6]|p|div)\b[^>]*>").expect("valid regex"));
static BLOCK_CLOSE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</(?:h[1-6]|p|div)\s*>").expect("valid regex"));
static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

static BOLD_STARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static BOLD_UNDERSCORES: Lazy<Regex> = Lazy::new(|| Regex::new(r"__(.+?)__").expect("valid regex"));
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\n]+?)\*").expect("valid regex"));
// Underscore emphasis only at word boundaries, so snake_case survives.
static ITALIC_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w])_([^_\n]+?)_($|[^\w])").expect("valid regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]\n]+)\]\(([^)\s]+)\)").expect("valid regex"));
/// Stands in for a link target while emphasis runs. Stripped from input.
const LINK_TARGET_MARK: char = '\u{E000}';

static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));

/// Removes block-level tags a generation step may have injected, keeping
/// their text, and collapses runs of three or more newlines.
pub fn strip_block_tags(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = BLOCK_OPEN_TAG.replace_all(&text, "");
    let text = BLOCK_CLOSE_TAG.replace_all(&text, "\n");
    let text = LINE_BREAK_TAG.replace_all(&text, "\n");
    EXCESS_NEWLINES
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

/// Renders markdown-lite to sanitized inline HTML.
pub fn render_inline(text: &str) -> String {
    let text = strip_provenance_markers(text);
    let text = strip_block_tags(&text);
    let text = escape_html(&text.replace(LINK_TARGET_MARK, ""));

    let mut targets = Vec::new();
    let text = LINK.replace_all(&text, |caps: &Captures| {
        targets.push(caps[2].to_string());
        format!(
            "[{}]({mark}{}{mark})",
            &caps[1],
            targets.len() - 1,
            mark = LINK_TARGET_MARK
        )
    });

    let text = BOLD_STARS.replace_all(&text, "<strong>$1</strong>");
    let text = BOLD_UNDERSCORES.replace_all(&text, "<strong>$1</strong>");
    let text = ITALIC_STAR.replace_all(&text, "<em>$1</em>");
    let text = italicize_underscores(&text);
    let text = LINK.replace_all(&text, |caps: &Captures| {
        let target = caps[2]
            .trim_matches(LINK_TARGET_MARK)
            .parse::<usize>()
            .ok()
            .and_then(|index| targets.get(index))
            .map_or(&caps[2], String::as_str);
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
            safe_href(target),
            &caps[1]
        )
    });
    let text = INLINE_CODE.replace_all(&text, r#"<code class="inline-code">$1</code>"#);

    text.replace('\n', "<br>")
}

/// Each match consumes its trailing boundary, so adjacent runs like
/// `_a_ _b_` need another pass.
fn italicize_underscores(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let next = ITALIC_UNDERSCORE
            .replace_all(&current, "${1}<em>${2}</em>${3}")
            .into_owned();
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Renders a single-line value: sanitized, no markdown, no line breaks.
pub fn render_plain(text: &str) -> String {
    let text = strip_provenance_markers(text);
    let text = strip_block_tags(&text);
    escape_html(&text.replace('\n', " "))
}
