//! Detached head/body tree of a compiled document.
//!
//! The compiler emits a fixed document shape, so a regex split into head
//! nodes and a raw body is enough; the body is never inspected, only swapped.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::preview::surface::SyncError;

static HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<head\b[^>]*>(.*?)</head\s*>").expect("valid regex"));
static BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<body\b([^>]*)>(.*)</body\s*>").expect("valid regex"));
static HTML_ATTRS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<html\b([^>]*)>").expect("valid regex"));
static HEAD_NODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<style\b[^>]*>.*?</style\s*>|<script\b[^>]*>.*?</script\s*>|<title\b[^>]*>.*?</title\s*>|<[a-z][^>]*>",
    )
    .expect("valid regex")
});
static STYLESHEET_REL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\brel\s*=\s*["']?stylesheet"#).expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadNode {
    Style(String),
    StylesheetLink(String),
    Script(String),
    Other(String),
}

impl HeadNode {
    fn classify(raw: &str) -> Self {
        let lower = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
        if lower.starts_with("<style") {
            HeadNode::Style(raw.to_string())
        } else if lower.starts_with("<script") {
            HeadNode::Script(raw.to_string())
        } else if lower.starts_with("<link") && STYLESHEET_REL.is_match(raw) {
            HeadNode::StylesheetLink(raw.to_string())
        } else {
            HeadNode::Other(raw.to_string())
        }
    }

    pub fn is_style(&self) -> bool {
        matches!(self, HeadNode::Style(_) | HeadNode::StylesheetLink(_))
    }

    pub fn as_html(&self) -> &str {
        match self {
            HeadNode::Style(s)
            | HeadNode::StylesheetLink(s)
            | HeadNode::Script(s)
            | HeadNode::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceDocument {
    pub html_attrs: String,
    pub head: Vec<HeadNode>,
    pub body_attrs: String,
    pub body: String,
}

/// Counts from one in-place patch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchStats {
    pub styles_replaced: usize,
    pub head_nodes_kept: usize,
}

impl SurfaceDocument {
    pub fn parse(html: &str) -> Result<Self, SyncError> {
        let body = BODY
            .captures(html)
            .ok_or_else(|| SyncError::MalformedDocument("missing <body>".to_string()))?;

        let head = HEAD
            .captures(html)
            .map(|caps| {
                HEAD_NODE
                    .find_iter(&caps[1])
                    .map(|m| HeadNode::classify(m.as_str()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            html_attrs: HTML_ATTRS
                .captures(html)
                .map(|c| c[1].to_string())
                .unwrap_or_default(),
            head,
            body_attrs: body[1].to_string(),
            body: body[2].trim_matches('\n').to_string(),
        })
    }

    /// Body replaced, head style nodes replaced, every other head node
    /// (scripts included) left where it is.
    pub fn patch_from(&mut self, incoming: &SurfaceDocument) -> PatchStats {
        self.head.retain(|n| !n.is_style());
        let kept = self.head.len();

        let styles: Vec<HeadNode> = incoming
            .head
            .iter()
            .filter(|n| n.is_style())
            .cloned()
            .collect();
        let styles_replaced = styles.len();
        self.head.extend(styles);

        self.body_attrs = incoming.body_attrs.clone();
        self.body = incoming.body.clone();

        PatchStats {
            styles_replaced,
            head_nodes_kept: kept,
        }
    }

    pub fn scripts(&self) -> usize {
        self.head
            .iter()
            .filter(|n| matches!(n, HeadNode::Script(_)))
            .count()
            + self.body.matches("<script").count()
    }

    /// Visible character count of the body, markup excluded.
    pub fn body_text_len(&self) -> usize {
        let mut in_tag = false;
        let mut count = 0;
        for c in self.body.chars() {
            match c {
                '<' => in_tag = true,
                '>' => in_tag = false,
                _ if !in_tag && !c.is_whitespace() => count += 1,
                _ => {}
            }
        }
        count
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        out.push_str(&format!("<html{}>\n<head>\n", self.html_attrs));
        for node in &self.head {
            out.push_str(node.as_html());
            out.push('\n');
        }
        out.push_str(&format!("</head>\n<body{}>\n", self.body_attrs));
        out.push_str(&self.body);
        out.push_str("\n</body>\n</html>\n");
        out
    }
}
