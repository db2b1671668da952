//! Indented HTML buffer shared by the template skeletons, plus the token →
//! CSS translation every template's `<style>` block starts from.

use std::fmt::Write as _;

use crate::templates::descriptor::DesignSystem;

const INDENT: &str = "  ";

pub struct HtmlWriter {
    depth: usize,
    buffer: String,
}

impl HtmlWriter {
    pub fn new() -> Self {
        Self {
            depth: 0,
            buffer: String::with_capacity(8 * 1024),
        }
    }

    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Writes an opening line and indents what follows.
    pub fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedents and writes a closing line.
    pub fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// `<tag attrs>content</tag>` on one line; skipped when content is empty.
    pub fn element(&mut self, tag: &str, attrs: &str, content: &str) {
        if content.is_empty() {
            return;
        }
        let attrs = if attrs.is_empty() {
            String::new()
        } else {
            format!(" {attrs}")
        };
        self.line(&format!("<{tag}{attrs}>{content}</{tag}>"));
    }

    /// Opens the document and writes the head with the given stylesheet.
    pub fn document_start(&mut self, title: &str, template_id: &str, css: &str) {
        self.line("<!DOCTYPE html>");
        self.open("<html lang=\"en\">");
        self.open("<head>");
        self.line("<meta charset=\"UTF-8\">");
        self.line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
        self.line(&format!("<meta name=\"generator\" content=\"folio/{template_id}\">"));
        self.line(&format!("<title>{title}</title>"));
        self.open("<style>");
        for rule in css.lines().filter(|l| !l.trim().is_empty()) {
            self.line(rule.trim_end());
        }
        self.close("</style>");
        self.close("</head>");
        self.open(&format!("<body class=\"template-{template_id}\">"));
    }

    pub fn document_end(&mut self) {
        self.close("</body>");
        self.close("</html>");
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

/// CSS custom properties and base rules derived from design tokens.
pub fn base_stylesheet(ds: &DesignSystem) -> String {
    let mut css = String::new();
    let c = &ds.colors;
    let t = &ds.typography;
    let l = &ds.layout;

    let _ = writeln!(css, ":root {{");
    let _ = writeln!(css, "  --color-primary: {};", c.primary);
    let _ = writeln!(css, "  --color-accent: {};", c.accent);
    let _ = writeln!(css, "  --color-bg: {};", c.background);
    let _ = writeln!(css, "  --color-surface: {};", c.surface);
    let _ = writeln!(css, "  --color-text: {};", c.text);
    let _ = writeln!(css, "  --color-muted: {};", c.muted);
    let _ = writeln!(css, "  --font-heading: {};", t.heading_font);
    let _ = writeln!(css, "  --font-body: {};", t.body_font);
    let _ = writeln!(css, "  --font-mono: {};", t.mono_font);
    let _ = writeln!(css, "  --radius: {}px;", l.radius_px);
    let _ = writeln!(css, "  --section-gap: {}px;", l.section_gap_px);
    let _ = writeln!(css, "}}");
    let _ = writeln!(css, "* {{ box-sizing: border-box; margin: 0; padding: 0; }}");
    let _ = writeln!(
        css,
        "body {{ background: var(--color-bg); color: var(--color-text); font-family: var(--font-body); font-size: {}px; line-height: {}; }}",
        t.base_size_px, t.line_height
    );
    let _ = writeln!(
        css,
        "h1, h2, h3 {{ font-family: var(--font-heading); color: var(--color-primary); line-height: 1.25; }}"
    );
    let _ = writeln!(css, "a {{ color: var(--color-accent); text-decoration: none; }}");
    let _ = writeln!(css, "a:hover {{ text-decoration: underline; }}");
    let _ = writeln!(
        css,
        ".container {{ max-width: {}px; margin: 0 auto; padding: 0 24px; }}",
        l.max_width_px
    );
    let _ = writeln!(css, "section {{ margin-bottom: var(--section-gap); }}");
    let _ = writeln!(
        css,
        ".inline-code {{ font-family: var(--font-mono); background: var(--color-surface); padding: 1px 6px; border-radius: 4px; font-size: 0.9em; }}"
    );
    let _ = writeln!(css, ".muted {{ color: var(--color-muted); }}");
    let _ = writeln!(
        css,
        ".tag {{ display: inline-block; padding: 2px 10px; margin: 0 6px 6px 0; border-radius: 999px; background: var(--color-surface); font-size: 0.85em; }}"
    );
    css
}
