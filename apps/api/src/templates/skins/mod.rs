//! Fixed HTML skeletons, one per template. Every skeleton receives data that
//! has already been normalized against its field-support matrix, so a field
//! the template does not support arrives empty and renders nothing.

mod creative;
mod developer;
mod minimal;
mod timeline;

use crate::templates::descriptor::{FieldSupport, OptionalField, TemplateDescriptor, TemplateId};
use crate::templates::html::HtmlWriter;
use crate::templates::normalize::RenderedPortfolio;

pub fn render(
    descriptor: &TemplateDescriptor,
    support: &FieldSupport,
    portfolio: &RenderedPortfolio,
) -> String {
    match descriptor.id {
        TemplateId::Minimal => minimal::render(descriptor, support, portfolio),
        TemplateId::Developer => developer::render(descriptor, support, portfolio),
        TemplateId::Creative => creative::render(descriptor, support, portfolio),
        TemplateId::Timeline => timeline::render(descriptor, support, portfolio),
    }
}

/// Emits `rule` only when `field` is supported, so stylesheets never carry
/// selectors for fields the template cannot render.
pub(crate) fn optional_css(css: &mut String, support: &FieldSupport, field: OptionalField, rule: &str) {
    if support.supports(field) {
        css.push_str(rule);
        css.push('\n');
    }
}

pub(crate) fn page_title(p: &RenderedPortfolio) -> String {
    format!("{} · {}", p.name, p.title)
}

pub(crate) fn tag_list(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("<span class=\"tag\">{i}</span>"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn achievements(w: &mut HtmlWriter, items: &[String]) {
    if items.is_empty() {
        return;
    }
    w.open("<ul class=\"achievements\">");
    for item in items {
        w.line(&format!("<li>{item}</li>"));
    }
    w.close("</ul>");
}

pub(crate) fn location(w: &mut HtmlWriter, location: Option<&String>) {
    if let Some(location) = location {
        w.line(&format!("<span class=\"location\">{location}</span>"));
    }
}

pub(crate) fn project_link(w: &mut HtmlWriter, link: Option<&String>, label: &str) {
    if let Some(href) = link {
        w.line(&format!(
            "<a class=\"project-link\" href=\"{href}\" target=\"_blank\" rel=\"noopener noreferrer\">{label}</a>"
        ));
    }
}

pub(crate) fn skill_icon(icon: Option<&String>) -> String {
    icon.map(|i| format!("<span class=\"skill-icon\" aria-hidden=\"true\">{i}</span> "))
        .unwrap_or_default()
}

pub(crate) fn contact_list(w: &mut HtmlWriter, p: &RenderedPortfolio) {
    w.open("<ul class=\"contact-list\">");
    w.line(&format!(
        "<li><span class=\"contact-label\">Email</span> <a href=\"mailto:{0}\">{0}</a></li>",
        p.email
    ));
    w.line(&format!(
        "<li><span class=\"contact-label\">Phone</span> <span>{}</span></li>",
        p.phone
    ));
    w.line(&format!(
        "<li><span class=\"contact-label\">GitHub</span> <a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
        p.github_href, p.github
    ));
    w.close("</ul>");
}
