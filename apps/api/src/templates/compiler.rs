//! Template compiler: canonical portfolio data → a complete, self-contained
//! HTML document for one template.
//!
//! Pure and byte-deterministic: the same id, data and override always yield
//! the same string. Pipeline:
//!   1. resolve the descriptor (`UnknownTemplate` otherwise)
//!   2. effective field support = template matrix, optionally restricted
//!   3. normalize (unsupported fields emptied, placeholders for missing scalars)
//!   4. render free text (marker strip, block-tag strip, escape, markdown-lite)
//!   5. interpolate into the template skeleton with a token-derived stylesheet

use tracing::debug;

use crate::models::portfolio::PortfolioData;
use crate::templates::descriptor::{FieldSupport, TemplateId};
use crate::templates::normalize::{normalize, RenderedPortfolio};
use crate::templates::skins;
use crate::templates::CompileError;

pub fn compile(
    template_id: &str,
    data: &PortfolioData,
    field_support_override: Option<&FieldSupport>,
) -> Result<String, CompileError> {
    let id: TemplateId = template_id.parse()?;
    Ok(compile_template(id, data, field_support_override))
}

/// Infallible form for callers that already hold a resolved `TemplateId`.
pub fn compile_template(
    id: TemplateId,
    data: &PortfolioData,
    field_support_override: Option<&FieldSupport>,
) -> String {
    let descriptor = id.descriptor();
    let support = match field_support_override {
        Some(overrides) => descriptor.field_support.restricted_by(overrides),
        None => descriptor.field_support.clone(),
    };

    let normalized = normalize(data, &support);
    let rendered = RenderedPortfolio::from_normalized(&normalized);
    let html = skins::render(&descriptor, &support, &rendered);

    debug!(template = %id, bytes = html.len(), "Compiled template");
    html
}
