//! Axum route handlers for the Templates API.

use axum::{extract::Path, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::portfolio::PortfolioData;
use crate::templates::compiler::compile;
use crate::templates::descriptor::{FieldSupport, OptionalField, TemplateDescriptor, TemplateId};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    pub supported_fields: Vec<OptionalField>,
}

#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<TemplateSummary>,
}

#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub template_id: String,
    pub data: PortfolioData,
    #[serde(default)]
    pub field_support: Option<FieldSupport>,
}

#[derive(Debug, Serialize)]
pub struct CompileResponse {
    pub template_id: String,
    pub html: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<TemplateListResponse> {
    let templates = TemplateId::ALL
        .into_iter()
        .map(|id| {
            let descriptor = id.descriptor();
            TemplateSummary {
                id,
                name: descriptor.name,
                description: descriptor.description,
                supported_fields: descriptor.field_support.supported_fields(),
            }
        })
        .collect();

    Json(TemplateListResponse { templates })
}

/// GET /api/v1/templates/:id
///
/// Full descriptor, including the field-support matrix the editor uses to
/// hide inputs the selected template cannot render.
pub async fn handle_get_template(
    Path(id): Path<String>,
) -> Result<Json<TemplateDescriptor>, AppError> {
    let id: TemplateId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("Template '{id}' not found")))?;
    Ok(Json(id.descriptor()))
}

/// POST /api/v1/compile
pub async fn handle_compile(
    Json(request): Json<CompileRequest>,
) -> Result<Json<CompileResponse>, AppError> {
    let html = compile(
        &request.template_id,
        &request.data,
        request.field_support.as_ref(),
    )?;

    Ok(Json(CompileResponse {
        template_id: request.template_id.trim().to_lowercase(),
        html,
    }))
}
