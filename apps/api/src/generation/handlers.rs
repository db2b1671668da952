//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::document::model::{Document, RefreshOutcome};
use crate::errors::AppError;
use crate::generation::fill::{DraftRequest, FillPipeline};
use crate::generation::nl_edit::{FieldChange, NaturalLanguageEditPipeline};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateDocumentResponse {
    pub document: Document,
    pub filled: Vec<String>,
    pub unfilled: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub instruction: String,
}

#[derive(Debug, Serialize)]
pub struct EditResponse {
    pub document: Document,
    pub changes: Vec<FieldChange>,
    pub about: Vec<RefreshOutcome>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents
///
/// Creates a document from partial input. Empty sections are drafted in one
/// collaborator request; if that fails the document is still created with its
/// gaps listed in `unfilled`.
pub async fn handle_create_document(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<(StatusCode, Json<CreateDocumentResponse>), AppError> {
    if let Some(blank) = request
        .narratives
        .iter()
        .find(|n| n.section_id.trim().is_empty())
    {
        return Err(AppError::Validation(format!(
            "narrative '{}' has an empty section_id",
            blank.title
        )));
    }

    let pipeline = FillPipeline::new(state.collaborator.clone());
    let outcome = pipeline.draft(request).await;

    let doc_id = state.documents.insert(outcome.document.clone()).await;
    state.save_sink.on_save(&outcome.document);
    state
        .previews
        .schedule_refresh(doc_id, state.documents.clone())
        .await;
    info!(%doc_id, "Created document");

    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse {
            document: outcome.document,
            filled: outcome.filled,
            unfilled: outcome.unfilled,
        }),
    ))
}

/// POST /api/v1/documents/:id/edit
///
/// Applies a natural-language instruction to the document's portfolio data.
/// A rejected reply leaves the document unchanged; a reply that arrives after
/// a newer request started is discarded with 409.
pub async fn handle_edit_document(
    State(state): State<AppState>,
    Path(doc_id): Path<Uuid>,
    Json(request): Json<EditRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let pipeline = NaturalLanguageEditPipeline::new(state.collaborator.clone());
    let applied = pipeline
        .edit_document(&state.documents, doc_id, &request.instruction)
        .await?;

    let document = state
        .documents
        .get(doc_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Document {doc_id} not found")))?;
    state.save_sink.on_save(&document);
    state
        .previews
        .schedule_refresh(doc_id, state.documents.clone())
        .await;

    Ok(Json(EditResponse {
        document,
        changes: applied.changes,
        about: applied.about,
    }))
}
