//! Axum route handlers for open documents: fetch and close, block commits,
//! direct entry edits, editing focus and the compiled preview.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::document::block::{Block, BlockId};
use crate::document::model::{CommitOutcome, Document};
use crate::document::provenance::FieldProvenance;
use crate::errors::AppError;
use crate::models::portfolio::{EntryField, EntryId, EntryKind, EntryUpdate, EntryValue};
use crate::state::AppState;
use crate::templates::descriptor::TemplateId;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommitRequest {
    pub text: String,
    pub editor_id: String,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub outcome: CommitOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<Block>,
}

#[derive(Debug, Serialize)]
pub struct FocusResponse {
    pub block_id: BlockId,
    pub dirty: bool,
}

#[derive(Debug, Deserialize)]
pub struct EntryEditRequest {
    pub field: EntryField,
    pub value: EntryValue,
}

#[derive(Debug, Serialize)]
pub struct EntryEditResponse {
    pub kind: EntryKind,
    pub entry_id: EntryId,
    pub field: EntryField,
    pub provenance: Option<FieldProvenance>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub template: Option<String>,
}

fn not_found(doc_id: Uuid) -> AppError {
    AppError::NotFound(format!("Document {doc_id} not found"))
}

fn entry_not_found(kind: EntryKind, entry_id: EntryId) -> AppError {
    AppError::NotFound(format!("{kind:?} entry {entry_id} not found"))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(doc_id): Path<Uuid>,
) -> Result<Json<Document>, AppError> {
    let document = state.documents.get(doc_id).await.ok_or_else(|| not_found(doc_id))?;
    Ok(Json(document))
}

/// DELETE /api/v1/documents/:id
///
/// Closes the editing session. The final state goes to the save sink and the
/// preview session is dropped.
pub async fn handle_close_document(
    State(state): State<AppState>,
    Path(doc_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let document = state
        .documents
        .remove(doc_id)
        .await
        .ok_or_else(|| not_found(doc_id))?;

    state.save_sink.on_save(&document);
    let had_preview = state.previews.close(doc_id).await;
    info!(%doc_id, had_preview, "Document closed");

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/documents/:id/blocks/:block_id
///
/// Commits a user edit. A block id that no longer exists is reported as
/// `stale_block_reference` with 200 so the editor can refetch; it is not an
/// error.
pub async fn handle_commit_block(
    State(state): State<AppState>,
    Path((doc_id, block_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<CommitRequest>,
) -> Result<Json<CommitResponse>, AppError> {
    if request.editor_id.trim().is_empty() {
        return Err(AppError::Validation("editor_id cannot be empty".to_string()));
    }
    let block_id = BlockId(block_id);

    let (outcome, block, snapshot) = state
        .documents
        .update(doc_id, |doc| {
            let outcome = doc.commit_edit(block_id, &request.text, &request.editor_id);
            let block = doc.block(block_id).cloned();
            let snapshot = (outcome == CommitOutcome::Committed).then(|| doc.snapshot_for_save());
            (outcome, block, snapshot)
        })
        .await
        .ok_or_else(|| not_found(doc_id))?;

    if let Some(snapshot) = snapshot {
        state.save_sink.on_save(&snapshot);
        state
            .previews
            .schedule_refresh(doc_id, state.documents.clone())
            .await;
    }

    Ok(Json(CommitResponse { outcome, block }))
}

/// PATCH /api/v1/documents/:id/entries/:kind/:entry_id
///
/// Direct user edit of one structured-list field. The field's provenance
/// becomes `user_edited` and later generation will not overwrite its origin.
pub async fn handle_edit_entry(
    State(state): State<AppState>,
    Path((doc_id, kind, entry_id)): Path<(Uuid, EntryKind, Uuid)>,
    Json(request): Json<EntryEditRequest>,
) -> Result<Json<EntryEditResponse>, AppError> {
    let entry_id = EntryId(entry_id);
    let field = request.field;

    let (update, provenance, snapshot) = state
        .documents
        .update(doc_id, |doc| {
            let update = doc.edit_entry_field(kind, entry_id, field, request.value);
            let provenance = doc.provenance().get(entry_id, field).cloned();
            let snapshot = (update == EntryUpdate::Applied).then(|| doc.snapshot_for_save());
            (update, provenance, snapshot)
        })
        .await
        .ok_or_else(|| not_found(doc_id))?;

    match update {
        EntryUpdate::Applied => {}
        EntryUpdate::UnknownEntry => return Err(entry_not_found(kind, entry_id)),
        EntryUpdate::UnsupportedField => {
            return Err(AppError::Validation(format!(
                "{kind:?} entries have no field {field:?}"
            )))
        }
    }

    if let Some(snapshot) = snapshot {
        state.save_sink.on_save(&snapshot);
        state
            .previews
            .schedule_refresh(doc_id, state.documents.clone())
            .await;
    }
    debug!(%doc_id, %entry_id, ?field, "Entry field edited");

    Ok(Json(EntryEditResponse {
        kind,
        entry_id,
        field,
        provenance,
    }))
}

/// DELETE /api/v1/documents/:id/entries/:kind/:entry_id
///
/// Removes a structured entry and every provenance record keyed on it.
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    Path((doc_id, kind, entry_id)): Path<(Uuid, EntryKind, Uuid)>,
) -> Result<StatusCode, AppError> {
    let entry_id = EntryId(entry_id);

    let snapshot = state
        .documents
        .update(doc_id, |doc| doc.remove_entry(kind, entry_id).then(|| doc.snapshot_for_save()))
        .await
        .ok_or_else(|| not_found(doc_id))?
        .ok_or_else(|| entry_not_found(kind, entry_id))?;

    state.save_sink.on_save(&snapshot);
    state
        .previews
        .schedule_refresh(doc_id, state.documents.clone())
        .await;
    info!(%doc_id, %entry_id, ?kind, "Entry removed");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/:id/blocks/:block_id/focus
///
/// Marks the block as being edited. Incoming generated text skips it until
/// the edit is committed or the block is blurred.
pub async fn handle_focus_block(
    State(state): State<AppState>,
    Path((doc_id, block_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FocusResponse>, AppError> {
    set_dirty(&state, doc_id, BlockId(block_id), true).await
}

/// POST /api/v1/documents/:id/blocks/:block_id/blur
pub async fn handle_blur_block(
    State(state): State<AppState>,
    Path((doc_id, block_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<FocusResponse>, AppError> {
    set_dirty(&state, doc_id, BlockId(block_id), false).await
}

async fn set_dirty(
    state: &AppState,
    doc_id: Uuid,
    block_id: BlockId,
    dirty: bool,
) -> Result<Json<FocusResponse>, AppError> {
    let known = state
        .documents
        .update(doc_id, |doc| {
            if doc.block(block_id).is_none() {
                return false;
            }
            if dirty {
                doc.mark_dirty(block_id);
            } else {
                doc.clear_dirty(block_id);
            }
            true
        })
        .await
        .ok_or_else(|| not_found(doc_id))?;

    if !known {
        return Err(AppError::NotFound(format!("Block {block_id} not found")));
    }
    debug!(%doc_id, %block_id, dirty, "Block focus changed");
    Ok(Json(FocusResponse { block_id, dirty }))
}

/// GET /api/v1/documents/:id/preview?template=
///
/// Compiles the current projection and syncs it into the document's preview
/// surface. Without `template` the session's last template is used.
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(doc_id): Path<Uuid>,
    Query(query): Query<PreviewQuery>,
) -> Result<Html<String>, AppError> {
    let document = state.documents.get(doc_id).await.ok_or_else(|| not_found(doc_id))?;
    let session = state.previews.session(doc_id).await;

    let template = match query.template.as_deref() {
        Some(id) => id.parse::<TemplateId>()?,
        None => session.template().await,
    };

    let (html, report) = session.render(template, &document.projection()).await?;
    let syncs = session.syncs().await;
    debug!(
        %doc_id,
        %template,
        path = ?report.path,
        syncs,
        "Preview rendered"
    );

    Ok(Html(html))
}
