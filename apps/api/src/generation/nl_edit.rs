//! Natural-language edit pipeline.
//!
//! One collaborator round trip per instruction: the current record and the
//! instruction go out, a complete replacement record comes back. The reply is
//! parsed into the typed schema, entries that lost their ids are re-associated
//! by natural key, required contact fields are guarded, and a field-level diff
//! decides which provenance entries become `ai_generated`.
//!
//! A reply that fails any of these steps is rejected and the caller keeps its
//! prior data untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::model::{Document, RefreshOutcome};
use crate::document::provenance::FieldProvenance;
use crate::document::store::DocumentStore;
use crate::generation::collaborator::{CollaboratorError, CollaboratorRequest, GenerationCollaborator};
use crate::generation::prompts::{nl_edit_system, NL_EDIT_PROMPT_TEMPLATE};
use crate::llm_client::strip_json_fences;
use crate::models::portfolio::{
    is_missing, EntryField, EntryId, EntryKind, PortfolioData, PortfolioEntry, RequiredScalar,
};

/// Confidence stamped on fields an edit request changed.
pub const NL_EDIT_CONFIDENCE: f32 = 0.8;

#[derive(Debug, Error)]
pub enum EditError {
    #[error("Instruction cannot be empty")]
    EmptyInstruction,

    #[error("Document {0} not found")]
    DocumentNotFound(Uuid),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    #[error("Malformed collaborator response: {0}")]
    MalformedCollaboratorResponse(String),

    #[error("Edit would remove required field '{0}'")]
    DroppedRequiredField(&'static str),

    #[error("Superseded by a newer edit request")]
    Superseded,

    #[error("Failed to serialize current data: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One field-level difference between the prior and proposed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldChange {
    Scalar { field: &'static str },
    Entry { kind: EntryKind, id: EntryId, field: EntryField },
    EntryAdded { kind: EntryKind, id: EntryId },
    EntryRemoved { kind: EntryKind, id: EntryId },
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub data: PortfolioData,
    pub changes: Vec<FieldChange>,
}

/// What an accepted merge did to a document.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedEdit {
    pub changes: Vec<FieldChange>,
    pub about: Vec<RefreshOutcome>,
}

#[derive(Clone)]
pub struct NaturalLanguageEditPipeline {
    collaborator: Arc<dyn GenerationCollaborator>,
}

impl NaturalLanguageEditPipeline {
    pub fn new(collaborator: Arc<dyn GenerationCollaborator>) -> Self {
        Self { collaborator }
    }

    /// Sends `instruction` with `current` and returns the validated merge.
    /// Never retries; on error `current` is still the caller's data.
    pub async fn apply(
        &self,
        instruction: &str,
        current: &PortfolioData,
    ) -> Result<MergeOutcome, EditError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(EditError::EmptyInstruction);
        }

        let payload = serde_json::to_string_pretty(&json!({
            "currentData": current,
            "instruction": instruction,
        }))?;
        let request = CollaboratorRequest::json(
            nl_edit_system(),
            NL_EDIT_PROMPT_TEMPLATE.replace("{payload}", &payload),
        );

        let raw = self.collaborator.complete(request).await?;
        let outcome = merge_response(current, &raw)?;
        debug!(changes = outcome.changes.len(), "Edit response merged");
        Ok(outcome)
    }

    /// Edits an open document. The request takes a ticket from the document's
    /// gate; if a newer request started while this one was waiting on the
    /// collaborator, the completion is discarded.
    pub async fn edit_document(
        &self,
        store: &DocumentStore,
        doc_id: Uuid,
        instruction: &str,
    ) -> Result<AppliedEdit, EditError> {
        let gate = store
            .gate(doc_id)
            .await
            .ok_or(EditError::DocumentNotFound(doc_id))?;
        let ticket = gate.begin();

        let current = store
            .get(doc_id)
            .await
            .ok_or(EditError::DocumentNotFound(doc_id))?
            .projection();

        let outcome = self.apply(instruction, &current).await?;

        let applied = store
            .update(doc_id, |doc| {
                gate.is_current(ticket)
                    .then(|| apply_merge(doc, outcome, instruction.trim()))
            })
            .await
            .ok_or(EditError::DocumentNotFound(doc_id))?;

        match applied {
            Some(applied) => {
                info!(
                    %doc_id,
                    generation = ticket.generation(),
                    changes = applied.changes.len(),
                    "Applied edit request"
                );
                Ok(applied)
            }
            None => {
                warn!(
                    %doc_id,
                    generation = ticket.generation(),
                    "Discarding stale edit response"
                );
                Err(EditError::Superseded)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parse, re-associate, guard, diff
// ────────────────────────────────────────────────────────────────────────────

/// Parses a raw reply into the typed schema. Code fences are tolerated; the
/// top level must be an object.
pub fn parse_response(raw: &str) -> Result<PortfolioData, EditError> {
    let text = strip_json_fences(raw);
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| EditError::MalformedCollaboratorResponse(e.to_string()))?;
    if !value.is_object() {
        return Err(EditError::MalformedCollaboratorResponse(
            "expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| EditError::MalformedCollaboratorResponse(e.to_string()))
}

pub fn merge_response(current: &PortfolioData, raw: &str) -> Result<MergeOutcome, EditError> {
    let mut proposed = parse_response(raw)?;

    readopt_ids(&current.projects, &mut proposed.projects);
    readopt_ids(&current.experiences, &mut proposed.experiences);
    readopt_ids(&current.education, &mut proposed.education);
    readopt_ids(&current.awards, &mut proposed.awards);

    guard_required_scalars(current, &proposed)?;

    let changes = diff(current, &proposed);
    Ok(MergeOutcome {
        data: proposed,
        changes,
    })
}

/// Entries whose id is unknown (omitted or invented by the collaborator) take
/// the id of an unclaimed prior entry with the same natural key. Duplicate ids
/// in the reply are split so every entry stays uniquely addressable.
fn readopt_ids<E: PortfolioEntry>(prior: &[E], proposed: &mut [E]) {
    let prior_ids: HashSet<EntryId> = prior.iter().map(|e| e.id()).collect();
    let mut seen: HashSet<EntryId> = HashSet::new();
    let mut claimed: HashSet<EntryId> = proposed
        .iter()
        .map(|e| e.id())
        .filter(|id| prior_ids.contains(id))
        .collect();

    for entry in proposed.iter_mut() {
        if prior_ids.contains(&entry.id()) && seen.insert(entry.id()) {
            continue;
        }
        let key = entry.natural_key();
        let adopted = prior
            .iter()
            .find(|p| !claimed.contains(&p.id()) && p.natural_key() == key)
            .map(|p| p.id());
        let id = match adopted {
            Some(id) => {
                claimed.insert(id);
                id
            }
            None if seen.contains(&entry.id()) => EntryId::new(),
            None => entry.id(),
        };
        entry.set_id(id);
        seen.insert(id);
    }
}

fn guard_required_scalars(current: &PortfolioData, proposed: &PortfolioData) -> Result<(), EditError> {
    for scalar in RequiredScalar::ALL {
        if !is_missing(scalar.value(current)) && is_missing(scalar.value(proposed)) {
            warn!(field = scalar.as_str(), "Edit response dropped a required field");
            return Err(EditError::DroppedRequiredField(scalar.as_str()));
        }
    }
    Ok(())
}

fn diff(prior: &PortfolioData, proposed: &PortfolioData) -> Vec<FieldChange> {
    let mut changes = Vec::new();

    for scalar in RequiredScalar::ALL {
        if scalar.value(prior) != scalar.value(proposed) {
            changes.push(FieldChange::Scalar {
                field: scalar.as_str(),
            });
        }
    }
    if prior.location != proposed.location {
        changes.push(FieldChange::Scalar { field: "location" });
    }
    if prior.about.trim() != proposed.about.trim() {
        changes.push(FieldChange::Scalar { field: "about" });
    }
    if prior.skills != proposed.skills {
        changes.push(FieldChange::Scalar { field: "skills" });
    }

    diff_entries(&prior.projects, &proposed.projects, &mut changes);
    diff_entries(&prior.experiences, &proposed.experiences, &mut changes);
    diff_entries(&prior.education, &proposed.education, &mut changes);
    diff_entries(&prior.awards, &proposed.awards, &mut changes);
    changes
}

/// Position-independent: entries are matched by id, so reordering is not a change.
fn diff_entries<E: PortfolioEntry>(prior: &[E], proposed: &[E], out: &mut Vec<FieldChange>) {
    let prior_by_id: HashMap<EntryId, &E> = prior.iter().map(|e| (e.id(), e)).collect();

    for entry in proposed {
        let Some(old) = prior_by_id.get(&entry.id()) else {
            out.push(FieldChange::EntryAdded {
                kind: E::KIND,
                id: entry.id(),
            });
            continue;
        };
        for ((field, before), (_, after)) in old.field_values().into_iter().zip(entry.field_values()) {
            if before != after {
                out.push(FieldChange::Entry {
                    kind: E::KIND,
                    id: entry.id(),
                    field,
                });
            }
        }
    }

    let live: HashSet<EntryId> = proposed.iter().map(|e| e.id()).collect();
    for old in prior.iter().filter(|e| !live.contains(&e.id())) {
        out.push(FieldChange::EntryRemoved {
            kind: E::KIND,
            id: old.id(),
        });
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Apply to a document
// ────────────────────────────────────────────────────────────────────────────

/// Swaps the merged record into `document` and stamps provenance for every
/// changed or added entry field. `about` changes flow through the about
/// blocks, which leaves blocks the user is currently editing alone.
pub fn apply_merge(document: &mut Document, outcome: MergeOutcome, instruction: &str) -> AppliedEdit {
    let provenance = FieldProvenance::generated(
        NL_EDIT_CONFIDENCE,
        format!("Updated by edit request: \"{instruction}\""),
    );

    let mut stamps: Vec<(EntryId, EntryField)> = Vec::new();
    for change in &outcome.changes {
        match change {
            FieldChange::Entry { id, field, .. } => stamps.push((*id, *field)),
            FieldChange::EntryAdded { id, .. } => {
                if let Some((_, fields)) = outcome.data.entry_fields(*id) {
                    stamps.extend(
                        fields
                            .into_iter()
                            .filter(|(_, value)| !value.trim().is_empty())
                            .map(|(field, _)| (*id, field)),
                    );
                }
            }
            FieldChange::Scalar { .. } | FieldChange::EntryRemoved { .. } => {}
        }
    }

    let about_changed = outcome
        .changes
        .contains(&FieldChange::Scalar { field: "about" });
    let about = outcome.data.about.clone();

    document.replace_projection(outcome.data);
    for (id, field) in stamps {
        document.set_entry_provenance(id, field, provenance.clone());
    }
    let about = if about_changed {
        document.sync_about(&about, &provenance)
    } else {
        Vec::new()
    };

    AppliedEdit {
        changes: outcome.changes,
        about,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::document::block::Origin;
    use crate::document::model::ABOUT_SECTION;
    use crate::generation::collaborator::testing::ScriptedCollaborator;
    use crate::models::portfolio::Project;

    fn sample() -> PortfolioData {
        PortfolioData {
            name: "Ada Lovelace".to_string(),
            title: "Engineer".to_string(),
            email: "ada@example.com".to_string(),
            phone: "010-0000-0000".to_string(),
            github: "github.com/ada".to_string(),
            about: "I like engines.".to_string(),
            projects: vec![
                Project {
                    name: "Engine".to_string(),
                    description: "Mechanical computer".to_string(),
                    ..Default::default()
                },
                Project {
                    name: "Notes".to_string(),
                    description: "Annotations".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    fn pipeline(script: ScriptedCollaborator) -> (NaturalLanguageEditPipeline, Arc<ScriptedCollaborator>) {
        let script = Arc::new(script);
        (NaturalLanguageEditPipeline::new(script.clone()), script)
    }

    async fn open_document(store: &DocumentStore, data: PortfolioData) -> Uuid {
        let mut doc = Document::new(Uuid::new_v4());
        doc.replace_projection(data);
        store.insert(doc).await
    }

    #[tokio::test]
    async fn test_invalid_json_is_rejected_and_data_unchanged() {
        let (pipeline, _) = pipeline(ScriptedCollaborator::replying(["Sure! Here is your data"]));
        let store = DocumentStore::new();
        let before = sample();
        let doc_id = open_document(&store, before.clone()).await;

        let err = pipeline
            .edit_document(&store, doc_id, "make it punchier")
            .await
            .unwrap_err();

        assert!(matches!(err, EditError::MalformedCollaboratorResponse(_)));
        assert_eq!(store.get(doc_id).await.unwrap().projection(), before);
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_minimal_record() {
        let (pipeline, _) = pipeline(ScriptedCollaborator::replying(["{not json"]));
        let current = PortfolioData {
            name: "A".to_string(),
            about: String::new(),
            ..Default::default()
        };

        let err = pipeline.apply("add an intro", &current).await.unwrap_err();

        assert!(matches!(err, EditError::MalformedCollaboratorResponse(_)));
        assert_eq!(current.name, "A");
        assert_eq!(current.about, "");
    }

    #[tokio::test]
    async fn test_non_object_reply_is_rejected() {
        let err = merge_response(&sample(), "[1, 2, 3]").unwrap_err();
        assert!(matches!(err, EditError::MalformedCollaboratorResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_instruction_rejected_without_calling_collaborator() {
        let (pipeline, script) = pipeline(ScriptedCollaborator::default());
        let err = pipeline.apply("   ", &sample()).await.unwrap_err();
        assert!(matches!(err, EditError::EmptyInstruction));
        assert_eq!(script.request_count(), 0);
    }

    #[tokio::test]
    async fn test_request_carries_current_data_and_instruction() {
        let current = sample();
        let script = ScriptedCollaborator::default();
        script.push(Duration::ZERO, Ok(serde_json::to_string(&current).unwrap()));
        let (pipeline, script) = pipeline(script);

        let outcome = pipeline.apply("fix typos", &current).await.unwrap();

        let prompt = script.last_prompt();
        assert!(prompt.contains("\"currentData\""));
        assert!(prompt.contains("\"instruction\": \"fix typos\""));
        assert!(outcome.changes.is_empty());
    }

    #[test]
    fn test_dropped_required_scalar_is_rejected() {
        let mut proposed = sample();
        proposed.email = "".to_string();
        let raw = serde_json::to_string(&proposed).unwrap();

        let err = merge_response(&sample(), &raw).unwrap_err();
        assert!(matches!(err, EditError::DroppedRequiredField("email")));
    }

    #[test]
    fn test_fenced_reply_is_accepted() {
        let mut proposed = sample();
        proposed.title = "Mathematician".to_string();
        let raw = format!("```json\n{}\n```", serde_json::to_string(&proposed).unwrap());

        let outcome = merge_response(&sample(), &raw).unwrap();
        assert_eq!(outcome.data.title, "Mathematician");
        assert_eq!(outcome.changes, vec![FieldChange::Scalar { field: "title" }]);
    }

    #[test]
    fn test_missing_ids_are_readopted_by_natural_key() {
        let current = sample();
        let mut value = serde_json::to_value(&current).unwrap();
        // Reordered, ids stripped, one description changed.
        let projects = value["projects"].as_array_mut().unwrap();
        projects.reverse();
        for project in projects.iter_mut() {
            project.as_object_mut().unwrap().remove("id");
        }
        projects[1]["description"] = json!("First programmable computer");

        let outcome = merge_response(&current, &value.to_string()).unwrap();

        let engine_id = current.projects[0].id;
        let notes_id = current.projects[1].id;
        assert_eq!(outcome.data.projects[0].id, notes_id);
        assert_eq!(outcome.data.projects[1].id, engine_id);
        assert_eq!(
            outcome.changes,
            vec![FieldChange::Entry {
                kind: EntryKind::Project,
                id: engine_id,
                field: EntryField::Description,
            }]
        );
    }

    #[test]
    fn test_added_and_removed_entries_are_reported() {
        let current = sample();
        let mut proposed = current.clone();
        let removed = proposed.projects.remove(1).id;
        proposed.projects.push(Project {
            name: "Difference Engine".to_string(),
            ..Default::default()
        });
        let added = proposed.projects[1].id;

        let outcome = merge_response(&current, &serde_json::to_string(&proposed).unwrap()).unwrap();

        assert!(outcome.changes.contains(&FieldChange::EntryAdded {
            kind: EntryKind::Project,
            id: added
        }));
        assert!(outcome.changes.contains(&FieldChange::EntryRemoved {
            kind: EntryKind::Project,
            id: removed
        }));
    }

    #[tokio::test]
    async fn test_merge_marks_changed_fields_generated_and_keeps_user_edits() {
        let current = sample();
        let engine = current.projects[0].id;
        let store = DocumentStore::new();
        let doc_id = open_document(&store, current.clone()).await;
        store
            .update(doc_id, |doc| doc.commit_entry_edit(engine, EntryField::Name))
            .await;

        let mut proposed = current.clone();
        proposed.projects[0].name = "Analytical Engine".to_string();
        proposed.projects[0].description = "The first general computer".to_string();
        let script = ScriptedCollaborator::default();
        script.push(Duration::ZERO, Ok(serde_json::to_string(&proposed).unwrap()));
        let (pipeline, _) = pipeline(script);

        let applied = pipeline
            .edit_document(&store, doc_id, "expand the Engine project")
            .await
            .unwrap();
        assert_eq!(applied.changes.len(), 2);

        let doc = store.get(doc_id).await.unwrap();
        let description = doc.provenance().get(engine, EntryField::Description).unwrap();
        assert_eq!(description.origin, Origin::AiGenerated);
        assert_eq!(description.confidence, NL_EDIT_CONFIDENCE);
        assert!(description
            .auto_fill_reason
            .as_deref()
            .unwrap()
            .contains("expand the Engine project"));

        let name = doc.provenance().get(engine, EntryField::Name).unwrap();
        assert_eq!(name.origin, Origin::UserEdited);
        assert_eq!(doc.projection().projects[0].name, "Analytical Engine");
    }

    #[tokio::test]
    async fn test_about_change_skips_block_being_edited() {
        let store = DocumentStore::new();
        let doc_id = open_document(&store, sample()).await;
        let block = store
            .update(doc_id, |doc| {
                let id = doc.create_block(ABOUT_SECTION, "I like engines.", Origin::UserProvided, None);
                doc.mark_dirty(id);
                id
            })
            .await
            .unwrap();

        let mut proposed = sample();
        proposed.about = "I design engines.".to_string();
        let script = ScriptedCollaborator::default();
        script.push(Duration::ZERO, Ok(serde_json::to_string(&proposed).unwrap()));
        let (pipeline, _) = pipeline(script);

        let applied = pipeline.edit_document(&store, doc_id, "reword about").await.unwrap();

        assert_eq!(applied.about, vec![RefreshOutcome::SkippedDirty]);
        let doc = store.get(doc_id).await.unwrap();
        assert_eq!(doc.block(block).unwrap().text, "I like engines.");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_is_discarded() {
        let current = sample();
        let mut slow_reply = current.clone();
        slow_reply.title = "Slow".to_string();
        let mut fast_reply = current.clone();
        fast_reply.title = "Fast".to_string();

        let script = ScriptedCollaborator::default();
        script.push(Duration::from_millis(500), Ok(serde_json::to_string(&slow_reply).unwrap()));
        script.push(Duration::from_millis(10), Ok(serde_json::to_string(&fast_reply).unwrap()));
        let (pipeline, _) = pipeline(script);

        let store = DocumentStore::new();
        let doc_id = open_document(&store, current).await;

        let first = {
            let (pipeline, store) = (pipeline.clone(), store.clone());
            tokio::spawn(async move { pipeline.edit_document(&store, doc_id, "first").await })
        };
        tokio::time::sleep(Duration::from_millis(1)).await;
        let second = pipeline.edit_document(&store, doc_id, "second").await;

        assert!(second.is_ok());
        let first = first.await.unwrap();
        assert!(matches!(first, Err(EditError::Superseded)));
        assert_eq!(store.get(doc_id).await.unwrap().projection().title, "Fast");
    }
}
