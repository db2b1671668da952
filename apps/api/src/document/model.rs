//! Document model: ordered sections of provenance-carrying blocks, plus the
//! structured portfolio projection and its per-entry provenance map.
//!
//! The document is mutated only by its owning editing session. Concurrent
//! commits to the same block are not merged: the last `commit_edit` wins.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::document::block::{Block, BlockId, EditRecord, Origin};
use crate::document::provenance::{FieldProvenance, ProvenanceMap};
use crate::models::portfolio::{EntryField, EntryId, EntryKind, EntryUpdate, EntryValue, PortfolioData};

/// Section holding the free-text `about` narrative of the projection.
pub const ABOUT_SECTION: &str = "about";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Result of a user commit against a block id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed,
    /// The block id no longer exists; the caller should refetch the document.
    StaleBlockReference,
}

/// Result of applying incoming (generated or merged) text to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshOutcome {
    Applied,
    Unchanged,
    /// The user is editing this block; the incoming text was not applied.
    SkippedDirty,
    StaleBlockReference,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub doc_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    sections: Vec<Section>,
    projection: PortfolioData,
    provenance: ProvenanceMap,
    /// Blocks currently focused in an editing surface.
    #[serde(skip)]
    dirty: HashSet<BlockId>,
}

impl Document {
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            doc_id: Uuid::new_v4(),
            user_id,
            created_at: now,
            updated_at: now,
            sections: Vec::new(),
            projection: PortfolioData::default(),
            provenance: ProvenanceMap::default(),
            dirty: HashSet::new(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ── Sections & blocks ──────────────────────────────────────────────────

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Adds a section, or returns the existing one with the same id.
    pub fn add_section(&mut self, id: &str, title: &str) -> &mut Section {
        let index = match self.sections.iter().position(|s| s.id == id) {
            Some(index) => index,
            None => {
                self.sections.push(Section {
                    id: id.to_string(),
                    title: title.to_string(),
                    blocks: Vec::new(),
                });
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks().find(|b| b.block_id == id)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.sections.iter().flat_map(|s| s.blocks.iter())
    }

    fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.sections
            .iter_mut()
            .flat_map(|s| s.blocks.iter_mut())
            .find(|b| b.block_id == id)
    }

    /// Creates a block at the end of `section_id` (creating the section if
    /// needed) with an empty edit history.
    pub fn create_block(
        &mut self,
        section_id: &str,
        text: impl Into<String>,
        origin: Origin,
        confidence: Option<f32>,
    ) -> BlockId {
        let block = Block::new(section_id, text, origin, confidence);
        let id = block.block_id;
        self.add_section(section_id, section_id).blocks.push(block);
        self.touch();
        id
    }

    /// Creates an `AiGenerated` block carrying its auto-fill justification.
    pub fn create_generated_block(
        &mut self,
        section_id: &str,
        text: impl Into<String>,
        confidence: f32,
        reason: impl Into<String>,
    ) -> BlockId {
        let id = self.create_block(section_id, text, Origin::AiGenerated, Some(confidence));
        if let Some(block) = self.block_mut(id) {
            block.auto_fill_reason = Some(reason.into());
        }
        id
    }

    /// Commits a user edit: the block becomes `UserEdited` with confidence 1.0
    /// and one history entry is appended. A missing block is a no-op.
    pub fn commit_edit(&mut self, block_id: BlockId, new_text: &str, editor_id: &str) -> CommitOutcome {
        let Some(block) = self.block_mut(block_id) else {
            warn!("commit_edit: block {block_id} not found, document changed shape");
            return CommitOutcome::StaleBlockReference;
        };

        let previous_text = std::mem::replace(&mut block.text, new_text.to_string());
        block.origin = Origin::UserEdited;
        block.confidence = 1.0;
        block.auto_fill_reason = None;
        block.edit_history.push(EditRecord {
            text: new_text.to_string(),
            previous_text,
            edited_at: Utc::now(),
            edited_by: editor_id.to_string(),
        });
        debug!(
            "Committed edit to block {block_id} ({} history entries)",
            block.edit_history.len()
        );

        self.dirty.remove(&block_id);
        self.touch();
        CommitOutcome::Committed
    }

    // ── Dirty tracking ─────────────────────────────────────────────────────

    /// Marks a block as being edited (focus). Returns false for unknown ids.
    pub fn mark_dirty(&mut self, block_id: BlockId) -> bool {
        if self.block(block_id).is_none() {
            return false;
        }
        self.dirty.insert(block_id)
    }

    /// Clears the editing flag (blur). Commits clear it as well.
    pub fn clear_dirty(&mut self, block_id: BlockId) -> bool {
        self.dirty.remove(&block_id)
    }

    pub fn is_dirty(&self, block_id: BlockId) -> bool {
        self.dirty.contains(&block_id)
    }

    /// Applies incoming text from generation or a merge. Dirty blocks are left
    /// alone. A `UserEdited` block keeps its origin; other blocks take the
    /// incoming provenance.
    pub fn refresh_block(
        &mut self,
        block_id: BlockId,
        text: &str,
        provenance: &FieldProvenance,
    ) -> RefreshOutcome {
        if self.is_dirty(block_id) {
            debug!("refresh_block: block {block_id} is being edited, skipping");
            return RefreshOutcome::SkippedDirty;
        }
        let Some(block) = self.block_mut(block_id) else {
            return RefreshOutcome::StaleBlockReference;
        };
        if block.text == text {
            return RefreshOutcome::Unchanged;
        }

        block.text = text.to_string();
        if block.origin != Origin::UserEdited {
            block.origin = provenance.origin;
            block.confidence = provenance.confidence;
            block.auto_fill_reason = if provenance.origin == Origin::AiGenerated {
                provenance.auto_fill_reason.clone()
            } else {
                None
            };
        }
        self.touch();
        RefreshOutcome::Applied
    }

    // ── Projection ─────────────────────────────────────────────────────────

    /// The canonical data for compilation. `about` comes from the about
    /// section's blocks when that section exists.
    pub fn projection(&self) -> PortfolioData {
        let mut data = self.projection.clone();
        if let Some(section) = self.section(ABOUT_SECTION) {
            data.about = section
                .blocks
                .iter()
                .map(|b| b.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join("\n\n");
        }
        data
    }

    /// Wholesale swap of the structured projection. `doc_id` and `created_at`
    /// are kept; `updated_at` is re-stamped; provenance of entries that no
    /// longer exist is pruned.
    pub fn replace_projection(&mut self, new_data: PortfolioData) {
        let live: HashSet<EntryId> = new_data.entry_ids().into_iter().map(|(_, id)| id).collect();
        let pruned = self.provenance.retain_entries(&live);
        if pruned > 0 {
            debug!("replace_projection pruned provenance for {pruned} removed entries");
        }
        self.projection = new_data;
        self.touch();
    }

    /// Reconciles the about section with new narrative text, one block per
    /// paragraph. Extra paragraphs become new blocks; surplus blocks are
    /// emptied rather than deleted.
    pub fn sync_about(&mut self, about: &str, provenance: &FieldProvenance) -> Vec<RefreshOutcome> {
        let paragraphs: Vec<&str> = about
            .split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let existing: Vec<BlockId> = self
            .section(ABOUT_SECTION)
            .map(|s| s.blocks.iter().map(|b| b.block_id).collect())
            .unwrap_or_default();

        let mut outcomes = Vec::new();
        for (index, paragraph) in paragraphs.iter().enumerate() {
            match existing.get(index) {
                Some(&block_id) => outcomes.push(self.refresh_block(block_id, paragraph, provenance)),
                None => {
                    let id = self.create_block(
                        ABOUT_SECTION,
                        *paragraph,
                        provenance.origin,
                        Some(provenance.confidence),
                    );
                    if let (Some(reason), Some(block)) =
                        (provenance.auto_fill_reason.clone(), self.block_mut(id))
                    {
                        block.auto_fill_reason = Some(reason);
                    }
                    outcomes.push(RefreshOutcome::Applied);
                }
            }
        }
        for &block_id in existing.iter().skip(paragraphs.len()) {
            outcomes.push(self.refresh_block(block_id, "", provenance));
        }
        outcomes
    }

    pub fn provenance(&self) -> &ProvenanceMap {
        &self.provenance
    }

    pub fn set_entry_provenance(&mut self, id: EntryId, field: EntryField, provenance: FieldProvenance) {
        self.provenance.set(id, field, provenance);
    }

    /// Writes a user's value into an entry field and marks it `user_edited`.
    pub fn edit_entry_field(
        &mut self,
        kind: EntryKind,
        id: EntryId,
        field: EntryField,
        value: EntryValue,
    ) -> EntryUpdate {
        let update = self.projection.set_entry_field(kind, id, field, value);
        if update == EntryUpdate::Applied {
            self.commit_entry_edit(id, field);
        }
        update
    }

    /// Records a direct user edit of a structured-list field.
    pub fn commit_entry_edit(&mut self, id: EntryId, field: EntryField) {
        self.provenance.mark_user_edited(id, field);
        self.touch();
    }

    /// Removes a structured entry together with its provenance.
    pub fn remove_entry(&mut self, kind: EntryKind, id: EntryId) -> bool {
        let removed = self.projection.remove_entry(kind, id);
        if removed {
            self.provenance.remove_entry(id);
            self.touch();
        }
        removed
    }

    /// A consistent copy for the save callback.
    pub fn snapshot_for_save(&self) -> Document {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::portfolio::Project;

    fn doc_with_block() -> (Document, BlockId) {
        let mut doc = Document::new(Uuid::new_v4());
        let id = doc.create_generated_block(ABOUT_SECTION, "Generated intro", 0.7, "about was empty");
        (doc, id)
    }

    #[test]
    fn test_create_block_lands_in_section_with_empty_history() {
        let (doc, id) = doc_with_block();
        let block = doc.block(id).unwrap();
        assert_eq!(block.section_id, ABOUT_SECTION);
        assert_eq!(block.origin, Origin::AiGenerated);
        assert_eq!(block.auto_fill_reason.as_deref(), Some("about was empty"));
        assert!(block.edit_history.is_empty());
        assert_eq!(doc.section(ABOUT_SECTION).unwrap().blocks.len(), 1);
    }

    #[test]
    fn test_commit_edit_twice_appends_two_entries() {
        let (mut doc, id) = doc_with_block();

        assert_eq!(doc.commit_edit(id, "Mine now", "user-1"), CommitOutcome::Committed);
        assert_eq!(doc.commit_edit(id, "Mine now", "user-1"), CommitOutcome::Committed);

        let block = doc.block(id).unwrap();
        assert_eq!(block.origin, Origin::UserEdited);
        assert_eq!(block.confidence, 1.0);
        assert!(block.auto_fill_reason.is_none());
        assert_eq!(block.edit_history.len(), 2);
        assert_eq!(block.edit_history[0].previous_text, "Generated intro");
        assert_eq!(block.edit_history[1].text, "Mine now");
    }

    #[test]
    fn test_commit_edit_on_missing_block_is_noop() {
        let (mut doc, _) = doc_with_block();
        let before = doc.updated_at;
        let outcome = doc.commit_edit(BlockId::new(), "x", "user-1");
        assert_eq!(outcome, CommitOutcome::StaleBlockReference);
        assert_eq!(doc.updated_at, before);
    }

    #[test]
    fn test_refresh_skips_dirty_block() {
        let (mut doc, id) = doc_with_block();
        assert!(doc.mark_dirty(id));

        let outcome = doc.refresh_block(id, "Incoming", &FieldProvenance::generated(0.5, "merge"));
        assert_eq!(outcome, RefreshOutcome::SkippedDirty);
        assert_eq!(doc.block(id).unwrap().text, "Generated intro");

        doc.clear_dirty(id);
        let outcome = doc.refresh_block(id, "Incoming", &FieldProvenance::generated(0.5, "merge"));
        assert_eq!(outcome, RefreshOutcome::Applied);
        assert_eq!(doc.block(id).unwrap().confidence, 0.5);
    }

    #[test]
    fn test_refresh_never_reverts_user_edited_origin() {
        let (mut doc, id) = doc_with_block();
        doc.commit_edit(id, "Typed by hand", "user-1");

        doc.refresh_block(id, "Rewritten", &FieldProvenance::generated(0.4, "nl edit"));
        let block = doc.block(id).unwrap();
        assert_eq!(block.text, "Rewritten");
        assert_eq!(block.origin, Origin::UserEdited);
        assert_eq!(block.confidence, 1.0);
    }

    #[test]
    fn test_commit_clears_dirty_flag() {
        let (mut doc, id) = doc_with_block();
        doc.mark_dirty(id);
        doc.commit_edit(id, "Done", "user-1");
        assert!(!doc.is_dirty(id));
    }

    #[test]
    fn test_replace_projection_keeps_identity_and_restamps() {
        let (mut doc, _) = doc_with_block();
        let doc_id = doc.doc_id;
        let created = doc.created_at;
        let before = doc.updated_at;

        let data = PortfolioData {
            name: "Ada".to_string(),
            ..Default::default()
        };
        doc.replace_projection(data);

        assert_eq!(doc.doc_id, doc_id);
        assert_eq!(doc.created_at, created);
        assert!(doc.updated_at >= before);
        assert_eq!(doc.projection().name, "Ada");
    }

    #[test]
    fn test_projection_reads_about_from_blocks() {
        let (mut doc, _) = doc_with_block();
        doc.create_block(ABOUT_SECTION, "Second paragraph", Origin::UserProvided, None);
        assert_eq!(doc.projection().about, "Generated intro\n\nSecond paragraph");
    }

    #[test]
    fn test_provenance_survives_reorder_and_delete() {
        let mut doc = Document::new(Uuid::new_v4());
        let first = Project {
            name: "First".to_string(),
            ..Default::default()
        };
        let second = Project {
            name: "Second".to_string(),
            ..Default::default()
        };
        let (first_id, second_id) = (first.id, second.id);
        doc.replace_projection(PortfolioData {
            projects: vec![first.clone(), second.clone()],
            ..Default::default()
        });
        doc.set_entry_provenance(
            second_id,
            EntryField::Description,
            FieldProvenance::generated(0.6, "filled"),
        );

        // Reorder: provenance follows the entry, not its index.
        doc.replace_projection(PortfolioData {
            projects: vec![second, first],
            ..Default::default()
        });
        assert_eq!(
            doc.provenance()
                .get(second_id, EntryField::Description)
                .unwrap()
                .origin,
            Origin::AiGenerated
        );

        assert!(doc.remove_entry(EntryKind::Project, first_id));
        assert!(doc
            .provenance()
            .get(second_id, EntryField::Description)
            .is_some());
    }

    #[test]
    fn test_direct_entry_edit_overrides_generated_provenance() {
        let mut doc = Document::new(Uuid::new_v4());
        let project = Project {
            name: "Engine".to_string(),
            ..Default::default()
        };
        let id = project.id;
        doc.replace_projection(PortfolioData {
            projects: vec![project],
            ..Default::default()
        });
        doc.set_entry_provenance(id, EntryField::Description, FieldProvenance::generated(0.6, "filled"));

        let update = doc.edit_entry_field(
            EntryKind::Project,
            id,
            EntryField::Description,
            EntryValue::Text("Hand-built".to_string()),
        );

        assert_eq!(update, EntryUpdate::Applied);
        assert_eq!(doc.projection().projects[0].description, "Hand-built");
        let provenance = doc.provenance().get(id, EntryField::Description).unwrap();
        assert_eq!(provenance, &FieldProvenance::user_edited());
    }

    #[test]
    fn test_rejected_entry_edit_leaves_provenance_alone() {
        let mut doc = Document::new(Uuid::new_v4());
        let project = Project::default();
        let id = project.id;
        doc.replace_projection(PortfolioData {
            projects: vec![project],
            ..Default::default()
        });

        let update = doc.edit_entry_field(
            EntryKind::Project,
            id,
            EntryField::School,
            EntryValue::Text("MIT".to_string()),
        );

        assert_eq!(update, EntryUpdate::UnsupportedField);
        assert!(doc.provenance().get(id, EntryField::School).is_none());
    }

    #[test]
    fn test_sync_about_adds_and_empties_blocks() {
        let mut doc = Document::new(Uuid::new_v4());
        let first = doc.create_block(ABOUT_SECTION, "One", Origin::UserProvided, None);
        let second = doc.create_block(ABOUT_SECTION, "Two", Origin::UserProvided, None);

        let provenance = FieldProvenance::generated(0.8, "edit");
        doc.sync_about("Uno", &provenance);
        assert_eq!(doc.block(first).unwrap().text, "Uno");
        assert_eq!(doc.block(second).unwrap().text, "");
        assert_eq!(doc.projection().about, "Uno");

        doc.sync_about("Uno\n\nDos\n\nTres", &provenance);
        assert_eq!(doc.section(ABOUT_SECTION).unwrap().blocks.len(), 3);
        assert_eq!(doc.projection().about, "Uno\n\nDos\n\nTres");
    }
}
