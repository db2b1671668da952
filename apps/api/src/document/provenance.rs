//! Provenance for structured-list fields, keyed by durable entry id.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::document::block::Origin;
use crate::models::portfolio::{EntryField, EntryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub origin: Origin,
    pub confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_fill_reason: Option<String>,
}

impl FieldProvenance {
    pub fn user_provided() -> Self {
        Self {
            origin: Origin::UserProvided,
            confidence: 1.0,
            auto_fill_reason: None,
        }
    }

    pub fn user_edited() -> Self {
        Self {
            origin: Origin::UserEdited,
            confidence: 1.0,
            auto_fill_reason: None,
        }
    }

    pub fn generated(confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            origin: Origin::AiGenerated,
            confidence: confidence.clamp(0.0, 1.0),
            auto_fill_reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenanceMap {
    entries: BTreeMap<EntryId, BTreeMap<EntryField, FieldProvenance>>,
}

impl ProvenanceMap {
    pub fn get(&self, id: EntryId, field: EntryField) -> Option<&FieldProvenance> {
        self.entries.get(&id).and_then(|fields| fields.get(&field))
    }

    /// Records provenance for a field. A `UserEdited` field is sticky: a later
    /// generated value does not downgrade it.
    pub fn set(&mut self, id: EntryId, field: EntryField, provenance: FieldProvenance) {
        let fields = self.entries.entry(id).or_default();
        if let Some(existing) = fields.get(&field) {
            if existing.origin == Origin::UserEdited && provenance.origin == Origin::AiGenerated {
                return;
            }
        }
        fields.insert(field, provenance);
    }

    pub fn mark_user_edited(&mut self, id: EntryId, field: EntryField) {
        self.entries
            .entry(id)
            .or_default()
            .insert(field, FieldProvenance::user_edited());
    }

    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Drops provenance for every entry not in `live`. Returns how many were pruned.
    pub fn retain_entries(&mut self, live: &HashSet<EntryId>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| live.contains(id));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_edited_is_not_downgraded_by_generation() {
        let mut map = ProvenanceMap::default();
        let id = EntryId::new();
        map.mark_user_edited(id, EntryField::Description);
        map.set(
            id,
            EntryField::Description,
            FieldProvenance::generated(0.6, "rewritten"),
        );

        assert_eq!(
            map.get(id, EntryField::Description).unwrap().origin,
            Origin::UserEdited
        );
    }

    #[test]
    fn test_retain_entries_prunes_removed_ids() {
        let mut map = ProvenanceMap::default();
        let kept = EntryId::new();
        let dropped = EntryId::new();
        map.set(kept, EntryField::Name, FieldProvenance::user_provided());
        map.set(dropped, EntryField::Name, FieldProvenance::user_provided());

        let live: HashSet<_> = [kept].into_iter().collect();
        assert_eq!(map.retain_entries(&live), 1);
        assert!(map.get(kept, EntryField::Name).is_some());
        assert!(map.get(dropped, EntryField::Name).is_none());
    }

    #[test]
    fn test_serializes_with_entry_id_keys() {
        let mut map = ProvenanceMap::default();
        let id = EntryId::new();
        map.set(id, EntryField::TechStack, FieldProvenance::user_provided());

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(
            json[id.to_string()]["tech_stack"]["origin"],
            serde_json::json!("user_provided")
        );
    }
}
