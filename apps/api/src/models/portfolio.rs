//! Canonical portfolio projection: the flattened scalar + list shape consumed
//! by the template compiler and round-tripped through the edit pipeline.
//!
//! Every structured-list entry carries a durable `EntryId`. Provenance for list
//! fields is keyed on `(EntryId, EntryField)`, so reordering or deleting entries
//! never shifts another entry's provenance.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Durable identifier of a structured-list entry (project, experience, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Project,
    Experience,
    Education,
    Award,
}

/// Field names of structured-list entries, used as provenance keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryField {
    Name,
    Description,
    TechStack,
    Achievements,
    Link,
    Period,
    Company,
    Role,
    Location,
    School,
    Degree,
    Title,
    Issuer,
    Date,
}

/// Collaborators sometimes send `null` where a string or list is expected.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillCategory {
    #[serde(deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: EntryId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub tech_stack: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
    pub link: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Experience {
    pub id: EntryId,
    #[serde(deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Education {
    pub id: EntryId,
    #[serde(deserialize_with = "null_as_default")]
    pub school: String,
    #[serde(deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Award {
    pub id: EntryId,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub issuer: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
}

/// The canonical data record rendered by every template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioData {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github: String,
    pub location: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub about: String,
    #[serde(deserialize_with = "null_as_default")]
    pub skills: Vec<SkillCategory>,
    #[serde(deserialize_with = "null_as_default")]
    pub projects: Vec<Project>,
    #[serde(deserialize_with = "null_as_default")]
    pub experiences: Vec<Experience>,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "null_as_default")]
    pub awards: Vec<Award>,
}

/// Scalars every template needs. A missing value is replaced by a placeholder
/// at compile time and must never be dropped by a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredScalar {
    Name,
    Title,
    Email,
    Phone,
    Github,
}

impl RequiredScalar {
    pub const ALL: [RequiredScalar; 5] = [
        RequiredScalar::Name,
        RequiredScalar::Title,
        RequiredScalar::Email,
        RequiredScalar::Phone,
        RequiredScalar::Github,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequiredScalar::Name => "name",
            RequiredScalar::Title => "title",
            RequiredScalar::Email => "email",
            RequiredScalar::Phone => "phone",
            RequiredScalar::Github => "github",
        }
    }

    pub fn value(self, data: &PortfolioData) -> &str {
        match self {
            RequiredScalar::Name => &data.name,
            RequiredScalar::Title => &data.title,
            RequiredScalar::Email => &data.email,
            RequiredScalar::Phone => &data.phone,
            RequiredScalar::Github => &data.github,
        }
    }

    pub fn value_mut(self, data: &mut PortfolioData) -> &mut String {
        match self {
            RequiredScalar::Name => &mut data.name,
            RequiredScalar::Title => &mut data.title,
            RequiredScalar::Email => &mut data.email,
            RequiredScalar::Phone => &mut data.phone,
            RequiredScalar::Github => &mut data.github,
        }
    }
}

/// True when a value should be treated as absent: blank, or a stringified
/// `null` / `undefined` left behind by an upstream serializer.
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("undefined")
}

/// A direct edit of one entry field. List fields take either a list or
/// newline-separated text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum EntryValue {
    Text(String),
    List(Vec<String>),
}

impl EntryValue {
    fn into_text(self) -> String {
        match self {
            EntryValue::Text(text) => text,
            EntryValue::List(items) => items.join("\n"),
        }
    }

    fn into_list(self) -> Vec<String> {
        let items = match self {
            EntryValue::Text(text) => text.lines().map(str::to_string).collect(),
            EntryValue::List(items) => items,
        };
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()
    }

    fn into_optional(self) -> Option<String> {
        Some(self.into_text().trim().to_string()).filter(|text| !is_missing(text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryUpdate {
    Applied,
    UnknownEntry,
    /// The field does not exist on this kind of entry.
    UnsupportedField,
}

/// Shared view over the structured-list entry types.
pub trait PortfolioEntry {
    const KIND: EntryKind;

    fn id(&self) -> EntryId;
    fn set_id(&mut self, id: EntryId);
    /// Natural key used to re-associate entries whose ids were lost in transit.
    fn natural_key(&self) -> String;
    /// Field values flattened to strings, for diffing and provenance stamping.
    fn field_values(&self) -> Vec<(EntryField, String)>;
    /// Overwrites one field. Returns false if the entry has no such field.
    fn set_field(&mut self, field: EntryField, value: EntryValue) -> bool;
}

impl PortfolioEntry for Project {
    const KIND: EntryKind = EntryKind::Project;

    fn id(&self) -> EntryId {
        self.id
    }

    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }

    fn natural_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    fn field_values(&self) -> Vec<(EntryField, String)> {
        vec![
            (EntryField::Name, self.name.clone()),
            (EntryField::Description, self.description.clone()),
            (EntryField::TechStack, self.tech_stack.join("\n")),
            (EntryField::Achievements, self.achievements.join("\n")),
            (EntryField::Link, self.link.clone().unwrap_or_default()),
            (EntryField::Period, self.period.clone()),
        ]
    }

    fn set_field(&mut self, field: EntryField, value: EntryValue) -> bool {
        match field {
            EntryField::Name => self.name = value.into_text(),
            EntryField::Description => self.description = value.into_text(),
            EntryField::TechStack => self.tech_stack = value.into_list(),
            EntryField::Achievements => self.achievements = value.into_list(),
            EntryField::Link => self.link = value.into_optional(),
            EntryField::Period => self.period = value.into_text(),
            _ => return false,
        }
        true
    }
}

impl PortfolioEntry for Experience {
    const KIND: EntryKind = EntryKind::Experience;

    fn id(&self) -> EntryId {
        self.id
    }

    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }

    fn natural_key(&self) -> String {
        format!(
            "{}|{}",
            self.company.trim().to_lowercase(),
            self.role.trim().to_lowercase()
        )
    }

    fn field_values(&self) -> Vec<(EntryField, String)> {
        vec![
            (EntryField::Company, self.company.clone()),
            (EntryField::Role, self.role.clone()),
            (EntryField::Period, self.period.clone()),
            (EntryField::Description, self.description.clone()),
            (EntryField::Achievements, self.achievements.join("\n")),
            (EntryField::Location, self.location.clone().unwrap_or_default()),
        ]
    }

    fn set_field(&mut self, field: EntryField, value: EntryValue) -> bool {
        match field {
            EntryField::Company => self.company = value.into_text(),
            EntryField::Role => self.role = value.into_text(),
            EntryField::Period => self.period = value.into_text(),
            EntryField::Description => self.description = value.into_text(),
            EntryField::Achievements => self.achievements = value.into_list(),
            EntryField::Location => self.location = value.into_optional(),
            _ => return false,
        }
        true
    }
}

impl PortfolioEntry for Education {
    const KIND: EntryKind = EntryKind::Education;

    fn id(&self) -> EntryId {
        self.id
    }

    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }

    fn natural_key(&self) -> String {
        format!(
            "{}|{}",
            self.school.trim().to_lowercase(),
            self.degree.trim().to_lowercase()
        )
    }

    fn field_values(&self) -> Vec<(EntryField, String)> {
        vec![
            (EntryField::School, self.school.clone()),
            (EntryField::Degree, self.degree.clone()),
            (EntryField::Period, self.period.clone()),
            (EntryField::Description, self.description.clone()),
        ]
    }

    fn set_field(&mut self, field: EntryField, value: EntryValue) -> bool {
        match field {
            EntryField::School => self.school = value.into_text(),
            EntryField::Degree => self.degree = value.into_text(),
            EntryField::Period => self.period = value.into_text(),
            EntryField::Description => self.description = value.into_text(),
            _ => return false,
        }
        true
    }
}

impl PortfolioEntry for Award {
    const KIND: EntryKind = EntryKind::Award;

    fn id(&self) -> EntryId {
        self.id
    }

    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }

    fn natural_key(&self) -> String {
        self.title.trim().to_lowercase()
    }

    fn field_values(&self) -> Vec<(EntryField, String)> {
        vec![
            (EntryField::Title, self.title.clone()),
            (EntryField::Issuer, self.issuer.clone()),
            (EntryField::Date, self.date.clone()),
            (EntryField::Description, self.description.clone()),
        ]
    }

    fn set_field(&mut self, field: EntryField, value: EntryValue) -> bool {
        match field {
            EntryField::Title => self.title = value.into_text(),
            EntryField::Issuer => self.issuer = value.into_text(),
            EntryField::Date => self.date = value.into_text(),
            EntryField::Description => self.description = value.into_text(),
            _ => return false,
        }
        true
    }
}

impl PortfolioData {
    /// Ids of every structured-list entry, tagged with their kind.
    pub fn entry_ids(&self) -> Vec<(EntryKind, EntryId)> {
        let mut ids = Vec::new();
        ids.extend(self.projects.iter().map(|e| (EntryKind::Project, e.id)));
        ids.extend(self.experiences.iter().map(|e| (EntryKind::Experience, e.id)));
        ids.extend(self.education.iter().map(|e| (EntryKind::Education, e.id)));
        ids.extend(self.awards.iter().map(|e| (EntryKind::Award, e.id)));
        ids
    }

    /// Flattened field values of a single entry, if it exists.
    pub fn entry_fields(&self, id: EntryId) -> Option<(EntryKind, Vec<(EntryField, String)>)> {
        fn find<E: PortfolioEntry>(
            entries: &[E],
            id: EntryId,
        ) -> Option<(EntryKind, Vec<(EntryField, String)>)> {
            entries
                .iter()
                .find(|e| e.id() == id)
                .map(|e| (E::KIND, e.field_values()))
        }

        find(&self.projects, id)
            .or_else(|| find(&self.experiences, id))
            .or_else(|| find(&self.education, id))
            .or_else(|| find(&self.awards, id))
    }

    /// Overwrites one field of the entry with this kind and id.
    pub fn set_entry_field(
        &mut self,
        kind: EntryKind,
        id: EntryId,
        field: EntryField,
        value: EntryValue,
    ) -> EntryUpdate {
        fn set<E: PortfolioEntry>(
            entries: &mut [E],
            id: EntryId,
            field: EntryField,
            value: EntryValue,
        ) -> EntryUpdate {
            match entries.iter_mut().find(|e| e.id() == id) {
                None => EntryUpdate::UnknownEntry,
                Some(entry) => {
                    if entry.set_field(field, value) {
                        EntryUpdate::Applied
                    } else {
                        EntryUpdate::UnsupportedField
                    }
                }
            }
        }

        match kind {
            EntryKind::Project => set(&mut self.projects, id, field, value),
            EntryKind::Experience => set(&mut self.experiences, id, field, value),
            EntryKind::Education => set(&mut self.education, id, field, value),
            EntryKind::Award => set(&mut self.awards, id, field, value),
        }
    }

    /// Removes an entry by kind and id. Returns false when it was not present.
    pub fn remove_entry(&mut self, kind: EntryKind, id: EntryId) -> bool {
        fn remove<E: PortfolioEntry>(entries: &mut Vec<E>, id: EntryId) -> bool {
            let before = entries.len();
            entries.retain(|e| e.id() != id);
            entries.len() != before
        }

        match kind {
            EntryKind::Project => remove(&mut self.projects, id),
            EntryKind::Experience => remove(&mut self.experiences, id),
            EntryKind::Education => remove(&mut self.education, id),
            EntryKind::Award => remove(&mut self.awards, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_ids_are_assigned_on_deserialize() {
        let data: PortfolioData = serde_json::from_value(serde_json::json!({
            "name": "Ada",
            "projects": [{"name": "Engine"}, {"name": "Loom"}]
        }))
        .unwrap();

        assert_eq!(data.projects.len(), 2);
        assert_ne!(data.projects[0].id, data.projects[1].id);
    }

    #[test]
    fn test_null_fields_deserialize_as_empty() {
        let data: PortfolioData = serde_json::from_value(serde_json::json!({
            "name": null,
            "about": null,
            "skills": null,
            "projects": [{"name": "Engine", "techStack": null}]
        }))
        .unwrap();

        assert_eq!(data.name, "");
        assert_eq!(data.about, "");
        assert!(data.skills.is_empty());
        assert!(data.projects[0].tech_stack.is_empty());
    }

    #[test]
    fn test_is_missing_catches_stringified_nulls() {
        assert!(is_missing(""));
        assert!(is_missing("   "));
        assert!(is_missing("null"));
        assert!(is_missing(" Undefined "));
        assert!(!is_missing("Nullable types"));
    }

    #[test]
    fn test_remove_entry_only_removes_matching_kind() {
        let mut data = PortfolioData::default();
        let project = Project {
            name: "Engine".to_string(),
            ..Default::default()
        };
        let id = project.id;
        data.projects.push(project);

        assert!(!data.remove_entry(EntryKind::Award, id));
        assert!(data.remove_entry(EntryKind::Project, id));
        assert!(data.projects.is_empty());
    }

    #[test]
    fn test_set_entry_field_by_kind() {
        let mut data = PortfolioData::default();
        let project = Project {
            name: "Engine".to_string(),
            link: Some("https://example.com".to_string()),
            ..Default::default()
        };
        let id = project.id;
        data.projects.push(project);

        let update = data.set_entry_field(
            EntryKind::Project,
            id,
            EntryField::TechStack,
            EntryValue::Text("Rust\n \nTokio".to_string()),
        );
        assert_eq!(update, EntryUpdate::Applied);
        assert_eq!(data.projects[0].tech_stack, vec!["Rust", "Tokio"]);

        let update = data.set_entry_field(
            EntryKind::Project,
            id,
            EntryField::Link,
            EntryValue::Text("  ".to_string()),
        );
        assert_eq!(update, EntryUpdate::Applied);
        assert_eq!(data.projects[0].link, None);

        let update = data.set_entry_field(
            EntryKind::Project,
            id,
            EntryField::Company,
            EntryValue::Text("Acme".to_string()),
        );
        assert_eq!(update, EntryUpdate::UnsupportedField);

        let update = data.set_entry_field(
            EntryKind::Award,
            id,
            EntryField::Title,
            EntryValue::Text("Best Paper".to_string()),
        );
        assert_eq!(update, EntryUpdate::UnknownEntry);
    }

    #[test]
    fn test_entry_value_accepts_text_or_list() {
        let text: EntryValue = serde_json::from_value(serde_json::json!("Rust")).unwrap();
        let list: EntryValue = serde_json::from_value(serde_json::json!(["Rust", "Tokio"])).unwrap();
        assert_eq!(text, EntryValue::Text("Rust".to_string()));
        assert_eq!(list, EntryValue::List(vec!["Rust".to_string(), "Tokio".to_string()]));
    }

    #[test]
    fn test_entry_fields_finds_entry_by_id() {
        let mut data = PortfolioData::default();
        let award = Award {
            title: "Best Paper".to_string(),
            ..Default::default()
        };
        let id = award.id;
        data.awards.push(award);

        let (kind, fields) = data.entry_fields(id).unwrap();
        assert_eq!(kind, EntryKind::Award);
        assert!(fields.contains(&(EntryField::Title, "Best Paper".to_string())));
    }
}
