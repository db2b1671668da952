//! Fill pipeline: builds a document from partial input and drafts text for
//! the gaps in a single collaborator request.
//!
//! Text the user supplied becomes `user_provided` blocks or entry-field
//! provenance. Each accepted fill becomes `ai_generated` with the
//! collaborator's confidence and reason. A failed or malformed collaborator
//! reply degrades to a document with its gaps left empty.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::document::block::Origin;
use crate::document::model::{Document, ABOUT_SECTION};
use crate::document::provenance::FieldProvenance;
use crate::generation::collaborator::{CollaboratorRequest, GenerationCollaborator};
use crate::generation::prompts::{fill_system, FILL_PROMPT_TEMPLATE};
use crate::llm_client::strip_json_fences;
use crate::models::portfolio::{is_missing, EntryField, EntryId, PortfolioData};

const DEFAULT_FILL_CONFIDENCE: f32 = 0.6;

// ────────────────────────────────────────────────────────────────────────────
// Request / gap types
// ────────────────────────────────────────────────────────────────────────────

/// A free-text narrative section (motivation, process, reflection, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct NarrativeInput {
    pub section_id: String,
    pub title: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub portfolio: PortfolioData,
    #[serde(default)]
    pub narratives: Vec<NarrativeInput>,
}

/// Something the user left empty that the collaborator may draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GapTarget {
    About,
    Narrative(String),
    ProjectDescription(EntryId),
    ExperienceDescription(EntryId),
}

impl GapTarget {
    /// Wire key used in the prompt and expected back in the reply.
    pub fn key(&self) -> String {
        match self {
            GapTarget::About => "about".to_string(),
            GapTarget::Narrative(section) => format!("narrative:{section}"),
            GapTarget::ProjectDescription(id) => format!("project:{id}:description"),
            GapTarget::ExperienceDescription(id) => format!("experience:{id}:description"),
        }
    }

    pub fn parse(key: &str) -> Option<Self> {
        let key = key.trim();
        if key == "about" {
            return Some(GapTarget::About);
        }
        if let Some(section) = key.strip_prefix("narrative:") {
            return (!section.is_empty()).then(|| GapTarget::Narrative(section.to_string()));
        }
        let parse_id = |rest: &str| {
            rest.strip_suffix(":description")
                .and_then(|id| Uuid::parse_str(id).ok())
                .map(EntryId)
        };
        if let Some(rest) = key.strip_prefix("project:") {
            return parse_id(rest).map(GapTarget::ProjectDescription);
        }
        if let Some(rest) = key.strip_prefix("experience:") {
            return parse_id(rest).map(GapTarget::ExperienceDescription);
        }
        None
    }

    fn default_reason(&self) -> &'static str {
        match self {
            GapTarget::About => "About section was empty",
            GapTarget::Narrative(_) => "Narrative section was empty",
            GapTarget::ProjectDescription(_) => "Project had no description",
            GapTarget::ExperienceDescription(_) => "Experience had no description",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct GapPrompt {
    target: String,
    hint: String,
}

#[derive(Debug, Deserialize)]
struct FillResponse {
    #[serde(default)]
    fills: Vec<Fill>,
}

#[derive(Debug, Deserialize)]
struct Fill {
    target: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Clone)]
pub struct DraftOutcome {
    pub document: Document,
    pub filled: Vec<String>,
    pub unfilled: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct FillPipeline {
    collaborator: Arc<dyn GenerationCollaborator>,
}

impl FillPipeline {
    pub fn new(collaborator: Arc<dyn GenerationCollaborator>) -> Self {
        Self { collaborator }
    }

    pub async fn draft(&self, request: DraftRequest) -> DraftOutcome {
        let DraftRequest {
            user_id,
            portfolio: mut data,
            narratives,
        } = request;
        let mut document = Document::new(user_id);

        record_user_text(&mut document, &data, &narratives);

        let gaps = find_gaps(&data, &narratives);
        let fills = if gaps.is_empty() {
            Vec::new()
        } else {
            self.request_fills(&data, &gaps).await
        };

        let mut filled: Vec<GapTarget> = Vec::new();
        for fill in fills {
            let Some(target) = GapTarget::parse(&fill.target) else {
                warn!(target = %fill.target, "Ignoring fill for an unknown target");
                continue;
            };
            if !gaps.contains(&target) || filled.contains(&target) {
                debug!(target = %fill.target, "Ignoring fill for a non-gap or repeated target");
                continue;
            }
            let text = fill.text.trim();
            if is_missing(text) {
                continue;
            }

            let confidence = fill.confidence.unwrap_or(DEFAULT_FILL_CONFIDENCE);
            let reason = if fill.reason.trim().is_empty() {
                target.default_reason().to_string()
            } else {
                fill.reason.trim().to_string()
            };
            let provenance = FieldProvenance::generated(confidence, reason);

            match &target {
                GapTarget::About => {
                    document.sync_about(text, &provenance);
                    data.about = text.to_string();
                }
                GapTarget::Narrative(section) => {
                    let confidence = provenance.confidence;
                    let reason = provenance.auto_fill_reason.clone().unwrap_or_default();
                    document.create_generated_block(section, text, confidence, reason);
                }
                GapTarget::ProjectDescription(id) => {
                    if let Some(project) = data.projects.iter_mut().find(|p| p.id == *id) {
                        project.description = text.to_string();
                        document.set_entry_provenance(*id, EntryField::Description, provenance);
                    }
                }
                GapTarget::ExperienceDescription(id) => {
                    if let Some(experience) = data.experiences.iter_mut().find(|e| e.id == *id) {
                        experience.description = text.to_string();
                        document.set_entry_provenance(*id, EntryField::Description, provenance);
                    }
                }
            }
            filled.push(target);
        }

        document.replace_projection(data);

        let unfilled: Vec<String> = gaps
            .iter()
            .filter(|g| !filled.contains(g))
            .map(GapTarget::key)
            .collect();
        info!(
            doc_id = %document.doc_id,
            filled = filled.len(),
            unfilled = unfilled.len(),
            "Drafted document"
        );

        DraftOutcome {
            document,
            filled: filled.iter().map(GapTarget::key).collect(),
            unfilled,
        }
    }

    async fn request_fills(&self, data: &PortfolioData, gaps: &[GapTarget]) -> Vec<Fill> {
        let gap_prompts: Vec<GapPrompt> = gaps
            .iter()
            .map(|g| GapPrompt {
                target: g.key(),
                hint: hint_for(g, data),
            })
            .collect();

        let prompt = FILL_PROMPT_TEMPLATE
            .replace(
                "{portfolio}",
                &serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string()),
            )
            .replace(
                "{gaps}",
                &serde_json::to_string_pretty(&json!(gap_prompts)).unwrap_or_else(|_| "[]".to_string()),
            );

        let raw = match self
            .collaborator
            .complete(CollaboratorRequest::json(fill_system(), prompt))
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, gaps = gaps.len(), "Fill request failed, leaving gaps empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<FillResponse>(strip_json_fences(&raw)) {
            Ok(response) => response.fills,
            Err(e) => {
                warn!(error = %e, "Malformed fill response, leaving gaps empty");
                Vec::new()
            }
        }
    }
}

/// User-supplied text is recorded before any generation so its provenance is
/// never confused with a fill.
fn record_user_text(document: &mut Document, data: &PortfolioData, narratives: &[NarrativeInput]) {
    document.add_section(ABOUT_SECTION, "About");
    if !is_missing(&data.about) {
        document.sync_about(&data.about, &FieldProvenance::user_provided());
    }

    for narrative in narratives {
        document.add_section(&narrative.section_id, &narrative.title);
        if !is_missing(&narrative.text) {
            document.create_block(
                &narrative.section_id,
                narrative.text.trim(),
                Origin::UserProvided,
                None,
            );
        }
    }

    for (_, id) in data.entry_ids() {
        if let Some((_, fields)) = data.entry_fields(id) {
            for (field, value) in fields {
                if !value.trim().is_empty() {
                    document.set_entry_provenance(id, field, FieldProvenance::user_provided());
                }
            }
        }
    }
}

pub fn find_gaps(data: &PortfolioData, narratives: &[NarrativeInput]) -> Vec<GapTarget> {
    let mut gaps = Vec::new();
    if is_missing(&data.about) {
        gaps.push(GapTarget::About);
    }
    for narrative in narratives {
        if is_missing(&narrative.text) {
            gaps.push(GapTarget::Narrative(narrative.section_id.clone()));
        }
    }
    gaps.extend(
        data.projects
            .iter()
            .filter(|p| is_missing(&p.description))
            .map(|p| GapTarget::ProjectDescription(p.id)),
    );
    gaps.extend(
        data.experiences
            .iter()
            .filter(|e| is_missing(&e.description))
            .map(|e| GapTarget::ExperienceDescription(e.id)),
    );
    gaps
}

fn hint_for(target: &GapTarget, data: &PortfolioData) -> String {
    match target {
        GapTarget::About => "A short first-person introduction".to_string(),
        GapTarget::Narrative(section) => format!("Body text for the '{section}' section"),
        GapTarget::ProjectDescription(id) => data
            .projects
            .iter()
            .find(|p| p.id == *id)
            .map(|p| format!("What the project '{}' is and does", p.name))
            .unwrap_or_default(),
        GapTarget::ExperienceDescription(id) => data
            .experiences
            .iter()
            .find(|e| e.id == *id)
            .map(|e| format!("What the role '{}' at '{}' involved", e.role, e.company))
            .unwrap_or_default(),
    }
}
