//! Template descriptors: the single source of truth for which optional fields
//! each template can render. Both the compiler and the editing surface read the
//! field-support matrix from here.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::templates::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    Minimal,
    Developer,
    Creative,
    Timeline,
}

impl TemplateId {
    pub const ALL: [TemplateId; 4] = [
        TemplateId::Minimal,
        TemplateId::Developer,
        TemplateId::Creative,
        TemplateId::Timeline,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Minimal => "minimal",
            TemplateId::Developer => "developer",
            TemplateId::Creative => "creative",
            TemplateId::Timeline => "timeline",
        }
    }

    pub fn descriptor(self) -> TemplateDescriptor {
        match self {
            TemplateId::Minimal => minimal(),
            TemplateId::Developer => developer(),
            TemplateId::Creative => creative(),
            TemplateId::Timeline => timeline(),
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CompileError::UnknownTemplate(s.to_string()))
    }
}

/// Optional data fields whose rendering depends on the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionalField {
    Location,
    Achievements,
    Education,
    Awards,
    ProjectLinks,
    SkillIcons,
}

impl OptionalField {
    pub const ALL: [OptionalField; 6] = [
        OptionalField::Location,
        OptionalField::Achievements,
        OptionalField::Education,
        OptionalField::Awards,
        OptionalField::ProjectLinks,
        OptionalField::SkillIcons,
    ];
}

/// Field-support matrix. Fields not listed are unsupported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSupport(BTreeMap<OptionalField, bool>);

impl FieldSupport {
    pub fn from_pairs(pairs: &[(OptionalField, bool)]) -> Self {
        Self(pairs.iter().copied().collect())
    }

    pub fn supports(&self, field: OptionalField) -> bool {
        self.0.get(&field).copied().unwrap_or(false)
    }

    /// Applies a caller override. An override can switch a field off but never
    /// on: a template's skeleton has no markup for fields it does not support.
    pub fn restricted_by(&self, overrides: &FieldSupport) -> FieldSupport {
        FieldSupport(
            OptionalField::ALL
                .into_iter()
                .map(|f| {
                    let allowed = overrides.0.get(&f).copied().unwrap_or(true);
                    (f, self.supports(f) && allowed)
                })
                .collect(),
        )
    }

    pub fn supported_fields(&self) -> Vec<OptionalField> {
        OptionalField::ALL
            .into_iter()
            .filter(|f| self.supports(*f))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ColorTokens {
    pub primary: &'static str,
    pub accent: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Typography {
    pub heading_font: &'static str,
    pub body_font: &'static str,
    pub mono_font: &'static str,
    pub base_size_px: u8,
    pub line_height: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutTokens {
    pub max_width_px: u16,
    pub section_gap_px: u16,
    pub radius_px: u8,
    pub columns: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct DesignSystem {
    pub colors: ColorTokens,
    pub typography: Typography,
    pub layout: LayoutTokens,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateSection {
    pub id: &'static str,
    pub name: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateDescriptor {
    pub id: TemplateId,
    pub name: &'static str,
    pub description: &'static str,
    pub design_system: DesignSystem,
    pub sections: Vec<TemplateSection>,
    pub field_support: FieldSupport,
}

const fn section(id: &'static str, name: &'static str, required: bool) -> TemplateSection {
    TemplateSection { id, name, required }
}

fn minimal() -> TemplateDescriptor {
    TemplateDescriptor {
        id: TemplateId::Minimal,
        name: "Minimal",
        description: "Single column, generous whitespace, typography first.",
        design_system: DesignSystem {
            colors: ColorTokens {
                primary: "#111827",
                accent: "#2563eb",
                background: "#ffffff",
                surface: "#f9fafb",
                text: "#1f2937",
                muted: "#6b7280",
            },
            typography: Typography {
                heading_font: "'Inter', 'Helvetica Neue', Arial, sans-serif",
                body_font: "'Inter', 'Helvetica Neue', Arial, sans-serif",
                mono_font: "'JetBrains Mono', Menlo, monospace",
                base_size_px: 16,
                line_height: 1.7,
            },
            layout: LayoutTokens {
                max_width_px: 760,
                section_gap_px: 56,
                radius_px: 4,
                columns: 1,
            },
        },
        sections: vec![
            section("hero", "Introduction", true),
            section("about", "About", true),
            section("skills", "Skills", false),
            section("projects", "Projects", true),
            section("experience", "Experience", false),
            section("education", "Education", false),
            section("contact", "Contact", true),
        ],
        field_support: FieldSupport::from_pairs(&[
            (OptionalField::Location, false),
            (OptionalField::Achievements, false),
            (OptionalField::Education, true),
            (OptionalField::Awards, false),
            (OptionalField::ProjectLinks, true),
            (OptionalField::SkillIcons, false),
        ]),
    }
}

fn developer() -> TemplateDescriptor {
    TemplateDescriptor {
        id: TemplateId::Developer,
        name: "Developer",
        description: "Dark terminal-inspired layout with a project grid.",
        design_system: DesignSystem {
            colors: ColorTokens {
                primary: "#22d3ee",
                accent: "#a3e635",
                background: "#0f172a",
                surface: "#1e293b",
                text: "#e2e8f0",
                muted: "#94a3b8",
            },
            typography: Typography {
                heading_font: "'JetBrains Mono', 'Fira Code', Menlo, monospace",
                body_font: "'Inter', system-ui, sans-serif",
                mono_font: "'JetBrains Mono', 'Fira Code', Menlo, monospace",
                base_size_px: 15,
                line_height: 1.6,
            },
            layout: LayoutTokens {
                max_width_px: 1080,
                section_gap_px: 64,
                radius_px: 10,
                columns: 2,
            },
        },
        sections: vec![
            section("hero", "Terminal header", true),
            section("about", "README", true),
            section("skills", "Stack", true),
            section("projects", "Repositories", true),
            section("experience", "Commit history", false),
            section("contact", "Contact", true),
        ],
        field_support: FieldSupport::from_pairs(&[
            (OptionalField::Location, true),
            (OptionalField::Achievements, true),
            (OptionalField::Education, false),
            (OptionalField::Awards, false),
            (OptionalField::ProjectLinks, true),
            (OptionalField::SkillIcons, true),
        ]),
    }
}

fn creative() -> TemplateDescriptor {
    TemplateDescriptor {
        id: TemplateId::Creative,
        name: "Creative",
        description: "Bold gradient hero with card-based showcase.",
        design_system: DesignSystem {
            colors: ColorTokens {
                primary: "#7c3aed",
                accent: "#f472b6",
                background: "#fdf4ff",
                surface: "#ffffff",
                text: "#3b0764",
                muted: "#86198f",
            },
            typography: Typography {
                heading_font: "'Playfair Display', Georgia, serif",
                body_font: "'Nunito', 'Segoe UI', sans-serif",
                mono_font: "'Fira Code', Menlo, monospace",
                base_size_px: 17,
                line_height: 1.65,
            },
            layout: LayoutTokens {
                max_width_px: 1120,
                section_gap_px: 72,
                radius_px: 24,
                columns: 3,
            },
        },
        sections: vec![
            section("hero", "Hero", true),
            section("about", "Story", true),
            section("skills", "Toolbox", false),
            section("projects", "Showcase", true),
            section("experience", "Journey", false),
            section("awards", "Recognition", false),
            section("contact", "Say hello", true),
        ],
        field_support: FieldSupport::from_pairs(&[
            (OptionalField::Location, true),
            (OptionalField::Achievements, false),
            (OptionalField::Education, false),
            (OptionalField::Awards, true),
            (OptionalField::ProjectLinks, true),
            (OptionalField::SkillIcons, true),
        ]),
    }
}

fn timeline() -> TemplateDescriptor {
    TemplateDescriptor {
        id: TemplateId::Timeline,
        name: "Timeline",
        description: "Chronological record with a vertical timeline.",
        design_system: DesignSystem {
            colors: ColorTokens {
                primary: "#0f766e",
                accent: "#f59e0b",
                background: "#f8fafc",
                surface: "#ffffff",
                text: "#0f172a",
                muted: "#64748b",
            },
            typography: Typography {
                heading_font: "'Merriweather', Georgia, serif",
                body_font: "'Source Sans Pro', 'Segoe UI', sans-serif",
                mono_font: "'Source Code Pro', Menlo, monospace",
                base_size_px: 16,
                line_height: 1.6,
            },
            layout: LayoutTokens {
                max_width_px: 880,
                section_gap_px: 48,
                radius_px: 8,
                columns: 1,
            },
        },
        sections: vec![
            section("hero", "Header", true),
            section("about", "Summary", true),
            section("experience", "Timeline", true),
            section("projects", "Projects", false),
            section("education", "Education", false),
            section("awards", "Awards", false),
            section("skills", "Skills", false),
            section("contact", "Contact", true),
        ],
        field_support: FieldSupport::from_pairs(&[
            (OptionalField::Location, true),
            (OptionalField::Achievements, true),
            (OptionalField::Education, true),
            (OptionalField::Awards, true),
            (OptionalField::ProjectLinks, false),
            (OptionalField::SkillIcons, false),
        ]),
    }
}
