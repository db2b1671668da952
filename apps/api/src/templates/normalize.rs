//! Normalization: the step between caller data and template markup.
//!
//! Unsupported optional fields are coerced empty here, before any rendering,
//! so no skeleton can reference them. Missing required scalars get fixed,
//! template-agnostic placeholders so no `undefined` / `null` reaches the page.

use crate::models::portfolio::{is_missing, PortfolioData, RequiredScalar};
use crate::templates::descriptor::{FieldSupport, OptionalField};
use crate::templates::markdown::{render_inline, render_plain};
use crate::templates::sanitize::safe_href;

pub const PLACEHOLDER_NAME: &str = "Your Name";
pub const PLACEHOLDER_TITLE: &str = "Your Role";
pub const PLACEHOLDER_EMAIL: &str = "email@example.com";
pub const PLACEHOLDER_PHONE: &str = "000-0000-0000";
pub const PLACEHOLDER_GITHUB: &str = "github.com/username";
pub const PLACEHOLDER_ABOUT: &str = "Introduce yourself here.";
pub const PLACEHOLDER_ENTRY_TITLE: &str = "Untitled";

pub fn placeholder_for(scalar: RequiredScalar) -> &'static str {
    match scalar {
        RequiredScalar::Name => PLACEHOLDER_NAME,
        RequiredScalar::Title => PLACEHOLDER_TITLE,
        RequiredScalar::Email => PLACEHOLDER_EMAIL,
        RequiredScalar::Phone => PLACEHOLDER_PHONE,
        RequiredScalar::Github => PLACEHOLDER_GITHUB,
    }
}

/// Returns a copy of `data` with unsupported fields emptied and required
/// scalars substituted.
pub fn normalize(data: &PortfolioData, support: &FieldSupport) -> PortfolioData {
    let mut out = data.clone();

    for scalar in RequiredScalar::ALL {
        let value = scalar.value_mut(&mut out);
        if is_missing(value) {
            *value = placeholder_for(scalar).to_string();
        } else {
            *value = value.trim().to_string();
        }
    }

    if !support.supports(OptionalField::Location) {
        out.location = None;
        for experience in &mut out.experiences {
            experience.location = None;
        }
    }
    if !support.supports(OptionalField::Achievements) {
        for project in &mut out.projects {
            project.achievements.clear();
        }
        for experience in &mut out.experiences {
            experience.achievements.clear();
        }
    }
    if !support.supports(OptionalField::Education) {
        out.education.clear();
    }
    if !support.supports(OptionalField::Awards) {
        out.awards.clear();
    }
    if !support.supports(OptionalField::ProjectLinks) {
        for project in &mut out.projects {
            project.link = None;
        }
    }
    if !support.supports(OptionalField::SkillIcons) {
        for category in &mut out.skills {
            category.icon.clear();
        }
    }

    out
}

fn non_missing(value: &str) -> Option<String> {
    (!is_missing(value)).then(|| render_plain(value))
}

fn optional_plain(value: Option<&String>) -> Option<String> {
    value.and_then(|v| non_missing(v))
}

fn rendered_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .filter(|i| !is_missing(i))
        .map(|i| render_inline(i))
        .collect()
}

fn plain_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .filter(|i| !is_missing(i))
        .map(|i| render_plain(i))
        .collect()
}

#[derive(Debug, Clone)]
pub struct RenderedSkills {
    pub label: String,
    pub icon: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RenderedProject {
    pub name: String,
    pub description: Option<String>,
    pub tech_stack: Vec<String>,
    pub achievements: Vec<String>,
    pub link: Option<String>,
    pub period: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RenderedExperience {
    pub company: String,
    pub role: String,
    pub period: Option<String>,
    pub description: Option<String>,
    pub achievements: Vec<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RenderedEducation {
    pub school: String,
    pub degree: Option<String>,
    pub period: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RenderedAward {
    pub title: String,
    pub issuer: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// Normalized data with every field rendered to safe HTML fragments, ready
/// for interpolation into a skeleton.
#[derive(Debug, Clone)]
pub struct RenderedPortfolio {
    pub name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub github: String,
    pub github_href: String,
    pub location: Option<String>,
    pub about: String,
    pub skills: Vec<RenderedSkills>,
    pub projects: Vec<RenderedProject>,
    pub experiences: Vec<RenderedExperience>,
    pub education: Vec<RenderedEducation>,
    pub awards: Vec<RenderedAward>,
}

impl RenderedPortfolio {
    /// Renders normalized data. Call `normalize` first.
    pub fn from_normalized(data: &PortfolioData) -> Self {
        let github = data.github.trim();
        let github_href = if github.starts_with("http://") || github.starts_with("https://") {
            safe_href(github)
        } else {
            safe_href(&format!("https://{github}"))
        };

        Self {
            name: render_plain(&data.name),
            title: render_plain(&data.title),
            email: render_plain(&data.email),
            phone: render_plain(&data.phone),
            github: render_plain(github),
            github_href: render_plain(&github_href),
            location: optional_plain(data.location.as_ref()),
            about: if is_missing(&data.about) {
                PLACEHOLDER_ABOUT.to_string()
            } else {
                render_inline(&data.about)
            },
            skills: data
                .skills
                .iter()
                .filter(|c| !is_missing(&c.label) || !c.skills.is_empty())
                .map(|c| RenderedSkills {
                    label: non_missing(&c.label).unwrap_or_else(|| "Skills".to_string()),
                    icon: non_missing(&c.icon),
                    skills: plain_list(&c.skills),
                })
                .collect(),
            projects: data
                .projects
                .iter()
                .map(|p| RenderedProject {
                    name: non_missing(&p.name).unwrap_or_else(|| PLACEHOLDER_ENTRY_TITLE.to_string()),
                    description: (!is_missing(&p.description)).then(|| render_inline(&p.description)),
                    tech_stack: plain_list(&p.tech_stack),
                    achievements: rendered_list(&p.achievements),
                    link: p
                        .link
                        .as_deref()
                        .filter(|l| !is_missing(l))
                        .map(|l| render_plain(&safe_href(l))),
                    period: non_missing(&p.period),
                })
                .collect(),
            experiences: data
                .experiences
                .iter()
                .map(|e| RenderedExperience {
                    company: non_missing(&e.company)
                        .unwrap_or_else(|| PLACEHOLDER_ENTRY_TITLE.to_string()),
                    role: non_missing(&e.role).unwrap_or_default(),
                    period: non_missing(&e.period),
                    description: (!is_missing(&e.description)).then(|| render_inline(&e.description)),
                    achievements: rendered_list(&e.achievements),
                    location: optional_plain(e.location.as_ref()),
                })
                .collect(),
            education: data
                .education
                .iter()
                .map(|e| RenderedEducation {
                    school: non_missing(&e.school).unwrap_or_else(|| PLACEHOLDER_ENTRY_TITLE.to_string()),
                    degree: non_missing(&e.degree),
                    period: non_missing(&e.period),
                    description: (!is_missing(&e.description)).then(|| render_inline(&e.description)),
                })
                .collect(),
            awards: data
                .awards
                .iter()
                .map(|a| RenderedAward {
                    title: non_missing(&a.title).unwrap_or_else(|| PLACEHOLDER_ENTRY_TITLE.to_string()),
                    issuer: non_missing(&a.issuer),
                    date: non_missing(&a.date),
                    description: (!is_missing(&a.description)).then(|| render_inline(&a.description)),
                })
                .collect(),
        }
    }
}
