use crate::templates::descriptor::{FieldSupport, OptionalField, TemplateDescriptor};
use crate::templates::html::{base_stylesheet, HtmlWriter};
use crate::templates::normalize::RenderedPortfolio;
use crate::templates::skins::{
    achievements, contact_list, location, optional_css, page_title, project_link, skill_icon,
    tag_list,
};

fn stylesheet(descriptor: &TemplateDescriptor, support: &FieldSupport) -> String {
    let mut css = base_stylesheet(&descriptor.design_system);
    css.push_str(
        r#"header { padding: 72px 0 40px; border-bottom: 4px solid var(--color-primary); margin-bottom: var(--section-gap); }
header h1 { font-size: 2.5rem; }
header .title { font-size: 1.2rem; color: var(--color-muted); margin-top: 6px; }
h2 { font-size: 1.5rem; margin-bottom: 24px; padding-bottom: 8px; border-bottom: 1px solid #e2e8f0; }
.summary { font-size: 1.05rem; }
.timeline { position: relative; padding-left: 36px; }
.timeline::before { content: ""; position: absolute; left: 10px; top: 0; bottom: 0; width: 2px; background: var(--color-primary); }
.event { position: relative; margin-bottom: 32px; background: var(--color-surface); border-radius: var(--radius); padding: 18px 22px; box-shadow: 0 2px 8px rgba(15, 23, 42, 0.06); }
.event::before { content: ""; position: absolute; left: -32px; top: 22px; width: 14px; height: 14px; border-radius: 50%; background: var(--color-accent); border: 3px solid var(--color-bg); }
.event .when { font-size: 0.85rem; font-weight: 600; color: var(--color-accent); text-transform: uppercase; letter-spacing: 0.06em; }
.event h3 { font-size: 1.15rem; margin: 4px 0; }
.event .description { margin-top: 8px; }
.skill-row { margin-bottom: 10px; }
.skill-row strong { margin-right: 8px; }
footer { padding: 40px 0 80px; border-top: 1px solid #e2e8f0; }
.contact-list { list-style: none; display: flex; gap: 28px; flex-wrap: wrap; }
.contact-label { font-weight: 600; margin-right: 6px; }
"#,
    );
    optional_css(&mut css, support, OptionalField::Location, ".location { display: inline-block; color: var(--color-muted); font-size: 0.9rem; margin-left: 8px; }");
    optional_css(&mut css, support, OptionalField::Achievements, ".achievements { margin: 10px 0 0 20px; }\n.achievements li { margin-bottom: 4px; }");
    optional_css(&mut css, support, OptionalField::Education, "#education .event::before { background: var(--color-primary); }");
    optional_css(&mut css, support, OptionalField::Awards, "#awards .award { display: flex; gap: 12px; margin-bottom: 14px; }\n#awards .award .when { min-width: 96px; color: var(--color-muted); }");
    optional_css(&mut css, support, OptionalField::ProjectLinks, ".project-link { display: inline-block; margin-top: 8px; }");
    optional_css(&mut css, support, OptionalField::SkillIcons, ".skill-icon { margin-right: 4px; }");
    css
}

pub fn render(
    descriptor: &TemplateDescriptor,
    support: &FieldSupport,
    p: &RenderedPortfolio,
) -> String {
    let mut w = HtmlWriter::new();
    w.document_start(&page_title(p), descriptor.id.as_str(), &stylesheet(descriptor, support));
    w.open("<div class=\"container\">");

    w.open("<header id=\"hero\">");
    w.line(&format!("<h1>{}</h1>", p.name));
    w.open("<p class=\"title\">");
    w.line(&p.title);
    location(&mut w, p.location.as_ref());
    w.close("</p>");
    w.close("</header>");

    w.open("<section id=\"about\">");
    w.line("<h2>Summary</h2>");
    w.line(&format!("<p class=\"summary about\">{}</p>", p.about));
    w.close("</section>");

    w.open("<section id=\"experience\">");
    w.line("<h2>Timeline</h2>");
    if p.experiences.is_empty() {
        w.line("<p class=\"muted\">Experience will appear here.</p>");
    } else {
        w.open("<div class=\"timeline\">");
        for role in &p.experiences {
            w.open("<div class=\"event\">");
            if let Some(period) = &role.period {
                w.element("span", "class=\"when\"", period);
            }
            w.open("<h3>");
            w.line(&role.company);
            location(&mut w, role.location.as_ref());
            w.close("</h3>");
            w.element("p", "class=\"muted\"", &role.role);
            if let Some(description) = &role.description {
                w.element("p", "class=\"description\"", description);
            }
            achievements(&mut w, &role.achievements);
            w.close("</div>");
        }
        w.close("</div>");
    }
    w.close("</section>");

    if !p.projects.is_empty() {
        w.open("<section id=\"projects\">");
        w.line("<h2>Projects</h2>");
        w.open("<div class=\"timeline\">");
        for project in &p.projects {
            w.open("<div class=\"event\">");
            if let Some(period) = &project.period {
                w.element("span", "class=\"when\"", period);
            }
            w.line(&format!("<h3>{}</h3>", project.name));
            if let Some(description) = &project.description {
                w.element("p", "class=\"description\"", description);
            }
            if !project.tech_stack.is_empty() {
                w.line(&format!("<div class=\"stack\">{}</div>", tag_list(&project.tech_stack)));
            }
            achievements(&mut w, &project.achievements);
            project_link(&mut w, project.link.as_ref(), "Details");
            w.close("</div>");
        }
        w.close("</div>");
        w.close("</section>");
    }

    if !p.education.is_empty() {
        w.open("<section id=\"education\">");
        w.line("<h2>Education</h2>");
        w.open("<div class=\"timeline\">");
        for school in &p.education {
            w.open("<div class=\"event\">");
            if let Some(period) = &school.period {
                w.element("span", "class=\"when\"", period);
            }
            w.line(&format!("<h3>{}</h3>", school.school));
            if let Some(degree) = &school.degree {
                w.element("p", "class=\"muted\"", degree);
            }
            if let Some(description) = &school.description {
                w.element("p", "class=\"description\"", description);
            }
            w.close("</div>");
        }
        w.close("</div>");
        w.close("</section>");
    }

    if !p.awards.is_empty() {
        w.open("<section id=\"awards\">");
        w.line("<h2>Awards</h2>");
        for award in &p.awards {
            w.open("<div class=\"award\">");
            w.line(&format!(
                "<span class=\"when\">{}</span>",
                award.date.as_deref().unwrap_or_default()
            ));
            w.open("<div>");
            w.line(&format!("<strong>{}</strong>", award.title));
            if let Some(issuer) = &award.issuer {
                w.element("span", "class=\"muted\"", issuer);
            }
            if let Some(description) = &award.description {
                w.element("p", "class=\"description\"", description);
            }
            w.close("</div>");
            w.close("</div>");
        }
        w.close("</section>");
    }

    if !p.skills.is_empty() {
        w.open("<section id=\"skills\">");
        w.line("<h2>Skills</h2>");
        for group in &p.skills {
            w.line(&format!(
                "<p class=\"skill-row\">{}<strong>{}</strong>{}</p>",
                skill_icon(group.icon.as_ref()),
                group.label,
                tag_list(&group.skills)
            ));
        }
        w.close("</section>");
    }

    w.open("<footer id=\"contact\">");
    w.line("<h2>Contact</h2>");
    contact_list(&mut w, p);
    w.close("</footer>");

    w.close("</div>");
    w.document_end();
    w.finish()
}
