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
        r#".hero { padding: 96px 0 48px; border-bottom: 1px solid var(--color-surface); margin-bottom: var(--section-gap); }
.hero h1 { font-size: 2.75rem; letter-spacing: -0.02em; }
.hero .title { font-size: 1.25rem; color: var(--color-muted); margin-top: 8px; }
h2 { font-size: 0.85rem; text-transform: uppercase; letter-spacing: 0.14em; color: var(--color-muted); margin-bottom: 20px; }
.skill-group { display: flex; gap: 16px; margin-bottom: 10px; }
.skill-group h3 { min-width: 140px; font-size: 1rem; }
.project, .role { padding: 20px 0; border-bottom: 1px solid var(--color-surface); }
.project h3, .role h3 { font-size: 1.15rem; }
.period { font-size: 0.9rem; color: var(--color-muted); }
.description { margin: 8px 0; }
footer { padding: 48px 0 96px; }
.contact-list { list-style: none; }
.contact-label { display: inline-block; min-width: 80px; color: var(--color-muted); }
"#,
    );
    optional_css(&mut css, support, OptionalField::Location, ".location { display: block; margin-top: 6px; color: var(--color-muted); }");
    optional_css(&mut css, support, OptionalField::Achievements, ".achievements { margin: 8px 0 0 20px; }");
    optional_css(&mut css, support, OptionalField::Education, "#education .school { font-weight: 600; }");
    optional_css(&mut css, support, OptionalField::Awards, "#awards .award { margin-bottom: 12px; }");
    optional_css(&mut css, support, OptionalField::ProjectLinks, ".project-link { display: inline-block; margin-top: 6px; font-weight: 600; }");
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

    w.open("<header class=\"hero\" id=\"hero\">");
    w.line(&format!("<h1>{}</h1>", p.name));
    w.line(&format!("<p class=\"title\">{}</p>", p.title));
    location(&mut w, p.location.as_ref());
    w.close("</header>");

    w.open("<section id=\"about\">");
    w.line("<h2>About</h2>");
    w.line(&format!("<p class=\"about\">{}</p>", p.about));
    w.close("</section>");

    if !p.skills.is_empty() {
        w.open("<section id=\"skills\">");
        w.line("<h2>Skills</h2>");
        for group in &p.skills {
            w.open("<div class=\"skill-group\">");
            w.line(&format!("<h3>{}{}</h3>", skill_icon(group.icon.as_ref()), group.label));
            w.line(&format!("<p>{}</p>", tag_list(&group.skills)));
            w.close("</div>");
        }
        w.close("</section>");
    }

    w.open("<section id=\"projects\">");
    w.line("<h2>Projects</h2>");
    if p.projects.is_empty() {
        w.line("<p class=\"muted\">Projects will appear here.</p>");
    }
    for project in &p.projects {
        w.open("<article class=\"project\">");
        w.line(&format!("<h3>{}</h3>", project.name));
        if let Some(period) = &project.period {
            w.element("span", "class=\"period\"", period);
        }
        if let Some(description) = &project.description {
            w.element("p", "class=\"description\"", description);
        }
        if !project.tech_stack.is_empty() {
            w.line(&format!("<p class=\"stack\">{}</p>", tag_list(&project.tech_stack)));
        }
        achievements(&mut w, &project.achievements);
        project_link(&mut w, project.link.as_ref(), "View project →");
        w.close("</article>");
    }
    w.close("</section>");

    if !p.experiences.is_empty() {
        w.open("<section id=\"experience\">");
        w.line("<h2>Experience</h2>");
        for role in &p.experiences {
            w.open("<article class=\"role\">");
            if role.role.is_empty() {
                w.line(&format!("<h3>{}</h3>", role.company));
            } else {
                w.line(&format!("<h3>{} · {}</h3>", role.role, role.company));
            }
            if let Some(period) = &role.period {
                w.element("span", "class=\"period\"", period);
            }
            location(&mut w, role.location.as_ref());
            if let Some(description) = &role.description {
                w.element("p", "class=\"description\"", description);
            }
            achievements(&mut w, &role.achievements);
            w.close("</article>");
        }
        w.close("</section>");
    }

    if !p.education.is_empty() {
        w.open("<section id=\"education\">");
        w.line("<h2>Education</h2>");
        for school in &p.education {
            w.open("<div class=\"education-item\">");
            w.line(&format!("<p class=\"school\">{}</p>", school.school));
            if let Some(degree) = &school.degree {
                w.element("p", "class=\"degree\"", degree);
            }
            if let Some(period) = &school.period {
                w.element("span", "class=\"period\"", period);
            }
            if let Some(description) = &school.description {
                w.element("p", "class=\"description\"", description);
            }
            w.close("</div>");
        }
        w.close("</section>");
    }

    if !p.awards.is_empty() {
        w.open("<section id=\"awards\">");
        w.line("<h2>Awards</h2>");
        for award in &p.awards {
            w.open("<div class=\"award\">");
            w.line(&format!("<h3>{}</h3>", award.title));
            if let Some(issuer) = &award.issuer {
                w.element("span", "class=\"muted\"", issuer);
            }
            if let Some(description) = &award.description {
                w.element("p", "class=\"description\"", description);
            }
            w.close("</div>");
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
