use crate::templates::descriptor::{FieldSupport, OptionalField, TemplateDescriptor};
use crate::templates::html::{base_stylesheet, HtmlWriter};
use crate::templates::normalize::RenderedPortfolio;
use crate::templates::skins::{
    achievements, contact_list, location, optional_css, page_title, project_link, skill_icon,
    tag_list,
};

fn stylesheet(descriptor: &TemplateDescriptor, support: &FieldSupport) -> String {
    let mut css = base_stylesheet(&descriptor.design_system);
    let columns = descriptor.design_system.layout.columns;
    css.push_str(
        r###".terminal { margin: 64px 0 var(--section-gap); background: var(--color-surface); border-radius: var(--radius); overflow: hidden; box-shadow: 0 20px 40px rgba(0, 0, 0, 0.35); }
.terminal-bar { display: flex; gap: 8px; padding: 12px 16px; background: rgba(255, 255, 255, 0.04); }
.terminal-bar span { width: 12px; height: 12px; border-radius: 50%; background: var(--color-muted); }
.terminal-body { padding: 24px; font-family: var(--font-mono); }
.prompt { color: var(--color-accent); }
.terminal-body h1 { font-size: 2.25rem; margin: 8px 0; }
.terminal-body .title { color: var(--color-muted); }
h2 { font-family: var(--font-mono); font-size: 1.1rem; margin-bottom: 20px; }
h2::before { content: "## "; color: var(--color-accent); }
.readme { background: var(--color-surface); padding: 20px 24px; border-left: 3px solid var(--color-primary); border-radius: var(--radius); }
.stack-group { margin-bottom: 14px; }
.stack-group h3 { font-size: 0.95rem; margin-bottom: 6px; }
.repo { background: var(--color-surface); border: 1px solid rgba(148, 163, 184, 0.2); border-radius: var(--radius); padding: 20px; }
.repo h3 { font-family: var(--font-mono); font-size: 1.05rem; }
.repo .period { font-size: 0.8rem; color: var(--color-muted); }
.repo .description { margin: 10px 0; }
.commit { position: relative; padding: 0 0 24px 28px; border-left: 2px dashed var(--color-surface); }
.commit::before { content: ""; position: absolute; left: -7px; top: 4px; width: 12px; height: 12px; border-radius: 50%; background: var(--color-accent); }
.commit .hash { font-family: var(--font-mono); color: var(--color-muted); font-size: 0.85rem; }
.contact-list { list-style: none; font-family: var(--font-mono); }
.contact-label { color: var(--color-accent); margin-right: 8px; }
.contact-label::after { content: ":"; }
footer { padding-bottom: 96px; }
"###,
    );
    css.push_str(&format!(
        ".repo-grid {{ display: grid; grid-template-columns: repeat({columns}, minmax(0, 1fr)); gap: 20px; }}\n@media (max-width: 720px) {{ .repo-grid {{ grid-template-columns: 1fr; }} }}\n"
    ));
    optional_css(&mut css, support, OptionalField::Location, ".location { display: inline-block; color: var(--color-muted); font-size: 0.85rem; }\n.location::before { content: \"@ \"; }");
    optional_css(&mut css, support, OptionalField::Achievements, ".achievements { list-style: none; margin-top: 10px; }\n.achievements li::before { content: \"+ \"; color: var(--color-accent); font-family: var(--font-mono); }");
    optional_css(&mut css, support, OptionalField::ProjectLinks, ".project-link { display: inline-block; margin-top: 12px; font-family: var(--font-mono); font-size: 0.9rem; }\n.project-link::before { content: \"→ \"; }");
    optional_css(&mut css, support, OptionalField::SkillIcons, ".skill-icon { display: inline-block; width: 1.4em; text-align: center; }");
    css
}

/// Short, stable pseudo-hash for a commit-history line, derived from the
/// entry position so output stays deterministic.
fn commit_hash(index: usize) -> String {
    format!("{:07x}", (index as u64 + 1).wrapping_mul(0x9e37_79b9) & 0x0fff_ffff)
}

pub fn render(
    descriptor: &TemplateDescriptor,
    support: &FieldSupport,
    p: &RenderedPortfolio,
) -> String {
    let mut w = HtmlWriter::new();
    w.document_start(&page_title(p), descriptor.id.as_str(), &stylesheet(descriptor, support));
    w.open("<div class=\"container\">");

    w.open("<header class=\"terminal\" id=\"hero\">");
    w.line("<div class=\"terminal-bar\"><span></span><span></span><span></span></div>");
    w.open("<div class=\"terminal-body\">");
    w.line("<p class=\"prompt\">$ whoami</p>");
    w.line(&format!("<h1>{}</h1>", p.name));
    w.line(&format!("<p class=\"title\">{}</p>", p.title));
    location(&mut w, p.location.as_ref());
    w.close("</div>");
    w.close("</header>");

    w.open("<section id=\"about\">");
    w.line("<h2>README.md</h2>");
    w.line(&format!("<div class=\"readme\"><p class=\"about\">{}</p></div>", p.about));
    w.close("</section>");

    w.open("<section id=\"skills\">");
    w.line("<h2>stack</h2>");
    if p.skills.is_empty() {
        w.line("<p class=\"muted\">No stack listed yet.</p>");
    }
    for group in &p.skills {
        w.open("<div class=\"stack-group\">");
        w.line(&format!("<h3>{}{}</h3>", skill_icon(group.icon.as_ref()), group.label));
        w.line(&format!("<div>{}</div>", tag_list(&group.skills)));
        w.close("</div>");
    }
    w.close("</section>");

    w.open("<section id=\"projects\">");
    w.line("<h2>repositories</h2>");
    w.open("<div class=\"repo-grid\">");
    for project in &p.projects {
        w.open("<article class=\"repo\">");
        w.line(&format!("<h3>{}</h3>", project.name));
        if let Some(period) = &project.period {
            w.element("span", "class=\"period\"", period);
        }
        if let Some(description) = &project.description {
            w.element("p", "class=\"description\"", description);
        }
        if !project.tech_stack.is_empty() {
            w.line(&format!("<div class=\"stack\">{}</div>", tag_list(&project.tech_stack)));
        }
        achievements(&mut w, &project.achievements);
        project_link(&mut w, project.link.as_ref(), "source");
        w.close("</article>");
    }
    w.close("</div>");
    w.close("</section>");

    if !p.experiences.is_empty() {
        w.open("<section id=\"experience\">");
        w.line("<h2>git log</h2>");
        for (index, role) in p.experiences.iter().enumerate() {
            w.open("<div class=\"commit\">");
            w.line(&format!("<span class=\"hash\">{}</span>", commit_hash(index)));
            if role.role.is_empty() {
                w.line(&format!("<h3>{}</h3>", role.company));
            } else {
                w.line(&format!("<h3>{} @ {}</h3>", role.role, role.company));
            }
            if let Some(period) = &role.period {
                w.element("span", "class=\"muted\"", period);
            }
            location(&mut w, role.location.as_ref());
            if let Some(description) = &role.description {
                w.element("p", "class=\"description\"", description);
            }
            achievements(&mut w, &role.achievements);
            w.close("</div>");
        }
        w.close("</section>");
    }

    w.open("<footer id=\"contact\">");
    w.line("<h2>contact</h2>");
    contact_list(&mut w, p);
    w.close("</footer>");

    w.close("</div>");
    w.document_end();
    w.finish()
}
