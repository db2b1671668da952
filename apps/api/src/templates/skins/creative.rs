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
        r#".hero { padding: 120px 48px 96px; margin-bottom: var(--section-gap); border-radius: 0 0 var(--radius) var(--radius); background: linear-gradient(135deg, var(--color-primary), var(--color-accent)); color: #ffffff; text-align: center; }
.hero h1 { color: #ffffff; font-size: 3.5rem; }
.hero .title { font-size: 1.35rem; opacity: 0.9; margin-top: 12px; }
h2 { font-size: 2rem; margin-bottom: 28px; text-align: center; }
.story { max-width: 720px; margin: 0 auto; font-size: 1.1rem; text-align: center; }
.toolbox { display: flex; flex-wrap: wrap; justify-content: center; gap: 16px; }
.toolbox-card { background: var(--color-surface); border-radius: var(--radius); padding: 18px 22px; box-shadow: 0 10px 30px rgba(124, 58, 237, 0.12); }
.toolbox-card h3 { font-size: 1rem; margin-bottom: 8px; }
.card { background: var(--color-surface); border-radius: var(--radius); padding: 28px; box-shadow: 0 16px 40px rgba(124, 58, 237, 0.15); transition: transform 0.2s ease; }
.card:hover { transform: translateY(-4px); }
.card h3 { font-size: 1.35rem; margin-bottom: 6px; }
.card .period { font-size: 0.85rem; color: var(--color-muted); }
.card .description { margin: 12px 0; }
.journey-step { display: flex; gap: 20px; margin-bottom: 28px; }
.journey-step .dot { flex: 0 0 16px; height: 16px; margin-top: 6px; border-radius: 50%; background: var(--color-accent); }
footer { text-align: center; padding: 48px 0 120px; }
.contact-list { list-style: none; display: inline-flex; gap: 24px; flex-wrap: wrap; justify-content: center; }
.contact-label { display: block; font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.1em; color: var(--color-muted); }
"#,
    );
    css.push_str(&format!(
        ".showcase {{ display: grid; grid-template-columns: repeat({columns}, minmax(0, 1fr)); gap: 28px; }}\n@media (max-width: 900px) {{ .showcase {{ grid-template-columns: 1fr; }} }}\n"
    ));
    optional_css(&mut css, support, OptionalField::Location, ".location { display: inline-block; margin-top: 16px; padding: 4px 14px; border-radius: 999px; background: rgba(255, 255, 255, 0.2); }");
    optional_css(&mut css, support, OptionalField::Achievements, ".achievements { margin: 10px 0 0 18px; }");
    optional_css(&mut css, support, OptionalField::Awards, "#awards .award { text-align: center; margin-bottom: 20px; }\n#awards .award h3 { color: var(--color-accent); }");
    optional_css(&mut css, support, OptionalField::ProjectLinks, ".project-link { display: inline-block; margin-top: 14px; padding: 8px 18px; border-radius: 999px; background: var(--color-primary); color: #ffffff; }");
    optional_css(&mut css, support, OptionalField::SkillIcons, ".skill-icon { font-size: 1.3rem; margin-right: 6px; }");
    css
}

pub fn render(
    descriptor: &TemplateDescriptor,
    support: &FieldSupport,
    p: &RenderedPortfolio,
) -> String {
    let mut w = HtmlWriter::new();
    w.document_start(&page_title(p), descriptor.id.as_str(), &stylesheet(descriptor, support));

    w.open("<header class=\"hero\" id=\"hero\">");
    w.line(&format!("<h1>{}</h1>", p.name));
    w.line(&format!("<p class=\"title\">{}</p>", p.title));
    location(&mut w, p.location.as_ref());
    w.close("</header>");

    w.open("<div class=\"container\">");

    w.open("<section id=\"about\">");
    w.line("<h2>My story</h2>");
    w.line(&format!("<p class=\"story about\">{}</p>", p.about));
    w.close("</section>");

    if !p.skills.is_empty() {
        w.open("<section id=\"skills\">");
        w.line("<h2>Toolbox</h2>");
        w.open("<div class=\"toolbox\">");
        for group in &p.skills {
            w.open("<div class=\"toolbox-card\">");
            w.line(&format!("<h3>{}{}</h3>", skill_icon(group.icon.as_ref()), group.label));
            w.line(&format!("<div>{}</div>", tag_list(&group.skills)));
            w.close("</div>");
        }
        w.close("</div>");
        w.close("</section>");
    }

    w.open("<section id=\"projects\">");
    w.line("<h2>Showcase</h2>");
    w.open("<div class=\"showcase\">");
    for project in &p.projects {
        w.open("<article class=\"card\">");
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
        project_link(&mut w, project.link.as_ref(), "See it live");
        w.close("</article>");
    }
    w.close("</div>");
    w.close("</section>");

    if !p.experiences.is_empty() {
        w.open("<section id=\"experience\">");
        w.line("<h2>Journey</h2>");
        for role in &p.experiences {
            w.open("<div class=\"journey-step\">");
            w.line("<span class=\"dot\"></span>");
            w.open("<div>");
            w.line(&format!("<h3>{}</h3>", role.company));
            w.element("p", "class=\"muted\"", &role.role);
            if let Some(period) = &role.period {
                w.element("span", "class=\"muted\"", period);
            }
            location(&mut w, role.location.as_ref());
            if let Some(description) = &role.description {
                w.element("p", "class=\"description\"", description);
            }
            achievements(&mut w, &role.achievements);
            w.close("</div>");
            w.close("</div>");
        }
        w.close("</section>");
    }

    if !p.awards.is_empty() {
        w.open("<section id=\"awards\">");
        w.line("<h2>Recognition</h2>");
        for award in &p.awards {
            w.open("<div class=\"award\">");
            w.line(&format!("<h3>{}</h3>", award.title));
            let meta: Vec<&str> = [award.issuer.as_deref(), award.date.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            w.element("p", "class=\"muted\"", &meta.join(" · "));
            if let Some(description) = &award.description {
                w.element("p", "class=\"description\"", description);
            }
            w.close("</div>");
        }
        w.close("</section>");
    }

    w.open("<footer id=\"contact\">");
    w.line("<h2>Say hello</h2>");
    contact_list(&mut w, p);
    w.close("</footer>");

    w.close("</div>");
    w.document_end();
    w.finish()
}
