//! HTML back end for [`PageView`].
//!
//! Produces one self-contained document: a `<style>` block driven by the
//! CV style, then one fixed-size `.page` per page. The same markup serves
//! the interactive preview and the exported file; only
//! [`HtmlTarget::Preview`] adds the ruler, the end-of-page marker and the
//! overflow flag.

use std::fmt::Write;

use crate::flatten::{BlockKind, RenderBlock};
use crate::measure::{detail_href, external_href, language_level};
use crate::model::{Document, Entry, EntryBody, Section, SectionLayout};
use crate::style::{CvStyle, HeadingStyle, PageAlignment};
use crate::text::rich::{escape_html, parse_fragment, RichBlock, RichBlockKind};

use super::{PageView, RenderedPage};

/// What the markup is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlTarget {
    /// On-screen preview with pagination aids.
    Preview,
    /// A downloadable artifact. Never contains decorations.
    Export,
}

/// Render every page of `view` as an HTML document.
pub fn render_html(document: &Document, style: &CvStyle, view: &PageView, target: HtmlTarget) -> String {
    let mut out = String::new();
    let title = if document.personal_info.name.is_empty() {
        "CV".to_string()
    } else {
        escape_html(&document.personal_info.name)
    };
    let mut css = stylesheet(style, view);
    if target == HtmlTarget::Preview {
        css.push_str(PREVIEW_CSS);
    }
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{css}</style>\n</head>\n<body>\n"
    );
    for page in &view.pages {
        write_page(&mut out, document, style, page, target);
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn stylesheet(style: &CvStyle, view: &PageView) -> String {
    let g = &view.geometry;
    let align = match style.page_alignment {
        PageAlignment::Left => "left",
        PageAlignment::Center => "center",
    };
    let rem = crate::style::REM;
    format!(
        r#":root {{ --accent: {accent}; --heading: {heading}; --body: {body}; }}
body {{ margin: 0; background: #f3f4f6; }}
.page {{ position: relative; box-sizing: border-box; width: {w}px; min-height: {h}px; padding: {m}px; margin: 0 auto 24px; background: #fff;
  font-family: {font}; font-size: {fs}px; line-height: {lh}; color: var(--body); }}
.cv-header {{ margin-bottom: 32px; text-align: {align}; }}
.cv-header h1 {{ margin: 0; font-size: 36px; line-height: 40px; font-weight: 700; color: var(--heading); }}
.cv-header h2 {{ margin: 4px 0 0; font-size: 20px; line-height: 28px; font-weight: 300; color: var(--accent); }}
.details {{ display: inline-grid; margin-top: 16px; font-size: 14px; line-height: 20px; text-align: left;
  grid-template-columns: repeat({cols}, 1fr); column-gap: {cg}px; row-gap: {rg}px; }}
.details .label {{ font-weight: 700; white-space: nowrap; color: var(--heading); margin-right: {lv}px; }}
.cv-section {{ margin-bottom: {spacing}px; }}
.section-title {{ margin: 0 0 12px; padding-bottom: 8px; border-bottom: 1px solid var(--heading); font-size: 16px; line-height: 24px;
  font-weight: 700; text-transform: uppercase; letter-spacing: 0.05em; color: var(--heading); }}
.entry {{ display: flex; justify-content: space-between; }}
.entry h4 {{ margin: 0; color: var(--heading); }}
.entry .date {{ flex-shrink: 0; padding: 4px 0 0 16px; font-size: 12px; line-height: 16px; white-space: nowrap; color: #6b7280; }}
.work {{ margin-bottom: 16px; }} .education, .project {{ margin-bottom: 12px; }} .certification, .custom {{ margin-bottom: 8px; }}
.work h4, .education h4 {{ font-size: 1.1em; font-weight: 700; }}
.sub {{ margin: 0; font-weight: 600; }}
.extra {{ font-weight: 400; opacity: 0.8; }}
.prose p {{ margin: 0; }} .prose ul, .prose ol {{ margin: 0; padding-left: 24px; }} .prose li {{ margin-bottom: 4px; }}
.with-gap {{ margin-top: 4px; }}
a {{ color: var(--accent); text-decoration: none; }}
.skill {{ margin: 0 0 4px; }} .skill .name {{ font-weight: 600; color: var(--heading); }}
.skill-group.spaced {{ margin-top: 12px; }}
.skill-category {{ margin: 0 0 8px; font-size: 14px; line-height: 20px; font-weight: 600; color: var(--heading); opacity: 0.9; }}
.chips {{ display: flex; flex-wrap: wrap; margin-bottom: -8px; }}
.chip {{ margin: 0 8px 8px 0; padding: 4px 12px; border-radius: 9999px; font-size: 14px; line-height: 20px; font-weight: 500; color: #fff; background: var(--accent); }}
.languages {{ display: flex; }} .languages.inline {{ flex-wrap: wrap; gap: 12px 24px; align-items: center; }}
.languages.multiline {{ flex-direction: column; gap: 12px; }}
.language p {{ margin: 0; }} .language .name {{ font-weight: 600; color: var(--heading); }}
.pill {{ display: inline-flex; align-items: center; padding: 6px 12px; border-radius: 9999px; font-size: 14px; line-height: 20px; color: #fff; background: var(--accent); }}
.pill .level {{ margin-left: 8px; padding-left: 8px; border-left: 1px solid rgba(255,255,255,0.5); font-size: 12px; line-height: 16px; opacity: 0.8; }}
.bar {{ min-width: 160px; }} .bar .row {{ display: flex; justify-content: space-between; margin-bottom: 4px; font-size: 14px; line-height: 20px; }}
.bar .track {{ height: 8px; border-radius: 4px; background: #e5e7eb; }} .bar .fill {{ height: 8px; border-radius: 4px; background: var(--accent); }}
.dots {{ display: flex; align-items: center; font-size: 14px; line-height: 20px; }} .dots .dot {{ width: 12px; height: 12px; margin-left: 6px; border-radius: 50%; background: #e5e7eb; }}
.dots .dot.on {{ background: var(--accent); }} .dots .dot:first-of-type {{ margin-left: 12px; }}
"#,
        accent = style.accent_color,
        heading = style.heading_color,
        body = style.body_text_color,
        w = g.width,
        h = g.height,
        m = g.margin,
        font = style.font_family,
        fs = style.base_font_size(),
        lh = style.line_height.factor(),
        cols = style.detail_columns(),
        cg = style.personal_info_column_gap * rem,
        rg = style.personal_info_row_gap * rem,
        lv = style.personal_info_label_value_gap * rem,
        spacing = style.section_spacing.px(),
    )
}

const PREVIEW_CSS: &str = r#".page.overflow { outline: 2px solid #ef4444; }
.ruler { position: absolute; top: 0; left: 0; width: 12px; height: 100%; }
.tick { position: absolute; left: 0; width: 6px; border-top: 1px solid #9ca3af; } .tick.major { width: 12px; }
.page-end { position: absolute; left: 0; right: 0; border-top: 1px dashed #ef4444; }
"#;

fn write_page(out: &mut String, document: &Document, style: &CvStyle, page: &RenderedPage, target: HtmlTarget) {
    let preview = target == HtmlTarget::Preview;
    let class = if preview && page.overflow { "page overflow" } else { "page" };
    let _ = writeln!(out, "<div class=\"{class}\" data-page=\"{}\">", page.index + 1);

    if preview {
        out.push_str("<div class=\"ruler\">");
        for tick in &page.decorations.ticks {
            let major = if tick.major { " major" } else { "" };
            let _ = write!(out, "<span class=\"tick{major}\" style=\"top:{}px\"></span>", tick.y);
        }
        out.push_str("</div>\n");
        let _ = writeln!(
            out,
            "<div class=\"page-end\" style=\"top:{}px\"></div>",
            page.decorations.end_marker_y
        );
    }

    if page.header.is_some() {
        write_header(out, document);
    }
    for part in &page.sections {
        let Some(section) = document.section(&part.section_id) else {
            continue;
        };
        let _ = writeln!(out, "<section class=\"cv-section\" data-section=\"{}\">", escape_html(&section.id));
        if part.title.is_some() {
            let _ = writeln!(out, "<h3 class=\"section-title\">{}</h3>", escape_html(&section.title));
        }
        for block in &part.blocks {
            write_block(out, style, section, block);
        }
        out.push_str("</section>\n");
    }
    out.push_str("</div>\n");
}

fn write_header(out: &mut String, document: &Document) {
    let info = &document.personal_info;
    out.push_str("<header class=\"cv-header\">\n");
    if !info.name.is_empty() {
        let _ = writeln!(out, "<h1>{}</h1>", escape_html(&info.name));
    }
    if !info.job_title.is_empty() {
        let _ = writeln!(out, "<h2>{}</h2>", escape_html(&info.job_title));
    }
    if !info.details.is_empty() {
        out.push_str("<div class=\"details\">\n");
        for detail in &info.details {
            let value = match detail_href(&detail.label, &detail.value) {
                Some(href) => format!("<a href=\"{}\">{}</a>", escape_html(&href), escape_html(&detail.value)),
                None => escape_html(&detail.value),
            };
            let _ = writeln!(
                out,
                "<div class=\"detail\"><span class=\"label\">{}</span><span class=\"value\">{value}</span></div>",
                escape_html(&detail.label)
            );
        }
        out.push_str("</div>\n");
    }
    out.push_str("</header>\n");
}

/// A title with an optional link and a parenthesised extra.
fn heading_part(text: &str, link: &str, extra: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut inner = escape_html(text);
    if !extra.is_empty() {
        let _ = write!(inner, "<span class=\"extra\"> ({})</span>", escape_html(extra));
    }
    if link.is_empty() {
        inner
    } else {
        format!("<a href=\"{}\">{inner}</a>", escape_html(&external_href(link)))
    }
}

fn join_location(name: &str, location: &str) -> String {
    if location.is_empty() {
        name.to_string()
    } else {
        format!("{name}, {location}")
    }
}

fn write_block(out: &mut String, style: &CvStyle, section: &Section, block: &RenderBlock) {
    match &block.kind {
        BlockKind::Item { entry_id } => {
            if let Some(entry) = section.entry(entry_id) {
                write_entry(out, style, entry);
            }
        }
        BlockKind::SkillGroup {
            category,
            entry_ids,
            spaced,
        } => {
            let class = if *spaced { "skill-group spaced" } else { "skill-group" };
            let _ = writeln!(out, "<div class=\"{class}\">");
            if let Some(category) = category {
                let _ = writeln!(out, "<h4 class=\"skill-category\">{}</h4>", escape_html(category));
            }
            out.push_str("<div class=\"chips\">");
            for entry in entry_ids.iter().filter_map(|id| section.entry(id)) {
                if let EntryBody::Skill(skill) = &entry.body {
                    let _ = write!(out, "<span class=\"chip\">{}</span>", escape_html(&skill.skill_name));
                }
            }
            out.push_str("</div>\n</div>\n");
        }
        BlockKind::LanguageGroup => write_languages(out, section),
        BlockKind::Header | BlockKind::SectionHeader => {}
    }
}

fn write_dated_heading(out: &mut String, style: &CvStyle, primary: String, org: String, dates: &str) {
    let (main, sub) = match style.heading_style {
        HeadingStyle::CompanyFirst => (org, primary),
        HeadingStyle::TitleFirst => (primary, org),
    };
    let _ = writeln!(
        out,
        "<div class=\"entry\"><div><h4>{main}</h4><p class=\"sub\">{sub}</p></div><span class=\"date\">{}</span></div>",
        escape_html(dates)
    );
}

fn write_entry(out: &mut String, style: &CvStyle, entry: &Entry) {
    let dates = |start: &str, end: &str| {
        format!("{} - {}", style.date_format.format(start), style.date_format.format(end))
    };
    match &entry.body {
        EntryBody::WorkExperience(w) => {
            out.push_str("<div class=\"work\">\n");
            write_dated_heading(
                out,
                style,
                heading_part(&w.job_title, &w.job_title_link, &w.job_title_extra),
                heading_part(&join_location(&w.company, &w.location), &w.company_link, &w.company_extra),
                &dates(&w.start_date, &w.end_date),
            );
            write_prose(out, &w.description, true);
            out.push_str("</div>\n");
        }
        EntryBody::Education(e) => {
            out.push_str("<div class=\"education\">\n");
            write_dated_heading(
                out,
                style,
                heading_part(&e.degree, &e.degree_link, &e.degree_extra),
                heading_part(&join_location(&e.institution, &e.location), &e.institution_link, &e.institution_extra),
                &dates(&e.start_date, &e.end_date),
            );
            if !e.description.is_empty() {
                write_prose(out, &e.description, true);
            }
            out.push_str("</div>\n");
        }
        EntryBody::Skill(s) => {
            let _ = write!(out, "<p class=\"skill\"><span class=\"name\">{}</span>", escape_html(&s.skill_name));
            if !s.level.is_empty() {
                let _ = write!(out, " ({})", escape_html(&s.level));
            }
            if !s.description.is_empty() {
                let _ = write!(out, "<em>: {}</em>", escape_html(&s.description));
            }
            out.push_str("</p>\n");
        }
        EntryBody::Project(p) => {
            let _ = write!(
                out,
                "<div class=\"project\">\n<div class=\"entry\"><h4>{}",
                heading_part(&p.project_name, &p.project_name_link, &p.project_name_extra)
            );
            if !p.link.is_empty() {
                let _ = write!(out, " <a href=\"{}\"><small>(view project)</small></a>", escape_html(&external_href(&p.link)));
            }
            out.push_str("</h4></div>\n");
            write_prose(out, &p.description, false);
            out.push_str("</div>\n");
        }
        EntryBody::Certification(c) => {
            let _ = writeln!(
                out,
                "<div class=\"certification\"><div class=\"entry\"><div><h4>{}</h4><p class=\"sub\"><em>{}</em></p></div><span class=\"date\">{}</span></div></div>",
                heading_part(&c.name, &c.name_link, &c.name_extra),
                escape_html(&c.issuer),
                escape_html(&style.date_format.format(&c.date))
            );
        }
        EntryBody::Custom(c) => {
            let _ = writeln!(
                out,
                "<div class=\"custom\">\n<div class=\"entry\"><h4>{}</h4></div>",
                heading_part(&c.title, &c.title_link, &c.title_extra)
            );
            write_prose(out, &c.description, false);
            out.push_str("</div>\n");
        }
        EntryBody::Language(l) => {
            let _ = writeln!(out, "<p><span class=\"name\">{}</span> ({})</p>", escape_html(&l.language), escape_html(&l.level));
        }
    }
}

fn write_languages(out: &mut String, section: &Section) {
    let display = if section.is_inline() { "inline" } else { "multiline" };
    let layout = section.layout.unwrap_or(SectionLayout::Compact);
    let _ = writeln!(out, "<div class=\"languages {display}\">");
    for entry in &section.items {
        let EntryBody::Language(l) = &entry.body else {
            continue;
        };
        let name = escape_html(&l.language);
        let level = escape_html(l.level.trim());
        let value = language_level(l.level.trim());
        match layout {
            SectionLayout::Pills => {
                let _ = write!(out, "<span class=\"language pill\">{name}");
                if !level.is_empty() {
                    let _ = write!(out, "<span class=\"level\">{level}</span>");
                }
                out.push_str("</span>\n");
            }
            SectionLayout::Bar if value > 0 => {
                let _ = writeln!(
                    out,
                    "<div class=\"language bar\"><div class=\"row\"><span class=\"name\">{name}</span><small>{level}</small></div><div class=\"track\"><div class=\"fill\" style=\"width:{}%\"></div></div></div>",
                    u32::from(value) * 20
                );
            }
            SectionLayout::Dots if value > 0 => {
                let _ = write!(out, "<div class=\"language dots\"><span class=\"name\">{name}</span>");
                for i in 0..5 {
                    let on = if i < value { " on" } else { "" };
                    let _ = write!(out, "<span class=\"dot{on}\"></span>");
                }
                out.push_str("</div>\n");
            }
            SectionLayout::List => {
                let _ = write!(out, "<div class=\"language\"><p><span class=\"name\">{name}</span>");
                if !level.is_empty() {
                    let _ = write!(out, ": {level}");
                }
                out.push_str("</p></div>\n");
            }
            _ => {
                let _ = write!(out, "<div class=\"language\"><p><span class=\"name\">{name}</span>");
                if !level.is_empty() {
                    let _ = write!(out, " ({level})");
                }
                out.push_str("</p></div>\n");
            }
        }
    }
    out.push_str("</div>\n");
}

/// Re-emit a description from its parsed blocks, so only known markup
/// reaches the output.
fn write_prose(out: &mut String, html: &str, with_gap: bool) {
    let blocks = parse_fragment(html);
    let class = if with_gap { "prose with-gap" } else { "prose" };
    let _ = write!(out, "<div class=\"{class}\">");
    let mut open: Vec<&'static str> = Vec::new();
    for block in &blocks {
        let depth = match block.kind {
            RichBlockKind::Paragraph => 0,
            _ => block.depth.max(1),
        };
        let tag = match block.kind {
            RichBlockKind::Numbered(_) => "ol",
            _ => "ul",
        };
        while open.len() > depth || (open.len() == depth && depth > 0 && open.last() != Some(&tag)) {
            if let Some(closing) = open.pop() {
                let _ = write!(out, "</{closing}>");
            }
        }
        while open.len() < depth {
            let _ = write!(out, "<{tag}>");
            open.push(tag);
        }
        match block.kind {
            RichBlockKind::Paragraph => {
                out.push_str("<p>");
                write_runs(out, block);
                out.push_str("</p>");
            }
            _ => {
                out.push_str("<li>");
                write_runs(out, block);
                out.push_str("</li>");
            }
        }
    }
    while let Some(closing) = open.pop() {
        let _ = write!(out, "</{closing}>");
    }
    out.push_str("</div>\n");
}

fn write_runs(out: &mut String, block: &RichBlock) {
    for run in &block.runs {
        let mut text = escape_html(&run.text).replace('\n', "<br>");
        if run.italic {
            text = format!("<em>{text}</em>");
        }
        if run.bold {
            text = format!("<strong>{text}</strong>");
        }
        if let Some(href) = &run.href {
            text = format!("<a href=\"{}\">{text}</a>", escape_html(href));
        }
        out.push_str(&text);
    }
}
