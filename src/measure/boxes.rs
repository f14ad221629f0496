//! Box layout for each block kind.
//!
//! Mirrors the preview's box model in px: Tailwind spacing presets, font
//! sizes with their paired line heights, and the style's body line-height
//! factor for inherited text. Every block is laid out at the page's content
//! width into a [`BlockBox`]: a list of positioned text runs, rectangles and
//! rules, plus the block's outer height including its vertical margins.

use crate::flatten::{BlockKind, RenderBlock};
use crate::font::FontContext;
use crate::model::{Document, Entry, EntryBody, LanguageEntry, Section, SectionLayout, SkillEntry};
use crate::style::{Color, CvStyle, HeadingStyle, PageAlignment};
use crate::text::rich::{parse_fragment, RichBlockKind};
use crate::text::{break_into_lines, measure_width, Span, TextStyle};

use super::flex::wrap_rows;

/// Something to draw, positioned relative to the block's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxItem {
    /// A run of text; `baseline` is the y of the text baseline.
    Text {
        x: f64,
        baseline: f64,
        text: String,
        style: TextStyle,
    },
    /// A filled rectangle, optionally with rounded corners.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: Color,
        radius: f64,
    },
    /// A horizontal rule.
    Rule {
        x: f64,
        y: f64,
        width: f64,
        thickness: f64,
        color: Color,
    },
}

/// A laid-out block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockBox {
    /// Outer height: content plus vertical margins.
    pub height: f64,
    pub items: Vec<BoxItem>,
}

// Fixed sizes (px) with their paired line heights.
const XS: (f64, f64) = (12.0, 16.0);
const SM: (f64, f64) = (14.0, 20.0);
const BASE: (f64, f64) = (16.0, 24.0);
const XL: (f64, f64) = (20.0, 28.0);
const XL4: (f64, f64) = (36.0, 40.0);

const MUTED: &str = "#6b7280";
const TRACK: &str = "#e5e7eb";

const LIST_INDENT: f64 = 24.0;
const LIST_ITEM_GAP: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Center,
}

struct Palette {
    heading: Color,
    body: Color,
    accent: Color,
    muted: Color,
    track: Color,
}

/// One block's layout context.
pub(super) struct BoxModel<'a> {
    fonts: FontContext,
    style: &'a CvStyle,
    palette: Palette,
    width: f64,
    items: Vec<BoxItem>,
}

impl<'a> BoxModel<'a> {
    pub(super) fn new(style: &'a CvStyle, width: f64) -> Self {
        Self {
            fonts: FontContext::new(&style.font_family),
            style,
            palette: Palette {
                heading: Color::hex(&style.heading_color),
                body: Color::hex(&style.body_text_color),
                accent: Color::hex(&style.accent_color),
                muted: Color::hex(MUTED),
                track: Color::hex(TRACK),
            },
            width: width.max(0.0),
            items: Vec::new(),
        }
    }

    fn fs(&self) -> f64 {
        self.style.base_font_size()
    }

    fn lh(&self) -> f64 {
        self.style.body_line_height()
    }

    fn body(&self, weight: u32) -> TextStyle {
        TextStyle::new(self.fs(), weight, self.palette.body)
    }

    fn heading(&self, weight: u32) -> TextStyle {
        TextStyle::new(self.fs(), weight, self.palette.heading)
    }

    /// Lay out `block` and return its box.
    pub(super) fn layout(mut self, document: &Document, block: &RenderBlock) -> BlockBox {
        let section = block
            .owner_section_id
            .as_deref()
            .and_then(|id| document.section(id));
        let section_spacing = self.style.section_spacing.px();

        let (content, margin_top, margin_bottom) = match (&block.kind, section) {
            (BlockKind::Header, _) => (self.header(document), 0.0, 32.0),
            (BlockKind::SectionHeader, Some(section)) => (self.section_title(&section.title), 0.0, 12.0),
            (BlockKind::Item { entry_id }, Some(section)) => match section.entry(entry_id) {
                Some(entry) => self.item(entry),
                None => (0.0, 0.0, 0.0),
            },
            (
                BlockKind::SkillGroup {
                    category,
                    entry_ids,
                    spaced,
                },
                Some(section),
            ) => {
                let top = if *spaced { 12.0 } else { 0.0 };
                let skills: Vec<&SkillEntry> = entry_ids
                    .iter()
                    .filter_map(|id| section.entry(id))
                    .filter_map(|e| match &e.body {
                        EntryBody::Skill(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                (self.skill_group(category.as_deref(), &skills, top), top, -8.0)
            }
            (BlockKind::LanguageGroup, Some(section)) => (self.languages(section), 0.0, 0.0),
            _ => (0.0, 0.0, 0.0),
        };

        let bottom = if block.last_in_section {
            collapse_margins(margin_bottom, section_spacing)
        } else {
            margin_bottom
        };
        BlockBox {
            height: (margin_top + content + bottom).max(0.0),
            items: self.items,
        }
    }

    // -- text helpers ------------------------------------------------------

    /// Break and place a paragraph. Returns its height (0 when empty).
    fn paragraph(&mut self, spans: &[Span], x: f64, y: f64, width: f64, line_height: f64, align: Align) -> f64 {
        if spans.iter().all(|s| s.text.is_empty()) {
            return 0.0;
        }
        let lines = break_into_lines(&self.fonts, spans, width);
        for (i, line) in lines.iter().enumerate() {
            let top = y + i as f64 * line_height;
            let offset = match align {
                Align::Left => 0.0,
                Align::Center => ((width - line.width) / 2.0).max(0.0),
            };
            for fragment in &line.fragments {
                if fragment.text.trim().is_empty() {
                    continue;
                }
                self.items.push(BoxItem::Text {
                    x: x + offset + fragment.x,
                    baseline: baseline(top, line_height, fragment.style.size),
                    text: fragment.text.trim_end().to_string(),
                    style: fragment.style.clone(),
                });
            }
        }
        lines.len() as f64 * line_height
    }

    fn spans_width(&self, spans: &[Span]) -> f64 {
        spans
            .iter()
            .map(|s| measure_width(&self.fonts, &s.text, &s.style))
            .sum()
    }

    /// Title text with an optional link and a parenthesised "extra".
    fn heading_part(&self, text: &str, link: &str, extra: &str, style: TextStyle) -> Vec<Span> {
        if text.is_empty() {
            return Vec::new();
        }
        let (style, href) = if link.is_empty() {
            (style, None)
        } else {
            let mut linked = style;
            linked.color = self.palette.accent;
            (linked, Some(external_href(link)))
        };
        let mut spans = vec![Span::new(text, style.clone().link(href.clone()))];
        if !extra.is_empty() {
            let mut faded = style;
            faded.weight = 400;
            faded.color = faded.color.with_opacity(0.8);
            spans.push(Span::new(format!(" ({extra})"), faded.link(href)));
        }
        spans
    }

    // -- header ------------------------------------------------------------

    fn header(&mut self, document: &Document) -> f64 {
        let info = &document.personal_info;
        let align = match self.style.page_alignment {
            PageAlignment::Left => Align::Left,
            PageAlignment::Center => Align::Center,
        };
        let width = self.width;
        let mut y = 0.0;

        let name = [Span::new(&info.name, TextStyle::new(XL4.0, 700, self.palette.heading))];
        y += self.paragraph(&name, 0.0, y, width, XL4.1, align);

        y += 4.0;
        let title = [Span::new(&info.job_title, TextStyle::new(XL.0, 300, self.palette.accent))];
        y += self.paragraph(&title, 0.0, y, width, XL.1, align);

        y += 16.0;
        y + self.detail_grid(document, y, align)
    }

    fn detail_grid(&mut self, document: &Document, top: f64, align: Align) -> f64 {
        let details = &document.personal_info.details;
        if details.is_empty() {
            return 0.0;
        }
        let columns = self.style.detail_columns();
        let column_gap = self.style.personal_info_column_gap * crate::style::REM;
        let row_gap = self.style.personal_info_row_gap * crate::style::REM;
        let pad = self.style.personal_info_label_value_gap * crate::style::REM;

        let label_style = TextStyle::new(SM.0, 700, self.palette.heading);
        let cells: Vec<(f64, Span)> = details
            .iter()
            .map(|d| {
                let label_w = measure_width(&self.fonts, &d.label, &label_style);
                let value_style = match detail_href(&d.label, &d.value) {
                    Some(href) => TextStyle::new(SM.0, 400, self.palette.accent).link(Some(href)),
                    None => TextStyle::new(SM.0, 400, self.palette.body),
                };
                (label_w, Span::new(&d.value, value_style))
            })
            .collect();

        // `1fr` columns in a shrink-to-fit grid: every column is as wide as
        // the widest cell, capped so the grid fits the content box.
        let gaps = column_gap * (columns - 1) as f64;
        let widest = cells
            .iter()
            .map(|(label_w, value)| label_w + pad + measure_width(&self.fonts, &value.text, &value.style))
            .fold(0.0, f64::max);
        let column_w = widest.min(((self.width - gaps) / columns as f64).max(0.0));
        let grid_w = column_w * columns as f64 + gaps;
        let left = match align {
            Align::Left => 0.0,
            Align::Center => ((self.width - grid_w) / 2.0).max(0.0),
        };

        let mut y = top;
        for (row, chunk) in cells.chunks(columns).enumerate() {
            if row > 0 {
                y += row_gap;
            }
            let mut row_h: f64 = 0.0;
            for (col, (label_w, value)) in chunk.iter().enumerate() {
                let x = left + col as f64 * (column_w + column_gap);
                let label = &details[row * columns + col].label;
                let label_h = self.paragraph(&[Span::new(label, label_style.clone())], x, y, f64::INFINITY, SM.1, Align::Left);
                let value_x = x + label_w + pad;
                let value_w = (column_w - label_w - pad).max(0.0);
                let value_h = self.paragraph(std::slice::from_ref(value), value_x, y, value_w, SM.1, Align::Left);
                row_h = row_h.max(label_h).max(value_h);
            }
            y += row_h;
        }
        y - top
    }

    // -- sections ----------------------------------------------------------

    fn section_title(&mut self, title: &str) -> f64 {
        let style = TextStyle::new(BASE.0, 700, self.palette.heading).tracking(0.05 * BASE.0);
        let mut y = self.paragraph(&[Span::new(title.to_uppercase(), style)], 0.0, 0.0, self.width, BASE.1, Align::Left);
        y += 8.0;
        self.items.push(BoxItem::Rule {
            x: 0.0,
            y: y + 0.5,
            width: self.width,
            thickness: 1.0,
            color: self.palette.heading,
        });
        y + 1.0
    }

    /// Returns (content height, margin top, margin bottom).
    fn item(&mut self, entry: &Entry) -> (f64, f64, f64) {
        let date_format = self.style.date_format;
        match &entry.body {
            EntryBody::WorkExperience(w) => {
                let company = join_location(&w.company, &w.location);
                let job = (w.job_title.as_str(), w.job_title_link.as_str(), w.job_title_extra.as_str());
                let org = (company.as_str(), w.company_link.as_str(), w.company_extra.as_str());
                let dates = format!("{} - {}", date_format.format(&w.start_date), date_format.format(&w.end_date));
                let mut y = self.dated_heading(job, org, &dates);
                y += 4.0 + self.prose(&w.description, y + 4.0);
                (y, 0.0, 16.0)
            }
            EntryBody::Education(e) => {
                let institution = join_location(&e.institution, &e.location);
                let degree = (e.degree.as_str(), e.degree_link.as_str(), e.degree_extra.as_str());
                let org = (institution.as_str(), e.institution_link.as_str(), e.institution_extra.as_str());
                let dates = format!("{} - {}", date_format.format(&e.start_date), date_format.format(&e.end_date));
                let mut y = self.dated_heading(degree, org, &dates);
                if !e.description.is_empty() {
                    y += 4.0 + self.prose(&e.description, y + 4.0);
                }
                (y, 0.0, 12.0)
            }
            EntryBody::Skill(s) => {
                let mut spans = vec![Span::new(&s.skill_name, self.heading(600))];
                if !s.level.is_empty() {
                    let faded = self.body(400);
                    let color = faded.color.with_opacity(0.9);
                    spans.push(Span::new(format!(" ({})", s.level), TextStyle { color, ..faded }));
                }
                if !s.description.is_empty() {
                    let faded = self.body(400).italic(true);
                    let color = faded.color.with_opacity(0.8);
                    spans.push(Span::new(format!(": {}", s.description), TextStyle { color, ..faded }));
                }
                let lh = self.lh();
                (self.paragraph(&spans, 0.0, 0.0, self.width, lh, Align::Left), 0.0, 4.0)
            }
            EntryBody::Project(p) => {
                let mut spans = self.heading_part(&p.project_name, &p.project_name_link, &p.project_name_extra, self.heading(600));
                if !p.link.is_empty() {
                    let style = TextStyle::new(SM.0, 400, self.palette.accent).link(Some(external_href(&p.link)));
                    spans.push(Span::new(" (view project)", style));
                }
                let lh = self.lh();
                let y = self.paragraph(&spans, 0.0, 0.0, self.width, lh, Align::Left);
                (y + self.prose(&p.description, y), 0.0, 12.0)
            }
            EntryBody::Certification(c) => {
                let date = date_format.format(&c.date);
                let (left_w, date_x) = self.date_column(&date);
                let lh = self.lh();
                let name = self.heading_part(&c.name, &c.name_link, &c.name_extra, self.heading(600));
                let mut y = self.paragraph(&name, 0.0, 0.0, left_w, lh, Align::Left);
                let issuer = [Span::new(&c.issuer, self.body(400).italic(true))];
                y += self.paragraph(&issuer, 0.0, y, left_w, lh, Align::Left);
                let date_h = self.date_text(&date, date_x);
                (y.max(date_h), 0.0, 8.0)
            }
            EntryBody::Custom(c) => {
                let lh = self.lh();
                let title = self.heading_part(&c.title, &c.title_link, &c.title_extra, self.heading(600));
                let y = self.paragraph(&title, 0.0, 0.0, self.width, lh, Align::Left);
                (y + self.prose(&c.description, y), 0.0, 8.0)
            }
            EntryBody::Language(l) => {
                let lh = self.lh();
                let spans = self.language_compact(l);
                (self.paragraph(&spans, 0.0, 0.0, self.width, lh, Align::Left), 0.0, 0.0)
            }
        }
    }

    /// Width of the left column and x of the date for a right-aligned,
    /// non-wrapping `text-xs pl-4` date.
    fn date_column(&self, date: &str) -> (f64, f64) {
        let date_w = measure_width(&self.fonts, date, &TextStyle::new(XS.0, 400, self.palette.muted));
        let left_w = (self.width - date_w - 16.0).max(0.0);
        (left_w, self.width - date_w)
    }

    /// Draw the date with its `pt-1`; returns the column height.
    fn date_text(&mut self, date: &str, x: f64) -> f64 {
        let style = TextStyle::new(XS.0, 400, self.palette.muted);
        4.0 + self.paragraph(&[Span::new(date, style)], x, 4.0, f64::INFINITY, XS.1, Align::Left)
    }

    /// The two-line heading of work and education entries with the date on
    /// the right. `primary` is the title half, `org` the organisation half.
    fn dated_heading(&mut self, primary: (&str, &str, &str), org: (&str, &str, &str), dates: &str) -> f64 {
        let (main, sub) = match self.style.heading_style {
            HeadingStyle::CompanyFirst => (org, primary),
            HeadingStyle::TitleFirst => (primary, org),
        };
        let (left_w, date_x) = self.date_column(dates);

        let h4_size = self.fs() * 1.1;
        let h4_lh = h4_size * self.style.line_height.factor();
        let h4_style = TextStyle::new(h4_size, 700, self.palette.heading);
        let main_spans = self.heading_part(main.0, main.1, main.2, h4_style);
        let mut y = self.paragraph(&main_spans, 0.0, 0.0, left_w, h4_lh, Align::Left);

        let lh = self.lh();
        let sub_spans = self.heading_part(sub.0, sub.1, sub.2, self.body(600));
        y += self.paragraph(&sub_spans, 0.0, y, left_w, lh, Align::Left);

        let date_h = self.date_text(dates, date_x);
        y.max(date_h)
    }

    /// Rich-text description at `top`. Returns its height.
    fn prose(&mut self, html: &str, top: f64) -> f64 {
        let lh = self.lh();
        let mut y = top;
        for block in parse_fragment(html) {
            let spans: Vec<Span> = block
                .runs
                .iter()
                .map(|run| {
                    let mut style = self.body(if run.bold { 700 } else { 400 }).italic(run.italic);
                    if run.href.is_some() {
                        style.color = self.palette.accent;
                    }
                    Span::new(&run.text, style.link(run.href.clone()))
                })
                .collect();
            match block.kind {
                RichBlockKind::Paragraph => {
                    y += self.paragraph(&spans, 0.0, y, self.width, lh, Align::Left);
                }
                RichBlockKind::Bullet | RichBlockKind::Numbered(_) => {
                    let indent = LIST_INDENT * block.depth.max(1) as f64;
                    let marker = match block.kind {
                        RichBlockKind::Numbered(n) => format!("{n}."),
                        _ => "\u{2022}".to_string(),
                    };
                    let marker_style = self.body(400);
                    let marker_w = measure_width(&self.fonts, &marker, &marker_style);
                    self.items.push(BoxItem::Text {
                        x: indent - 6.0 - marker_w,
                        baseline: baseline(y, lh, marker_style.size),
                        text: marker,
                        style: marker_style,
                    });
                    let h = self.paragraph(&spans, indent, y, (self.width - indent).max(0.0), lh, Align::Left);
                    y += h.max(lh) + LIST_ITEM_GAP;
                }
            }
        }
        y - top
    }

    // -- skills ------------------------------------------------------------

    fn skill_group(&mut self, category: Option<&str>, skills: &[&SkillEntry], top: f64) -> f64 {
        let mut y = top;
        if let Some(category) = category {
            let mut style = TextStyle::new(SM.0, 600, self.palette.heading);
            style.color = style.color.with_opacity(0.9);
            y += self.paragraph(&[Span::new(category, style)], 0.0, y, self.width, SM.1, Align::Left);
            y += 8.0;
        }

        let text_style = TextStyle::new(SM.0, 500, Color::WHITE);
        let chip_widths: Vec<f64> = skills
            .iter()
            .map(|s| measure_width(&self.fonts, &s.skill_name, &text_style) + 24.0)
            .collect();
        let outer: Vec<f64> = chip_widths.iter().map(|w| w + 8.0).collect();
        let rows = wrap_rows(&outer, self.width, 0.0);

        for row in &rows {
            let mut x = 0.0;
            for i in row.clone() {
                self.items.push(BoxItem::Rect {
                    x,
                    y,
                    width: chip_widths[i],
                    height: 28.0,
                    color: self.palette.accent,
                    radius: 14.0,
                });
                self.paragraph(
                    &[Span::new(&skills[i].skill_name, text_style.clone())],
                    x + 12.0,
                    y + 4.0,
                    f64::INFINITY,
                    SM.1,
                    Align::Left,
                );
                x += outer[i];
            }
            y += 36.0;
        }
        y - top
    }

    // -- languages ---------------------------------------------------------

    fn language_compact(&self, l: &LanguageEntry) -> Vec<Span> {
        let mut spans = vec![Span::new(&l.language, self.heading(600))];
        let level = l.level.trim();
        if !level.is_empty() {
            let faded = self.body(400);
            let color = faded.color.with_opacity(0.9);
            spans.push(Span::new(format!(" ({level})"), TextStyle { color, ..faded }));
        }
        spans
    }

    fn languages(&mut self, section: &Section) -> f64 {
        let inline = section.is_inline();
        let layout = section.layout.unwrap_or(SectionLayout::Compact);
        let languages: Vec<&LanguageEntry> = section
            .items
            .iter()
            .filter_map(|e| match &e.body {
                EntryBody::Language(l) => Some(l),
                _ => None,
            })
            .collect();

        // Lay out each entry into its own box first, then arrange.
        let boxes: Vec<(f64, BlockBox)> = languages
            .iter()
            .map(|l| {
                let mut sub = BoxModel::new(self.style, if inline { f64::INFINITY } else { self.width });
                let (w, h) = sub.language(l, layout, inline, self.width);
                (w, BlockBox { height: h, items: sub.items })
            })
            .collect();

        let widths: Vec<f64> = boxes.iter().map(|(w, _)| *w).collect();
        let mut y = 0.0;
        if inline {
            let rows = wrap_rows(&widths, self.width, 24.0);
            for (r, row) in rows.iter().enumerate() {
                if r > 0 {
                    y += 12.0;
                }
                let row_h = boxes[row.clone()].iter().map(|(_, b)| b.height).fold(0.0, f64::max);
                let mut x = 0.0;
                for (w, b) in &boxes[row.clone()] {
                    let dy = y + (row_h - b.height) / 2.0;
                    self.place(&b.items, x, dy);
                    x += w + 24.0;
                }
                y += row_h;
            }
        } else {
            for (i, (_, b)) in boxes.iter().enumerate() {
                if i > 0 {
                    y += 12.0;
                }
                self.place(&b.items, 0.0, y);
                y += b.height;
            }
        }
        y
    }

    fn place(&mut self, items: &[BoxItem], dx: f64, dy: f64) {
        self.items.extend(items.iter().cloned().map(|item| translate(item, dx, dy)));
    }

    /// One language entry. Returns (outer width, outer height).
    fn language(&mut self, l: &LanguageEntry, layout: SectionLayout, inline: bool, full_width: f64) -> (f64, f64) {
        let lh = self.lh();
        let level = l.level.trim();
        let level_value = language_level(level);
        let name_style = TextStyle::new(SM.0, 600, self.palette.heading);

        match layout {
            SectionLayout::Pills => {
                let text = TextStyle::new(SM.0, 500, Color::WHITE);
                let level_style = TextStyle::new(XS.0, 400, Color::WHITE.with_opacity(0.8));
                let name_w = measure_width(&self.fonts, &l.language, &text);
                let mut width = 12.0 + name_w + 12.0;
                if !level.is_empty() {
                    width += 8.0 + 1.0 + 8.0 + measure_width(&self.fonts, level, &level_style);
                }
                self.items.push(BoxItem::Rect {
                    x: 0.0,
                    y: 0.0,
                    width,
                    height: 32.0,
                    color: self.palette.accent,
                    radius: 16.0,
                });
                self.paragraph(&[Span::new(&l.language, text)], 12.0, 6.0, f64::INFINITY, SM.1, Align::Left);
                if !level.is_empty() {
                    let x = 12.0 + name_w + 8.0;
                    self.items.push(BoxItem::Rect {
                        x,
                        y: 8.0,
                        width: 1.0,
                        height: 16.0,
                        color: self.palette.accent.with_opacity(0.5),
                        radius: 0.0,
                    });
                    self.paragraph(&[Span::new(level, level_style)], x + 9.0, 8.0, f64::INFINITY, XS.1, Align::Left);
                }
                (width, 32.0)
            }
            SectionLayout::Bar if level_value > 0 => {
                let level_style = TextStyle::new(XS.0, 400, self.palette.body);
                let natural = measure_width(&self.fonts, &l.language, &name_style)
                    + 8.0
                    + measure_width(&self.fonts, level, &level_style);
                let width = if inline { natural.max(160.0) } else { full_width };
                self.paragraph(&[Span::new(&l.language, name_style)], 0.0, 0.0, f64::INFINITY, SM.1, Align::Left);
                let level_w = measure_width(&self.fonts, level, &level_style);
                self.paragraph(&[Span::new(level, level_style)], width - level_w, 2.0, f64::INFINITY, XS.1, Align::Left);
                self.items.push(BoxItem::Rect {
                    x: 0.0,
                    y: 24.0,
                    width,
                    height: 8.0,
                    color: self.palette.track,
                    radius: 4.0,
                });
                self.items.push(BoxItem::Rect {
                    x: 0.0,
                    y: 24.0,
                    width: width * f64::from(level_value) * 0.2,
                    height: 8.0,
                    color: self.palette.accent,
                    radius: 4.0,
                });
                (width, 32.0)
            }
            SectionLayout::Dots if level_value > 0 => {
                let name_w = measure_width(&self.fonts, &l.language, &name_style);
                self.paragraph(&[Span::new(&l.language, name_style)], 0.0, 0.0, f64::INFINITY, SM.1, Align::Left);
                let mut x = name_w + 12.0;
                for i in 0..5u8 {
                    let color = if i < level_value { self.palette.accent } else { self.palette.track };
                    self.items.push(BoxItem::Rect {
                        x,
                        y: 4.0,
                        width: 12.0,
                        height: 12.0,
                        color,
                        radius: 6.0,
                    });
                    x += 18.0;
                }
                (x - 6.0, 20.0)
            }
            SectionLayout::List => {
                let mut spans = vec![Span::new(&l.language, self.heading(600))];
                if !level.is_empty() {
                    spans.push(Span::new(format!(": {level}"), self.body(400)));
                }
                let width = if inline { self.spans_width(&spans) } else { full_width };
                let h = self.paragraph(&spans, 0.0, 0.0, width.max(1.0), lh, Align::Left);
                (width, if inline { h } else { h + 4.0 })
            }
            _ => {
                let spans = self.language_compact(l);
                let width = if inline { self.spans_width(&spans) } else { full_width };
                let h = self.paragraph(&spans, 0.0, 0.0, width.max(1.0), lh, Align::Left);
                (width, h)
            }
        }
    }
}

/// Baseline of text of `size` centred in a line box at `top`.
fn baseline(top: f64, line_height: f64, size: f64) -> f64 {
    top + (line_height - size) / 2.0 + size * 0.8
}

/// CSS margin collapsing of two adjoining margins.
fn collapse_margins(a: f64, b: f64) -> f64 {
    a.max(b).max(0.0) + a.min(b).min(0.0)
}

fn translate(item: BoxItem, dx: f64, dy: f64) -> BoxItem {
    match item {
        BoxItem::Text { x, baseline, text, style } => BoxItem::Text {
            x: x + dx,
            baseline: baseline + dy,
            text,
            style,
        },
        BoxItem::Rect { x, y, width, height, color, radius } => BoxItem::Rect {
            x: x + dx,
            y: y + dy,
            width,
            height,
            color,
            radius,
        },
        BoxItem::Rule { x, y, width, thickness, color } => BoxItem::Rule {
            x: x + dx,
            y: y + dy,
            width,
            thickness,
            color,
        },
    }
}

fn join_location(name: &str, location: &str) -> String {
    if location.is_empty() {
        name.to_string()
    } else {
        format!("{name}, {location}")
    }
}

/// `https://` link for a stored address with or without a scheme.
pub fn external_href(link: &str) -> String {
    let bare = link
        .strip_prefix("https://")
        .or_else(|| link.strip_prefix("http://"))
        .unwrap_or(link);
    format!("https://{bare}")
}

/// Link target for a personal-info value, decided by its label.
pub fn detail_href(label: &str, value: &str) -> Option<String> {
    const WEBSITE_LABELS: [&str; 7] = ["website", "linkedin", "github", "portfolio", "twitter", "gitlab", "blog"];
    let label = label.to_lowercase();
    if label.contains("email") {
        Some(format!("mailto:{value}"))
    } else if WEBSITE_LABELS.iter().any(|k| label.contains(k)) {
        Some(if value.starts_with("http") {
            value.to_string()
        } else {
            format!("https://{value}")
        })
    } else {
        None
    }
}

/// Proficiency on a 1-5 scale for bar and dot layouts; 0 when unknown.
pub fn language_level(level: &str) -> u8 {
    match level {
        "Elementary" => 1,
        "Intermediate" => 2,
        "Advanced" => 3,
        "Fluent" => 4,
        "Native" => 5,
        _ => 0,
    }
}
