//! # PDF Serializer
//!
//! Writes a paginated CV as a PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. It draws the same [`BlockBox`]es
//! the metrics measurer produced the heights from, placed page by page in
//! the order [`build_pages`](crate::render::build_pages) decided, so the
//! export and the preview share one pagination. Text uses the 14 standard
//! fonts with WinAnsi encoding; nothing is embedded.
//!
//! Object layout: 1 is the catalog, 2 the page tree, then one Type1 font
//! object per face in use, then for each page its content stream, its link
//! annotations and the page object, and the Info dictionary last.
//!
//! Layout works in CSS px; every coordinate is scaled by [`PX_TO_PT`] and
//! flipped to PDF's bottom-up y axis on the way out.

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::flatten::RenderBlock;
use crate::font::{FontContext, StandardFont};
use crate::measure::{BlockBox, BoxItem, MetricsMeasurer};
use crate::model::Document;
use crate::render::{PageView, RenderedPage};
use crate::style::{Color, CvStyle};
use crate::text::measure_width;

/// 72 pt per inch over 96 px per inch.
pub const PX_TO_PT: f64 = 0.75;

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

impl Metadata {
    /// Title and author from the CV owner's name.
    pub fn for_document(document: &Document) -> Self {
        let name = document.personal_info.name.trim();
        if name.is_empty() {
            return Self::default();
        }
        Self {
            title: Some(format!("{name} - CV")),
            author: Some(name.to_string()),
            subject: (!document.personal_info.job_title.is_empty()).then(|| document.personal_info.job_title.clone()),
        }
    }
}

#[derive(Debug, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font and its object id; the index is the `/F{n}` resource name.
    font_objects: Vec<(StandardFont, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

/// A laid-out block placed on a page, in px from the page's top-left.
struct Placed {
    x: f64,
    y: f64,
    content: BlockBox,
}

/// A clickable area in px from the page's top-left.
struct LinkArea {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    uri: String,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write every page of `view` to a PDF byte vector.
    pub fn write(&self, document: &Document, style: &CvStyle, view: &PageView, metadata: &Metadata) -> Vec<u8> {
        let fonts = FontContext::new(&style.font_family);
        let measurer = MetricsMeasurer::new();
        let geometry = view.geometry;
        let placed: Vec<Vec<Placed>> = view
            .pages
            .iter()
            .map(|page| place_page(&measurer, document, style, page, geometry.margin, geometry.content_width()))
            .collect();

        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_objects: Vec::new(),
        };

        // Reserve object IDs:
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        // 3+ = fonts, then page objects, content streams and annotations
        for _ in 0..3 {
            builder.objects.push(PdfObject { data: Vec::new() });
        }

        self.register_fonts(&mut builder, &fonts, &placed);

        let width_pt = geometry.width * PX_TO_PT;
        let height_pt = geometry.height * PX_TO_PT;
        let mut page_obj_ids: Vec<usize> = Vec::new();

        for page in &placed {
            let mut links = Vec::new();
            let content = self.build_content_stream(page, height_pt, &fonts, &builder.font_objects, &mut links);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let annots = self.write_link_annotations(&mut builder, &links, height_pt);

            let page_obj_id = builder.objects.len();
            let font_resources = self.build_font_resource_dict(&builder.font_objects);
            let mut page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >>",
                width_pt, height_pt, content_obj_id, font_resources
            );
            if !annots.is_empty() {
                let refs: Vec<String> = annots.iter().map(|id| format!("{id} 0 R")).collect();
                let _ = write!(page_dict, " /Annots [{}]", refs.join(" "));
            }
            page_dict.push_str(" >>");
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, page_obj_ids.len()).into_bytes();

        let info_obj_id = {
            let id = builder.objects.len();
            let mut info = String::from("<< ");
            if let Some(ref title) = metadata.title {
                let _ = write!(info, "/Title ({}) ", pdf_literal(title));
            }
            if let Some(ref author) = metadata.author {
                let _ = write!(info, "/Author ({}) ", pdf_literal(author));
            }
            if let Some(ref subject) = metadata.subject {
                let _ = write!(info, "/Subject ({}) ", pdf_literal(subject));
            }
            let _ = write!(info, "/Producer (vitae {}) /Creator (vitae) >>", env!("CARGO_PKG_VERSION"));
            builder.objects.push(PdfObject { data: info.into_bytes() });
            id
        };

        self.serialize(&builder, info_obj_id)
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(
        &self,
        page: &[Placed],
        page_height: f64,
        fonts: &FontContext,
        font_objects: &[(StandardFont, usize)],
        links: &mut Vec<LinkArea>,
    ) -> String {
        let mut stream = String::new();
        for placed in page {
            for item in &placed.content.items {
                self.write_item(&mut stream, item, placed.x, placed.y, page_height, fonts, font_objects, links);
            }
        }
        stream
    }

    /// Write one box item as PDF operators. `dx`/`dy` place the block on
    /// the page in px.
    #[allow(clippy::too_many_arguments)]
    fn write_item(
        &self,
        stream: &mut String,
        item: &BoxItem,
        dx: f64,
        dy: f64,
        page_height: f64,
        fonts: &FontContext,
        font_objects: &[(StandardFont, usize)],
        links: &mut Vec<LinkArea>,
    ) {
        match item {
            BoxItem::Rect {
                x,
                y,
                width,
                height,
                color,
                radius,
            } => {
                let w = width * PX_TO_PT;
                let h = height * PX_TO_PT;
                let px = (dx + x) * PX_TO_PT;
                let py = page_height - (dy + y) * PX_TO_PT - h;
                let _ = write!(stream, "q\n{:.3} {:.3} {:.3} rg\n", color.r, color.g, color.b);
                if *radius > 0.0 {
                    self.write_rounded_rect(stream, px, py, w, h, radius * PX_TO_PT);
                } else {
                    let _ = writeln!(stream, "{:.2} {:.2} {:.2} {:.2} re", px, py, w, h);
                }
                stream.push_str("f\nQ\n");
            }

            BoxItem::Rule {
                x,
                y,
                width,
                thickness,
                color,
            } => {
                let px = (dx + x) * PX_TO_PT;
                let py = page_height - (dy + y) * PX_TO_PT;
                let _ = write!(
                    stream,
                    "q\n{:.3} {:.3} {:.3} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    color.r,
                    color.g,
                    color.b,
                    thickness * PX_TO_PT,
                    px,
                    py,
                    px + width * PX_TO_PT,
                    py
                );
            }

            BoxItem::Text { x, baseline, text, style } => {
                let font = fonts.font(style.weight, style.italic);
                let index = self.font_index(font, font_objects);
                let px = (dx + x) * PX_TO_PT;
                let py = page_height - (dy + baseline) * PX_TO_PT;
                let Color { r, g, b } = style.color;
                let _ = write!(stream, "BT\n{:.3} {:.3} {:.3} rg\n", r, g, b);
                let _ = writeln!(stream, "/F{} {:.2} Tf", index, style.size * PX_TO_PT);
                // Tc outlives ET, so it is set on every run.
                let _ = writeln!(stream, "{:.3} Tc", style.letter_spacing * PX_TO_PT);
                let _ = write!(stream, "{:.2} {:.2} Td\n({}) Tj\nET\n", px, py, pdf_literal(text));

                if let Some(uri) = &style.href {
                    links.push(LinkArea {
                        x: dx + x,
                        y: dy + baseline - style.size * 0.8,
                        width: measure_width(fonts, text, style),
                        height: style.size,
                        uri: uri.clone(),
                    });
                }
            }
        }
    }

    fn write_rounded_rect(&self, stream: &mut String, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let k = 0.5522847498;
        let r = radius.min(w / 2.0).min(h / 2.0);

        let _ = writeln!(stream, "{:.2} {:.2} m", x + r, y);
        let _ = writeln!(stream, "{:.2} {:.2} l", x + w - r, y);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w - r + r * k,
            y,
            x + w,
            y + r - r * k,
            x + w,
            y + r
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x + w, y + h - r);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + w,
            y + h - r + r * k,
            x + w - r + r * k,
            y + h,
            x + w - r,
            y + h
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x + r, y + h);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x + r - r * k,
            y + h,
            x,
            y + h - r + r * k,
            x,
            y + h - r
        );
        let _ = writeln!(stream, "{:.2} {:.2} l", x, y + r);
        let _ = writeln!(
            stream,
            "{:.2} {:.2} {:.2} {:.2} {:.2} {:.2} c",
            x,
            y + r - r * k,
            x + r - r * k,
            y,
            x + r,
            y
        );
        stream.push_str("h\n");
    }

    /// One `/Link` annotation object per link area. Returns their ids.
    fn write_link_annotations(&self, builder: &mut PdfBuilder, links: &[LinkArea], page_height: f64) -> Vec<usize> {
        links
            .iter()
            .map(|link| {
                let id = builder.objects.len();
                let x0 = link.x * PX_TO_PT;
                let y1 = page_height - link.y * PX_TO_PT;
                let data = format!(
                    "<< /Type /Annot /Subtype /Link /Rect [{:.2} {:.2} {:.2} {:.2}] /Border [0 0 0] \
                     /A << /S /URI /URI ({}) >> >>",
                    x0,
                    y1 - link.height * PX_TO_PT,
                    x0 + link.width * PX_TO_PT,
                    y1,
                    pdf_literal(&link.uri)
                );
                builder.objects.push(PdfObject { data: data.into_bytes() });
                id
            })
            .collect()
    }

    /// Register every face any page draws with, in a fixed order so the
    /// output is deterministic.
    fn register_fonts(&self, builder: &mut PdfBuilder, fonts: &FontContext, pages: &[Vec<Placed>]) {
        let used: Vec<StandardFont> = StandardFont::faces(fonts.family())
            .into_iter()
            .filter(|face| {
                pages.iter().flatten().flat_map(|p| &p.content.items).any(|item| match item {
                    BoxItem::Text { style, .. } => fonts.font(style.weight, style.italic) == *face,
                    _ => false,
                })
            })
            .collect();

        // Always have at least the regular face.
        let used = if used.is_empty() {
            vec![fonts.font(400, false)]
        } else {
            used
        };

        for font in used {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.font_objects.push((font, obj_id));
        }
    }

    fn build_font_resource_dict(&self, font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Resource index (`/F0`, `/F1`, ...) of `font`, or 0.
    fn font_index(&self, font: StandardFont, font_objects: &[(StandardFont, usize)]) -> usize {
        font_objects.iter().position(|(f, _)| *f == font).unwrap_or(0)
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = writeln!(output, "{} 0 obj", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output
    }
}

/// Lay out the blocks of one page top to bottom inside the margins.
fn place_page(
    measurer: &MetricsMeasurer,
    document: &Document,
    style: &CvStyle,
    page: &RenderedPage,
    margin: f64,
    content_width: f64,
) -> Vec<Placed> {
    let mut placed = Vec::new();
    let mut y = margin;
    let mut place = |block: &RenderBlock| {
        let content = measurer.layout_block(document, block, style, content_width);
        let height = content.height;
        placed.push(Placed { x: margin, y, content });
        y += height;
    };

    if let Some(header) = &page.header {
        place(header);
    }
    for section in &page.sections {
        if let Some(title) = &section.title {
            place(title);
        }
        for block in &section.blocks {
            place(block);
        }
    }
    placed
}

/// Encode text as a PDF literal string body: WinAnsi bytes, with
/// delimiters and anything outside printable ASCII escaped.
fn pdf_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.chars().map(win_ansi_byte) {
        match byte {
            b'\\' | b'(' | b')' => {
                out.push('\\');
                out.push(char::from(byte));
            }
            0x20..=0x7e => out.push(char::from(byte)),
            _ => {
                let _ = write!(out, "\\{:03o}", byte);
            }
        }
    }
    out
}

/// WinAnsiEncoding byte for `ch`; `?` when it has none.
fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        '\u{20}'..='\u{7e}' => ch as u8,
        '\u{a0}'..='\u{ff}' => ch as u8,
        '\u{20ac}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        _ => b'?',
    }
}
