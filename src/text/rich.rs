//! Rich-text descriptions.
//!
//! Entry descriptions are HTML fragments from a rich-text editor:
//! paragraphs, bullet and numbered lists, bold, italic, links and line
//! breaks. This module reads them into a small block model that the
//! measurer, the HTML renderer and the PDF writer share. Unknown tags are
//! dropped and their text kept. Input that doesn't parse degrades to its
//! tag-stripped text as one paragraph.

use std::sync::OnceLock;

use quick_xml::escape::{escape, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

/// One inline run of a rich-text block.
#[derive(Debug, Clone, PartialEq)]
pub struct RichRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub href: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RichBlockKind {
    Paragraph,
    Bullet,
    /// A numbered list item, 1-based.
    Numbered(u32),
}

/// A paragraph or list item.
#[derive(Debug, Clone, PartialEq)]
pub struct RichBlock {
    pub kind: RichBlockKind,
    /// List nesting depth; 0 for paragraphs.
    pub depth: usize,
    pub runs: Vec<RichRun>,
}

impl RichBlock {
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy)]
enum ListKind {
    Bullet,
    Numbered(u32),
}

#[derive(Default)]
struct Builder {
    blocks: Vec<RichBlock>,
    current: Option<RichBlock>,
    lists: Vec<ListKind>,
    bold: usize,
    italic: usize,
    links: Vec<Option<String>>,
}

impl Builder {
    fn open_block(&mut self, kind: RichBlockKind) {
        self.close_block();
        self.current = Some(RichBlock {
            kind,
            depth: self.lists.len(),
            runs: Vec::new(),
        });
    }

    fn close_block(&mut self) {
        let Some(mut block) = self.current.take() else {
            return;
        };
        if let Some(first) = block.runs.first_mut() {
            first.text = first.text.trim_start().to_string();
        }
        if let Some(last) = block.runs.last_mut() {
            last.text = last.text.trim_end().to_string();
        }
        block.runs.retain(|r| !r.text.is_empty());
        if !block.runs.is_empty() || block.kind != RichBlockKind::Paragraph {
            self.blocks.push(block);
        }
    }

    fn open_list_item(&mut self) {
        let kind = match self.lists.last_mut() {
            Some(ListKind::Numbered(n)) => {
                *n += 1;
                RichBlockKind::Numbered(*n)
            }
            _ => RichBlockKind::Bullet,
        };
        self.open_block(kind);
    }

    fn text(&mut self, raw: &str) {
        let collapsed = collapse_whitespace(raw);
        if collapsed.is_empty() {
            return;
        }
        if self.current.is_none() {
            if collapsed.trim().is_empty() {
                return;
            }
            self.open_block(RichBlockKind::Paragraph);
        }
        let bold = self.bold > 0;
        let italic = self.italic > 0;
        let href = self.links.iter().rev().find_map(|l| l.clone());
        let Some(block) = self.current.as_mut() else {
            return;
        };
        match block.runs.last_mut() {
            Some(last) if last.bold == bold && last.italic == italic && last.href == href => {
                if last.text.ends_with(' ') && collapsed.starts_with(' ') {
                    last.text.push_str(&collapsed[1..]);
                } else {
                    last.text.push_str(&collapsed);
                }
            }
            _ => block.runs.push(RichRun {
                text: collapsed,
                bold,
                italic,
                href,
            }),
        }
    }

    fn line_break(&mut self) {
        if let Some(block) = self.current.as_mut() {
            if let Some(last) = block.runs.last_mut() {
                let trimmed = last.text.trim_end().len();
                last.text.truncate(trimmed);
                last.text.push('\n');
            }
        }
    }

    fn start(&mut self, e: &BytesStart<'_>) {
        let name = e.name();
        let name = name.as_ref();
        if name.eq_ignore_ascii_case(b"p") || is_heading(name) || name.eq_ignore_ascii_case(b"div") {
            self.open_block(RichBlockKind::Paragraph);
            if is_heading(name) {
                self.bold += 1;
            }
        } else if name.eq_ignore_ascii_case(b"ul") {
            self.close_block();
            self.lists.push(ListKind::Bullet);
        } else if name.eq_ignore_ascii_case(b"ol") {
            self.close_block();
            self.lists.push(ListKind::Numbered(0));
        } else if name.eq_ignore_ascii_case(b"li") {
            self.open_list_item();
        } else if name.eq_ignore_ascii_case(b"strong") || name.eq_ignore_ascii_case(b"b") {
            self.bold += 1;
        } else if name.eq_ignore_ascii_case(b"em") || name.eq_ignore_ascii_case(b"i") {
            self.italic += 1;
        } else if name.eq_ignore_ascii_case(b"a") {
            let href = e
                .try_get_attribute("href")
                .ok()
                .flatten()
                .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
            self.links.push(href);
        } else if name.eq_ignore_ascii_case(b"br") {
            self.line_break();
        }
    }

    fn end(&mut self, name: &[u8]) {
        if name.eq_ignore_ascii_case(b"p") || name.eq_ignore_ascii_case(b"div") || name.eq_ignore_ascii_case(b"li") {
            self.close_block();
        } else if is_heading(name) {
            self.bold = self.bold.saturating_sub(1);
            self.close_block();
        } else if name.eq_ignore_ascii_case(b"ul") || name.eq_ignore_ascii_case(b"ol") {
            self.close_block();
            self.lists.pop();
        } else if name.eq_ignore_ascii_case(b"strong") || name.eq_ignore_ascii_case(b"b") {
            self.bold = self.bold.saturating_sub(1);
        } else if name.eq_ignore_ascii_case(b"em") || name.eq_ignore_ascii_case(b"i") {
            self.italic = self.italic.saturating_sub(1);
        } else if name.eq_ignore_ascii_case(b"a") {
            self.links.pop();
        }
    }
}

fn is_heading(name: &[u8]) -> bool {
    matches!(name, [b'h' | b'H', b'1'..=b'6'])
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{00A0}' {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

fn resolve_entity(entity: &str) -> Option<&'static str> {
    match entity {
        "nbsp" => Some("\u{00A0}"),
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        "ndash" => Some("\u{2013}"),
        "mdash" => Some("\u{2014}"),
        "hellip" => Some("\u{2026}"),
        "bull" => Some("\u{2022}"),
        _ => None,
    }
}

/// Parse an HTML fragment into blocks.
pub fn parse_fragment(html: &str) -> Vec<RichBlock> {
    if html.trim().is_empty() {
        return Vec::new();
    }
    match read_fragment(html) {
        Some(blocks) => blocks,
        None => {
            log::debug!("rich text did not parse, falling back to plain text");
            plain_fallback(html)
        }
    }
}

fn read_fragment(html: &str) -> Option<Vec<RichBlock>> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().check_end_names = false;

    let mut builder = Builder::default();
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => builder.start(&e),
            Event::Empty(e) => {
                builder.start(&e);
                builder.end(e.name().as_ref());
            }
            Event::End(e) => builder.end(e.name().as_ref()),
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(&e);
                let text = unescape_with(&raw, resolve_entity)
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| raw.to_string());
                builder.text(&text);
            }
            Event::CData(e) => builder.text(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {}
        }
    }
    builder.close_block();
    Some(builder.blocks)
}

fn plain_fallback(html: &str) -> Vec<RichBlock> {
    let text = collapse_whitespace(&strip_tags(html)).trim().to_string();
    if text.is_empty() {
        return Vec::new();
    }
    vec![RichBlock {
        kind: RichBlockKind::Paragraph,
        depth: 0,
        runs: vec![RichRun {
            text,
            bold: false,
            italic: false,
            href: None,
        }],
    }]
}

/// Remove anything that looks like an HTML tag, including an unterminated
/// trailing `<...`.
pub fn strip_tags(html: &str) -> String {
    static TAG: OnceLock<Option<Regex>> = OnceLock::new();
    match TAG.get_or_init(|| Regex::new(r"<[^>]*>?").ok()) {
        Some(tag) => tag.replace_all(html, "").into_owned(),
        None => html.to_string(),
    }
}

/// Escape text for HTML element content or a double-quoted attribute.
pub fn escape_html(text: &str) -> String {
    escape(text).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullet_list_with_inline_styles() {
        let blocks = parse_fragment("<ul><li>Led the <strong>dashboard</strong> work.</li><li>Mentored</li></ul>");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, RichBlockKind::Bullet);
        assert_eq!(blocks[0].depth, 1);
        assert_eq!(blocks[0].runs.len(), 3);
        assert!(blocks[0].runs[1].bold);
        assert_eq!(blocks[0].plain_text(), "Led the dashboard work.");
        assert_eq!(blocks[1].plain_text(), "Mentored");
    }

    #[test]
    fn ordered_lists_count() {
        let blocks = parse_fragment("<ol><li>a</li><li>b</li></ol>");
        assert_eq!(blocks[1].kind, RichBlockKind::Numbered(2));
    }

    #[test]
    fn loose_text_is_a_paragraph() {
        let blocks = parse_fragment("Member of the Coding Club.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, RichBlockKind::Paragraph);
        assert_eq!(blocks[0].plain_text(), "Member of the Coding Club.");
    }

    #[test]
    fn entities_and_links() {
        let blocks = parse_fragment(r#"<p>R&amp;D at&nbsp;<a href="https://x.dev">x</a></p>"#);
        assert_eq!(blocks[0].plain_text(), "R&D at\u{a0}x");
        assert_eq!(blocks[0].runs.last().unwrap().href.as_deref(), Some("https://x.dev"));
    }

    #[test]
    fn br_becomes_newline() {
        let blocks = parse_fragment("<p>one<br>two</p>");
        assert_eq!(blocks[0].plain_text(), "one\ntwo");
    }

    #[test]
    fn empty_paragraphs_are_dropped() {
        assert!(parse_fragment("<p></p><p>  </p>").is_empty());
        assert!(parse_fragment("").is_empty());
    }

    #[test]
    fn strip_tags_handles_unterminated_tag() {
        assert_eq!(strip_tags("<b>bold</b> tail <i"), "bold tail ");
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_html("<b>&\"</b>"), "&lt;b&gt;&amp;&quot;&lt;/b&gt;");
    }
}
