//! # Render-Block Flattener
//!
//! Turns the nested document into the flat, ordered list of blocks that
//! pagination works on. A block is the unit that never splits across a
//! page: the header, a section title, one entry, one skill category's
//! chips, or a whole languages list.
//!
//! Measurement, page assignment, the HTML renderer and the PDF writer all
//! consume the same list, so block ids are the only join key between them.

use serde::Serialize;

use crate::model::{Document, EntryBody, Section, SectionType};

/// What a block draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockKind {
    /// Name, job title and the personal-info grid.
    Header,
    /// A section's title bar.
    SectionHeader,
    /// One entry of a section.
    #[serde(rename_all = "camelCase")]
    Item { entry_id: String },
    /// The chips of one skill category. `category: None` is the
    /// uncategorized group, which always comes first.
    #[serde(rename_all = "camelCase")]
    SkillGroup {
        category: Option<String>,
        entry_ids: Vec<String>,
        /// Categorized groups that follow an uncategorized group get a
        /// top margin.
        spaced: bool,
    },
    /// Every entry of a Languages section, laid out together.
    LanguageGroup,
}

/// One atomic, measurable unit of the page flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderBlock {
    pub id: String,
    /// `None` only for the header.
    pub owner_section_id: Option<String>,
    #[serde(flatten)]
    pub kind: BlockKind,
    /// Start a new page before this block (unless the page is empty).
    pub break_before: bool,
    /// The last block of its section carries the section's bottom spacing.
    pub last_in_section: bool,
}

impl RenderBlock {
    fn new(id: String, owner: Option<&str>, kind: BlockKind) -> Self {
        Self {
            id,
            owner_section_id: owner.map(str::to_string),
            kind,
            break_before: false,
            last_in_section: false,
        }
    }
}

/// Flatten the visible part of `document` into blocks, in reading order.
pub fn flatten(document: &Document) -> Vec<RenderBlock> {
    let mut blocks = vec![RenderBlock::new("header".to_string(), None, BlockKind::Header)];
    let mut pending_break = false;

    for section in document.visible_sections() {
        if section.items.is_empty() {
            continue;
        }
        let start = blocks.len();

        let mut title = RenderBlock::new(
            format!("section:{}", section.id),
            Some(&section.id),
            BlockKind::SectionHeader,
        );
        title.break_before = section.page_break_before || pending_break;
        blocks.push(title);

        match section.section_type {
            SectionType::Skills if !section.is_skill_list() => skill_groups(section, &mut blocks),
            SectionType::Languages => blocks.push(RenderBlock::new(
                format!("languages:{}", section.id),
                Some(&section.id),
                BlockKind::LanguageGroup,
            )),
            _ => blocks.extend(section.items.iter().map(|entry| {
                RenderBlock::new(
                    format!("item:{}:{}", section.id, entry.id),
                    Some(&section.id),
                    BlockKind::Item {
                        entry_id: entry.id.clone(),
                    },
                )
            })),
        }

        if let Some(last) = blocks[start..].last_mut() {
            last.last_in_section = true;
        }
        pending_break = section.page_break_after;
    }
    blocks
}

/// One block per skill category, uncategorized first, then categories in
/// order of first appearance.
fn skill_groups(section: &Section, blocks: &mut Vec<RenderBlock>) {
    let mut uncategorized = Vec::new();
    let mut categories: Vec<(String, Vec<String>)> = Vec::new();

    for entry in &section.items {
        let category = match &entry.body {
            EntryBody::Skill(skill) => skill.category.as_str(),
            _ => "",
        };
        if category.trim().is_empty() {
            uncategorized.push(entry.id.clone());
        } else if let Some((_, ids)) = categories.iter_mut().find(|(c, _)| c == category) {
            ids.push(entry.id.clone());
        } else {
            categories.push((category.to_string(), vec![entry.id.clone()]));
        }
    }

    let spaced = !uncategorized.is_empty();
    let mut groups = Vec::new();
    if spaced {
        groups.push((None, uncategorized));
    }
    groups.extend(categories.into_iter().map(|(c, ids)| (Some(c), ids)));

    for (n, (category, entry_ids)) in groups.into_iter().enumerate() {
        let spaced = spaced && category.is_some();
        blocks.push(RenderBlock::new(
            format!("group:{}:{n}", section.id),
            Some(&section.id),
            BlockKind::SkillGroup {
                category,
                entry_ids,
                spaced,
            },
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entry, SectionLayout, SkillEntry};

    fn section(id: &str, section_type: SectionType, items: Vec<Entry>) -> Section {
        Section {
            id: id.into(),
            title: id.to_uppercase(),
            section_type,
            items,
            layout: Some(section_type.default_layout()),
            display_style: None,
            visible: true,
            page_break_before: false,
            page_break_after: false,
        }
    }

    fn placeholder(id: &str, section_type: SectionType) -> Entry {
        Entry::new(id, EntryBody::placeholder(section_type))
    }

    fn skill(id: &str, category: &str) -> Entry {
        Entry::new(
            id,
            EntryBody::Skill(SkillEntry {
                skill_name: id.into(),
                category: category.into(),
                ..Default::default()
            }),
        )
    }

    fn doc(sections: Vec<Section>) -> Document {
        Document {
            sections,
            ..Document::empty()
        }
    }

    fn ids(blocks: &[RenderBlock]) -> Vec<&str> {
        blocks.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn header_then_one_block_per_entry() {
        let blocks = flatten(&doc(vec![section(
            "w",
            SectionType::WorkExperience,
            vec![
                placeholder("a", SectionType::WorkExperience),
                placeholder("b", SectionType::WorkExperience),
            ],
        )]));
        assert_eq!(ids(&blocks), ["header", "section:w", "item:w:a", "item:w:b"]);
        assert_eq!(blocks[0].owner_section_id, None);
        assert!(blocks[3].last_in_section);
        assert!(!blocks[2].last_in_section);
    }

    #[test]
    fn hidden_and_empty_sections_emit_nothing() {
        let mut hidden = section("h", SectionType::Custom, vec![placeholder("x", SectionType::Custom)]);
        hidden.visible = false;
        let empty = section("e", SectionType::Custom, vec![]);
        let blocks = flatten(&doc(vec![hidden, empty]));
        assert_eq!(ids(&blocks), ["header"]);
    }

    #[test]
    fn skills_group_by_category_uncategorized_first() {
        let blocks = flatten(&doc(vec![section(
            "s",
            SectionType::Skills,
            vec![
                skill("rust", "Languages"),
                skill("git", "Tools"),
                skill("misc", "  "),
                skill("go", "Languages"),
            ],
        )]));
        assert_eq!(ids(&blocks), ["header", "section:s", "group:s:0", "group:s:1", "group:s:2"]);
        match &blocks[2].kind {
            BlockKind::SkillGroup { category, entry_ids, spaced } => {
                assert_eq!(*category, None);
                assert_eq!(entry_ids, &["misc"]);
                assert!(!spaced);
            }
            other => panic!("unexpected {other:?}"),
        }
        match &blocks[3].kind {
            BlockKind::SkillGroup { category, entry_ids, spaced } => {
                assert_eq!(category.as_deref(), Some("Languages"));
                assert_eq!(entry_ids, &["rust", "go"]);
                assert!(spaced);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn skills_list_layout_is_per_entry() {
        let mut s = section("s", SectionType::Skills, vec![skill("a", "X"), skill("b", "Y")]);
        s.layout = Some(SectionLayout::List);
        let blocks = flatten(&doc(vec![s]));
        assert_eq!(ids(&blocks), ["header", "section:s", "item:s:a", "item:s:b"]);
    }

    #[test]
    fn languages_are_one_block() {
        let blocks = flatten(&doc(vec![section(
            "l",
            SectionType::Languages,
            vec![
                placeholder("en", SectionType::Languages),
                placeholder("fr", SectionType::Languages),
            ],
        )]));
        assert_eq!(ids(&blocks), ["header", "section:l", "languages:l"]);
        assert_eq!(blocks[2].kind, BlockKind::LanguageGroup);
    }

    #[test]
    fn break_intents() {
        let mut first = section("a", SectionType::Custom, vec![placeholder("1", SectionType::Custom)]);
        first.page_break_after = true;
        let mut hidden = section("h", SectionType::Custom, vec![placeholder("2", SectionType::Custom)]);
        hidden.visible = false;
        let second = section("b", SectionType::Custom, vec![placeholder("3", SectionType::Custom)]);
        let mut third = section("c", SectionType::Custom, vec![placeholder("4", SectionType::Custom)]);
        third.page_break_before = true;

        let blocks = flatten(&doc(vec![first, hidden, second, third]));
        let breaks: Vec<&str> = blocks
            .iter()
            .filter(|b| b.break_before)
            .map(|b| b.id.as_str())
            .collect();
        assert_eq!(breaks, ["section:b", "section:c"]);
    }
}
