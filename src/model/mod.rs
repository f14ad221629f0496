//! # Document Model
//!
//! The CV as the editor sees it: personal info plus an ordered list of
//! sections, each holding an ordered list of typed entries.
//!
//! Order is significant everywhere (details, sections, entries). Only
//! sections with `visible: true` take part in rendering, pagination and
//! export. The render-side views (blocks, page assignment) are derived
//! from this model on every layout pass and never stored here.

pub mod entries;
pub mod ids;
mod sample;

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use entries::*;
pub use ids::{IdGenerator, SequentialIds, UuidIds};

/// A complete CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub name: String,
    pub job_title: String,
    /// Label/value pairs shown in the header grid. Labels may repeat.
    pub details: Vec<PersonalInfoItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfoItem {
    pub id: String,
    pub label: String,
    pub value: String,
}

/// The kind of a section. Decides the shape of its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionType {
    #[serde(rename = "Work Experience")]
    WorkExperience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
    Custom,
}

impl SectionType {
    /// The layout a new section of this type starts with.
    pub fn default_layout(self) -> SectionLayout {
        match self {
            SectionType::Skills => SectionLayout::Chips,
            SectionType::Languages => SectionLayout::Compact,
            _ => SectionLayout::Bullets,
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionType::WorkExperience => "Work Experience",
            SectionType::Education => "Education",
            SectionType::Skills => "Skills",
            SectionType::Projects => "Projects",
            SectionType::Certifications => "Certifications",
            SectionType::Languages => "Languages",
            SectionType::Custom => "Custom",
        };
        f.write_str(name)
    }
}

/// Visual layout variant. Which variants are meaningful depends on the
/// section type: Skills use `list` vs. anything else (chips), Languages use
/// `compact`, `pills`, `bar`, `dots` or `list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionLayout {
    List,
    Compact,
    Chips,
    Bullets,
    Bar,
    Dots,
    Pills,
}

/// How a Languages section arranges its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStyle {
    Multiline,
    Inline,
}

/// A titled, typed, ordered group of entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSection", into = "RawSection")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub section_type: SectionType,
    pub items: Vec<Entry>,
    pub layout: Option<SectionLayout>,
    pub display_style: Option<DisplayStyle>,
    pub visible: bool,
    pub page_break_before: bool,
    pub page_break_after: bool,
}

impl Section {
    pub fn entry(&self, entry_id: &str) -> Option<&Entry> {
        self.items.iter().find(|e| e.id == entry_id)
    }

    /// Skills sections render as a plain list only with the `list` layout.
    pub fn is_skill_list(&self) -> bool {
        self.layout == Some(SectionLayout::List)
    }

    pub fn is_inline(&self) -> bool {
        self.display_style == Some(DisplayStyle::Inline)
    }
}

/// Wire form of a section: entries stay untyped JSON until the section
/// type is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSection {
    id: String,
    title: String,
    #[serde(rename = "type")]
    section_type: SectionType,
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<SectionLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_style: Option<DisplayStyle>,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    page_break_before: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    page_break_after: bool,
}

fn default_true() -> bool {
    true
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl TryFrom<RawSection> for Section {
    type Error = String;

    fn try_from(raw: RawSection) -> Result<Self, Self::Error> {
        let items = raw
            .items
            .into_iter()
            .map(|v| Entry::from_value(raw.section_type, v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Section {
            id: raw.id,
            title: raw.title,
            section_type: raw.section_type,
            items,
            layout: raw.layout,
            display_style: raw.display_style,
            visible: raw.visible,
            page_break_before: raw.page_break_before,
            page_break_after: raw.page_break_after,
        })
    }
}

impl From<Section> for RawSection {
    fn from(section: Section) -> Self {
        RawSection {
            items: section.items.iter().map(Entry::to_value).collect(),
            id: section.id,
            title: section.title,
            section_type: section.section_type,
            layout: section.layout,
            display_style: section.display_style,
            visible: section.visible,
            page_break_before: section.page_break_before,
            page_break_after: section.page_break_after,
        }
    }
}

impl Document {
    /// An empty CV: no name, no details, no sections.
    pub fn empty() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            sections: Vec::new(),
        }
    }

    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    pub fn section_index(&self, section_id: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.id == section_id)
    }

    /// Sections that take part in rendering, in document order.
    pub fn visible_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.visible)
    }

    /// Check the id invariants: section ids unique in the document, entry
    /// ids unique within their section, personal-info ids unique. Entry
    /// shapes always match their section type by construction.
    pub fn validate(&self) -> Result<(), String> {
        let mut section_ids = HashSet::new();
        for section in &self.sections {
            if !section_ids.insert(section.id.as_str()) {
                return Err(format!("duplicate section id `{}`", section.id));
            }
            let mut entry_ids = HashSet::new();
            for entry in &section.items {
                if !entry_ids.insert(entry.id.as_str()) {
                    return Err(format!(
                        "duplicate entry id `{}` in section `{}`",
                        entry.id, section.title
                    ));
                }
                if entry.body.section_type() != section.section_type {
                    return Err(format!(
                        "entry `{}` does not match section type {}",
                        entry.id, section.section_type
                    ));
                }
            }
        }
        let mut detail_ids = HashSet::new();
        for item in &self.personal_info.details {
            if !detail_ids.insert(item.id.as_str()) {
                return Err(format!("duplicate personal info id `{}`", item.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn skills_section_json() -> Value {
        json!({
            "id": "s1",
            "title": "Skills",
            "type": "Skills",
            "visible": true,
            "layout": "chips",
            "items": [
                { "id": "k1", "skillName": "Rust", "level": "Expert", "category": "Languages" },
                { "id": "k2", "skillName": "Git" }
            ]
        })
    }

    #[test]
    fn section_decodes_typed_entries() {
        let section: Section = serde_json::from_value(skills_section_json()).unwrap();
        assert_eq!(section.section_type, SectionType::Skills);
        assert_eq!(section.layout, Some(SectionLayout::Chips));
        assert_eq!(section.items.len(), 2);
        assert!(section
            .items
            .iter()
            .all(|e| e.body.section_type() == SectionType::Skills));
        assert!(!section.page_break_after);
    }

    #[test]
    fn section_round_trips_through_json() {
        let section: Section = serde_json::from_value(skills_section_json()).unwrap();
        let back: Section = serde_json::from_value(serde_json::to_value(&section).unwrap()).unwrap();
        assert_eq!(section, back);
    }

    #[test]
    fn work_experience_type_name() {
        let json = json!({ "id": "w", "title": "Work", "type": "Work Experience", "items": [] });
        let section: Section = serde_json::from_value(json).unwrap();
        assert_eq!(section.section_type, SectionType::WorkExperience);
        assert!(section.visible, "visibility defaults to true");
    }

    #[test]
    fn validate_rejects_duplicate_section_ids() {
        let section: Section = serde_json::from_value(skills_section_json()).unwrap();
        let doc = Document {
            personal_info: PersonalInfo::default(),
            sections: vec![section.clone(), section],
        };
        assert!(doc.validate().unwrap_err().contains("duplicate section id"));
    }

    #[test]
    fn sample_document_is_valid() {
        let doc = Document::sample(&mut SequentialIds::default());
        doc.validate().unwrap();
        assert_eq!(doc.personal_info.name, "Jane Doe");
        assert_eq!(doc.visible_sections().count(), 4);
    }
}
