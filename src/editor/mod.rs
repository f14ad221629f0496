//! # Editor
//!
//! Every change to a CV goes through [`reduce`]: a pure function of the
//! current document and one [`Action`] that returns the next document.
//! The action set is closed, so the whole edit surface is visible in one
//! enum.
//!
//! Actions that name an id that doesn't exist return the state unchanged.
//! The UI should never produce them, but the reducer must not fail on them.

pub mod sort;

use serde::{Deserialize, Serialize};

use crate::model::*;
pub use sort::{SortDirection, SortKey};

/// Which top-level personal-info text field to set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PersonalInfoField {
    Name,
    JobTitle,
}

/// A partial update to a section. `None` leaves the field as it is. The
/// section type can't be changed, since its entries' shapes depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionPatch {
    pub title: Option<String>,
    pub layout: Option<SectionLayout>,
    pub display_style: Option<DisplayStyle>,
    pub visible: Option<bool>,
    pub page_break_before: Option<bool>,
    pub page_break_after: Option<bool>,
}

/// A partial update to a personal-info detail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailPatch {
    pub label: Option<String>,
    pub value: Option<String>,
}

/// Every edit the document model accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    LoadData(Document),
    UpdatePersonalInfo {
        field: PersonalInfoField,
        value: String,
    },
    AddPersonalInfoItem,
    DeletePersonalInfoItem {
        item_id: String,
    },
    UpdatePersonalInfoItem {
        item_id: String,
        patch: DetailPatch,
    },
    MovePersonalInfoItem {
        from: usize,
        to: usize,
    },
    AddSection {
        title: String,
        section_type: SectionType,
    },
    DeleteSection {
        section_id: String,
    },
    DuplicateSection {
        section_id: String,
    },
    UpdateSection {
        section_id: String,
        patch: SectionPatch,
    },
    MoveSection {
        from: usize,
        to: usize,
    },
    AddItem {
        section_id: String,
    },
    DeleteItem {
        section_id: String,
        item_id: String,
    },
    DuplicateItem {
        section_id: String,
        item_id: String,
    },
    /// Replace an entry's content. Ignored when the body's shape doesn't
    /// match the section type.
    UpdateItem {
        section_id: String,
        item_id: String,
        body: EntryBody,
    },
    MoveItem {
        section_id: String,
        from: usize,
        to: usize,
    },
    SortItems {
        section_id: String,
        key: SortKey,
        direction: SortDirection,
    },
}

/// Apply one action, returning the next document. `state` is never mutated.
pub fn reduce(state: &Document, action: Action, ids: &mut dyn IdGenerator) -> Document {
    let mut next = state.clone();
    match action {
        Action::LoadData(document) => return document,

        Action::UpdatePersonalInfo { field, value } => match field {
            PersonalInfoField::Name => next.personal_info.name = value,
            PersonalInfoField::JobTitle => next.personal_info.job_title = value,
        },

        Action::AddPersonalInfoItem => next.personal_info.details.push(PersonalInfoItem {
            id: ids.next_id(),
            label: "New Detail:".to_string(),
            value: "Your detail here".to_string(),
        }),

        Action::DeletePersonalInfoItem { item_id } => {
            next.personal_info.details.retain(|d| d.id != item_id);
        }

        Action::UpdatePersonalInfoItem { item_id, patch } => {
            if let Some(detail) = next.personal_info.details.iter_mut().find(|d| d.id == item_id) {
                if let Some(label) = patch.label {
                    detail.label = label;
                }
                if let Some(value) = patch.value {
                    detail.value = value;
                }
            }
        }

        Action::MovePersonalInfoItem { from, to } => {
            move_within(&mut next.personal_info.details, from, to);
        }

        Action::AddSection {
            title,
            section_type,
        } => {
            let display_style = (section_type == SectionType::Languages).then_some(DisplayStyle::Inline);
            next.sections.push(Section {
                id: ids.next_id(),
                title,
                section_type,
                items: vec![Entry::new(ids.next_id(), EntryBody::placeholder(section_type))],
                layout: Some(section_type.default_layout()),
                display_style,
                visible: true,
                page_break_before: false,
                page_break_after: false,
            });
        }

        Action::DeleteSection { section_id } => {
            next.sections.retain(|s| s.id != section_id);
        }

        Action::DuplicateSection { section_id } => {
            if let Some(index) = next.section_index(&section_id) {
                let original = &next.sections[index];
                let copy = Section {
                    id: ids.next_id(),
                    title: format!("{} (Copy)", original.title),
                    items: original
                        .items
                        .iter()
                        .map(|e| Entry::new(ids.next_id(), e.body.clone()))
                        .collect(),
                    ..original.clone()
                };
                next.sections.insert(index + 1, copy);
            }
        }

        Action::UpdateSection { section_id, patch } => {
            if let Some(section) = section_mut(&mut next, &section_id) {
                apply_section_patch(section, patch);
            }
        }

        Action::MoveSection { from, to } => move_within(&mut next.sections, from, to),

        Action::AddItem { section_id } => {
            if let Some(section) = section_mut(&mut next, &section_id) {
                let body = EntryBody::placeholder(section.section_type);
                section.items.push(Entry::new(ids.next_id(), body));
            }
        }

        Action::DeleteItem {
            section_id,
            item_id,
        } => {
            if let Some(section) = section_mut(&mut next, &section_id) {
                section.items.retain(|e| e.id != item_id);
            }
        }

        Action::DuplicateItem {
            section_id,
            item_id,
        } => {
            if let Some(section) = section_mut(&mut next, &section_id) {
                if let Some(index) = section.items.iter().position(|e| e.id == item_id) {
                    let copy = Entry::new(ids.next_id(), section.items[index].body.clone());
                    section.items.insert(index + 1, copy);
                }
            }
        }

        Action::UpdateItem {
            section_id,
            item_id,
            body,
        } => {
            if let Some(section) = section_mut(&mut next, &section_id) {
                if body.section_type() == section.section_type {
                    if let Some(entry) = section.items.iter_mut().find(|e| e.id == item_id) {
                        entry.body = body;
                    }
                }
            }
        }

        Action::MoveItem {
            section_id,
            from,
            to,
        } => {
            if let Some(section) = section_mut(&mut next, &section_id) {
                move_within(&mut section.items, from, to);
            }
        }

        Action::SortItems {
            section_id,
            key,
            direction,
        } => {
            if let Some(section) = section_mut(&mut next, &section_id) {
                sort::sort_entries(section.section_type, &mut section.items, key, direction);
            }
        }
    }
    next
}

fn section_mut<'a>(document: &'a mut Document, section_id: &str) -> Option<&'a mut Section> {
    document.sections.iter_mut().find(|s| s.id == section_id)
}

fn apply_section_patch(section: &mut Section, patch: SectionPatch) {
    if let Some(title) = patch.title {
        section.title = title;
    }
    if let Some(layout) = patch.layout {
        section.layout = Some(layout);
    }
    if let Some(display_style) = patch.display_style {
        section.display_style = Some(display_style);
    }
    if let Some(visible) = patch.visible {
        section.visible = visible;
    }
    if let Some(flag) = patch.page_break_before {
        section.page_break_before = flag;
    }
    if let Some(flag) = patch.page_break_after {
        section.page_break_after = flag;
    }
}

/// Remove the element at `from` and reinsert it at `to`. An out-of-range
/// `from` does nothing; `to` clamps to the end.
fn move_within<T>(items: &mut Vec<T>, from: usize, to: usize) {
    if from >= items.len() {
        return;
    }
    let moved = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, moved);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, SequentialIds) {
        let mut ids = SequentialIds::default();
        let doc = Document::sample(&mut ids);
        (doc, ids)
    }

    fn all_ids(doc: &Document) -> Vec<String> {
        let mut out: Vec<String> = doc.personal_info.details.iter().map(|d| d.id.clone()).collect();
        for section in &doc.sections {
            out.push(section.id.clone());
            out.extend(section.items.iter().map(|e| e.id.clone()));
        }
        out
    }

    #[test]
    fn add_section_uses_type_defaults() {
        let (doc, mut ids) = sample();
        let next = reduce(
            &doc,
            Action::AddSection {
                title: "Spoken".into(),
                section_type: SectionType::Languages,
            },
            &mut ids,
        );
        let added = next.sections.last().unwrap();
        assert_eq!(added.title, "Spoken");
        assert_eq!(added.layout, Some(SectionLayout::Compact));
        assert_eq!(added.display_style, Some(DisplayStyle::Inline));
        assert_eq!(added.items.len(), 1);
        assert!(added.visible);

        let skills = reduce(
            &doc,
            Action::AddSection {
                title: "Tools".into(),
                section_type: SectionType::Skills,
            },
            &mut ids,
        );
        assert_eq!(skills.sections.last().unwrap().layout, Some(SectionLayout::Chips));

        let custom = reduce(
            &doc,
            Action::AddSection {
                title: "Awards".into(),
                section_type: SectionType::Custom,
            },
            &mut ids,
        );
        let custom = custom.sections.last().unwrap();
        assert_eq!(custom.layout, Some(SectionLayout::Bullets));
        assert_eq!(custom.display_style, None);
    }

    #[test]
    fn duplicate_section_is_deep_copy_after_original() {
        let (doc, mut ids) = sample();
        let original = doc.sections[0].clone();
        let next = reduce(
            &doc,
            Action::DuplicateSection {
                section_id: original.id.clone(),
            },
            &mut ids,
        );
        assert_eq!(next.sections.len(), doc.sections.len() + 1);
        let copy = &next.sections[1];
        assert_eq!(copy.title, format!("{} (Copy)", original.title));
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.items.len(), original.items.len());
        for (a, b) in copy.items.iter().zip(&original.items) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.body, b.body);
        }

        // Every pre-existing id is untouched and every id is still unique.
        let before = all_ids(&doc);
        let after = all_ids(&next);
        assert!(before.iter().all(|id| after.contains(id)));
        let mut dedup = after.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), after.len());
        next.validate().unwrap();
    }

    #[test]
    fn duplicate_item_inserts_after_original() {
        let (doc, mut ids) = sample();
        let section = &doc.sections[0];
        let first = section.items[0].clone();
        let next = reduce(
            &doc,
            Action::DuplicateItem {
                section_id: section.id.clone(),
                item_id: first.id.clone(),
            },
            &mut ids,
        );
        let items = &next.sections[0].items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], first);
        assert_ne!(items[1].id, first.id);
        assert_eq!(items[1].body, first.body);
        assert_eq!(items[2], section.items[1]);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let (doc, mut ids) = sample();
        let actions = vec![
            Action::DeleteSection {
                section_id: "missing".into(),
            },
            Action::DuplicateSection {
                section_id: "missing".into(),
            },
            Action::AddItem {
                section_id: "missing".into(),
            },
            Action::DeleteItem {
                section_id: doc.sections[0].id.clone(),
                item_id: "missing".into(),
            },
            Action::DuplicateItem {
                section_id: doc.sections[0].id.clone(),
                item_id: "missing".into(),
            },
            Action::UpdatePersonalInfoItem {
                item_id: "missing".into(),
                patch: DetailPatch {
                    label: Some("x".into()),
                    value: None,
                },
            },
            Action::MoveItem {
                section_id: "missing".into(),
                from: 0,
                to: 1,
            },
            Action::SortItems {
                section_id: "missing".into(),
                key: SortKey::StartDate,
                direction: SortDirection::Asc,
            },
        ];
        for action in actions {
            assert_eq!(reduce(&doc, action.clone(), &mut ids), doc, "{action:?}");
        }
    }

    #[test]
    fn update_item_rejects_foreign_shape() {
        let (doc, mut ids) = sample();
        let section = &doc.sections[0];
        let next = reduce(
            &doc,
            Action::UpdateItem {
                section_id: section.id.clone(),
                item_id: section.items[0].id.clone(),
                body: EntryBody::placeholder(SectionType::Skills),
            },
            &mut ids,
        );
        assert_eq!(next, doc);

        let body = EntryBody::placeholder(SectionType::WorkExperience);
        let next = reduce(
            &doc,
            Action::UpdateItem {
                section_id: section.id.clone(),
                item_id: section.items[0].id.clone(),
                body: body.clone(),
            },
            &mut ids,
        );
        assert_eq!(next.sections[0].items[0].body, body);
        assert_eq!(next.sections[0].items[0].id, section.items[0].id);
    }

    #[test]
    fn moves_are_positional() {
        let (doc, mut ids) = sample();
        let next = reduce(&doc, Action::MoveSection { from: 0, to: 2 }, &mut ids);
        assert_eq!(next.sections[2].id, doc.sections[0].id);
        assert_eq!(next.sections[0].id, doc.sections[1].id);

        let next = reduce(&doc, Action::MovePersonalInfoItem { from: 4, to: 0 }, &mut ids);
        assert_eq!(next.personal_info.details[0].label, "Location:");

        let unchanged = reduce(&doc, Action::MoveSection { from: 99, to: 0 }, &mut ids);
        assert_eq!(unchanged, doc);

        let clamped = reduce(&doc, Action::MoveSection { from: 0, to: 99 }, &mut ids);
        assert_eq!(clamped.sections.last().unwrap().id, doc.sections[0].id);
    }

    #[test]
    fn section_patch_touches_only_given_fields() {
        let (doc, mut ids) = sample();
        let id = doc.sections[1].id.clone();
        let next = reduce(
            &doc,
            Action::UpdateSection {
                section_id: id,
                patch: SectionPatch {
                    page_break_after: Some(true),
                    ..Default::default()
                },
            },
            &mut ids,
        );
        assert!(next.sections[1].page_break_after);
        assert_eq!(next.sections[1].title, doc.sections[1].title);
        assert_eq!(next.sections[1].visible, doc.sections[1].visible);
    }

    #[test]
    fn personal_info_edits() {
        let (doc, mut ids) = sample();
        let next = reduce(
            &doc,
            Action::UpdatePersonalInfo {
                field: PersonalInfoField::JobTitle,
                value: "Staff Engineer".into(),
            },
            &mut ids,
        );
        assert_eq!(next.personal_info.job_title, "Staff Engineer");

        let next = reduce(&next, Action::AddPersonalInfoItem, &mut ids);
        let added = next.personal_info.details.last().unwrap().clone();
        assert_eq!(added.label, "New Detail:");

        let next = reduce(
            &next,
            Action::DeletePersonalInfoItem { item_id: added.id },
            &mut ids,
        );
        assert_eq!(next.personal_info.details.len(), doc.personal_info.details.len());
    }

    #[test]
    fn load_data_replaces_everything() {
        let (doc, mut ids) = sample();
        let next = reduce(&doc, Action::LoadData(Document::empty()), &mut ids);
        assert_eq!(next, Document::empty());
    }
}
