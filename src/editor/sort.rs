//! Entry sorting for `SortItems`.
//!
//! Every key maps an entry to a totally ordered [`SortValue`] so the sort
//! is a plain stable `sort_by_cached_key`. Ties keep document order in both
//! directions.

use std::cmp::Reverse;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::model::{parse_date, Entry, EntryBody, SectionType, PRESENT};
use crate::text::rich::strip_tags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    StartDate,
    Date,
    SkillName,
    ProjectName,
    Degree,
    JobTitle,
    Company,
    Name,
    Title,
    Language,
    DescriptionLength,
}

impl SortKey {
    /// Wire name of the entry field this key reads. `None` for the derived
    /// description length.
    pub fn field_name(self) -> Option<&'static str> {
        Some(match self {
            SortKey::StartDate => "startDate",
            SortKey::Date => "date",
            SortKey::SkillName => "skillName",
            SortKey::ProjectName => "projectName",
            SortKey::Degree => "degree",
            SortKey::JobTitle => "jobTitle",
            SortKey::Company => "company",
            SortKey::Name => "name",
            SortKey::Title => "title",
            SortKey::Language => "language",
            SortKey::DescriptionLength => return None,
        })
    }

    fn is_date(self) -> bool {
        matches!(self, SortKey::StartDate | SortKey::Date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Date order: unparseable < any real date < `Present`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum DateKey {
    Unknown,
    On(NaiveDate),
    Present,
}

/// One run of a natural-order string key. Punctuation and whitespace sort
/// before numbers, numbers before letters. Numbers compare by magnitude
/// (digit count, then digits).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Chunk {
    Punct(String),
    Number(usize, String),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Punct,
    Digit,
    Word,
}

impl CharClass {
    fn of(c: char) -> Self {
        if c.is_ascii_digit() {
            CharClass::Digit
        } else if c.is_alphanumeric() {
            CharClass::Word
        } else {
            CharClass::Punct
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Date(DateKey),
    Text(Vec<Chunk>),
    Length(usize),
}

/// Sort `items` in place. Sections whose entries lack the key's field are
/// left untouched.
pub fn sort_entries(
    section_type: SectionType,
    items: &mut [Entry],
    key: SortKey,
    direction: SortDirection,
) {
    if let Some(field) = key.field_name() {
        if items.first().and_then(|e| e.body.field(field)).is_none() {
            return;
        }
    }
    let value = |entry: &Entry| sort_value(section_type, &entry.body, key);
    match direction {
        SortDirection::Asc => items.sort_by_cached_key(value),
        SortDirection::Desc => items.sort_by_cached_key(|e| Reverse(value(e))),
    }
}

fn sort_value(section_type: SectionType, body: &EntryBody, key: SortKey) -> SortValue {
    match key.field_name() {
        None => SortValue::Length(description_length(section_type, body)),
        Some(field) => {
            let raw = body.field(field).unwrap_or_default();
            if key.is_date() {
                SortValue::Date(date_key(raw))
            } else {
                SortValue::Text(natural_key(raw))
            }
        }
    }
}

/// Visible character count of the entry's rich text. Certifications have no
/// description and measure their name instead.
fn description_length(section_type: SectionType, body: &EntryBody) -> usize {
    let text = match (section_type, body) {
        (SectionType::Certifications, EntryBody::Certification(c)) => c.name.as_str(),
        _ => body.description().unwrap_or_default(),
    };
    strip_tags(text).chars().count()
}

fn date_key(raw: &str) -> DateKey {
    let raw = raw.trim();
    if raw == PRESENT {
        return DateKey::Present;
    }
    parse_date(raw).map_or(DateKey::Unknown, DateKey::On)
}

/// Case- and accent-folded text split into number and text runs.
fn natural_key(raw: &str) -> Vec<Chunk> {
    let folded: String = raw
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut class = CharClass::Word;
    for c in folded.chars() {
        let next = CharClass::of(c);
        if next != class && !current.is_empty() {
            chunks.push(make_chunk(std::mem::take(&mut current), class));
        }
        class = next;
        current.push(c);
    }
    if !current.is_empty() {
        chunks.push(make_chunk(current, class));
    }
    chunks
}

fn make_chunk(run: String, class: CharClass) -> Chunk {
    match class {
        CharClass::Digit => {
            let trimmed = run.trim_start_matches('0');
            Chunk::Number(trimmed.len(), trimmed.to_string())
        }
        CharClass::Punct => Chunk::Punct(run),
        CharClass::Word => Chunk::Text(run),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CertificationEntry, ProjectEntry, SkillEntry, WorkExperienceEntry};
    use proptest::prelude::*;

    fn work(id: &str, start: &str) -> Entry {
        Entry::new(
            id,
            EntryBody::WorkExperience(WorkExperienceEntry {
                start_date: start.into(),
                ..Default::default()
            }),
        )
    }

    fn skill(id: &str, name: &str) -> Entry {
        Entry::new(
            id,
            EntryBody::Skill(SkillEntry {
                skill_name: name.into(),
                ..Default::default()
            }),
        )
    }

    fn ids(items: &[Entry]) -> Vec<&str> {
        items.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn dates_sort_chronologically_with_present_last() {
        let mut items = vec![
            work("a", "2020-01-01"),
            work("b", PRESENT),
            work("c", "2018-06"),
            work("d", "2022"),
        ];
        sort_entries(SectionType::WorkExperience, &mut items, SortKey::StartDate, SortDirection::Asc);
        assert_eq!(ids(&items), ["c", "a", "d", "b"]);

        sort_entries(SectionType::WorkExperience, &mut items, SortKey::StartDate, SortDirection::Desc);
        assert_eq!(ids(&items), ["b", "d", "a", "c"]);
    }

    #[test]
    fn strings_are_natural_and_insensitive() {
        let mut items = vec![
            skill("1", "item 10"),
            skill("2", "Item 2"),
            skill("3", "Écosse"),
            skill("4", "ecole"),
        ];
        sort_entries(SectionType::Skills, &mut items, SortKey::SkillName, SortDirection::Asc);
        assert_eq!(ids(&items), ["4", "3", "2", "1"]);
    }

    #[test]
    fn punctuation_sorts_before_digits_and_letters() {
        let mut items = vec![
            skill("letter", "ax"),
            skill("digit", "1x"),
            skill("dash", "-x"),
            skill("space", "a x"),
        ];
        sort_entries(SectionType::Skills, &mut items, SortKey::SkillName, SortDirection::Asc);
        assert_eq!(ids(&items), ["dash", "digit", "space", "letter"]);
    }

    #[test]
    fn unparseable_dates_sort_before_real_dates() {
        let mut items = vec![
            work("real", "2019-03-01"),
            work("garbage", "sometime"),
            work("now", PRESENT),
            work("blank", ""),
        ];
        sort_entries(SectionType::WorkExperience, &mut items, SortKey::StartDate, SortDirection::Asc);
        assert_eq!(ids(&items), ["garbage", "blank", "real", "now"]);

        sort_entries(SectionType::WorkExperience, &mut items, SortKey::StartDate, SortDirection::Desc);
        assert_eq!(ids(&items), ["now", "real", "garbage", "blank"]);
    }

    #[test]
    fn description_length_strips_tags() {
        let project = |id: &str, description: &str| {
            Entry::new(
                id,
                EntryBody::Project(ProjectEntry {
                    description: description.into(),
                    ..Default::default()
                }),
            )
        };
        let mut items = vec![
            project("long", "<p>abcdef</p>"),
            project("short", "<ul><li><strong>abc</strong></li></ul>"),
        ];
        sort_entries(SectionType::Projects, &mut items, SortKey::DescriptionLength, SortDirection::Asc);
        assert_eq!(ids(&items), ["short", "long"]);
    }

    #[test]
    fn certifications_measure_their_name() {
        let cert = |id: &str, name: &str| {
            Entry::new(
                id,
                EntryBody::Certification(CertificationEntry {
                    name: name.into(),
                    ..Default::default()
                }),
            )
        };
        let mut items = vec![cert("x", "Longer name"), cert("y", "AWS")];
        sort_entries(SectionType::Certifications, &mut items, SortKey::DescriptionLength, SortDirection::Asc);
        assert_eq!(ids(&items), ["y", "x"]);
    }

    #[test]
    fn key_not_on_shape_is_a_no_op() {
        let mut items = vec![skill("b", "B"), skill("a", "A")];
        sort_entries(SectionType::Skills, &mut items, SortKey::StartDate, SortDirection::Asc);
        assert_eq!(ids(&items), ["b", "a"]);
    }

    proptest! {
        #[test]
        fn sort_is_a_stable_permutation(names in proptest::collection::vec("[a-c]{0,2}", 0..12)) {
            let mut items: Vec<Entry> = names
                .iter()
                .enumerate()
                .map(|(i, n)| skill(&i.to_string(), n))
                .collect();
            sort_entries(SectionType::Skills, &mut items, SortKey::SkillName, SortDirection::Asc);

            prop_assert_eq!(items.len(), names.len());
            for pair in items.windows(2) {
                let a = pair[0].body.field("skillName").unwrap_or_default();
                let b = pair[1].body.field("skillName").unwrap_or_default();
                prop_assert!(a <= b);
                if a == b {
                    let ia: usize = pair[0].id.parse().unwrap();
                    let ib: usize = pair[1].id.parse().unwrap();
                    prop_assert!(ia < ib, "equal keys keep document order");
                }
            }
        }

        #[test]
        fn present_is_always_extreme(years in proptest::collection::vec(1950i32..2030, 1..8)) {
            let mut items: Vec<Entry> = years
                .iter()
                .enumerate()
                .map(|(i, y)| work(&i.to_string(), &format!("{y}-01-01")))
                .collect();
            items.push(work("now", PRESENT));
            sort_entries(SectionType::WorkExperience, &mut items, SortKey::StartDate, SortDirection::Asc);
            prop_assert_eq!(items.last().map(|e| e.id.as_str()), Some("now"));
            sort_entries(SectionType::WorkExperience, &mut items, SortKey::StartDate, SortDirection::Desc);
            prop_assert_eq!(items.first().map(|e| e.id.as_str()), Some("now"));
        }
    }
}
