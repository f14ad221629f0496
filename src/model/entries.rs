//! Typed entry records.
//!
//! Each section type has its own entry shape. On the wire an entry is a flat
//! JSON object with an `id` and the shape's fields, with no tag: the owning
//! section's `type` decides which shape to decode. In memory the shape is an
//! explicit [`EntryBody`] variant, so every consumer matches on it instead of
//! probing fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::SectionType;

/// Sentinel end date meaning "ongoing".
pub const PRESENT: &str = "Present";

/// Accepts `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, and RFC 3339 timestamps.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    if raw.len() == 4 {
        if let Ok(year) = raw.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1);
        }
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkExperienceEntry {
    pub job_title: String,
    pub job_title_link: String,
    pub job_title_extra: String,
    pub company: String,
    pub company_link: String,
    pub company_extra: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    /// Rich text (HTML fragment).
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub degree: String,
    pub degree_link: String,
    pub degree_extra: String,
    pub institution: String,
    pub institution_link: String,
    pub institution_extra: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    /// Rich text (HTML fragment).
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillEntry {
    pub skill_name: String,
    /// Beginner / Intermediate / Advanced / Expert, or empty.
    pub level: String,
    /// Blank means uncategorized.
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub project_name: String,
    pub project_name_link: String,
    pub project_name_extra: String,
    pub link: String,
    /// Rich text (HTML fragment).
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    pub name: String,
    pub name_link: String,
    pub name_extra: String,
    pub issuer: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub language: String,
    pub level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomEntry {
    pub title: String,
    pub title_link: String,
    pub title_extra: String,
    /// Rich text (HTML fragment).
    pub description: String,
}

/// The shape-specific part of an entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntryBody {
    WorkExperience(WorkExperienceEntry),
    Education(EducationEntry),
    Skill(SkillEntry),
    Project(ProjectEntry),
    Certification(CertificationEntry),
    Language(LanguageEntry),
    Custom(CustomEntry),
}

impl EntryBody {
    /// The section type this body belongs to.
    pub fn section_type(&self) -> SectionType {
        match self {
            EntryBody::WorkExperience(_) => SectionType::WorkExperience,
            EntryBody::Education(_) => SectionType::Education,
            EntryBody::Skill(_) => SectionType::Skills,
            EntryBody::Project(_) => SectionType::Projects,
            EntryBody::Certification(_) => SectionType::Certifications,
            EntryBody::Language(_) => SectionType::Languages,
            EntryBody::Custom(_) => SectionType::Custom,
        }
    }

    /// Decode a flat JSON object as the shape for `section_type`.
    pub fn from_value(section_type: SectionType, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match section_type {
            SectionType::WorkExperience => EntryBody::WorkExperience(serde_json::from_value(value)?),
            SectionType::Education => EntryBody::Education(serde_json::from_value(value)?),
            SectionType::Skills => EntryBody::Skill(serde_json::from_value(value)?),
            SectionType::Projects => EntryBody::Project(serde_json::from_value(value)?),
            SectionType::Certifications => EntryBody::Certification(serde_json::from_value(value)?),
            SectionType::Languages => EntryBody::Language(serde_json::from_value(value)?),
            SectionType::Custom => EntryBody::Custom(serde_json::from_value(value)?),
        })
    }

    /// The placeholder content a freshly added entry starts with.
    pub fn placeholder(section_type: SectionType) -> Self {
        match section_type {
            SectionType::WorkExperience => EntryBody::WorkExperience(WorkExperienceEntry {
                job_title: "New Job".into(),
                company: "Company".into(),
                location: "City, State".into(),
                start_date: "2024-01-01".into(),
                end_date: PRESENT.into(),
                description: "<ul><li>Describe your role and achievements.</li></ul>".into(),
                ..Default::default()
            }),
            SectionType::Education => EntryBody::Education(EducationEntry {
                degree: "New Degree".into(),
                institution: "Institution".into(),
                location: "City, State".into(),
                start_date: "2020-01-01".into(),
                end_date: "2024-01-01".into(),
                description: "<p>Additional details about your education.</p>".into(),
                ..Default::default()
            }),
            SectionType::Skills => EntryBody::Skill(SkillEntry {
                skill_name: "New Skill".into(),
                ..Default::default()
            }),
            SectionType::Projects => EntryBody::Project(ProjectEntry {
                project_name: "New Project".into(),
                description: "<p>A brief description of the project.</p>".into(),
                ..Default::default()
            }),
            SectionType::Certifications => EntryBody::Certification(CertificationEntry {
                name: "New Certification".into(),
                issuer: "Issuer".into(),
                date: "2024-01-01".into(),
                ..Default::default()
            }),
            SectionType::Languages => EntryBody::Language(LanguageEntry {
                language: "New Language".into(),
                level: "Intermediate".into(),
            }),
            SectionType::Custom => EntryBody::Custom(CustomEntry {
                title: "New Entry".into(),
                description: "<p>Description of this custom entry.</p>".into(),
                ..Default::default()
            }),
        }
    }

    /// Look up a string field by its wire (camelCase) name.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match (self, name) {
            (EntryBody::WorkExperience(e), "jobTitle") => &e.job_title,
            (EntryBody::WorkExperience(e), "company") => &e.company,
            (EntryBody::WorkExperience(e), "location") => &e.location,
            (EntryBody::WorkExperience(e), "startDate") => &e.start_date,
            (EntryBody::WorkExperience(e), "endDate") => &e.end_date,
            (EntryBody::WorkExperience(e), "description") => &e.description,
            (EntryBody::Education(e), "degree") => &e.degree,
            (EntryBody::Education(e), "institution") => &e.institution,
            (EntryBody::Education(e), "location") => &e.location,
            (EntryBody::Education(e), "startDate") => &e.start_date,
            (EntryBody::Education(e), "endDate") => &e.end_date,
            (EntryBody::Education(e), "description") => &e.description,
            (EntryBody::Skill(e), "skillName") => &e.skill_name,
            (EntryBody::Skill(e), "level") => &e.level,
            (EntryBody::Skill(e), "category") => &e.category,
            (EntryBody::Skill(e), "description") => &e.description,
            (EntryBody::Project(e), "projectName") => &e.project_name,
            (EntryBody::Project(e), "link") => &e.link,
            (EntryBody::Project(e), "description") => &e.description,
            (EntryBody::Certification(e), "name") => &e.name,
            (EntryBody::Certification(e), "issuer") => &e.issuer,
            (EntryBody::Certification(e), "date") => &e.date,
            (EntryBody::Language(e), "language") => &e.language,
            (EntryBody::Language(e), "level") => &e.level,
            (EntryBody::Custom(e), "title") => &e.title,
            (EntryBody::Custom(e), "description") => &e.description,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// The rich-text body, for shapes that have one.
    pub fn description(&self) -> Option<&str> {
        self.field("description")
    }
}

/// One entry inside a section.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: String,
    pub body: EntryBody,
}

impl Entry {
    pub fn new(id: impl Into<String>, body: EntryBody) -> Self {
        Self { id: id.into(), body }
    }

    /// Encode as the flat wire object.
    pub fn to_value(&self) -> Value {
        let mut object = match serde_json::to_value(&self.body) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        object.insert("id".to_string(), Value::String(self.id.clone()));
        Value::Object(object)
    }

    /// Decode a flat wire object for a section of `section_type`.
    pub fn from_value(section_type: SectionType, value: Value) -> Result<Self, String> {
        let id = match value.get("id") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(format!("an entry in a {section_type} section has no id")),
        };
        let body = EntryBody::from_value(section_type, value).map_err(|e| e.to_string())?;
        Ok(Self { id, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_by_section_type() {
        let value = json!({ "id": "a1", "skillName": "Rust", "category": "Languages" });
        let entry = Entry::from_value(SectionType::Skills, value).unwrap();
        assert_eq!(entry.id, "a1");
        match &entry.body {
            EntryBody::Skill(skill) => {
                assert_eq!(skill.skill_name, "Rust");
                assert_eq!(skill.level, "");
            }
            other => panic!("expected a skill, got {other:?}"),
        }
    }

    #[test]
    fn encodes_flat_with_id() {
        let entry = Entry::new("x", EntryBody::placeholder(SectionType::Languages));
        let value = entry.to_value();
        assert_eq!(value["id"], "x");
        assert_eq!(value["language"], "New Language");
        assert!(value.get("Language").is_none());
    }

    #[test]
    fn missing_id_is_rejected() {
        let err = Entry::from_value(SectionType::Custom, json!({ "title": "t" })).unwrap_err();
        assert!(err.contains("no id"));
    }

    #[test]
    fn field_lookup_is_shape_aware() {
        let body = EntryBody::placeholder(SectionType::Certifications);
        assert_eq!(body.field("name"), Some("New Certification"));
        assert_eq!(body.field("description"), None);
        assert_eq!(body.section_type(), SectionType::Certifications);
    }
}
