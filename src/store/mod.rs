//! # Persistence and Exchange
//!
//! Saved CVs, the work-in-progress snapshot, and JSON import/export.
//!
//! Storage is a flat key/value space of JSON strings behind the
//! [`Storage`] trait. Two fixed keys are used: the saved collection under
//! [`SAVED_CVS_KEY`] and the auto-saved working copy under [`WIP_KEY`].
//! Reads never fail the caller: a missing key, a backend error or
//! malformed JSON all come back as "nothing saved", with a warning logged.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VitaeError;
use crate::model::Document;
use crate::style::CvStyle;

pub const SAVED_CVS_KEY: &str = "cv-builder-app-data";
pub const WIP_KEY: &str = "cv-builder-app-wip";

/// A key/value store for JSON strings.
pub trait Storage {
    fn read(&self, key: &str) -> Result<Option<String>, VitaeError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), VitaeError>;
}

/// One `<key>.json` file per key in a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, VitaeError> {
        match fs::read_to_string(self.path(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), VitaeError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path(key), value)
            .map_err(|e| VitaeError::StorageError(format!("writing `{key}` failed: {e}")))
    }
}

/// In-process storage, for tests and hosts that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, VitaeError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), VitaeError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A named CV in the saved collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedCv {
    pub id: String,
    pub name: String,
    pub data: Document,
    #[serde(default)]
    pub style: CvStyle,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_modified: i64,
}

/// The auto-saved working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkInProgress {
    pub name: String,
    pub data: Document,
    #[serde(default)]
    pub style: CvStyle,
    /// The saved CV this copy was loaded from, if any.
    #[serde(rename = "activeCVId", default)]
    pub active_cv_id: Option<String>,
}

fn read_json<T: for<'de> Deserialize<'de>>(storage: &dyn Storage, key: &str) -> Option<T> {
    let text = match storage.read(key) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("could not read `{key}`: {e}");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring malformed `{key}`: {e}");
            None
        }
    }
}

/// The saved collection; empty when nothing usable is stored.
pub fn load_saved(storage: &dyn Storage) -> Vec<SavedCv> {
    read_json(storage, SAVED_CVS_KEY).unwrap_or_default()
}

pub fn store_saved(storage: &mut dyn Storage, cvs: &[SavedCv]) -> Result<(), VitaeError> {
    let json = serde_json::to_string(cvs)?;
    storage.write(SAVED_CVS_KEY, &json)
}

pub fn load_wip(storage: &dyn Storage) -> Option<WorkInProgress> {
    read_json(storage, WIP_KEY)
}

pub fn store_wip(storage: &mut dyn Storage, wip: &WorkInProgress) -> Result<(), VitaeError> {
    let json = serde_json::to_string(wip)?;
    storage.write(WIP_KEY, &json)
}

/// The JSON exchange format: `{name, data, style}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvExport {
    pub name: String,
    pub data: Document,
    pub style: CvStyle,
}

/// Pretty-printed export bundle.
pub fn export_json(name: &str, document: &Document, style: &CvStyle) -> Result<String, VitaeError> {
    let bundle = CvExport {
        name: name.to_string(),
        data: document.clone(),
        style: style.clone(),
    };
    Ok(serde_json::to_string_pretty(&bundle)?)
}

/// Read an export bundle. All three fields must be present and the name
/// non-empty; the style is merged over the defaults. Nothing is applied
/// anywhere; the caller swaps the result in only on `Ok`.
pub fn import_json(text: &str) -> Result<CvExport, VitaeError> {
    let value: Value = serde_json::from_str(text).map_err(|e| VitaeError::ImportError(format!("not valid JSON ({e})")))?;
    let Value::Object(mut fields) = value else {
        return Err(VitaeError::ImportError("expected a JSON object".to_string()));
    };

    let mut take = |field: &str| {
        fields
            .remove(field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| VitaeError::ImportError(format!("missing field `{field}`")))
    };
    let name = take("name")?;
    let data = take("data")?;
    let style = take("style")?;

    let name = match name {
        Value::String(name) if !name.trim().is_empty() => name,
        _ => return Err(VitaeError::ImportError("`name` must be a non-empty string".to_string())),
    };
    let data: Document =
        serde_json::from_value(data).map_err(|e| VitaeError::ImportError(format!("invalid `data`: {e}")))?;
    data.validate().map_err(VitaeError::ImportError)?;
    let style: CvStyle =
        serde_json::from_value(style).map_err(|e| VitaeError::ImportError(format!("invalid `style`: {e}")))?;

    Ok(CvExport { name, data, style })
}

/// A file-name-safe version of a CV name: ASCII letters and digits
/// lowercased, everything else `_`, `cv` when empty.
pub fn safe_file_name(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if safe.is_empty() {
        "cv".to_string()
    } else {
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SequentialIds;
    use crate::style::FontSize;

    fn sample() -> Document {
        Document::sample(&mut SequentialIds::default())
    }

    #[test]
    fn export_then_import_is_identical() {
        let mut style = CvStyle::default();
        style.font_size = FontSize::Lg;
        style.accent_color = "#ff0000".into();
        let document = sample();
        let json = export_json("My CV", &document, &style).unwrap();
        let bundle = import_json(&json).unwrap();
        assert_eq!(bundle.name, "My CV");
        assert_eq!(bundle.data, document);
        assert_eq!(bundle.style, style);
    }

    #[test]
    fn import_requires_every_field() {
        let document = serde_json::to_value(sample()).unwrap();
        let missing_style = serde_json::json!({ "name": "x", "data": document }).to_string();
        let err = import_json(&missing_style).unwrap_err();
        assert!(matches!(err, VitaeError::ImportError(_)));
        assert!(err.to_string().contains("style"));

        let empty_name = serde_json::json!({ "name": "  ", "data": document, "style": {} }).to_string();
        assert!(import_json(&empty_name).is_err());
        assert!(import_json("[1, 2]").is_err());
        assert!(import_json("{ not json").is_err());
    }

    #[test]
    fn imported_style_fills_new_fields_from_defaults() {
        let document = serde_json::to_value(sample()).unwrap();
        let json = serde_json::json!({
            "name": "Old file",
            "data": document,
            "style": { "accentColor": "#123456" }
        })
        .to_string();
        let bundle = import_json(&json).unwrap();
        assert_eq!(bundle.style.accent_color, "#123456");
        assert_eq!(bundle.style.paper_size, CvStyle::default().paper_size);
        assert_eq!(bundle.style.personal_info_columns, 2);
    }

    #[test]
    fn import_rejects_duplicate_ids() {
        let mut document = sample();
        let copy = document.sections[0].clone();
        document.sections.push(copy);
        let json = export_json("dup", &document, &CvStyle::default()).unwrap();
        assert!(matches!(import_json(&json), Err(VitaeError::ImportError(_))));
    }

    #[test]
    fn malformed_storage_reads_as_empty() {
        let mut storage = MemoryStorage::new();
        storage.write(SAVED_CVS_KEY, "{ broken").unwrap();
        storage.write(WIP_KEY, "42").unwrap();
        assert!(load_saved(&storage).is_empty());
        assert!(load_wip(&storage).is_none());
    }

    #[test]
    fn file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path().join("store"));
        assert!(load_wip(&storage).is_none());

        let wip = WorkInProgress {
            name: "Draft".into(),
            data: sample(),
            style: CvStyle::default(),
            active_cv_id: Some("abc".into()),
        };
        store_wip(&mut storage, &wip).unwrap();
        assert!(dir.path().join("store").join("cv-builder-app-wip.json").exists());
        assert_eq!(load_wip(&storage), Some(wip));

        let raw = storage.read(WIP_KEY).unwrap().unwrap();
        assert!(raw.contains("\"activeCVId\":\"abc\""));
    }

    #[test]
    fn saved_collection_round_trip() {
        let mut storage = MemoryStorage::new();
        let cvs = vec![SavedCv {
            id: "1".into(),
            name: "Main".into(),
            data: sample(),
            style: CvStyle::default(),
            last_modified: 1_700_000_000_000,
        }];
        store_saved(&mut storage, &cvs).unwrap();
        assert_eq!(load_saved(&storage), cvs);
        assert!(storage.read(SAVED_CVS_KEY).unwrap().unwrap().contains("lastModified"));
    }

    #[test]
    fn file_names() {
        assert_eq!(safe_file_name("Jane Doe CV"), "jane_doe_cv");
        assert_eq!(safe_file_name(""), "cv");
    }
}
