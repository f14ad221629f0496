//! # Editing Session
//!
//! The single owned CV being edited, and everything around it: dispatch
//! through the reducer, debounced auto-save of the working copy, the saved
//! collection, JSON import/export and cached pagination.
//!
//! Time is an input. Every mutating call takes `now`, and hosts call
//! [`Session::tick`] to let a due auto-save run, so there are no timers or
//! threads here.

pub mod debounce;

use std::time::{Duration, Instant};

use crate::editor::{reduce, Action};
use crate::error::VitaeError;
use crate::layout::{LayoutPass, Paginator};
use crate::measure::MetricsMeasurer;
use crate::model::{Document, IdGenerator};
use crate::store::{self, CvExport, SavedCv, Storage, WorkInProgress};
use crate::style::CvStyle;

use self::debounce::Debouncer;

/// Quiet period after the last edit before the working copy is written.
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(500);

pub const UNTITLED: &str = "Untitled CV";

pub struct Session {
    document: Document,
    style: CvStyle,
    name: String,
    active_cv_id: Option<String>,
    revision: u64,
    saved: Vec<SavedCv>,
    storage: Box<dyn Storage>,
    ids: Box<dyn IdGenerator>,
    autosave: Debouncer,
    paginator: Paginator<MetricsMeasurer>,
}

impl Session {
    /// Open a session: the working copy if one was auto-saved, else the
    /// most recently modified saved CV, else the starter CV.
    pub fn open(storage: Box<dyn Storage>, mut ids: Box<dyn IdGenerator>) -> Self {
        let saved = store::load_saved(storage.as_ref());
        let (document, style, name, active_cv_id) = match store::load_wip(storage.as_ref()) {
            Some(wip) => (wip.data, wip.style, wip.name, wip.active_cv_id),
            None => match saved.iter().max_by_key(|cv| cv.last_modified) {
                Some(cv) => (cv.data.clone(), cv.style.clone(), cv.name.clone(), Some(cv.id.clone())),
                None => (Document::sample(ids.as_mut()), CvStyle::default(), UNTITLED.to_string(), None),
            },
        };
        log::debug!("opened session `{name}` with {} saved CV(s)", saved.len());

        Self {
            document,
            style,
            name,
            active_cv_id,
            revision: 0,
            saved,
            storage,
            ids,
            autosave: Debouncer::new(AUTOSAVE_DELAY),
            paginator: Paginator::new(MetricsMeasurer::new()),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn style(&self) -> &CvStyle {
        &self.style
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn active_cv_id(&self) -> Option<&str> {
        self.active_cv_id.as_deref()
    }

    /// Bumped on every document change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn saved(&self) -> &[SavedCv] {
        &self.saved
    }

    /// An auto-save is waiting for its quiet period.
    pub fn has_pending_autosave(&self) -> bool {
        self.autosave.is_pending()
    }

    fn changed(&mut self, now: Instant) {
        self.autosave.touch(now);
    }

    fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.revision += 1;
    }

    /// Apply one editor action.
    pub fn dispatch(&mut self, action: Action, now: Instant) {
        let next = reduce(&self.document, action, self.ids.as_mut());
        if next != self.document {
            self.replace_document(next);
        }
        self.changed(now);
    }

    pub fn set_style(&mut self, style: CvStyle, now: Instant) {
        self.style = style;
        self.changed(now);
    }

    pub fn rename(&mut self, name: impl Into<String>, now: Instant) {
        self.name = name.into();
        self.changed(now);
    }

    /// Write the working copy if its quiet period has passed. Returns
    /// whether a write happened. A failed write stays pending and is
    /// retried one quiet period later.
    pub fn tick(&mut self, now: Instant) -> Result<bool, VitaeError> {
        if !self.autosave.fire(now) {
            return Ok(false);
        }
        if let Err(e) = self.write_wip() {
            // Keep the burst pending so a later tick retries.
            self.autosave.touch(now);
            log::warn!("auto-save failed, retrying in {:?}: {e}", self.autosave.delay());
            return Err(e);
        }
        Ok(true)
    }

    fn write_wip(&mut self) -> Result<(), VitaeError> {
        let wip = WorkInProgress {
            name: self.name.clone(),
            data: self.document.clone(),
            style: self.style.clone(),
            active_cv_id: self.active_cv_id.clone(),
        };
        store::store_wip(self.storage.as_mut(), &wip)?;
        log::debug!("auto-saved `{}` (revision {})", self.name, self.revision);
        Ok(())
    }

    /// Save the current CV into the collection, replacing the entry it was
    /// loaded from. The name must not be blank.
    pub fn save(&mut self, now: Instant) -> Result<&SavedCv, VitaeError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(VitaeError::InvalidDocument("please provide a name for your CV".to_string()));
        }
        let id = match &self.active_cv_id {
            Some(id) => id.clone(),
            None => self.ids.next_id(),
        };
        let cv = SavedCv {
            id: id.clone(),
            name: name.to_string(),
            data: self.document.clone(),
            style: self.style.clone(),
            last_modified: chrono::Utc::now().timestamp_millis(),
        };

        let mut saved = self.saved.clone();
        let index = match saved.iter().position(|c| c.id == id) {
            Some(i) => {
                saved[i] = cv;
                i
            }
            None => {
                saved.push(cv);
                saved.len() - 1
            }
        };
        store::store_saved(self.storage.as_mut(), &saved)?;
        self.saved = saved;
        self.active_cv_id = Some(id);
        self.changed(now);
        log::info!("saved CV `{}`", self.saved[index].name);
        Ok(&self.saved[index])
    }

    /// Switch to a saved CV. Unknown ids are ignored; returns whether the
    /// switch happened.
    pub fn load(&mut self, id: &str, now: Instant) -> bool {
        let Some(cv) = self.saved.iter().find(|c| c.id == id).cloned() else {
            return false;
        };
        let next = reduce(&self.document, Action::LoadData(cv.data), self.ids.as_mut());
        self.replace_document(next);
        self.style = cv.style;
        self.name = cv.name;
        self.active_cv_id = Some(cv.id);
        self.changed(now);
        true
    }

    /// Remove a saved CV. Deleting the active one starts a new CV.
    pub fn delete(&mut self, id: &str, now: Instant) -> Result<(), VitaeError> {
        let saved: Vec<SavedCv> = self.saved.iter().filter(|c| c.id != id).cloned().collect();
        store::store_saved(self.storage.as_mut(), &saved)?;
        self.saved = saved;
        if self.active_cv_id.as_deref() == Some(id) {
            self.create_new(now);
        }
        Ok(())
    }

    /// Start over from the starter CV and default style.
    pub fn create_new(&mut self, now: Instant) {
        let sample = Document::sample(self.ids.as_mut());
        self.replace_document(sample);
        self.style = CvStyle::default();
        self.name = UNTITLED.to_string();
        self.active_cv_id = None;
        self.changed(now);
    }

    /// Replace the session with an imported bundle. On error nothing
    /// changes. An imported CV is unsaved.
    pub fn import(&mut self, json: &str, now: Instant) -> Result<(), VitaeError> {
        let CvExport { name, data, style } = store::import_json(json)?;
        self.replace_document(data);
        self.style = style;
        self.name = name;
        self.active_cv_id = None;
        self.changed(now);
        log::info!("imported CV `{}`", self.name);
        Ok(())
    }

    pub fn export(&self) -> Result<String, VitaeError> {
        store::export_json(&self.name, &self.document, &self.style)
    }

    /// Paginate the current CV for a container `container_width` px wide.
    pub fn layout(&mut self, container_width: f64) -> &LayoutPass {
        self.paginator
            .relayout(&self.document, self.revision, &self.style, container_width)
    }
}
