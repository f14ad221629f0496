use std::collections::HashMap;

use wasm_bindgen::prelude::*;

use crate::flatten::flatten;
use crate::layout::Paginator;
use crate::measure::HostMeasurements;

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// The blocks a host must measure for `json`, in page order.
#[wasm_bindgen]
pub fn render_blocks(json: &str) -> Result<JsValue, JsValue> {
    let cv = crate::read_cv(json).map_err(js_error)?;
    serde_wasm_bindgen::to_value(&flatten(&cv.data)).map_err(js_error)
}

/// Pagination driven by heights the host measured (block id → px).
///
/// Keep one per preview: when the host can't measure (hidden tab, missing
/// or all-zero heights) the pages from the last good pass are kept.
#[wasm_bindgen]
pub struct MeasuredPaginator {
    inner: Paginator<HostMeasurements>,
    revision: u64,
}

#[wasm_bindgen]
impl MeasuredPaginator {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: Paginator::new(HostMeasurements::default()),
            revision: 0,
        }
    }

    /// Paginate `json` with `heights`. Returns the layout pass.
    pub fn paginate(&mut self, json: &str, heights: JsValue, container_width: f64) -> Result<JsValue, JsValue> {
        let cv = crate::read_cv(json).map_err(js_error)?;
        let heights: HashMap<String, f64> = serde_wasm_bindgen::from_value(heights).map_err(js_error)?;
        self.revision += 1;
        let pass = self
            .inner
            .relayout_measured(&cv.data, self.revision, &cv.style, heights, container_width);
        serde_wasm_bindgen::to_value(pass).map_err(js_error)
    }
}

impl Default for MeasuredPaginator {
    fn default() -> Self {
        Self::new()
    }
}

/// One-off pagination with host heights. Nothing is remembered between
/// calls, so unusable heights put every block on page 0; use
/// [`MeasuredPaginator`] for a live preview.
#[wasm_bindgen]
pub fn paginate_measured(json: &str, heights: JsValue, container_width: f64) -> Result<JsValue, JsValue> {
    MeasuredPaginator::new().paginate(json, heights, container_width)
}

#[wasm_bindgen]
pub fn render_pdf(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::render_json(json).map_err(js_error)
}
