//! # Vitae
//!
//! A page-native résumé engine.
//!
//! A CV is edited as one structured document (personal details plus typed
//! sections of entries) and always shown as real, fixed-size pages. The
//! document is flattened into blocks that pagination may not split, each
//! block is measured at the page's content width, and a greedy pass assigns
//! blocks to pages. The same assignment drives the on-screen preview, the
//! HTML export and the PDF export, so what you see is what gets printed.
//!
//! ## Architecture
//!
//! ```text
//! Document (JSON / editor actions)
//!       ↓
//!   [editor]  : Pure reducer over the document
//!       ↓
//!   [flatten] : Unbreakable render blocks
//!       ↓
//!   [measure] : Block heights from font metrics (or host-supplied)
//!       ↓
//!   [layout]  : Greedy page assignment, cached per revision
//!       ↓
//!   [render]  : Page view → HTML        [pdf]: Page view → PDF bytes
//! ```
//!
//! [`session::Session`] ties these together with storage and debounced
//! auto-save for interactive hosts.

pub mod error;
pub mod model;
pub mod style;
pub mod editor;
pub mod flatten;
pub mod font;
pub mod text;
pub mod measure;
pub mod layout;
pub mod render;
pub mod pdf;
pub mod store;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use error::VitaeError;
pub use layout::{LayoutPass, PageAssignment, Paginator};
pub use model::Document;
pub use render::html::HtmlTarget;
pub use style::CvStyle;

use measure::MetricsMeasurer;
use pdf::{Metadata, PdfWriter};
use render::{build_pages, PageView};
use serde_json::Value;
use store::CvExport;

/// Paginate a document at its paper's width using font metrics.
pub fn paginate(document: &Document, style: &CvStyle) -> LayoutPass {
    let width = style.page_geometry().width;
    let mut paginator = Paginator::new(MetricsMeasurer::new());
    paginator.relayout(document, 0, style, width).clone()
}

/// Group a pass's blocks into pages.
pub fn page_view(pass: &LayoutPass, style: &CvStyle) -> PageView {
    build_pages(&pass.blocks, &pass.assignment, style.page_geometry())
}

/// Render a document to PDF bytes.
pub fn render_pdf(document: &Document, style: &CvStyle) -> Vec<u8> {
    let pass = paginate(document, style);
    let view = page_view(&pass, style);
    PdfWriter::new().write(document, style, &view, &Metadata::for_document(document))
}

/// Render a document to a standalone HTML page.
pub fn render_html(document: &Document, style: &CvStyle, target: HtmlTarget) -> String {
    let pass = paginate(document, style);
    let view = page_view(&pass, style);
    render::html::render_html(document, style, &view, target)
}

/// Read CV input: either an export bundle (`{name, data, style}`) or a bare
/// document, which gets the default style and a name taken from the
/// person's name.
pub fn read_cv(json: &str) -> Result<CvExport, VitaeError> {
    let value: Value = serde_json::from_str(json)?;
    if value.get("data").is_some() {
        return store::import_json(json);
    }

    let data: Document = serde_json::from_value(value)?;
    data.validate().map_err(VitaeError::InvalidDocument)?;
    let name = match data.personal_info.name.trim() {
        "" => session::UNTITLED.to_string(),
        name => name.to_string(),
    };
    Ok(CvExport {
        name,
        data,
        style: CvStyle::default(),
    })
}

/// Render JSON input (see [`read_cv`]) to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, VitaeError> {
    let cv = read_cv(json)?;
    Ok(render_pdf(&cv.data, &cv.style))
}
