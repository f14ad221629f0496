//! # Block Measurement
//!
//! Heights of render blocks at a given content width.
//!
//! Pagination only needs one number per block: its outer height in px,
//! vertical margins included. [`BlockMeasurer`] is the seam between the
//! paginator and whatever can produce those numbers. Two implementations
//! ship here:
//!
//! - [`MetricsMeasurer`] lays every block out with the standard-font
//!   metrics and the preview's box model. It is what the CLI and the PDF
//!   writer use, and its [`BlockBox`]es are what the PDF draws.
//! - [`HostMeasurements`] wraps heights reported by a host that rendered
//!   the blocks itself (a browser, through the wasm bindings).
//!
//! A measurer returns `None` when it has nothing usable yet: no width, a
//! block it never saw, or all-zero heights from a host that hasn't
//! painted. The paginator keeps its previous assignment in that case.

mod boxes;
mod flex;

use std::collections::HashMap;

use crate::flatten::RenderBlock;
use crate::model::Document;
use crate::style::CvStyle;

pub use boxes::{detail_href, external_href, language_level, BlockBox, BoxItem};

/// Everything a measurer may look at.
#[derive(Debug, Clone, Copy)]
pub struct MeasureRequest<'a> {
    pub document: &'a Document,
    pub blocks: &'a [RenderBlock],
    pub style: &'a CvStyle,
    /// Width of the page container in px, margins included.
    pub container_width: f64,
}

impl MeasureRequest<'_> {
    /// Width available to blocks: the container minus both page margins.
    pub fn content_width(&self) -> f64 {
        self.container_width - 2.0 * self.style.margin.px()
    }
}

/// Block id to outer height (px, rounded up).
pub type Measurements = HashMap<String, f64>;

/// Produces block heights for pagination.
pub trait BlockMeasurer {
    /// Heights for every block in `request.blocks`, or `None` when the
    /// measurement isn't usable.
    fn measure(&self, request: &MeasureRequest<'_>) -> Option<Measurements>;
}

/// Lays blocks out with the built-in font metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsMeasurer;

impl MetricsMeasurer {
    pub fn new() -> Self {
        Self
    }

    /// Lay out one block at `content_width`.
    pub fn layout_block(&self, document: &Document, block: &RenderBlock, style: &CvStyle, content_width: f64) -> BlockBox {
        boxes::BoxModel::new(style, content_width).layout(document, block)
    }
}

impl BlockMeasurer for MetricsMeasurer {
    fn measure(&self, request: &MeasureRequest<'_>) -> Option<Measurements> {
        let width = request.content_width();
        if width <= 0.0 || !width.is_finite() {
            log::debug!("skipping measurement, content width is {width}");
            return None;
        }
        let heights = request
            .blocks
            .iter()
            .map(|block| {
                let laid_out = self.layout_block(request.document, block, request.style, width);
                (block.id.clone(), laid_out.height.ceil())
            })
            .collect();
        Some(heights)
    }
}

/// Heights reported by an external renderer, keyed by block id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostMeasurements {
    heights: HashMap<String, f64>,
}

impl HostMeasurements {
    pub fn new(heights: HashMap<String, f64>) -> Self {
        Self { heights }
    }
}

impl BlockMeasurer for HostMeasurements {
    fn measure(&self, request: &MeasureRequest<'_>) -> Option<Measurements> {
        if request.container_width <= 0.0 {
            return None;
        }
        let mut out = HashMap::with_capacity(request.blocks.len());
        for block in request.blocks {
            let Some(&height) = self.heights.get(&block.id) else {
                log::debug!("host has no height for block `{}`", block.id);
                return None;
            };
            out.insert(block.id.clone(), height.max(0.0).ceil());
        }
        if !out.is_empty() && out.values().all(|&h| h == 0.0) {
            log::debug!("host reported only zero heights");
            return None;
        }
        Some(out)
    }
}
