//! # Page Renderer
//!
//! Groups the flat block list into pages for display.
//!
//! [`build_pages`] is the page model every output shares: the header only
//! on page 0, each section's title on the page it was assigned to, the
//! section's other blocks filtered to the page in their original order,
//! and no wrapper at all for a section with nothing on the page. Preview
//! decorations (a ruler and the end-of-content marker) are computed here
//! too; outputs for export ignore them.

pub mod html;

use serde::Serialize;

use crate::flatten::{BlockKind, RenderBlock};
use crate::layout::PageAssignment;
use crate::style::PageGeometry;

/// Distance between ruler ticks: half an inch at 96 dpi.
pub const TICK_SPACING: f64 = 48.0;
/// Every second tick marks a full inch.
pub const MAJOR_TICK_SPACING: f64 = 96.0;

/// All pages of a paginated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub geometry: PageGeometry,
    pub pages: Vec<RenderedPage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    /// 0-based.
    pub index: usize,
    pub header: Option<RenderBlock>,
    pub sections: Vec<PageSection>,
    /// Content on this page is taller than the budget.
    pub overflow: bool,
    pub decorations: Decorations,
}

/// The part of one section that lands on a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSection {
    pub section_id: String,
    /// Present only on the page the title was assigned to.
    pub title: Option<RenderBlock>,
    pub blocks: Vec<RenderBlock>,
}

/// Preview-only aids drawn over a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decorations {
    pub ticks: Vec<RulerTick>,
    /// Where the content budget ends, from the top of the page.
    pub end_marker_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RulerTick {
    pub y: f64,
    pub major: bool,
}

impl Decorations {
    pub fn for_geometry(geometry: &PageGeometry) -> Self {
        let ticks = (1..)
            .map(|n| f64::from(n) * TICK_SPACING)
            .take_while(|&y| y < geometry.height)
            .map(|y| RulerTick {
                y,
                major: y % MAJOR_TICK_SPACING == 0.0,
            })
            .collect();
        Self {
            ticks,
            end_marker_y: geometry.margin + geometry.content_height(),
        }
    }
}

/// Split `blocks` into pages according to `assignment`.
pub fn build_pages(blocks: &[RenderBlock], assignment: &PageAssignment, geometry: PageGeometry) -> PageView {
    let decorations = Decorations::for_geometry(&geometry);
    let mut pages: Vec<RenderedPage> = (0..assignment.page_count())
        .map(|index| RenderedPage {
            index,
            header: None,
            sections: Vec::new(),
            overflow: assignment.is_overflowing(index),
            decorations: decorations.clone(),
        })
        .collect();

    for block in blocks {
        let index = assignment.page_of(&block.id).unwrap_or(0);
        let Some(page) = pages.get_mut(index) else {
            log::warn!("block `{}` assigned to missing page {index}", block.id);
            continue;
        };

        let Some(section_id) = block.owner_section_id.as_deref() else {
            if index == 0 && block.kind == BlockKind::Header {
                page.header = Some(block.clone());
            }
            continue;
        };

        let section = match page.sections.iter_mut().position(|s| s.section_id == section_id) {
            Some(i) => &mut page.sections[i],
            None => {
                page.sections.push(PageSection {
                    section_id: section_id.to_string(),
                    title: None,
                    blocks: Vec::new(),
                });
                let last = page.sections.len() - 1;
                &mut page.sections[last]
            }
        };
        if block.kind == BlockKind::SectionHeader {
            section.title = Some(block.clone());
        } else {
            section.blocks.push(block.clone());
        }
    }

    PageView { geometry, pages }
}
