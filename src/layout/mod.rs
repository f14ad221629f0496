//! # Pagination
//!
//! Turns a document into block-to-page assignments.
//!
//! A layout pass flattens the document, asks a [`BlockMeasurer`] for block
//! heights and runs the greedy assigner in [`page_break`]. The
//! [`Paginator`] wraps that in the incremental behaviour an editor needs:
//!
//! - Passes are cached by (document revision, style, container width), so
//!   re-rendering an unchanged document doesn't re-measure.
//! - A pass whose measurement is suppressed (hidden container, missing
//!   host heights) keeps the last committed assignment, rebased onto the
//!   current block list. Before anything has committed every block sits on
//!   page 0 so there is always something to show.
//! - A new pass replaces the previous one completely; results are never
//!   merged.

pub mod page_break;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::flatten::{flatten, RenderBlock};
use crate::measure::{BlockMeasurer, HostMeasurements, MeasureRequest, Measurements};
use crate::model::Document;
use crate::style::CvStyle;

use self::page_break::{assign_pages, MeasuredBlock, OVERFLOW_TOLERANCE};

/// Block id to 0-based page index. Pages are contiguous from 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageAssignment {
    pages: BTreeMap<String, usize>,
    page_count: usize,
    /// Pages whose content is taller than the budget.
    overflowing_pages: Vec<usize>,
}

impl PageAssignment {
    /// Every block on page 0. Used until a measurement commits.
    pub fn single_page(blocks: &[RenderBlock]) -> Self {
        Self {
            pages: blocks.iter().map(|b| (b.id.clone(), 0)).collect(),
            page_count: 1,
            overflowing_pages: Vec::new(),
        }
    }

    /// Assign pages from measured heights. Blocks without a height count
    /// as zero.
    pub fn from_heights(blocks: &[RenderBlock], heights: &Measurements, budget: f64) -> Self {
        let measured: Vec<MeasuredBlock> = blocks
            .iter()
            .map(|b| MeasuredBlock::new(b.id.clone(), heights.get(&b.id).copied().unwrap_or(0.0), b.break_before))
            .collect();
        let assigned = assign_pages(&measured, budget);
        let page_count = assigned.values().max().map_or(1, |p| p + 1);

        let mut totals = vec![0.0; page_count];
        for block in &measured {
            if let Some(&page) = assigned.get(&block.id) {
                totals[page] += block.height;
            }
        }
        let overflowing_pages = totals
            .iter()
            .enumerate()
            .filter(|(_, total)| **total > budget + OVERFLOW_TOLERANCE)
            .map(|(page, _)| page)
            .collect();

        Self {
            pages: assigned.into_iter().collect(),
            page_count,
            overflowing_pages,
        }
    }

    pub fn page_of(&self, block_id: &str) -> Option<usize> {
        self.pages.get(block_id).copied()
    }

    /// Always at least 1.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn overflowing_pages(&self) -> &[usize] {
        &self.overflowing_pages
    }

    pub fn is_overflowing(&self, page: usize) -> bool {
        self.overflowing_pages.contains(&page)
    }

    /// Carry this assignment over to a changed block list. Known ids keep
    /// their page, new ids follow the block before them, and pages are
    /// renumbered to stay contiguous.
    pub fn rebase(&self, blocks: &[RenderBlock]) -> Self {
        let mut raw = Vec::with_capacity(blocks.len());
        let mut previous = 0;
        for block in blocks {
            let page = self.page_of(&block.id).unwrap_or(previous);
            raw.push((block.id.clone(), page));
            previous = page;
        }

        let used: BTreeSet<usize> = raw.iter().map(|(_, p)| *p).collect();
        let renumber: BTreeMap<usize, usize> = used.iter().enumerate().map(|(new, &old)| (old, new)).collect();
        let overflowing_pages = self
            .overflowing_pages
            .iter()
            .filter_map(|p| renumber.get(p).copied())
            .collect();

        Self {
            pages: raw
                .into_iter()
                .map(|(id, p)| (id, renumber.get(&p).copied().unwrap_or(0)))
                .collect(),
            page_count: used.len().max(1),
            overflowing_pages,
        }
    }
}

/// The result of one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPass {
    pub blocks: Vec<RenderBlock>,
    pub assignment: PageAssignment,
    /// `None` when the measurement was suppressed.
    pub heights: Option<Measurements>,
    /// True when the assignment was carried over rather than measured.
    pub stale: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct CacheKey {
    revision: u64,
    style: CvStyle,
    container_width: f64,
}

/// Incremental paginator over one measurer.
#[derive(Debug)]
pub struct Paginator<M> {
    measurer: M,
    committed: Option<PageAssignment>,
    cached: Option<(CacheKey, LayoutPass)>,
}

impl<M: BlockMeasurer> Paginator<M> {
    pub fn new(measurer: M) -> Self {
        Self {
            measurer,
            committed: None,
            cached: None,
        }
    }

    pub fn measurer(&self) -> &M {
        &self.measurer
    }

    /// Swap the measurer, e.g. when a host reports new heights. Drops the
    /// cached pass but keeps the committed assignment.
    pub fn set_measurer(&mut self, measurer: M) {
        self.measurer = measurer;
        self.cached = None;
    }

    /// The most recent pass, if any.
    pub fn last_pass(&self) -> Option<&LayoutPass> {
        self.cached.as_ref().map(|(_, pass)| pass)
    }

    /// Run a layout pass, or return the cached one when nothing changed.
    /// `revision` must change whenever `document` does.
    pub fn relayout(&mut self, document: &Document, revision: u64, style: &CvStyle, container_width: f64) -> &LayoutPass {
        let key = CacheKey {
            revision,
            style: style.clone(),
            container_width,
        };
        let reused = match self.cached.take() {
            Some((cached, pass)) if cached == key && !pass.stale => Some(pass),
            _ => None,
        };
        let pass = match reused {
            Some(pass) => pass,
            None => self.run_pass(document, style, container_width),
        };
        &self.cached.insert((key, pass)).1
    }

    fn run_pass(&mut self, document: &Document, style: &CvStyle, container_width: f64) -> LayoutPass {
        let blocks = flatten(document);
        let request = MeasureRequest {
            document,
            blocks: &blocks,
            style,
            container_width,
        };

        match self.measurer.measure(&request) {
            Some(heights) => {
                let budget = style.page_geometry().content_height();
                let assignment = PageAssignment::from_heights(&blocks, &heights, budget);
                log::debug!(
                    "layout pass: {} blocks on {} page(s), budget {budget}px",
                    blocks.len(),
                    assignment.page_count()
                );
                for page in assignment.overflowing_pages() {
                    log::warn!("page {} overflows its {budget}px budget", page + 1);
                }
                self.committed = Some(assignment.clone());
                LayoutPass {
                    blocks,
                    assignment,
                    heights: Some(heights),
                    stale: false,
                }
            }
            None => {
                let assignment = match &self.committed {
                    Some(committed) => committed.rebase(&blocks),
                    None => PageAssignment::single_page(&blocks),
                };
                log::debug!("measurement suppressed, keeping {} page(s)", assignment.page_count());
                LayoutPass {
                    blocks,
                    assignment,
                    heights: None,
                    stale: true,
                }
            }
        }
    }
}

impl Paginator<HostMeasurements> {
    /// Run a pass over a fresh set of host heights. Every call measures
    /// again; when the heights are unusable the last committed assignment
    /// is kept.
    pub fn relayout_measured(
        &mut self,
        document: &Document,
        revision: u64,
        style: &CvStyle,
        heights: HashMap<String, f64>,
        container_width: f64,
    ) -> &LayoutPass {
        self.set_measurer(HostMeasurements::new(heights));
        self.relayout(document, revision, style, container_width)
    }
}
