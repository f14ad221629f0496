//! # Page Break Decisions
//!
//! Greedy assignment of measured blocks to pages.
//!
//! Blocks are never split. A block goes on the current page unless the
//! author asked for a break before it or it would push the page past its
//! budget; either way the current page must already hold something, so a
//! page is never left empty and a block taller than a whole page simply
//! sits alone and overflows.

use std::collections::HashMap;

/// Slack allowed before a block counts as overflowing, absorbing sub-pixel
/// rounding in the measured heights.
pub const OVERFLOW_TOLERANCE: f64 = 1.0;

/// One block as the assigner sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredBlock {
    pub id: String,
    pub height: f64,
    pub break_before: bool,
}

impl MeasuredBlock {
    pub fn new(id: impl Into<String>, height: f64, break_before: bool) -> Self {
        Self {
            id: id.into(),
            height,
            break_before,
        }
    }
}

/// Assign each block a 0-based page index in a single pass.
///
/// The explicit break is checked first. When it fires the page is empty,
/// so the capacity check can't also fire for the same block.
pub fn assign_pages(blocks: &[MeasuredBlock], budget: f64) -> HashMap<String, usize> {
    let mut pages = HashMap::with_capacity(blocks.len());
    let mut current_page = 0usize;
    let mut current_height = 0.0;

    for block in blocks {
        if block.break_before && current_height > 0.0 {
            current_page += 1;
            current_height = 0.0;
        }
        if current_height > 0.0 && current_height + block.height > budget + OVERFLOW_TOLERANCE {
            current_page += 1;
            current_height = 0.0;
        }
        pages.insert(block.id.clone(), current_page);
        current_height += block.height;
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn block(id: &str, height: f64) -> MeasuredBlock {
        MeasuredBlock::new(id, height, false)
    }

    #[test]
    fn everything_fits() {
        let pages = assign_pages(&[block("a", 20.0), block("b", 30.0), block("c", 40.0)], 100.0);
        assert!(pages.values().all(|&p| p == 0));
    }

    #[test]
    fn header_and_five_items() {
        let mut blocks = vec![block("header", 100.0)];
        blocks.extend((1..=5).map(|i| block(&format!("item{i}"), 150.0)));
        let pages = assign_pages(&blocks, 700.0);
        for i in 1..=4 {
            assert_eq!(pages[&format!("item{i}")], 0);
        }
        assert_eq!(pages["item5"], 1);
    }

    #[test]
    fn tolerance_absorbs_a_pixel() {
        let pages = assign_pages(&[block("a", 500.0), block("b", 201.0)], 700.0);
        assert_eq!(pages["b"], 0);
        let pages = assign_pages(&[block("a", 500.0), block("b", 201.5)], 700.0);
        assert_eq!(pages["b"], 1);
    }

    #[test]
    fn oversized_block_sits_alone() {
        let pages = assign_pages(&[block("a", 10.0), block("big", 2000.0), block("c", 10.0)], 700.0);
        assert_eq!(pages["a"], 0);
        assert_eq!(pages["big"], 1);
        assert_eq!(pages["c"], 2);
    }

    #[test]
    fn oversized_first_block_stays_on_page_zero() {
        let pages = assign_pages(&[block("big", 2000.0)], 700.0);
        assert_eq!(pages["big"], 0);
    }

    #[test]
    fn explicit_break_on_empty_page_is_ignored() {
        let pages = assign_pages(&[MeasuredBlock::new("a", 10.0, true), block("b", 10.0)], 700.0);
        assert_eq!(pages["a"], 0);
        assert_eq!(pages["b"], 0);
    }

    #[test]
    fn explicit_break_and_overflow_fire_once() {
        // `b` both requests a break and would overflow; it moves one page.
        let pages = assign_pages(&[block("a", 650.0), MeasuredBlock::new("b", 100.0, true)], 700.0);
        assert_eq!(pages["b"], 1);
    }

    #[test]
    fn skill_groups_move_whole() {
        let blocks = [
            block("header", 100.0),
            block("section:s", 45.0),
            block("group:s:0", 520.0),
            block("group:s:1", 64.0),
        ];
        let pages = assign_pages(&blocks, 700.0);
        assert_eq!(pages["group:s:0"], 0);
        assert_eq!(pages["group:s:1"], 1);
    }

    fn arb_blocks() -> impl Strategy<Value = Vec<MeasuredBlock>> {
        proptest::collection::vec((0.0f64..900.0, proptest::bool::weighted(0.15)), 1..40).prop_map(|v| {
            v.into_iter()
                .enumerate()
                .map(|(i, (h, br))| MeasuredBlock::new(format!("b{i}"), h.round(), br))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn pages_are_contiguous_and_complete(blocks in arb_blocks()) {
            let pages = assign_pages(&blocks, 700.0);
            prop_assert_eq!(pages.len(), blocks.len());
            let mut last = 0;
            for (i, b) in blocks.iter().enumerate() {
                let p = pages[&b.id];
                if i == 0 {
                    prop_assert_eq!(p, 0);
                } else {
                    prop_assert!(p == last || p == last + 1, "pages are monotone and gap-free");
                }
                last = p;
            }
        }

        #[test]
        fn explicit_breaks_start_a_page(blocks in arb_blocks()) {
            let pages = assign_pages(&blocks, 700.0);
            for pair in blocks.windows(2) {
                let prev_height: f64 = blocks
                    .iter()
                    .take_while(|b| b.id != pair[1].id)
                    .filter(|b| pages[&b.id] == pages[&pair[0].id])
                    .map(|b| b.height)
                    .sum();
                if pair[1].break_before && prev_height > 0.0 {
                    prop_assert_ne!(pages[&pair[0].id], pages[&pair[1].id]);
                }
            }
        }

        #[test]
        fn pages_respect_the_budget(blocks in arb_blocks()) {
            let budget = 700.0;
            let pages = assign_pages(&blocks, budget);
            let mut per_page: HashMap<usize, Vec<f64>> = HashMap::new();
            for b in &blocks {
                per_page.entry(pages[&b.id]).or_default().push(b.height);
            }
            for heights in per_page.values() {
                let total: f64 = heights.iter().sum();
                let alone_oversized = heights.iter().filter(|&&h| h > 0.0).count() == 1
                    && heights.iter().any(|&h| h > budget);
                prop_assert!(total <= budget + OVERFLOW_TOLERANCE || alone_oversized);
            }
        }
    }
}
