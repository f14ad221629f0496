//! # Flex Wrap Utilities
//!
//! Line collection for `flex-wrap: wrap` containers: skill chips, language
//! pills and inline language lists. The measurer owns the box model; this
//! module only decides which items share a row.

use std::ops::Range;

/// Split items of the given outer widths into rows no wider than
/// `available`, with `gap` between neighbours on a row. An item wider than
/// the row sits alone on its own row.
pub fn wrap_rows(widths: &[f64], available: f64, gap: f64) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut start = 0;
    let mut used = 0.0;
    for (i, &w) in widths.iter().enumerate() {
        if i > start && used + gap + w > available {
            rows.push(start..i);
            start = i;
            used = w;
        } else if i == start {
            used = w;
        } else {
            used += gap + w;
        }
    }
    if start < widths.len() {
        rows.push(start..widths.len());
    }
    rows
}
