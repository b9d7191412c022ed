//! Page content margins from the parser's layout log.
//!
//! Indentation only means something relative to where the text column
//! starts, and that differs per page (odd/even margins, landscape inserts).
//! The layout log lists every drawn rectangle in drawing order; its first and
//! last entries usually frame the whole page (background fill, crop box), so
//! the content rectangle is the union of the entries in between.

use crate::layout::BBox;
use serde::{Deserialize, Serialize};

/// Distances from each page edge to the content rectangle, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PagePadding {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

/// Estimate the margins of a `width` × `height` page.
///
/// Returns `None` for an empty layout log; the orchestrator skips such pages.
/// With fewer than three boxes there is no interior, so all boxes are used.
pub fn estimate(width: f64, height: f64, boxes: &[BBox]) -> Option<PagePadding> {
    let interior = if boxes.len() >= 3 {
        &boxes[1..boxes.len() - 1]
    } else {
        boxes
    };
    let (first, rest) = interior.split_first()?;
    let content = rest.iter().fold(*first, |acc, b| acc.union(b));

    Some(PagePadding {
        left: content.x0.max(0.0),
        top: content.y0.max(0.0),
        right: (width - content.x1).max(0.0),
        bottom: (height - content.y1).max(0.0),
    })
}
