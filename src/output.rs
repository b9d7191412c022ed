//! Output types returned by conversion.

use crate::error::PageError;
use crate::pipeline::state::Phase;
use crate::pipeline::toc::TocEntry;
use serde::{Deserialize, Serialize};

/// Full result of converting a layout dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled document in the configured format.
    pub text: String,
    /// Per-page outcomes, in page order.
    pub pages: Vec<PageResult>,
    /// Captured table-of-contents entries, in document order.
    pub toc: Vec<TocEntry>,
    /// 0-based index of the first body page. `Some(0)` when the document has
    /// no TOC; `None` when the TOC runs to the last page.
    pub body_start_page_index: Option<usize>,
    pub stats: ConversionStats,
}

/// What happened to one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number.
    pub page_num: usize,
    /// Phase the page was processed in. `None` for skipped pages.
    pub phase: Option<Phase>,
    /// Text and table elements emitted for this page.
    pub elements: usize,
    /// TOC lines captured on this page.
    pub toc_entries: usize,
    /// Why the page contributed nothing, if it was skipped.
    pub error: Option<PageError>,
}

impl PageResult {
    pub fn is_skipped(&self) -> bool {
        self.error.is_some()
    }
}

/// Run-level counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the layout dump.
    pub total_pages: usize,
    /// Pages that went through classification.
    pub processed_pages: usize,
    /// Pages without margins or outside the page selection.
    pub skipped_pages: usize,
    /// Text elements emitted.
    pub text_blocks: usize,
    /// Blocks dropped for their font size.
    pub noise_blocks: usize,
    /// Blocks dropped because a table covers them.
    pub table_interior_blocks: usize,
    /// Right-column blocks dropped in primary-column mode.
    pub column_blocks: usize,
    /// Caption blocks dropped with `drop_captions`.
    pub dropped_captions: usize,
    /// Tables rendered.
    pub tables: usize,
    /// Table candidates rejected as degenerate.
    pub dropped_tables: usize,
    pub toc_entries: usize,
    /// Body blocks rewritten to a TOC breadcrumb.
    pub resolved_headings: usize,
    /// Wall-clock conversion time.
    pub duration_ms: u64,
}

/// Summary of a layout dump without converting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub page_count: usize,
    pub blocks: usize,
    pub lines: usize,
    pub tables: usize,
    pub images: usize,
    /// Pages whose layout log is empty; these will be skipped.
    pub pages_without_layout: Vec<usize>,
    /// Distinct span font sizes, ascending.
    pub font_sizes: Vec<f64>,
}
