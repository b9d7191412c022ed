//! Page assembly: per-page element ordering and the two-phase output buffer.
//!
//! ## Why two phases?
//!
//! The TOC is recognised on its first line but can only be rendered once its
//! last line has been seen, possibly several pages later. Meanwhile body text
//! keeps flowing into the output. The buffer therefore stores a typed
//! [`Segment::PendingToc`] node where the TOC belongs and substitutes the
//! rendered block when the TOC region closes; no string search over the
//! finished output is involved.

use crate::config::{ConversionConfig, ReadingOrder};
use crate::error::PageError;
use crate::layout::LayoutPage;
use crate::output::{ConversionStats, PageResult};
use crate::pipeline::classify::{classify, BlockKind, Classified, ClassifiedBlock, PageContext};
use crate::pipeline::padding;
use crate::pipeline::postprocess;
use crate::pipeline::state::{ConversionState, Phase};
use crate::pipeline::table::{self, Grid, TableRegion};
use crate::pipeline::toc::{self, TocEntry, TocMatch};
use tracing::{debug, info, warn};

/// One positioned item of a page, ordered by `y0`.
#[derive(Debug, Clone, PartialEq)]
pub enum PageElement {
    /// Rendered text including its paragraph or heading marker.
    Text { content: String, y0: f64 },
    Table { grid: Grid, y0: f64, y1: f64 },
    /// Captured TOC lines; never rendered in place.
    Toc { entries: Vec<TocEntry>, y0: f64 },
}

impl PageElement {
    pub fn y0(&self) -> f64 {
        match self {
            PageElement::Text { y0, .. }
            | PageElement::Table { y0, .. }
            | PageElement::Toc { y0, .. } => *y0,
        }
    }
}

/// Stable top-to-bottom sort. Elements sharing a `y0` keep parser order.
pub fn sort_reading_order(elements: &mut [PageElement]) {
    elements.sort_by(|a, b| a.y0().total_cmp(&b.y0()));
}

// ── Output buffer ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    PendingToc,
}

/// Append-only document buffer with at most one pending TOC node.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    segments: Vec<Segment>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(text)) => text.push_str(s),
            _ => self.segments.push(Segment::Text(s.to_string())),
        }
    }

    /// Insert the TOC placeholder. Returns `false` if one is already pending.
    pub fn push_pending_toc(&mut self) -> bool {
        if self.has_pending_toc() {
            return false;
        }
        self.segments.push(Segment::PendingToc);
        true
    }

    pub fn has_pending_toc(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::PendingToc))
    }

    /// Replace the pending node with `rendered`. Returns `false` when there
    /// was nothing to replace.
    pub fn resolve_toc(&mut self, rendered: &str) -> bool {
        let Some(pos) = self
            .segments
            .iter()
            .position(|s| matches!(s, Segment::PendingToc))
        else {
            return false;
        };
        let tail = self.segments.split_off(pos + 1);
        self.segments.pop();
        self.push_str(rendered);
        for segment in tail {
            match segment {
                Segment::Text(text) => self.push_str(&text),
                Segment::PendingToc => self.segments.push(Segment::PendingToc),
            }
        }
        true
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Concatenate all text. A still-pending TOC renders as nothing.
    pub fn into_string(self) -> String {
        self.segments
            .into_iter()
            .filter_map(|s| match s {
                Segment::Text(text) => Some(text),
                Segment::PendingToc => None,
            })
            .collect()
    }
}

// ── Page assembler ───────────────────────────────────────────────────────────

/// The finished product of an assembler run.
#[derive(Debug)]
pub struct Assembled {
    pub text: String,
    pub state: ConversionState,
    pub stats: ConversionStats,
}

/// Drives one conversion run page by page.
///
/// Owns the run's [`ConversionState`] and [`OutputBuffer`]; nothing is
/// shared between runs.
pub struct PageAssembler<'a> {
    config: &'a ConversionConfig,
    state: ConversionState,
    buffer: OutputBuffer,
    stats: ConversionStats,
    emitted_pages: usize,
}

impl<'a> PageAssembler<'a> {
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self {
            config,
            state: ConversionState::new(),
            buffer: OutputBuffer::new(),
            stats: ConversionStats::default(),
            emitted_pages: 0,
        }
    }

    pub fn state(&self) -> &ConversionState {
        &self.state
    }

    /// Record a page that contributes nothing.
    pub fn skip_page(&mut self, error: PageError) -> PageResult {
        self.stats.skipped_pages += 1;
        let page_num = match error {
            PageError::NoPadding { page } | PageError::NotSelected { page } => page,
        };
        PageResult {
            page_num,
            error: Some(error),
            ..Default::default()
        }
    }

    /// Classify, order and emit one page.
    pub fn process_page(&mut self, page_index: usize, page: &LayoutPage) -> PageResult {
        let page_num = page_index + 1;
        let Some(padding) = padding::estimate(page.width, page.height, &page.layout_boxes) else {
            warn!("Page {}: empty layout log, skipping", page_num);
            return self.skip_page(PageError::NoPadding { page: page_num });
        };
        self.stats.processed_pages += 1;

        // ── Tables ───────────────────────────────────────────────────────
        let mut regions = Vec::new();
        for candidate in &page.tables {
            match TableRegion::from_candidate(candidate) {
                Some(region) => regions.push(region),
                None => {
                    self.stats.dropped_tables += 1;
                    debug!("Page {}: dropped degenerate table candidate", page_num);
                }
            }
        }

        // ── Blocks ───────────────────────────────────────────────────────
        let mid_x = page.mid_x();
        let ctx = PageContext {
            padding: &padding,
            mid_x,
            images: &page.images,
        };
        let mut blocks: Vec<ClassifiedBlock> = Vec::with_capacity(page.blocks.len());
        for raw in &page.blocks {
            match classify(raw, &ctx, &self.config.thresholds) {
                Classified::Noise => self.stats.noise_blocks += 1,
                Classified::Empty => {}
                Classified::Text(block) => {
                    if regions.iter().any(|r| r.contains(block.y0, block.y1)) {
                        self.stats.table_interior_blocks += 1;
                    } else {
                        blocks.push(block);
                    }
                }
            }
        }

        // ── TOC boundary ─────────────────────────────────────────────────
        let toc_matches: Vec<Option<TocMatch>> = if self.state.is_scanning() {
            blocks.iter().map(toc::match_block).collect()
        } else {
            vec![None; blocks.len()]
        };
        let page_has_toc = toc_matches.iter().any(Option::is_some);
        if self.state.has_met_toc && self.state.is_scanning() && !page_has_toc {
            self.finalize_toc(Some(page_index));
        }
        let phase = self.state.phase();

        // ── Elements ─────────────────────────────────────────────────────
        let mut elements: Vec<PageElement> = regions
            .into_iter()
            .map(|r| PageElement::Table {
                grid: r.grid,
                y0: r.y0,
                y1: r.y1,
            })
            .collect();
        for (block, matched) in blocks.into_iter().zip(toc_matches) {
            if let Some(m) = matched {
                let y0 = block.y0;
                if let Some(content) = m.leading {
                    elements.push(PageElement::Text { content, y0 });
                }
                elements.push(PageElement::Toc {
                    entries: m.entries,
                    y0,
                });
                if let Some(content) = m.trailing {
                    elements.push(PageElement::Text { content, y0 });
                }
                continue;
            }
            if self.config.reading_order == ReadingOrder::PrimaryColumn
                && phase != Phase::Toc
                && !page_has_toc
                && block.x0 > mid_x
            {
                self.stats.column_blocks += 1;
                continue;
            }
            let y0 = block.y0;
            if let Some(content) = self.render_block(block, page_index) {
                elements.push(PageElement::Text { content, y0 });
            }
        }
        sort_reading_order(&mut elements);

        // ── Emit ─────────────────────────────────────────────────────────
        let sep = self.config.format.line_separator();
        if self.emitted_pages > 0 {
            let separator = self.config.page_separator.render(page_num, sep);
            self.buffer.push_str(&separator);
        }
        self.emitted_pages += 1;

        let mut emitted = 0;
        let mut toc_lines = 0;
        for element in elements {
            match element {
                PageElement::Text { content, .. } => {
                    self.buffer.push_str(&content);
                    self.buffer.push_str(sep);
                    self.stats.text_blocks += 1;
                    emitted += 1;
                }
                PageElement::Table { grid, .. } => {
                    self.buffer.push_str(&table::render(&grid, sep));
                    self.buffer.push_str(sep);
                    self.stats.tables += 1;
                    emitted += 1;
                }
                PageElement::Toc { entries, .. } => {
                    toc_lines += entries.len();
                    if self.state.capture(entries) {
                        debug!("Page {}: table of contents starts", page_num);
                        self.buffer.push_pending_toc();
                        self.buffer.push_str(sep);
                    }
                }
            }
        }
        self.stats.toc_entries += toc_lines;

        debug!(
            "Page {} ({}): {} elements, {} TOC lines",
            page_num, phase, emitted, toc_lines
        );
        PageResult {
            page_num,
            phase: Some(phase),
            elements: emitted,
            toc_entries: toc_lines,
            error: None,
        }
    }

    /// Close the run: finalise a TOC that reached the last page and polish.
    pub fn finish(mut self) -> Assembled {
        if self.state.has_met_toc && self.state.is_scanning() {
            warn!("Table of contents runs to the end of the document");
            self.finalize_toc(None);
        }
        let mut text = self.buffer.into_string();
        if self.config.polish {
            text = postprocess::polish(&text, self.config.format);
        }
        Assembled {
            text,
            state: self.state,
            stats: self.stats,
        }
    }

    fn finalize_toc(&mut self, body_start: Option<usize>) {
        let rendered = self.state.finalize_toc(body_start, self.config.format);
        self.buffer.resolve_toc(&rendered);
        let entries = self.state.toc_entries.len();
        match body_start {
            Some(idx) => info!("TOC closed with {} entries; body starts on page {}", entries, idx + 1),
            None => info!("TOC closed with {} entries at end of document", entries),
        }
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_toc_finalized(body_start.map(|idx| idx + 1), entries);
        }
    }

    /// Rendered text for a block, or `None` when it is dropped.
    fn render_block(&mut self, block: ClassifiedBlock, page_index: usize) -> Option<String> {
        let format = self.config.format;
        let resolved = match block.kind {
            BlockKind::Heading | BlockKind::Plain => self
                .state
                .resolve_title(&block.text, page_index)
                .map(str::to_string),
            _ => None,
        };
        let (kind, text) = match resolved {
            Some(breadcrumb) => {
                self.stats.resolved_headings += 1;
                (BlockKind::Heading, breadcrumb)
            }
            None => (block.kind, block.text),
        };

        match kind {
            BlockKind::ParagraphStart => Some(format!("{}{}", format.paragraph_marker(), text)),
            BlockKind::Heading => Some(format!("{}{}", format.heading_marker(), text)),
            BlockKind::Caption if self.config.drop_captions => {
                self.stats.dropped_captions += 1;
                None
            }
            BlockKind::Caption | BlockKind::Plain => Some(text),
        }
    }
}
