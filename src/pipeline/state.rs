//! Run-scoped TOC state.
//!
//! A conversion moves through three phases, always forwards:
//!
//! ```text
//! ScanningToc ──first TOC line──▶ Toc ──first page without TOC lines──▶ Body
//! ```
//!
//! A document that never prints a TOC stays in `ScanningToc`, which is
//! handled exactly like `Body` minus heading resolution.

use crate::config::OutputFormat;
use crate::pipeline::toc::{render_toc, TitleIndex, TocEntry};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    ScanningToc,
    Toc,
    Body,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::ScanningToc => write!(f, "scanning-toc"),
            Phase::Toc => write!(f, "toc"),
            Phase::Body => write!(f, "body"),
        }
    }
}

/// Mutable state carried across pages of one run.
#[derive(Debug, Clone, Default)]
pub struct ConversionState {
    pub has_met_toc: bool,
    /// Index of the first page after the TOC region.
    pub body_start_page_index: Option<usize>,
    pub toc_entries: Vec<TocEntry>,
    pub title_index: TitleIndex,
    finalized: bool,
}

impl ConversionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (self.has_met_toc, self.body_start_page_index) {
            (_, Some(_)) => Phase::Body,
            (true, None) => Phase::Toc,
            (false, None) => Phase::ScanningToc,
        }
    }

    /// True while pages must still be checked for TOC lines.
    pub fn is_scanning(&self) -> bool {
        !self.finalized
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Record captured entries. Returns `true` for the first capture of the
    /// run, when the caller emits the TOC placeholder.
    pub fn capture(&mut self, entries: Vec<TocEntry>) -> bool {
        let first = !self.has_met_toc;
        self.has_met_toc = true;
        self.toc_entries.extend(entries);
        first
    }

    /// Close the TOC region and compile the title index.
    ///
    /// `body_start` is `None` when the TOC ran to the end of the document.
    /// Returns the rendered TOC block that replaces the placeholder.
    pub fn finalize_toc(&mut self, body_start: Option<usize>, format: OutputFormat) -> String {
        self.finalized = true;
        self.body_start_page_index = body_start;
        self.title_index = TitleIndex::build(&self.toc_entries);
        render_toc(&self.toc_entries, format)
    }

    /// Breadcrumb for a block on `page_index`, once the body has started.
    pub fn resolve_title(&self, text: &str, page_index: usize) -> Option<&str> {
        if self.phase() != Phase::Body {
            return None;
        }
        self.title_index
            .resolve(text, page_index, self.body_start_page_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_move_forward() {
        let mut state = ConversionState::new();
        assert_eq!(state.phase(), Phase::ScanningToc);
        assert!(state.is_scanning());

        assert!(state.capture(vec![TocEntry::new("1", "Intro", "1")]));
        assert_eq!(state.phase(), Phase::Toc);
        assert!(!state.capture(vec![TocEntry::new("2", "Usage", "3")]));
        assert_eq!(state.toc_entries.len(), 2);

        let block = state.finalize_toc(Some(2), OutputFormat::Plain);
        assert_eq!(block, "$$$1 Intro\n$$$2 Usage\n");
        assert_eq!(state.phase(), Phase::Body);
        assert!(!state.is_scanning());
        assert_eq!(state.title_index.len(), 2);
    }

    #[test]
    fn resolution_waits_for_body() {
        let mut state = ConversionState::new();
        state.capture(vec![TocEntry::new("1", "Intro", "1")]);
        assert_eq!(state.resolve_title("Intro", 0), None);
        state.finalize_toc(Some(1), OutputFormat::Markdown);
        assert_eq!(state.resolve_title("Intro", 1), Some("1-Intro"));
    }

    #[test]
    fn toc_running_to_end_never_reaches_body() {
        let mut state = ConversionState::new();
        state.capture(vec![TocEntry::new("1", "Intro", "1")]);
        state.finalize_toc(None, OutputFormat::Plain);
        assert_eq!(state.phase(), Phase::Toc);
        assert!(state.is_finalized());
        assert_eq!(state.resolve_title("Intro", 0), None);
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::ScanningToc.to_string(), "scanning-toc");
        assert_eq!(Phase::Body.to_string(), "body");
    }
}
