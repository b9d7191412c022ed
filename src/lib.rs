//! # layout2md
//!
//! Reconstruct the logical structure of a typeset document from its page
//! layout: paragraphs, headings with hierarchical breadcrumbs, the table of
//! contents, and tables, assembled into one linear text or Markdown file.
//!
//! ## Why this crate?
//!
//! Document parsers (PyMuPDF, pdfium, pdfplumber) tell you *where* every span
//! of text is and how large it is, but not *what* it is. Dumping their spans
//! in order produces a wall of text with running headers in the middle of
//! sentences, CJK words split by phantom spaces, and no way to tell a chapter
//! title from a subsection. This crate applies cheap geometric heuristics
//! (font size, indentation relative to the page margin) and uses the printed
//! table of contents to recover the heading hierarchy.
//!
//! ## Pipeline Overview
//!
//! ```text
//! layout dump (JSON)
//!  │
//!  ├─ 1. Input     read + sniff + deserialize
//!  ├─ 2. Padding   content margins per page from the layout log
//!  ├─ 3. Classify  noise / paragraph start / heading / caption / plain
//!  ├─ 4. Tables    validate candidates, drop covered text blocks
//!  ├─ 5. TOC       capture dotted-leader lines, build the title index
//!  ├─ 6. Assemble  y0 reading order, two-phase buffer with pending TOC
//!  └─ 7. Polish    invisible characters, blank-line runs, final newline
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use layout2md::{convert_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .format_for_path("report.md")
//!         .build()?;
//!     let written = convert_file("report.layout.json", "report.md", &config).await?;
//!     eprintln!("wrote {}", written.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `layout2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! layout2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    ClassifierThresholds, ConversionConfig, ConversionConfigBuilder, OutputFormat, PageSelection,
    PageSeparator, ReadingOrder,
};
pub use convert::{
    convert, convert_file, convert_file_sync, convert_path, convert_str, inspect, summarize,
    write_output,
};
pub use error::{Layout2MdError, PageError};
pub use layout::{BBox, LayoutDocument, LayoutPage};
pub use output::{ConversionOutput, ConversionStats, DocumentSummary, PageResult};
pub use pipeline::normalize::normalize;
pub use pipeline::state::Phase;
pub use pipeline::toc::TocEntry;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
