//! Configuration types for layout-to-text conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The config is passed once into a run
//! and never mutated by it; everything a run learns about the document lives
//! in [`crate::pipeline::state::ConversionState`] instead.

use crate::error::Layout2MdError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Configuration for a conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use layout2md::{ConversionConfig, OutputFormat, ReadingOrder};
///
/// let config = ConversionConfig::builder()
///     .format(OutputFormat::Markdown)
///     .reading_order(ReadingOrder::PrimaryColumn)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Output flavour. Default: [`OutputFormat::Plain`].
    ///
    /// Selected once per run; it decides the line separator and the
    /// paragraph/heading markers.
    pub format: OutputFormat,

    /// Font-size and indentation thresholds used by the block classifier.
    pub thresholds: ClassifierThresholds,

    /// Which blocks take part in the reading flow. Default: [`ReadingOrder::Full`].
    pub reading_order: ReadingOrder,

    /// Drop large-indent blocks next to an image instead of emitting them as
    /// plain text. Default: false.
    pub drop_captions: bool,

    /// Page selection. Default: All pages.
    ///
    /// Unselected pages still count for page indices but contribute nothing,
    /// including TOC detection.
    pub pages: PageSelection,

    /// Page separator in the assembled output. Default: None.
    pub page_separator: PageSeparator,

    /// Run the final polish pass over the assembled text. Default: true.
    pub polish: bool,

    /// Optional per-page progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            thresholds: ClassifierThresholds::default(),
            reading_order: ReadingOrder::default(),
            drop_captions: false,
            pages: PageSelection::default(),
            page_separator: PageSeparator::default(),
            polish: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("format", &self.format)
            .field("thresholds", &self.thresholds)
            .field("reading_order", &self.reading_order)
            .field("drop_captions", &self.drop_captions)
            .field("pages", &self.pages)
            .field("page_separator", &self.page_separator)
            .field("polish", &self.polish)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Pick the output format from the extension of the destination path.
    pub fn format_for_path(mut self, path: impl AsRef<Path>) -> Self {
        self.config.format = OutputFormat::from_path(path);
        self
    }

    pub fn thresholds(mut self, thresholds: ClassifierThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    pub fn reading_order(mut self, order: ReadingOrder) -> Self {
        self.config.reading_order = order;
        self
    }

    pub fn drop_captions(mut self, v: bool) -> Self {
        self.config.drop_captions = v;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn polish(mut self, v: bool) -> Self {
        self.config.polish = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Layout2MdError> {
        self.config.thresholds.validate()?;
        Ok(self.config)
    }
}

// ── Thresholds ───────────────────────────────────────────────────────────

/// Tunable constants of the block classifier.
///
/// Font sizes are in points; indentation ratios are measured in multiples of
/// the block's own font size, so a ratio of 2 means "indented by two glyph
/// widths" regardless of the document's base size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    /// Blocks at or below this size are headers, footers and captions. Default: 10.
    pub noise_max_size: f64,
    /// Nominal upper bound of body text. Default: 14.
    pub primary_max_size: f64,
    /// Rendering jitter tolerated above `primary_max_size`. Default: 0.5.
    pub size_offset: f64,
    /// Exclusive lower bound of the paragraph-start indentation ratio. Default: 1.8.
    pub paragraph_indent_min: f64,
    /// Exclusive upper bound of the paragraph-start indentation ratio. Default: 2.5.
    pub paragraph_indent_max: f64,
    /// Indentation ratio above which a primary block may be a heading. Default: 3.
    pub heading_indent_min: f64,
    /// Two lines whose `y0` differ by at most this many points sit on the
    /// same visual row. Default: 1.0.
    pub same_line_tolerance: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            noise_max_size: 10.0,
            primary_max_size: 14.0,
            size_offset: 0.5,
            paragraph_indent_min: 1.8,
            paragraph_indent_max: 2.5,
            heading_indent_min: 3.0,
            same_line_tolerance: 1.0,
        }
    }
}

impl ClassifierThresholds {
    fn validate(&self) -> Result<(), Layout2MdError> {
        if self.noise_max_size < 0.0 {
            return Err(Layout2MdError::InvalidConfig(format!(
                "noise_max_size must be ≥ 0, got {}",
                self.noise_max_size
            )));
        }
        if self.primary_max_size + self.size_offset <= self.noise_max_size {
            return Err(Layout2MdError::InvalidConfig(format!(
                "primary font range is empty: noise ≤ {} but primary < {}",
                self.noise_max_size,
                self.primary_max_size + self.size_offset
            )));
        }
        if self.paragraph_indent_min >= self.paragraph_indent_max {
            return Err(Layout2MdError::InvalidConfig(format!(
                "paragraph indent range {}..{} is empty",
                self.paragraph_indent_min, self.paragraph_indent_max
            )));
        }
        if self.same_line_tolerance < 0.0 {
            return Err(Layout2MdError::InvalidConfig(
                "same_line_tolerance must be ≥ 0".into(),
            ));
        }
        Ok(())
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Output flavour and its markers.
///
/// | Format | Line separator | Paragraph marker | Heading marker |
/// |--------|----------------|------------------|----------------|
/// | Plain  | `\n`           | `$$$`            | `###`          |
/// | Markdown | two spaces + `\n` | none        | `### `         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Plain text with `$$$` paragraph markers. (default)
    #[default]
    Plain,
    /// Markdown with hard line breaks.
    Markdown,
}

impl OutputFormat {
    /// `.md` and `.markdown` (case-insensitive) select Markdown; anything
    /// else is plain text.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("md") | Some("markdown") => OutputFormat::Markdown,
            _ => OutputFormat::Plain,
        }
    }

    pub fn line_separator(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "\n",
            OutputFormat::Markdown => "  \n",
        }
    }

    pub fn paragraph_marker(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "$$$",
            OutputFormat::Markdown => "",
        }
    }

    pub fn heading_marker(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "###",
            OutputFormat::Markdown => "### ",
        }
    }
}

/// Which blocks take part in the primary reading flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadingOrder {
    /// Every block on the page, ordered by `y0`. (default)
    #[default]
    Full,
    /// Blocks beginning right of the page midpoint are treated as marginalia
    /// and skipped, except inside the table of contents and on any page that
    /// carries TOC lines.
    PrimaryColumn,
}

/// Specifies which pages of the document to convert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// How to separate pages in the assembled output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSeparator {
    /// Pages follow each other directly. (default)
    #[default]
    None,
    /// Horizontal rule line: `---`
    HorizontalRule,
    /// HTML comment with page number: `<!-- page N -->`
    Comment,
    /// Custom string on its own line.
    Custom(String),
}

impl PageSeparator {
    /// Render the separator for the given page number (1-indexed), terminated
    /// by `line_sep`. Empty for [`PageSeparator::None`].
    pub fn render(&self, page_num: usize, line_sep: &str) -> String {
        match self {
            PageSeparator::None => String::new(),
            PageSeparator::HorizontalRule => format!("---{line_sep}"),
            PageSeparator::Comment => format!("<!-- page {page_num} -->{line_sep}"),
            PageSeparator::Custom(s) => format!("{s}{line_sep}"),
        }
    }
}
