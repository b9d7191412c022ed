//! Block classification from font size and indentation.
//!
//! Parsers know where text is, not what it is. Two cheap geometric signals
//! recover most of the structure of typeset documents:
//!
//! * **Font size** separates running headers, footers and figure captions
//!   (small) from body text (medium) and display titles (large).
//! * **Indentation ratio** — the block's offset from the page's content margin
//!   measured in multiples of its own font size. First lines of paragraphs
//!   are indented by about two glyphs; centred or deeply indented section
//!   titles sit further in.
//!
//! Image captions share the deep-indent signature of headings, so a block
//! whose index neighbours an image is never promoted to a heading.

use crate::config::ClassifierThresholds;
use crate::layout::{ImageRect, TextBlock};
use crate::pipeline::normalize::normalize;
use crate::pipeline::padding::PagePadding;
use crate::pipeline::postprocess::strip_invisible;
use once_cell::sync::Lazy;
use regex::Regex;

/// Structural role of a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Body text that continues the current paragraph.
    Plain,
    /// Body text indented like the first line of a paragraph.
    ParagraphStart,
    /// Deeply indented body-size text in the left half of the page.
    Heading,
    /// Heading-shaped text adjacent to an image.
    Caption,
}

/// A text block after classification and normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedBlock {
    pub kind: BlockKind,
    /// Normalised text of the whole block.
    pub text: String,
    /// Normalised text of each visual row, in order.
    pub rows: Vec<String>,
    pub x0: f64,
    pub y0: f64,
    pub y1: f64,
}

/// Outcome of classifying one raw block.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// At or below the noise font size (headers, footers, captions).
    Noise,
    /// No spans, or nothing left after normalisation.
    Empty,
    Text(ClassifiedBlock),
}

/// Per-page facts the classifier needs besides the block itself.
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    pub padding: &'a PagePadding,
    pub mid_x: f64,
    pub images: &'a [ImageRect],
}

/// Horizontal offset from the content margin in multiples of `font_size`.
pub fn indentation_ratio(x0: f64, left_margin: f64, font_size: f64) -> f64 {
    (x0 - left_margin) / font_size
}

pub fn is_noise_size(size: f64, t: &ClassifierThresholds) -> bool {
    size <= t.noise_max_size || size <= 0.0
}

pub fn is_primary_size(size: f64, t: &ClassifierThresholds) -> bool {
    t.noise_max_size < size && size < t.primary_max_size + t.size_offset
}

fn is_image_adjacent(block_index: i64, images: &[ImageRect]) -> bool {
    images
        .iter()
        .any(|img| (img.block_index - block_index).abs() <= 1)
}

/// Classify one raw block.
pub fn classify(block: &TextBlock, ctx: &PageContext<'_>, t: &ClassifierThresholds) -> Classified {
    let Some(size) = block.font_size() else {
        return Classified::Empty;
    };
    if is_noise_size(size, t) {
        return Classified::Noise;
    }

    let raw_rows = visual_rows(block, t.same_line_tolerance);
    let text = normalize(&join_rows(&raw_rows));
    if text.is_empty() {
        return Classified::Empty;
    }
    let rows = raw_rows
        .iter()
        .map(|r| normalize(r))
        .filter(|r| !r.is_empty())
        .collect();

    let x0 = block.bbox.x0;
    let kind = if is_primary_size(size, t) {
        let ratio = indentation_ratio(x0, ctx.padding.left, size);
        if ratio > t.paragraph_indent_min && ratio < t.paragraph_indent_max {
            BlockKind::ParagraphStart
        } else if ratio > t.heading_indent_min && x0 <= ctx.mid_x {
            if is_image_adjacent(block.block_index, ctx.images) {
                BlockKind::Caption
            } else {
                BlockKind::Heading
            }
        } else {
            BlockKind::Plain
        }
    } else {
        BlockKind::Plain
    };

    Classified::Text(ClassifiedBlock {
        kind,
        text,
        rows,
        x0,
        y0: block.bbox.y0,
        y1: block.bbox.y1,
    })
}

/// Group a block's lines into visual rows.
///
/// Parsers sometimes emit one visual row as several lines (a superscript, a
/// change of font); those share a `y0` within `tolerance` and are joined
/// with a space.
fn visual_rows(block: &TextBlock, tolerance: f64) -> Vec<String> {
    let mut rows: Vec<(f64, String)> = Vec::new();
    for line in &block.lines {
        let text = line
            .spans
            .iter()
            .map(|s| strip_invisible(&s.text))
            .collect::<Vec<_>>()
            .join(" ");
        match rows.last_mut() {
            Some((y0, row)) if (line.bbox.y0 - *y0).abs() <= tolerance => {
                row.push(' ');
                row.push_str(&text);
            }
            _ => rows.push((line.bbox.y0, text)),
        }
    }
    rows.into_iter().map(|(_, row)| row).collect()
}

static RE_LATIN_TAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{Latin}\p{Nd}]$").unwrap());
static RE_LATIN_HEAD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{Latin}\p{Nd}]").unwrap());

/// Join rows with a line break, which normalisation deletes. Between two
/// Latin words the break becomes a space so the words stay apart.
fn join_rows(rows: &[String]) -> String {
    let mut out = String::new();
    for row in rows {
        if !out.is_empty() {
            if RE_LATIN_TAIL.is_match(out.trim_end()) && RE_LATIN_HEAD.is_match(row.trim_start()) {
                out.push(' ');
            } else {
                out.push('\n');
            }
        }
        out.push_str(row);
    }
    out
}
