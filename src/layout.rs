//! Input model: the per-page layout produced by an external document parser.
//!
//! layout2md never reads PDF bytes itself. A parser (PyMuPDF, pdfium, …)
//! dumps every page as positioned text blocks, table candidates and image
//! rectangles, and this module gives that dump a typed shape. Coordinates are
//! PDF points with the origin at the top-left corner and `y` growing downwards.
//!
//! Every collection defaults to empty so sparse dumps (pages without tables or
//! images) deserialize without ceremony.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle `(x0, y0)`–`(x1, y1)`.
///
/// Serialised as a four-element array `[x0, y0, x1, y1]`, which is what
/// parsers emit natively.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

impl From<[f64; 4]> for BBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// A whole document as dumped by the parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutDocument {
    #[serde(default)]
    pub pages: Vec<LayoutPage>,
}

/// One page of the dump.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutPage {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Raw drawing-order bounding boxes (the parser's layout log). Only used
    /// to estimate content margins.
    #[serde(default)]
    pub layout_boxes: Vec<BBox>,
    #[serde(default)]
    pub blocks: Vec<TextBlock>,
    #[serde(default)]
    pub tables: Vec<TableCandidate>,
    #[serde(default)]
    pub images: Vec<ImageRect>,
}

impl LayoutPage {
    /// Horizontal midpoint of the page.
    pub fn mid_x(&self) -> f64 {
        self.width / 2.0
    }
}

/// A parser-identified group of lines, usually one paragraph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextBlock {
    pub bbox: BBox,
    pub block_index: i64,
    #[serde(default)]
    pub lines: Vec<TextLine>,
}

impl TextBlock {
    /// Font size of the first span of the first line, the block's
    /// representative size. `None` for blocks without any span.
    pub fn font_size(&self) -> Option<f64> {
        self.lines
            .first()
            .and_then(|line| line.spans.first())
            .map(|span| span.font_size)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextLine {
    pub bbox: BBox,
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// A run of text sharing one font and size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub font_size: f64,
}

/// A table the parser believes it found. Often wrong; see
/// [`crate::pipeline::table::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableCandidate {
    pub bbox: BBox,
    #[serde(default)]
    pub grid: Vec<Vec<Option<String>>>,
}

/// An image placement. `block_index` refers to the same numbering as
/// [`TextBlock::block_index`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRect {
    pub bbox: BBox,
    pub block_index: i64,
}
