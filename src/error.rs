//! Error types for the layout2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Layout2MdError`] — **Fatal**: the conversion cannot proceed at all
//!   (missing input, malformed layout dump, output cannot be written).
//!   Returned as `Err(Layout2MdError)` from the top-level `convert*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page could not contribute
//!   content (no measurable margins, nothing but noise) while the rest of the
//!   document is fine. Stored inside [`crate::output::PageResult`] so callers
//!   can see which pages were dropped and why.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the layout2md library.
#[derive(Debug, Error)]
pub enum Layout2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Layout file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file was read but does not start like a JSON layout dump.
    #[error("File is not a layout dump: '{path}'\nFirst byte: {first:?}")]
    NotALayoutDump { path: PathBuf, first: Option<char> },

    /// The JSON was well-formed enough to start parsing but does not match
    /// the layout schema.
    #[error("Invalid layout dump '{path}' at line {line}, column {column}: {detail}")]
    InvalidLayout {
        path: PathBuf,
        line: usize,
        column: usize,
        detail: String,
    },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input file after it was resolved.
    #[error("Failed to read input file '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// The conversion always continues past these; they only explain why a page
/// contributed nothing to the output.
#[derive(Debug, Clone, PartialEq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// The layout log for the page was empty, so no content margins exist.
    #[error("Page {page}: no layout boxes, content margins unavailable")]
    NoPadding { page: usize },

    /// The page was not part of the configured page selection.
    #[error("Page {page}: not selected")]
    NotSelected { page: usize },
}
