//! Conversion entry points.
//!
//! The pipeline itself is synchronous and CPU-only: [`convert`] walks an
//! in-memory [`LayoutDocument`]. The async functions only add file I/O on
//! top, and [`convert_file_sync`] wraps them in a private tokio runtime for
//! callers without one.

use crate::config::ConversionConfig;
use crate::error::{Layout2MdError, PageError};
use crate::layout::LayoutDocument;
use crate::output::{ConversionOutput, DocumentSummary};
use crate::pipeline::assemble::PageAssembler;
use crate::pipeline::input;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Convert a parsed layout document.
///
/// Pages are processed strictly in document order; unselected pages and
/// pages without layout boxes are recorded in `pages` with a [`PageError`]
/// and otherwise ignored.
///
/// # Errors
/// [`Layout2MdError::PageOutOfRange`] when the page selection matches no
/// page of the document. Everything else is non-fatal.
pub fn convert(
    document: &LayoutDocument,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Layout2MdError> {
    let start = Instant::now();
    let total_pages = document.pages.len();

    let selected = config.pages.to_indices(total_pages);
    if selected.is_empty() && total_pages > 0 {
        return Err(Layout2MdError::PageOutOfRange {
            page: first_requested_page(config),
            total: total_pages,
        });
    }
    info!(
        "Starting conversion: {} pages ({} selected), format {:?}",
        total_pages,
        selected.len(),
        config.format
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(total_pages);
    }

    let mut assembler = PageAssembler::new(config);
    let mut pages = Vec::with_capacity(total_pages);
    let mut next_selected = selected.iter().peekable();

    for (idx, page) in document.pages.iter().enumerate() {
        let page_num = idx + 1;
        let is_selected = next_selected.next_if(|&&i| i == idx).is_some();
        let result = if is_selected {
            if let Some(ref cb) = config.progress_callback {
                cb.on_page_start(page_num, total_pages);
            }
            assembler.process_page(idx, page)
        } else {
            assembler.skip_page(PageError::NotSelected { page: page_num })
        };

        if let Some(ref cb) = config.progress_callback {
            match &result.error {
                None => cb.on_page_complete(page_num, total_pages, result.elements),
                Some(e) => cb.on_page_skipped(page_num, total_pages, &e.to_string()),
            }
        }
        pages.push(result);
    }

    let assembled = assembler.finish();
    let mut stats = assembled.stats;
    stats.total_pages = total_pages;
    stats.duration_ms = start.elapsed().as_millis() as u64;

    let body_start_page_index = match (
        assembled.state.has_met_toc,
        assembled.state.body_start_page_index,
    ) {
        (false, _) => Some(0),
        (true, start) => start,
    };

    info!(
        "Conversion complete: {}/{} pages, {} TOC entries, {}ms",
        stats.processed_pages, total_pages, stats.toc_entries, stats.duration_ms
    );
    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(total_pages, stats.processed_pages);
    }

    Ok(ConversionOutput {
        text: assembled.text,
        pages,
        toc: assembled.state.toc_entries,
        body_start_page_index,
        stats,
    })
}

/// Parse a layout dump held in memory and convert it.
pub fn convert_str(json: &str, config: &ConversionConfig) -> Result<ConversionOutput, Layout2MdError> {
    let document = input::parse_layout(json.as_bytes(), Path::new("<memory>"))?;
    convert(&document, config)
}

/// Load a layout dump from disk and convert it.
pub async fn convert_path(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Layout2MdError> {
    let document = input::load_layout(input_path.as_ref()).await?;
    convert(&document, config)
}

/// Convert a layout dump and write the result to `output_path`.
///
/// The output format is taken from `config`; use
/// [`crate::ConversionConfigBuilder::format_for_path`] to derive it from the
/// destination extension. Uses atomic write (temp file + rename) so a failed
/// run never leaves a truncated file behind.
///
/// Returns the path that was written.
pub async fn convert_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PathBuf, Layout2MdError> {
    let output = convert_path(input_path, config).await?;
    let path = output_path.as_ref();
    write_output(path, &output.text).await?;
    info!("Wrote {} bytes to {}", output.text.len(), path.display());
    Ok(path.to_path_buf())
}

/// Synchronous wrapper around [`convert_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_file_sync(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<PathBuf, Layout2MdError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Layout2MdError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_file(input_path, output_path, config))
}

/// Summarise a layout dump without converting it.
pub async fn inspect(input_path: impl AsRef<Path>) -> Result<DocumentSummary, Layout2MdError> {
    let document = input::load_layout(input_path.as_ref()).await?;
    Ok(summarize(&document))
}

/// Page, block and font statistics of a parsed document.
pub fn summarize(document: &LayoutDocument) -> DocumentSummary {
    let mut summary = DocumentSummary {
        page_count: document.pages.len(),
        ..Default::default()
    };
    for (idx, page) in document.pages.iter().enumerate() {
        if page.layout_boxes.is_empty() {
            summary.pages_without_layout.push(idx + 1);
        }
        summary.blocks += page.blocks.len();
        summary.tables += page.tables.len();
        summary.images += page.images.len();
        for block in &page.blocks {
            summary.lines += block.lines.len();
            for span in block.lines.iter().flat_map(|l| &l.spans) {
                summary.font_sizes.push(span.font_size);
            }
        }
    }
    summary.font_sizes.sort_by(f64::total_cmp);
    summary.font_sizes.dedup();
    summary
}

/// Write `contents` to `path` atomically (temp file + rename), creating
/// parent directories as needed.
pub async fn write_output(path: &Path, contents: &str) -> Result<(), Layout2MdError> {
    let write_err = |e: std::io::Error| Layout2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);
    debug!("Writing {} via {}", path.display(), tmp_path.display());

    tokio::fs::write(&tmp_path, contents).await.map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn first_requested_page(config: &ConversionConfig) -> usize {
    use crate::config::PageSelection;
    match &config.pages {
        PageSelection::All => 0,
        PageSelection::Single(p) => *p,
        PageSelection::Range(start, _) => *start,
        PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageSelection;

    const DUMP: &str = r#"{
      "pages": [
        {
          "width": 595, "height": 842,
          "layout_boxes": [[0,0,595,842], [72,72,523,770], [0,0,595,842]],
          "blocks": [
            {"bbox": [72,100,500,112], "block_index": 0,
             "lines": [{"bbox": [72,100,500,112], "spans": [{"text": "Hello world", "font_size": 12}]}]}
          ]
        },
        {"width": 595, "height": 842}
      ]
    }"#;

    #[test]
    fn converts_in_memory_dump() {
        let out = convert_str(DUMP, &ConversionConfig::default()).unwrap();
        assert_eq!(out.text, "Hello world\n");
        assert_eq!(out.stats.total_pages, 2);
        assert_eq!(out.stats.processed_pages, 1);
        assert_eq!(out.stats.skipped_pages, 1);
        assert_eq!(out.pages.len(), 2);
        assert_eq!(out.pages[1].error, Some(PageError::NoPadding { page: 2 }));
        assert_eq!(out.body_start_page_index, Some(0));
    }

    #[test]
    fn unselected_pages_are_recorded() {
        let config = ConversionConfig::builder()
            .pages(PageSelection::Single(2))
            .build()
            .unwrap();
        let out = convert_str(DUMP, &config).unwrap();
        assert_eq!(out.text, "");
        assert_eq!(out.pages[0].error, Some(PageError::NotSelected { page: 1 }));
    }

    #[test]
    fn empty_selection_is_fatal() {
        let config = ConversionConfig::builder()
            .pages(PageSelection::Single(9))
            .build()
            .unwrap();
        assert!(matches!(
            convert_str(DUMP, &config),
            Err(Layout2MdError::PageOutOfRange { page: 9, total: 2 })
        ));
    }

    #[test]
    fn empty_document_converts_to_nothing() {
        let out = convert_str(r#"{"pages": []}"#, &ConversionConfig::default()).unwrap();
        assert_eq!(out.text, "");
        assert!(out.pages.is_empty());
    }

    #[test]
    fn summary_counts() {
        let doc = input::parse_layout(DUMP.as_bytes(), Path::new("x.json")).unwrap();
        let s = summarize(&doc);
        assert_eq!(s.page_count, 2);
        assert_eq!(s.blocks, 1);
        assert_eq!(s.lines, 1);
        assert_eq!(s.pages_without_layout, vec![2]);
        assert_eq!(s.font_sizes, vec![12.0]);
    }

    #[test]
    fn sync_wrapper_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("doc.json");
        std::fs::write(&input_path, DUMP).unwrap();
        let output_path = dir.path().join("nested/out.txt");
        let written =
            convert_file_sync(&input_path, &output_path, &ConversionConfig::default()).unwrap();
        assert_eq!(written, output_path);
        assert_eq!(std::fs::read_to_string(&output_path).unwrap(), "Hello world\n");
        assert!(!dir.path().join("nested/out.txt.tmp").exists());
    }
}
