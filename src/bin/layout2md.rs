//! CLI binary for layout2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use layout2md::{
    convert_path, inspect, write_output, ConversionConfig, ConversionOutput,
    ConversionProgressCallback, OutputFormat, PageSelection, PageSeparator, ProgressCallback,
    ReadingOrder,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per skipped page
/// and one for the table of contents.
struct CliProgressCallback {
    bar: ProgressBar,
    skipped: AtomicUsize,
}

impl CliProgressCallback {
    /// Length is set by `on_conversion_start`.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading layout…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            skipped: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_conversion_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, _page_num: usize, _total: usize, _elements: usize) {
        self.bar.inc(1);
    }

    fn on_page_skipped(&self, page_num: usize, total: usize, reason: &str) {
        self.skipped.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            yellow("–"),
            page_num,
            total,
            dim(reason),
        ));
        self.bar.inc(1);
    }

    fn on_toc_finalized(&self, body_start_page: Option<usize>, entries: usize) {
        let body = body_start_page
            .map(|p| format!("body from page {p}"))
            .unwrap_or_else(|| "no body pages".to_string());
        self.bar.println(format!(
            "  {} Table of contents: {} entries, {}",
            cyan("◆"),
            bold(&entries.to_string()),
            body
        ));
    }

    fn on_conversion_complete(&self, total_pages: usize, processed_pages: usize) {
        self.bar.finish_and_clear();
        let skipped = self.skipped.load(Ordering::SeqCst);
        if skipped == 0 {
            eprintln!(
                "{} {} pages converted",
                green("✔"),
                bold(&processed_pages.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages converted  ({} skipped)",
                yellow("⚠"),
                bold(&processed_pages.to_string()),
                total_pages,
                skipped,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Plain text with $$$ paragraph markers (stdout)
  layout2md report.layout.json

  # Markdown, format picked from the extension
  layout2md report.layout.json -o report.md

  # Specific pages, page comments between them
  layout2md --pages 3-15 --separator comment book.json -o book.md

  # Drop marginalia and figure captions
  layout2md --primary-column --drop-captions paper.json -o paper.txt

  # Inspect the dump without converting
  layout2md --inspect-only report.layout.json

  # JSON output with TOC, per-page results and stats
  layout2md --json report.layout.json > result.json

INPUT:
  A JSON layout dump: {"pages": [{"width", "height", "layout_boxes",
  "blocks", "tables", "images"}]}. Produce one with any parser that exposes
  text blocks with span font sizes (PyMuPDF's page.get_text("dict") fits).

ENVIRONMENT VARIABLES:
  RUST_LOG                Override the log filter (e.g. layout2md=debug)
  LAYOUT2MD_*             Every flag below has an env equivalent
"#;

/// Reconstruct paragraphs, headings, tables and the TOC from layout dumps.
#[derive(Parser, Debug)]
#[command(
    name = "layout2md",
    version,
    about = "Reconstruct paragraphs, headings, tables and the TOC from layout dumps",
    long_about = "Convert a parser's per-page layout dump (text spans with positions and font \
sizes, table candidates, image rectangles) into linear plain text or Markdown. Headings are \
resolved against the document's own table of contents to full breadcrumbs.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Layout dump (JSON).
    input: PathBuf,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "LAYOUT2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// Output format. Default: from the output extension, else plain.
    #[arg(long, env = "LAYOUT2MD_FORMAT", value_enum)]
    format: Option<FormatArg>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "LAYOUT2MD_PAGES", default_value = "all")]
    pages: String,

    /// Page separator: none, hr, comment, or custom string.
    #[arg(long, env = "LAYOUT2MD_SEPARATOR", default_value = "none")]
    separator: String,

    /// Skip blocks right of the page midpoint, except on TOC pages.
    #[arg(long, env = "LAYOUT2MD_PRIMARY_COLUMN")]
    primary_column: bool,

    /// Drop figure captions instead of emitting them as plain text.
    #[arg(long, env = "LAYOUT2MD_DROP_CAPTIONS")]
    drop_captions: bool,

    /// Keep the assembled text exactly as emitted (no final polish).
    #[arg(long, env = "LAYOUT2MD_NO_POLISH")]
    no_polish: bool,

    /// Output structured JSON (ConversionOutput) instead of text.
    #[arg(long, env = "LAYOUT2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "LAYOUT2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Print a summary of the dump only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LAYOUT2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LAYOUT2MD_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Plain,
    Markdown,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Plain => OutputFormat::Plain,
            FormatArg::Markdown => OutputFormat::Markdown,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; verbose always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let summary = inspect(&cli.input)
            .await
            .context("Failed to inspect layout dump")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("Failed to serialize summary")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            println!("Pages:        {}", summary.page_count);
            println!("Blocks:       {}", summary.blocks);
            println!("Lines:        {}", summary.lines);
            println!("Tables:       {}", summary.tables);
            println!("Images:       {}", summary.images);
            if !summary.pages_without_layout.is_empty() {
                println!("No layout:    {:?}", summary.pages_without_layout);
            }
            let sizes: Vec<String> = summary.font_sizes.iter().map(|s| format!("{s}")).collect();
            println!("Font sizes:   {}", sizes.join(", "));
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_path(&cli.input, &config)
        .await
        .context("Conversion failed")?;

    let rendered = if cli.json {
        let mut json =
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        json.push('\n');
        json
    } else {
        output.text.clone()
    };

    match cli.output {
        Some(ref path) => {
            write_output(path, &rendered)
                .await
                .context("Failed to write output")?;
            if !cli.quiet {
                print_summary(&output, Some(path));
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            if !cli.quiet && !show_progress && !cli.json {
                print_summary(&output, None);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages)?;
    let separator = parse_separator(&cli.separator);
    let format = match (cli.format, cli.output.as_deref()) {
        (Some(f), _) => f.into(),
        (None, Some(path)) => OutputFormat::from_path(path),
        (None, None) => OutputFormat::Plain,
    };
    let reading_order = if cli.primary_column {
        ReadingOrder::PrimaryColumn
    } else {
        ReadingOrder::Full
    };

    let mut builder = ConversionConfig::builder()
        .format(format)
        .pages(pages)
        .page_separator(separator)
        .reading_order(reading_order)
        .drop_captions(cli.drop_captions)
        .polish(!cli.no_polish);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(output: &ConversionOutput, path: Option<&Path>) {
    let stats = &output.stats;
    let target = path
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();
    eprintln!(
        "{}  {}/{} pages  {}ms{}",
        if stats.skipped_pages == 0 {
            green("✔")
        } else {
            yellow("⚠")
        },
        stats.processed_pages,
        stats.total_pages,
        stats.duration_ms,
        target,
    );
    eprintln!(
        "   {} text blocks  /  {} tables  /  {} TOC entries  /  {} headings resolved",
        dim(&stats.text_blocks.to_string()),
        dim(&stats.tables.to_string()),
        dim(&stats.toc_entries.to_string()),
        dim(&stats.resolved_headings.to_string()),
    );
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .with_context(|| format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}

/// Parse `--separator` string into `PageSeparator`. Custom strings keep
/// their case.
fn parse_separator(s: &str) -> PageSeparator {
    match s.to_lowercase().as_str() {
        "none" => PageSeparator::None,
        "hr" | "---" => PageSeparator::HorizontalRule,
        "comment" => PageSeparator::Comment,
        _ => PageSeparator::Custom(s.to_string()),
    }
}
