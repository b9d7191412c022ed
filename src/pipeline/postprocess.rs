//! Post-processing: deterministic polish of the assembled document.
//!
//! The assembler already emits well-formed output; these passes only remove
//! what the source document smuggled in (invisible code points, stray
//! carriage returns) and what empty pages leave behind (long runs of blank
//! lines). They never touch the markers, so the polished text keeps the
//! same paragraph and heading structure.
//!
//! Markdown hard breaks are two trailing spaces, so this module must never
//! trim trailing whitespace inside the document.

use crate::config::OutputFormat;
use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all polish rules to an assembled document.
///
/// 1. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Collapse runs of blank lines to at most two
/// 4. End with exactly one newline
pub fn polish(input: &str, format: OutputFormat) -> String {
    let s = strip_invisible(input);
    let s = normalise_line_endings(&s);
    let s = collapse_blank_lines(&s, format);
    ensure_final_newline(&s)
}

// ── Rule 1: Remove invisible Unicode characters ─────────────────────────────

const INVISIBLE: [char; 6] = [
    '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
];

/// Remove zero-width and soft-hyphen code points.
///
/// Also applied to span text before normalisation: a zero-width space
/// between two Han characters would otherwise survive the Han-joining rule.
pub fn strip_invisible(input: &str) -> String {
    if !input.contains(INVISIBLE) {
        return input.to_string();
    }
    input.replace(INVISIBLE, "")
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Collapse excessive blank lines ───────────────────────────────────

static RE_PLAIN_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());
static RE_MARKDOWN_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:  \n){4,}").unwrap());

fn collapse_blank_lines(input: &str, format: OutputFormat) -> String {
    let re = match format {
        OutputFormat::Plain => &RE_PLAIN_BLANKS,
        OutputFormat::Markdown => &RE_MARKDOWN_BLANKS,
    };
    re.replace_all(input, format.line_separator().repeat(3))
        .into_owned()
}

// ── Rule 4: Ensure file ends with single newline ─────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
