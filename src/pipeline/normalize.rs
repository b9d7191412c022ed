//! Script-aware whitespace and punctuation normalisation.
//!
//! Parsers split text into spans at arbitrary points and pad them with
//! spaces that were never in the source document: CJK text comes out as
//! `中 文`, punctuation floats between spaces, and wrapped lines leave line
//! breaks in the middle of sentences. [`normalize`] undoes this with six
//! ordered regex passes over Unicode script classes.
//!
//! The function is pure, total and idempotent:
//! `normalize(&normalize(s)) == normalize(s)`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules in order.
///
/// 1. Remove line breaks and full-width spaces
/// 2. Delete spacing between two Han characters
/// 3. Space Han apart from adjacent Latin letters and digits
/// 4. Remove spacing around punctuation
/// 5. One space after `,` `:` `;`
/// 6. Collapse spacing runs, trim
pub fn normalize(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let s = remove_breaks(input);
    let s = join_han(&s);
    let s = space_han_latin(&s);
    let s = tighten_punctuation(&s);
    let s = space_after_separators(&s);
    collapse_spaces(&s)
}

// ── Rule 1: Line breaks and full-width spaces ────────────────────────────────

static RE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\x{3000}]+").unwrap());

fn remove_breaks(input: &str) -> String {
    RE_BREAKS.replace_all(input, "").into_owned()
}

// ── Rule 2: Han–space–Han ────────────────────────────────────────────────────

static RE_HAN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\p{Han})\p{Z}+(\p{Han})").unwrap());

/// A match consumes the trailing Han character, so `中 文 字` needs a second
/// pass for the `文 字` gap. Each pass shortens the string.
fn join_han(input: &str) -> String {
    let mut s = input.to_string();
    while RE_HAN_GAP.is_match(&s) {
        s = RE_HAN_GAP.replace_all(&s, "${1}${2}").into_owned();
    }
    s
}

// ── Rule 3: Han next to Latin / digits ───────────────────────────────────────

static RE_HAN_LATIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\p{Han})([\p{Latin}\p{Nd}])").unwrap());
static RE_LATIN_HAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\p{Latin}\p{Nd}])(\p{Han})").unwrap());

fn space_han_latin(input: &str) -> String {
    let s = RE_HAN_LATIN.replace_all(input, "${1} ${2}");
    RE_LATIN_HAN.replace_all(&s, "${1} ${2}").into_owned()
}

// ── Rule 4: Spacing around punctuation ───────────────────────────────────────

static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Z}*(\p{P})\p{Z}*").unwrap());

fn tighten_punctuation(input: &str) -> String {
    RE_PUNCT.replace_all(input, "${1}").into_owned()
}

// ── Rule 5: Space after list separators ──────────────────────────────────────

static RE_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"([,:;])").unwrap());

fn space_after_separators(input: &str) -> String {
    RE_SEPARATORS.replace_all(input, "${1} ").into_owned()
}

// ── Rule 6: Collapse and trim ────────────────────────────────────────────────

static RE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Z}+").unwrap());

fn collapse_spaces(input: &str) -> String {
    RE_SPACES.replace_all(input, " ").trim().to_string()
}
