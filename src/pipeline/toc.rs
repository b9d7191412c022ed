//! Table-of-contents detection, title indexing and heading resolution.
//!
//! Typeset documents print their TOC as dotted-leader lines:
//!
//! ```text
//! 1 Introduction ............ 1
//! 1.1 Background ............ 2
//! ```
//!
//! Those lines are captured instead of being emitted as body text. When the
//! TOC region ends, the captured entries are compiled into a [`TitleIndex`]
//! that maps each title to its breadcrumb (`1-1.1-Background`), and in-body
//! headings whose text matches a title are rewritten to that breadcrumb. Local
//! indentation alone cannot tell a chapter from a subsection; the TOC can.

use crate::config::OutputFormat;
use crate::pipeline::classify::ClassifiedBlock;
use crate::pipeline::normalize::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `<numbering>? <title> <leader> <page>` over normalised text.
///
/// The leader is three or more of `- . · ─`, or two or more `…` (CJK
/// typesetting prints a leader as a pair of ellipses).
static RE_TOC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<num>\p{Nd}+(?:\.\p{Nd}+)*\.?)?",
        r"\p{Z}*",
        r"(?P<title>[\p{Han}\p{Latin}\p{Nd}\p{Z}\p{P}]*?)",
        r"(?:[-.·─]{3,}|…{2,})",
        r"\p{Z}*",
        r"(?P<page>[\p{Han}\p{Nd}！。)）]+)$",
    ))
    .unwrap()
});

/// One captured TOC line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Dotted section number without a trailing dot, e.g. `2.3`. May be empty.
    pub numbering: String,
    /// Normalised title text. May be empty when the line is only a number.
    pub title: String,
    /// The page reference as printed.
    pub page_label: String,
    /// `page_label` as a number when it is all digits.
    pub page_ref: Option<u32>,
}

impl TocEntry {
    pub fn new(numbering: impl Into<String>, title: impl Into<String>, page_label: impl Into<String>) -> Self {
        let page_label = page_label.into();
        let page_ref = page_label.parse().ok();
        Self {
            numbering: numbering.into(),
            title: title.into(),
            page_label,
            page_ref,
        }
    }

    /// Nesting depth: number of numbering segments. Entries without a
    /// parsable number sit at depth 1.
    pub fn depth(&self) -> usize {
        if self.numbering.is_empty() {
            return 1;
        }
        let segments = self.numbering.split('.').collect::<Vec<_>>();
        if segments.iter().all(|s| !s.is_empty() && s.chars().all(char::is_numeric)) {
            segments.len()
        } else {
            1
        }
    }

    /// Numbering and title as printed in the TOC, e.g. `1.1 Background`.
    pub fn display_title(&self) -> String {
        normalize(&format!("{} {}", self.numbering, self.title))
    }
}

/// Parse one normalised line against the TOC grammar.
///
/// Lines with neither a numbering nor a title (a bare leader before a page
/// number) are rejected; page footers like `---- 12` look exactly like that.
pub fn parse_line(text: &str) -> Option<TocEntry> {
    let caps = RE_TOC_LINE.captures(text)?;
    let numbering = caps
        .name("num")
        .map(|m| m.as_str().trim_end_matches('.'))
        .unwrap_or_default();
    let title = normalize(caps.name("title").map(|m| m.as_str()).unwrap_or_default());
    if numbering.is_empty() && title.is_empty() {
        return None;
    }
    let page = caps.name("page").map(|m| m.as_str()).unwrap_or_default();
    Some(TocEntry::new(numbering, title, page))
}

/// TOC lines found in one block, with the rows around them that are not TOC
/// lines (a "Contents" title above the entries, say).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TocMatch {
    pub entries: Vec<TocEntry>,
    /// Non-matching rows before the first entry, joined.
    pub leading: Option<String>,
    /// Non-matching rows after the first entry, joined.
    pub trailing: Option<String>,
}

/// Match a classified block against the TOC grammar, row by row.
///
/// Parsers often merge a whole TOC column into a single block, so every
/// visual row is a candidate line. Rows that don't match are kept as text,
/// except when they are the head of a wrapped entry: an unnumbered match
/// preceded by such rows is re-parsed with them, and the merged line wins if
/// it carries a numbering. With no matching row at all, the joined block text
/// must match as one line.
pub fn match_block(block: &ClassifiedBlock) -> Option<TocMatch> {
    let mut found = TocMatch::default();
    let mut leading: Vec<&str> = Vec::new();
    let mut trailing: Vec<&str> = Vec::new();
    let mut pending: Vec<&str> = Vec::new();

    for row in &block.rows {
        let Some(entry) = parse_line(row) else {
            pending.push(row);
            continue;
        };
        let merged = if !pending.is_empty() && entry.numbering.is_empty() {
            parse_line(&normalize(&format!("{} {}", pending.join(" "), row)))
                .filter(|e| !e.numbering.is_empty())
        } else {
            None
        };
        match merged {
            Some(wrapped) => {
                pending.clear();
                found.entries.push(wrapped);
            }
            None => {
                let spill = if found.entries.is_empty() { &mut leading } else { &mut trailing };
                spill.append(&mut pending);
                found.entries.push(entry);
            }
        }
    }

    if found.entries.is_empty() {
        return parse_line(&block.text).map(|e| TocMatch {
            entries: vec![e],
            ..Default::default()
        });
    }
    trailing.append(&mut pending);
    found.leading = join_rows(&leading);
    found.trailing = join_rows(&trailing);
    Some(found)
}

fn join_rows(rows: &[&str]) -> Option<String> {
    let text = normalize(&rows.join(" "));
    (!text.is_empty()).then_some(text)
}

/// Render the captured TOC as one paragraph per entry.
pub fn render_toc(entries: &[TocEntry], format: OutputFormat) -> String {
    let mut out = String::new();
    for entry in entries {
        let title = entry.display_title();
        if title.is_empty() {
            continue;
        }
        out.push_str(format.paragraph_marker());
        out.push_str(&title);
        out.push_str(format.line_separator());
    }
    out
}

// ── Title index ──────────────────────────────────────────────────────────────

/// A TOC entry with its resolved breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedTitle {
    pub entry: TocEntry,
    pub breadcrumb: String,
}

/// Normalised title → breadcrumb lookup built from the TOC.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    titles: Vec<IndexedTitle>,
    by_key: HashMap<String, Vec<usize>>,
}

impl TitleIndex {
    /// Compile entries with a numbering-depth stack.
    ///
    /// Before an entry is pushed, every stacked entry at the same or a
    /// deeper level is popped, so the stack always holds the ancestor chain.
    /// The breadcrumb is the chain's numberings joined by `-`, followed by
    /// the entry's own title.
    pub fn build(entries: &[TocEntry]) -> Self {
        let mut index = TitleIndex::default();
        let mut stack: Vec<(usize, &str)> = Vec::new();

        for entry in entries {
            let depth = entry.depth();
            while stack.last().is_some_and(|(d, _)| *d >= depth) {
                stack.pop();
            }
            stack.push((depth, entry.numbering.as_str()));

            let mut parts: Vec<&str> = stack
                .iter()
                .map(|(_, n)| *n)
                .filter(|n| !n.is_empty())
                .collect();
            if !entry.title.is_empty() {
                parts.push(entry.title.as_str());
            }
            let breadcrumb = parts.join("-");

            let slot = index.titles.len();
            for key in [entry.title.clone(), entry.display_title()] {
                if key.is_empty() {
                    continue;
                }
                let slots = index.by_key.entry(key).or_default();
                if !slots.contains(&slot) {
                    slots.push(slot);
                }
            }
            index.titles.push(IndexedTitle {
                entry: entry.clone(),
                breadcrumb,
            });
        }
        index
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IndexedTitle> {
        self.titles.iter()
    }

    /// Breadcrumb for a body block whose normalised text is `text`.
    ///
    /// When several entries share the title, the one whose page reference
    /// lands on `page_index` wins (printed page 1 is the first body page);
    /// otherwise the first entry in TOC order.
    pub fn resolve(&self, text: &str, page_index: usize, body_start: Option<usize>) -> Option<&str> {
        let slots = self.by_key.get(text)?;
        let on_page = body_start.and_then(|start| {
            slots.iter().find(|&&slot| {
                self.titles[slot]
                    .entry
                    .page_ref
                    .and_then(|p| (start + p as usize).checked_sub(1))
                    == Some(page_index)
            })
        });
        on_page
            .or_else(|| slots.first())
            .map(|&slot| self.titles[slot].breadcrumb.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::classify::BlockKind;

    fn block(rows: &[&str]) -> ClassifiedBlock {
        ClassifiedBlock {
            kind: BlockKind::Plain,
            text: normalize(&rows.join(" ")),
            rows: rows.iter().map(|r| normalize(r)).collect(),
            x0: 72.0,
            y0: 100.0,
            y1: 120.0,
        }
    }

    #[test]
    fn parses_numbered_latin_line() {
        let e = parse_line(&normalize("1 Intro .... 2")).unwrap();
        assert_eq!(e.numbering, "1");
        assert_eq!(e.title, "Intro");
        assert_eq!(e.page_ref, Some(2));
    }

    #[test]
    fn parses_nested_numbering_and_dash_leader() {
        let e = parse_line(&normalize("2.3.1 Error model ------ 45")).unwrap();
        assert_eq!(e.numbering, "2.3.1");
        assert_eq!(e.title, "Error model");
        assert_eq!(e.depth(), 3);
        assert_eq!(e.page_label, "45");
    }

    #[test]
    fn parses_cjk_line_with_ellipsis_leader() {
        let e = parse_line(&normalize("第一章 总则 …… 1")).unwrap();
        assert_eq!(e.numbering, "");
        assert_eq!(e.title, "第一章总则");
        assert_eq!(e.page_ref, Some(1));
    }

    #[test]
    fn trailing_dot_numbering() {
        let e = parse_line(&normalize("3. Results ..... 17")).unwrap();
        assert_eq!(e.numbering, "3");
        assert_eq!(e.title, "Results");
    }

    #[test]
    fn rejects_prose_and_bare_leaders() {
        assert!(parse_line("This is an ordinary sentence.").is_none());
        assert!(parse_line("....12").is_none());
        assert!(parse_line("Two dots..5").is_none());
        assert!(parse_line("").is_none());
    }

    #[test]
    fn non_numeric_page_label() {
        let e = parse_line("附录....三").unwrap();
        assert_eq!(e.title, "附录");
        assert_eq!(e.page_ref, None);
    }

    #[test]
    fn depth_clamps_malformed_numbering() {
        assert_eq!(TocEntry::new("", "Preface", "1").depth(), 1);
        assert_eq!(TocEntry::new("1..2", "x", "1").depth(), 1);
        assert_eq!(TocEntry::new("4.1", "x", "1").depth(), 2);
    }

    #[test]
    fn multi_row_block_yields_entry_per_row() {
        let b = block(&["1 Intro....2", "1.1 Background....3"]);
        let m = match_block(&b).unwrap();
        assert_eq!(m.entries.len(), 2);
        assert_eq!(m.entries[1].numbering, "1.1");
        assert_eq!(m.leading, None);
        assert_eq!(m.trailing, None);
    }

    #[test]
    fn wrapped_single_entry_matches_joined_text() {
        let b = block(&["1 A very long chapter", "title....9"]);
        let m = match_block(&b).unwrap();
        assert_eq!(m.entries.len(), 1);
        assert_eq!(m.entries[0].title, "A very long chapter title");
        assert_eq!(m.entries[0].page_ref, Some(9));
        assert_eq!(m.leading, None);
    }

    #[test]
    fn contents_title_row_is_kept_apart_from_entries() {
        let b = block(&["Contents", "1 Intro .... 2", "2 Usage .... 5"]);
        let m = match_block(&b).unwrap();
        let titles: Vec<&str> = m.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro", "Usage"]);
        assert_eq!(m.entries[1].page_ref, Some(5));
        assert_eq!(m.leading.as_deref(), Some("Contents"));
        assert_eq!(m.trailing, None);
    }

    #[test]
    fn rows_after_the_entries_are_trailing_text() {
        let b = block(&["1 Intro .... 2", "Revised edition"]);
        let m = match_block(&b).unwrap();
        assert_eq!(m.entries.len(), 1);
        assert_eq!(m.leading, None);
        assert_eq!(m.trailing.as_deref(), Some("Revised edition"));
    }

    #[test]
    fn single_line_block_without_leader_is_not_toc() {
        assert!(match_block(&block(&["Just a paragraph", "of two rows."])).is_none());
    }

    #[test]
    fn breadcrumbs_follow_numbering_stack() {
        let entries: Vec<TocEntry> = ["1", "1.1", "1.2", "2"]
            .iter()
            .map(|n| TocEntry::new(*n, "", "1"))
            .collect();
        let index = TitleIndex::build(&entries);
        let crumbs: Vec<&str> = index.iter().map(|t| t.breadcrumb.as_str()).collect();
        assert_eq!(crumbs, vec!["1", "1-1.1", "1-1.2", "2"]);
    }

    #[test]
    fn breadcrumbs_end_with_title() {
        let entries = vec![
            TocEntry::new("1", "Intro", "2"),
            TocEntry::new("1.1", "Background", "2"),
            TocEntry::new("1.1.1", "Prior work", "3"),
            TocEntry::new("1.2", "Scope", "4"),
        ];
        let index = TitleIndex::build(&entries);
        assert_eq!(index.resolve("Intro", 1, Some(1)), Some("1-Intro"));
        assert_eq!(index.resolve("Prior work", 1, Some(1)), Some("1-1.1-1.1.1-Prior work"));
        assert_eq!(index.resolve("Scope", 1, Some(1)), Some("1-1.2-Scope"));
        assert_eq!(index.resolve("1.2 Scope", 1, Some(1)), Some("1-1.2-Scope"));
        assert_eq!(index.resolve("Conclusion", 1, Some(1)), None);
    }

    #[test]
    fn skipped_levels_pop_by_depth() {
        let entries = vec![
            TocEntry::new("1", "A", "1"),
            TocEntry::new("1.1.1", "B", "1"),
            TocEntry::new("1.1.2", "C", "1"),
        ];
        let index = TitleIndex::build(&entries);
        assert_eq!(index.resolve("C", 0, None), Some("1-1.1.2-C"));
    }

    #[test]
    fn duplicate_titles_prefer_matching_page() {
        let entries = vec![
            TocEntry::new("1", "Overview", "1"),
            TocEntry::new("2", "Overview", "5"),
        ];
        let index = TitleIndex::build(&entries);
        // body starts at index 3: printed page 5 is index 7
        assert_eq!(index.resolve("Overview", 7, Some(3)), Some("2-Overview"));
        assert_eq!(index.resolve("Overview", 3, Some(3)), Some("1-Overview"));
        assert_eq!(index.resolve("Overview", 12, Some(3)), Some("1-Overview"));
    }

    #[test]
    fn renders_toc_block_per_format() {
        let entries = vec![TocEntry::new("1", "Intro", "2"), TocEntry::new("1.1", "Background", "2")];
        assert_eq!(
            render_toc(&entries, OutputFormat::Plain),
            "$$$1 Intro\n$$$1.1 Background\n"
        );
        assert_eq!(
            render_toc(&entries, OutputFormat::Markdown),
            "1 Intro  \n1.1 Background  \n"
        );
    }
}
