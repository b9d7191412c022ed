//! Table validation and Markdown rendering.
//!
//! Table detectors are generous: a ruled header line becomes a one-row
//! "table", a framed figure becomes a grid of empty cells. Both are dropped
//! here. Surviving tables own their vertical band on the page, and text
//! blocks inside that band are discarded because they duplicate cell text.

use crate::layout::TableCandidate;
use crate::pipeline::normalize::normalize;

/// Row-major grid of optional cell strings.
pub type Grid = Vec<Vec<Option<String>>>;

/// A validated table and the vertical band it occupies.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRegion {
    pub grid: Grid,
    pub y0: f64,
    pub y1: f64,
}

impl TableRegion {
    /// Validate a parser candidate.
    pub fn from_candidate(candidate: &TableCandidate) -> Option<Self> {
        validate(candidate.grid.clone()).map(|grid| TableRegion {
            grid,
            y0: candidate.bbox.y0,
            y1: candidate.bbox.y1,
        })
    }

    /// True when `y0..y1` lies fully inside the table's band.
    pub fn contains(&self, y0: f64, y1: f64) -> bool {
        self.y0 <= y0 && y1 <= self.y1
    }
}

/// Reject grids with at most one row or without any non-blank cell.
pub fn validate(grid: Grid) -> Option<Grid> {
    if grid.len() <= 1 {
        return None;
    }
    let has_content = grid
        .iter()
        .flatten()
        .any(|cell| cell.as_deref().is_some_and(|c| !normalize(c).is_empty()));
    has_content.then_some(grid)
}

/// Render a grid as a GitHub-flavoured Markdown table.
///
/// The first row is the header. Every row, including the separator, ends
/// with `line_sep`. Ragged rows are padded to the widest row.
pub fn render(grid: &[Vec<Option<String>>], line_sep: &str) -> String {
    let col_count = grid.iter().map(Vec::len).max().unwrap_or(0);
    if grid.is_empty() || col_count == 0 {
        return String::new();
    }

    let mut md = String::new();
    for (i, row) in grid.iter().enumerate() {
        let cells: Vec<String> = (0..col_count)
            .map(|col| {
                row.get(col)
                    .and_then(|c| c.as_deref())
                    .map(render_cell)
                    .unwrap_or_default()
            })
            .collect();
        md.push_str("| ");
        md.push_str(&cells.join(" | "));
        md.push_str(" |");
        md.push_str(line_sep);

        if i == 0 {
            md.push_str("| ");
            md.push_str(&vec!["---"; col_count].join(" | "));
            md.push_str(" |");
            md.push_str(line_sep);
        }
    }
    md
}

fn render_cell(cell: &str) -> String {
    normalize(cell).replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BBox;

    fn grid(rows: &[&[Option<&str>]]) -> Grid {
        rows.iter()
            .map(|r| r.iter().map(|c| c.map(str::to_string)).collect())
            .collect()
    }

    #[test]
    fn renders_two_by_two() {
        let g = grid(&[&[Some("A"), Some("B")], &[Some("1"), Some("2")]]);
        assert_eq!(
            render(&g, "\n"),
            "| A | B |\n| --- | --- |\n| 1 | 2 |\n"
        );
    }

    #[test]
    fn renders_with_markdown_separator() {
        let g = grid(&[&[Some("A"), Some("B")], &[Some("1"), Some("2")]]);
        assert_eq!(
            render(&g, "  \n"),
            "| A | B |  \n| --- | --- |  \n| 1 | 2 |  \n"
        );
    }

    #[test]
    fn single_row_is_rejected() {
        assert_eq!(validate(grid(&[&[Some("A"), Some("B")]])), None);
        assert_eq!(validate(Vec::new()), None);
    }

    #[test]
    fn all_blank_cells_are_rejected() {
        let g = grid(&[&[None, Some("  ")], &[Some(""), None]]);
        assert_eq!(validate(g), None);
    }

    #[test]
    fn one_filled_cell_is_enough() {
        let g = grid(&[&[None, None], &[Some("x"), None]]);
        assert!(validate(g).is_some());
    }

    #[test]
    fn null_cells_render_empty_and_rows_are_padded() {
        let g = grid(&[&[Some("H1"), Some("H2"), Some("H3")], &[None, Some("b")]]);
        assert_eq!(
            render(&g, "\n"),
            "| H1 | H2 | H3 |\n| --- | --- | --- |\n|  | b |  |\n"
        );
    }

    #[test]
    fn cells_are_normalised_and_pipes_escaped() {
        let g = grid(&[&[Some("中 文"), Some("a|b")], &[Some("x\ny"), Some("1 , 2")]]);
        let md = render(&g, "\n");
        assert!(md.starts_with("| 中文 | a\\|b |\n"), "got: {md}");
        assert!(md.ends_with("| xy | 1, 2 |\n"), "got: {md}");
    }

    #[test]
    fn region_contains_only_fully_inside_blocks() {
        let candidate = TableCandidate {
            bbox: BBox::new(72.0, 200.0, 520.0, 300.0),
            grid: grid(&[&[Some("A")], &[Some("1")]]),
        };
        let region = TableRegion::from_candidate(&candidate).unwrap();
        assert!(region.contains(210.0, 290.0));
        assert!(region.contains(200.0, 300.0));
        assert!(!region.contains(190.0, 250.0));
        assert!(!region.contains(250.0, 310.0));
    }
}
