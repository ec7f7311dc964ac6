//! Cell grids → GFM pipe tables.
//!
//! The renderer is deliberately dumb: the first grid row is always treated as
//! the header, whether or not it semantically is one, because a pipe table is
//! not valid Markdown without a separator row.

use crate::model::CellGrid;

/// Decide whether an extracted grid is a real table.
///
/// Detectors happily report a block of single-column text as a table. A grid
/// is accepted only when at least two rows carry text and at least one row
/// carries text in two or more cells.
pub fn is_table_eligible(grid: &CellGrid) -> bool {
    let filled = |cell: &Option<String>| cell.as_deref().is_some_and(|c| !c.trim().is_empty());

    let rows_with_text = grid
        .iter()
        .filter(|row| row.iter().any(filled))
        .count();
    if rows_with_text < 2 {
        return false;
    }

    let widest = grid
        .iter()
        .map(|row| row.iter().filter(|c| filled(c)).count())
        .max()
        .unwrap_or(0);
    widest >= 2
}

/// Render `grid` as a pipe table.
///
/// Returns an empty string when the grid or its first row is empty. When
/// `keep_text` is `false` every cell is blanked, which keeps the table shape
/// in the document without its content.
///
/// Rows with no cells, or with every cell `None`/empty, are left out. The
/// `| --- |` separator follows grid row 0, so a blank first row means the
/// table has no separator at all.
pub fn render_table(grid: &CellGrid, keep_text: bool) -> String {
    match grid.first() {
        Some(first) if !first.is_empty() => {}
        _ => return String::new(),
    }

    let mut md = String::new();
    for (i, row) in grid.iter().enumerate() {
        if row.iter().all(|c| c.as_deref().is_none_or(str::is_empty)) {
            continue;
        }

        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(text) if keep_text => text.replace('\n', " ").trim().to_string(),
                _ => String::new(),
            })
            .collect();

        md.push_str("| ");
        md.push_str(&cells.join(" | "));
        md.push_str(" |\n");

        if i == 0 {
            md.push_str("| ");
            md.push_str(&vec!["---"; cells.len()].join(" | "));
            md.push_str(" |\n");
        }
    }

    md.push('\n');
    md
}
