//! Table detection from positioned text.
//!
//! pdfium exposes text segments with bounding boxes but no notion of tables,
//! so grids are inferred from alignment:
//!
//! 1. Cluster segments into rows by vertical centre.
//! 2. Find runs of consecutive rows with at least `min_cols` segments whose
//!    segment counts differ by at most one.
//! 3. Cluster left edges across the run into column boundaries.
//! 4. Assign each segment to the column containing its horizontal centre.
//!
//! The detector only proposes grids. Whether a grid is kept is decided by
//! [`super::table::is_table_eligible`].

use std::cmp::Ordering;

use tracing::trace;

use crate::model::{CellGrid, TableRecord};

/// A text segment in top-left-origin page coordinates (points).
#[derive(Debug, Clone, PartialEq)]
pub struct TextCell {
    pub text: String,
    /// Left edge.
    pub x: f32,
    /// Top edge, measured down from the top of the page.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl TextCell {
    fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Tuning for [`detect_tables`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetectorConfig {
    /// Segments whose vertical centres are within this distance share a row.
    pub row_tolerance: f32,
    /// Left edges closer than this belong to the same column.
    pub col_tolerance: f32,
    /// Fewest rows a region needs.
    pub min_rows: usize,
    /// Fewest segments a row needs to be part of a region.
    pub min_cols: usize,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            row_tolerance: 5.0,
            col_tolerance: 10.0,
            min_rows: 2,
            min_cols: 2,
        }
    }
}

fn cmp_f32(a: f32, b: f32) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Detect table grids among the text segments of one page.
///
/// Grids come back top to bottom. Columns without text in a given row are
/// `None`; segments that fall into the same cell are joined with a space.
pub fn detect_tables(cells: &[TextCell], config: &TableDetectorConfig) -> Vec<CellGrid> {
    let cells: Vec<&TextCell> = cells.iter().filter(|c| !c.text.trim().is_empty()).collect();
    if cells.len() < config.min_rows * config.min_cols {
        return Vec::new();
    }

    let rows = cluster_rows(&cells, config.row_tolerance);
    let regions = find_regions(&rows, config);
    trace!(rows = rows.len(), regions = regions.len(), "table regions located");

    regions
        .iter()
        .filter_map(|region| build_grid(region, config))
        .collect()
}

type Row<'a> = Vec<&'a TextCell>;

fn cluster_rows<'a>(cells: &[&'a TextCell], tolerance: f32) -> Vec<Row<'a>> {
    let mut sorted = cells.to_vec();
    sorted.sort_by(|a, b| cmp_f32(a.y, b.y).then(cmp_f32(a.x, b.x)));

    let mut rows: Vec<Row<'a>> = Vec::new();
    for cell in sorted {
        let home = rows.iter_mut().find(|row| {
            row.first()
                .is_some_and(|first| (cell.center_y() - first.center_y()).abs() <= tolerance)
        });
        match home {
            Some(row) => row.push(cell),
            None => rows.push(vec![cell]),
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| cmp_f32(a.x, b.x));
    }
    rows.sort_by(|a, b| {
        let ay = a.first().map_or(0.0, |c| c.y);
        let by = b.first().map_or(0.0, |c| c.y);
        cmp_f32(ay, by)
    });
    rows
}

fn find_regions<'r, 'a>(rows: &'r [Row<'a>], config: &TableDetectorConfig) -> Vec<&'r [Row<'a>]> {
    let mut regions = Vec::new();
    let mut start: Option<usize> = None;
    let mut expected = 0usize;

    let mut close = |start: &mut Option<usize>, end: usize| {
        if let Some(s) = start.take() {
            if end - s >= config.min_rows {
                regions.push(&rows[s..end]);
            }
        }
    };

    for (i, row) in rows.iter().enumerate() {
        let width = row.len();
        if width < config.min_cols {
            close(&mut start, i);
            continue;
        }
        match start {
            Some(_) if width.abs_diff(expected) <= 1 => {}
            _ => {
                close(&mut start, i);
                start = Some(i);
                expected = width;
            }
        }
    }
    close(&mut start, rows.len());

    regions
}

fn build_grid(region: &[Row<'_>], config: &TableDetectorConfig) -> Option<CellGrid> {
    let bounds = column_bounds(region, config.col_tolerance);
    let columns = bounds.len().saturating_sub(1);
    if columns < config.min_cols {
        return None;
    }

    let grid = region
        .iter()
        .map(|row| {
            let mut out: Vec<Option<String>> = vec![None; columns];
            for cell in row {
                let col = column_of(cell, &bounds).min(columns - 1);
                let text = cell.text.trim();
                match &mut out[col] {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(text);
                    }
                    slot @ None => *slot = Some(text.to_string()),
                }
            }
            out
        })
        .collect();
    Some(grid)
}

/// Left edges of each column plus the right edge of the region.
fn column_bounds(region: &[Row<'_>], tolerance: f32) -> Vec<f32> {
    let mut lefts: Vec<f32> = region.iter().flatten().map(|c| c.x).collect();
    lefts.sort_by(|a, b| cmp_f32(*a, *b));

    let mut bounds: Vec<f32> = Vec::new();
    for x in lefts {
        match bounds.last() {
            Some(&last) if x - last <= tolerance => {}
            _ => bounds.push(x),
        }
    }

    if let Some(right) = region
        .iter()
        .flatten()
        .map(|c| c.right())
        .max_by(|a, b| cmp_f32(*a, *b))
    {
        bounds.push(right);
    }
    bounds
}

fn column_of(cell: &TextCell, bounds: &[f32]) -> usize {
    let center = cell.center_x();
    bounds
        .windows(2)
        .position(|w| center >= w[0] && center < w[1])
        .unwrap_or_else(|| bounds.len().saturating_sub(2))
}

/// Remove page-text lines that repeat table content.
///
/// Lines are trimmed and blank lines dropped. A line is removed when it
/// contains the trimmed text of any non-blank cell of `tables`. With no
/// tables the text is only trimmed line by line.
pub fn strip_table_lines(page_text: &str, tables: &[&TableRecord]) -> String {
    let needles: Vec<&str> = tables
        .iter()
        .flat_map(|t| t.cells.iter().flatten())
        .filter_map(|cell| cell.as_deref().map(str::trim))
        .filter(|text| !text.is_empty())
        .collect();

    page_text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !needles.iter().any(|needle| line.contains(needle)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(text: &str, x: f32, y: f32, width: f32) -> TextCell {
        TextCell {
            text: text.into(),
            x,
            y,
            width,
            height: 10.0,
        }
    }

    fn texts(grid: &CellGrid) -> Vec<Vec<&str>> {
        grid.iter()
            .map(|r| r.iter().map(|c| c.as_deref().unwrap_or("")).collect())
            .collect()
    }

    #[test]
    fn detects_simple_grid_below_paragraph() {
        let cells = vec![
            cell("A paragraph spanning the page", 50.0, 40.0, 400.0),
            cell("名称", 50.0, 100.0, 40.0),
            cell("金额", 200.0, 100.0, 40.0),
            cell("手续费", 50.0, 120.0, 60.0),
            cell("0.6%", 201.0, 121.0, 30.0),
            cell("退款", 52.0, 140.0, 40.0),
            cell("0", 203.0, 139.0, 10.0),
        ];
        let grids = detect_tables(&cells, &TableDetectorConfig::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(
            texts(&grids[0]),
            vec![
                vec!["名称", "金额"],
                vec!["手续费", "0.6%"],
                vec!["退款", "0"],
            ]
        );
    }

    #[test]
    fn missing_cell_is_none() {
        let cells = vec![
            cell("a", 50.0, 100.0, 20.0),
            cell("b", 150.0, 100.0, 20.0),
            cell("c", 250.0, 100.0, 20.0),
            cell("1", 50.0, 120.0, 20.0),
            cell("3", 250.0, 120.0, 20.0),
        ];
        let grids = detect_tables(&cells, &TableDetectorConfig::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0][1], vec![Some("1".into()), None, Some("3".into())]);
    }

    #[test]
    fn single_column_text_is_not_a_table() {
        let cells: Vec<TextCell> = (0..5)
            .map(|i| cell("line", 50.0, 100.0 + 20.0 * i as f32, 300.0))
            .collect();
        assert!(detect_tables(&cells, &TableDetectorConfig::default()).is_empty());
    }

    #[test]
    fn one_multi_cell_row_is_not_a_table() {
        let cells = vec![
            cell("left", 50.0, 100.0, 20.0),
            cell("right", 200.0, 100.0, 20.0),
            cell("body text", 50.0, 140.0, 300.0),
        ];
        assert!(detect_tables(&cells, &TableDetectorConfig::default()).is_empty());
    }

    #[test]
    fn blank_segments_are_ignored() {
        let cells = vec![
            cell("a", 50.0, 100.0, 20.0),
            cell("  ", 120.0, 100.0, 20.0),
            cell("b", 200.0, 100.0, 20.0),
            cell("1", 50.0, 120.0, 20.0),
            cell("2", 200.0, 120.0, 20.0),
        ];
        let grids = detect_tables(&cells, &TableDetectorConfig::default());
        assert_eq!(texts(&grids[0]), vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn strip_removes_lines_with_cell_text() {
        let table = TableRecord {
            page: 1,
            index: 1,
            cells: vec![
                vec![Some("名称".into()), Some(" 金额 ".into())],
                vec![Some("手续费".into()), None],
            ],
        };
        let text = "概述\n名称 金额\n\n手续费 0.6%\n  结论  ";
        assert_eq!(strip_table_lines(text, &[&table]), "概述\n结论");
    }

    #[test]
    fn strip_ignores_blank_cells() {
        let table = TableRecord {
            page: 1,
            index: 1,
            cells: vec![vec![Some(" ".into()), Some(String::new())]],
        };
        assert_eq!(strip_table_lines("a b\nc", &[&table]), "a b\nc");
    }
}
