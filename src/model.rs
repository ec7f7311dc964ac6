//! Data handed from the extractor to the Markdown engine.
//!
//! Everything here is produced once per document and consumed once when the
//! page it belongs to is assembled.

use serde::{Deserialize, Serialize};

/// One extracted table: rows of cells, `None` where a cell holds no text.
pub type CellGrid = Vec<Vec<Option<String>>>;

/// An embedded image that was accepted by the page policy and written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// 1-indexed page number.
    pub page: usize,
    /// 1-indexed position among the image objects of that page.
    pub index: usize,
    /// File name inside the image directory, e.g. `report_page_3_img_1.png`.
    pub filename: String,
}

impl ImageRef {
    pub fn new(page: usize, index: usize, filename: impl Into<String>) -> Self {
        Self {
            page,
            index,
            filename: filename.into(),
        }
    }
}

/// A table that passed [`crate::pipeline::table::is_table_eligible`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecord {
    /// 1-indexed page number.
    pub page: usize,
    /// 1-indexed position among the tables detected on that page.
    pub index: usize,
    pub cells: CellGrid,
}

/// Everything the extractor pulls out of one PDF.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Page text joined into one stream, each page introduced by a
    /// `--- 第 N 页 ---` marker line.
    pub text: String,
    /// Accepted images, in extraction order.
    pub images: Vec<ImageRef>,
    /// Accepted tables, in extraction order.
    pub tables: Vec<TableRecord>,
    /// Total page count of the source document.
    pub page_count: usize,
    /// Images dropped by the last-two-pages policy.
    pub images_skipped: usize,
    /// Images that failed to decode or write.
    pub asset_errors: Vec<crate::error::AssetError>,
}
