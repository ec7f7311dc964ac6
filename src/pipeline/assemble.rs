//! Page assembly: splice each page's images and tables into the re-flowed
//! text and wrap the result in a titled document.

use tracing::debug;

use super::blocks::{render_document, Block};
use super::reflow::{reflow, PageAssetSource};
use super::table::render_table;
use crate::model::{ImageRef, TableRecord};

/// The assets of one document, looked up page by page while the text is
/// re-flowed.
#[derive(Debug, Clone, Copy)]
pub struct PageAssets<'a> {
    pub images: &'a [ImageRef],
    pub tables: &'a [TableRecord],
    /// Directory name used in image links, relative to the Markdown file.
    pub image_dir: &'a str,
    /// `false` renders every table with blank cells.
    pub keep_table_text: bool,
}

impl<'a> PageAssets<'a> {
    pub fn new(images: &'a [ImageRef], tables: &'a [TableRecord], image_dir: &'a str) -> Self {
        Self {
            images,
            tables,
            image_dir,
            keep_table_text: true,
        }
    }

    pub fn keep_table_text(mut self, keep: bool) -> Self {
        self.keep_table_text = keep;
        self
    }
}

impl PageAssetSource for PageAssets<'_> {
    /// Images of the page, then a rule if there were any; then each table,
    /// followed by a rule when it rendered to something.
    fn page_blocks(&self, page: usize) -> Vec<Block> {
        let mut blocks = Vec::new();

        let images: Vec<Block> = self
            .images
            .iter()
            .filter(|img| img.page == page)
            .map(|img| Block::Image {
                index: img.index,
                dir: self.image_dir.to_string(),
                filename: img.filename.clone(),
            })
            .collect();
        if !images.is_empty() {
            blocks.extend(images);
            blocks.push(Block::Rule);
        }

        for table in self.tables.iter().filter(|t| t.page == page) {
            let md = render_table(&table.cells, self.keep_table_text);
            if md.trim().is_empty() {
                continue;
            }
            blocks.push(Block::Table(md));
            blocks.push(Block::Rule);
        }

        if !blocks.is_empty() {
            debug!(page, blocks = blocks.len(), "page assets inserted");
        }
        blocks
    }
}

/// Build the complete Markdown document for one PDF.
///
/// `text` is the page-marked stream produced by the extractor. The output
/// starts with `# {title}` and every block is followed by one blank line.
pub fn to_markdown(text: &str, title: &str, assets: &PageAssets<'_>) -> String {
    let mut blocks = vec![Block::Title(title.to_string())];
    blocks.extend(reflow(text, assets));
    render_document(&blocks)
}
