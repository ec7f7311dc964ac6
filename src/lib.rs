//! # reflow-pdf2md
//!
//! Convert PDF documents to Markdown by re-flowing the extracted text layer.
//!
//! ## Why re-flow?
//!
//! The text layer of a typical business PDF is good enough to read but has
//! lost its structure: numbered headings are split from their titles, bullet
//! descriptions land on the next line, and page numbers sit between
//! paragraphs. This crate extracts text, tables and images with pdfium, then
//! rebuilds headings, list items and paragraphs with a small line-oriented
//! state machine. No model, no OCR, no network.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate the file, discover a batch
//!  ├─ 2. Extract   page text + table grids + images via pdfium
//!  ├─ 3. Reflow    drop page numbers, merge split headings and bullets
//!  ├─ 4. Assemble  splice each page's images and tables at its marker
//!  └─ 5. Output    {title}.md + images/ per document, batch report
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reflow_pdf2md::{convert_batch, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert_batch("pdfs", "markdown_docs_with_images", &config, true)?;
//!     println!("{}/{} converted, {} images", report.succeeded, report.total, report.total_images);
//!     for failed in &report.failed {
//!         eprintln!("{}: {}", failed.name, failed.error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! The text engine is usable on its own, without pdfium:
//!
//! ```rust
//! use reflow_pdf2md::{to_markdown, PageAssets};
//!
//! let text = "\n\n--- 第 1 页 ---\n\n3.\n市场分析\n12\n正文";
//! let md = to_markdown(text, "报告", &PageAssets::new(&[], &[], "images"));
//! assert_eq!(md, "# 报告\n\n## 3. 市场分析\n\n正文\n\n");
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2md` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! reflow-pdf2md = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_batch, convert_batch_with, convert_file, convert_file_with};
pub use error::{AssetError, Pdf2MdError};
pub use model::{CellGrid, Extraction, ImageRef, TableRecord};
pub use output::{BatchReport, ConversionOutput, ConversionStats, FailedDocument};
pub use pipeline::assemble::{to_markdown, PageAssets};
pub use pipeline::extract::{ExtractRequest, PdfExtractor, PdfiumExtractor, UnavailableExtractor};
pub use pipeline::noise::is_page_number_line;
pub use pipeline::table::{is_table_eligible, render_table};
pub use pipeline::tables::TableDetectorConfig;
pub use pipeline::title::clean_filename;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
