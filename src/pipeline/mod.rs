//! Pipeline stages for PDF-to-Markdown conversion.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──────────────▶ assemble ──▶ blocks
//! (path)    (pdfium)                (per page)   (render)
//!             ├─ normalise                │
//!             ├─ tables ─▶ table          ├─ reflow ─▶ noise
//!             └─ images                   └─ table
//! ```
//!
//! 1. [`input`]: validate a PDF path, discover the PDFs of a batch
//! 2. [`extract`]: page text with `--- 第 N 页 ---` markers, table grids
//!    and images via pdfium, behind the [`extract::PdfExtractor`] trait
//! 3. [`reflow`]: the line state machine; [`noise`] filters page numbers
//!    before any rule runs
//! 4. [`assemble`]: insert each page's images and tables at its marker and
//!    add the title
//! 5. [`blocks`]: the one place Markdown text is produced
//!
//! [`title`] turns source file names into titles; [`normalise`],
//! [`tables`] and [`images`] support extraction.

pub mod assemble;
pub mod blocks;
pub mod extract;
pub mod images;
pub mod input;
pub mod noise;
pub mod normalise;
pub mod reflow;
pub mod table;
pub mod tables;
pub mod title;
