//! PDF content extraction via pdfium: page text, table grids and embedded
//! images.
//!
//! ## Why a trait?
//!
//! Everything downstream of extraction is pure text processing. Putting
//! pdfium behind [`PdfExtractor`] lets the driver run against a scripted
//! extractor in tests, and lets a batch keep going with a clear per-document
//! error when the pdfium library itself is missing
//! ([`UnavailableExtractor`]).
//!
//! ## Why two image passes?
//!
//! The last-two-pages policy depends on the highest page holding any image,
//! which is only known once every page has been scanned. Candidates are
//! therefore enumerated first without touching pixel data, and only the
//! accepted ones are decoded and written, one at a time.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use pdfium_render::prelude::*;
use tracing::{debug, info, warn};

use super::images::{image_filename, select_images, ImageCandidate};
use super::normalise::normalise_page_text;
use super::reflow::page_marker;
use super::table::is_table_eligible;
use super::tables::{detect_tables, strip_table_lines, TextCell};
use crate::config::ConversionConfig;
use crate::error::{AssetError, Pdf2MdError};
use crate::model::{CellGrid, Extraction, ImageRef, TableRecord};

/// Environment variable naming an explicit pdfium library file.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// One document to extract.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    pub pdf_path: &'a Path,
    /// Cleaned document title, used as the image file name prefix.
    pub stem: &'a str,
    /// Directory the accepted images are written to. Created on demand.
    pub image_dir: &'a Path,
    pub config: &'a ConversionConfig,
}

/// Source of text, tables and images for one PDF.
pub trait PdfExtractor {
    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Extraction, Pdf2MdError>;
}

/// Extractor backed by a bound pdfium library.
pub struct PdfiumExtractor {
    pdfium: Pdfium,
}

impl PdfiumExtractor {
    /// Bind pdfium, trying `PDFIUM_LIB_PATH`, then the working directory,
    /// then the system library.
    ///
    /// Binding loads the shared library; reuse one extractor across documents.
    pub fn bind() -> Result<Self, Pdf2MdError> {
        let env_path = std::env::var_os(PDFIUM_LIB_PATH_ENV).map(PathBuf::from);

        let bindings = env_path
            .ok_or(())
            .and_then(|path| {
                Pdfium::bind_to_library(&path).map_err(|e| {
                    warn!("Could not bind pdfium from {}: {}", path.display(), e);
                })
            })
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            })
            .or_else(|_| Pdfium::bind_to_system_library())
            .map_err(|e| Pdf2MdError::PdfiumBindingFailed(e.to_string()))?;

        debug!("pdfium bound");
        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }

    fn load<'a>(
        &'a self,
        pdf_path: &Path,
        password: Option<&'a str>,
    ) -> Result<PdfDocument<'a>, Pdf2MdError> {
        self.pdfium
            .load_pdf_from_file(pdf_path, password)
            .map_err(|e| {
                let err_str = format!("{:?}", e);
                if err_str.contains("Password") || err_str.contains("password") {
                    if password.is_some() {
                        Pdf2MdError::WrongPassword {
                            path: pdf_path.to_path_buf(),
                        }
                    } else {
                        Pdf2MdError::PasswordRequired {
                            path: pdf_path.to_path_buf(),
                        }
                    }
                } else {
                    Pdf2MdError::CorruptPdf {
                        path: pdf_path.to_path_buf(),
                        detail: err_str,
                    }
                }
            })
    }
}

impl PdfExtractor for PdfiumExtractor {
    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Extraction, Pdf2MdError> {
        let config = request.config;
        let document = self.load(request.pdf_path, config.password.as_deref())?;
        let pages = document.pages();

        let mut out = Extraction::default();
        let mut candidates = Vec::new();

        for (idx, page) in pages.iter().enumerate() {
            let page_no = idx + 1;
            out.page_count += 1;

            let text = page
                .text()
                .map_err(|e| Pdf2MdError::TextExtractionFailed {
                    page: page_no,
                    detail: e.to_string(),
                })?;
            let grids = if config.extract_tables {
                let cells = text_cells(&text, page.height().value);
                detect_tables(&cells, &config.table_detector)
            } else {
                Vec::new()
            };
            push_page(&mut out, page_no, &normalise_page_text(&text.all()), grids);

            candidates.extend(image_candidates(&page, page_no));
        }

        let (kept, skipped) = select_images(candidates, config.exclude_last_two_pages);
        out.images_skipped = skipped;
        if skipped > 0 {
            debug!("{} image(s) excluded by the last-pages policy", skipped);
        }

        if !kept.is_empty() {
            fs::create_dir_all(request.image_dir).map_err(|source| {
                Pdf2MdError::OutputWriteFailed {
                    path: request.image_dir.to_path_buf(),
                    source,
                }
            })?;

            for (idx, page) in pages.iter().enumerate() {
                let page_no = idx + 1;
                let on_page: Vec<&ImageCandidate> =
                    kept.iter().filter(|c| c.page == page_no).collect();
                if on_page.is_empty() {
                    continue;
                }

                for (object_index, object) in page.objects().iter().enumerate() {
                    let Some(candidate) = on_page.iter().find(|c| c.object_index == object_index)
                    else {
                        continue;
                    };
                    match save_image(&object, candidate, request) {
                        Ok(image) => out.images.push(image),
                        Err(e) => {
                            warn!("Skipping image: {}", e);
                            out.asset_errors.push(e);
                        }
                    }
                }
            }
        }

        info!(
            "Extracted {} page(s), {} table(s), {} image(s) from {}",
            out.page_count,
            out.tables.len(),
            out.images.len(),
            request.pdf_path.display()
        );
        Ok(out)
    }
}

/// Add one page's tables and text to `out`.
///
/// Grids failing [`is_table_eligible`] are dropped but keep their place in
/// the index sequence. When any grid is accepted, lines repeating its cells
/// are removed from the page text. A page left with no text gets no marker.
fn push_page(out: &mut Extraction, page_no: usize, page_text: &str, grids: Vec<CellGrid>) {
    let first = out.tables.len();
    for (i, grid) in grids.into_iter().enumerate() {
        if is_table_eligible(&grid) {
            out.tables.push(TableRecord {
                page: page_no,
                index: i + 1,
                cells: grid,
            });
        } else {
            debug!(page = page_no, index = i + 1, "grid rejected as table");
        }
    }

    let page_tables: Vec<&TableRecord> = out.tables[first..].iter().collect();
    let page_text = if page_tables.is_empty() {
        page_text.to_string()
    } else {
        strip_table_lines(page_text, &page_tables)
    };

    if !page_text.trim().is_empty() {
        out.text.push_str("\n\n");
        out.text.push_str(&page_marker(page_no));
        out.text.push_str("\n\n");
        out.text.push_str(&page_text);
    }
}

/// Text segments in top-left-origin coordinates.
fn text_cells(text: &PdfPageText<'_>, page_height: f32) -> Vec<TextCell> {
    let mut cells = Vec::new();
    for segment in text.segments().iter() {
        let content = segment.text();
        let content = content.trim();
        if content.is_empty() {
            continue;
        }

        let bounds = segment.bounds();
        cells.push(TextCell {
            text: content.to_string(),
            x: bounds.left().value,
            y: page_height - bounds.top().value,
            width: bounds.right().value - bounds.left().value,
            height: bounds.top().value - bounds.bottom().value,
        });
    }
    cells
}

fn image_candidates(page: &PdfPage<'_>, page_no: usize) -> Vec<ImageCandidate> {
    let mut candidates = Vec::new();
    for (object_index, object) in page.objects().iter().enumerate() {
        if object.as_image_object().is_some() {
            candidates.push(ImageCandidate {
                page: page_no,
                index: candidates.len() + 1,
                object_index,
            });
        }
    }
    candidates
}

fn save_image(
    object: &PdfPageObject<'_>,
    candidate: &ImageCandidate,
    request: &ExtractRequest<'_>,
) -> Result<ImageRef, AssetError> {
    let decode_failed = |detail: String| AssetError::DecodeFailed {
        page: candidate.page,
        index: candidate.index,
        detail,
    };

    let image = object
        .as_image_object()
        .ok_or_else(|| decode_failed("object is not an image".to_string()))?
        .get_raw_image()
        .map_err(|e| decode_failed(e.to_string()))?;

    let filename = image_filename(request.stem, candidate.page, candidate.index);
    image
        .save_with_format(request.image_dir.join(&filename), ImageFormat::Png)
        .map_err(|e| AssetError::WriteFailed {
            page: candidate.page,
            index: candidate.index,
            filename: filename.clone(),
            detail: e.to_string(),
        })?;

    debug!("Saved image {}", filename);
    Ok(ImageRef::new(candidate.page, candidate.index, filename))
}

/// Stand-in used when pdfium could not be bound: every document fails with
/// the binding error so the batch can still report each file.
#[derive(Debug, Clone)]
pub struct UnavailableExtractor {
    reason: String,
}

impl UnavailableExtractor {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PdfExtractor for UnavailableExtractor {
    fn extract(&self, _request: &ExtractRequest<'_>) -> Result<Extraction, Pdf2MdError> {
        Err(Pdf2MdError::PdfiumBindingFailed(self.reason.clone()))
    }
}
