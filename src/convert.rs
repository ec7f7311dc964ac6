//! Document and batch conversion entry points.
//!
//! [`convert_file`] converts one PDF; [`convert_batch`] converts every PDF in
//! a directory and keeps going past failed documents. Both have `_with`
//! variants taking an explicit [`PdfExtractor`], which is how pdfium is bound
//! only once per batch and how tests drive the pipeline without it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::ConversionConfig;
use crate::error::Pdf2MdError;
use crate::output::{BatchReport, ConversionOutput, ConversionStats};
use crate::pipeline::assemble::{to_markdown, PageAssets};
use crate::pipeline::extract::{ExtractRequest, PdfExtractor, PdfiumExtractor, UnavailableExtractor};
use crate::pipeline::input::{discover_pdfs, resolve_local};
use crate::pipeline::title::clean_filename;

/// Convert one PDF into `{output_dir}/{title}.md`, writing its images to
/// `{output_dir}/{image_dir_name}/`.
///
/// Binds pdfium for this call. Use [`convert_batch`] or
/// [`convert_file_with`] to convert several files with one binding.
///
/// # Errors
/// Returns `Err(Pdf2MdError)` when the document cannot be converted at all.
/// Individual images that fail are reported in
/// [`ConversionOutput::asset_errors`] instead.
pub fn convert_file(
    pdf_path: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let extractor = PdfiumExtractor::bind()?;
    convert_file_with(&extractor, pdf_path.as_ref(), output_dir.as_ref(), config)
}

/// Convert one PDF using `extractor`.
pub fn convert_file_with(
    extractor: &dyn PdfExtractor,
    pdf_path: &Path,
    output_dir: &Path,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2MdError> {
    let start = Instant::now();
    info!("Converting: {}", pdf_path.display());

    // ── Step 1: Validate input ───────────────────────────────────────────
    let pdf_path = resolve_local(pdf_path)?;
    let stem = pdf_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let title = clean_filename(&stem);
    if title.is_empty() {
        return Err(Pdf2MdError::Internal(format!(
            "Cannot derive a title from '{}'",
            pdf_path.display()
        )));
    }
    debug!("Title: {}", title);

    // ── Step 2: Extract text, tables and images ──────────────────────────
    fs::create_dir_all(output_dir).map_err(|source| Pdf2MdError::OutputWriteFailed {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let image_dir = output_dir.join(&config.image_dir_name);
    let extraction = extractor.extract(&ExtractRequest {
        pdf_path: &pdf_path,
        stem: &title,
        image_dir: &image_dir,
        config,
    })?;

    // ── Step 3: Re-flow into Markdown ────────────────────────────────────
    let assets = PageAssets::new(&extraction.images, &extraction.tables, &config.image_dir_name)
        .keep_table_text(config.keep_table_text);
    let markdown = to_markdown(&extraction.text, &title, &assets);

    // ── Step 4: Write ────────────────────────────────────────────────────
    let output_path = output_dir.join(format!("{title}.md"));
    write_atomic(&output_path, &markdown)?;

    let stats = ConversionStats {
        total_pages: extraction.page_count,
        images_extracted: extraction.images.len(),
        images_skipped: extraction.images_skipped,
        tables_extracted: extraction.tables.len(),
        total_duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Converted {} → {} ({} pages, {} images, {}ms)",
        pdf_path.display(),
        output_path.display(),
        stats.total_pages,
        stats.images_extracted,
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        title,
        markdown,
        output_path,
        images: extraction.images,
        asset_errors: extraction.asset_errors,
        stats,
    })
}

/// Convert every `*.pdf` directly inside `input_dir` into `output_dir`.
///
/// When `clean_output` is true an existing `output_dir` is removed first so
/// the directory holds exactly this batch's results.
///
/// pdfium is bound once. If binding fails the batch still runs and every
/// document is reported as failed with [`Pdf2MdError::PdfiumBindingFailed`].
///
/// # Errors
/// Only errors that stop the whole batch are returned: an unreadable input
/// directory, an output directory that cannot be prepared, or an output
/// directory that contains the input directory while `clean_output` is set.
pub fn convert_batch(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    config: &ConversionConfig,
    clean_output: bool,
) -> Result<BatchReport, Pdf2MdError> {
    let input_dir = input_dir.as_ref();
    let output_dir = output_dir.as_ref();

    match PdfiumExtractor::bind() {
        Ok(extractor) => convert_batch_with(&extractor, input_dir, output_dir, config, clean_output),
        Err(e) => {
            warn!("{}", e);
            let reason = match e {
                Pdf2MdError::PdfiumBindingFailed(reason) => reason,
                other => other.to_string(),
            };
            let extractor = UnavailableExtractor::new(reason);
            convert_batch_with(&extractor, input_dir, output_dir, config, clean_output)
        }
    }
}

/// [`convert_batch`] with an explicit extractor.
pub fn convert_batch_with(
    extractor: &dyn PdfExtractor,
    input_dir: &Path,
    output_dir: &Path,
    config: &ConversionConfig,
    clean_output: bool,
) -> Result<BatchReport, Pdf2MdError> {
    let start = Instant::now();

    let pdfs = discover_pdfs(input_dir)?;
    prepare_output_dir(input_dir, output_dir, clean_output)?;

    let total = pdfs.len();
    info!("Found {} PDF file(s) in {}", total, input_dir.display());

    let mut report = BatchReport {
        total,
        ..BatchReport::default()
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    for (i, pdf) in pdfs.iter().enumerate() {
        let index = i + 1;
        let name = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| pdf.display().to_string());

        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(index, total, &name);
        }

        match convert_file_with(extractor, pdf, output_dir, config) {
            Ok(output) => {
                for asset_error in &output.asset_errors {
                    debug!("{}: {}", name, asset_error);
                }
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_complete(index, total, &name, output.stats.images_extracted);
                }
                report.record_success(&output);
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", name, e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_document_error(index, total, &name, &e.to_string());
                }
                report.record_failure(name, e);
            }
        }
    }

    report.total_duration_ms = start.elapsed().as_millis() as u64;
    info!(
        "Batch complete: {}/{} converted, {} images, {}ms",
        report.succeeded, report.total, report.total_images, report.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, report.succeeded);
    }

    Ok(report)
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn prepare_output_dir(
    input_dir: &Path,
    output_dir: &Path,
    clean_output: bool,
) -> Result<(), Pdf2MdError> {
    let write_failed = |source| Pdf2MdError::OutputWriteFailed {
        path: output_dir.to_path_buf(),
        source,
    };

    if clean_output && output_dir.exists() {
        if contains_path(output_dir, input_dir) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "Refusing to clear output directory '{}': it contains the input directory '{}'",
                output_dir.display(),
                input_dir.display()
            )));
        }
        debug!("Clearing output directory {}", output_dir.display());
        fs::remove_dir_all(output_dir).map_err(write_failed)?;
    }

    fs::create_dir_all(output_dir).map_err(write_failed)
}

/// `true` when `inner` is `outer` or lies below it. Unresolvable paths are
/// compared as given.
fn contains_path(outer: &Path, inner: &Path) -> bool {
    let resolve = |p: &Path| fs::canonicalize(p).unwrap_or_else(|_| PathBuf::from(p));
    resolve(inner).starts_with(resolve(outer))
}

/// Write `contents` to `path` via a temp file in the same directory and a
/// rename, so a crash never leaves a truncated Markdown file behind.
fn write_atomic(path: &Path, contents: &str) -> Result<(), Pdf2MdError> {
    let write_failed = |source| Pdf2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(contents.as_bytes()).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
