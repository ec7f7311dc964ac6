//! End-to-end integration tests for reflow-pdf2md.
//!
//! These tests use real PDF files in `./test_cases/` and need a pdfium
//! library (see `PDFIUM_LIB_PATH`). They are gated behind the `E2E_ENABLED`
//! environment variable so they do not run in CI unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=./libpdfium.so cargo test --test e2e -- --nocapture
//!
//! To restrict to a specific test:
//!   E2E_ENABLED=1 cargo test --test e2e test_convert_arxiv -- --nocapture

use reflow_pdf2md::{
    convert_batch, convert_file, ConversionConfig, ConversionOutput, Pdf2MdError,
};
use std::fs;
use std::path::{Path, PathBuf};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_cases_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test_cases")
}

/// Skip this test if E2E_ENABLED is not set *or* no PDF file at `path`.
macro_rules! e2e_skip_unless_ready {
    ($path:expr) => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        let p: PathBuf = $path;
        if !p.exists() {
            println!("SKIP: test file not found: {}", p.display());
            println!("      Place the PDF under test_cases/ to enable this test.");
            return;
        }
        p
    }};
}

/// Assert the markdown passes basic quality checks.
fn assert_markdown_quality(md: &str, title: &str, context: &str) {
    assert!(
        md.starts_with(&format!("# {title}\n\n")),
        "[{context}] Markdown must open with the document title"
    );

    // Every block is followed by exactly one blank line.
    assert!(md.ends_with("\n\n"), "[{context}] Markdown must end with a blank line");
    assert!(
        !md.contains("\n\n\n"),
        "[{context}] Output has more than one consecutive blank line"
    );

    // Markers are consumed by the re-flow, never printed.
    assert!(
        !md.contains("--- 第"),
        "[{context}] Output still contains a page marker"
    );

    let invisible = ['\u{200B}', '\u{FEFF}', '\u{200C}', '\u{200D}', '\u{2060}'];
    for ch in invisible {
        assert!(
            !md.contains(ch),
            "[{context}] Output contains invisible char U+{:04X}",
            ch as u32
        );
    }

    println!("[{context}] ✓  {} bytes, quality checks passed", md.len());
}

/// Every linked image exists on disk and every extracted image is linked
/// at most once.
fn assert_images_consistent(output: &ConversionOutput, image_dir: &Path, context: &str) {
    for image in &output.images {
        let path = image_dir.join(&image.filename);
        assert!(path.is_file(), "[{context}] Missing image file {}", path.display());
        assert!(
            image.filename.starts_with(&format!("{}_page_{}_img_", output.title, image.page)),
            "[{context}] Unexpected image name {}",
            image.filename
        );
        assert!(
            output.markdown.matches(&image.filename).count() <= 1,
            "[{context}] Image {} linked more than once",
            image.filename
        );
    }
}

// ── Single document ──────────────────────────────────────────────────────────

/// A text-heavy paper: headings and paragraphs, a few figures.
#[test]
fn test_convert_arxiv_paper() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));
    let out = tempfile::tempdir().unwrap();

    let result = convert_file(&path, out.path(), &ConversionConfig::default())
        .expect("conversion should succeed");

    assert_eq!(result.title, "attention_is_all_you_need");
    assert_eq!(result.stats.total_pages, 15, "Attention paper should have 15 pages");
    assert_eq!(
        fs::read_to_string(&result.output_path).unwrap(),
        result.markdown
    );
    assert!(
        result.markdown.contains("Attention"),
        "Body text should survive the re-flow"
    );

    assert_markdown_quality(&result.markdown, &result.title, "arxiv");
    assert_images_consistent(&result, &out.path().join("images"), "arxiv");
    println!("{:?}", result.stats);
}

/// A form: mostly tabular layout, so table detection should fire.
#[test]
fn test_convert_irs_form_tables() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("irs_form_1040.pdf"));
    let out = tempfile::tempdir().unwrap();

    let result = convert_file(&path, out.path(), &ConversionConfig::default())
        .expect("conversion should succeed");

    assert_eq!(result.stats.total_pages, 2, "IRS form should have 2 pages");
    assert_markdown_quality(&result.markdown, &result.title, "irs");

    if result.stats.tables_extracted > 0 {
        assert!(
            result.markdown.contains("| --- |"),
            "Detected tables should render as pipe tables"
        );
    }
    println!("{:?}", result.stats);
}

#[test]
fn test_no_tables_config() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("irs_form_1040.pdf"));
    let out = tempfile::tempdir().unwrap();

    let config = ConversionConfig::builder()
        .extract_tables(false)
        .build()
        .expect("valid config");
    let result = convert_file(&path, out.path(), &config).expect("conversion should succeed");

    assert_eq!(result.stats.tables_extracted, 0);
    assert!(!result.markdown.contains("| --- |"));
    assert_markdown_quality(&result.markdown, &result.title, "irs-no-tables");
}

#[test]
fn test_include_last_pages_keeps_every_image() {
    let path = e2e_skip_unless_ready!(test_cases_dir().join("attention_is_all_you_need.pdf"));
    let default_out = tempfile::tempdir().unwrap();
    let all_out = tempfile::tempdir().unwrap();

    let default = convert_file(&path, default_out.path(), &ConversionConfig::default())
        .expect("conversion should succeed");
    let config = ConversionConfig::builder()
        .exclude_last_two_pages(false)
        .build()
        .expect("valid config");
    let all = convert_file(&path, all_out.path(), &config).expect("conversion should succeed");

    assert_eq!(all.stats.images_skipped, 0);
    assert_eq!(
        all.stats.images_extracted + all.asset_errors.len(),
        default.stats.images_extracted + default.asset_errors.len() + default.stats.images_skipped
    );
}

#[test]
fn test_corrupt_pdf_is_rejected() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP");
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pdf");
    fs::write(&path, b"%PDF-1.7\nthis is not really a pdf\n").unwrap();

    let err = convert_file(&path, dir.path().join("out"), &ConversionConfig::default())
        .expect_err("a truncated PDF must not convert");
    assert!(
        matches!(err, Pdf2MdError::CorruptPdf { .. }),
        "Expected CorruptPdf, got: {err}"
    );
}

// ── Batch ────────────────────────────────────────────────────────────────────

#[test]
fn test_batch_over_test_cases() {
    let dir = e2e_skip_unless_ready!(test_cases_dir());
    let out = tempfile::tempdir().unwrap();
    let out_dir = out.path().join("markdown");

    let report = convert_batch(&dir, &out_dir, &ConversionConfig::default(), true)
        .expect("batch should run");

    let pdf_count = fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| {
            e.path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .count();

    assert_eq!(report.total, pdf_count);
    assert_eq!(report.succeeded + report.failed.len(), report.total);
    assert_eq!(report.outputs.len(), report.succeeded);
    for output in &report.outputs {
        assert!(output.is_file(), "Missing {}", output.display());
    }
    for failed in &report.failed {
        println!("  ✗ {}: {}", failed.name, failed.error);
    }
    println!(
        "Batch: {}/{} converted, {} images, {}ms",
        report.succeeded, report.total, report.total_images, report.total_duration_ms
    );
}
