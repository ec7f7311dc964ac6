//! CLI binary for reflow-pdf2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig`, runs a batch and prints the report.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reflow_pdf2md::{
    convert_batch, BatchProgressCallback, BatchReport, ConversionConfig, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// Longest error message shown on a progress line, in characters.
const MAX_ERROR_CHARS: usize = 80;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch and a log line per
/// document.
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Scanning input directory…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.activate_bar(total);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total} PDF file(s)…"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, name: &str) {
        self.bar.set_message(name.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, name: &str, images: usize) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index,
            total,
            name,
            dim(&format!("{images} image(s)")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, name: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);

        // First line only, truncated on a character boundary.
        let first_line = error.lines().next().unwrap_or_default();
        let msg = if first_line.chars().count() > MAX_ERROR_CHARS {
            let cut: String = first_line.chars().take(MAX_ERROR_CHARS - 1).collect();
            format!("{cut}\u{2026}")
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index,
            total,
            name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _succeeded: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert every PDF in the current directory
  pdf2md

  # Explicit input and output directories
  pdf2md --input-dir ./pdfs --output-dir ./markdown

  # Tables as blank grids, keep images from the last pages
  pdf2md --blank-table-text --include-last-pages

  # Add to an existing output directory instead of replacing it
  pdf2md --keep-output-dir

  # Machine-readable batch report
  pdf2md --json > report.json

OUTPUT LAYOUT:
  <output-dir>/<title>.md
  <output-dir>/images/<title>_page_<page>_img_<index>.png

  <title> is the PDF file name without its version stamp (_V + 8 digits)
  and extension, e.g. "12.年度总结_V20230101.pdf" becomes "12.年度总结".

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (otherwise ./ then the system library)
  RUST_LOG                Override log filtering (e.g. reflow_pdf2md=debug)
"#;

/// Convert a directory of PDF files to Markdown with extracted images and tables.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert a directory of PDF files to Markdown with extracted images and tables",
    long_about = "Convert every PDF in a directory to Markdown. Page text is re-flowed into \
headings, list items and paragraphs; embedded images are written as PNG files and linked \
where their page starts; detected tables become pipe tables.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the PDF files (not searched recursively).
    #[arg(short, long, env = "PDF2MD_INPUT_DIR", default_value = ".")]
    input_dir: PathBuf,

    /// Directory receiving the Markdown files and the image directory.
    #[arg(
        short,
        long,
        env = "PDF2MD_OUTPUT_DIR",
        default_value = "markdown_docs_with_images"
    )]
    output_dir: PathBuf,

    /// Do not detect tables.
    #[arg(long, env = "PDF2MD_NO_TABLES")]
    no_tables: bool,

    /// Render detected tables with empty cells.
    #[arg(long, env = "PDF2MD_BLANK_TABLE_TEXT")]
    blank_table_text: bool,

    /// Keep images from the last two image-bearing pages.
    #[arg(long, env = "PDF2MD_INCLUDE_LAST_PAGES")]
    include_last_pages: bool,

    /// Do not clear the output directory before converting.
    #[arg(long, env = "PDF2MD_KEEP_OUTPUT_DIR")]
    keep_output_dir: bool,

    /// Name of the image directory inside the output directory.
    #[arg(long, env = "PDF2MD_IMAGE_DIR", default_value = "images")]
    image_dir: String,

    /// PDF user password, applied to every document.
    #[arg(long, env = "PDF2MD_PASSWORD")]
    password: Option<String>,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "PDF2MD_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MD_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MD_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run batch ────────────────────────────────────────────────────────
    let report = convert_batch(
        &cli.input_dir,
        &cli.output_dir,
        &config,
        !cli.keep_output_dir,
    )
    .with_context(|| format!("Batch over '{}' failed", cli.input_dir.display()))?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else {
        print_summary(&report, &cli);
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .extract_tables(!cli.no_tables)
        .keep_table_text(!cli.blank_table_text)
        .exclude_last_two_pages(!cli.include_last_pages)
        .image_dir_name(cli.image_dir.clone());

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(report: &BatchReport, cli: &Cli) {
    if !cli.quiet {
        if report.total == 0 {
            eprintln!(
                "{} No PDF files found in {}",
                cyan("⚠"),
                bold(&cli.input_dir.display().to_string())
            );
            return;
        }

        eprintln!(
            "{}  {}/{} files converted  {}ms  →  {}",
            if report.is_complete() {
                green("✔")
            } else {
                cyan("⚠")
            },
            report.succeeded,
            report.total,
            report.total_duration_ms,
            bold(&cli.output_dir.display().to_string()),
        );
        eprintln!(
            "   {} images extracted",
            dim(&report.total_images.to_string())
        );
    }

    if !report.failed.is_empty() {
        eprintln!("{} {} file(s) failed:", red("✘"), report.failed.len());
        for failed in &report.failed {
            eprintln!("   {} {}", red("✗"), failed.name);
            for line in failed.error.lines().filter(|l| !l.trim().is_empty()) {
                eprintln!("     {}", dim(line));
            }
        }
    }
}
