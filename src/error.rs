//! Error types for the reflow-pdf2md library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2MdError`]: **Fatal for one document**: that document cannot be
//!   converted (bad input file, wrong password, pdfium not available). The
//!   batch driver records it against the file name and moves on to the next
//!   document.
//!
//! * [`AssetError`]: **Non-fatal**: a single embedded image could not be
//!   decoded or written. The image is left out of the Markdown and the
//!   document is still converted.

use std::path::PathBuf;
use thiserror::Error;

/// All document-level errors returned by the reflow-pdf2md library.
///
/// Image-level failures use [`AssetError`] and are stored in
/// [`crate::output::ConversionOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2MdError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// The input directory could not be listed.
    #[error("Cannot read input directory '{path}': {source}")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium could not produce the text layer of a page.
    #[error("Text extraction failed for page {page}: {detail}")]
    TextExtractionFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file or directory.
    #[error("Failed to write output '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library, so no text, image or table
    /// extraction is possible.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the working directory.\n\
  • Install pdfium as a system library.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single embedded image.
///
/// Collected in [`crate::output::ConversionOutput::asset_errors`]. The
/// conversion of the surrounding document continues.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum AssetError {
    /// pdfium could not hand back the image pixels.
    #[error("Page {page}, image {index}: decoding failed: {detail}")]
    DecodeFailed {
        page: usize,
        index: usize,
        detail: String,
    },

    /// The PNG file could not be written.
    #[error("Page {page}, image {index}: writing '{filename}' failed: {detail}")]
    WriteFailed {
        page: usize,
        index: usize,
        filename: String,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binding_failure_display_mentions_env_var() {
        let e = Pdf2MdError::PdfiumBindingFailed("libpdfium.so: cannot open".into());
        let msg = e.to_string();
        assert!(msg.contains("libpdfium.so"), "got: {msg}");
        assert!(msg.contains("PDFIUM_LIB_PATH"), "got: {msg}");
    }

    #[test]
    fn text_extraction_display() {
        let e = Pdf2MdError::TextExtractionFailed {
            page: 7,
            detail: "no text layer".into(),
        };
        assert!(e.to_string().contains("page 7"));
    }

    #[test]
    fn asset_error_display() {
        let e = AssetError::WriteFailed {
            page: 2,
            index: 3,
            filename: "doc_page_2_img_3.png".into(),
            detail: "disk full".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Page 2, image 3"), "got: {msg}");
        assert!(msg.contains("doc_page_2_img_3.png"));
    }

    #[test]
    fn asset_error_serialises() {
        let e = AssetError::DecodeFailed {
            page: 1,
            index: 1,
            detail: "unsupported filter".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("DecodeFailed"), "got: {json}");
    }
}
