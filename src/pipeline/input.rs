//! Input resolution: find the PDFs of a batch and validate each one before
//! pdfium sees it.
//!
//! pdfium reports a non-PDF as a generic load failure. Checking the `%PDF`
//! magic bytes first gives the batch report a precise error instead.

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Pdf2MdError;

/// Validate a local PDF path: it must exist, be readable and start with
/// `%PDF`. Files shorter than four bytes are left for pdfium to reject.
pub fn resolve_local(path: &Path) -> Result<PathBuf, Pdf2MdError> {
    let path = path.to_path_buf();

    if !path.exists() {
        return Err(Pdf2MdError::FileNotFound { path });
    }

    match fs::File::open(&path) {
        Ok(mut f) => {
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2MdError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            return Err(Pdf2MdError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2MdError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

/// List the `*.pdf` files directly inside `dir`, sorted by path.
///
/// The extension is compared case-insensitively. Subdirectories are not
/// searched.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>, Pdf2MdError> {
    let unreadable = |source| Pdf2MdError::InputDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() && has_pdf_extension(&path) {
            pdfs.push(path);
        }
    }
    pdfs.sort();

    debug!("Found {} PDF file(s) in {}", pdfs.len(), dir.display());
    Ok(pdfs)
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}
