//! Result types returned by the conversion entry points.

use crate::error::AssetError;
use crate::model::ImageRef;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The result of converting one PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// Normalised document title, also the Markdown file stem.
    pub title: String,
    /// The assembled Markdown document.
    pub markdown: String,
    /// Where the Markdown was written.
    pub output_path: PathBuf,
    /// Images written next to the Markdown file.
    pub images: Vec<ImageRef>,
    /// Images that could not be extracted; the document converted anyway.
    pub asset_errors: Vec<AssetError>,
    pub stats: ConversionStats,
}

/// Counters for one converted document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source PDF.
    pub total_pages: usize,
    /// Images written to disk.
    pub images_extracted: usize,
    /// Images dropped by the last-two-pages policy.
    pub images_skipped: usize,
    /// Tables that passed the eligibility filter.
    pub tables_extracted: usize,
    /// Wall-clock time for the whole document.
    pub total_duration_ms: u64,
}

/// A document the batch could not convert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedDocument {
    /// File name of the source PDF.
    pub name: String,
    /// Human-readable reason.
    pub error: String,
}

/// Aggregate outcome of [`crate::convert::convert_batch`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// PDFs discovered in the input directory.
    pub total: usize,
    /// PDFs converted successfully.
    pub succeeded: usize,
    /// Images written across all successful documents.
    pub total_images: usize,
    pub failed: Vec<FailedDocument>,
    /// Paths of the Markdown files written, in conversion order.
    pub outputs: Vec<PathBuf>,
    pub total_duration_ms: u64,
}

impl BatchReport {
    /// `true` when every discovered document converted.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub(crate) fn record_success(&mut self, output: &ConversionOutput) {
        self.succeeded += 1;
        self.total_images += output.stats.images_extracted;
        self.outputs.push(output.output_path.clone());
    }

    pub(crate) fn record_failure(&mut self, name: impl Into<String>, error: impl ToString) {
        self.failed.push(FailedDocument {
            name: name.into(),
            error: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_complete() {
        assert!(BatchReport::default().is_complete());
    }

    #[test]
    fn failures_are_listed_by_name() {
        let mut report = BatchReport {
            total: 2,
            ..Default::default()
        };
        report.record_failure("broken.pdf", "PDF 'broken.pdf' is corrupt");
        assert!(!report.is_complete());
        assert_eq!(report.failed[0].name, "broken.pdf");
        assert!(report.failed[0].error.contains("corrupt"));
    }

    #[test]
    fn success_accumulates_images() {
        let output = ConversionOutput {
            title: "1.概览".into(),
            markdown: "# 1.概览\n\n".into(),
            output_path: PathBuf::from("out/1.概览.md"),
            images: vec![],
            asset_errors: vec![],
            stats: ConversionStats {
                images_extracted: 3,
                ..Default::default()
            },
        };
        let mut report = BatchReport::default();
        report.record_success(&output);
        report.record_success(&output);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.total_images, 6);
        assert_eq!(report.outputs.len(), 2);
    }
}
