//! Configuration types for PDF-to-Markdown conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The same config is used for every
//! document of a batch.

use std::fmt;

use crate::error::Pdf2MdError;
use crate::pipeline::tables::TableDetectorConfig;
use crate::progress::ProgressCallback;

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use reflow_pdf2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .keep_table_text(false)
///     .exclude_last_two_pages(false)
///     .image_dir_name("assets")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Detect tables and render them as pipe tables. Default: true.
    ///
    /// Page text lines that repeat a detected table's cell text are removed so
    /// the content does not appear twice.
    pub extract_tables: bool,

    /// Keep cell text in rendered tables. Default: true.
    ///
    /// When false every cell is blank but the table keeps its rows and
    /// columns, which is useful when the table text is handled separately.
    pub keep_table_text: bool,

    /// Leave out images on the last two pages that carry images. Default: true.
    pub exclude_last_two_pages: bool,

    /// Name of the image directory inside the output directory, also used in
    /// the Markdown links. Default: `images`.
    pub image_dir_name: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Tuning for the table detector.
    pub table_detector: TableDetectorConfig,

    /// Receives per-document events during a batch.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            extract_tables: true,
            keep_table_text: true,
            exclude_last_two_pages: true,
            image_dir_name: "images".to_string(),
            password: None,
            table_detector: TableDetectorConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("extract_tables", &self.extract_tables)
            .field("keep_table_text", &self.keep_table_text)
            .field("exclude_last_two_pages", &self.exclude_last_two_pages)
            .field("image_dir_name", &self.image_dir_name)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("table_detector", &self.table_detector)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn extract_tables(mut self, v: bool) -> Self {
        self.config.extract_tables = v;
        self
    }

    pub fn keep_table_text(mut self, v: bool) -> Self {
        self.config.keep_table_text = v;
        self
    }

    pub fn exclude_last_two_pages(mut self, v: bool) -> Self {
        self.config.exclude_last_two_pages = v;
        self
    }

    pub fn image_dir_name(mut self, name: impl Into<String>) -> Self {
        self.config.image_dir_name = name.into();
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn table_detector(mut self, detector: TableDetectorConfig) -> Self {
        self.config.table_detector = detector;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2MdError> {
        let c = &self.config;

        let dir = c.image_dir_name.trim();
        if dir.is_empty() || dir == "." || dir == ".." {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "Image directory name must name a subdirectory, got {:?}",
                c.image_dir_name
            )));
        }
        if dir.contains(['/', '\\']) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "Image directory name must be a single path component, got {:?}",
                c.image_dir_name
            )));
        }

        let t = &c.table_detector;
        if t.min_rows < 2 || t.min_cols < 2 {
            return Err(Pdf2MdError::InvalidConfig(
                "Table detector needs at least 2 rows and 2 columns".into(),
            ));
        }
        if !(t.row_tolerance >= 0.0 && t.col_tolerance >= 0.0) {
            return Err(Pdf2MdError::InvalidConfig(
                "Table detector tolerances must be non-negative".into(),
            ));
        }

        Ok(self.config)
    }
}
