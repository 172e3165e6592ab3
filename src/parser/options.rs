//! Parsing options and configuration.

use crate::structure::ClassifierConfig;

use super::table_detector::TableDetectorConfig;

/// Options for assembling a document.
///
/// The default error mode is [`ErrorMode::Strict`], so a page whose text
/// cannot be read fails the whole document. Use [`ParseOptions::lenient`]
/// to keep going and only fail on input that cannot be opened or has no
/// pages.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// How page-local text extraction failures are handled
    pub error_mode: ErrorMode,

    /// Whether to run the page-local phase on the rayon pool
    pub parallel: bool,

    /// Whether to extract tables
    pub extract_tables: bool,

    /// Whether to extract image placements
    pub extract_images: bool,

    /// Heading classification thresholds
    pub classifier: ClassifierConfig,

    /// Table detection tuning (PDF input only)
    pub table_detector: TableDetectorConfig,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages whose text cannot be read).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable table extraction.
    pub fn with_tables(mut self, extract: bool) -> Self {
        self.extract_tables = extract;
        self
    }

    /// Enable or disable image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Extract text only (no tables, no images).
    pub fn text_only(mut self) -> Self {
        self.extract_tables = false;
        self.extract_images = false;
        self
    }

    /// Set heading classification thresholds.
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// Set table detection tuning.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.table_detector = config;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            parallel: true,
            extract_tables: true,
            extract_images: true,
            classifier: ClassifierConfig::default(),
            table_detector: TableDetectorConfig::default(),
        }
    }
}

/// Handling of page-local text extraction failures.
///
/// Table and image failures are always recoverable; this only decides
/// whether an unreadable page of text aborts the document. In strict mode
/// a fatal [`Error`](crate::Error) from a page's text ends the run, on top
/// of input that cannot be opened or has no pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the document
    #[default]
    Strict,
    /// Log a warning and treat the page as having no text
    Lenient,
}
