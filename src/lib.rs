//! # pdfsection
//!
//! Section-aware content extraction for PDF documents.
//!
//! Each page's text blocks, tables and image placements are merged into
//! top-to-bottom reading order. Bold, large text is recognized as a section
//! or sub-section heading, and every paragraph, table and chart placeholder
//! is stamped with the headings in force where it appears, across page
//! boundaries.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfsection::{parse_file, render};
//!
//! fn main() -> pdfsection::Result<()> {
//!     let doc = parse_file("report.pdf")?;
//!
//!     for item in doc.items() {
//!         println!("{:?}: {}", item.section(), item.plain_text());
//!     }
//!
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     std::fs::write("report.json", json)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Extraction** ([`parser`]): an [`ElementSource`] yields each page's
//!   text blocks, tables and images. [`PdfSource`] reads PDFs with lopdf.
//! - **Structure** ([`structure`]): pages are merged in parallel with Rayon,
//!   then stamped in page order by a single section tracker.
//! - **Rendering** ([`render`]): the assembled [`Document`] serializes to
//!   JSON and parses back unchanged.

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod structure;

// Re-export commonly used types
pub use detect::{detect_version, detect_version_from_path, is_pdf, PdfVersion};
pub use error::{Error, Result};
pub use model::{
    BBox, ContentItem, Document, Element, ImageRegion, Line, Page, PageElements, SectionContext,
    Span, TableRegion, TextBlock,
};
pub use parser::{ElementSource, ErrorMode, ParseOptions, PdfSource, PreparedSource};
pub use render::JsonFormat;
pub use structure::{ClassifierConfig, DocumentAssembler, HeadingTier};

use std::io::Read;
use std::path::Path;

/// Assemble a document from any element source.
///
/// # Example
///
/// ```
/// use pdfsection::{assemble, ParseOptions, PreparedSource};
///
/// let source = PreparedSource::from_json(r#"{"pages": [{}]}"#).unwrap();
/// let doc = assemble(&source, ParseOptions::default()).unwrap();
/// assert_eq!(doc.page_count(), 1);
/// ```
pub fn assemble<S: ElementSource + ?Sized>(source: &S, options: ParseOptions) -> Result<Document> {
    DocumentAssembler::new(options)?.assemble(source)
}

/// Parse a PDF file and return the assembled document.
///
/// # Example
///
/// ```no_run
/// use pdfsection::parse_file;
///
/// let doc = parse_file("report.pdf").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parse_file_with_options(path, ParseOptions::default())
}

/// Parse a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdfsection::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient().text_only();
/// let doc = parse_file_with_options("report.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    log::info!("Opening {}", path.display());
    let source = PdfSource::open(path)?.with_options(&options);
    assemble(&source, options)
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    parse_bytes_with_options(data, ParseOptions::default())
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let source = PdfSource::from_bytes(data)?.with_options(&options);
    assemble(&source, options)
}

/// Parse a PDF from a reader.
///
/// # Example
///
/// ```no_run
/// use pdfsection::parse_reader;
/// use std::fs::File;
///
/// let file = File::open("report.pdf").unwrap();
/// let doc = parse_reader(file).unwrap();
/// ```
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let options = ParseOptions::default();
    let source = PdfSource::from_reader(reader)?.with_options(&options);
    assemble(&source, options)
}

/// Convert a PDF file to JSON.
///
/// # Example
///
/// ```no_run
/// use pdfsection::{to_json, JsonFormat};
///
/// let json = to_json("report.pdf", JsonFormat::Pretty).unwrap();
/// std::fs::write("report.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for extracting section-tagged content.
///
/// # Example
///
/// ```no_run
/// use pdfsection::PdfSection;
///
/// let json = PdfSection::new()
///     .lenient()
///     .with_heading_font_size(16.0)
///     .with_images(false)
///     .parse("report.pdf")?
///     .to_json()?;
/// # Ok::<(), pdfsection::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfSection {
    options: ParseOptions,
    format: JsonFormat,
}

impl PdfSection {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from existing options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            format: JsonFormat::default(),
        }
    }

    /// Enable lenient mode.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Enable or disable table extraction.
    pub fn with_tables(mut self, extract: bool) -> Self {
        self.options = self.options.with_tables(extract);
        self
    }

    /// Enable or disable image placeholders.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.options = self.options.with_images(extract);
        self
    }

    /// Set the section heading font size threshold.
    pub fn with_heading_font_size(mut self, size: f32) -> Self {
        self.options.classifier = self.options.classifier.with_heading_font_size(size);
        self
    }

    /// Set the sub-section heading font size threshold.
    pub fn with_subheading_font_size(mut self, size: f32) -> Self {
        self.options.classifier = self.options.classifier.with_subheading_font_size(size);
        self
    }

    /// Set the short bold line word limit.
    pub fn with_heading_word_count(mut self, words: usize) -> Self {
        self.options.classifier = self.options.classifier.with_heading_word_count(words);
        self
    }

    /// Set JSON output format.
    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    /// Parse a PDF file.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<PdfSectionResult> {
        let document = parse_file_with_options(path, self.options)?;
        Ok(PdfSectionResult {
            document,
            format: self.format,
        })
    }

    /// Parse a PDF from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<PdfSectionResult> {
        let document = parse_bytes_with_options(data, self.options)?;
        Ok(PdfSectionResult {
            document,
            format: self.format,
        })
    }

    /// Assemble from an arbitrary element source.
    pub fn assemble<S: ElementSource + ?Sized>(self, source: &S) -> Result<PdfSectionResult> {
        let document = assemble(source, self.options)?;
        Ok(PdfSectionResult {
            document,
            format: self.format,
        })
    }
}

/// An assembled document with its output settings.
#[derive(Debug, Clone)]
pub struct PdfSectionResult {
    document: Document,
    format: JsonFormat,
}

impl PdfSectionResult {
    /// Get the assembled document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take ownership of the assembled document.
    pub fn into_document(self) -> Document {
        self.document
    }

    /// Render to JSON in the configured format.
    pub fn to_json(&self) -> Result<String> {
        render::to_json(&self.document, self.format)
    }

    /// Write JSON in the configured format to a file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        render::to_writer(std::io::BufWriter::new(file), &self.document, self.format)
    }

    /// Get plain text.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }
}
