//! Page element extraction.
//!
//! The assembler reads pages through the [`ElementSource`] trait. Two
//! sources ship with the crate: [`PdfSource`] extracts elements from a PDF
//! with lopdf, and [`PreparedSource`] replays elements extracted elsewhere.

mod graphics;
mod images;
mod layout;
mod options;
mod pdf_source;
mod source;
mod table_detector;

pub use images::ImageLocator;
pub use layout::{blocks_from_spans, LayoutAnalyzer, TextLine, TextSpan};
pub use options::{ErrorMode, ParseOptions};
pub use pdf_source::PdfSource;
pub use source::{ElementSource, PreparedSource};
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
