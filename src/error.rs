//! Error types for pdfsection.

use std::io;
use thiserror::Error;

/// Result type alias for pdfsection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling a document.
///
/// Only the input-level variants (`Io`, `UnknownFormat`, `PdfParse`,
/// `Encrypted`, `EmptyDocument`) abort a run on their own. Table and image
/// extraction errors are page-local and are downgraded to warnings by the
/// assembler.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// The document has no pages.
    #[error("Document has no pages")]
    EmptyDocument,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Error extracting text blocks from a page.
    #[error("Text extraction error: {0}")]
    TextExtract(String),

    /// Error detecting tables on a page.
    #[error("Table extraction error: {0}")]
    TableExtract(String),

    /// Error locating images on a page.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Error serializing or deserializing output.
    #[error("Rendering error: {0}")]
    Render(String),

    /// Rejected configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl Error {
    /// Whether this error stops the whole document.
    ///
    /// Page-local extraction failures are recoverable; everything else is
    /// an input-level failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::TableExtract(_) | Error::ImageExtract(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::EmptyDocument;
        assert_eq!(err.to_string(), "Document has no pages");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_page_local_errors_are_not_fatal() {
        assert!(!Error::TableExtract("lattice".into()).is_fatal());
        assert!(!Error::ImageExtract("xobject".into()).is_fatal());
        assert!(Error::TextExtract("stream".into()).is_fatal());
        assert!(Error::UnknownFormat.is_fatal());
    }
}
