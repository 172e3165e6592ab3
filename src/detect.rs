//! PDF header sniffing.
//!
//! Input is checked for a `%PDF-x.y` header before it is handed to the
//! parser, so that non-PDF input fails with [`Error::UnknownFormat`] rather
//! than an opaque parse error.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Readers tolerate leading garbage; the header must start within this many
/// bytes.
const HEADER_WINDOW: usize = 1024;

/// Version declared in a PDF header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PdfVersion {
    /// Major version (1 or 2)
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

impl std::fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Detect the PDF version from the first bytes of a file.
pub fn detect_version(data: &[u8]) -> Result<PdfVersion> {
    let window = &data[..data.len().min(HEADER_WINDOW)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version = &window[start + PDF_MAGIC.len()..];
    match version {
        [major @ b'0'..=b'9', b'.', minor @ b'0'..=b'9', ..] => {
            let version = PdfVersion {
                major: major - b'0',
                minor: minor - b'0',
            };
            if (1..=2).contains(&version.major) {
                Ok(version)
            } else {
                Err(Error::UnsupportedVersion(version.to_string()))
            }
        }
        _ => Err(Error::UnknownFormat),
    }
}

/// Detect the PDF version of a file.
pub fn detect_version_from_path<P: AsRef<Path>>(path: P) -> Result<PdfVersion> {
    let mut header = Vec::with_capacity(HEADER_WINDOW);
    File::open(path)?
        .take(HEADER_WINDOW as u64)
        .read_to_end(&mut header)?;
    detect_version(&header)
}

/// Check if bytes start like a PDF.
pub fn is_pdf(data: &[u8]) -> bool {
    detect_version(data).is_ok()
}
