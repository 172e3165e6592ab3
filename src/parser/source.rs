//! Element sources: the boundary to the extraction collaborators.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{ImageRegion, PageElements, TableRegion, TextBlock};

/// Supplies the primitive elements of each page.
///
/// Pages are numbered from 1. Implementations must be `Sync`; the
/// assembler may query different pages concurrently. A failing `tables` or
/// `images` call only costs that page its tables or images.
pub trait ElementSource: Sync {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Text blocks of a page, in extractor order.
    fn text_blocks(&self, page: u32) -> Result<Vec<TextBlock>>;

    /// Table regions of a page, in extractor order.
    fn tables(&self, page: u32) -> Result<Vec<TableRegion>>;

    /// Image regions of a page, in extractor order.
    fn images(&self, page: u32) -> Result<Vec<ImageRegion>>;
}

/// An [`ElementSource`] over elements extracted ahead of time.
///
/// The JSON form is `{"pages": [{"text_blocks": [...], "tables": [...],
/// "images": [...]}, ...]}`, with the page number implied by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparedSource {
    /// Per-page elements, page 1 first
    pub pages: Vec<PageElements>,
}

impl PreparedSource {
    /// Create a source from per-page elements.
    pub fn new(pages: Vec<PageElements>) -> Self {
        Self { pages }
    }

    /// Parse prepared elements from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Render(format!("invalid element JSON: {}", e)))
    }

    /// Read prepared elements from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| Error::Render(format!("invalid element JSON: {}", e)))
    }

    /// Read prepared elements from a JSON file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn page(&self, page: u32) -> Result<&PageElements> {
        page.checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }
}

impl ElementSource for PreparedSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn text_blocks(&self, page: u32) -> Result<Vec<TextBlock>> {
        Ok(self.page(page)?.text_blocks.clone())
    }

    fn tables(&self, page: u32) -> Result<Vec<TableRegion>> {
        Ok(self.page(page)?.tables.clone())
    }

    fn images(&self, page: u32) -> Result<Vec<ImageRegion>> {
        Ok(self.page(page)?.images.clone())
    }
}
