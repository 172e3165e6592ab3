//! Document-level types.

use serde::{Deserialize, Serialize};

use super::ContentItem;

/// An assembled document: pages in ascending page-number order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Pages in the document
    pub pages: Vec<Page>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self { pages: Vec::new() }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn get_page(&self, page_num: u32) -> Option<&Page> {
        if page_num == 0 {
            return None;
        }
        self.pages.get((page_num - 1) as usize)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate over every content item, page by page.
    pub fn items(&self) -> impl Iterator<Item = &ContentItem> {
        self.pages.iter().flat_map(|p| p.content.iter())
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.pages
            .iter()
            .map(|page| page.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A single page of assembled content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Content items in reading order
    pub content: Vec<ContentItem>,
}

impl Page {
    /// Create a page from its content.
    pub fn new(page_number: u32, content: Vec<ContentItem>) -> Self {
        Self {
            page_number,
            content,
        }
    }

    /// Check if the page has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of tables on the page.
    pub fn table_count(&self) -> usize {
        self.content.iter().filter(|c| c.is_table()).count()
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.content
            .iter()
            .map(|item| item.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
