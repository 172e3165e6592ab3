//! Document assembly: merge every page, then stamp sections in page order.
//!
//! Assembly runs in two phases. The page-local phase (extraction through an
//! [`ElementSource`] and the reading-order merge) touches no shared state and
//! may run on the rayon pool. The stamping phase threads a single
//! [`SectionTracker`] through the merged pages in ascending page order, as a
//! fold, because a heading on one page governs the pages after it.

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::model::{ContentItem, Document, Element, Page, PageElements};
use crate::parser::{ElementSource, ErrorMode, ParseOptions};

use super::classify::BlockClassifier;
use super::merge::merge_page;
use super::normalize::normalize;
use super::tracker::SectionTracker;

/// One page's elements in reading order, ready for stamping.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPage {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Elements in reading order
    pub elements: Vec<Element>,
}

impl MergedPage {
    /// Merge a page's raw element collections.
    pub fn new(page_number: u32, elements: PageElements) -> Self {
        Self {
            page_number,
            elements: merge_page(elements),
        }
    }
}

/// Label used for an image placeholder.
pub fn chart_description(index: u32, page_number: u32) -> String {
    format!("Image/Chart {} on page {}", index, page_number)
}

/// Stamp one merged page, advancing `tracker` through its headings.
pub fn assemble_page(
    tracker: &mut SectionTracker,
    classifier: &BlockClassifier,
    merged: MergedPage,
) -> Page {
    let page_number = merged.page_number;
    let mut content = Vec::with_capacity(merged.elements.len());

    for element in merged.elements {
        match element {
            Element::Table(table) => {
                content.push(ContentItem::table(table.rows, tracker.current()));
            }
            Element::Image(image) => {
                content.push(ContentItem::chart(
                    chart_description(image.index, page_number),
                    tracker.current(),
                ));
            }
            Element::Text(block) => {
                let text = normalize(&block.raw_text());
                if text.is_empty() {
                    continue;
                }

                let tier = classifier.classify(&block);
                if tier.is_heading() {
                    log::debug!("Page {}: {:?} heading {:?}", page_number, tier, text);
                    tracker.observe(tier, &text);
                }
                content.push(ContentItem::paragraph(text, tracker.current()));
            }
        }
    }

    Page::new(page_number, content)
}

/// Stamp merged pages in order, threading one tracker through all of them.
///
/// Pages must arrive in ascending page order.
pub fn assemble_pages<I>(pages: I, classifier: &BlockClassifier) -> Document
where
    I: IntoIterator<Item = MergedPage>,
{
    let (document, _tracker) = pages.into_iter().fold(
        (Document::new(), SectionTracker::new()),
        |(mut document, mut tracker), merged| {
            log::info!("Processing page {}...", merged.page_number);
            let page = assemble_page(&mut tracker, classifier, merged);
            document.add_page(page);
            (document, tracker)
        },
    );
    document
}

/// Drives extraction, merging and stamping for a whole document.
#[derive(Debug, Clone, Default)]
pub struct DocumentAssembler {
    options: ParseOptions,
    classifier: BlockClassifier,
}

impl DocumentAssembler {
    /// Create an assembler with the given options.
    pub fn new(options: ParseOptions) -> Result<Self> {
        options.classifier.validate()?;
        let classifier = BlockClassifier::new(options.classifier.clone());
        Ok(Self {
            options,
            classifier,
        })
    }

    /// The options in use.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Assemble every page of `source`.
    ///
    /// Fails only on input-level errors: an empty source, or a fatal text
    /// extraction failure in strict mode. Table and image failures are
    /// logged and leave the page without tables or images, wherever they
    /// are reported.
    pub fn assemble<S: ElementSource + ?Sized>(&self, source: &S) -> Result<Document> {
        let total_pages = source.page_count();
        if total_pages == 0 {
            return Err(Error::EmptyDocument);
        }
        log::info!("Assembling {} pages", total_pages);

        let merged: Vec<MergedPage> = if self.options.parallel {
            (1..=total_pages)
                .into_par_iter()
                .map(|page| self.collect_page(source, page))
                .collect::<Result<Vec<_>>>()?
        } else {
            (1..=total_pages)
                .map(|page| self.collect_page(source, page))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(assemble_pages(merged, &self.classifier))
    }

    /// Extract and merge one page.
    fn collect_page<S: ElementSource + ?Sized>(
        &self,
        source: &S,
        page_number: u32,
    ) -> Result<MergedPage> {
        let text_blocks = match source.text_blocks(page_number) {
            Ok(blocks) => blocks,
            Err(e) if e.is_fatal() && self.options.error_mode == ErrorMode::Strict => {
                return Err(e);
            }
            Err(e) => {
                log::warn!("Failed to extract text from page {}: {}", page_number, e);
                Vec::new()
            }
        };

        let tables = if self.options.extract_tables {
            source.tables(page_number).unwrap_or_else(|e| {
                log::warn!("Could not read tables from page {}: {}", page_number, e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        let images = if self.options.extract_images {
            source.images(page_number).unwrap_or_else(|e| {
                log::warn!("Could not locate images on page {}: {}", page_number, e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        Ok(MergedPage::new(
            page_number,
            PageElements {
                text_blocks,
                tables,
                images,
            },
        ))
    }
}
