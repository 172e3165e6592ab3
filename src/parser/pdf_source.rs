//! PDF element source backed by lopdf.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, ObjectId};

use crate::detect::{detect_version, detect_version_from_path, PdfVersion};
use crate::error::{Error, Result};
use crate::model::{ImageRegion, TableRegion, TextBlock};

use super::images::ImageLocator;
use super::layout::{blocks_from_spans, get_number, LayoutAnalyzer, TextSpan};
use super::options::ParseOptions;
use super::source::ElementSource;
use super::table_detector::{TableDetector, TableDetectorConfig};

/// US Letter height, used when a page has no usable MediaBox.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Extracts page elements from a PDF document.
///
/// Text spans that fall inside a detected table are reported with the table
/// and left out of the page's text blocks.
pub struct PdfSource {
    doc: LopdfDocument,
    version: PdfVersion,
    pages: BTreeMap<u32, ObjectId>,
    detector: TableDetector,
    detect_tables: bool,
}

impl PdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let version = detect_version_from_path(path)?;
        let doc = LopdfDocument::load(path).map_err(load_error)?;
        Self::from_document(doc, version)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let version = detect_version(data)?;
        let doc = LopdfDocument::load_mem(data).map_err(load_error)?;
        Self::from_document(doc, version)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    fn from_document(doc: LopdfDocument, version: PdfVersion) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }

        let pages = doc.get_pages();
        if pages.is_empty() {
            return Err(Error::EmptyDocument);
        }
        log::debug!("Loaded PDF {} with {} pages", version, pages.len());

        Ok(Self {
            doc,
            version,
            pages,
            detector: TableDetector::new(),
            detect_tables: true,
        })
    }

    /// Apply the PDF-relevant parts of `options`.
    ///
    /// With table extraction off, table-like text stays in the text blocks.
    pub fn with_options(mut self, options: &ParseOptions) -> Self {
        self.detector = TableDetector::with_config(options.table_detector.clone());
        self.detect_tables = options.extract_tables;
        self
    }

    /// Set table detection tuning.
    pub fn with_table_detector(mut self, config: TableDetectorConfig) -> Self {
        self.detector = TableDetector::with_config(config);
        self
    }

    /// PDF version from the file header.
    pub fn version(&self) -> PdfVersion {
        self.version
    }

    /// The underlying lopdf document.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }

    /// Height of a page in points, from its (possibly inherited) MediaBox.
    pub fn page_height(&self, page: u32) -> Result<f32> {
        let page_dict = self.doc.get_dictionary(self.page_id(page)?)?;
        Ok(find_media_box(&self.doc, page_dict)
            .map(|[_, y0, _, y1]| (y1 - y0).abs())
            .filter(|h| *h > 0.0)
            .unwrap_or(DEFAULT_PAGE_HEIGHT))
    }

    fn page_spans(&self, page: u32) -> Result<(Vec<TextSpan>, f32)> {
        let page_id = self.page_id(page)?;
        let spans = LayoutAnalyzer::new(&self.doc).extract_page_spans(page_id)?;
        Ok((spans, self.page_height(page)?))
    }
}

impl ElementSource for PdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn text_blocks(&self, page: u32) -> Result<Vec<TextBlock>> {
        let (spans, height) = self.page_spans(page)?;
        let spans = if self.detect_tables {
            self.detector.detect(spans).1
        } else {
            spans
        };
        Ok(blocks_from_spans(spans, height))
    }

    fn tables(&self, page: u32) -> Result<Vec<TableRegion>> {
        let (spans, height) = self
            .page_spans(page)
            .map_err(|e| Error::TableExtract(e.to_string()))?;
        let (tables, _) = self.detector.detect(spans);
        Ok(tables.iter().map(|t| t.to_region(height)).collect())
    }

    fn images(&self, page: u32) -> Result<Vec<ImageRegion>> {
        let page_id = self.page_id(page)?;
        ImageLocator::new(&self.doc, self.page_height(page)?).locate(page_id)
    }
}

impl std::fmt::Debug for PdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfSource")
            .field("version", &self.version)
            .field("pages", &self.pages.len())
            .field("detect_tables", &self.detect_tables)
            .finish()
    }
}

fn load_error(e: lopdf::Error) -> Error {
    match e {
        lopdf::Error::Decryption(_) => Error::Encrypted,
        _ => Error::from(e),
    }
}

/// MediaBox of a page, inherited through the page tree when absent.
fn find_media_box(doc: &LopdfDocument, page: &Dictionary) -> Option<[f32; 4]> {
    let mut current = page;
    for _ in 0..32 {
        if let Ok(obj) = current.get(b"MediaBox") {
            let arr = doc.dereference(obj).ok()?.1.as_array().ok()?;
            let values: Vec<f32> = arr.iter().filter_map(get_number).collect();
            return <[f32; 4]>::try_from(values).ok();
        }
        let parent = current.get(b"Parent").ok()?;
        current = doc.dereference(parent).ok()?.1.as_dict().ok()?;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    fn blank_pdf(media_box_on_parent: bool) -> Vec<u8> {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let media_box: Vec<lopdf::Object> = vec![0.into(), 0.into(), 612.into(), 1008.into()];

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        };
        if !media_box_on_parent {
            page.set("MediaBox", media_box.clone());
        }
        let page_id = doc.add_object(page);

        let mut pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        if media_box_on_parent {
            pages.set("MediaBox", media_box);
        }
        doc.objects.insert(pages_id, pages.into());

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn test_rejects_non_pdf() {
        assert!(matches!(
            PdfSource::from_bytes(b"hello world, not a pdf"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_blank_page() {
        let source = PdfSource::from_bytes(&blank_pdf(false)).unwrap();
        assert_eq!(source.page_count(), 1);
        assert_eq!(source.version().to_string(), "1.5");
        assert_eq!(source.page_height(1).unwrap(), 1008.0);
        assert!(source.text_blocks(1).unwrap().is_empty());
        assert!(source.tables(1).unwrap().is_empty());
        assert!(source.images(1).unwrap().is_empty());
    }

    #[test]
    fn test_inherited_media_box() {
        let source = PdfSource::from_bytes(&blank_pdf(true)).unwrap();
        assert_eq!(source.page_height(1).unwrap(), 1008.0);
    }

    #[test]
    fn test_page_out_of_range() {
        let source = PdfSource::from_bytes(&blank_pdf(false)).unwrap();
        assert!(matches!(
            source.text_blocks(2),
            Err(Error::PageOutOfRange(2, 1))
        ));
        assert!(matches!(source.images(0), Err(Error::PageOutOfRange(0, 1))));
    }
}
