//! Assembly behavior over element sources.

use pdfsection::{
    assemble, BBox, ContentItem, ElementSource, Error, ImageRegion, Line, PageElements,
    ParseOptions, PreparedSource, SectionContext, Span, TableRegion, TextBlock,
};

fn block(text: &str, size: f32, font: &str, y0: f32) -> TextBlock {
    TextBlock::from_lines(vec![Line::new(vec![Span::new(
        text,
        size,
        font,
        BBox::new(72.0, y0, 400.0, y0 + size),
    )])])
}

fn section(text: &str, y0: f32) -> TextBlock {
    block(text, 18.0, "Helvetica-Bold", y0)
}

fn sub_section(text: &str, y0: f32) -> TextBlock {
    block(text, 12.0, "Helvetica-Bold", y0)
}

fn body(text: &str, y0: f32) -> TextBlock {
    block(text, 10.0, "Helvetica", y0)
}

fn table(cell: &str, y0: f32) -> TableRegion {
    TableRegion::new(
        BBox::new(72.0, y0, 400.0, y0 + 30.0),
        vec![vec!["Header".to_string()], vec![cell.to_string()]],
    )
}

/// Wraps a prepared source and fails table extraction on selected pages.
struct FlakyTables {
    inner: PreparedSource,
    failing_pages: Vec<u32>,
}

impl ElementSource for FlakyTables {
    fn page_count(&self) -> u32 {
        self.inner.page_count()
    }

    fn text_blocks(&self, page: u32) -> pdfsection::Result<Vec<TextBlock>> {
        self.inner.text_blocks(page)
    }

    fn tables(&self, page: u32) -> pdfsection::Result<Vec<TableRegion>> {
        if self.failing_pages.contains(&page) {
            return Err(Error::TableExtract(format!("no grid on page {}", page)));
        }
        self.inner.tables(page)
    }

    fn images(&self, page: u32) -> pdfsection::Result<Vec<ImageRegion>> {
        self.inner.images(page)
    }
}

/// Fails text extraction on one page.
struct UnreadablePage {
    inner: PreparedSource,
    page: u32,
}

impl ElementSource for UnreadablePage {
    fn page_count(&self) -> u32 {
        self.inner.page_count()
    }

    fn text_blocks(&self, page: u32) -> pdfsection::Result<Vec<TextBlock>> {
        if page == self.page {
            return Err(Error::TextExtract("broken content stream".to_string()));
        }
        self.inner.text_blocks(page)
    }

    fn tables(&self, page: u32) -> pdfsection::Result<Vec<TableRegion>> {
        self.inner.tables(page)
    }

    fn images(&self, page: u32) -> pdfsection::Result<Vec<ImageRegion>> {
        self.inner.images(page)
    }
}

#[test]
fn test_ordering_law() {
    let source = PreparedSource::new(vec![PageElements::new()
        .with_text(body("body", 50.0))
        .with_table(table("T", 30.0))
        .with_text(section("Intro", 10.0))]);

    let doc = assemble(&source, ParseOptions::default()).unwrap();
    let ctx = SectionContext::new(Some("Intro".to_string()), None);
    assert_eq!(
        doc.pages[0].content,
        vec![
            ContentItem::paragraph("Intro", &ctx),
            ContentItem::table(vec![vec!["Header".into()], vec!["T".into()]], &ctx),
            ContentItem::paragraph("body", &ctx),
        ]
    );
}

#[test]
fn test_section_clears_sub_section() {
    let source = PreparedSource::new(vec![PageElements::new()
        .with_text(section("Chapter 1", 10.0))
        .with_text(sub_section("Background", 30.0))
        .with_text(body("text under background", 50.0))
        .with_text(section("Chapter 2", 70.0))
        .with_text(body("text under chapter 2", 90.0))]);

    let doc = assemble(&source, ParseOptions::default()).unwrap();
    let content = &doc.pages[0].content;

    assert_eq!(content[1].sub_section(), Some("Background"));
    assert_eq!(content[2].sub_section(), Some("Background"));
    assert_eq!(content[3].section(), Some("Chapter 2"));
    assert_eq!(content[3].sub_section(), None);
    assert_eq!(content[4].sub_section(), None);
}

#[test]
fn test_sub_section_without_section() {
    let source = PreparedSource::new(vec![PageElements::new()
        .with_text(sub_section("Preface", 10.0))
        .with_text(body("opening words", 30.0))]);

    let doc = assemble(&source, ParseOptions::default()).unwrap();
    let item = &doc.pages[0].content[1];
    assert_eq!(item.section(), None);
    assert_eq!(item.sub_section(), Some("Preface"));
}

#[test]
fn test_cross_page_persistence() {
    let source = PreparedSource::new(vec![
        PageElements::new()
            .with_text(section("Intro", 10.0))
            .with_text(body("first page", 30.0)),
        PageElements::new()
            .with_text(body("second page", 10.0))
            .with_table(table("row", 40.0))
            .with_image(ImageRegion::new(BBox::new(72.0, 100.0, 300.0, 300.0), 1)),
    ]);

    let doc = assemble(&source, ParseOptions::default()).unwrap();
    let page2 = &doc.pages[1].content;
    assert_eq!(page2.len(), 3);
    assert!(page2.iter().all(|item| item.section() == Some("Intro")));
    assert_eq!(
        page2[2],
        ContentItem::chart(
            "Image/Chart 1 on page 2",
            &SectionContext::new(Some("Intro".to_string()), None)
        )
    );
}

#[test]
fn test_partial_failure_isolation() {
    let pages = (1..=4)
        .map(|n| {
            PageElements::new()
                .with_text(body(&format!("page {}", n), 10.0))
                .with_table(table(&format!("cell {}", n), 40.0))
        })
        .collect();
    let source = FlakyTables {
        inner: PreparedSource::new(pages),
        failing_pages: vec![3],
    };

    for options in [ParseOptions::default(), ParseOptions::default().sequential()] {
        let doc = assemble(&source, options).unwrap();

        assert_eq!(doc.page_count(), 4);
        assert_eq!(doc.pages[2].table_count(), 0);
        assert_eq!(doc.pages[2].content.len(), 1);
        for n in [1, 2, 4] {
            let page = doc.get_page(n).unwrap();
            assert_eq!(page.page_number, n);
            assert_eq!(page.table_count(), 1);
        }
    }
}

#[test]
fn test_text_failure_is_fatal_by_default() {
    let source = UnreadablePage {
        inner: PreparedSource::new(vec![
            PageElements::new().with_text(body("ok", 10.0)),
            PageElements::new().with_text(body("lost", 10.0)),
        ]),
        page: 2,
    };

    let result = assemble(&source, ParseOptions::default());
    assert!(matches!(result, Err(Error::TextExtract(_))));
}

#[test]
fn test_text_failure_skipped_when_lenient() {
    let source = UnreadablePage {
        inner: PreparedSource::new(vec![
            PageElements::new().with_text(section("Intro", 10.0)),
            PageElements::new()
                .with_text(body("lost", 10.0))
                .with_table(table("kept", 40.0)),
        ]),
        page: 2,
    };

    let doc = assemble(&source, ParseOptions::default().lenient()).unwrap();
    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.pages[1].content.len(), 1);
    assert!(doc.pages[1].content[0].is_table());
    assert_eq!(doc.pages[1].content[0].section(), Some("Intro"));
}

#[test]
fn test_empty_source_is_fatal() {
    let result = assemble(&PreparedSource::default(), ParseOptions::default());
    assert!(matches!(result, Err(Error::EmptyDocument)));
}

#[test]
fn test_heading_split_across_spans_uses_first_line() {
    // Bold first span decides the tier; the word count comes from the
    // whole first line only.
    let block = TextBlock::from_lines(vec![
        Line::new(vec![
            Span::new("Key", 9.0, "Times-Bold", BBox::new(72.0, 10.0, 90.0, 19.0)),
            Span::new(" findings", 9.0, "Times-Roman", BBox::new(90.0, 10.0, 140.0, 19.0)),
        ]),
        Line::new(vec![Span::new(
            "and a long continuation line that would push the count well past ten words",
            9.0,
            "Times-Roman",
            BBox::new(72.0, 20.0, 500.0, 29.0),
        )]),
    ]);
    let source = PreparedSource::new(vec![PageElements::new().with_text(block)]);

    let doc = assemble(&source, ParseOptions::default()).unwrap();
    let item = &doc.pages[0].content[0];
    assert_eq!(item.sub_section(), item.text());
    assert!(item.text().unwrap().starts_with("Key findings and a long"));
}
