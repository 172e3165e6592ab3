//! Page-local primitive elements produced by the extraction collaborators.
//!
//! Coordinates use a top-left origin: `y0` is the top edge of an element and
//! grows downward, so ascending `y0` is top-to-bottom reading order.

use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box `(x0, y0, x1, y1)`.
///
/// Serialized as a four-element array, matching how extractors usually
/// report boxes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BBox {
    /// Create a bounding box from its four edges.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Smallest box covering both `self` and `other`.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Smallest box covering every box in `boxes`, or `None` if empty.
    pub fn enclosing<'a>(boxes: impl IntoIterator<Item = &'a BBox>) -> Option<BBox> {
        boxes.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(a) => Some(a.union(b)),
        })
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// A run of text sharing one font and size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// The text content
    pub text: String,
    /// Font size in points
    pub font_size: f32,
    /// Font identifier (e.g., "Helvetica-Bold"); weight is encoded in the name
    pub font_name: String,
    /// Position on the page
    #[serde(default)]
    pub bbox: BBox,
}

impl Span {
    /// Create a new span.
    pub fn new(
        text: impl Into<String>,
        font_size: f32,
        font_name: impl Into<String>,
        bbox: BBox,
    ) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_name: font_name.into(),
            bbox,
        }
    }

    /// Whether the font identifier signals emphasis.
    pub fn is_bold(&self) -> bool {
        self.font_name.to_lowercase().contains("bold")
    }
}

/// One visual line of a text block.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Line {
    /// Spans in reading order
    pub spans: Vec<Span>,
}

impl Line {
    /// Create a line from spans.
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    /// Concatenated span text, without separators.
    pub fn raw_text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A block of text lines, as grouped by the text extractor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextBlock {
    /// Lines in reading order
    pub lines: Vec<Line>,
    /// Position on the page
    pub bbox: BBox,
}

impl TextBlock {
    /// Create a text block.
    pub fn new(lines: Vec<Line>, bbox: BBox) -> Self {
        Self { lines, bbox }
    }

    /// Create a text block whose box encloses all its spans.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let bbox = BBox::enclosing(lines.iter().flat_map(|l| l.spans.iter().map(|s| &s.bbox)))
            .unwrap_or_default();
        Self { lines, bbox }
    }

    /// Span texts of every line joined by single spaces.
    ///
    /// The result still carries extraction whitespace; run it through
    /// [`crate::structure::normalize`] before use.
    pub fn raw_text(&self) -> String {
        self.lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.text.as_str()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// First span of the first line, if any.
    pub fn first_span(&self) -> Option<&Span> {
        self.lines.first().and_then(|l| l.spans.first())
    }
}

/// A detected table and its cell grid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TableRegion {
    /// Position on the page
    pub bbox: BBox,
    /// Row-major cell text; row 0 is the header
    pub rows: Vec<Vec<String>>,
}

impl TableRegion {
    /// Create a table region.
    pub fn new(bbox: BBox, rows: Vec<Vec<String>>) -> Self {
        Self { bbox, rows }
    }
}

/// A detected image placement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageRegion {
    /// Position on the page
    pub bbox: BBox,
    /// 1-based index within the page
    pub index: u32,
}

impl ImageRegion {
    /// Create an image region.
    pub fn new(bbox: BBox, index: u32) -> Self {
        Self { bbox, index }
    }
}

/// Any page-local element, prior to reading-order merging.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A text block
    Text(TextBlock),
    /// A table region
    Table(TableRegion),
    /// An image region
    Image(ImageRegion),
}

impl Element {
    /// Bounding box of the element.
    pub fn bbox(&self) -> &BBox {
        match self {
            Element::Text(t) => &t.bbox,
            Element::Table(t) => &t.bbox,
            Element::Image(i) => &i.bbox,
        }
    }

    /// Top coordinate used for reading order.
    pub fn top(&self) -> f32 {
        self.bbox().y0
    }

    /// Short name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Element::Text(_) => "text",
            Element::Table(_) => "table",
            Element::Image(_) => "image",
        }
    }
}

/// The three element collections of one page, each in extractor order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageElements {
    /// Text blocks
    #[serde(default)]
    pub text_blocks: Vec<TextBlock>,
    /// Table regions
    #[serde(default)]
    pub tables: Vec<TableRegion>,
    /// Image regions
    #[serde(default)]
    pub images: Vec<ImageRegion>,
}

impl PageElements {
    /// Create an empty element set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text block.
    pub fn with_text(mut self, block: TextBlock) -> Self {
        self.text_blocks.push(block);
        self
    }

    /// Add a table region.
    pub fn with_table(mut self, table: TableRegion) -> Self {
        self.tables.push(table);
        self
    }

    /// Add an image region.
    pub fn with_image(mut self, image: ImageRegion) -> Self {
        self.images.push(image);
        self
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.text_blocks.len() + self.tables.len() + self.images.len()
    }

    /// Check if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
