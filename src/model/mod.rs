//! Data model for section-tagged PDF content.
//!
//! Two layers live here: the page-local primitive elements handed over by
//! the extraction collaborators, and the assembled output
//! ([`Document`], [`Page`], [`ContentItem`]) that carries a section stamp on
//! every item.

mod content;
mod document;
mod element;

pub use content::{ContentItem, SectionContext};
pub use document::{Document, Page};
pub use element::{BBox, Element, ImageRegion, Line, PageElements, Span, TableRegion, TextBlock};
