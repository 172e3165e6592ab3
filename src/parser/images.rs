//! Image placement on PDF pages.
//!
//! Walks the graphics state operators of a page (`q`, `Q`, `cm`) and records
//! where each image XObject is painted by `Do`. An image occupies the unit
//! square mapped through the current transformation matrix. Form XObjects
//! are entered with their own matrix and resources.

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, ObjectId};

use crate::error::{Error, Result};
use crate::model::{BBox, ImageRegion};

use super::graphics::{
    lookup_xobject, page_resources, GraphicsState, Matrix, XObject, MAX_FORM_DEPTH,
};
use super::layout::page_content;

/// Locates image placements on one page.
pub struct ImageLocator<'a> {
    doc: &'a LopdfDocument,
    page_height: f32,
    found: Vec<ImageRegion>,
}

impl<'a> ImageLocator<'a> {
    /// Create a locator for a page of the given height.
    pub fn new(doc: &'a LopdfDocument, page_height: f32) -> Self {
        Self {
            doc,
            page_height,
            found: Vec::new(),
        }
    }

    /// Image regions of a page in paint order, indexed from 1.
    pub fn locate(mut self, page_id: ObjectId) -> Result<Vec<ImageRegion>> {
        let doc = self.doc;
        let content = page_content(doc, page_id).map_err(|e| Error::ImageExtract(e.to_string()))?;
        let resources = page_resources(doc, doc.get_dictionary(page_id)?);

        self.walk(&content, resources, Matrix::IDENTITY, 0)?;
        Ok(self.found)
    }

    fn walk(
        &mut self,
        content: &[u8],
        resources: Option<&Dictionary>,
        base: Matrix,
        depth: usize,
    ) -> Result<()> {
        let content = Content::decode(content).map_err(|e| Error::ImageExtract(e.to_string()))?;

        let mut gs = GraphicsState::new(base);

        for op in content.operations {
            if gs.apply(&op.operator, &op.operands) {
                continue;
            }
            if op.operator == "Do" {
                let Some(name) = op.operands.first().and_then(|o| o.as_name().ok()) else {
                    continue;
                };
                self.paint(name, resources, gs.ctm(), depth)?;
            }
        }

        Ok(())
    }

    fn paint(
        &mut self,
        name: &[u8],
        resources: Option<&Dictionary>,
        ctm: Matrix,
        depth: usize,
    ) -> Result<()> {
        let doc = self.doc;
        match lookup_xobject(doc, resources, name) {
            Some(XObject::Image) => {
                let (x0, y0, x1, y1) = ctm.unit_square_bounds();
                let index = self.found.len() as u32 + 1;
                self.found.push(ImageRegion::new(
                    BBox::new(x0, self.page_height - y1, x1, self.page_height - y0),
                    index,
                ));
            }
            Some(XObject::Form {
                content,
                matrix,
                resources,
            }) if depth < MAX_FORM_DEPTH => {
                self.walk(&content, resources, matrix.then(&ctm), depth + 1)?;
            }
            Some(_) => {}
            None => log::debug!("XObject {} not found", String::from_utf8_lossy(name)),
        }

        Ok(())
    }
}
