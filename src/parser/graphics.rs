//! Graphics state shared by the content stream walkers.
//!
//! Both text and image extraction track the current transformation matrix
//! through `q`, `Q` and `cm`, and enter Form XObjects painted by `Do`, so
//! spans and image boxes land in the same page space.

use std::collections::BTreeMap;

use lopdf::{Dictionary, Document as LopdfDocument, Object};

use super::layout::get_number;

/// Nested form XObjects deeper than this are not entered.
pub(crate) const MAX_FORM_DEPTH: usize = 8;

/// A 2D affine transform `[a b c d e f]`, as in PDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Matrix(pub(crate) [f32; 6]);

impl Matrix {
    pub(crate) const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    pub(crate) fn from_operands(operands: &[Object]) -> Option<Matrix> {
        if operands.len() < 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, obj) in m.iter_mut().zip(operands) {
            *slot = get_number(obj)?;
        }
        Some(Matrix(m))
    }

    /// `self` applied first, then `other`.
    pub(crate) fn then(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, e1, f1] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a1 * a2 + b1 * c2,
            a1 * b2 + b1 * d2,
            c1 * a2 + d1 * c2,
            c1 * b2 + d1 * d2,
            e1 * a2 + f1 * c2 + e2,
            e1 * b2 + f1 * d2 + f2,
        ])
    }

    pub(crate) fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        let [a, b, c, d, e, f] = self.0;
        (a * x + c * y + e, b * x + d * y + f)
    }

    /// Translation part.
    pub(crate) fn origin(&self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }

    /// Horizontal scale factor.
    pub(crate) fn scale(&self) -> f32 {
        let [a, _, c, ..] = self.0;
        (a * a + c * c).sqrt()
    }

    /// Bounding box of the unit square under this transform.
    pub(crate) fn unit_square_bounds(&self) -> (f32, f32, f32, f32) {
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(1.0, 0.0),
            self.apply(0.0, 1.0),
            self.apply(1.0, 1.0),
        ];
        corners.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        )
    }
}

/// Current transformation matrix with its `q`/`Q` save stack.
#[derive(Debug, Clone)]
pub(crate) struct GraphicsState {
    ctm: Matrix,
    saved: Vec<Matrix>,
}

impl GraphicsState {
    pub(crate) fn new(base: Matrix) -> Self {
        Self {
            ctm: base,
            saved: Vec::new(),
        }
    }

    pub(crate) fn ctm(&self) -> Matrix {
        self.ctm
    }

    /// Apply a graphics state operator. Returns false for other operators.
    pub(crate) fn apply(&mut self, operator: &str, operands: &[Object]) -> bool {
        match operator {
            "q" => self.saved.push(self.ctm),
            "Q" => {
                // Unbalanced Q is tolerated
                if let Some(saved) = self.saved.pop() {
                    self.ctm = saved;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            _ => return false,
        }
        true
    }
}

/// An XObject resolved from a resource dictionary.
pub(crate) enum XObject<'a> {
    Image,
    Form {
        content: Vec<u8>,
        matrix: Matrix,
        resources: Option<&'a Dictionary>,
    },
    Other,
}

/// Look up a named XObject. Forms without their own resources use the
/// resources they are painted from.
pub(crate) fn lookup_xobject<'a>(
    doc: &'a LopdfDocument,
    resources: Option<&'a Dictionary>,
    name: &[u8],
) -> Option<XObject<'a>> {
    let stream = resources
        .and_then(|r| resolve_dict(doc, r.get(b"XObject").ok()?))
        .and_then(|xobjects| xobjects.get(name).ok())
        .and_then(|obj| doc.dereference(obj).ok())
        .and_then(|(_, obj)| obj.as_stream().ok())?;

    let subtype = stream.dict.get(b"Subtype").ok().and_then(|s| s.as_name().ok());
    Some(match subtype {
        Some(b"Image") => XObject::Image,
        Some(b"Form") => XObject::Form {
            content: stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone()),
            matrix: stream
                .dict
                .get(b"Matrix")
                .ok()
                .and_then(|m| m.as_array().ok())
                .and_then(|m| Matrix::from_operands(m))
                .unwrap_or(Matrix::IDENTITY),
            resources: stream
                .dict
                .get(b"Resources")
                .ok()
                .and_then(|r| resolve_dict(doc, r))
                .or(resources),
        },
        _ => XObject::Other,
    })
}

/// Resolve an object to a dictionary, following a reference.
pub(crate) fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    doc.dereference(obj).ok()?.1.as_dict().ok()
}

/// Page resources, inherited through the page tree when absent.
pub(crate) fn page_resources<'a>(
    doc: &'a LopdfDocument,
    page: &'a Dictionary,
) -> Option<&'a Dictionary> {
    let mut current = page;
    for _ in 0..32 {
        if let Some(resources) = current.get(b"Resources").ok().and_then(|r| resolve_dict(doc, r)) {
            return Some(resources);
        }
        current = resolve_dict(doc, current.get(b"Parent").ok()?)?;
    }
    None
}

/// Font dictionaries of a resource dictionary, by resource name.
pub(crate) fn resource_fonts<'a>(
    doc: &'a LopdfDocument,
    resources: Option<&'a Dictionary>,
) -> BTreeMap<Vec<u8>, &'a Dictionary> {
    let Some(fonts) = resources.and_then(|r| resolve_dict(doc, r.get(b"Font").ok()?)) else {
        return BTreeMap::new();
    };
    fonts
        .iter()
        .filter_map(|(name, obj)| Some((name.clone(), resolve_dict(doc, obj)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_compose() {
        let translate = Matrix([1.0, 0.0, 0.0, 1.0, 10.0, 20.0]);
        let scale = Matrix([2.0, 0.0, 0.0, 3.0, 0.0, 0.0]);
        // Scale then translate
        assert_eq!(scale.then(&translate).apply(1.0, 1.0), (12.0, 23.0));
        // Translate then scale
        assert_eq!(translate.then(&scale).apply(1.0, 1.0), (22.0, 63.0));
    }

    #[test]
    fn test_unit_square_bounds() {
        let placement = Matrix([200.0, 0.0, 0.0, 100.0, 72.0, 500.0]);
        assert_eq!(placement.unit_square_bounds(), (72.0, 500.0, 272.0, 600.0));
    }

    #[test]
    fn test_from_operands() {
        let ops = vec![
            Object::Integer(1),
            Object::Real(0.0),
            Object::Integer(0),
            Object::Integer(1),
            Object::Real(5.5),
            Object::Integer(6),
        ];
        assert_eq!(
            Matrix::from_operands(&ops),
            Some(Matrix([1.0, 0.0, 0.0, 1.0, 5.5, 6.0]))
        );
        assert_eq!(Matrix::from_operands(&ops[..3]), None);
    }

    #[test]
    fn test_graphics_state_save_restore() {
        let mut gs = GraphicsState::new(Matrix::IDENTITY);
        let shift = [1, 0, 0, 1, 0, -600].map(Object::Integer);

        assert!(gs.apply("q", &[]));
        assert!(gs.apply("cm", &shift));
        assert_eq!(gs.ctm().apply(72.0, 720.0), (72.0, 120.0));
        assert!(gs.apply("Q", &[]));
        assert_eq!(gs.ctm(), Matrix::IDENTITY);

        // Extra Q leaves the matrix alone
        assert!(gs.apply("Q", &[]));
        assert_eq!(gs.ctm(), Matrix::IDENTITY);
        assert!(!gs.apply("Tj", &[]));
    }

    #[test]
    fn test_scale_and_origin() {
        let m = Matrix([2.0, 0.0, 0.0, 2.0, 5.0, 7.0]);
        assert_eq!(m.scale(), 2.0);
        assert_eq!(m.origin(), (5.0, 7.0));
    }
}
