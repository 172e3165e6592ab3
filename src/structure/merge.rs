//! Reading-order merge of a page's text, table and image streams.

use crate::model::{Element, PageElements};

/// Merge one page's elements into top-to-bottom reading order.
///
/// Elements are concatenated as `[text blocks.., tables.., images..]` and
/// stably sorted by the top edge of their bounding box, so elements sharing a
/// `y0` keep that concatenation order. Section attribution downstream depends
/// on this tie-break; keep it stable.
pub fn merge_page(elements: PageElements) -> Vec<Element> {
    let PageElements {
        text_blocks,
        tables,
        images,
    } = elements;

    let mut merged: Vec<Element> = Vec::with_capacity(text_blocks.len() + tables.len() + images.len());
    merged.extend(text_blocks.into_iter().map(Element::Text));
    merged.extend(tables.into_iter().map(Element::Table));
    merged.extend(images.into_iter().map(Element::Image));

    // Stable: equal tops keep concatenation order.
    merged.sort_by(|a, b| a.top().total_cmp(&b.top()));

    log::debug!(
        "Merged {} elements: {:?}",
        merged.len(),
        merged.iter().map(|e| e.kind()).collect::<Vec<_>>()
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, ImageRegion, Line, Span, TableRegion, TextBlock};

    fn text_at(label: &str, y0: f32) -> TextBlock {
        TextBlock::from_lines(vec![Line::new(vec![Span::new(
            label,
            10.0,
            "Helvetica",
            BBox::new(0.0, y0, 100.0, y0 + 10.0),
        )])])
    }

    fn table_at(label: &str, y0: f32) -> TableRegion {
        TableRegion::new(
            BBox::new(0.0, y0, 100.0, y0 + 40.0),
            vec![vec![label.to_string()]],
        )
    }

    fn image_at(index: u32, y0: f32) -> ImageRegion {
        ImageRegion::new(BBox::new(0.0, y0, 50.0, y0 + 50.0), index)
    }

    fn label(e: &Element) -> String {
        match e {
            Element::Text(t) => t.raw_text(),
            Element::Table(t) => t.rows[0][0].clone(),
            Element::Image(i) => format!("img{}", i.index),
        }
    }

    #[test]
    fn test_sorted_by_top() {
        let page = PageElements::new()
            .with_text(text_at("body", 50.0))
            .with_text(text_at("heading", 10.0))
            .with_table(table_at("T", 30.0))
            .with_image(image_at(1, 5.0));

        let labels: Vec<String> = merge_page(page).iter().map(label).collect();
        assert_eq!(labels, vec!["img1", "heading", "T", "body"]);
    }

    #[test]
    fn test_ties_keep_concatenation_order() {
        let page = PageElements::new()
            .with_image(image_at(1, 20.0))
            .with_table(table_at("T", 20.0))
            .with_text(text_at("second", 20.0))
            .with_text(text_at("first", 20.0));

        let labels: Vec<String> = merge_page(page).iter().map(label).collect();
        assert_eq!(labels, vec!["second", "first", "T", "img1"]);
    }

    #[test]
    fn test_empty_page() {
        assert!(merge_page(PageElements::new()).is_empty());
    }

    #[test]
    fn test_all_elements_kept() {
        let page = PageElements::new()
            .with_text(text_at("a", 1.0))
            .with_text(text_at("b", 1.0))
            .with_table(table_at("T", 0.0))
            .with_image(image_at(1, 2.0))
            .with_image(image_at(2, 2.0));
        assert_eq!(merge_page(page).len(), 5);
    }
}
