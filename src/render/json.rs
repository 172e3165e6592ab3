//! JSON rendering for assembled documents.
//!
//! The output is `{"pages": [{"page_number": 1, "content": [...]}, ...]}`.
//! Absent sections are written as `null`, never as an empty string, so a
//! rendered document parses back to an identical value.

use std::io::Write;

use crate::error::{Error, Result};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write a document as JSON.
pub fn to_writer<W: Write>(writer: W, doc: &Document, format: JsonFormat) -> Result<()> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_writer_pretty(writer, doc),
        JsonFormat::Compact => serde_json::to_writer(writer, doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Parse a document previously rendered with [`to_json`].
pub fn from_json(json: &str) -> Result<Document> {
    serde_json::from_str(json).map_err(|e| Error::Render(format!("JSON parse error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentItem, Page, SectionContext};

    fn sample() -> Document {
        let ctx = SectionContext::new(Some("Intro".to_string()), None);
        let mut doc = Document::new();
        doc.add_page(Page::new(
            1,
            vec![
                ContentItem::paragraph("Intro", &ctx),
                ContentItem::table(vec![vec!["a".into()], vec!["1".into()]], &ctx),
            ],
        ));
        doc.add_page(Page::new(2, vec![]));
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"page_number\": 1"));
        assert!(json.contains("\"sub_section\": null"));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with("{\"pages\":[{\"page_number\":1,\"content\":["));
        assert!(json.ends_with("{\"page_number\":2,\"content\":[]}]}"));
    }

    #[test]
    fn test_to_writer_matches_to_json() {
        let mut out = Vec::new();
        to_writer(&mut out, &sample(), JsonFormat::Compact).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            to_json(&sample(), JsonFormat::Compact).unwrap()
        );
    }

    #[test]
    fn test_from_json_round_trip() {
        let doc = sample();
        for format in [JsonFormat::Pretty, JsonFormat::Compact] {
            let json = to_json(&doc, format).unwrap();
            assert_eq!(from_json(&json).unwrap(), doc);
        }
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(from_json("[1, 2"), Err(Error::Render(_))));
    }
}
