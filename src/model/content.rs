//! Section-tagged output content.

use serde::{Deserialize, Serialize};

/// The carried-forward (section, sub-section) label pair.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionContext {
    /// Active section heading
    pub section: Option<String>,
    /// Active sub-section heading
    pub sub_section: Option<String>,
}

impl SectionContext {
    /// Create a context with both labels set or unset.
    pub fn new(section: Option<String>, sub_section: Option<String>) -> Self {
        Self {
            section,
            sub_section,
        }
    }

    /// Check if neither label is set.
    pub fn is_empty(&self) -> bool {
        self.section.is_none() && self.sub_section.is_none()
    }
}

/// One unit of assembled output, stamped with its section context.
///
/// Serializes to the tagged shapes
/// `{"type":"paragraph","section",…,"sub_section",…,"text",…}`,
/// `{"type":"table",…,"description":null,"table_data":[[…]]}` and
/// `{"type":"chart",…,"description":…,"Table_data":null}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// A text block
    Paragraph {
        /// Active section
        section: Option<String>,
        /// Active sub-section
        sub_section: Option<String>,
        /// Normalized text
        text: String,
    },

    /// A table
    Table {
        /// Active section
        section: Option<String>,
        /// Active sub-section
        sub_section: Option<String>,
        /// Free-form description; never filled by the assembler
        description: Option<String>,
        /// Row-major cells, header first
        #[serde(rename = "table_data")]
        rows: Vec<Vec<String>>,
    },

    /// An image or chart placeholder
    Chart {
        /// Active section
        section: Option<String>,
        /// Active sub-section
        sub_section: Option<String>,
        /// Generated label
        description: String,
        /// Data recovered for the chart; never filled by the assembler
        #[serde(rename = "Table_data")]
        table_data: Option<Vec<Vec<String>>>,
    },
}

impl ContentItem {
    /// Create a paragraph stamped with `ctx`.
    pub fn paragraph(text: impl Into<String>, ctx: &SectionContext) -> Self {
        ContentItem::Paragraph {
            section: ctx.section.clone(),
            sub_section: ctx.sub_section.clone(),
            text: text.into(),
        }
    }

    /// Create a table stamped with `ctx`.
    pub fn table(rows: Vec<Vec<String>>, ctx: &SectionContext) -> Self {
        ContentItem::Table {
            section: ctx.section.clone(),
            sub_section: ctx.sub_section.clone(),
            description: None,
            rows,
        }
    }

    /// Create a chart placeholder stamped with `ctx`.
    pub fn chart(description: impl Into<String>, ctx: &SectionContext) -> Self {
        ContentItem::Chart {
            section: ctx.section.clone(),
            sub_section: ctx.sub_section.clone(),
            description: description.into(),
            table_data: None,
        }
    }

    /// Section label this item was stamped with.
    pub fn section(&self) -> Option<&str> {
        match self {
            ContentItem::Paragraph { section, .. }
            | ContentItem::Table { section, .. }
            | ContentItem::Chart { section, .. } => section.as_deref(),
        }
    }

    /// Sub-section label this item was stamped with.
    pub fn sub_section(&self) -> Option<&str> {
        match self {
            ContentItem::Paragraph { sub_section, .. }
            | ContentItem::Table { sub_section, .. }
            | ContentItem::Chart { sub_section, .. } => sub_section.as_deref(),
        }
    }

    /// Paragraph text, if this is a paragraph.
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentItem::Paragraph { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Check if this item is a paragraph.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, ContentItem::Paragraph { .. })
    }

    /// Check if this item is a table.
    pub fn is_table(&self) -> bool {
        matches!(self, ContentItem::Table { .. })
    }

    /// Check if this item is a chart.
    pub fn is_chart(&self) -> bool {
        matches!(self, ContentItem::Chart { .. })
    }

    /// Plain-text rendering: paragraph text, tab-separated table rows, or the
    /// chart description.
    pub fn plain_text(&self) -> String {
        match self {
            ContentItem::Paragraph { text, .. } => text.clone(),
            ContentItem::Table { rows, .. } => rows
                .iter()
                .map(|row| row.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
            ContentItem::Chart { description, .. } => description.clone(),
        }
    }
}
