//! Heading-tier classification of text blocks.
//!
//! The classifier looks only at the first span of the first line: font size,
//! weight and the word count of that first line. Checks run in a fixed order
//! and the first match wins.

use crate::error::{Error, Result};
use crate::model::TextBlock;

use super::normalize::{normalize, word_count};

/// Classification outcome for a text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadingTier {
    /// Top-level heading; resets the sub-section
    Section,
    /// Second-level heading
    SubSection,
    /// Ordinary text
    Paragraph,
}

impl HeadingTier {
    /// Check if this tier updates the section context.
    pub fn is_heading(&self) -> bool {
        !matches!(self, HeadingTier::Paragraph)
    }
}

/// Thresholds for heading classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    /// Emphasized text strictly larger than this is a section heading
    pub heading_font_size: f32,
    /// Emphasized text strictly larger than this is a sub-section heading
    pub subheading_font_size: f32,
    /// Emphasized first lines with fewer words than this are sub-section headings
    pub heading_word_count: usize,
}

impl ClassifierConfig {
    /// Create a config with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the section heading font-size threshold.
    pub fn with_heading_font_size(mut self, size: f32) -> Self {
        self.heading_font_size = size;
        self
    }

    /// Set the sub-section heading font-size threshold.
    pub fn with_subheading_font_size(mut self, size: f32) -> Self {
        self.subheading_font_size = size;
        self
    }

    /// Set the short-heading word-count threshold.
    pub fn with_heading_word_count(mut self, words: usize) -> Self {
        self.heading_word_count = words;
        self
    }

    /// Reject thresholds that would make the decision table meaningless.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("heading_font_size", self.heading_font_size),
            ("subheading_font_size", self.subheading_font_size),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.subheading_font_size > self.heading_font_size {
            return Err(Error::InvalidConfig(format!(
                "subheading_font_size ({}) exceeds heading_font_size ({})",
                self.subheading_font_size, self.heading_font_size
            )));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            heading_font_size: 14.0,
            subheading_font_size: 11.5,
            heading_word_count: 10,
        }
    }
}

/// Assigns heading tiers to text blocks.
#[derive(Debug, Clone, Default)]
pub struct BlockClassifier {
    config: ClassifierConfig,
}

impl BlockClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify one text block.
    pub fn classify(&self, block: &TextBlock) -> HeadingTier {
        let Some(first_line) = block.lines.first() else {
            return HeadingTier::Paragraph;
        };
        let Some(first_span) = first_line.spans.first() else {
            return HeadingTier::Paragraph;
        };

        let font_size = first_span.font_size;
        let emphasized = first_span.is_bold();
        let words = word_count(&normalize(&first_line.raw_text()));

        if emphasized && font_size > self.config.heading_font_size {
            HeadingTier::Section
        } else if emphasized && font_size > self.config.subheading_font_size {
            HeadingTier::SubSection
        } else if emphasized && words < self.config.heading_word_count {
            HeadingTier::SubSection
        } else {
            HeadingTier::Paragraph
        }
    }
}
