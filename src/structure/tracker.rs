//! Section context carried across the whole document.

use crate::model::SectionContext;

use super::classify::HeadingTier;

/// Carries the active section and sub-section labels forward.
///
/// The tracker lives for one document parse and is never reset between
/// pages; a section opened on page 3 still governs page 4 until a new
/// section heading supersedes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTracker {
    context: SectionContext,
}

impl SectionTracker {
    /// Start with no active section.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current section context.
    pub fn current(&self) -> &SectionContext {
        &self.context
    }

    /// Apply one classified text fragment.
    ///
    /// A section heading replaces the section and clears the sub-section; a
    /// sub-section heading replaces only the sub-section; paragraphs change
    /// nothing.
    pub fn observe(&mut self, tier: HeadingTier, text: &str) {
        match tier {
            HeadingTier::Section => {
                self.context.section = Some(text.to_string());
                self.context.sub_section = None;
            }
            HeadingTier::SubSection => {
                self.context.sub_section = Some(text.to_string());
            }
            HeadingTier::Paragraph => {}
        }
    }
}
