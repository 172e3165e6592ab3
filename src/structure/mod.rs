//! Section-aware assembly of page elements.
//!
//! Leaf-first: [`normalize()`] cleans text, [`classify`] assigns heading tiers,
//! [`merge`] puts a page's elements into reading order, [`tracker`] carries
//! the section context, and [`assemble`] drives them over a whole document.

pub mod assemble;
pub mod classify;
pub mod merge;
pub mod normalize;
pub mod tracker;

pub use assemble::{assemble_page, assemble_pages, chart_description, DocumentAssembler, MergedPage};
pub use classify::{BlockClassifier, ClassifierConfig, HeadingTier};
pub use merge::merge_page;
pub use normalize::{normalize, word_count};
pub use tracker::SectionTracker;
