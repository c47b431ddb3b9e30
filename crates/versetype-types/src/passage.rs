//! Passages of the practice corpus.

use serde::{Deserialize, Serialize};

/// One unit of text the user must reproduce exactly.
///
/// Passages are built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Name of the collection (book) this passage belongs to.
    pub collection: String,
    /// Zero-based position within the collection.
    pub ordinal: usize,
    /// Book number as it appears in the corpus.
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
    /// Normalized passage text.
    pub text: String,
}

impl Passage {
    /// Metadata sent alongside the passage text.
    pub fn meta(&self) -> PassageMeta {
        PassageMeta {
            book_name: self.collection.clone(),
            book: self.book,
            chapter: self.chapter,
            verse: self.verse,
        }
    }
}

/// Passage metadata without the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageMeta {
    pub book_name: String,
    pub book: u32,
    pub chapter: u32,
    pub verse: u32,
}
