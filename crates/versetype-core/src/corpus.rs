//! Passage index built from a JSON corpus.
//!
//! The corpus format is `{ "metadata": {...}, "verses": [...] }` where each
//! verse carries `book_name`, `book`, `chapter`, `verse` and `text`. Verses
//! are grouped into collections by `book_name`, in order of first appearance.

use crate::{normalize, Result, VersetypeError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use versetype_types::{BookProgress, Passage};

#[derive(Debug, Deserialize)]
struct CorpusFile {
    #[serde(default)]
    metadata: CorpusMetadata,
    verses: Vec<CorpusVerse>,
}

#[derive(Debug, Default, Deserialize)]
struct CorpusMetadata {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct CorpusVerse {
    book_name: String,
    #[serde(default)]
    book: u32,
    #[serde(default)]
    chapter: u32,
    #[serde(default)]
    verse: u32,
    text: String,
}

/// Immutable mapping from collection name to its ordered passages.
#[derive(Debug, Clone, Default)]
pub struct PassageIndex {
    names: Vec<String>,
    collections: HashMap<String, Arc<[Passage]>>,
}

impl PassageIndex {
    /// Build an index from passages already in collection order.
    ///
    /// Empty input is a startup error: no session can run without passages.
    pub fn from_passages(passages: impl IntoIterator<Item = Passage>) -> Result<Self> {
        let mut names: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<Passage>> = HashMap::new();

        for mut passage in passages {
            let group = grouped.entry(passage.collection.clone()).or_insert_with(|| {
                names.push(passage.collection.clone());
                Vec::new()
            });
            passage.ordinal = group.len();
            group.push(passage);
        }

        if names.is_empty() {
            return Err(VersetypeError::EmptyCorpus);
        }

        let collections = grouped
            .into_iter()
            .map(|(name, passages)| (name, Arc::from(passages)))
            .collect();

        Ok(Self { names, collections })
    }

    /// Passages of a collection, if it exists.
    pub fn get(&self, name: &str) -> Option<Arc<[Passage]>> {
        self.collections.get(name).cloned()
    }

    /// Collection names in corpus order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Pair every collection with a completion percentage, defaulting to 0.
    pub fn book_progress(&self, percents: &HashMap<String, u32>) -> Vec<BookProgress> {
        self.names
            .iter()
            .map(|name| BookProgress {
                name: name.clone(),
                percent: percents.get(name).copied().unwrap_or(0),
            })
            .collect()
    }
}

/// Parse a corpus document into a passage index, normalizing each text.
pub fn parse_corpus(json: &str) -> Result<PassageIndex> {
    let corpus: CorpusFile =
        serde_json::from_str(json).map_err(|e| VersetypeError::Corpus(e.to_string()))?;

    let passages = corpus.verses.into_iter().map(|v| Passage {
        collection: v.book_name,
        ordinal: 0,
        book: v.book,
        chapter: v.chapter,
        verse: v.verse,
        text: normalize(&v.text),
    });
    let index = PassageIndex::from_passages(passages)?;

    info!(
        target: "versetype::corpus",
        "Loaded corpus '{}': {} collections",
        corpus.metadata.name,
        index.len()
    );
    Ok(index)
}

/// Load a corpus file from disk.
pub fn load_corpus(path: &Path) -> Result<PassageIndex> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| VersetypeError::Corpus(format!("{}: {}", path.display(), e)))?;
    parse_corpus(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: &str = r#"{
        "metadata": {"name": "Test Bible", "shortname": "TB"},
        "verses": [
            {"book_name": "Genesis", "book": 1, "chapter": 1, "verse": 1, "text": "¶ In the beginning"},
            {"book_name": "Genesis", "book": 1, "chapter": 1, "verse": 2, "text": "God created"},
            {"book_name": "Exodus", "book": 2, "chapter": 1, "verse": 1, "text": "Now these are the names"}
        ]
    }"#;

    #[test]
    fn test_groups_by_book_in_corpus_order() {
        let index = parse_corpus(CORPUS).unwrap();
        assert_eq!(index.names(), ["Genesis".to_string(), "Exodus".to_string()]);

        let genesis = index.get("Genesis").unwrap();
        assert_eq!(genesis.len(), 2);
        assert_eq!(genesis[1].ordinal, 1);
        assert_eq!(genesis[1].verse, 2);
    }

    #[test]
    fn test_normalizes_text_on_load() {
        let index = parse_corpus(CORPUS).unwrap();
        assert_eq!(index.get("Genesis").unwrap()[0].text, " In the beginning");
    }

    #[test]
    fn test_empty_corpus_is_rejected() {
        let result = parse_corpus(r#"{"metadata": {}, "verses": []}"#);
        assert!(matches!(result, Err(VersetypeError::EmptyCorpus)));
    }

    #[test]
    fn test_malformed_corpus_is_rejected() {
        assert!(matches!(parse_corpus("not json"), Err(VersetypeError::Corpus(_))));
    }

    #[test]
    fn test_missing_file_is_rejected() {
        let result = load_corpus(Path::new("/nonexistent/corpus.json"));
        assert!(matches!(result, Err(VersetypeError::Corpus(_))));
    }

    #[test]
    fn test_book_progress_defaults_to_zero() {
        let index = parse_corpus(CORPUS).unwrap();
        let mut percents = HashMap::new();
        percents.insert("Exodus".to_string(), 100);

        let books = index.book_progress(&percents);
        assert_eq!(books[0].percent, 0);
        assert_eq!(books[1].percent, 100);
    }
}
