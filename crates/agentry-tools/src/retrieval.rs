//! Retrieval store backing the research stage
//!
//! `Retriever` is the boundary the engine-side code programs against; the
//! in-memory store below ranks chunks by lexical token overlap. Embedding
//! backends live behind the same trait.
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::RwLock;
use thiserror::Error;

/// One retrieved chunk with its provenance and relevance.
#[derive(Debug, Clone)]
pub struct Passage {
    pub content: String,
    pub source: String,
    pub relevance: f32,
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("retrieval backend unavailable: {0}")]
    Unavailable(String),
}

pub trait Retriever: Send + Sync {
    /// Top `k` passages for `text`, most relevant first.
    fn query(&self, text: &str, k: usize) -> Result<Vec<Passage>, RetrievalError>;
}

struct StoredDoc {
    content: String,
    source: String,
    tokens: HashSet<String>,
}

/// In-memory document store shared across runs.
#[derive(Default)]
pub struct MemoryStore {
    docs: RwLock<Vec<StoredDoc>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one text chunk under a source identifier.
    pub fn add_document(&self, content: impl Into<String>, source: impl Into<String>) {
        let content = content.into();
        let doc = StoredDoc {
            tokens: tokenize(&content),
            content,
            source: source.into(),
        };
        self.lock_mut().push(doc);
    }

    pub fn add_documents<I>(&self, documents: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (content, source) in documents {
            self.add_document(content, source);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::RwLockReadGuard<'_, Vec<StoredDoc>> {
        self.docs.read().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_mut(&self) -> std::sync::RwLockWriteGuard<'_, Vec<StoredDoc>> {
        self.docs.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Retriever for MemoryStore {
    fn query(&self, text: &str, k: usize) -> Result<Vec<Passage>, RetrievalError> {
        let query_tokens = tokenize(text);
        if query_tokens.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(query = text, k, "querying memory store");

        let docs = self.lock();
        let mut scored: Vec<Passage> = docs
            .iter()
            .filter_map(|doc| {
                let shared = query_tokens.intersection(&doc.tokens).count();
                if shared == 0 {
                    return None;
                }
                Some(Passage {
                    content: doc.content.clone(),
                    source: doc.source.clone(),
                    relevance: shared as f32 / query_tokens.len() as f32,
                })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.add_document(
            "Confidentiality obligations survive termination of the NDA",
            "nda-handbook.txt",
        );
        store.add_document(
            "Service agreements should define indemnification and liability caps",
            "contracts-guide.txt",
        );
        store.add_document("Completely unrelated cooking recipe", "recipes.txt");
        store
    }

    #[test]
    fn test_query_ranks_by_overlap() {
        let store = seeded_store();
        let results = store.query("termination obligations in an NDA", 3).unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].source, "nda-handbook.txt");
        for pair in results.windows(2) {
            assert!(pair[0].relevance >= pair[1].relevance);
        }
    }

    #[test]
    fn test_query_drops_unrelated_documents() {
        let store = seeded_store();
        let results = store.query("indemnification liability", 5).unwrap();

        assert!(results.iter().all(|p| p.source != "recipes.txt"));
    }

    #[test]
    fn test_query_respects_k() {
        let store = seeded_store();
        let results = store.query("the agreement termination liability nda", 1).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_empty_store_returns_no_passages() {
        let store = MemoryStore::new();
        assert!(store.query("anything", 3).unwrap().is_empty());
        assert!(store.is_empty());
    }
}
