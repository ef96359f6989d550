//! Legal research over the retrieval store
//!
//! Turns a research query into a structured context of case law and
//! statute findings plus a prose summary. A failing or empty store
//! degrades to a placeholder finding rather than an error.
use crate::retrieval::Retriever;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SUMMARY_EXCERPT_CHARS: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseFinding {
    pub case_name: String,
    pub citation: String,
    pub summary: String,
    pub relevance_score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatuteFinding {
    pub statute_name: String,
    pub text: String,
    pub relevance_score: f32,
}

/// Structured research output written into the run state's `context`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchContext {
    pub query: String,
    pub cases: Vec<CaseFinding>,
    pub statutes: Vec<StatuteFinding>,
    pub summary: String,
}

pub struct Researcher {
    store: Arc<dyn Retriever>,
}

impl Researcher {
    pub fn new(store: Arc<dyn Retriever>) -> Self {
        Self { store }
    }

    pub fn search_case_law(&self, query: &str) -> Vec<CaseFinding> {
        match self.store.query(query, 3) {
            Ok(passages) if !passages.is_empty() => passages
                .into_iter()
                .map(|p| CaseFinding {
                    case_name: p.source,
                    citation: "Ingested Document".to_string(),
                    summary: p.content,
                    relevance_score: p.relevance,
                })
                .collect(),
            Ok(_) => vec![placeholder_case()],
            Err(e) => {
                tracing::warn!(error = %e, "case law retrieval failed, using placeholder");
                vec![placeholder_case()]
            }
        }
    }

    pub fn retrieve_statutes(&self, query: &str) -> Vec<StatuteFinding> {
        let widened = format!("{query} statute rule law");
        match self.store.query(&widened, 2) {
            Ok(passages) => passages
                .into_iter()
                .map(|p| StatuteFinding {
                    statute_name: p.source,
                    text: p.content,
                    relevance_score: p.relevance,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "statute retrieval failed");
                Vec::new()
            }
        }
    }

    /// Summarize findings into a coherent context string.
    pub fn summarize(&self, cases: &[CaseFinding], statutes: &[StatuteFinding]) -> String {
        let mut summary = String::from("Legal Research Summary:\n\n");
        for case in cases {
            summary.push_str(&format!(
                "- Source: {}\n  Content: {}\n",
                case.case_name,
                excerpt(&case.summary)
            ));
        }
        for statute in statutes {
            summary.push_str(&format!(
                "- Source: {}\n  Text: {}\n",
                statute.statute_name,
                excerpt(&statute.text)
            ));
        }
        summary
    }

    /// Run the full research pass for one query.
    pub fn structured_context(&self, query: &str) -> ResearchContext {
        let cases = self.search_case_law(query);
        let statutes = self.retrieve_statutes(query);
        let summary = self.summarize(&cases, &statutes);
        ResearchContext {
            query: query.to_string(),
            cases,
            statutes,
            summary,
        }
    }
}

fn placeholder_case() -> CaseFinding {
    CaseFinding {
        case_name: "Placeholder v. Example".to_string(),
        citation: "No. 000-0000".to_string(),
        summary: "Retrieval store unavailable; placeholder precedent.".to_string(),
        relevance_score: 0.0,
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= SUMMARY_EXCERPT_CHARS {
        return text.to_string();
    }
    let mut kept: String = text.chars().take(SUMMARY_EXCERPT_CHARS).collect();
    kept.push_str("...");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{MemoryStore, Passage, RetrievalError};

    struct BrokenStore;

    impl Retriever for BrokenStore {
        fn query(&self, _text: &str, _k: usize) -> Result<Vec<Passage>, RetrievalError> {
            Err(RetrievalError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_structured_context_from_store() {
        let store = MemoryStore::new();
        store.add_document(
            "Precedents for NDA confidentiality and termination clauses",
            "nda-cases.txt",
        );
        let researcher = Researcher::new(Arc::new(store));

        let context = researcher.structured_context("precedents for NDA");
        assert_eq!(context.query, "precedents for NDA");
        assert_eq!(context.cases[0].case_name, "nda-cases.txt");
        assert!(context.summary.contains("nda-cases.txt"));
    }

    #[test]
    fn test_broken_store_degrades_to_placeholder() {
        let researcher = Researcher::new(Arc::new(BrokenStore));

        let context = researcher.structured_context("precedents for contract");
        assert_eq!(context.cases.len(), 1);
        assert_eq!(context.cases[0].relevance_score, 0.0);
        assert!(context.statutes.is_empty());
    }

    #[test]
    fn test_summary_excerpts_long_findings() {
        let store = MemoryStore::new();
        store.add_document(format!("nda {}", "clause ".repeat(200)), "long.txt");
        let researcher = Researcher::new(Arc::new(store));

        let context = researcher.structured_context("nda");
        assert!(context.summary.contains("..."));
    }
}
