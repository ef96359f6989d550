//! Citation attachment: ground the final document in its sources
use crate::research::{CaseFinding, StatuteFinding};

/// Marker line opening the citations section of a finished document.
pub const CITATIONS_HEADER: &str = "--- CITATIONS ---";

#[derive(Debug, Default)]
pub struct CitationEngine;

impl CitationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Append a numbered source list to `content`. Inline semantic
    /// anchoring is a backend concern; this keeps the deliverable
    /// self-describing either way.
    pub fn attach(
        &self,
        content: &str,
        cases: &[CaseFinding],
        statutes: &[StatuteFinding],
    ) -> String {
        tracing::debug!(
            cases = cases.len(),
            statutes = statutes.len(),
            "attaching citations"
        );

        let mut cited = format!("{content}\n\n{CITATIONS_HEADER}\n");

        if cases.is_empty() && statutes.is_empty() {
            cited.push_str("No sources cited.");
            return cited;
        }

        let mut index = 1usize;
        for case in cases {
            cited.push_str(&format!("[{index}] {}, {}\n", case.case_name, case.citation));
            index += 1;
        }
        for statute in statutes {
            cited.push_str(&format!("[{index}] {}\n", statute.statute_name));
            index += 1;
        }
        cited
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str) -> CaseFinding {
        CaseFinding {
            case_name: name.to_string(),
            citation: "Ingested Document".to_string(),
            summary: String::new(),
            relevance_score: 1.0,
        }
    }

    fn statute(name: &str) -> StatuteFinding {
        StatuteFinding {
            statute_name: name.to_string(),
            text: String::new(),
            relevance_score: 1.0,
        }
    }

    #[test]
    fn test_sources_are_numbered_continuously() {
        let engine = CitationEngine::new();
        let cited = engine.attach(
            "DOC",
            &[case("nda-cases.txt")],
            &[statute("ucc-article-2.txt")],
        );

        assert!(cited.contains(CITATIONS_HEADER));
        assert!(cited.contains("[1] nda-cases.txt, Ingested Document"));
        assert!(cited.contains("[2] ucc-article-2.txt"));
    }

    #[test]
    fn test_no_sources_still_appends_section() {
        let engine = CitationEngine::new();
        let cited = engine.attach("DOC", &[], &[]);

        assert!(cited.contains(CITATIONS_HEADER));
        assert!(cited.ends_with("No sources cited."));
    }
}
