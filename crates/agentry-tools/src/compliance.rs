//! Compliance analysis: required-clause checks against a rule set
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Fraction of rules satisfied, 0.0–1.0.
    pub score: f64,
    /// Rules whose keyword never appeared in the document.
    pub missing: Vec<String>,
}

/// Keyword-matching checker. A rule's keyword is the text before its
/// first `:`, lowercased; production deployments swap in semantic
/// matching behind the same shape.
#[derive(Debug, Default)]
pub struct ComplianceChecker;

impl ComplianceChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, content: &str, rules: &[String]) -> ComplianceReport {
        tracing::debug!(rules = rules.len(), "analyzing document for compliance");

        let content_lower = content.to_lowercase();
        let mut missing = Vec::new();
        let mut passed = 0usize;

        for rule in rules {
            let keyword = rule
                .split(':')
                .next()
                .unwrap_or(rule)
                .trim()
                .to_lowercase();
            if content_lower.contains(&keyword) {
                passed += 1;
            } else {
                missing.push(rule.clone());
            }
        }

        let score = if rules.is_empty() {
            1.0
        } else {
            passed as f64 / rules.len() as f64
        };

        ComplianceReport { score, missing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_partial_compliance_lists_missing_rules() {
        let checker = ComplianceChecker::new();
        let report = checker.analyze(
            "Termination with 30 days notice. Jurisdiction: [State].",
            &rules(&["Indemnification", "Termination", "Jurisdiction"]),
        );

        assert!((report.score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.missing, vec!["Indemnification".to_string()]);
    }

    #[test]
    fn test_rule_keyword_is_text_before_colon() {
        let checker = ComplianceChecker::new();
        let report = checker.analyze(
            "The governing law clause applies.",
            &rules(&["Governing law: must name a jurisdiction"]),
        );

        assert_eq!(report.score, 1.0);
        assert!(report.missing.is_empty());
    }

    #[test]
    fn test_empty_rule_set_is_fully_compliant() {
        let checker = ComplianceChecker::new();
        let report = checker.analyze("anything", &[]);
        assert_eq!(report.score, 1.0);
    }
}
