//! Risk scanning: vulnerability detection over a draft
use serde::{Deserialize, Serialize};

/// Classified risk level. Ordered so `High` compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Normalized score where higher is safer.
    pub fn score(self) -> f64 {
        match self {
            RiskLevel::Low => 1.0,
            RiskLevel::Medium => 0.5,
            RiskLevel::High => 0.0,
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub risk_level: RiskLevel,
    pub vulnerabilities: Vec<String>,
    pub score: f64,
}

/// Keyword-based scanner for the clauses whose absence exposes a party.
#[derive(Debug, Default)]
pub struct RiskScanner;

impl RiskScanner {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, content: &str) -> RiskReport {
        tracing::debug!("scanning document for risks");

        let lower = content.to_lowercase();
        let mut vulnerabilities = Vec::new();
        let mut level = RiskLevel::Low;

        if !lower.contains("indemnify") {
            vulnerabilities.push("Missing indemnification clause".to_string());
            level = RiskLevel::Medium;
        }
        if !lower.contains("liability") {
            vulnerabilities.push("Missing limitation of liability".to_string());
            level = RiskLevel::High;
        }
        if !lower.contains("termination") {
            vulnerabilities.push("Missing termination clause".to_string());
            if level != RiskLevel::High {
                level = RiskLevel::Medium;
            }
        }

        RiskReport {
            risk_level: level,
            vulnerabilities,
            score: level.score(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_document_is_low_risk() {
        let scanner = RiskScanner::new();
        let report = scanner.analyze(
            "Each party shall indemnify the other. Limitation of liability applies. \
             Termination with notice.",
        );

        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(report.vulnerabilities.is_empty());
        assert_eq!(report.score, 1.0);
    }

    #[test]
    fn test_missing_liability_is_high_risk() {
        let scanner = RiskScanner::new();
        let report = scanner.analyze("Each party shall indemnify. Termination with notice.");

        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.score, 0.0);
        assert_eq!(
            report.vulnerabilities,
            vec!["Missing limitation of liability".to_string()]
        );
    }

    #[test]
    fn test_missing_indemnity_alone_is_medium_risk() {
        let scanner = RiskScanner::new();
        let report =
            scanner.analyze("Limitation of liability applies. Termination with notice.");

        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert_eq!(report.score, 0.5);
    }

    #[test]
    fn test_high_risk_not_downgraded_by_later_checks() {
        let scanner = RiskScanner::new();
        // Liability missing (High), termination also missing (Medium):
        // the level must stay High.
        let report = scanner.analyze("Each party shall indemnify the other.");
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.vulnerabilities.len(), 2);
    }
}
