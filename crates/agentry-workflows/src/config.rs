//! Tunable configuration for the legal workflow
use agentry_tools::ScoreWeights;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalConfig {
    /// Overall score at or above which a draft is accepted (the boundary
    /// is inclusive on the accept side).
    pub accept_threshold: f64,

    /// Hard ceiling on stage invocations per run.
    pub max_steps: u32,

    /// Weights used for the overall score.
    pub weights: ScoreWeights,

    /// Clauses every drafted document must carry. The text before a
    /// rule's first `:` is the keyword the compliance checker looks for.
    pub compliance_rules: Vec<String>,
}

impl Default for LegalConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.7,
            max_steps: 50,
            weights: ScoreWeights::default(),
            compliance_rules: vec![
                "Indemnification".to_string(),
                "Termination".to_string(),
                "Jurisdiction".to_string(),
            ],
        }
    }
}

impl LegalConfig {
    /// Load configuration from YAML; absent keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, String> {
        serde_yaml::from_str(yaml).map_err(|e| e.to_string())
    }
}
