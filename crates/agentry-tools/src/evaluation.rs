//! Weighted quality evaluation across the collected metrics
use serde::{Deserialize, Serialize};

/// Weights for the overall score. They should sum to 1.0; the evaluator
/// does not renormalize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub compliance: f64,
    pub risk: f64,
    pub clarity: f64,
    pub completeness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            compliance: 0.4,
            risk: 0.3,
            clarity: 0.15,
            completeness: 0.15,
        }
    }
}

/// Until dedicated scorers exist, clarity and completeness are assumed
/// reasonable rather than measured.
const ASSUMED_CLARITY: f64 = 0.8;
const ASSUMED_COMPLETENESS: f64 = 0.8;

#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    weights: ScoreWeights,
}

impl Evaluator {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Weighted overall score from the two measured dimensions, rounded
    /// to two decimals.
    pub fn evaluate(&self, compliance: f64, risk: f64) -> f64 {
        self.evaluate_full(compliance, risk, ASSUMED_CLARITY, ASSUMED_COMPLETENESS)
    }

    pub fn evaluate_full(
        &self,
        compliance: f64,
        risk: f64,
        clarity: f64,
        completeness: f64,
    ) -> f64 {
        let overall = self.weights.compliance * compliance
            + self.weights.risk * risk
            + self.weights.clarity * clarity
            + self.weights.completeness * completeness;
        round2(overall)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
