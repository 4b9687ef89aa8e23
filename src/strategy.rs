use crate::SolverError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the lookahead evaluator trades average guess count against the worst
/// case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyMode {
    /// Minimize the average guess count.
    Aggressive,
    /// Minimize the worst case.
    Safe,
    #[default]
    Balanced,
}

impl StrategyMode {
    pub const ALL: [StrategyMode; 3] = [
        StrategyMode::Aggressive,
        StrategyMode::Safe,
        StrategyMode::Balanced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StrategyMode::Aggressive => "aggressive",
            StrategyMode::Safe => "safe",
            StrategyMode::Balanced => "balanced",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StrategyMode::Aggressive => "Minimize average guess count (risk worst-case)",
            StrategyMode::Safe => "Minimize worst-case scenarios (conservative)",
            StrategyMode::Balanced => "Balance average and worst-case (recommended)",
        }
    }

    /// Collapses per-outcome `(probability, score)` pairs into one expected
    /// score. Lower is better.
    pub fn weigh(self, outcomes: &[(f64, f64)]) -> f64 {
        if outcomes.is_empty() {
            return 0.0;
        }
        let average: f64 = outcomes.iter().map(|(prob, score)| prob * score).sum();
        let worst = outcomes
            .iter()
            .map(|(_, score)| *score)
            .fold(f64::NEG_INFINITY, f64::max);
        match self {
            StrategyMode::Aggressive => average,
            StrategyMode::Safe => 0.3 * average + 0.7 * worst,
            StrategyMode::Balanced => 0.6 * average + 0.4 * worst,
        }
    }
}

impl fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyMode {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        StrategyMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == lowered)
            .ok_or_else(|| SolverError::InvalidStrategy {
                mode: s.to_string(),
            })
    }
}
