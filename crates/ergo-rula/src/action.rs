//! Action-level classification of aggregate risk scores.

use ergo_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Recommended action, ordered from lowest to highest urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionLevel {
    Low,
    Monitor,
    InvestigateSoon,
    Immediate,
}

impl ActionLevel {
    pub const ALL: [ActionLevel; 4] = [
        ActionLevel::Low,
        ActionLevel::Monitor,
        ActionLevel::InvestigateSoon,
        ActionLevel::Immediate,
    ];

    /// Human-readable label written to result records
    pub fn label(self) -> &'static str {
        match self {
            ActionLevel::Low => "Low risk – maintain current practices",
            ActionLevel::Monitor => "Monitor and review",
            ActionLevel::InvestigateSoon => "Further investigation and change soon",
            ActionLevel::Immediate => "Immediate action required",
        }
    }
}

impl std::fmt::Display for ActionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Scores at or above `min_score` map to `level`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_score: f64,
    pub level: ActionLevel,
}

impl Breakpoint {
    pub const fn new(min_score: f64, level: ActionLevel) -> Self {
        Self { min_score, level }
    }
}

/// Calibrated breakpoints, highest first
pub fn calibrated_breakpoints() -> Vec<Breakpoint> {
    vec![
        Breakpoint::new(7.0, ActionLevel::Immediate),
        Breakpoint::new(5.0, ActionLevel::InvestigateSoon),
        Breakpoint::new(3.0, ActionLevel::Monitor),
        Breakpoint::new(0.0, ActionLevel::Low),
    ]
}

/// First-match-wins classifier over descending breakpoints.
///
/// Construction guarantees the breakpoints partition `[0, inf)`: strictly
/// descending, each level used once, the last one anchored at 0.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionClassifier {
    breakpoints: Vec<Breakpoint>,
}

impl ActionClassifier {
    pub fn new(breakpoints: Vec<Breakpoint>) -> Result<Self> {
        validate_breakpoints(&breakpoints)?;
        Ok(Self { breakpoints })
    }

    pub fn calibrated() -> Self {
        Self {
            breakpoints: calibrated_breakpoints(),
        }
    }

    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Classify a score. Negative and NaN scores are treated as 0.
    pub fn classify(&self, score: f64) -> ActionLevel {
        let score = if score > 0.0 { score } else { 0.0 };
        self.breakpoints
            .iter()
            .find(|bp| score >= bp.min_score)
            .or(self.breakpoints.last())
            .map_or(ActionLevel::Low, |bp| bp.level)
    }
}

impl Default for ActionClassifier {
    fn default() -> Self {
        Self::calibrated()
    }
}

pub fn validate_breakpoints(breakpoints: &[Breakpoint]) -> Result<()> {
    let Some(last) = breakpoints.last() else {
        return Err(Error::InvalidBreakpoints("no breakpoints defined".to_string()));
    };

    if let Some(bp) = breakpoints
        .iter()
        .find(|bp| !bp.min_score.is_finite() || bp.min_score < 0.0)
    {
        return Err(Error::InvalidBreakpoints(format!(
            "breakpoint {} for '{}' must be finite and non-negative",
            bp.min_score, bp.level
        )));
    }

    if last.min_score != 0.0 {
        return Err(Error::InvalidBreakpoints(format!(
            "lowest breakpoint must be 0 to cover every score, found {}",
            last.min_score
        )));
    }

    for pair in breakpoints.windows(2) {
        if pair[1].min_score >= pair[0].min_score {
            return Err(Error::InvalidBreakpoints(format!(
                "breakpoints must be strictly descending ({} then {})",
                pair[0].min_score, pair[1].min_score
            )));
        }
    }

    for (i, bp) in breakpoints.iter().enumerate() {
        if breakpoints[..i].iter().any(|other| other.level == bp.level) {
            return Err(Error::InvalidBreakpoints(format!(
                "level '{}' appears more than once",
                bp.level
            )));
        }
    }

    Ok(())
}
