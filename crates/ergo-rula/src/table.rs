//! Threshold score tables.

use ergo_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Single `(threshold, score)` entry: angles at or above `threshold`
/// degrees score `score` unless a higher threshold also matches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreStep {
    pub threshold: f64,
    pub score: u32,
}

impl ScoreStep {
    pub const fn new(threshold: f64, score: u32) -> Self {
        Self { threshold, score }
    }
}

/// Step function over joint angles.
///
/// Steps are kept sorted ascending by threshold. Lookup picks the greatest
/// threshold less than or equal to the observed angle and falls back to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreTable {
    steps: Vec<ScoreStep>,
}

impl ScoreTable {
    /// Build a validated table. `name` only labels the error.
    pub fn new(name: &str, steps: Vec<ScoreStep>) -> Result<Self> {
        let table = Self { steps };
        table.validate(name)?;
        Ok(table)
    }

    /// Build from literal pairs known to be well-formed
    pub(crate) fn from_pairs(pairs: &[(f64, u32)]) -> Self {
        Self {
            steps: pairs.iter().map(|&(t, s)| ScoreStep::new(t, s)).collect(),
        }
    }

    pub fn steps(&self) -> &[ScoreStep] {
        &self.steps
    }

    /// Score for an observed angle in degrees
    pub fn lookup(&self, angle: f64) -> u32 {
        self.steps
            .iter()
            .rev()
            .find(|step| angle >= step.threshold)
            .map_or(0, |step| step.score)
    }

    /// Check ordering invariants: finite, strictly ascending thresholds and
    /// non-decreasing scores.
    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: String| Error::InvalidScoreTable {
            region: name.to_string(),
            reason,
        };

        if let Some(step) = self.steps.iter().find(|s| !s.threshold.is_finite()) {
            return Err(invalid(format!("non-finite threshold {}", step.threshold)));
        }

        for pair in self.steps.windows(2) {
            let (lo, hi) = (pair[0], pair[1]);
            if hi.threshold <= lo.threshold {
                return Err(invalid(format!(
                    "thresholds must be distinct and ascending ({} then {})",
                    lo.threshold, hi.threshold
                )));
            }
            if hi.score < lo.score {
                return Err(invalid(format!(
                    "score drops from {} to {} at {} degrees",
                    lo.score, hi.score, hi.threshold
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper_arm() -> ScoreTable {
        ScoreTable::from_pairs(&[(0.0, 1), (20.0, 2), (45.0, 3), (90.0, 4)])
    }

    #[test]
    fn test_lookup_inclusive_lower_bound() {
        let table = upper_arm();
        assert_eq!(table.lookup(90.0), 4);
        assert_eq!(table.lookup(89.999), 3);
        assert_eq!(table.lookup(20.0), 2);
        assert_eq!(table.lookup(179.0), 4);
    }

    #[test]
    fn test_lookup_below_all_thresholds() {
        let table = ScoreTable::from_pairs(&[(20.0, 1), (60.0, 2)]);
        assert_eq!(table.lookup(19.9), 0);
        assert_eq!(table.lookup(f64::NAN), 0);
        assert_eq!(ScoreTable::from_pairs(&[]).lookup(45.0), 0);
    }

    #[test]
    fn test_rejects_unsorted_thresholds() {
        let steps = vec![ScoreStep::new(20.0, 1), ScoreStep::new(10.0, 2)];
        let err = ScoreTable::new("neck", steps).unwrap_err();
        assert!(matches!(err, Error::InvalidScoreTable { .. }));
    }

    #[test]
    fn test_rejects_duplicate_thresholds() {
        let steps = vec![ScoreStep::new(10.0, 1), ScoreStep::new(10.0, 2)];
        assert!(ScoreTable::new("trunk", steps).is_err());
    }

    #[test]
    fn test_rejects_decreasing_scores() {
        let steps = vec![ScoreStep::new(0.0, 3), ScoreStep::new(15.0, 1)];
        assert!(ScoreTable::new("wrist", steps).is_err());
    }

    #[test]
    fn test_rejects_non_finite_threshold() {
        let steps = vec![ScoreStep::new(f64::INFINITY, 1)];
        assert!(ScoreTable::new("legs", steps).is_err());
    }
}
