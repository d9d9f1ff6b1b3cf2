//! Run-level statistics over emitted assessments.

use std::collections::BTreeMap;

use ergo_rula::{ActionLevel, RiskAssessment};
use serde::{Deserialize, Serialize};

/// Score distribution and action-level counts for one pipeline run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub frames_scored: u64,
    pub frames_skipped: u64,
    pub action_counts: BTreeMap<ActionLevel, u64>,
    pub score_histogram: BTreeMap<u32, u64>,
    pub mean_score: f64,
    pub max_score: Option<u32>,
}

impl RunSummary {
    pub fn record(&mut self, assessment: &RiskAssessment) {
        self.frames_scored += 1;
        *self.action_counts.entry(assessment.action).or_default() += 1;
        *self.score_histogram.entry(assessment.score).or_default() += 1;

        // running mean keeps the summary valid after every frame
        let n = self.frames_scored as f64;
        self.mean_score += (f64::from(assessment.score) - self.mean_score) / n;
        self.max_score = self.max_score.max(Some(assessment.score));
    }

    pub fn record_skip(&mut self) {
        self.frames_skipped += 1;
    }

    pub fn count(&self, level: ActionLevel) -> u64 {
        self.action_counts.get(&level).copied().unwrap_or(0)
    }

    /// Most urgent level seen in the run
    pub fn worst_level(&self) -> Option<ActionLevel> {
        self.action_counts.keys().next_back().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assessment(score: u32, action: ActionLevel) -> RiskAssessment {
        RiskAssessment {
            frame_index: 0,
            score,
            action,
            contributions: Vec::new(),
        }
    }

    #[test]
    fn test_counts_and_mean() {
        let mut summary = RunSummary::default();
        summary.record(&assessment(2, ActionLevel::Low));
        summary.record(&assessment(8, ActionLevel::Immediate));
        summary.record(&assessment(2, ActionLevel::Low));
        summary.record_skip();

        assert_eq!(summary.frames_scored, 3);
        assert_eq!(summary.frames_skipped, 1);
        assert_eq!(summary.count(ActionLevel::Low), 2);
        assert_eq!(summary.count(ActionLevel::Monitor), 0);
        assert_eq!(summary.score_histogram.get(&2), Some(&2));
        assert_relative_eq!(summary.mean_score, 4.0, epsilon = 1e-12);
        assert_eq!(summary.max_score, Some(8));
        assert_eq!(summary.worst_level(), Some(ActionLevel::Immediate));
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary::default();
        assert_eq!(summary.max_score, None);
        assert_eq!(summary.worst_level(), None);
        assert_eq!(summary.mean_score, 0.0);
    }

    #[test]
    fn test_serializes_level_keys() {
        let mut summary = RunSummary::default();
        summary.record(&assessment(5, ActionLevel::InvestigateSoon));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["action_counts"]["investigate_soon"], 1);
        assert_eq!(json["score_histogram"]["5"], 1);
    }
}
