//! Per-frame risk scoring.

use ergo_core::{angle, PoseFrame, Result, Side};
use serde::{Deserialize, Serialize};

use crate::action::{ActionClassifier, ActionLevel};
use crate::profile::ScoringProfile;
use crate::region::Region;
use crate::rules::{posture_rules, PostureKind, PostureRule};

/// What produced a contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ContributionSource {
    Region(Region),
    Rule(PostureKind),
}

impl std::fmt::Display for ContributionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContributionSource::Region(r) => write!(f, "region:{r}"),
            ContributionSource::Rule(k) => write!(f, "rule:{k}"),
        }
    }
}

/// Single non-zero term of an aggregate score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub source: ContributionSource,
    /// `None` for rules evaluated over both sides at once
    pub side: Option<Side>,
    pub score: u32,
    /// Measured angle for region contributions
    pub angle: Option<f64>,
}

/// Per-frame output of the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub frame_index: u64,
    pub score: u32,
    pub action: ActionLevel,
    pub contributions: Vec<Contribution>,
}

impl RiskAssessment {
    /// Sum of contributions from one source across both sides
    pub fn contribution_of(&self, source: ContributionSource) -> u32 {
        self.contributions
            .iter()
            .filter(|c| c.source == source)
            .map(|c| c.score)
            .sum()
    }
}

type TraceHook = Box<dyn Fn(u64, &Contribution) + Send + Sync>;

/// Scores frames against a [`ScoringProfile`] and classifies the result
pub struct RiskScorer {
    profile: ScoringProfile,
    classifier: ActionClassifier,
    rules: &'static [PostureRule],
    trace: Option<TraceHook>,
}

impl RiskScorer {
    /// Validate `profile` and build a scorer around it
    pub fn new(profile: ScoringProfile) -> Result<Self> {
        profile.validate()?;
        let classifier = ActionClassifier::new(profile.breakpoints.clone())?;
        Ok(Self {
            profile,
            classifier,
            rules: posture_rules(),
            trace: None,
        })
    }

    /// Scorer using the process-wide calibrated profile
    pub fn calibrated() -> Self {
        Self {
            profile: ScoringProfile::calibrated().clone(),
            classifier: ActionClassifier::calibrated(),
            rules: posture_rules(),
            trace: None,
        }
    }

    /// Register a callback receiving every non-zero contribution.
    /// The hook observes scoring only; it cannot change the result.
    pub fn with_trace<F>(mut self, hook: F) -> Self
    where
        F: Fn(u64, &Contribution) + Send + Sync + 'static,
    {
        self.trace = Some(Box::new(hook));
        self
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    pub fn classifier(&self) -> &ActionClassifier {
        &self.classifier
    }

    /// Score contribution of a single region on one side
    pub fn region_score(
        &self,
        frame: &PoseFrame,
        region: Region,
        side: Side,
    ) -> Option<(f64, u32)> {
        let [a, vertex, c] = region.joints(side).map(|j| frame.get(j));
        if a.is_none() || vertex.is_none() || c.is_none() {
            return None;
        }

        let degrees = angle(a, vertex, c);
        Some((degrees, self.profile.table(region).lookup(degrees)))
    }

    /// Every non-zero contribution for `frame`, regions first, then rules
    pub fn contributions(&self, frame: &PoseFrame) -> Vec<Contribution> {
        let mut out = Vec::new();

        for side in Side::BOTH {
            for region in Region::ALL {
                if let Some((degrees, score)) = self.region_score(frame, region, side) {
                    if score > 0 {
                        out.push(Contribution {
                            source: ContributionSource::Region(region),
                            side: Some(side),
                            score,
                            angle: Some(degrees),
                        });
                    }
                }
            }
        }

        for rule in self.rules {
            for &side in rule.passes() {
                let score = rule.evaluate(frame, side, &self.profile);
                if score > 0 {
                    out.push(Contribution {
                        source: ContributionSource::Rule(rule.kind),
                        side,
                        score,
                        angle: None,
                    });
                }
            }
        }

        out
    }

    /// Aggregate risk score for `frame`
    pub fn score(&self, frame: &PoseFrame) -> u32 {
        self.contributions(frame).iter().map(|c| c.score).sum()
    }

    /// Score and classify a frame
    pub fn assess(&self, frame: &PoseFrame) -> RiskAssessment {
        let contributions = self.contributions(frame);
        let score: u32 = contributions.iter().map(|c| c.score).sum();
        let action = self.classifier.classify(f64::from(score));

        for c in &contributions {
            tracing::trace!(
                frame = frame.index(),
                source = %c.source,
                side = ?c.side,
                score = c.score,
                "risk contribution"
            );
            if let Some(hook) = &self.trace {
                hook(frame.index(), c);
            }
        }

        RiskAssessment {
            frame_index: frame.index(),
            score,
            action,
            contributions,
        }
    }
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::calibrated()
    }
}

impl std::fmt::Debug for RiskScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskScorer")
            .field("profile", &self.profile)
            .field("classifier", &self.classifier)
            .field("rules", &self.rules.len())
            .field("trace", &self.trace.is_some())
            .finish()
    }
}
