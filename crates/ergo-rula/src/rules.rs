//! Posture rule registry.
//!
//! Each rule is a predicate over a handful of landmarks plus a fixed score
//! delta. Rules are only evaluated when every landmark they name is present.

use ergo_core::{angle, horizontal_distance, BodyPoint, Joint, Landmark, PoseFrame, Side};
use serde::{Deserialize, Serialize};

use crate::profile::ScoringProfile;

/// Identifies a posture rule in contributions and traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureKind {
    UlnarDeviation,
    ShoulderElevation,
    ArmAbduction,
    ArmSupported,
    BilateralSupport,
    UnsupportedStance,
}

impl PostureKind {
    pub fn name(self) -> &'static str {
        match self {
            PostureKind::UlnarDeviation => "ulnar_deviation",
            PostureKind::ShoulderElevation => "shoulder_elevation",
            PostureKind::ArmAbduction => "arm_abduction",
            PostureKind::ArmSupported => "arm_supported",
            PostureKind::BilateralSupport => "bilateral_support",
            PostureKind::UnsupportedStance => "unsupported_stance",
        }
    }
}

impl std::fmt::Display for PostureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a rule runs once per body side or once over both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    PerSide,
    Bilateral,
}

/// Predicate receives landmarks in the order returned by
/// [`PostureRule::joints`].
pub type RulePredicate = fn(&[&Landmark], &ScoringProfile) -> bool;

pub struct PostureRule {
    pub kind: PostureKind,
    pub scope: RuleScope,
    pub points: &'static [BodyPoint],
    pub delta: u32,
    pub predicate: RulePredicate,
}

impl PostureRule {
    /// Sides the rule is evaluated for; `None` means the bilateral pass
    pub fn passes(&self) -> &'static [Option<Side>] {
        match self.scope {
            RuleScope::PerSide => &[Some(Side::Left), Some(Side::Right)],
            RuleScope::Bilateral => &[None],
        }
    }

    /// Concrete joints for one pass. Bilateral rules list the left side's
    /// points first, then the right side's.
    pub fn joints(&self, side: Option<Side>) -> Vec<Joint> {
        match side {
            Some(side) => self.points.iter().map(|p| side.joint(*p)).collect(),
            None => Side::BOTH
                .iter()
                .flat_map(|side| self.points.iter().map(move |p| side.joint(*p)))
                .collect(),
        }
    }

    /// Delta when the rule fires, 0 otherwise or when a joint is absent
    pub fn evaluate(&self, frame: &PoseFrame, side: Option<Side>, profile: &ScoringProfile) -> u32 {
        let landmarks: Option<Vec<&Landmark>> =
            self.joints(side).into_iter().map(|j| frame.get(j)).collect();

        match landmarks {
            Some(lms) if (self.predicate)(&lms, profile) => self.delta,
            _ => 0,
        }
    }
}

impl std::fmt::Debug for PostureRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostureRule")
            .field("kind", &self.kind)
            .field("scope", &self.scope)
            .field("points", &self.points)
            .field("delta", &self.delta)
            .finish()
    }
}

static RULES: [PostureRule; 6] = [
    PostureRule {
        kind: PostureKind::UlnarDeviation,
        scope: RuleScope::PerSide,
        points: &[BodyPoint::Wrist, BodyPoint::Pinky, BodyPoint::Elbow],
        delta: 1,
        predicate: ulnar_deviation,
    },
    PostureRule {
        kind: PostureKind::ShoulderElevation,
        scope: RuleScope::PerSide,
        points: &[BodyPoint::Shoulder, BodyPoint::Hip],
        delta: 1,
        predicate: shoulder_elevated,
    },
    PostureRule {
        kind: PostureKind::ArmAbduction,
        scope: RuleScope::PerSide,
        points: &[BodyPoint::Shoulder, BodyPoint::Elbow],
        delta: 1,
        predicate: arm_abducted,
    },
    PostureRule {
        kind: PostureKind::ArmSupported,
        scope: RuleScope::PerSide,
        points: &[BodyPoint::Elbow, BodyPoint::Shoulder],
        delta: 1,
        predicate: arm_supported,
    },
    PostureRule {
        kind: PostureKind::BilateralSupport,
        scope: RuleScope::Bilateral,
        points: &[BodyPoint::FootIndex, BodyPoint::Hip],
        delta: 1,
        predicate: both_feet_supported,
    },
    PostureRule {
        kind: PostureKind::UnsupportedStance,
        scope: RuleScope::Bilateral,
        points: &[BodyPoint::FootIndex, BodyPoint::Hip],
        delta: 2,
        predicate: stance_unsupported,
    },
];

/// All registered posture rules in evaluation order
pub fn posture_rules() -> &'static [PostureRule] {
    &RULES
}

fn ulnar_deviation(lms: &[&Landmark], profile: &ScoringProfile) -> bool {
    let [wrist, pinky, elbow] = lms else {
        return false;
    };
    angle(Some(*wrist), Some(*pinky), Some(*elbow)) > profile.ulnar_deviation_deg
}

// Image coordinates: smaller y is higher up.
fn shoulder_elevated(lms: &[&Landmark], _: &ScoringProfile) -> bool {
    let [shoulder, hip] = lms else {
        return false;
    };
    shoulder.y < hip.y
}

fn arm_abducted(lms: &[&Landmark], profile: &ScoringProfile) -> bool {
    let [shoulder, elbow] = lms else {
        return false;
    };
    horizontal_distance(shoulder, elbow) > profile.abduction_distance
}

fn arm_supported(lms: &[&Landmark], _: &ScoringProfile) -> bool {
    let [elbow, shoulder] = lms else {
        return false;
    };
    elbow.y >= shoulder.y
}

fn feet_below_hips(lms: &[&Landmark]) -> Option<bool> {
    let [left_foot, left_hip, right_foot, right_hip] = lms else {
        return None;
    };
    Some(left_foot.y > left_hip.y && right_foot.y > right_hip.y)
}

fn both_feet_supported(lms: &[&Landmark], _: &ScoringProfile) -> bool {
    feet_below_hips(lms) == Some(true)
}

fn stance_unsupported(lms: &[&Landmark], _: &ScoringProfile) -> bool {
    feet_below_hips(lms) == Some(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(kind: PostureKind) -> &'static PostureRule {
        posture_rules().iter().find(|r| r.kind == kind).unwrap()
    }

    fn standing(left_foot_y: f64, right_foot_y: f64) -> PoseFrame {
        PoseFrame::builder(0)
            .point(Joint::LeftHip, 0.45, 0.5)
            .point(Joint::RightHip, 0.55, 0.5)
            .point(Joint::LeftFootIndex, 0.45, left_foot_y)
            .point(Joint::RightFootIndex, 0.55, right_foot_y)
            .build()
    }

    #[test]
    fn test_registry_has_unique_kinds() {
        let rules = posture_rules();
        for (i, r) in rules.iter().enumerate() {
            assert!(rules[i + 1..].iter().all(|o| o.kind != r.kind));
        }
    }

    #[test]
    fn test_ulnar_deviation_threshold() {
        let profile = ScoringProfile::default();
        let bent = PoseFrame::builder(0)
            .point(Joint::RightElbow, 0.0, 0.0)
            .point(Joint::RightPinky, 1.0, 0.0)
            .point(Joint::RightWrist, 1.0, 1.0)
            .build();
        assert_eq!(rule(PostureKind::UlnarDeviation).evaluate(&bent, Some(Side::Right), &profile), 1);
        assert_eq!(rule(PostureKind::UlnarDeviation).evaluate(&bent, Some(Side::Left), &profile), 0);
    }

    #[test]
    fn test_leg_support_is_exclusive() {
        let profile = ScoringProfile::default();
        let supported = standing(0.9, 0.9);
        let lifted = standing(0.9, 0.4);

        let both = rule(PostureKind::BilateralSupport);
        let unsupported = rule(PostureKind::UnsupportedStance);

        assert_eq!(both.evaluate(&supported, None, &profile), 1);
        assert_eq!(unsupported.evaluate(&supported, None, &profile), 0);
        assert_eq!(both.evaluate(&lifted, None, &profile), 0);
        assert_eq!(unsupported.evaluate(&lifted, None, &profile), 2);
    }

    #[test]
    fn test_leg_support_needs_all_four_joints() {
        let profile = ScoringProfile::default();
        let frame = standing(0.9, 0.9).without(Joint::RightHip);
        for kind in [PostureKind::BilateralSupport, PostureKind::UnsupportedStance] {
            assert_eq!(rule(kind).evaluate(&frame, None, &profile), 0);
        }
    }

    #[test]
    fn test_arm_abduction_and_support() {
        let profile = ScoringProfile::default();
        let frame = PoseFrame::builder(0)
            .point(Joint::LeftShoulder, 0.40, 0.30)
            .point(Joint::LeftElbow, 0.25, 0.30)
            .build();

        assert_eq!(rule(PostureKind::ArmAbduction).evaluate(&frame, Some(Side::Left), &profile), 1);
        // elbow level with the shoulder counts as supported
        assert_eq!(rule(PostureKind::ArmSupported).evaluate(&frame, Some(Side::Left), &profile), 1);

        let raised = PoseFrame::builder(0)
            .point(Joint::LeftShoulder, 0.40, 0.30)
            .point(Joint::LeftElbow, 0.45, 0.20)
            .build();
        assert_eq!(rule(PostureKind::ArmAbduction).evaluate(&raised, Some(Side::Left), &profile), 0);
        assert_eq!(rule(PostureKind::ArmSupported).evaluate(&raised, Some(Side::Left), &profile), 0);
    }

    #[test]
    fn test_shoulder_elevation() {
        let profile = ScoringProfile::default();
        let frame = PoseFrame::builder(0)
            .point(Joint::RightShoulder, 0.5, 0.3)
            .point(Joint::RightHip, 0.5, 0.6)
            .build();
        assert_eq!(rule(PostureKind::ShoulderElevation).evaluate(&frame, Some(Side::Right), &profile), 1);
    }

    #[test]
    fn test_bilateral_joint_order() {
        assert_eq!(
            rule(PostureKind::BilateralSupport).joints(None),
            vec![
                Joint::LeftFootIndex,
                Joint::LeftHip,
                Joint::RightFootIndex,
                Joint::RightHip
            ]
        );
    }
}
