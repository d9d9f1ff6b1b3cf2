//! Angle-scored body regions.

use ergo_core::{BodyPoint, Joint, Side};
use serde::{Deserialize, Serialize};

/// Body region scored from a single joint angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    UpperArm,
    LowerArm,
    Wrist,
    Neck,
    Trunk,
    Legs,
}

impl Region {
    pub const ALL: [Region; 6] = [
        Region::UpperArm,
        Region::LowerArm,
        Region::Wrist,
        Region::Neck,
        Region::Trunk,
        Region::Legs,
    ];

    /// Joint triple with the measured vertex in the middle
    pub fn triple(self) -> [BodyPoint; 3] {
        use BodyPoint::*;
        match self {
            Region::UpperArm => [Shoulder, Elbow, Wrist],
            Region::LowerArm => [Elbow, Wrist, Index],
            Region::Wrist => [Wrist, Index, Pinky],
            Region::Neck => [Ear, Shoulder, Hip],
            Region::Trunk => [Shoulder, Hip, Knee],
            Region::Legs => [Hip, Knee, Ankle],
        }
    }

    pub fn joints(self, side: Side) -> [Joint; 3] {
        self.triple().map(|point| side.joint(point))
    }

    pub fn name(self) -> &'static str {
        match self {
            Region::UpperArm => "upper_arm",
            Region::LowerArm => "lower_arm",
            Region::Wrist => "wrist",
            Region::Neck => "neck",
            Region::Trunk => "trunk",
            Region::Legs => "legs",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upper_arm_vertex_is_elbow() {
        assert_eq!(
            Region::UpperArm.joints(Side::Right),
            [Joint::RightShoulder, Joint::RightElbow, Joint::RightWrist]
        );
    }

    #[test]
    fn test_regions_stay_on_one_side() {
        for region in Region::ALL {
            for joint in region.joints(Side::Left) {
                assert!(joint.name().starts_with("Left"), "{region}: {joint}");
            }
        }
    }
}
