//! Scoring calibration: region tables, rule thresholds and breakpoints.

use std::sync::LazyLock;

use ergo_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::action::{calibrated_breakpoints, validate_breakpoints, Breakpoint};
use crate::region::Region;
use crate::table::ScoreTable;

static CALIBRATED: LazyLock<ScoringProfile> = LazyLock::new(ScoringProfile::default);

/// Complete scoring calibration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringProfile {
    pub upper_arm: ScoreTable,
    pub lower_arm: ScoreTable,
    pub wrist: ScoreTable,
    pub neck: ScoreTable,
    pub trunk: ScoreTable,
    pub legs: ScoreTable,

    /// Wrist-pinky-elbow angle above which ulnar deviation is flagged (degrees)
    pub ulnar_deviation_deg: f64,

    /// Shoulder-to-elbow horizontal distance above which the arm counts as
    /// abducted (landmark units, normalized image width for detector output)
    pub abduction_distance: f64,

    /// Action-level breakpoints, highest first
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            upper_arm: ScoreTable::from_pairs(&[(0.0, 1), (20.0, 2), (45.0, 3), (90.0, 4)]),
            lower_arm: ScoreTable::from_pairs(&[(20.0, 1), (60.0, 2)]),
            wrist: ScoreTable::from_pairs(&[(0.0, 1), (15.0, 3)]),
            neck: ScoreTable::from_pairs(&[(0.0, 1), (10.0, 2), (20.0, 3)]),
            trunk: ScoreTable::from_pairs(&[(0.0, 1), (10.0, 2), (20.0, 3)]),
            legs: ScoreTable::from_pairs(&[(0.0, 1), (60.0, 2)]),
            ulnar_deviation_deg: 20.0,
            abduction_distance: 0.1,
            breakpoints: calibrated_breakpoints(),
        }
    }
}

impl ScoringProfile {
    /// Process-wide calibrated profile, built once on first use
    pub fn calibrated() -> &'static ScoringProfile {
        &CALIBRATED
    }

    pub fn table(&self, region: Region) -> &ScoreTable {
        match region {
            Region::UpperArm => &self.upper_arm,
            Region::LowerArm => &self.lower_arm,
            Region::Wrist => &self.wrist,
            Region::Neck => &self.neck,
            Region::Trunk => &self.trunk,
            Region::Legs => &self.legs,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for region in Region::ALL {
            self.table(region).validate(region.name())?;
        }

        if !(0.0..=180.0).contains(&self.ulnar_deviation_deg) {
            return Err(Error::Config(format!(
                "ulnar_deviation_deg must lie in [0, 180], got {}",
                self.ulnar_deviation_deg
            )));
        }
        if !self.abduction_distance.is_finite() || self.abduction_distance < 0.0 {
            return Err(Error::Config(format!(
                "abduction_distance must be non-negative, got {}",
                self.abduction_distance
            )));
        }

        validate_breakpoints(&self.breakpoints)
    }
}
