//! Normalization of detector output and tabular rows into canonical frames.
//!
//! Missing or unparseable coordinates never fail a frame: the affected joint
//! is simply marked absent.

use std::sync::Arc;

use csv::StringRecord;
use ergo_core::{Joint, Landmark, PoseFrame};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Adapter settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Detector landmarks with a confidence below this are treated as absent
    pub min_confidence: f32,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self { min_confidence: 0.0 }
    }
}

fn full_confidence() -> f32 {
    1.0
}

/// Single landmark reported by an external pose detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedLandmark {
    /// Native landmark index (BlazePose ordering)
    pub index: usize,
    pub x: f64,
    pub y: f64,
    /// Depth is optional; an unreadable value is dropped, not the landmark
    #[serde(default, deserialize_with = "lenient_depth")]
    pub z: Option<f64>,
    #[serde(default = "full_confidence", alias = "confidence")]
    pub visibility: f32,
}

fn lenient_depth<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().filter(|z| z.is_finite()))
}

/// Per-frame output of an external pose detector.
///
/// Landmark entries are decoded one by one: an entry with a missing or
/// non-numeric coordinate is dropped, so its joint reads as absent while the
/// rest of the frame is kept. Only a missing or non-array `landmarks` field
/// fails the frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorFrame {
    #[serde(deserialize_with = "readable_landmarks")]
    pub landmarks: Vec<DetectedLandmark>,
}

fn readable_landmarks<'de, D>(deserializer: D) -> Result<Vec<DetectedLandmark>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries = Vec::<Value>::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match DetectedLandmark::deserialize(entry) {
            Ok(landmark) => Some(landmark),
            Err(e) => {
                tracing::debug!(error = %e, "dropping unreadable landmark");
                None
            }
        })
        .collect())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AxisColumns {
    x: Option<usize>,
    y: Option<usize>,
    z: Option<usize>,
}

/// Column positions of every joint found in a tabular header.
///
/// Resolved once per file so rows are read by position.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularLayout {
    columns: [AxisColumns; Joint::COUNT],
}

impl TabularLayout {
    /// Map `<JointName>.x|y|z` headers to joints. Unknown columns are ignored.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut columns = [AxisColumns::default(); Joint::COUNT];

        for (pos, header) in headers.into_iter().enumerate() {
            let header = header.as_ref().trim();
            let Some((stem, axis)) = header.rsplit_once('.') else {
                tracing::debug!(column = header, "ignoring non-landmark column");
                continue;
            };
            let Some(joint) = Joint::from_name(stem) else {
                tracing::debug!(column = header, "ignoring unknown joint column");
                continue;
            };

            let slot = &mut columns[joint.index()];
            let target = match axis.to_ascii_lowercase().as_str() {
                "x" => &mut slot.x,
                "y" => &mut slot.y,
                "z" => &mut slot.z,
                _ => {
                    tracing::debug!(column = header, "ignoring unknown axis column");
                    continue;
                }
            };
            // first occurrence wins
            target.get_or_insert(pos);
        }

        Self { columns }
    }

    /// Joints with both planar columns available
    pub fn mapped_joints(&self) -> impl Iterator<Item = Joint> + '_ {
        Joint::ALL
            .iter()
            .copied()
            .filter(|j| {
                let cols = &self.columns[j.index()];
                cols.x.is_some() && cols.y.is_some()
            })
    }

    fn read(&self, joint: Joint, record: &StringRecord) -> Option<Landmark> {
        let cols = &self.columns[joint.index()];
        let field = |col: Option<usize>| -> Option<f64> {
            let raw = record.get(col?)?.trim();
            raw.parse::<f64>().ok()
        };

        Landmark::try_new(field(cols.x)?, field(cols.y)?, field(cols.z))
    }
}

/// One data row of a tabular export, paired with its file's layout
#[derive(Debug, Clone)]
pub struct TabularRow {
    pub layout: Arc<TabularLayout>,
    pub record: StringRecord,
}

/// Converts source-specific frames into [`PoseFrame`]s
#[derive(Debug, Clone, Default)]
pub struct LandmarkAdapter {
    config: AdapterConfig,
}

impl LandmarkAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn from_detector(&self, index: u64, frame: &DetectorFrame) -> PoseFrame {
        let mut builder = PoseFrame::builder(index);

        for lm in &frame.landmarks {
            let Some(joint) = Joint::from_index(lm.index) else {
                tracing::debug!(frame = index, landmark = lm.index, "ignoring unknown landmark index");
                continue;
            };
            if !(lm.visibility >= self.config.min_confidence) {
                continue;
            }
            if let Some(point) = Landmark::try_new(lm.x, lm.y, lm.z) {
                builder = builder.landmark(joint, point);
            }
        }

        builder.build()
    }

    pub fn from_row(&self, index: u64, row: &TabularRow) -> PoseFrame {
        PoseFrame::from_landmarks(
            index,
            row.layout
                .mapped_joints()
                .filter_map(|joint| row.layout.read(joint, &row.record).map(|lm| (joint, lm))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(layout: &Arc<TabularLayout>, fields: &[&str]) -> TabularRow {
        TabularRow {
            layout: Arc::clone(layout),
            record: StringRecord::from(fields.to_vec()),
        }
    }

    #[test]
    fn test_layout_resolves_name_forms() {
        let layout = TabularLayout::from_headers([
            "Frame",
            "RightShoulder.x",
            "RightShoulder.y",
            "right_elbow.X",
            "right_elbow.Y",
            "right_elbow.Z",
            "Spine.x",
        ]);
        let joints: Vec<Joint> = layout.mapped_joints().collect();
        assert_eq!(joints, vec![Joint::RightShoulder, Joint::RightElbow]);
    }

    #[test]
    fn test_row_with_malformed_field_marks_joint_absent() {
        let layout = Arc::new(TabularLayout::from_headers([
            "LeftWrist.x",
            "LeftWrist.y",
            "LeftElbow.x",
            "LeftElbow.y",
            "LeftElbow.z",
        ]));
        let frame = LandmarkAdapter::default().from_row(4, &row(&layout, &["0.5", "oops", "0.25", " 0.75 ", "nan"]));

        assert_eq!(frame.index(), 4);
        assert!(!frame.contains(Joint::LeftWrist));
        let elbow = frame.get(Joint::LeftElbow).unwrap();
        assert_relative_eq!(elbow.x, 0.25);
        assert_relative_eq!(elbow.y, 0.75);
        assert_eq!(elbow.z, None);
    }

    #[test]
    fn test_short_row_tolerated() {
        let layout = Arc::new(TabularLayout::from_headers([
            "Nose.x",
            "Nose.y",
            "LeftHip.x",
            "LeftHip.y",
        ]));
        let frame = LandmarkAdapter::default().from_row(0, &row(&layout, &["0.1", "0.2"]));
        assert!(frame.contains(Joint::Nose));
        assert!(!frame.contains(Joint::LeftHip));
    }

    #[test]
    fn test_detector_frame_filters() {
        let frame = DetectorFrame {
            landmarks: vec![
                DetectedLandmark { index: 12, x: 0.4, y: 0.3, z: Some(-0.2), visibility: 0.9 },
                DetectedLandmark { index: 14, x: 0.5, y: 0.5, z: None, visibility: 0.2 },
                DetectedLandmark { index: 16, x: f64::NAN, y: 0.5, z: None, visibility: 0.9 },
                DetectedLandmark { index: 99, x: 0.1, y: 0.1, z: None, visibility: 1.0 },
            ],
        };

        let adapter = LandmarkAdapter::new(AdapterConfig { min_confidence: 0.5 });
        let pose = adapter.from_detector(2, &frame);

        assert_eq!(pose.present_count(), 1);
        assert_eq!(pose.get(Joint::RightShoulder).and_then(|lm| lm.z), Some(-0.2));
        assert!(!pose.contains(Joint::RightElbow));
        assert!(!pose.contains(Joint::RightWrist));

        let lenient = LandmarkAdapter::default().from_detector(2, &frame);
        assert!(lenient.contains(Joint::RightElbow));
    }

    #[test]
    fn test_detector_json_defaults_visibility() {
        let frame: DetectorFrame =
            serde_json::from_str(r#"{"landmarks":[{"index":0,"x":0.5,"y":0.1}]}"#).unwrap();
        assert_eq!(frame.landmarks[0].visibility, 1.0);
        assert_eq!(frame.landmarks[0].z, None);
    }

    #[test]
    fn test_detector_json_bad_coordinate_drops_only_that_joint() {
        let frame: DetectorFrame = serde_json::from_str(
            r#"{"landmarks":[
                {"index":0,"x":null,"y":0.1},
                {"index":1,"x":"left","y":0.1},
                {"index":11,"y":0.3},
                {"index":12,"x":0.4,"y":0.3,"z":"deep"},
                {"index":14,"x":0.5,"y":0.5,"z":null}
            ]}"#,
        )
        .unwrap();
        assert_eq!(frame.landmarks.len(), 2);

        let pose = LandmarkAdapter::default().from_detector(0, &frame);
        assert!(!pose.contains(Joint::Nose));
        assert!(!pose.contains(Joint::LeftEyeInner));
        assert!(!pose.contains(Joint::LeftShoulder));
        assert_eq!(pose.get(Joint::RightShoulder).and_then(|lm| lm.z), None);
        assert!(pose.contains(Joint::RightElbow));
    }

    #[test]
    fn test_detector_json_without_landmarks_is_rejected() {
        assert!(serde_json::from_str::<DetectorFrame>(r#"{"frame":3}"#).is_err());
        assert!(serde_json::from_str::<DetectorFrame>(r#"{"landmarks":{}}"#).is_err());
    }
}
