//! Fundamental types: joints, landmarks and pose frames.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 33-landmark body topology (BlazePose / MediaPipe Pose ordering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Joint {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl Joint {
    pub const COUNT: usize = 33;

    pub const ALL: [Joint; Joint::COUNT] = [
        Joint::Nose,
        Joint::LeftEyeInner,
        Joint::LeftEye,
        Joint::LeftEyeOuter,
        Joint::RightEyeInner,
        Joint::RightEye,
        Joint::RightEyeOuter,
        Joint::LeftEar,
        Joint::RightEar,
        Joint::MouthLeft,
        Joint::MouthRight,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftPinky,
        Joint::RightPinky,
        Joint::LeftIndex,
        Joint::RightIndex,
        Joint::LeftThumb,
        Joint::RightThumb,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
        Joint::LeftHeel,
        Joint::RightHeel,
        Joint::LeftFootIndex,
        Joint::RightFootIndex,
    ];

    const NAMES: [&'static str; Joint::COUNT] = [
        "Nose",
        "LeftEyeInner",
        "LeftEye",
        "LeftEyeOuter",
        "RightEyeInner",
        "RightEye",
        "RightEyeOuter",
        "LeftEar",
        "RightEar",
        "MouthLeft",
        "MouthRight",
        "LeftShoulder",
        "RightShoulder",
        "LeftElbow",
        "RightElbow",
        "LeftWrist",
        "RightWrist",
        "LeftPinky",
        "RightPinky",
        "LeftIndex",
        "RightIndex",
        "LeftThumb",
        "RightThumb",
        "LeftHip",
        "RightHip",
        "LeftKnee",
        "RightKnee",
        "LeftAnkle",
        "RightAnkle",
        "LeftHeel",
        "RightHeel",
        "LeftFootIndex",
        "RightFootIndex",
    ];

    /// Native detector index of this landmark
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Canonical column stem used in tabular exports (`RightShoulder`)
    pub fn name(self) -> &'static str {
        Self::NAMES[self.index()]
    }

    /// Resolve a joint name written as `RightShoulder`, `right_shoulder`
    /// or `RIGHT_SHOULDER`.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect();
        if wanted.is_empty() {
            return None;
        }

        Self::ALL
            .iter()
            .copied()
            .find(|joint| joint.name().eq_ignore_ascii_case(&wanted))
    }
}

impl std::fmt::Display for Joint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Body side for bilateral evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Map a side-relative body point to its concrete joint
    pub fn joint(self, point: BodyPoint) -> Joint {
        use BodyPoint::*;
        match (self, point) {
            (Side::Left, Ear) => Joint::LeftEar,
            (Side::Left, Shoulder) => Joint::LeftShoulder,
            (Side::Left, Elbow) => Joint::LeftElbow,
            (Side::Left, Wrist) => Joint::LeftWrist,
            (Side::Left, Pinky) => Joint::LeftPinky,
            (Side::Left, Index) => Joint::LeftIndex,
            (Side::Left, Thumb) => Joint::LeftThumb,
            (Side::Left, Hip) => Joint::LeftHip,
            (Side::Left, Knee) => Joint::LeftKnee,
            (Side::Left, Ankle) => Joint::LeftAnkle,
            (Side::Left, Heel) => Joint::LeftHeel,
            (Side::Left, FootIndex) => Joint::LeftFootIndex,
            (Side::Right, Ear) => Joint::RightEar,
            (Side::Right, Shoulder) => Joint::RightShoulder,
            (Side::Right, Elbow) => Joint::RightElbow,
            (Side::Right, Wrist) => Joint::RightWrist,
            (Side::Right, Pinky) => Joint::RightPinky,
            (Side::Right, Index) => Joint::RightIndex,
            (Side::Right, Thumb) => Joint::RightThumb,
            (Side::Right, Hip) => Joint::RightHip,
            (Side::Right, Knee) => Joint::RightKnee,
            (Side::Right, Ankle) => Joint::RightAnkle,
            (Side::Right, Heel) => Joint::RightHeel,
            (Side::Right, FootIndex) => Joint::RightFootIndex,
        }
    }
}

/// Side-relative landmark used to describe regions once for both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPoint {
    Ear,
    Shoulder,
    Elbow,
    Wrist,
    Pinky,
    Index,
    Thumb,
    Hip,
    Knee,
    Ankle,
    Heel,
    FootIndex,
}

/// Landmark coordinate in detector space.
///
/// `x` grows to the right and `y` grows downward (image convention).
/// `z` is kept when the source provides it but the angle model is planar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub fn with_depth(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    /// Build a landmark only if the planar coordinates are finite.
    /// A non-finite depth is dropped rather than rejecting the point.
    pub fn try_new(x: f64, y: f64, z: Option<f64>) -> Option<Self> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Self {
            x,
            y,
            z: z.filter(|v| v.is_finite()),
        })
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.map_or(true, f64::is_finite)
    }

    pub fn planar(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// One time-sampled snapshot of joint positions.
///
/// Absent joints are `None`. Frames are built once through
/// [`PoseFrameBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    index: u64,
    landmarks: [Option<Landmark>; Joint::COUNT],
}

impl PoseFrame {
    /// Frame with every joint absent
    pub fn empty(index: u64) -> Self {
        Self {
            index,
            landmarks: [None; Joint::COUNT],
        }
    }

    pub fn builder(index: u64) -> PoseFrameBuilder {
        PoseFrameBuilder {
            frame: Self::empty(index),
        }
    }

    pub fn from_landmarks<I>(index: u64, landmarks: I) -> Self
    where
        I: IntoIterator<Item = (Joint, Landmark)>,
    {
        landmarks
            .into_iter()
            .fold(Self::builder(index), |b, (joint, lm)| b.landmark(joint, lm))
            .build()
    }

    /// Position of this frame in the input sequence
    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn get(&self, joint: Joint) -> Option<&Landmark> {
        self.landmarks[joint.index()].as_ref()
    }

    pub fn contains(&self, joint: Joint) -> bool {
        self.landmarks[joint.index()].is_some()
    }

    pub fn contains_all(&self, joints: &[Joint]) -> bool {
        joints.iter().all(|j| self.contains(*j))
    }

    /// Iterate over present joints in enumeration order
    pub fn present(&self) -> impl Iterator<Item = (Joint, &Landmark)> + '_ {
        Joint::ALL
            .iter()
            .zip(self.landmarks.iter())
            .filter_map(|(joint, lm)| lm.as_ref().map(|lm| (*joint, lm)))
    }

    pub fn present_count(&self) -> usize {
        self.landmarks.iter().flatten().count()
    }

    /// Copy of this frame with `joint` marked absent
    pub fn without(&self, joint: Joint) -> Self {
        let mut landmarks = self.landmarks;
        landmarks[joint.index()] = None;
        Self {
            index: self.index,
            landmarks,
        }
    }
}

pub struct PoseFrameBuilder {
    frame: PoseFrame,
}

impl PoseFrameBuilder {
    /// Set a joint. Non-finite landmarks leave the joint absent.
    pub fn landmark(mut self, joint: Joint, landmark: Landmark) -> Self {
        self.frame.landmarks[joint.index()] = landmark.is_finite().then_some(landmark);
        self
    }

    pub fn point(self, joint: Joint, x: f64, y: f64) -> Self {
        self.landmark(joint, Landmark::new(x, y))
    }

    pub fn build(self) -> PoseFrame {
        self.frame
    }
}
