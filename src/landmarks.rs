//! Landmark types, layouts and the named anatomical index maps.
//!
//! Every geometric feature in the crate is computed through a
//! [`FaceIndexMap`], so the sparse 68-point and dense 468-point layouts share
//! one code path and differ only in which indices they name.

use crate::{
    constants::{DENSE_LANDMARK_COUNT, SPARSE_LANDMARK_COUNT},
    emotion::Emotion,
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single 2D/3D landmark. `z` is zero for 2D detectors.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    #[must_use]
    pub const fn new_3d(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the image plane
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    #[must_use]
    pub fn vertical_distance(&self, other: &Self) -> f64 {
        (self.y - other.y).abs()
    }

    #[must_use]
    pub fn horizontal_distance(&self, other: &Self) -> f64 {
        (self.x - other.x).abs()
    }

    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new_3d(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }
}

/// Coordinate space of incoming landmarks, fixed for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinateSpace {
    /// Coordinates in [0, 1] relative to the frame
    #[default]
    Normalized,
    /// Pixel coordinates
    Pixel,
}

/// Supported landmark resolutions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkLayout {
    /// dlib-style 68-point layout
    Sparse68,
    /// Face-mesh 468-point layout
    Dense468,
}

impl LandmarkLayout {
    /// Resolve a layout from its point count
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPointCount`] for anything other than 68 or 468.
    pub fn from_point_count(point_count: usize) -> Result<Self> {
        match point_count {
            SPARSE_LANDMARK_COUNT => Ok(Self::Sparse68),
            DENSE_LANDMARK_COUNT => Ok(Self::Dense468),
            other => Err(Error::InvalidPointCount(other)),
        }
    }

    #[must_use]
    pub const fn point_count(self) -> usize {
        match self {
            Self::Sparse68 => SPARSE_LANDMARK_COUNT,
            Self::Dense468 => DENSE_LANDMARK_COUNT,
        }
    }

    /// Default anatomical index map for this layout
    #[must_use]
    pub fn index_map(self) -> FaceIndexMap {
        match self {
            Self::Sparse68 => FaceIndexMap::sparse68(),
            Self::Dense468 => FaceIndexMap::dense468(),
        }
    }
}

/// Named anatomical landmark indices.
///
/// Paired fields are `[image-left, image-right]`. Eye contours follow the
/// eye-aspect-ratio convention `p1..p6`: corners at `p1`/`p4`, upper lid at
/// `p2`/`p3`, lower lid at `p5`/`p6`, with `p2`-`p6` and `p3`-`p5` facing
/// each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceIndexMap {
    pub brow_inner: [usize; 2],
    pub brow_outer: [usize; 2],
    pub eye_outer: [usize; 2],
    pub eye_inner: [usize; 2],
    pub eye_top: [usize; 2],
    pub eye_bottom: [usize; 2],
    pub eye_contour: [[usize; 6]; 2],
    pub nose_bridge: usize,
    pub nose_tip: usize,
    pub nose_alae: [usize; 2],
    pub mouth_corners: [usize; 2],
    pub upper_lip_outer: usize,
    pub lower_lip_outer: usize,
    pub upper_lip_inner: usize,
    pub lower_lip_inner: usize,
    pub chin: usize,
    pub jaw_sides: [usize; 2],
    pub cheeks: [usize; 2],
}

impl FaceIndexMap {
    /// Index map for the 68-point layout
    #[must_use]
    pub const fn sparse68() -> Self {
        Self {
            brow_inner: [21, 22],
            brow_outer: [17, 26],
            eye_outer: [36, 45],
            eye_inner: [39, 42],
            eye_top: [38, 43],
            eye_bottom: [40, 47],
            eye_contour: [[36, 37, 38, 39, 40, 41], [42, 43, 44, 45, 46, 47]],
            nose_bridge: 27,
            nose_tip: 30,
            nose_alae: [31, 35],
            mouth_corners: [48, 54],
            upper_lip_outer: 51,
            lower_lip_outer: 57,
            upper_lip_inner: 62,
            lower_lip_inner: 66,
            chin: 8,
            jaw_sides: [0, 16],
            cheeks: [2, 14],
        }
    }

    /// Index map for the 468-point layout
    #[must_use]
    pub const fn dense468() -> Self {
        Self {
            brow_inner: [107, 336],
            brow_outer: [70, 300],
            eye_outer: [33, 263],
            eye_inner: [133, 362],
            eye_top: [158, 385],
            eye_bottom: [153, 380],
            eye_contour: [[33, 160, 158, 133, 153, 144], [362, 385, 387, 263, 373, 380]],
            nose_bridge: 168,
            nose_tip: 1,
            nose_alae: [129, 358],
            mouth_corners: [61, 291],
            upper_lip_outer: 0,
            lower_lip_outer: 17,
            upper_lip_inner: 13,
            lower_lip_inner: 14,
            chin: 152,
            jaw_sides: [234, 454],
            cheeks: [50, 280],
        }
    }

    /// Every index the map names
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        let mut all = Vec::with_capacity(40);
        for pair in [
            self.brow_inner,
            self.brow_outer,
            self.eye_outer,
            self.eye_inner,
            self.eye_top,
            self.eye_bottom,
            self.nose_alae,
            self.mouth_corners,
            self.jaw_sides,
            self.cheeks,
        ] {
            all.extend_from_slice(&pair);
        }
        for contour in &self.eye_contour {
            all.extend_from_slice(contour);
        }
        all.extend_from_slice(&[
            self.nose_bridge,
            self.nose_tip,
            self.upper_lip_outer,
            self.lower_lip_outer,
            self.upper_lip_inner,
            self.lower_lip_inner,
            self.chin,
        ]);
        all
    }

    /// Smallest landmark sequence length that covers every named index
    #[must_use]
    pub fn min_point_count(&self) -> usize {
        self.indices().into_iter().max().map_or(0, |max| max + 1)
    }

    /// Whether `landmarks` is long enough for this map
    #[must_use]
    pub fn covers(&self, landmarks: &[Landmark]) -> bool {
        landmarks.len() >= self.min_point_count()
    }

    /// Outer-canthus distance, the scale every geometric ratio is divided by.
    /// Falls back to 1.0 for degenerate geometry.
    #[must_use]
    pub fn inter_ocular(&self, landmarks: &[Landmark]) -> f64 {
        let d = landmarks[self.eye_outer[0]].distance(&landmarks[self.eye_outer[1]]);
        if d.is_finite() && d > crate::constants::EPSILON {
            d
        } else {
            1.0
        }
    }

    /// Mid-point between the outer lip centres
    #[must_use]
    pub fn mouth_center(&self, landmarks: &[Landmark]) -> Landmark {
        landmarks[self.upper_lip_outer].midpoint(&landmarks[self.lower_lip_outer])
    }

    /// Eye aspect ratio of one eye (`side` 0 = image-left, 1 = image-right)
    #[must_use]
    pub fn eye_aspect_ratio(&self, landmarks: &[Landmark], side: usize) -> f64 {
        let p = self.eye_contour[side].map(|i| landmarks[i]);
        let horizontal = p[0].distance(&p[3]);
        if horizontal < crate::constants::EPSILON {
            return 0.0;
        }
        (p[1].distance(&p[5]) + p[2].distance(&p[4])) / (2.0 * horizontal)
    }

    /// Mean eye aspect ratio of both eyes
    #[must_use]
    pub fn mean_eye_aspect_ratio(&self, landmarks: &[Landmark]) -> f64 {
        (self.eye_aspect_ratio(landmarks, 0) + self.eye_aspect_ratio(landmarks, 1)) / 2.0
    }
}

/// One detector output for one video frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time in milliseconds
    pub timestamp_ms: f64,

    /// Ordered landmarks; empty when nothing was detected
    #[serde(default)]
    pub landmarks: Vec<Landmark>,

    /// Detector's face-present flag
    #[serde(default = "default_detected")]
    pub detected: bool,

    /// Per-class expression scores from the upstream detector, if it has any
    #[serde(default)]
    pub expression_scores: BTreeMap<Emotion, f64>,
}

fn default_detected() -> bool {
    true
}

impl LandmarkFrame {
    /// A frame with a detected face
    #[must_use]
    pub fn detected(timestamp_ms: f64, landmarks: Vec<Landmark>) -> Self {
        Self {
            timestamp_ms,
            landmarks,
            detected: true,
            expression_scores: BTreeMap::new(),
        }
    }

    /// A "no face" frame
    #[must_use]
    pub fn missing(timestamp_ms: f64) -> Self {
        Self {
            timestamp_ms,
            landmarks: Vec::new(),
            detected: false,
            expression_scores: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_expression_scores(mut self, scores: BTreeMap<Emotion, f64>) -> Self {
        self.expression_scores = scores;
        self
    }

    /// Detection flag set and at least one landmark present
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.detected && !self.landmarks.is_empty()
    }
}

/// Synthetic frontal neutral face for `layout`, in face units
/// (outer-canthus distance 1.0, face centred on x = 0, y pointing down).
///
/// Only the named indices carry anatomy; the remaining points sit on the
/// nose. Useful as a calibration reference and as a test fixture.
#[must_use]
pub fn neutral_face(layout: LandmarkLayout) -> Vec<Landmark> {
    let map = layout.index_map();
    let mut points = vec![Landmark::new(0.0, 0.4); layout.point_count()];

    let eyes = [
        [(-0.5, 0.0), (-0.42, -0.045), (-0.26, -0.045), (-0.18, 0.0), (-0.26, 0.045), (-0.42, 0.045)],
        [(0.18, 0.0), (0.26, -0.045), (0.42, -0.045), (0.5, 0.0), (0.42, 0.045), (0.26, 0.045)],
    ];
    for side in 0..2 {
        for (slot, &(x, y)) in eyes[side].iter().enumerate() {
            points[map.eye_contour[side][slot]] = Landmark::new(x, y);
        }
    }

    let mut place = |index: usize, x: f64, y: f64| points[index] = Landmark::new(x, y);

    place(map.eye_outer[0], -0.5, 0.0);
    place(map.eye_outer[1], 0.5, 0.0);
    place(map.eye_inner[0], -0.18, 0.0);
    place(map.eye_inner[1], 0.18, 0.0);
    place(map.eye_top[0], -0.26, -0.045);
    place(map.eye_top[1], 0.26, -0.045);
    place(map.eye_bottom[0], -0.26, 0.045);
    place(map.eye_bottom[1], 0.26, 0.045);
    place(map.brow_inner[0], -0.2, -0.25);
    place(map.brow_inner[1], 0.2, -0.25);
    place(map.brow_outer[0], -0.55, -0.22);
    place(map.brow_outer[1], 0.55, -0.22);
    place(map.nose_bridge, 0.0, -0.1);
    place(map.nose_tip, 0.0, 0.45);
    place(map.nose_alae[0], -0.13, 0.5);
    place(map.nose_alae[1], 0.13, 0.5);
    place(map.mouth_corners[0], -0.3, 0.8);
    place(map.mouth_corners[1], 0.3, 0.8);
    place(map.upper_lip_outer, 0.0, 0.72);
    place(map.lower_lip_outer, 0.0, 0.88);
    place(map.upper_lip_inner, 0.0, 0.79);
    place(map.lower_lip_inner, 0.0, 0.81);
    place(map.chin, 0.0, 1.25);
    place(map.jaw_sides[0], -0.75, 0.1);
    place(map.jaw_sides[1], 0.75, 0.1);
    place(map.cheeks[0], -0.7, 0.45);
    place(map.cheeks[1], 0.7, 0.45);

    points
}
