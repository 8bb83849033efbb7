//! Action-unit extraction from facial landmark geometry.
//!
//! Each AU is a geometric ratio between named landmarks, normalised by the
//! outer-canthus distance (or an eye aspect ratio for the lid AUs), then
//! clamped and linearly remapped onto the 0-5 intensity scale by its
//! calibration range.

use crate::{
    constants::{ASYMMETRY_MIN_RAISE, AU_INTENSITY_MAX},
    landmarks::{FaceIndexMap, Landmark},
    utils::{remap_clamped, safe_ratio},
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported action units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuId {
    #[serde(rename = "AU1")]
    Au1,
    #[serde(rename = "AU2")]
    Au2,
    #[serde(rename = "AU4")]
    Au4,
    #[serde(rename = "AU5")]
    Au5,
    #[serde(rename = "AU6")]
    Au6,
    #[serde(rename = "AU7")]
    Au7,
    #[serde(rename = "AU9")]
    Au9,
    #[serde(rename = "AU12")]
    Au12,
    #[serde(rename = "AU15")]
    Au15,
    #[serde(rename = "AU17")]
    Au17,
    #[serde(rename = "AU20")]
    Au20,
    #[serde(rename = "AU25")]
    Au25,
    #[serde(rename = "AU26")]
    Au26,
    #[serde(rename = "AU43")]
    Au43,
}

impl AuId {
    /// Every AU, in iteration order
    pub const ALL: [Self; 14] = [
        Self::Au1,
        Self::Au2,
        Self::Au4,
        Self::Au5,
        Self::Au6,
        Self::Au7,
        Self::Au9,
        Self::Au12,
        Self::Au15,
        Self::Au17,
        Self::Au20,
        Self::Au25,
        Self::Au26,
        Self::Au43,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Au1 => "AU1",
            Self::Au2 => "AU2",
            Self::Au4 => "AU4",
            Self::Au5 => "AU5",
            Self::Au6 => "AU6",
            Self::Au7 => "AU7",
            Self::Au9 => "AU9",
            Self::Au12 => "AU12",
            Self::Au15 => "AU15",
            Self::Au17 => "AU17",
            Self::Au20 => "AU20",
            Self::Au25 => "AU25",
            Self::Au26 => "AU26",
            Self::Au43 => "AU43",
        }
    }

    /// FACS name of the movement
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Au1 => "inner brow raiser",
            Self::Au2 => "outer brow raiser",
            Self::Au4 => "brow lowerer",
            Self::Au5 => "upper lid raiser",
            Self::Au6 => "cheek raiser",
            Self::Au7 => "lid tightener",
            Self::Au9 => "nose wrinkler",
            Self::Au12 => "lip corner puller",
            Self::Au15 => "lip corner depressor",
            Self::Au17 => "chin raiser",
            Self::Au20 => "lip stretcher",
            Self::Au25 => "lips part",
            Self::Au26 => "jaw drop",
            Self::Au43 => "eyes closed",
        }
    }
}

impl fmt::Display for AuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One value per AU. Every key is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct AuMap<T> {
    pub au1: T,
    pub au2: T,
    pub au4: T,
    pub au5: T,
    pub au6: T,
    pub au7: T,
    pub au9: T,
    pub au12: T,
    pub au15: T,
    pub au17: T,
    pub au20: T,
    pub au25: T,
    pub au26: T,
    pub au43: T,
}

impl<T> AuMap<T> {
    /// Build a map by evaluating `f` for every AU
    pub fn from_fn(mut f: impl FnMut(AuId) -> T) -> Self {
        Self {
            au1: f(AuId::Au1),
            au2: f(AuId::Au2),
            au4: f(AuId::Au4),
            au5: f(AuId::Au5),
            au6: f(AuId::Au6),
            au7: f(AuId::Au7),
            au9: f(AuId::Au9),
            au12: f(AuId::Au12),
            au15: f(AuId::Au15),
            au17: f(AuId::Au17),
            au20: f(AuId::Au20),
            au25: f(AuId::Au25),
            au26: f(AuId::Au26),
            au43: f(AuId::Au43),
        }
    }

    #[must_use]
    pub fn get_ref(&self, id: AuId) -> &T {
        match id {
            AuId::Au1 => &self.au1,
            AuId::Au2 => &self.au2,
            AuId::Au4 => &self.au4,
            AuId::Au5 => &self.au5,
            AuId::Au6 => &self.au6,
            AuId::Au7 => &self.au7,
            AuId::Au9 => &self.au9,
            AuId::Au12 => &self.au12,
            AuId::Au15 => &self.au15,
            AuId::Au17 => &self.au17,
            AuId::Au20 => &self.au20,
            AuId::Au25 => &self.au25,
            AuId::Au26 => &self.au26,
            AuId::Au43 => &self.au43,
        }
    }

    pub fn get_mut(&mut self, id: AuId) -> &mut T {
        match id {
            AuId::Au1 => &mut self.au1,
            AuId::Au2 => &mut self.au2,
            AuId::Au4 => &mut self.au4,
            AuId::Au5 => &mut self.au5,
            AuId::Au6 => &mut self.au6,
            AuId::Au7 => &mut self.au7,
            AuId::Au9 => &mut self.au9,
            AuId::Au12 => &mut self.au12,
            AuId::Au15 => &mut self.au15,
            AuId::Au17 => &mut self.au17,
            AuId::Au20 => &mut self.au20,
            AuId::Au25 => &mut self.au25,
            AuId::Au26 => &mut self.au26,
            AuId::Au43 => &mut self.au43,
        }
    }

    pub fn set(&mut self, id: AuId, value: T) {
        *self.get_mut(id) = value;
    }

    /// `(id, &value)` pairs in [`AuId::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = (AuId, &T)> {
        AuId::ALL.into_iter().map(move |id| (id, self.get_ref(id)))
    }
}

impl<T: Copy> AuMap<T> {
    #[must_use]
    pub fn get(&self, id: AuId) -> T {
        *self.get_ref(id)
    }
}

/// AU intensities on the 0-5 scale
pub type AuVector = AuMap<f64>;

impl AuVector {
    /// Whether every intensity lies in [0, 5]
    #[must_use]
    pub fn is_in_range(&self) -> bool {
        self.iter().all(|(_, v)| (0.0..=AU_INTENSITY_MAX).contains(v))
    }
}

/// Direction of the clamped remap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemapDirection {
    /// Larger raw ratio, higher intensity
    Ascending,
    /// Smaller raw ratio, higher intensity
    Descending,
}

/// Calibration range of one AU's raw ratio
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuRange {
    pub in_min: f64,
    pub in_max: f64,
    pub direction: RemapDirection,
}

impl AuRange {
    #[must_use]
    pub const fn ascending(in_min: f64, in_max: f64) -> Self {
        Self { in_min, in_max, direction: RemapDirection::Ascending }
    }

    #[must_use]
    pub const fn descending(in_min: f64, in_max: f64) -> Self {
        Self { in_min, in_max, direction: RemapDirection::Descending }
    }

    /// Map a raw ratio onto [0, 5]
    #[must_use]
    pub fn apply(&self, raw: f64) -> f64 {
        remap_clamped(
            raw,
            self.in_min,
            self.in_max,
            AU_INTENSITY_MAX,
            self.direction == RemapDirection::Ascending,
        )
    }
}

/// Per-AU calibration ranges
pub type AuCalibration = AuMap<AuRange>;

impl Default for AuCalibration {
    fn default() -> Self {
        // Ratios are in units of outer-canthus distance; the lid AUs use the
        // eye aspect ratio directly.
        Self {
            au1: AuRange::ascending(0.22, 0.40),
            au2: AuRange::ascending(0.24, 0.42),
            au4: AuRange::descending(0.14, 0.24),
            au5: AuRange::ascending(0.30, 0.45),
            au6: AuRange::descending(0.60, 0.75),
            au7: AuRange::descending(0.18, 0.27),
            au9: AuRange::ascending(0.28, 0.40),
            au12: AuRange::ascending(0.01, 0.12),
            au15: AuRange::ascending(0.01, 0.12),
            au17: AuRange::descending(0.22, 0.34),
            au20: AuRange::ascending(0.65, 0.90),
            au25: AuRange::ascending(0.03, 0.20),
            au26: AuRange::ascending(0.30, 0.65),
            au43: AuRange::descending(0.08, 0.18),
        }
    }
}

/// Converts landmark sets into AU intensity vectors
#[derive(Debug, Clone)]
pub struct ActionUnitExtractor {
    index_map: FaceIndexMap,
    calibration: AuCalibration,
}

impl ActionUnitExtractor {
    #[must_use]
    pub fn new(index_map: FaceIndexMap, calibration: AuCalibration) -> Self {
        Self { index_map, calibration }
    }

    #[must_use]
    pub fn index_map(&self) -> &FaceIndexMap {
        &self.index_map
    }

    /// AU intensities for `landmarks`; all zero when the input is too short
    /// for the index map.
    #[must_use]
    pub fn extract(&self, landmarks: &[Landmark]) -> AuVector {
        if !self.index_map.covers(landmarks) {
            debug!(
                "AU extraction skipped: {} landmarks, need {}",
                landmarks.len(),
                self.index_map.min_point_count()
            );
            return AuVector::default();
        }

        let raw = self.raw_ratios(landmarks);
        AuMap::from_fn(|id| self.calibration.get(id).apply(raw.get(id)))
    }

    /// Uncalibrated geometric ratio behind each AU.
    ///
    /// # Panics
    ///
    /// Panics if `landmarks` does not cover the index map; [`Self::extract`]
    /// checks this first.
    #[must_use]
    pub fn raw_ratios(&self, landmarks: &[Landmark]) -> AuMap<f64> {
        let m = &self.index_map;
        let p = |i: usize| landmarks[i];
        let scale = m.inter_ocular(landmarks);
        let both = |f: &dyn Fn(usize) -> f64| (f(0) + f(1)) / 2.0 / scale;

        let center = m.mouth_center(landmarks);
        let ear = m.mean_eye_aspect_ratio(landmarks);

        AuMap {
            au1: both(&|s| p(m.eye_top[s]).y - p(m.brow_inner[s]).y),
            au2: both(&|s| p(m.eye_outer[s]).y - p(m.brow_outer[s]).y),
            au4: both(&|s| p(m.brow_inner[s]).distance(&p(m.eye_inner[s]))),
            au5: ear,
            au6: both(&|s| p(m.eye_bottom[s]).distance(&p(m.mouth_corners[s]))),
            au7: ear,
            au9: p(m.nose_alae[0]).distance(&p(m.nose_alae[1])) / scale,
            au12: both(&|s| center.y - p(m.mouth_corners[s]).y),
            au15: both(&|s| p(m.mouth_corners[s]).y - center.y),
            au17: (p(m.chin).y - p(m.lower_lip_outer).y) / scale,
            au20: p(m.mouth_corners[0]).distance(&p(m.mouth_corners[1])) / scale,
            au25: (p(m.lower_lip_inner).y - p(m.upper_lip_inner).y) / scale,
            au26: (p(m.lower_lip_outer).y - p(m.upper_lip_outer).y) / scale,
            au43: ear,
        }
    }

    /// Per-side mouth-corner raise above the mouth centre, in
    /// outer-canthus units. Zero for landmark sets too short to measure.
    #[must_use]
    pub fn corner_raises(&self, landmarks: &[Landmark]) -> (f64, f64) {
        if !self.index_map.covers(landmarks) {
            return (0.0, 0.0);
        }
        let m = &self.index_map;
        let scale = m.inter_ocular(landmarks);
        let center = m.mouth_center(landmarks);
        (
            (center.y - landmarks[m.mouth_corners[0]].y) / scale,
            (center.y - landmarks[m.mouth_corners[1]].y) / scale,
        )
    }

    /// Left/right imbalance of mouth-corner raise in [0, 1]
    #[must_use]
    pub fn mouth_asymmetry(&self, landmarks: &[Landmark]) -> f64 {
        let (left, right) = self.corner_raises(landmarks);
        let total = left.abs() + right.abs();
        if !total.is_finite() || total < ASYMMETRY_MIN_RAISE {
            return 0.0;
        }
        safe_ratio((left - right).abs(), total).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{neutral_face, LandmarkLayout};

    fn extractor(layout: LandmarkLayout) -> ActionUnitExtractor {
        ActionUnitExtractor::new(layout.index_map(), AuCalibration::default())
    }

    #[test]
    fn test_neutral_face_is_all_zero() {
        for layout in [LandmarkLayout::Sparse68, LandmarkLayout::Dense468] {
            let aus = extractor(layout).extract(&neutral_face(layout));
            for (id, value) in aus.iter() {
                assert_eq!(*value, 0.0, "{id} should be inactive on a neutral face");
            }
        }
    }

    #[test]
    fn test_short_input_returns_zero_vector() {
        let ex = extractor(LandmarkLayout::Sparse68);
        assert_eq!(ex.extract(&[Landmark::default(); 10]), AuVector::default());
        assert_eq!(ex.extract(&[]), AuVector::default());
    }

    #[test]
    fn test_brow_lowerer_increases_as_brows_drop() {
        let layout = LandmarkLayout::Sparse68;
        let ex = extractor(layout);
        let map = layout.index_map();
        let mut face = neutral_face(layout);

        let mut last = ex.extract(&face).get(AuId::Au4);
        for _ in 0..5 {
            for side in 0..2 {
                face[map.brow_inner[side]].y += 0.025;
            }
            let au4 = ex.extract(&face).get(AuId::Au4);
            assert!(au4 >= last);
            last = au4;
        }
        assert!(last > 3.0, "au4 = {last}");
    }

    #[test]
    fn test_corner_direction_drives_au12_and_au15() {
        let layout = LandmarkLayout::Sparse68;
        let ex = extractor(layout);
        let map = layout.index_map();

        let mut smile = neutral_face(layout);
        let mut frown = neutral_face(layout);
        for side in 0..2 {
            smile[map.mouth_corners[side]].y -= 0.1;
            frown[map.mouth_corners[side]].y += 0.1;
        }

        let smile_aus = ex.extract(&smile);
        assert!(smile_aus.get(AuId::Au12) > 3.0);
        assert_eq!(smile_aus.get(AuId::Au15), 0.0);

        let frown_aus = ex.extract(&frown);
        assert!(frown_aus.get(AuId::Au15) > 3.0);
        assert_eq!(frown_aus.get(AuId::Au12), 0.0);
    }

    #[test]
    fn test_closed_eyes_raise_au43() {
        let layout = LandmarkLayout::Dense468;
        let ex = extractor(layout);
        let map = layout.index_map();
        let mut face = neutral_face(layout);
        for contour in map.eye_contour {
            for slot in [1, 2, 4, 5] {
                face[contour[slot]].y = 0.0;
            }
        }
        let aus = ex.extract(&face);
        assert_eq!(aus.get(AuId::Au43), 5.0);
        assert_eq!(aus.get(AuId::Au7), 5.0);
        assert_eq!(aus.get(AuId::Au5), 0.0);
    }

    #[test]
    fn test_mouth_asymmetry() {
        let layout = LandmarkLayout::Sparse68;
        let ex = extractor(layout);
        let map = layout.index_map();

        let face = neutral_face(layout);
        assert_eq!(ex.mouth_asymmetry(&face), 0.0);

        let mut lopsided = face.clone();
        lopsided[map.mouth_corners[0]].y -= 0.12;
        assert!((ex.mouth_asymmetry(&lopsided) - 1.0).abs() < 1e-9);

        let mut even = face;
        even[map.mouth_corners[0]].y -= 0.1;
        even[map.mouth_corners[1]].y -= 0.1;
        assert!(ex.mouth_asymmetry(&even) < 1e-9);
    }

    #[test]
    fn test_non_finite_landmarks_stay_in_range() {
        let layout = LandmarkLayout::Sparse68;
        let mut face = neutral_face(layout);
        face[48] = Landmark::new(f64::NAN, f64::INFINITY);
        let aus = extractor(layout).extract(&face);
        assert!(aus.is_in_range());
    }

    #[test]
    fn test_au_map_round_trip_access() {
        let mut map = AuVector::default();
        for (i, id) in AuId::ALL.into_iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            map.set(id, i as f64);
        }
        for (i, (id, value)) in map.iter().enumerate() {
            assert_eq!(id, AuId::ALL[i]);
            #[allow(clippy::cast_precision_loss)]
            let expected = i as f64;
            assert_eq!(*value, expected);
        }
        let json = serde_json::to_string(&map).unwrap();
        assert!(json.contains("\"AU12\":7.0"));
    }
}
