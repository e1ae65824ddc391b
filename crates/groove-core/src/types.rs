//! Data model for the Groove motion analysis engine.
//!
//! All entities are value objects: constructed once from client input,
//! never mutated inside the engine. Joint identity is positional: the
//! index of a [`Keypoint`] within its [`Frame`] is the joint id, and the
//! joint count may vary from frame to frame (missing joints are simply
//! absent, not zero).

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single body-joint observation.
///
/// Coordinates are unit-agnostic (normalized or pixel), as long as one
/// motion uses them consistently. A missing `confidence` means the
/// detection is fully trusted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Depth coordinate, when the upstream estimator provides one.
    #[serde(default)]
    pub z: Option<f64>,
    /// Detection confidence in [0, 1].
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl Keypoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            confidence: None,
        }
    }

    /// Position as a 3D vector; a missing depth reads as 0.
    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z.unwrap_or(0.0))
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.z.map_or(true, f64::is_finite)
            && self.confidence.map_or(true, f64::is_finite)
    }
}

/// One time sample: every keypoint captured at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Capture time in seconds. Non-decreasing across a motion, but not
    /// required to be strictly increasing.
    pub timestamp: f64,
    pub keypoints: Vec<Keypoint>,
}

impl Frame {
    pub fn new(timestamp: f64, keypoints: Vec<Keypoint>) -> Self {
        Self {
            timestamp,
            keypoints,
        }
    }

    /// Keypoint for joint `index`, if this frame observed it.
    pub fn keypoint(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index)
    }
}

/// The unit of analysis: an ordered capture of frames for one performance.
///
/// Temporal order is the sequence order; frames are never re-sorted by
/// timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub frames: Vec<Frame>,
    /// Musical tempo in beats per minute, when the performance was set to
    /// music. Values ≤ 0 are treated as absent by the timing analyzer.
    #[serde(default)]
    pub audio_bpm: Option<f64>,
    /// Opaque reference-motion id, reserved for comparison-based scoring.
    #[serde(default)]
    pub reference_motion: Option<String>,
}

impl Motion {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames,
            audio_bpm: None,
            reference_motion: None,
        }
    }

    pub fn with_bpm(frames: Vec<Frame>, audio_bpm: f64) -> Self {
        Self {
            frames,
            audio_bpm: Some(audio_bpm),
            reference_motion: None,
        }
    }

    /// Parse and structurally validate a motion from a JSON document.
    ///
    /// This is the construction-time seam standing in for the excluded
    /// schema layer: malformed documents and non-finite numbers are
    /// rejected here, while sparse-but-valid inputs (empty frames, missing
    /// BPM/z/confidence) pass through untouched.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let motion: Motion = serde_json::from_str(json)?;
        motion.validate()?;
        Ok(motion)
    }

    /// Parse a motion from an already-decoded JSON value.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        let motion: Motion = serde_json::from_value(value)?;
        motion.validate()?;
        Ok(motion)
    }

    /// Reject non-finite numbers before they can poison every metric.
    ///
    /// Degenerate-but-valid shapes (no frames, one frame, ragged joint
    /// counts) are explicitly allowed.
    pub fn validate(&self) -> Result<()> {
        if self.audio_bpm.is_some_and(|bpm| !bpm.is_finite()) {
            return Err(Error::InvalidInput("audio_bpm is not finite".into()));
        }

        for (i, frame) in self.frames.iter().enumerate() {
            if !frame.timestamp.is_finite() {
                return Err(Error::NonFiniteInput { frame_index: i });
            }
            if frame.keypoints.iter().any(|kp| !kp.is_finite()) {
                return Err(Error::NonFiniteInput { frame_index: i });
            }
        }

        Ok(())
    }

    /// Elapsed time between first and last frame, in seconds.
    pub fn duration_secs(&self) -> f64 {
        match (self.frames.first(), self.frames.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }
}

/// Synchronization of detected movement beats against the musical grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingMetrics {
    /// Mean absolute lag to the nearest grid beat, in milliseconds.
    pub avg_lag_ms: f64,
    /// Alignment quality in [0, 1]; 1.0 means perfectly on the grid.
    pub sync_score: f64,
    /// Share of detected beats inside the on-beat tolerance, in [0, 100].
    pub on_beat_percentage: f64,
}

impl TimingMetrics {
    /// Defaults when no tempo reference exists or no beats were detected:
    /// alignment to an undefined grid cannot be penalized, but neither can
    /// any beat be asserted as intentionally on-beat.
    pub fn neutral() -> Self {
        Self {
            avg_lag_ms: 0.0,
            sync_score: 1.0,
            on_beat_percentage: 0.0,
        }
    }
}

/// Movement-quality sub-scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementMetrics {
    pub smoothness_score: f64,
    pub accuracy_score: f64,
    pub energy_score: f64,
    pub form_score: f64,
}

/// Coaching feedback category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    Timing,
    Movement,
    Energy,
    Form,
    General,
}

/// Severity of a feedback item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Ordering rank; higher is more severe.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Info => 0,
            Severity::Warning => 1,
            Severity::Critical => 2,
        }
    }
}

/// One coaching message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub category: FeedbackCategory,
    pub message: String,
    pub severity: Severity,
    /// Moment the feedback points at, in seconds. Absent for summary
    /// feedback covering the whole motion.
    #[serde(default)]
    pub timestamp: Option<f64>,
}

/// Complete engine output for one motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Aggregate performance score in [0, 100].
    pub overall_score: f64,
    pub timing_metrics: TimingMetrics,
    pub movement_metrics: MovementMetrics,
    /// Coaching feedback, most severe first.
    pub feedback: Vec<FeedbackItem>,
    /// Wall-clock cost measured at the caller-visible boundary; the pure
    /// computation leaves this at 0.
    pub processing_time_ms: f64,
}

impl PredictionResult {
    pub fn with_processing_time(mut self, ms: f64) -> Self {
        self.processing_time_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_default_when_missing() {
        let json = r#"{
            "frames": [
                {"timestamp": 0.0, "keypoints": [{"x": 0.5, "y": 0.5}]}
            ]
        }"#;

        let motion = Motion::from_json_str(json).unwrap();
        assert_eq!(motion.frames.len(), 1);
        assert!(motion.audio_bpm.is_none());
        assert!(motion.reference_motion.is_none());

        let kp = &motion.frames[0].keypoints[0];
        assert!(kp.z.is_none());
        assert!(kp.confidence.is_none());
    }

    #[test]
    fn test_missing_frames_field_is_rejected() {
        let json = r#"{"audio_bpm": 120.0}"#;
        assert!(matches!(
            Motion::from_json_str(json),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_empty_frames_are_valid() {
        let json = r#"{"frames": []}"#;
        let motion = Motion::from_json_str(json).unwrap();
        assert!(motion.frames.is_empty());
        assert_eq!(motion.duration_secs(), 0.0);
    }

    #[test]
    fn test_non_finite_timestamp_is_rejected() {
        let motion = Motion::new(vec![Frame::new(f64::NAN, vec![Keypoint::new(0.0, 0.0)])]);
        assert!(matches!(
            motion.validate(),
            Err(Error::NonFiniteInput { frame_index: 0 })
        ));
    }

    #[test]
    fn test_non_finite_coordinate_is_rejected() {
        let mut kp = Keypoint::new(0.0, f64::INFINITY);
        kp.confidence = Some(0.9);
        let motion = Motion::new(vec![
            Frame::new(0.0, vec![Keypoint::new(0.0, 0.0)]),
            Frame::new(0.1, vec![kp]),
        ]);
        assert!(matches!(
            motion.validate(),
            Err(Error::NonFiniteInput { frame_index: 1 })
        ));
    }

    #[test]
    fn test_keypoint_position_defaults_depth_to_zero() {
        let kp = Keypoint::new(0.3, 0.7);
        assert_eq!(kp.position(), Vector3::new(0.3, 0.7, 0.0));

        let mut with_depth = Keypoint::new(0.3, 0.7);
        with_depth.z = Some(1.5);
        assert_eq!(with_depth.position().z, 1.5);
    }

    #[test]
    fn test_severity_rank_ordering() {
        assert!(Severity::Critical.rank() > Severity::Warning.rank());
        assert!(Severity::Warning.rank() > Severity::Info.rank());
    }

    #[test]
    fn test_category_serializes_lowercase() {
        let json = serde_json::to_string(&FeedbackCategory::Timing).unwrap();
        assert_eq!(json, r#""timing""#);
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, r#""warning""#);
    }
}
