//! The engine's public entry point, composing all analysis stages.
//!
//! One call, one result: preprocess the motion into kinematic series, run
//! the timing analyzer and quality scorer independently over it, aggregate
//! the sub-scores, and generate feedback. The analyzer holds only its
//! configuration. No state survives between invocations, so a single
//! instance is safe to share across threads without locks.

use std::time::Instant;

use groove_core::{KinematicSeries, Motion, PredictionResult, Result};

use crate::config::AnalysisConfig;
use crate::feedback::FeedbackGenerator;
use crate::quality::QualityScorer;
use crate::score::overall_score;
use crate::timing::TimingAnalyzer;

/// Complete motion analysis engine.
#[derive(Debug, Clone)]
pub struct MotionAnalyzer {
    config: AnalysisConfig,
    timing: TimingAnalyzer,
    quality: QualityScorer,
    feedback: FeedbackGenerator,
}

impl MotionAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        let timing = TimingAnalyzer::new(config.timing);
        let quality = QualityScorer::new(config.quality);
        let feedback = FeedbackGenerator::new(config.feedback);
        Self {
            config,
            timing,
            quality,
            feedback,
        }
    }

    /// Analyze one motion and produce the full prediction result.
    ///
    /// Pure and deterministic: identical input yields an identical result,
    /// and `processing_time_ms` is left at 0 (see [`analyze_timed`]).
    /// Sparse input (empty frames, a single frame, missing BPM or
    /// confidence) resolves to the documented neutral defaults; only
    /// structurally malformed input (non-finite numbers) is rejected.
    ///
    /// [`analyze_timed`]: MotionAnalyzer::analyze_timed
    pub fn analyze(&self, motion: &Motion) -> Result<PredictionResult> {
        motion.validate()?;
        tracing::debug!(
            frames = motion.frames.len(),
            bpm = ?motion.audio_bpm,
            "analyzing motion"
        );

        let series = KinematicSeries::from_motion(motion);
        let timing = self.timing.analyze(&series, motion.audio_bpm);
        let quality = self.quality.score(&series);
        let overall = overall_score(&self.config.weights, &timing.metrics, &quality.metrics);
        let feedback = self.feedback.generate(&timing, &quality, overall);

        tracing::debug!(
            overall_score = overall,
            beats = timing.beat_count,
            feedback_items = feedback.len(),
            "analysis complete"
        );

        Ok(PredictionResult {
            overall_score: overall,
            timing_metrics: timing.metrics,
            movement_metrics: quality.metrics,
            feedback,
            processing_time_ms: 0.0,
        })
    }

    /// [`analyze`], with wall-clock cost stamped into
    /// `processing_time_ms` at this caller-visible boundary.
    ///
    /// [`analyze`]: MotionAnalyzer::analyze
    pub fn analyze_timed(&self, motion: &Motion) -> Result<PredictionResult> {
        let started = Instant::now();
        let result = self.analyze(motion)?;
        Ok(result.with_processing_time(started.elapsed().as_secs_f64() * 1000.0))
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

impl Default for MotionAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groove_core::{Error, Frame, Keypoint, TimingMetrics};
    use std::f64::consts::PI;

    fn analyzer() -> MotionAnalyzer {
        MotionAnalyzer::default()
    }

    #[test]
    fn test_empty_motion_resolves_to_neutral_result() {
        let result = analyzer().analyze(&Motion::new(vec![])).unwrap();

        assert_eq!(result.timing_metrics, TimingMetrics::neutral());
        assert_eq!(result.movement_metrics.smoothness_score, 1.0);
        assert_eq!(result.movement_metrics.accuracy_score, 1.0);
        assert_eq!(result.movement_metrics.energy_score, 0.5);
        assert_eq!(result.movement_metrics.form_score, 0.8);
        assert!(result.feedback.is_empty());
        assert!((0.0..=100.0).contains(&result.overall_score));
    }

    #[test]
    fn test_single_frame_single_keypoint_scenario() {
        let mut kp = Keypoint::new(0.5, 0.5);
        kp.confidence = Some(0.9);
        let motion = Motion::new(vec![Frame::new(0.0, vec![kp])]);

        let result = analyzer().analyze(&motion).unwrap();
        assert_eq!(result.timing_metrics.sync_score, 1.0);
        assert_eq!(result.timing_metrics.on_beat_percentage, 0.0);
        assert_eq!(result.timing_metrics.avg_lag_ms, 0.0);
        assert_eq!(result.movement_metrics.smoothness_score, 1.0);
        assert_eq!(result.movement_metrics.accuracy_score, 1.0);
        assert!((0.0..=100.0).contains(&result.overall_score));
    }

    #[test]
    fn test_identical_input_yields_identical_results() {
        let motion = beat_motion(90, 120.0, 0.05);
        let a = analyzer().analyze(&motion).unwrap();
        let b = analyzer().analyze(&motion).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_non_finite_input_is_rejected_before_analysis() {
        let motion = Motion::new(vec![Frame::new(0.0, vec![Keypoint::new(f64::NAN, 0.0)])]);
        assert!(matches!(
            analyzer().analyze(&motion),
            Err(Error::NonFiniteInput { frame_index: 0 })
        ));
    }

    /// A joint whose speed pulses once per beat at the given BPM, with its
    /// speed peaks offset from the grid by `phase` seconds.
    fn beat_motion(n_frames: usize, bpm: f64, phase: f64) -> Motion {
        let period = 60.0 / bpm;
        let frames = (0..n_frames)
            .map(|i| {
                let t = i as f64 / 30.0;
                let x = t + (period / (2.0 * PI)) * (2.0 * PI * (t - phase) / period).sin();
                Frame::new(t, vec![Keypoint::new(x, 0.0)])
            })
            .collect();
        Motion::with_bpm(frames, bpm)
    }

    #[test]
    fn test_on_beat_motion_scores_high_sync() {
        let result = analyzer().analyze(&beat_motion(90, 120.0, 0.01)).unwrap();
        assert!(
            result.timing_metrics.sync_score > 0.8,
            "sync {}",
            result.timing_metrics.sync_score
        );
        assert!(
            result.timing_metrics.on_beat_percentage > 90.0,
            "on-beat {}",
            result.timing_metrics.on_beat_percentage
        );
    }

    #[test]
    fn test_off_beat_motion_draws_timing_feedback() {
        // Beats near the midpoint between grid beats: worst possible sync.
        let result = analyzer().analyze(&beat_motion(90, 120.0, 0.25)).unwrap();

        assert!(result.timing_metrics.sync_score < 0.4);
        let item = result
            .feedback
            .iter()
            .find(|i| i.category == groove_core::FeedbackCategory::Timing)
            .expect("timing feedback expected");
        assert_eq!(item.severity, groove_core::Severity::Critical);
        assert!(item.timestamp.is_some());
    }

    #[test]
    fn test_result_bounds_hold_across_inputs() {
        let motions = [
            Motion::new(vec![]),
            beat_motion(90, 120.0, 0.0),
            beat_motion(90, 120.0, 0.25),
            Motion::new(vec![Frame::new(0.0, vec![Keypoint::new(0.0, 0.0)])]),
        ];
        for motion in &motions {
            let result = analyzer().analyze(motion).unwrap();
            assert!((0.0..=100.0).contains(&result.overall_score));
            assert!((0.0..=1.0).contains(&result.timing_metrics.sync_score));
            assert!((0.0..=100.0).contains(&result.timing_metrics.on_beat_percentage));
            assert!(result.timing_metrics.avg_lag_ms >= 0.0);
            let m = &result.movement_metrics;
            for score in [
                m.smoothness_score,
                m.accuracy_score,
                m.energy_score,
                m.form_score,
            ] {
                assert!((0.0..=1.0).contains(&score));
            }
        }
    }

    #[test]
    fn test_timed_analysis_stamps_processing_time() {
        let motion = beat_motion(90, 120.0, 0.0);
        let result = analyzer().analyze_timed(&motion).unwrap();
        assert!(result.processing_time_ms >= 0.0);
        assert!(result.processing_time_ms.is_finite());
    }

    #[test]
    fn test_reference_motion_id_does_not_affect_scoring() {
        let motion = beat_motion(90, 120.0, 0.05);
        let mut with_reference = motion.clone();
        with_reference.reference_motion = Some("routine-42".to_string());

        let plain = analyzer().analyze(&motion).unwrap();
        let referenced = analyzer().analyze(&with_reference).unwrap();
        assert_eq!(plain, referenced);
    }
}
