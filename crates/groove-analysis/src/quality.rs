//! Movement-quality scoring: smoothness, accuracy, energy, form.
//!
//! Every sub-score maps a raw kinematic statistic into [0, 1] through a
//! bounded saturating curve, never exposing the raw value. The four
//! computations are independent: a degenerate input in one (no jerk
//! samples, no velocities, too few keypoints for posture) falls back to
//! that score's own documented neutral default without disturbing the
//! others.

use groove_core::{KinematicSeries, MovementMetrics};
use nalgebra::Vector3;

use crate::config::QualityConfig;

/// Neutral energy when no velocity sample exists.
const ENERGY_DEFAULT: f64 = 0.5;
/// Neutral-high form when keypoints are too sparse to assess posture.
const FORM_DEFAULT: f64 = 0.8;
/// Blend between postural stability and detection confidence in the form
/// score.
const FORM_STABILITY_WEIGHT: f64 = 0.7;

/// Movement metrics plus the context the feedback generator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityAnalysis {
    pub metrics: MovementMetrics,
    /// Timestamp of the largest jerk spike, when any jerk sample exists.
    pub peak_jerk_at: Option<f64>,
}

/// Scores movement quality from a preprocessed motion.
#[derive(Debug, Clone)]
pub struct QualityScorer {
    config: QualityConfig,
}

impl QualityScorer {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, series: &KinematicSeries) -> QualityAnalysis {
        let (smoothness_score, peak_jerk_at) = self.smoothness(series);

        QualityAnalysis {
            metrics: MovementMetrics {
                smoothness_score,
                accuracy_score: self.accuracy(series),
                energy_score: self.energy(series),
                form_score: self.form(series),
            },
            peak_jerk_at,
        }
    }

    /// Inverse of mean jerk magnitude; 1.0 when jerk is entirely absent
    /// (too little data to penalize).
    fn smoothness(&self, series: &KinematicSeries) -> (f64, Option<f64>) {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut peak = (0.0f64, None);

        for joint in &series.joints {
            for (i, mag) in joint.jerk_magnitudes() {
                sum += mag;
                count += 1;
                if mag > peak.0 {
                    peak = (mag, Some(series.timestamps[i]));
                }
            }
        }

        if count == 0 {
            return (1.0, None);
        }

        let mean_jerk = sum / count as f64;
        let score = 1.0 / (1.0 + mean_jerk / self.config.jerk_reference);
        (score.clamp(0.0, 1.0), peak.1)
    }

    /// Consistency of speed across joints and frames: inverse of the
    /// coefficient of variation. Defaults to 1.0 with fewer than two speed
    /// samples, or when the motion is essentially still.
    fn accuracy(&self, series: &KinematicSeries) -> f64 {
        let speeds = speed_samples(series);
        if speeds.len() < 2 {
            return 1.0;
        }

        let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
        if mean < 1e-9 {
            return 1.0;
        }

        let variance =
            speeds.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / speeds.len() as f64;
        let cv = variance.sqrt() / mean;
        (1.0 / (1.0 + cv)).clamp(0.0, 1.0)
    }

    /// Mean speed mapped so that `speed_reference` lands at 0.5: typical
    /// motion sits mid-range instead of pinning either bound.
    fn energy(&self, series: &KinematicSeries) -> f64 {
        let speeds = speed_samples(series);
        if speeds.is_empty() {
            return ENERGY_DEFAULT;
        }

        let mean = speeds.iter().sum::<f64>() / speeds.len() as f64;
        (mean / (mean + self.config.speed_reference)).clamp(0.0, 1.0)
    }

    /// Postural consistency from relative keypoint geometry, blended with
    /// detection confidence.
    ///
    /// For each frame with at least three detected keypoints, every
    /// joint's distance to the frame centroid is recorded; a stable
    /// posture keeps those distances steady over time. Joints with fewer
    /// than two samples carry no signal, and if none qualifies the score
    /// falls back to a neutral-high default; sparse detections must not
    /// read as bad form.
    fn form(&self, series: &KinematicSeries) -> f64 {
        let mut distances: Vec<Vec<f64>> = vec![Vec::new(); series.joint_count()];

        for i in 0..series.frame_count() {
            let present: Vec<(usize, Vector3<f64>)> = series
                .joints
                .iter()
                .enumerate()
                .filter_map(|(j, joint)| joint.positions[i].map(|p| (j, p)))
                .collect();
            if present.len() < 3 {
                continue;
            }

            let centroid = present
                .iter()
                .fold(Vector3::zeros(), |acc, (_, p)| acc + p)
                / present.len() as f64;
            for (j, p) in present {
                distances[j].push((p - centroid).norm());
            }
        }

        let mut cv_sum = 0.0;
        let mut cv_count = 0usize;
        for dists in &distances {
            if dists.len() < 2 {
                continue;
            }
            let mean = dists.iter().sum::<f64>() / dists.len() as f64;
            if mean < 1e-9 {
                continue;
            }
            let variance =
                dists.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / dists.len() as f64;
            cv_sum += variance.sqrt() / mean;
            cv_count += 1;
        }

        if cv_count == 0 {
            return FORM_DEFAULT;
        }

        let mean_cv = cv_sum / cv_count as f64;
        let stability = 1.0 / (1.0 + mean_cv / self.config.form_cv_reference);

        // Absent confidence means the detection is fully trusted.
        let mut conf_sum = 0.0;
        let mut conf_count = 0usize;
        for joint in &series.joints {
            for conf in joint.confidences.iter().flatten() {
                conf_sum += conf;
                conf_count += 1;
            }
        }
        let confidence = if conf_count == 0 {
            1.0
        } else {
            conf_sum / conf_count as f64
        };

        (FORM_STABILITY_WEIGHT * stability + (1.0 - FORM_STABILITY_WEIGHT) * confidence)
            .clamp(0.0, 1.0)
    }
}

/// Every defined speed sample across joints and frames.
fn speed_samples(series: &KinematicSeries) -> Vec<f64> {
    series
        .joints
        .iter()
        .flat_map(|joint| (0..joint.velocities.len()).filter_map(|i| joint.speed(i)))
        .collect()
}
