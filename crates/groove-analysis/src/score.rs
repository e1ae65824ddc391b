//! Weighted aggregation of sub-scores into the overall 0–100 score.

use groove_core::{MovementMetrics, TimingMetrics};

use crate::config::ScoreWeights;

/// Combine the six sub-scores into an overall score in [0, 100].
///
/// Pure function of its inputs: the on-beat percentage is normalized to
/// [0, 1], each sub-score is multiplied by its configured weight, and the
/// weighted sum is scaled to the 0–100 range and clamped.
pub fn overall_score(
    weights: &ScoreWeights,
    timing: &TimingMetrics,
    movement: &MovementMetrics,
) -> f64 {
    let weighted = weights.sync * timing.sync_score
        + weights.on_beat * (timing.on_beat_percentage / 100.0)
        + weights.smoothness * movement.smoothness_score
        + weights.accuracy * movement.accuracy_score
        + weights.energy * movement.energy_score
        + weights.form * movement.form_score;

    (weighted * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(s: f64) -> MovementMetrics {
        MovementMetrics {
            smoothness_score: s,
            accuracy_score: s,
            energy_score: s,
            form_score: s,
        }
    }

    #[test]
    fn test_perfect_subscores_reach_one_hundred() {
        let timing = TimingMetrics {
            avg_lag_ms: 0.0,
            sync_score: 1.0,
            on_beat_percentage: 100.0,
        };
        let score = overall_score(&ScoreWeights::default(), &timing, &movement(1.0));
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_subscores_reach_zero() {
        let timing = TimingMetrics {
            avg_lag_ms: 500.0,
            sync_score: 0.0,
            on_beat_percentage: 0.0,
        };
        let score = overall_score(&ScoreWeights::default(), &timing, &movement(0.0));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_weighted_sum_matches_hand_computation() {
        let timing = TimingMetrics {
            avg_lag_ms: 50.0,
            sync_score: 0.8,
            on_beat_percentage: 60.0,
        };
        let m = MovementMetrics {
            smoothness_score: 0.9,
            accuracy_score: 0.7,
            energy_score: 0.5,
            form_score: 0.6,
        };
        let w = ScoreWeights::default();
        let expected = (w.sync * 0.8
            + w.on_beat * 0.6
            + w.smoothness * 0.9
            + w.accuracy * 0.7
            + w.energy * 0.5
            + w.form * 0.6)
            * 100.0;
        assert!((overall_score(&w, &timing, &m) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_score_stays_in_bounds() {
        let timing = TimingMetrics {
            avg_lag_ms: 0.0,
            sync_score: 1.0,
            on_beat_percentage: 100.0,
        };
        // Sub-scores are contractually in [0, 1]; even so the aggregate
        // clamps rather than trusting arithmetic at the boundary.
        let score = overall_score(&ScoreWeights::default(), &timing, &movement(1.0));
        assert!((0.0..=100.0).contains(&score));
    }
}
