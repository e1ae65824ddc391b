//! Analysis configuration: scoring weights and decision thresholds.
//!
//! Everything tunable about the engine lives here and is passed into the
//! analyzer explicitly, so behavior is reproducible without process-wide
//! setup. Defaults are the shipped policy; deployments override them via a
//! config file or `GROOVE_*` environment variables.

use groove_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Complete engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Aggregation weights over the six sub-scores.
    pub weights: ScoreWeights,

    /// Beat detection and grid alignment parameters.
    pub timing: TimingConfig,

    /// Normalization references for the movement-quality scores.
    pub quality: QualityConfig,

    /// Feedback rule thresholds.
    pub feedback: FeedbackThresholds,
}

/// Weights applied to (sync, on-beat, smoothness, accuracy, energy, form).
///
/// Must sum to 1. The defaults keep the historical 0.25 timing share,
/// split between grid alignment and the on-beat fraction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub sync: f64,
    pub on_beat: f64,
    pub smoothness: f64,
    pub accuracy: f64,
    pub energy: f64,
    pub form: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            sync: 0.20,
            on_beat: 0.05,
            smoothness: 0.20,
            accuracy: 0.25,
            energy: 0.15,
            form: 0.15,
        }
    }
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.sync + self.on_beat + self.smoothness + self.accuracy + self.energy + self.form
    }
}

/// Beat detection and grid alignment parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Energy percentile a sample must exceed to qualify as a movement
    /// beat, in [0, 100]. Keeps noise ripples out of the beat list.
    pub peak_floor_percentile: f64,

    /// Minimum spacing between accepted beats, in seconds.
    pub min_peak_spacing_s: f64,

    /// On-beat tolerance as a fraction of the beat interval.
    pub on_beat_tolerance_ratio: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            peak_floor_percentile: 75.0,
            min_peak_spacing_s: 0.2,
            on_beat_tolerance_ratio: 0.125,
        }
    }
}

/// Normalization references for the movement-quality scores.
///
/// Coordinates are unit-agnostic, so these references define what "typical"
/// motion looks like in the chosen unit; the defaults are calibrated for
/// normalized screen coordinates at common capture rates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Mean jerk magnitude (units/s³) that halves the smoothness score.
    pub jerk_reference: f64,

    /// Mean speed (units/s) that lands the energy score at 0.5.
    pub speed_reference: f64,

    /// Coefficient of variation of joint-to-centroid distance that halves
    /// the postural-stability component of the form score.
    pub form_cv_reference: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            jerk_reference: 500.0,
            speed_reference: 2.0,
            form_cv_reference: 0.2,
        }
    }
}

/// Thresholds for the feedback rule table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackThresholds {
    pub sync_critical: f64,
    pub sync_warning: f64,
    /// Sync score required for timing praise.
    pub sync_praise: f64,
    /// On-beat percentage additionally required for timing praise.
    pub on_beat_praise: f64,

    pub smoothness_critical: f64,
    pub smoothness_warning: f64,
    pub accuracy_critical: f64,
    pub accuracy_warning: f64,

    pub energy_low_warning: f64,
    pub energy_low_info: f64,
    pub energy_praise: f64,

    pub form_critical: f64,
    pub form_warning: f64,

    /// Overall score at or above which the general praise item fires.
    pub high_performance_score: f64,
}

impl Default for FeedbackThresholds {
    fn default() -> Self {
        Self {
            sync_critical: 0.4,
            sync_warning: 0.7,
            sync_praise: 0.9,
            on_beat_praise: 75.0,
            smoothness_critical: 0.3,
            smoothness_warning: 0.6,
            accuracy_critical: 0.35,
            accuracy_warning: 0.7,
            energy_low_warning: 0.3,
            energy_low_info: 0.5,
            energy_praise: 0.9,
            form_critical: 0.45,
            form_warning: 0.7,
            high_performance_score: 85.0,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a file, layered with `GROOVE_*` environment
    /// overrides.
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("GROOVE").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from environment variables alone.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Environment::with_prefix("GROOVE").separator("__"))
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        let cfg: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject weight tables that would silently rescale the score range.
    pub fn validate(&self) -> Result<()> {
        let sum = self.weights.sum();
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!(
                "score weights must sum to 1.0, got {sum}"
            )));
        }
        if self.timing.min_peak_spacing_s < 0.0 {
            return Err(Error::Config("min_peak_spacing_s must be >= 0".into()));
        }
        if !(0.0..=100.0).contains(&self.timing.peak_floor_percentile) {
            return Err(Error::Config(
                "peak_floor_percentile must be in [0, 100]".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = AnalysisConfig::default();
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unbalanced_weights_are_rejected() {
        let mut config = AnalysisConfig::default();
        config.weights.energy = 0.5;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let json = r#"{"quality": {"speed_reference": 4.0}}"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.quality.speed_reference, 4.0);
        assert_eq!(config.quality.jerk_reference, 500.0);
        assert_eq!(config.timing.peak_floor_percentile, 75.0);
    }
}
