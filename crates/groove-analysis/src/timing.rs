//! Timing analysis: movement beats against the musical beat grid.
//!
//! The movement-energy signal is the per-frame sum of joint speeds.
//! Movement beats are strict local maxima of that signal above a
//! percentile floor, spaced at least a configured interval apart. With a
//! tempo available, each beat is compared against the grid of beats
//! spaced `60 / BPM` seconds from time zero, the same absolute-time
//! anchoring clients use when they start the track at capture time zero.

use groove_core::{KinematicSeries, TimingMetrics};

use crate::config::TimingConfig;

/// Timing metrics plus the context the feedback generator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingAnalysis {
    pub metrics: TimingMetrics,
    /// Number of detected movement beats.
    pub beat_count: usize,
    /// Timestamp of the worst-aligned beat, when one exists.
    pub worst_lag_at: Option<f64>,
}

impl TimingAnalysis {
    fn neutral(beat_count: usize) -> Self {
        Self {
            metrics: TimingMetrics::neutral(),
            beat_count,
            worst_lag_at: None,
        }
    }
}

/// Compares detected movement beats against the musical grid.
#[derive(Debug, Clone)]
pub struct TimingAnalyzer {
    config: TimingConfig,
}

impl TimingAnalyzer {
    pub fn new(config: TimingConfig) -> Self {
        Self { config }
    }

    /// Produce timing metrics for a preprocessed motion.
    ///
    /// Without a positive BPM there is no grid to measure against, so the
    /// neutral defaults apply: alignment cannot be penalized
    /// (`sync_score = 1.0`) but no beat can be claimed as intentional
    /// (`on_beat_percentage = 0`). The same holds with a valid BPM but no
    /// detected beats; absence of evidence is never penalized.
    pub fn analyze(&self, series: &KinematicSeries, audio_bpm: Option<f64>) -> TimingAnalysis {
        let energy = movement_energy(series);
        let beats = self.detect_beats(&energy, &series.timestamps);

        let Some(bpm) = audio_bpm.filter(|&bpm| bpm > 0.0) else {
            return TimingAnalysis::neutral(beats.len());
        };
        if beats.is_empty() {
            return TimingAnalysis::neutral(0);
        }

        let interval = 60.0 / bpm;
        let tolerance = self.config.on_beat_tolerance_ratio * interval;

        let mut lag_sum = 0.0;
        let mut on_beat = 0usize;
        let mut worst = (0.0f64, beats[0]);
        for &t in &beats {
            // Signed distance to the nearest grid beat.
            let lag = t - (t / interval).round() * interval;
            let abs_lag = lag.abs();
            lag_sum += abs_lag;
            if abs_lag <= tolerance {
                on_beat += 1;
            }
            if abs_lag > worst.0 {
                worst = (abs_lag, t);
            }
        }

        let avg_lag = lag_sum / beats.len() as f64;
        // The nearest-beat lag tops out at half an interval, so normalize
        // by that; anything at or past a full interval would score 0 too.
        let sync_score = (1.0 - avg_lag / (0.5 * interval)).clamp(0.0, 1.0);
        let on_beat_percentage = 100.0 * on_beat as f64 / beats.len() as f64;

        TimingAnalysis {
            metrics: TimingMetrics {
                avg_lag_ms: avg_lag * 1000.0,
                sync_score,
                on_beat_percentage,
            },
            beat_count: beats.len(),
            worst_lag_at: Some(worst.1),
        }
    }

    /// Beat times: strict local energy maxima above the percentile floor,
    /// at least `min_peak_spacing_s` after the previously accepted beat.
    fn detect_beats(&self, energy: &[f64], timestamps: &[f64]) -> Vec<f64> {
        if energy.len() < 3 {
            return Vec::new();
        }

        let floor = percentile(energy, self.config.peak_floor_percentile);
        let mut beats: Vec<f64> = Vec::new();

        for i in 1..energy.len() - 1 {
            if energy[i] <= floor {
                continue;
            }
            if energy[i] <= energy[i - 1] || energy[i] <= energy[i + 1] {
                continue;
            }
            let t = timestamps[i];
            if let Some(&last) = beats.last() {
                if t - last < self.config.min_peak_spacing_s {
                    continue;
                }
            }
            beats.push(t);
        }

        beats
    }
}

/// Per-frame movement energy: sum of joint speeds, 0 where no velocity is
/// computable.
pub fn movement_energy(series: &KinematicSeries) -> Vec<f64> {
    (0..series.frame_count())
        .map(|i| {
            series
                .joints
                .iter()
                .filter_map(|joint| joint.speed(i))
                .sum()
        })
        .collect()
}

/// Nearest-rank percentile over an unsorted slice; `p` in [0, 100].
fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
