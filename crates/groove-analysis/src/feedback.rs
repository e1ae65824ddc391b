//! Coaching feedback generation from the computed metrics.
//!
//! An ordered threshold-rule table per category; within a category the
//! first (most severe) triggered rule wins, so a single invocation never
//! emits redundant or contradictory messages for the same concern. A
//! category with nothing to say stays silent; not every call must
//! criticize. Messages are fixed templates with live metric values
//! interpolated.

use groove_core::{FeedbackCategory, FeedbackItem, Severity};

use crate::config::FeedbackThresholds;
use crate::quality::QualityAnalysis;
use crate::timing::TimingAnalysis;

/// Maps metrics to categorized, severity-ranked coaching messages.
#[derive(Debug, Clone)]
pub struct FeedbackGenerator {
    thresholds: FeedbackThresholds,
}

impl FeedbackGenerator {
    pub fn new(thresholds: FeedbackThresholds) -> Self {
        Self { thresholds }
    }

    /// Produce the feedback list, most severe first. Stable within a
    /// severity tier, so categories keep their fixed order there.
    pub fn generate(
        &self,
        timing: &TimingAnalysis,
        quality: &QualityAnalysis,
        overall_score: f64,
    ) -> Vec<FeedbackItem> {
        let mut items: Vec<FeedbackItem> = [
            self.timing_item(timing),
            self.movement_item(quality),
            self.energy_item(quality),
            self.form_item(quality),
            self.general_item(overall_score),
        ]
        .into_iter()
        .flatten()
        .collect();

        items.sort_by_key(|item| std::cmp::Reverse(item.severity.rank()));
        items
    }

    fn timing_item(&self, timing: &TimingAnalysis) -> Option<FeedbackItem> {
        let metrics = &timing.metrics;
        if metrics.sync_score < self.thresholds.sync_critical {
            return Some(FeedbackItem {
                category: FeedbackCategory::Timing,
                message: format!(
                    "Your timing is way off the beat. Only {:.1}% of your moves land on time.",
                    metrics.on_beat_percentage
                ),
                severity: Severity::Critical,
                timestamp: timing.worst_lag_at,
            });
        }
        if metrics.sync_score < self.thresholds.sync_warning {
            return Some(FeedbackItem {
                category: FeedbackCategory::Timing,
                message: format!(
                    "Your timing is off. Try to sync your movements with the beat. \
                     You're hitting {:.1}% of beats on time.",
                    metrics.on_beat_percentage
                ),
                severity: Severity::Warning,
                timestamp: timing.worst_lag_at,
            });
        }
        // Praise needs evidence: a high sync score alone also appears when
        // no tempo was given, so require the on-beat fraction too.
        if metrics.sync_score >= self.thresholds.sync_praise
            && metrics.on_beat_percentage >= self.thresholds.on_beat_praise
        {
            return Some(FeedbackItem {
                category: FeedbackCategory::Timing,
                message: "Excellent timing! You're locked in with the music.".to_string(),
                severity: Severity::Info,
                timestamp: None,
            });
        }
        None
    }

    fn movement_item(&self, quality: &QualityAnalysis) -> Option<FeedbackItem> {
        let metrics = &quality.metrics;
        if metrics.smoothness_score < self.thresholds.smoothness_critical {
            return Some(FeedbackItem {
                category: FeedbackCategory::Movement,
                message: "Your movements are very jerky. Slow down and focus on flowing \
                          between positions."
                    .to_string(),
                severity: Severity::Critical,
                timestamp: quality.peak_jerk_at,
            });
        }
        if metrics.accuracy_score < self.thresholds.accuracy_critical {
            return Some(FeedbackItem {
                category: FeedbackCategory::Movement,
                message: "Your movements are highly inconsistent. Practice the routine at \
                          a slower tempo first."
                    .to_string(),
                severity: Severity::Critical,
                timestamp: None,
            });
        }
        if metrics.smoothness_score < self.thresholds.smoothness_warning {
            return Some(FeedbackItem {
                category: FeedbackCategory::Movement,
                message: "Your movements are a bit jerky. Focus on flowing smoothly between \
                          positions."
                    .to_string(),
                severity: Severity::Warning,
                timestamp: quality.peak_jerk_at,
            });
        }
        if metrics.accuracy_score < self.thresholds.accuracy_warning {
            return Some(FeedbackItem {
                category: FeedbackCategory::Movement,
                message: "Your movements are inconsistent. Try to keep your pace steady \
                          through the routine."
                    .to_string(),
                severity: Severity::Warning,
                timestamp: None,
            });
        }
        None
    }

    fn energy_item(&self, quality: &QualityAnalysis) -> Option<FeedbackItem> {
        let energy = quality.metrics.energy_score;
        if energy < self.thresholds.energy_low_warning {
            return Some(FeedbackItem {
                category: FeedbackCategory::Energy,
                message: "Put more energy into your movements! Go bigger and stronger."
                    .to_string(),
                severity: Severity::Warning,
                timestamp: None,
            });
        }
        if energy < self.thresholds.energy_low_info {
            return Some(FeedbackItem {
                category: FeedbackCategory::Energy,
                message: "A little more energy would lift this performance.".to_string(),
                severity: Severity::Info,
                timestamp: None,
            });
        }
        if energy > self.thresholds.energy_praise {
            return Some(FeedbackItem {
                category: FeedbackCategory::Energy,
                message: "Great energy! Keep up that intensity.".to_string(),
                severity: Severity::Info,
                timestamp: None,
            });
        }
        None
    }

    fn form_item(&self, quality: &QualityAnalysis) -> Option<FeedbackItem> {
        let form = quality.metrics.form_score;
        if form < self.thresholds.form_critical {
            return Some(FeedbackItem {
                category: FeedbackCategory::Form,
                message: "Your posture is breaking down. Reset your alignment and keep your \
                          core engaged."
                    .to_string(),
                severity: Severity::Critical,
                timestamp: None,
            });
        }
        if form < self.thresholds.form_warning {
            return Some(FeedbackItem {
                category: FeedbackCategory::Form,
                message: "Pay attention to your posture and alignment. Keep your core engaged."
                    .to_string(),
                severity: Severity::Warning,
                timestamp: None,
            });
        }
        None
    }

    fn general_item(&self, overall_score: f64) -> Option<FeedbackItem> {
        if overall_score >= self.thresholds.high_performance_score {
            return Some(FeedbackItem {
                category: FeedbackCategory::General,
                message: "Outstanding performance! All metrics look great.".to_string(),
                severity: Severity::Info,
                timestamp: None,
            });
        }
        None
    }
}
