//! # Groove-Analysis
//!
//! Motion analysis engine: scores a captured dance performance against an
//! optional musical tempo and generates coaching feedback.
//!
//! ## Pipeline
//!
//! 1. **Preprocessing** (groove-core): per-joint kinematic series.
//! 2. **Timing**: movement beats vs the musical beat grid.
//! 3. **Quality**: smoothness, accuracy, energy, form sub-scores.
//! 4. **Aggregation**: weighted overall score in [0, 100].
//! 5. **Feedback**: categorized, severity-ranked coaching messages.
//!
//! Timing and quality run independently over the same series; both feed
//! the aggregator and the feedback generator. Every stage is a pure
//! computation parameterized by [`AnalysisConfig`]: no I/O, no hidden
//! state, deterministic output for identical input.

pub mod analyzer;
pub mod config;
pub mod feedback;
pub mod quality;
pub mod score;
pub mod timing;

pub use analyzer::*;
pub use config::*;
pub use feedback::*;
pub use quality::*;
pub use score::*;
pub use timing::*;
