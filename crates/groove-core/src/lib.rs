//! # Groove-Core
//!
//! Core data model and trajectory preprocessing for the Groove motion
//! analysis engine: keypoint/frame/motion value types, structural
//! validation at the construction boundary, and derivation of per-joint
//! kinematic series (position, velocity, acceleration, jerk).

pub mod error;
pub mod kinematics;
pub mod types;

pub use error::{Error, Result};
pub use kinematics::*;
pub use types::*;
