//! Trajectory preprocessing: per-joint kinematic series derivation.
//!
//! Turns a [`Motion`] into per-joint time series of position, velocity,
//! acceleration and jerk by successive backward finite differences. A
//! derived sample exists only when both operands exist and the time step
//! is positive; gaps (missing detections, zero-length steps) stay gaps
//! all the way down the derivative chain instead of reading as zero
//! motion.

use nalgebra::Vector3;

use crate::types::Motion;

/// Kinematic series for a single joint, index-aligned with the motion's
/// frames.
///
/// Entry `i` of each vector corresponds to frame `i`. By construction the
/// first entry of `velocities` is `None`, the first two of `accelerations`,
/// and the first three of `jerks`: a derivative needs that many preceding
/// samples.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSeries {
    pub positions: Vec<Option<Vector3<f64>>>,
    /// Detection confidence per frame; `None` where the joint is absent or
    /// the upstream estimator reported no confidence (fully trusted).
    pub confidences: Vec<Option<f64>>,
    pub velocities: Vec<Option<Vector3<f64>>>,
    pub accelerations: Vec<Option<Vector3<f64>>>,
    pub jerks: Vec<Option<Vector3<f64>>>,
}

impl JointSeries {
    /// Speed (velocity magnitude) at frame `i`, when defined.
    pub fn speed(&self, i: usize) -> Option<f64> {
        self.velocities.get(i).copied().flatten().map(|v| v.norm())
    }

    /// Jerk magnitudes paired with their frame index, gaps skipped.
    pub fn jerk_magnitudes(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.jerks
            .iter()
            .enumerate()
            .filter_map(|(i, j)| j.map(|j| (i, j.norm())))
    }
}

/// Per-joint kinematic series for a whole motion.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicSeries {
    /// Frame timestamps, in seconds, in capture order.
    pub timestamps: Vec<f64>,
    /// One series per joint index present in at least one frame.
    pub joints: Vec<JointSeries>,
}

impl KinematicSeries {
    /// Derive kinematics for every joint index present in at least one
    /// frame.
    ///
    /// Zero frames yield an empty series; a single frame yields positions
    /// with no derivatives. Neither is an error.
    pub fn from_motion(motion: &Motion) -> Self {
        let timestamps: Vec<f64> = motion.frames.iter().map(|f| f.timestamp).collect();
        let joint_count = motion
            .frames
            .iter()
            .map(|f| f.keypoints.len())
            .max()
            .unwrap_or(0);

        let joints = (0..joint_count)
            .map(|j| {
                let positions: Vec<Option<Vector3<f64>>> = motion
                    .frames
                    .iter()
                    .map(|f| f.keypoint(j).map(|kp| kp.position()))
                    .collect();
                let confidences = motion
                    .frames
                    .iter()
                    .map(|f| f.keypoint(j).and_then(|kp| kp.confidence))
                    .collect();

                let velocities = finite_difference(&positions, &timestamps);
                let accelerations = finite_difference(&velocities, &timestamps);
                let jerks = finite_difference(&accelerations, &timestamps);

                JointSeries {
                    positions,
                    confidences,
                    velocities,
                    accelerations,
                    jerks,
                }
            })
            .collect();

        Self { timestamps, joints }
    }

    pub fn frame_count(&self) -> usize {
        self.timestamps.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

/// Backward finite difference over an optionally-gapped series.
///
/// `out[i] = (s[i] - s[i-1]) / dt` only when both samples exist and
/// `dt > 0`; a zero or negative time delta is a zero-length step and the
/// derived sample stays absent rather than dividing by it.
fn finite_difference(
    samples: &[Option<Vector3<f64>>],
    timestamps: &[f64],
) -> Vec<Option<Vector3<f64>>> {
    let mut out = vec![None; samples.len()];
    for i in 1..samples.len() {
        if let (Some(prev), Some(curr)) = (samples[i - 1], samples[i]) {
            let dt = timestamps[i] - timestamps[i - 1];
            if dt > 0.0 {
                out[i] = Some((curr - prev) / dt);
            }
        }
    }
    out
}
