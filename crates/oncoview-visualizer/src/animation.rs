//! # Animation
//!
//! Time-driven perturbations layered over a composed scene. The scene
//! itself is never modified: [`pose`] reads it and returns world matrices
//! for the requested clock value.
//!
//! All perturbations are pure functions of the accumulated clock, so
//! replaying the same deltas reproduces the same frames.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::scene::{Motion, Primitive, SceneDescription};

pub const BREATHING_RATE: f64 = 1.5;
pub const BREATHING_AMPLITUDE: f64 = 0.01;
pub const PULSE_RATE: f64 = 3.0;
pub const PULSE_AMPLITUDE: f64 = 0.1;
pub const FIELD_YAW_RATE: f64 = 0.5;
pub const FIELD_ROLL_RATE: f64 = 0.3;

/// Uniform scale applied to the whole body.
pub fn breathing_scale(t: f64) -> f32 {
    (1.0 + (t * BREATHING_RATE).sin() * BREATHING_AMPLITUDE) as f32
}

/// Scale multiplier of tumor spheres.
pub fn tumor_pulse_scale(t: f64) -> f32 {
    (1.0 + (t * PULSE_RATE).sin() * PULSE_AMPLITUDE) as f32
}

/// Spin of radiation field spheres: yaw about +Y, then roll about +Z.
pub fn field_rotation(t: f64) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        (t * FIELD_YAW_RATE) as f32,
        0.0,
        (t * FIELD_ROLL_RATE) as f32,
    )
}

/// Metadata of one advanced frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// 0-based frame index
    pub index: u64,
    /// Delta actually applied, after sanitizing and capping (seconds)
    pub dt_s: f64,
    /// Accumulated clock after this frame (seconds)
    pub time_s: f64,
}

/// Accumulates per-frame deltas into the animation clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    index: u64,
    elapsed_s: f64,
    max_delta_s: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl FrameClock {
    /// `max_delta_s` caps a single step, so a stalled tab does not make
    /// every animation jump when it resumes.
    pub fn new(max_delta_s: f64) -> Self {
        Self {
            index: 0,
            elapsed_s: 0.0,
            max_delta_s: if max_delta_s.is_finite() && max_delta_s > 0.0 {
                max_delta_s
            } else {
                f64::INFINITY
            },
        }
    }

    /// Advance by `dt_s`. Negative and non-finite deltas advance the frame
    /// index but not the clock.
    pub fn advance(&mut self, dt_s: f64) -> Frame {
        let dt = if dt_s.is_finite() && dt_s > 0.0 {
            dt_s.min(self.max_delta_s)
        } else {
            0.0
        };
        self.elapsed_s += dt;
        self.index += 1;
        Frame {
            index: self.index - 1,
            dt_s: dt,
            time_s: self.elapsed_s,
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed_s
    }

    pub fn frames(&self) -> u64 {
        self.index
    }

    pub fn max_delta(&self) -> f64 {
        self.max_delta_s
    }

    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed_s = 0.0;
    }
}

/// A primitive with its animated world matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PosedPrimitive<'a> {
    pub primitive: &'a Primitive,
    pub world: Mat4,
}

/// The scene posed at one clock value.
#[derive(Debug, Clone, PartialEq)]
pub struct PosedScene<'a> {
    pub time_s: f64,
    pub items: Vec<PosedPrimitive<'a>>,
}

/// Local matrix of `primitive` at clock `t`, before the body group scale.
pub fn local_matrix(primitive: &Primitive, t: f64) -> Mat4 {
    let base = primitive.transform;
    match primitive.motion {
        Motion::Static => base.matrix(),
        Motion::TumorPulse => Mat4::from_scale_rotation_translation(
            base.scale * tumor_pulse_scale(t),
            base.rotation,
            base.translation,
        ),
        Motion::FieldSpin => Mat4::from_scale_rotation_translation(
            base.scale,
            field_rotation(t) * base.rotation,
            base.translation,
        ),
    }
}

/// Pose every primitive of `scene` at clock `t`.
///
/// The breathing scale is applied to the whole body about the origin, so
/// overlays stay attached to the regions they mark.
pub fn pose(scene: &SceneDescription, t: f64) -> PosedScene<'_> {
    let group = Mat4::from_scale(Vec3::splat(breathing_scale(t)));
    PosedScene {
        time_s: t,
        items: scene
            .iter()
            .map(|primitive| PosedPrimitive {
                primitive,
                world: group * local_matrix(primitive, t),
            })
            .collect(),
    }
}
