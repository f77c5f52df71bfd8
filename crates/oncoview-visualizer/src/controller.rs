//! Orbit camera controller with drag, wheel zoom, inertia and auto-rotate.
//!
//! Pointer handlers write camera state immediately; [`OrbitController::update`]
//! runs once per frame to apply inertia and auto-rotation.

use glam::{Vec2, Vec3};
use oncoview_core::ValidationError;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;
use crate::picking::Ray;

/// Tunables of the orbit controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub min_distance: f32,
    pub max_distance: f32,
    pub initial_distance: f32,
    pub initial_yaw_deg: f32,
    pub initial_pitch_deg: f32,
    pub target: Vec3,
    pub fov_deg: f32,
    /// Radians of orbit per pixel of drag
    pub rotate_speed: f32,
    pub pan_speed: f32,
    /// Exponential zoom per wheel unit
    pub zoom_speed: f32,
    /// Inertia decay rate (1/s)
    pub damping: f32,
    /// Radians per second while auto-rotate is on
    pub auto_rotate_speed: f32,
    /// Pointer travel below which a press and release count as a click
    pub click_slop_px: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            min_distance: 2.0,
            max_distance: 15.0,
            initial_distance: 6.0,
            initial_yaw_deg: 0.0,
            initial_pitch_deg: 10.0,
            target: Vec3::new(0.0, 1.2, 0.0),
            fov_deg: 50.0,
            rotate_speed: 0.005,
            pan_speed: 1.0,
            zoom_speed: 0.001,
            damping: 3.0,
            auto_rotate_speed: 0.25,
            click_slop_px: 4.0,
        }
    }
}

impl OrbitConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const OWNER: &str = "camera";
        ValidationError::check_positive(OWNER, "min_distance", self.min_distance)?;
        if self.max_distance.is_nan() || self.max_distance < self.min_distance {
            return Err(ValidationError::Other {
                message: format!(
                    "camera: max_distance {} is below min_distance {}",
                    self.max_distance, self.min_distance
                ),
            });
        }
        ValidationError::check_range(
            OWNER,
            "initial_distance",
            self.initial_distance,
            self.min_distance,
            self.max_distance,
            "[min_distance, max_distance]",
        )?;
        ValidationError::check_range(OWNER, "fov_deg", self.fov_deg, 1.0, 179.0, "[1, 179]")?;
        for (field, value) in [
            ("rotate_speed", self.rotate_speed),
            ("pan_speed", self.pan_speed),
            ("zoom_speed", self.zoom_speed),
            ("damping", self.damping),
            ("auto_rotate_speed", self.auto_rotate_speed),
            ("click_slop_px", self.click_slop_px),
        ] {
            ValidationError::check_range(OWNER, field, value, 0.0, f32::MAX, "[0, inf)")?;
        }
        Ok(())
    }

    fn camera(&self) -> Camera {
        let mut camera = Camera {
            target: self.target,
            fov: self.fov_deg,
            min_distance: self.min_distance,
            max_distance: self.max_distance,
            ..Camera::default()
        };
        camera.set_distance(self.initial_distance);
        camera.set_view(self.initial_yaw_deg, self.initial_pitch_deg);
        camera
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragMode {
    Rotate,
    Pan,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    mode: DragMode,
    last: Vec2,
    travelled: f32,
}

/// Residual angular speed below which inertia stops.
const VELOCITY_THRESHOLD: f32 = 1e-3;

/// What a pointer release amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Release {
    /// Press and release without meaningful movement
    Click(Vec2),
    /// End of a rotate or pan drag
    DragEnd,
    /// Release without a matching press
    Ignored,
}

#[derive(Debug, Clone)]
pub struct OrbitController {
    camera: Camera,
    config: OrbitConfig,
    viewport: Vec2,
    drag: Option<Drag>,
    /// (yaw, pitch) in rad/s
    velocity: Vec2,
    /// Rotation applied by pointer moves since the last update
    pending: Vec2,
}

impl OrbitController {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            camera: config.camera(),
            config,
            viewport: Vec2::new(1.0, 1.0),
            drag: None,
            velocity: Vec2::ZERO,
            pending: Vec2::ZERO,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.viewport = Vec2::new(width, height);
            self.camera.update_aspect_ratio(width, height);
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn has_inertia(&self) -> bool {
        self.velocity != Vec2::ZERO
    }

    /// Start a drag. The primary button orbits, the others pan.
    pub fn pointer_down(&mut self, pos: Vec2, button: PointerButton) {
        self.velocity = Vec2::ZERO;
        self.pending = Vec2::ZERO;
        self.drag = Some(Drag {
            mode: match button {
                PointerButton::Primary => DragMode::Rotate,
                PointerButton::Secondary | PointerButton::Middle => DragMode::Pan,
            },
            last: pos,
            travelled: 0.0,
        });
    }

    pub fn pointer_move(&mut self, pos: Vec2) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let delta = pos - drag.last;
        drag.last = pos;
        drag.travelled += delta.length();

        match drag.mode {
            DragMode::Rotate => {
                let rotation = Vec2::new(-delta.x, delta.y) * self.config.rotate_speed;
                self.camera.orbit(rotation.x, rotation.y);
                self.pending += rotation;
            }
            DragMode::Pan => {
                self.camera
                    .pan(delta.x * self.config.pan_speed, delta.y * self.config.pan_speed);
            }
        }
    }

    pub fn pointer_up(&mut self, pos: Vec2) -> Release {
        let Some(drag) = self.drag.take() else {
            return Release::Ignored;
        };
        let travelled = drag.travelled + (pos - drag.last).length();
        if travelled <= self.config.click_slop_px {
            self.velocity = Vec2::ZERO;
            Release::Click(pos)
        } else {
            Release::DragEnd
        }
    }

    /// Zoom by a wheel delta; positive deltas move the camera away.
    pub fn wheel(&mut self, delta_y: f32) {
        if delta_y.is_finite() {
            self.camera.dolly((delta_y * self.config.zoom_speed).exp());
        }
    }

    /// Advance inertia and auto-rotation by `dt` seconds.
    ///
    /// Auto-rotation is suspended while a drag is in progress and resumes
    /// once the pointer is released.
    pub fn update(&mut self, dt: f32, auto_rotate: bool) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        if self.drag.is_some() {
            self.velocity = self.pending / dt;
            self.pending = Vec2::ZERO;
            return;
        }

        if self.has_inertia() {
            let step = self.velocity * dt;
            self.camera.orbit(step.x, step.y);
            self.velocity *= (-self.config.damping * dt).exp();
            if self.velocity.length() < VELOCITY_THRESHOLD {
                self.velocity = Vec2::ZERO;
            }
        }

        if auto_rotate {
            self.camera.orbit(self.config.auto_rotate_speed * dt, 0.0);
        }
    }

    /// World ray through a viewport pixel.
    pub fn screen_ray(&self, pos: Vec2) -> Option<Ray> {
        self.camera
            .screen_ray(pos.x, pos.y, self.viewport.x, self.viewport.y)
    }

    pub fn fit_to_bounds(&mut self, min: Vec3, max: Vec3) {
        self.camera.fit_to_bounds(min, max);
    }

    /// Back to the configured initial view, keeping the viewport.
    pub fn reset(&mut self) {
        let aspect = self.camera.aspect_ratio;
        self.camera = self.config.camera();
        self.camera.aspect_ratio = aspect;
        self.drag = None;
        self.velocity = Vec2::ZERO;
        self.pending = Vec2::ZERO;
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(OrbitConfig::default())
    }
}
