use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::picking::Ray;

/// Orbit camera around a target point, Y-up.
///
/// The eye sits on a sphere of radius `distance` around `target`; `yaw`
/// turns about +Y and `pitch` lifts toward +Y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub target: Vec3,
    pub distance: f32,
    pub yaw: f32,   // radians
    pub pitch: f32, // radians
    pub fov: f32,   // degrees
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Pitch limit that keeps the view matrix away from the poles.
pub const PITCH_LIMIT_DEG: f32 = 85.0;

impl Default for Camera {
    fn default() -> Self {
        Self {
            target: Vec3::new(0.0, 1.2, 0.0),
            distance: 6.0,
            yaw: 0.0,
            pitch: 10.0f32.to_radians(),
            fov: 50.0,
            aspect_ratio: 1.0,
            near: 0.1,
            far: 100.0,
            min_distance: 2.0,
            max_distance: 15.0,
        }
    }
}

impl Camera {
    pub fn new(target: Vec3, distance: f32) -> Self {
        let mut camera = Self {
            target,
            ..Default::default()
        };
        camera.set_distance(distance);
        camera
    }

    pub fn update_aspect_ratio(&mut self, width: f32, height: f32) {
        if width > 0.0 && height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        let limit = PITCH_LIMIT_DEG.to_radians();
        self.pitch = (self.pitch + delta_pitch).clamp(-limit, limit);
    }

    /// Set the distance, clamped to `[min_distance, max_distance]`.
    pub fn set_distance(&mut self, distance: f32) {
        if distance.is_finite() {
            self.distance = distance.clamp(self.min_distance, self.max_distance);
        }
    }

    /// Multiply the distance by `factor`. Factors above 1 zoom out.
    pub fn dolly(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.set_distance(self.distance * factor);
        }
    }

    /// Move the target in the view plane. Deltas are in pixels.
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        let forward = (self.target - self.eye_position()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward).normalize_or_zero();

        let scale = self.distance * 0.002;
        self.target -= right * delta_x * scale;
        self.target += up * delta_y * scale;
    }

    pub fn eye_position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let offset = Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw);
        self.target + offset * self.distance
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye_position(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_view(&mut self, yaw_deg: f32, pitch_deg: f32) {
        self.yaw = 0.0;
        self.pitch = 0.0;
        self.orbit(yaw_deg.to_radians(), pitch_deg.to_radians());
    }

    /// Centre on the box and back off until it fits the field of view.
    pub fn fit_to_bounds(&mut self, min: Vec3, max: Vec3) {
        let center = (min + max) * 0.5;
        let max_dim = (max - min).max_element();
        self.target = center;

        let half_fov = self.fov.to_radians() / 2.0;
        self.set_distance((max_dim * 0.6) / half_fov.tan());
    }

    /// World-space ray through a pixel. `(0, 0)` is the top-left corner.
    pub fn screen_ray(&self, x: f32, y: f32, width: f32, height: f32) -> Option<Ray> {
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(2.0 * x / width - 1.0, 1.0 - 2.0 * y / height);
        let inverse = self.view_projection().inverse();

        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        if near.w.abs() < f32::EPSILON || far.w.abs() < f32::EPSILON {
            return None;
        }
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;

        Ray::new(near, far - near)
    }

    /// Pixel position of a world point, or `None` behind the camera.
    pub fn project(&self, point: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
        ))
    }
}
