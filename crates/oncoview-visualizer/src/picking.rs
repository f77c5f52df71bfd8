//! # Picking
//!
//! Ray tests against the pickable primitives of a composed scene.
//!
//! Ordering contract:
//! - the closest hit along the ray wins;
//! - on equal distance the primitive earlier in scene order wins.
//!
//! Hits are computed against the static transforms of the scene. The
//! animated perturbations are small enough that a click lands on what the
//! user sees.

use glam::Vec3;
use oncoview_core::EntityId;

use crate::scene::{Primitive, Role, SceneDescription, Shape};

/// A ray with a unit-length direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    /// `None` when `dir` has no length or either vector is not finite.
    pub fn new(origin: Vec3, dir: Vec3) -> Option<Self> {
        if !origin.is_finite() || !dir.is_finite() {
            return None;
        }
        let dir = dir.try_normalize()?;
        Some(Self { origin, dir })
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub role: Role,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickOptions {
    pub max_distance: f32,
    /// Primitives fainter than this cannot be picked. Region bodies are
    /// judged before the opacity slider is applied.
    pub min_opacity: f32,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e4,
            min_opacity: 0.25,
        }
    }
}

/// Nearest pickable primitive hit by `ray`.
pub fn pick_ray(scene: &SceneDescription, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let mut best: Option<(f32, &Primitive)> = None;

    for primitive in scene.iter() {
        if !primitive.is_pickable() || scene.unscaled_opacity(primitive) < opts.min_opacity {
            continue;
        }
        let Some(t) = hit_distance(primitive, &ray) else {
            continue;
        };
        if t > opts.max_distance {
            continue;
        }
        // strict comparison keeps the earlier primitive on ties
        if best.map_or(true, |(bt, _)| t < bt) {
            best = Some((t, primitive));
        }
    }

    let (t, primitive) = best?;
    Some(PickHit {
        entity: primitive.entity.clone(),
        role: primitive.role,
        distance: t,
        point: ray.at(t),
    })
}

fn hit_distance(primitive: &Primitive, ray: &Ray) -> Option<f32> {
    let transform = &primitive.transform;
    match &primitive.shape {
        Shape::Box { size } => {
            let half = *size * transform.scale * 0.5;
            ray_aabb(ray, transform.translation - half, transform.translation + half)
        }
        Shape::Sphere { radius } => ray_sphere(
            ray,
            transform.translation,
            radius * transform.scale.max_element(),
        ),
        _ => None,
    }
}

/// Entry distance of `ray` into the box, `0` when the origin is inside.
pub fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = ray.origin[axis];
        let d = ray.dir[axis];
        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t1 = (min[axis] - o) * inv;
        let mut t2 = (max[axis] - o) * inv;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_max < t_min {
            return None;
        }
    }
    Some(t_min)
}

/// First non-negative intersection of `ray` with the sphere.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = -b - root;
    let far = -b + root;
    if far < 0.0 {
        None
    } else {
        Some(near.max(0.0))
    }
}
