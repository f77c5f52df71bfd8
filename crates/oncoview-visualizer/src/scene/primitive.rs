//! Renderer-agnostic scene primitives.

use glam::{Mat4, Quat, Vec3};
use oncoview_core::EntityId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::colorizer::Appearance;

/// Local placement of a primitive, before any animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Geometry of a primitive in its local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Axis-aligned box with full edge lengths `size`
    Box { size: Vec3 },
    Sphere { radius: f32 },
    /// Translucent shell drawn around a sphere
    Shell { radius: f32 },
    /// Cylinder along +Y centred on the origin
    Beam { radius: f32, length: f32 },
    /// Point sprites scattered inside `[-spread, spread]`
    Particles { count: u32, spread: Vec3, seed: u64 },
    /// Edges of a box with full edge lengths `size`
    Wireframe { size: Vec3 },
    /// Screen-facing text anchored at the translation
    Label { text: String },
}

impl Shape {
    /// Offsets of the points of a particle cluster, empty for other shapes.
    ///
    /// The offsets depend only on the seed, so the same scene always
    /// scatters its particles the same way.
    pub fn particle_offsets(&self) -> Vec<Vec3> {
        match self {
            Shape::Particles {
                count,
                spread,
                seed,
            } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                (0..*count)
                    .map(|_| {
                        Vec3::new(
                            rng.gen_range(-1.0..1.0),
                            rng.gen_range(-1.0..1.0),
                            rng.gen_range(-1.0..1.0),
                        ) * *spread
                    })
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

/// What a primitive stands for. Determines its layer and whether a click
/// can select it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    RegionBody,
    TumorCore,
    TumorGlow,
    RadiationField,
    RadiationBeam,
    DamageParticles,
    DamageBounds,
    Label,
}

impl Role {
    pub fn layer(&self) -> Layer {
        match self {
            Role::RegionBody => Layer::Anatomy,
            Role::TumorCore | Role::TumorGlow => Layer::Tumor,
            Role::RadiationField | Role::RadiationBeam => Layer::Radiation,
            Role::DamageParticles | Role::DamageBounds => Layer::Damage,
            Role::Label => Layer::Label,
        }
    }

    pub fn is_pickable(&self) -> bool {
        matches!(
            self,
            Role::RegionBody | Role::TumorCore | Role::RadiationField
        )
    }
}

/// Drawing layer. Overlays are the three analysis layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Layer {
    Anatomy,
    Tumor,
    Radiation,
    Damage,
    Label,
}

/// Time-driven perturbation applied on top of the static transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    Static,
    /// Scale pulse of tumor spheres
    TumorPulse,
    /// Continuous yaw and roll of radiation fields
    FieldSpin,
}

/// One drawable element of a composed scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    /// Entity this primitive represents
    pub entity: EntityId,
    pub role: Role,
    pub shape: Shape,
    pub transform: Transform,
    pub appearance: Appearance,
    /// True when the primitive belongs to an overlay that is present but
    /// not the active one
    pub dimmed: bool,
    pub motion: Motion,
}

impl Primitive {
    pub fn layer(&self) -> Layer {
        self.role.layer()
    }

    pub fn is_pickable(&self) -> bool {
        self.role.is_pickable()
    }

    pub fn label_text(&self) -> Option<&str> {
        match &self.shape {
            Shape::Label { text } => Some(text),
            _ => None,
        }
    }
}

/// Stable 64-bit seed derived from an entity id (FNV-1a).
pub fn seed_for(id: &EntityId) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    id.as_str()
        .bytes()
        .fold(OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_offsets_are_deterministic_and_bounded() {
        let shape = Shape::Particles {
            count: 12,
            spread: Vec3::new(0.2, 0.3, 0.1),
            seed: seed_for(&EntityId::from("liver")),
        };
        let a = shape.particle_offsets();
        let b = shape.particle_offsets();
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        for p in a {
            assert!(p.x.abs() <= 0.2 && p.y.abs() <= 0.3 && p.z.abs() <= 0.1);
        }
    }

    #[test]
    fn test_particle_scatter_depends_on_seed() {
        let scatter = |id: &str| {
            Shape::Particles {
                count: 4,
                spread: Vec3::ONE,
                seed: seed_for(&EntityId::from(id)),
            }
            .particle_offsets()
        };
        assert_ne!(scatter("liver"), scatter("heart"));
    }

    #[test]
    fn test_seed_differs_per_id() {
        assert_ne!(
            seed_for(&EntityId::from("liver")),
            seed_for(&EntityId::from("heart"))
        );
    }

    #[test]
    fn test_roles_map_to_layers() {
        assert_eq!(Role::TumorGlow.layer(), Layer::Tumor);
        assert_eq!(Role::RadiationBeam.layer(), Layer::Radiation);
        assert!(Role::RegionBody.is_pickable());
        assert!(!Role::Label.is_pickable());
        assert!(!Role::DamageParticles.is_pickable());
    }

    #[test]
    fn test_transform_matrix() {
        let t = Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::splat(2.0),
        };
        let p = t.matrix().transform_point3(Vec3::ONE);
        assert!(p.abs_diff_eq(Vec3::new(3.0, 4.0, 5.0), 1e-6));
    }
}
