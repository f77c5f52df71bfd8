//! # Scene Composer
//!
//! Turns the entity model and the view state into a flat, ordered
//! [`SceneDescription`]. Composition is a pure function: the same model,
//! view state and colorizer configuration always produce the same scene.

use glam::Vec3;
use oncoview_core::{
    AnalysisMode, AnatomicalRegion, EntityId, EntityModel, EntityRef, RadiationSample, Rgb, Tumor,
    ViewState,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::primitive::{seed_for, Layer, Motion, Primitive, Role, Shape, Transform};
use crate::colorizer::{self, Appearance, ColorizerConfig};

/// Length of the beam drawn above each radiation field
pub const BEAM_LENGTH: f32 = 1.5;
const BEAM_RADIUS: f32 = 0.02;
const LABEL_CLEARANCE: f32 = 0.15;

/// How an overlay layer takes part in the scene for a given mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Active,
    Dim,
    Absent,
}

/// The mode dispatch table: which overlays appear, and how, for each mode.
///
/// Tumor spheres stay in the scene as dim context outside tumor mode;
/// radiation and damage overlays exist only in their own mode.
pub fn overlay_presence(mode: AnalysisMode, layer: Layer) -> Presence {
    match (layer, mode) {
        (Layer::Anatomy | Layer::Label, _) => Presence::Active,
        (Layer::Tumor, AnalysisMode::Tumor) => Presence::Active,
        (Layer::Tumor, AnalysisMode::Radiation | AnalysisMode::Damage) => Presence::Dim,
        (Layer::Radiation, AnalysisMode::Radiation) => Presence::Active,
        (Layer::Damage, AnalysisMode::Damage) => Presence::Active,
        (Layer::Radiation | Layer::Damage, _) => Presence::Absent,
    }
}

/// Flat, ordered list of primitives for one composition.
///
/// Order: region bodies, tumor overlay, radiation overlay, damage overlay,
/// labels. Within each group entities follow model order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub mode: AnalysisMode,
    /// Opacity slider factor baked into region bodies
    pub opacity_scale: f32,
    pub primitives: Vec<Primitive>,
}

impl SceneDescription {
    /// Opacity of `primitive` without the slider factor.
    pub fn unscaled_opacity(&self, primitive: &Primitive) -> f32 {
        match primitive.role {
            Role::RegionBody if self.opacity_scale > 0.0 => {
                (primitive.appearance.opacity / self.opacity_scale).min(1.0)
            }
            _ => primitive.appearance.opacity,
        }
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Primitive> {
        self.primitives.iter()
    }

    pub fn in_layer(&self, layer: Layer) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(move |p| p.layer() == layer)
    }

    pub fn with_role(&self, role: Role) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter().filter(move |p| p.role == role)
    }

    pub fn for_entity<'a>(&'a self, id: &'a EntityId) -> impl Iterator<Item = &'a Primitive> {
        self.primitives.iter().filter(move |p| &p.entity == id)
    }

    /// `(entity, text)` for every label, in scene order.
    pub fn labels(&self) -> impl Iterator<Item = (&EntityId, &str)> {
        self.primitives
            .iter()
            .filter_map(|p| p.label_text().map(|text| (&p.entity, text)))
    }
}

impl<'a> IntoIterator for &'a SceneDescription {
    type Item = &'a Primitive;
    type IntoIter = std::slice::Iter<'a, Primitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.primitives.iter()
    }
}

/// Compose the scene for `view.active_mode`.
pub fn compose(model: &EntityModel, view: &ViewState, cfg: &ColorizerConfig) -> SceneDescription {
    let mode = view.active_mode;
    let mut out = Vec::new();

    for region in model.regions() {
        out.push(region_body(region, mode, view.opacity_scale(), cfg));
    }

    let tumor_presence = overlay_presence(mode, Layer::Tumor);
    if tumor_presence != Presence::Absent {
        let dimmed = tumor_presence == Presence::Dim;
        for tumor in model.tumors() {
            out.extend(tumor_primitives(tumor, mode, dimmed, cfg));
        }
    }

    if overlay_presence(mode, Layer::Radiation) == Presence::Active {
        for sample in model.radiation_samples() {
            out.extend(radiation_primitives(sample, cfg));
        }
    }

    if overlay_presence(mode, Layer::Damage) == Presence::Active {
        for region in model.regions().iter().filter(|r| r.is_affected) {
            out.extend(damage_primitives(region, cfg));
        }
    }

    let selected = view
        .selected
        .as_ref()
        .filter(|id| model.contains(id))
        .cloned();

    if let Some(id) = &selected {
        for primitive in out.iter_mut().filter(|p| &p.entity == id) {
            primitive.appearance = primitive.appearance.highlighted(cfg.selection_emissive);
        }
    }

    if view.show_labels {
        let labels = label_primitives(model, mode, &out, selected.as_ref());
        out.extend(labels);
    }

    trace!("Composed {} primitives for {} mode", out.len(), mode);

    SceneDescription {
        mode,
        opacity_scale: view.opacity_scale(),
        primitives: out,
    }
}

fn region_body(
    region: &AnatomicalRegion,
    mode: AnalysisMode,
    opacity_scale: f32,
    cfg: &ColorizerConfig,
) -> Primitive {
    Primitive {
        entity: region.id.clone(),
        role: Role::RegionBody,
        shape: Shape::Box {
            size: region.extent,
        },
        transform: Transform::from_translation(region.position),
        appearance: colorizer::color_for(region, mode, cfg).scaled_opacity(opacity_scale),
        dimmed: false,
        motion: Motion::Static,
    }
}

fn tumor_primitives(
    tumor: &Tumor,
    mode: AnalysisMode,
    dimmed: bool,
    cfg: &ColorizerConfig,
) -> [Primitive; 2] {
    let transform = Transform::from_translation(tumor.position);
    [
        Primitive {
            entity: tumor.id.clone(),
            role: Role::TumorCore,
            shape: Shape::Sphere { radius: tumor.size },
            transform,
            appearance: colorizer::tumor_appearance(tumor, mode, cfg),
            dimmed,
            motion: Motion::TumorPulse,
        },
        Primitive {
            entity: tumor.id.clone(),
            role: Role::TumorGlow,
            shape: Shape::Shell {
                radius: tumor.size * 1.5,
            },
            transform,
            appearance: colorizer::tumor_glow_appearance(tumor, mode, cfg),
            dimmed,
            motion: Motion::TumorPulse,
        },
    ]
}

/// Radius of the sphere drawn for a radiation field.
pub fn field_radius(sample: &RadiationSample) -> f32 {
    0.15 + 0.25 * sample.intensity
}

fn radiation_primitives(sample: &RadiationSample, cfg: &ColorizerConfig) -> [Primitive; 2] {
    [
        Primitive {
            entity: sample.id.clone(),
            role: Role::RadiationField,
            shape: Shape::Sphere {
                radius: field_radius(sample),
            },
            transform: Transform::from_translation(sample.position),
            appearance: colorizer::radiation_appearance(sample, cfg),
            dimmed: false,
            motion: Motion::FieldSpin,
        },
        Primitive {
            entity: sample.id.clone(),
            role: Role::RadiationBeam,
            shape: Shape::Beam {
                radius: BEAM_RADIUS,
                length: BEAM_LENGTH,
            },
            transform: Transform::from_translation(
                sample.position + Vec3::Y * (BEAM_LENGTH * 0.5),
            ),
            appearance: colorizer::radiation_beam_appearance(sample, cfg),
            dimmed: false,
            motion: Motion::Static,
        },
    ]
}

/// Number of particles marking a region with the given damage level.
pub fn particle_count(damage_level: f32) -> u32 {
    5 + (damage_level.clamp(0.0, 1.0) * 20.0).round() as u32
}

fn damage_primitives(region: &AnatomicalRegion, cfg: &ColorizerConfig) -> [Primitive; 2] {
    let transform = Transform::from_translation(region.position);
    [
        Primitive {
            entity: region.id.clone(),
            role: Role::DamageParticles,
            shape: Shape::Particles {
                count: particle_count(region.damage_level),
                spread: region.half_extent() * 0.8,
                seed: seed_for(&region.id),
            },
            transform,
            appearance: colorizer::damage_marker_appearance(region, cfg),
            dimmed: false,
            motion: Motion::Static,
        },
        Primitive {
            entity: region.id.clone(),
            role: Role::DamageBounds,
            shape: Shape::Wireframe {
                size: region.extent * 1.05,
            },
            transform,
            appearance: colorizer::damage_bounds_appearance(region, cfg),
            dimmed: false,
            motion: Motion::Static,
        },
    ]
}

/// Labels for every entity emphasized by the active overlay, then the
/// selected entity when it is not already labelled.
fn label_primitives(
    model: &EntityModel,
    mode: AnalysisMode,
    composed: &[Primitive],
    selected: Option<&EntityId>,
) -> Vec<Primitive> {
    let mut ids: Vec<&EntityId> = Vec::new();
    for p in composed {
        let emphasized = p.layer() != Layer::Anatomy
            && !p.dimmed
            && overlay_presence(mode, p.layer()) == Presence::Active;
        if emphasized && !ids.contains(&&p.entity) {
            ids.push(&p.entity);
        }
    }
    if let Some(id) = selected {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    ids.into_iter()
        .filter_map(|id| model.get(id))
        .map(|entity| Primitive {
            entity: entity.id().clone(),
            role: Role::Label,
            shape: Shape::Label {
                text: label_text(entity, mode),
            },
            transform: Transform::from_translation(label_anchor(entity)),
            appearance: Appearance::new(Rgb::new(1.0, 1.0, 1.0), 1.0, 0.0),
            dimmed: false,
            motion: Motion::Static,
        })
        .collect()
}

/// Text shown next to an entity for the given mode.
pub fn label_text(entity: EntityRef<'_>, mode: AnalysisMode) -> String {
    match entity {
        EntityRef::Region(r) => match mode {
            AnalysisMode::Damage if r.is_affected => {
                format!("{}: {}% damage", r.name, percent(r.damage_level))
            }
            AnalysisMode::Radiation => match r.radiation_dose {
                Some(dose) => format!("{}: {:.1} Gy", r.name, dose),
                None => r.name.clone(),
            },
            _ => r.name.clone(),
        },
        EntityRef::Tumor(t) => {
            let name = if t.tumor_type.is_empty() {
                t.id.as_str()
            } else {
                t.tumor_type.as_str()
            };
            if t.stage.is_empty() {
                format!("{} ({}% malignancy)", name, percent(t.malignancy))
            } else {
                format!(
                    "{} stage {} ({}% malignancy)",
                    name,
                    t.stage,
                    percent(t.malignancy)
                )
            }
        }
        EntityRef::Radiation(s) => format!("{}: {:.1} Gy", s.target_area, s.dose),
    }
}

fn label_anchor(entity: EntityRef<'_>) -> Vec3 {
    let lift = match entity {
        EntityRef::Region(r) => r.half_extent().y,
        EntityRef::Tumor(t) => t.size * 1.5,
        EntityRef::Radiation(s) => field_radius(s),
    };
    entity.position() + Vec3::Y * (lift + LABEL_CLEARANCE)
}

fn percent(fraction: f32) -> u32 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u32
}
