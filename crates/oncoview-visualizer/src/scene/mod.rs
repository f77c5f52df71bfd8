//! Scene description: primitives and the composer that produces them.

pub mod composer;
pub mod primitive;

pub use composer::{
    compose, field_radius, label_text, overlay_presence, particle_count, Presence,
    SceneDescription, BEAM_LENGTH,
};
pub use primitive::{seed_for, Layer, Motion, Primitive, Role, Shape, Transform};
