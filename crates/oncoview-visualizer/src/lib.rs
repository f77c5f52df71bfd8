//! # OncoView Visualizer
//!
//! Scene composition, colorization, animation, camera control, picking and
//! the render adapter boundary for OncoView.

pub mod animation;
pub mod camera;
pub mod colorizer;
pub mod controller;
pub mod picking;
pub mod render;
pub mod scene;

pub use animation::{
    breathing_scale, field_rotation, pose, tumor_pulse_scale, Frame, FrameClock, PosedPrimitive,
    PosedScene,
};
pub use camera::Camera;
pub use colorizer::{color_for, tumor_appearance, Appearance, ColorizerConfig};
pub use controller::{OrbitConfig, OrbitController, PointerButton, Release};
pub use picking::{pick_ray, PickHit, PickOptions, Ray};
pub use render::{
    render_frame, DrawCall, FrameView, InstanceBatcher, InstanceData, LabelCall, MeshClass,
    RecordedDraw, RecordedFrame, RecordingRenderer, RenderAdapter, RenderError, RenderStats,
};
pub use scene::{compose, Layer, Motion, Primitive, Role, SceneDescription, Shape, Transform};
