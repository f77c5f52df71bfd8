//! # Render Adapter
//!
//! Thin boundary between a posed scene and a graphics backend. The
//! visualization hands draw calls to a [`RenderAdapter`]; the backend owns
//! meshes, shaders and the surface.
//!
//! [`InstanceBatcher`] groups draw calls into GPU-ready per-shape instance
//! buffers. [`RecordingRenderer`] keeps the calls for inspection.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};
use oncoview_core::EntityId;
use std::collections::BTreeMap;
use tracing::trace;

use crate::animation::PosedScene;
use crate::camera::Camera;
use crate::colorizer::Appearance;
use crate::scene::{Role, Shape};

/// Point sprite size of one damage particle
const PARTICLE_SIZE: f32 = 0.03;

/// Error type for render adapters
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render target lost: {0}")]
    TargetLost(String),
    #[error("draw call outside begin_frame/end_frame")]
    NoFrame,
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Camera state for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameView {
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
    pub viewport: Vec2,
    pub time_s: f64,
}

impl FrameView {
    pub fn new(camera: &Camera, viewport: Vec2, time_s: f64) -> Self {
        Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            eye: camera.eye_position(),
            viewport,
            time_s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall<'a> {
    pub entity: &'a EntityId,
    pub role: Role,
    pub shape: &'a Shape,
    pub world: Mat4,
    pub appearance: Appearance,
    pub dimmed: bool,
}

/// A label projected to viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelCall<'a> {
    pub entity: &'a EntityId,
    pub text: &'a str,
    pub screen: Vec2,
}

pub trait RenderAdapter {
    fn begin_frame(&mut self, view: &FrameView) -> Result<(), RenderError>;
    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), RenderError>;
    fn draw_label(&mut self, call: &LabelCall<'_>) -> Result<(), RenderError>;
    fn end_frame(&mut self) -> Result<(), RenderError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draws: usize,
    pub labels: usize,
    /// Labels whose anchor is behind the camera
    pub hidden_labels: usize,
}

/// Submit every primitive of `posed`, in scene order, to `adapter`.
pub fn render_frame<A: RenderAdapter + ?Sized>(
    posed: &PosedScene<'_>,
    camera: &Camera,
    viewport: Vec2,
    adapter: &mut A,
) -> Result<RenderStats, RenderError> {
    let mut stats = RenderStats::default();
    adapter.begin_frame(&FrameView::new(camera, viewport, posed.time_s))?;

    for item in &posed.items {
        let p = item.primitive;
        if let Shape::Label { text } = &p.shape {
            let anchor = item.world.transform_point3(Vec3::ZERO);
            match camera.project(anchor, viewport.x, viewport.y) {
                Some(screen) => {
                    adapter.draw_label(&LabelCall {
                        entity: &p.entity,
                        text,
                        screen,
                    })?;
                    stats.labels += 1;
                }
                None => stats.hidden_labels += 1,
            }
            continue;
        }

        adapter.draw(&DrawCall {
            entity: &p.entity,
            role: p.role,
            shape: &p.shape,
            world: item.world,
            appearance: p.appearance,
            dimmed: p.dimmed,
        })?;
        stats.draws += 1;
    }

    adapter.end_frame()?;
    trace!(
        "Rendered {} draws and {} labels at t={:.3}",
        stats.draws,
        stats.labels,
        posed.time_s
    );
    Ok(stats)
}

/// Per-instance vertex data for instanced drawing of unit meshes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub emissive: f32,
    pub _pad: [f32; 3],
}

impl InstanceData {
    fn new(model: Mat4, appearance: &Appearance) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: appearance.rgba(),
            emissive: appearance.emissive,
            _pad: [0.0; 3],
        }
    }
}

/// Unit mesh an instance is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeshClass {
    /// Unit cube centred on the origin
    Cube,
    /// Unit sphere
    Sphere,
    /// Unit sphere drawn back-face only with additive blending
    Shell,
    /// Unit cylinder along +Y centred on the origin
    Cylinder,
    /// Edges of the unit cube
    CubeEdges,
    /// Camera-facing quad
    Sprite,
}

/// Groups draw calls into per-mesh instance buffers.
#[derive(Debug, Default)]
pub struct InstanceBatcher {
    in_frame: bool,
    view: Option<FrameView>,
    batches: BTreeMap<MeshClass, Vec<InstanceData>>,
    labels: Vec<(EntityId, String, Vec2)>,
    frames: u64,
}

impl InstanceBatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn view(&self) -> Option<&FrameView> {
        self.view.as_ref()
    }

    pub fn instances(&self, class: MeshClass) -> &[InstanceData] {
        self.batches.get(&class).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Raw bytes of one batch, ready for a vertex buffer upload.
    pub fn bytes(&self, class: MeshClass) -> &[u8] {
        bytemuck::cast_slice(self.instances(class))
    }

    pub fn batches(&self) -> impl Iterator<Item = (MeshClass, &[InstanceData])> {
        self.batches.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn labels(&self) -> &[(EntityId, String, Vec2)] {
        &self.labels
    }

    fn push(&mut self, class: MeshClass, model: Mat4, appearance: &Appearance) {
        self.batches
            .entry(class)
            .or_default()
            .push(InstanceData::new(model, appearance));
    }
}

impl RenderAdapter for InstanceBatcher {
    fn begin_frame(&mut self, view: &FrameView) -> Result<(), RenderError> {
        self.in_frame = true;
        self.view = Some(*view);
        self.batches.values_mut().for_each(Vec::clear);
        self.labels.clear();
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::NoFrame);
        }
        let world = call.world;
        match call.shape {
            Shape::Box { size } => {
                self.push(MeshClass::Cube, world * Mat4::from_scale(*size), &call.appearance)
            }
            Shape::Sphere { radius } => self.push(
                MeshClass::Sphere,
                world * Mat4::from_scale(Vec3::splat(*radius)),
                &call.appearance,
            ),
            Shape::Shell { radius } => self.push(
                MeshClass::Shell,
                world * Mat4::from_scale(Vec3::splat(*radius)),
                &call.appearance,
            ),
            Shape::Beam { radius, length } => self.push(
                MeshClass::Cylinder,
                world * Mat4::from_scale(Vec3::new(*radius, *length, *radius)),
                &call.appearance,
            ),
            Shape::Wireframe { size } => self.push(
                MeshClass::CubeEdges,
                world * Mat4::from_scale(*size),
                &call.appearance,
            ),
            Shape::Particles { .. } => {
                for offset in call.shape.particle_offsets() {
                    let model = world
                        * Mat4::from_translation(offset)
                        * Mat4::from_scale(Vec3::splat(PARTICLE_SIZE));
                    self.push(MeshClass::Sprite, model, &call.appearance);
                }
            }
            Shape::Label { .. } => {}
        }
        Ok(())
    }

    fn draw_label(&mut self, call: &LabelCall<'_>) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::NoFrame);
        }
        self.labels
            .push((call.entity.clone(), call.text.to_string(), call.screen));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        if !self.in_frame {
            return Err(RenderError::NoFrame);
        }
        self.in_frame = false;
        self.frames += 1;
        Ok(())
    }
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub entity: EntityId,
    pub role: Role,
    pub world: Mat4,
    pub appearance: Appearance,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedFrame {
    pub time_s: f64,
    pub draws: Vec<RecordedDraw>,
    pub labels: Vec<(EntityId, String)>,
}

/// Keeps every frame it is given. Used by tests and headless runs.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<RecordedFrame>,
    current: Option<RecordedFrame>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[RecordedFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&RecordedFrame> {
        self.frames.last()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.current = None;
    }
}

impl RenderAdapter for RecordingRenderer {
    fn begin_frame(&mut self, view: &FrameView) -> Result<(), RenderError> {
        self.current = Some(RecordedFrame {
            time_s: view.time_s,
            ..Default::default()
        });
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), RenderError> {
        let frame = self.current.as_mut().ok_or(RenderError::NoFrame)?;
        frame.draws.push(RecordedDraw {
            entity: call.entity.clone(),
            role: call.role,
            world: call.world,
            appearance: call.appearance,
        });
        Ok(())
    }

    fn draw_label(&mut self, call: &LabelCall<'_>) -> Result<(), RenderError> {
        let frame = self.current.as_mut().ok_or(RenderError::NoFrame)?;
        frame
            .labels
            .push((call.entity.clone(), call.text.to_string()));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), RenderError> {
        let frame = self.current.take().ok_or(RenderError::NoFrame)?;
        self.frames.push(frame);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::pose;
    use crate::colorizer::ColorizerConfig;
    use crate::scene::{compose, particle_count};
    use oncoview_core::{
        reference_anatomy, AnalysisMode, EntityModel, PatientContext, ViewState,
    };

    fn model() -> EntityModel {
        let patient = PatientContext::new("P-9", "Render Test", 47, "");
        let snapshot = reference_anatomy(&patient);
        EntityModel::build(patient, snapshot).unwrap()
    }

    fn camera() -> Camera {
        let mut camera = Camera::default();
        camera.update_aspect_ratio(800.0, 600.0);
        camera
    }

    #[test]
    fn test_recording_renderer_sees_every_primitive() {
        let model = model();
        let view = ViewState::new(AnalysisMode::Radiation);
        let scene = compose(&model, &view, &ColorizerConfig::default());
        let posed = pose(&scene, 1.0);

        let mut recorder = RecordingRenderer::new();
        let stats = render_frame(&posed, &camera(), Vec2::new(800.0, 600.0), &mut recorder)
            .unwrap();

        let frame = recorder.last_frame().unwrap();
        assert_eq!(frame.draws.len(), stats.draws);
        assert_eq!(frame.labels.len(), stats.labels);
        assert_eq!(stats.draws + stats.labels + stats.hidden_labels, scene.len());
        assert_eq!(frame.time_s, 1.0);
    }

    #[test]
    fn test_batcher_groups_by_mesh() {
        let model = model();
        let view = ViewState::new(AnalysisMode::Damage);
        let scene = compose(&model, &view, &ColorizerConfig::default());
        let posed = pose(&scene, 0.0);

        let mut batcher = InstanceBatcher::new();
        render_frame(&posed, &camera(), Vec2::new(800.0, 600.0), &mut batcher).unwrap();

        assert_eq!(batcher.frames(), 1);
        assert_eq!(batcher.instances(MeshClass::Cube).len(), model.regions().len());

        let affected: Vec<_> = model.regions().iter().filter(|r| r.is_affected).collect();
        assert_eq!(batcher.instances(MeshClass::CubeEdges).len(), affected.len());
        let particles: u32 = affected.iter().map(|r| particle_count(r.damage_level)).sum();
        assert_eq!(batcher.instances(MeshClass::Sprite).len(), particles as usize);

        assert_eq!(
            batcher.bytes(MeshClass::Cube).len(),
            model.regions().len() * std::mem::size_of::<InstanceData>()
        );
    }

    #[test]
    fn test_batcher_rejects_draw_outside_frame() {
        let mut batcher = InstanceBatcher::new();
        let id = EntityId::from("x");
        let shape = Shape::Sphere { radius: 1.0 };
        let call = DrawCall {
            entity: &id,
            role: Role::TumorCore,
            shape: &shape,
            world: Mat4::IDENTITY,
            appearance: Appearance::new(oncoview_core::Rgb::new(1.0, 1.0, 1.0), 1.0, 0.0),
            dimmed: false,
        };
        assert!(matches!(batcher.draw(&call), Err(RenderError::NoFrame)));
        assert!(matches!(batcher.end_frame(), Err(RenderError::NoFrame)));
    }

    #[test]
    fn test_instance_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<InstanceData>(), 96);
    }
}
