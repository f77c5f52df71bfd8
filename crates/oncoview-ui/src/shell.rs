//! Visualization shell
//!
//! Owns one visualization session at a time and routes user input to it.
//! The shell is either closed or open; there is no error state. Calls that
//! need a session fail with [`VisualizationError::NotOpen`] while closed
//! and change nothing.
//!
//! Every user-visible change is announced through the [`Announcer`]
//! collaborator; opening and real mode transitions are also reported to
//! the [`AuditSink`].

use std::rc::Rc;

use chrono::{DateTime, Utc};
use glam::Vec2;
use oncoview_core::{
    reference_anatomy, AnalysisMode, ClinicalSnapshot, EntityId, EntityModel, EventBusBridge,
    PatientContext, SharedAnnouncer, SharedAuditSink, ValidationError, ViewState,
    VisualizationError,
};
use oncoview_settings::{Config, SettingsResult};
use oncoview_visualizer::{
    compose, pick_ray, pose, render_frame, Camera, ColorizerConfig, Frame, FrameClock,
    OrbitController, PointerButton, PosedScene, Release, RenderAdapter, RenderStats,
    SceneDescription,
};
use tracing::{debug, info, trace};
use uuid::Uuid;

use crate::error::ShellResult;
use crate::panel::{detail_for, summarize, EntityDetail, ModeSummary};

/// State of one open visualization.
#[derive(Debug)]
struct Session {
    id: Uuid,
    opened_at: DateTime<Utc>,
    model: EntityModel,
    view: ViewState,
    scene: SceneDescription,
    controller: OrbitController,
    clock: FrameClock,
}

impl Session {
    fn patient_id(&self) -> &str {
        &self.model.patient().id
    }

    fn recompose(&mut self, colors: &ColorizerConfig) {
        self.scene = compose(&self.model, &self.view, colors);
        debug!(
            session = %self.id,
            mode = %self.view.active_mode,
            primitives = self.scene.len(),
            "Scene recomposed"
        );
    }

    fn display_name(&self, id: &EntityId) -> String {
        self.model
            .get(id)
            .map(|entity| entity.display_name())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string())
    }

    /// Change the selection; returns the announcement when it changed.
    fn set_selection(
        &mut self,
        selected: Option<EntityId>,
        colors: &ColorizerConfig,
    ) -> Option<String> {
        if self.view.selected == selected {
            return None;
        }
        let text = match &selected {
            Some(id) => format!("Selected {}", self.display_name(id)),
            None => "Selection cleared".to_string(),
        };
        self.view.selected = selected;
        self.recompose(colors);
        Some(text)
    }
}

/// Closed/open state machine around one visualization session.
pub struct VisualizationShell {
    config: Config,
    audit: SharedAuditSink,
    announcer: SharedAnnouncer,
    viewport: Vec2,
    session: Option<Session>,
}

impl std::fmt::Debug for VisualizationShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualizationShell")
            .field("viewport", &self.viewport)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl VisualizationShell {
    /// Create a closed shell. The configuration is validated up front.
    pub fn new(
        config: Config,
        audit: SharedAuditSink,
        announcer: SharedAnnouncer,
    ) -> SettingsResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            audit,
            announcer,
            viewport: Vec2::ONE,
            session: None,
        })
    }

    /// Shell whose audit and announcements go to the global event bus.
    pub fn with_event_bus(config: Config) -> SettingsResult<Self> {
        let bridge = Rc::new(EventBusBridge::global());
        Self::new(config, bridge.clone(), bridge)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Open a session for `patient`.
    ///
    /// The snapshot is validated before anything else happens: on failure
    /// the shell keeps whatever state it had. An already open session is
    /// closed first and replaced.
    pub fn open(
        &mut self,
        patient: PatientContext,
        snapshot: ClinicalSnapshot,
    ) -> Result<(), VisualizationError> {
        let model = EntityModel::build(patient, snapshot)?;
        let view = self.config.view.initial_view_state()?;

        if self.session.is_some() {
            self.end_session("replaced");
        }

        let mut controller = OrbitController::new(self.config.camera.clone());
        controller.set_viewport(self.viewport.x, self.viewport.y);
        let scene = compose(&model, &view, &self.config.colors);

        let session = Session {
            id: Uuid::new_v4(),
            opened_at: Utc::now(),
            clock: FrameClock::new(self.config.animation.max_frame_delta_s),
            model,
            view,
            scene,
            controller,
        };

        info!(
            session = %session.id,
            patient_id = session.patient_id(),
            entities = session.model.len(),
            mode = %session.view.active_mode,
            "Visualization opened"
        );
        self.audit.on_open(session.patient_id());
        self.announcer.announce(&format!(
            "3D visualization opened for {}. {} view",
            session.model.patient().name,
            session.view.active_mode.title()
        ));
        self.session = Some(session);
        Ok(())
    }

    /// Open a session on the reference anatomy for `patient`.
    pub fn open_reference(&mut self, patient: PatientContext) -> Result<(), VisualizationError> {
        let snapshot = reference_anatomy(&patient);
        self.open(patient, snapshot)
    }

    /// Close the session. Returns `false` when nothing was open.
    pub fn close(&mut self) -> bool {
        self.end_session("closed")
    }

    /// Escape key: same as [`close`](Self::close).
    pub fn cancel(&mut self) -> bool {
        self.end_session("cancelled")
    }

    fn end_session(&mut self, reason: &'static str) -> bool {
        let Some(session) = self.session.take() else {
            return false;
        };
        info!(
            session = %session.id,
            patient_id = session.patient_id(),
            reason,
            frames = session.clock.frames(),
            "Visualization closed"
        );
        self.announcer.announce("3D visualization closed");
        true
    }

    /// Switch the analysis mode. Returns `false` for a same-mode call,
    /// which is neither audited nor announced.
    pub fn set_mode(&mut self, mode: AnalysisMode) -> Result<bool, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        if session.view.active_mode == mode {
            return Ok(false);
        }

        session.view.active_mode = mode;
        session.recompose(&self.config.colors);
        self.audit.on_mode_change(session.patient_id(), mode);
        self.announcer
            .announce(&format!("Switched to {}", mode.title()));
        Ok(true)
    }

    /// Set the region opacity scale. Out-of-range values are rejected and
    /// leave the view untouched.
    pub fn set_opacity(&mut self, value: f32) -> Result<bool, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        if session.view.opacity_scale() == value {
            return Ok(false);
        }

        session.view.set_opacity_scale(value)?;
        session.recompose(&self.config.colors);
        self.announcer.announce(&format!(
            "Opacity set to {}%",
            (value * 100.0).round() as i32
        ));
        Ok(true)
    }

    /// Show or hide labels; returns the new setting.
    pub fn toggle_labels(&mut self) -> Result<bool, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        session.view.show_labels = !session.view.show_labels;
        session.recompose(&self.config.colors);

        let shown = session.view.show_labels;
        self.announcer
            .announce(if shown { "Labels shown" } else { "Labels hidden" });
        Ok(shown)
    }

    /// Pause or resume auto-rotation; returns the new setting.
    pub fn toggle_auto_rotate(&mut self) -> Result<bool, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        session.view.auto_rotate = !session.view.auto_rotate;

        let enabled = session.view.auto_rotate;
        self.announcer.announce(if enabled {
            "Auto-rotation enabled"
        } else {
            "Auto-rotation paused"
        });
        Ok(enabled)
    }

    pub fn pointer_down(
        &mut self,
        pos: Vec2,
        button: PointerButton,
    ) -> Result<(), VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        session.controller.pointer_down(pos, button);
        Ok(())
    }

    pub fn pointer_move(&mut self, pos: Vec2) -> Result<(), VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        session.controller.pointer_move(pos);
        Ok(())
    }

    /// Finish a press. A release without drag movement is treated as a
    /// click and updates the selection.
    pub fn pointer_up(&mut self, pos: Vec2) -> Result<Release, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        let release = session.controller.pointer_up(pos);
        if let Release::Click(at) = release {
            self.click(at)?;
        }
        Ok(release)
    }

    pub fn wheel(&mut self, delta_y: f32) -> Result<(), VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        session.controller.wheel(delta_y);
        Ok(())
    }

    /// Select whatever is under viewport pixel `pos`; empty space clears
    /// the selection. The camera is not moved.
    pub fn click(&mut self, pos: Vec2) -> Result<Option<EntityId>, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        let options = self.config.view.pick_options();
        let hit = session
            .controller
            .screen_ray(pos)
            .and_then(|ray| pick_ray(&session.scene, ray, options));

        debug!(
            x = pos.x,
            y = pos.y,
            hit = ?hit.as_ref().map(|h| h.entity.as_str()),
            "Pick"
        );

        let selected = hit.map(|h| h.entity);
        if let Some(text) = session.set_selection(selected.clone(), &self.config.colors) {
            self.announcer.announce(&text);
        }
        Ok(selected)
    }

    /// Select an entity by id, e.g. from the mode panel. Unknown ids are
    /// rejected.
    pub fn select(&mut self, id: Option<EntityId>) -> Result<bool, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        if let Some(id) = &id {
            if !session.model.contains(id) {
                return Err(ValidationError::Other {
                    message: format!("unknown entity '{}'", id),
                }
                .into());
            }
        }

        match session.set_selection(id, &self.config.colors) {
            Some(text) => {
                self.announcer.announce(&text);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Return the camera to its configured initial view.
    pub fn reset_camera(&mut self) -> Result<(), VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        session.controller.reset();
        self.announcer.announce("Camera reset");
        Ok(())
    }

    /// Advance the animation clock and the camera by `dt_s` seconds.
    pub fn frame(&mut self, dt_s: f64) -> Result<Frame, VisualizationError> {
        let session = self.session.as_mut().ok_or(VisualizationError::NotOpen)?;
        let frame = session.clock.advance(dt_s);
        session.view.record_clock(frame.time_s);
        session
            .controller
            .update(frame.dt_s as f32, session.view.auto_rotate);
        trace!(index = frame.index, t = frame.time_s, "Frame");
        Ok(frame)
    }

    /// Pose the current scene at the session clock and submit it.
    pub fn render<A: RenderAdapter + ?Sized>(&self, adapter: &mut A) -> ShellResult<RenderStats> {
        let session = self.session.as_ref().ok_or(VisualizationError::NotOpen)?;
        let posed = pose(&session.scene, session.view.clock_seconds());
        let stats = render_frame(
            &posed,
            session.controller.camera(),
            session.controller.viewport(),
            adapter,
        )?;
        Ok(stats)
    }

    /// Viewport size in pixels. Accepted while closed; the next session
    /// starts with it.
    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return;
        }
        self.viewport = Vec2::new(width, height);
        if let Some(session) = self.session.as_mut() {
            session.controller.set_viewport(width, height);
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session.as_ref().map(|s| s.id)
    }

    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.session.as_ref().map(|s| s.opened_at)
    }

    pub fn patient(&self) -> Option<&PatientContext> {
        self.session.as_ref().map(|s| s.model.patient())
    }

    pub fn model(&self) -> Option<&EntityModel> {
        self.session.as_ref().map(|s| &s.model)
    }

    pub fn view(&self) -> Option<&ViewState> {
        self.session.as_ref().map(|s| &s.view)
    }

    pub fn scene(&self) -> Option<&SceneDescription> {
        self.session.as_ref().map(|s| &s.scene)
    }

    pub fn controller(&self) -> Option<&OrbitController> {
        self.session.as_ref().map(|s| &s.controller)
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.controller().map(|c| c.camera())
    }

    /// Current scene posed at the session clock
    pub fn posed(&self) -> Option<PosedScene<'_>> {
        self.session
            .as_ref()
            .map(|s| pose(&s.scene, s.view.clock_seconds()))
    }

    /// Mode panel summary for the active mode
    pub fn summary(&self) -> Option<ModeSummary> {
        self.session
            .as_ref()
            .map(|s| summarize(&s.model, s.view.active_mode, &self.config.colors))
    }

    /// Detail view of the selected entity
    pub fn selected_detail(&self) -> Option<EntityDetail> {
        let session = self.session.as_ref()?;
        let id = session.view.selected.as_ref()?;
        detail_for(&session.model, id, session.view.active_mode, &self.config.colors)
    }
}
