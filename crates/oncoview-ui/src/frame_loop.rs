//! Frame loop driving an open shell from host animation-frame callbacks.
//!
//! The host calls [`FrameLoop::tick`] with a monotonic timestamp once per
//! display refresh. The loop turns timestamps into deltas, advances the
//! shell and renders it. A loop is bound to the session open when it was
//! started: once that session closes, even if another one has opened
//! since, the loop reports [`LoopControl::Break`] and produces no further
//! frames.

use oncoview_visualizer::{RenderAdapter, RenderStats};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ShellError;
use crate::shell::VisualizationShell;

/// Whether the host should keep scheduling ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Break,
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    session: Option<Uuid>,
    last_timestamp_s: Option<f64>,
    frames: u64,
    last_stats: Option<RenderStats>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin ticking the session currently open in `shell`. The first
    /// tick after a start advances by zero.
    pub fn start(&mut self, shell: &VisualizationShell) {
        self.session = shell.session_id();
        self.running = self.session.is_some();
        self.last_timestamp_s = None;
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!(frames = self.frames, "Frame loop stopped");
        }
        self.running = false;
        self.session = None;
        self.last_timestamp_s = None;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames produced since creation
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_stats(&self) -> Option<RenderStats> {
        self.last_stats
    }

    /// One animation-frame callback at host time `timestamp_s`.
    ///
    /// A stall between ticks only shows up as one capped clock step.
    /// Render failures stop the loop; the shell stays open.
    pub fn tick<A: RenderAdapter + ?Sized>(
        &mut self,
        timestamp_s: f64,
        shell: &mut VisualizationShell,
        adapter: &mut A,
    ) -> LoopControl {
        if !self.running || self.session.is_none() || shell.session_id() != self.session {
            self.stop();
            return LoopControl::Break;
        }

        let dt = match self.last_timestamp_s {
            Some(last) => timestamp_s - last,
            None => 0.0,
        };
        self.last_timestamp_s = Some(timestamp_s);

        if shell.frame(dt).is_err() {
            self.stop();
            return LoopControl::Break;
        }

        match shell.render(adapter) {
            Ok(stats) => {
                self.frames += 1;
                self.last_stats = Some(stats);
                LoopControl::Continue
            }
            Err(ShellError::Render(e)) => {
                warn!("Render failed, stopping frame loop: {}", e);
                self.stop();
                LoopControl::Break
            }
            Err(ShellError::Visualization(_)) => {
                self.stop();
                LoopControl::Break
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncoview_core::PatientContext;
    use oncoview_settings::Config;
    use oncoview_visualizer::RecordingRenderer;

    fn open_shell() -> VisualizationShell {
        let mut shell = VisualizationShell::with_event_bus(Config::default()).unwrap();
        shell.resize(640.0, 480.0);
        shell
            .open_reference(PatientContext::new("P-9", "Loop", 40, ""))
            .unwrap();
        shell
    }

    #[test]
    fn test_not_started_loop_breaks() {
        let mut shell = open_shell();
        let mut renderer = RecordingRenderer::new();
        let mut frame_loop = FrameLoop::new();
        assert_eq!(
            frame_loop.tick(0.0, &mut shell, &mut renderer),
            LoopControl::Break
        );
        assert!(renderer.frames().is_empty());
    }

    #[test]
    fn test_ticks_advance_clock() {
        let mut shell = open_shell();
        let mut renderer = RecordingRenderer::new();
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(&shell);

        for i in 0..10 {
            let ts = 100.0 + i as f64 / 60.0;
            assert_eq!(
                frame_loop.tick(ts, &mut shell, &mut renderer),
                LoopControl::Continue
            );
        }
        assert_eq!(frame_loop.frames(), 10);
        assert_eq!(renderer.frames().len(), 10);
        assert_eq!(renderer.frames()[0].time_s, 0.0);
        let t = shell.view().unwrap().clock_seconds();
        assert!((t - 9.0 / 60.0).abs() < 1e-9);
        assert!(frame_loop.last_stats().unwrap().draws > 0);
    }

    #[test]
    fn test_stall_is_capped() {
        let mut shell = open_shell();
        let mut renderer = RecordingRenderer::new();
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(&shell);

        frame_loop.tick(1.0, &mut shell, &mut renderer);
        frame_loop.tick(31.0, &mut shell, &mut renderer);
        let t = shell.view().unwrap().clock_seconds();
        assert!((t - shell.config().animation.max_frame_delta_s).abs() < 1e-9);
    }

    #[test]
    fn test_close_stops_loop() {
        let mut shell = open_shell();
        let mut renderer = RecordingRenderer::new();
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(&shell);
        frame_loop.tick(0.0, &mut shell, &mut renderer);

        assert!(shell.close());
        assert_eq!(
            frame_loop.tick(0.016, &mut shell, &mut renderer),
            LoopControl::Break
        );
        assert!(!frame_loop.is_running());
        assert_eq!(renderer.frames().len(), 1);
    }

    #[test]
    fn test_reopen_between_ticks_stops_loop() {
        let mut shell = open_shell();
        let mut renderer = RecordingRenderer::new();
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(&shell);
        frame_loop.tick(0.0, &mut shell, &mut renderer);

        assert!(shell.close());
        shell
            .open_reference(PatientContext::new("P-10", "Next", 52, ""))
            .unwrap();
        assert_eq!(
            frame_loop.tick(0.016, &mut shell, &mut renderer),
            LoopControl::Break
        );
        assert!(!frame_loop.is_running());
        assert_eq!(renderer.frames().len(), 1);
        assert_eq!(shell.view().unwrap().clock_seconds(), 0.0);

        frame_loop.start(&shell);
        assert_eq!(
            frame_loop.tick(5.0, &mut shell, &mut renderer),
            LoopControl::Continue
        );
        assert_eq!(renderer.frames()[1].time_s, 0.0);
    }

    #[test]
    fn test_start_on_closed_shell_does_not_run() {
        let mut shell = VisualizationShell::with_event_bus(Config::default()).unwrap();
        let mut renderer = RecordingRenderer::new();
        let mut frame_loop = FrameLoop::new();
        frame_loop.start(&shell);
        assert!(!frame_loop.is_running());
        assert_eq!(
            frame_loop.tick(0.0, &mut shell, &mut renderer),
            LoopControl::Break
        );
    }
}
