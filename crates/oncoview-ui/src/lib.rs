//! # OncoView UI
//!
//! Toolkit-independent front of the visualization: the shell state
//! machine that owns a session, the mode panel summaries and the frame
//! loop that drives rendering from host animation callbacks.

pub mod error;
pub mod frame_loop;
pub mod panel;
pub mod shell;

pub use error::{ShellError, ShellResult};
pub use frame_loop::{FrameLoop, LoopControl};
pub use panel::{detail_for, summarize, DetailField, EntityDetail, ModeSummary, SummaryEntry};
pub use shell::VisualizationShell;
