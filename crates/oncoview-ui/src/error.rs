//! Error types for the UI crate.

use oncoview_core::VisualizationError;
use oncoview_visualizer::RenderError;
use thiserror::Error;

/// Errors surfaced by the shell while drawing a frame.
#[derive(Error, Debug)]
pub enum ShellError {
    /// The shell refused the call
    #[error(transparent)]
    Visualization(#[from] VisualizationError),

    /// The render adapter failed; the shell state is unaffected
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),
}

/// Result type alias for shell rendering.
pub type ShellResult<T> = Result<T, ShellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_error_display() {
        let err: ShellError = VisualizationError::NotOpen.into();
        assert_eq!(err.to_string(), "Visualization is not open");

        let err: ShellError = RenderError::TargetLost("context lost".into()).into();
        assert_eq!(err.to_string(), "Render failed: Render target lost: context lost");
    }
}
