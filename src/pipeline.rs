//! The edit pipeline: one image, its history, and its zoom.
//!
//! [`EditPipeline::apply_operation`] is the single entry point. It routes by
//! operation family:
//!
//! ```text
//! Filter | Adjustment | Transform  → transform::apply → History::push
//! Undo | Redo | Reset              → History cursor
//! ZoomIn | ZoomOut | ResetZoom | Fit → Zoom (history untouched)
//! Help | Exit                      → no-op, current buffer returned
//! ```
//!
//! Apply is atomic: the new buffer is computed before history is touched, so
//! a failed transform leaves the cursor and the displayed buffer exactly as
//! they were.

use crate::catalog::{Family, Operation};
use crate::config::ZoomConfig;
use crate::history::History;
use crate::imaging::{ImageBuffer, TransformFailure, transform};
use crate::view::Zoom;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineFailure {
    #[error("nothing to undo")]
    NothingToUndo,
    #[error("nothing to redo")]
    NothingToRedo,
    #[error(transparent)]
    Transform(#[from] TransformFailure),
}

impl PipelineFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineFailure::NothingToUndo => "nothing_to_undo",
            PipelineFailure::NothingToRedo => "nothing_to_redo",
            PipelineFailure::Transform(failure) => failure.kind(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EditPipeline {
    history: History,
    zoom: Zoom,
}

impl EditPipeline {
    /// Start a pipeline at `original` with an empty history and zoom at 100%.
    pub fn new(original: ImageBuffer, capacity: usize, zoom: ZoomConfig) -> Self {
        Self {
            history: History::new(original, capacity),
            zoom: Zoom::new(zoom),
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.zoom.set_viewport(width, height);
    }

    /// The buffer on display.
    pub fn current(&self) -> &ImageBuffer {
        self.history.current()
    }

    pub fn original(&self) -> &ImageBuffer {
        self.history.original()
    }

    /// Apply one operation and return the buffer now on display.
    pub fn apply_operation(&mut self, op: &Operation) -> Result<ImageBuffer, PipelineFailure> {
        match op.family() {
            Family::Filter | Family::Adjustment | Family::Transform => self.apply_edit(op),
            Family::View => {
                let dimensions = self.current().dimensions();
                if let Some(level) = self.zoom.apply(op, dimensions) {
                    info!(operation = %op, zoom = level, "zoom changed");
                }
                Ok(self.current().clone())
            }
            Family::Control => self.apply_control(op),
        }
    }

    fn apply_edit(&mut self, op: &Operation) -> Result<ImageBuffer, PipelineFailure> {
        let next = transform::apply(op, self.current()).inspect_err(|failure| {
            warn!(operation = %op, kind = failure.kind(), %failure, "transform failed");
        })?;
        info!(
            operation = %op,
            width = next.width(),
            height = next.height(),
            version = next.version(),
            "operation applied"
        );
        self.history.push(*op, next.clone());
        Ok(next)
    }

    fn apply_control(&mut self, op: &Operation) -> Result<ImageBuffer, PipelineFailure> {
        match op {
            Operation::Undo => self
                .history
                .undo()
                .cloned()
                .ok_or(PipelineFailure::NothingToUndo),
            Operation::Redo => self
                .history
                .redo()
                .cloned()
                .ok_or(PipelineFailure::NothingToRedo),
            Operation::Reset => {
                info!("history reset to original");
                Ok(self.history.reset().clone())
            }
            _ => Ok(self.current().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Brightness, Hue};
    use crate::test_helpers::{gradient_rgb, indexed};

    fn pipeline() -> EditPipeline {
        EditPipeline::new(gradient_rgb(6, 4), 50, ZoomConfig::default())
    }

    #[test]
    fn mutating_op_pushes_history() {
        let mut p = pipeline();
        let out = p.apply_operation(&Operation::Invert).unwrap();
        assert_eq!(p.history().len(), 1);
        assert_eq!(&out, p.current());
        assert_ne!(&out, p.original());
    }

    #[test]
    fn undo_returns_previous_buffer() {
        let mut p = pipeline();
        let original = p.original().clone();
        p.apply_operation(&Operation::Sepia).unwrap();
        assert_eq!(p.apply_operation(&Operation::Undo).unwrap(), original);
    }

    #[test]
    fn undo_on_fresh_pipeline_fails() {
        let mut p = pipeline();
        assert_eq!(
            p.apply_operation(&Operation::Undo),
            Err(PipelineFailure::NothingToUndo)
        );
    }

    #[test]
    fn redo_after_new_edit_fails() {
        let mut p = pipeline();
        p.apply_operation(&Operation::Invert).unwrap();
        p.apply_operation(&Operation::Undo).unwrap();
        p.apply_operation(&Operation::Blur).unwrap();
        assert_eq!(
            p.apply_operation(&Operation::Redo),
            Err(PipelineFailure::NothingToRedo)
        );
    }

    #[test]
    fn redo_restores_undone_edit() {
        let mut p = pipeline();
        let edited = p.apply_operation(&Operation::RotateLeft).unwrap();
        p.apply_operation(&Operation::Undo).unwrap();
        assert_eq!(p.apply_operation(&Operation::Redo).unwrap(), edited);
    }

    #[test]
    fn reset_restores_original_and_is_final() {
        let mut p = pipeline();
        let original = p.original().clone();
        p.apply_operation(&Operation::Brightness(Brightness::new(40.0)))
            .unwrap();
        p.apply_operation(&Operation::Hue(Hue::new(90.0))).unwrap();
        assert_eq!(p.apply_operation(&Operation::Reset).unwrap(), original);
        assert!(p.history().is_empty());
        assert_eq!(
            p.apply_operation(&Operation::Undo),
            Err(PipelineFailure::NothingToUndo)
        );
    }

    #[test]
    fn view_ops_leave_history_alone() {
        let mut p = pipeline();
        p.apply_operation(&Operation::Invert).unwrap();
        let before = p.current().clone();
        let out = p.apply_operation(&Operation::ZoomIn).unwrap();
        assert_eq!(out, before);
        assert_eq!(p.zoom().percent(), 125);
        assert_eq!(p.history().len(), 1);
        // Undo reverts the edit, not the zoom.
        p.apply_operation(&Operation::Undo).unwrap();
        assert_eq!(p.zoom().percent(), 125);
    }

    #[test]
    fn help_and_exit_are_no_ops() {
        let mut p = pipeline();
        let current = p.current().clone();
        assert_eq!(p.apply_operation(&Operation::Help).unwrap(), current);
        assert_eq!(p.apply_operation(&Operation::Exit).unwrap(), current);
        assert!(p.history().is_empty());
    }

    #[test]
    fn failed_transform_leaves_state_untouched() {
        let mut p = EditPipeline::new(indexed(4, 4), 50, ZoomConfig::default());
        p.apply_operation(&Operation::FlipHorizontal).unwrap();
        let before = p.current().clone();
        let err = p.apply_operation(&Operation::Sepia).unwrap_err();
        assert!(matches!(
            err,
            PipelineFailure::Transform(TransformFailure::Unsupported { .. })
        ));
        assert_eq!(err.kind(), "unsupported");
        assert_eq!(p.current(), &before);
        assert_eq!(p.history().len(), 1);
        assert_eq!(p.history().cursor(), 1);
    }

    #[test]
    fn failure_kinds() {
        assert_eq!(PipelineFailure::NothingToUndo.kind(), "nothing_to_undo");
        assert_eq!(PipelineFailure::NothingToRedo.kind(), "nothing_to_redo");
    }
}
