//! Zoom state for the displayed image.
//!
//! Zoom is presentation only. It never touches pixels and is not part of
//! history, so undo does not restore a previous zoom.

use crate::catalog::Operation;
use crate::config::ZoomConfig;

#[derive(Debug, Clone, PartialEq)]
pub struct Zoom {
    level: f32,
    settings: ZoomConfig,
    viewport: Option<(u32, u32)>,
}

impl Zoom {
    pub fn new(settings: ZoomConfig) -> Self {
        Self {
            level: 1.0,
            settings,
            viewport: None,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Zoom as a whole percentage, e.g. `125`.
    pub fn percent(&self) -> u32 {
        (self.level * 100.0).round() as u32
    }

    pub fn settings(&self) -> &ZoomConfig {
        &self.settings
    }

    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.viewport
    }

    /// Record the size of the area the image is drawn into. `Fit` uses it.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.level = (self.level * self.settings.step).min(self.settings.max);
        self.level
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.level = (self.level / self.settings.step).max(self.settings.min);
        self.level
    }

    pub fn reset(&mut self) -> f32 {
        self.level = 1.0;
        self.level
    }

    /// Scale so an image of `dimensions` fits the viewport with the
    /// configured margin. Without a known viewport this is the same as
    /// [`reset`](Self::reset).
    pub fn fit(&mut self, dimensions: (u32, u32)) -> f32 {
        let (w, h) = dimensions;
        self.level = match self.viewport {
            Some((vw, vh)) if w > 0 && h > 0 && vw > 0 && vh > 0 => {
                let scale = (vw as f32 / w as f32).min(vh as f32 / h as f32);
                (scale * self.settings.fit_margin).clamp(self.settings.min, self.settings.max)
            }
            _ => 1.0,
        };
        self.level
    }

    /// Handle a view operation. Returns the new level, or `None` if `op`
    /// is not a view operation.
    pub fn apply(&mut self, op: &Operation, dimensions: (u32, u32)) -> Option<f32> {
        match op {
            Operation::ZoomIn => Some(self.zoom_in()),
            Operation::ZoomOut => Some(self.zoom_out()),
            Operation::ResetZoom => Some(self.reset()),
            Operation::Fit => Some(self.fit(dimensions)),
            _ => None,
        }
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}
