//! Bounding box overlay stacked above the image viewer

pub mod canvas;
pub mod renderer;
pub mod surface;

pub use renderer::{OverlayBox, OverlayStyle};
pub use surface::DrawSurface;

use crate::detection::{Detection, ViewportGeometry};

/// The detection set currently shown on top of the loaded image.
///
/// Holds detections in model space; they are mapped against whatever
/// geometry is passed to `draw`, so a resized viewport never sees stale boxes.
#[derive(Debug, Clone, Default)]
pub struct OverlayLayer {
    detections: Vec<Detection>,
}

impl OverlayLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.detections.clear();
    }

    /// Swap in a new detection set; nothing from the previous set survives
    pub fn replace(&mut self, detections: Vec<Detection>) {
        self.detections = detections;
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    pub fn boxes(&self, geometry: &ViewportGeometry) -> Vec<OverlayBox> {
        self.detections
            .iter()
            .map(|d| OverlayBox::from_detection(d, geometry))
            .collect()
    }

    pub fn draw<S: DrawSurface + ?Sized>(&self, surface: &mut S, geometry: &ViewportGeometry, style: &OverlayStyle) {
        renderer::render(surface, &self.boxes(geometry), geometry, style);
    }
}
