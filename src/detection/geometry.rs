//! Model-space to display-space coordinate mapping
//!
//! The detection model works on a fixed square input (640x640 by default),
//! while the viewer can be any size. Each axis is scaled independently.

use serde::Serialize;

use super::Detection;
use crate::config::{DEFAULT_DISPLAY_SIZE, DEFAULT_MODEL_INPUT_SIZE};

/// Axis-aligned box in display pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct DisplayBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportGeometry {
    pub model_input_size: u32,
    pub display_width: f32,
    pub display_height: f32,
}

impl ViewportGeometry {
    pub fn new(model_input_size: u32, display_width: f32, display_height: f32) -> Self {
        Self {
            model_input_size,
            display_width,
            display_height,
        }
    }

    /// Build geometry from the size a live viewport reports.
    /// A missing, zero, negative or non-finite dimension falls back to
    /// `DEFAULT_DISPLAY_SIZE` so the overlay never collapses.
    pub fn from_viewport(model_input_size: u32, width: f32, height: f32) -> Self {
        let sanitize = |v: f32| if v.is_finite() && v > 0.0 { v } else { DEFAULT_DISPLAY_SIZE };
        Self::new(model_input_size, sanitize(width), sanitize(height))
    }

    pub fn scale(&self) -> (f32, f32) {
        if self.model_input_size == 0 {
            return (0.0, 0.0);
        }
        let input = self.model_input_size as f32;
        (self.display_width / input, self.display_height / input)
    }
}

impl Default for ViewportGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_INPUT_SIZE, DEFAULT_DISPLAY_SIZE, DEFAULT_DISPLAY_SIZE)
    }
}

/// Convert a center+extent detection into a top-left+extent display box.
/// The half-extent is subtracted in model space, then the result is scaled.
/// Boxes are not clamped to the viewport.
pub fn map_to_display(detection: &Detection, geometry: &ViewportGeometry) -> DisplayBox {
    if geometry.model_input_size == 0 {
        return DisplayBox::default();
    }
    let (scale_x, scale_y) = geometry.scale();

    let top_left_x = detection.center_x - detection.width / 2.0;
    let top_left_y = detection.center_y - detection.height / 2.0;

    DisplayBox {
        x: top_left_x * scale_x,
        y: top_left_y * scale_y,
        w: detection.width * scale_x,
        h: detection.height * scale_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl DisplayBox {
        fn center(&self) -> (f32, f32) {
            (self.x + self.w / 2.0, self.y + self.h / 2.0)
        }

        fn area(&self) -> f32 {
            self.w * self.h
        }
    }

    fn assert_close(actual: f32, expected: f32) {
        assert!((actual - expected).abs() < 1e-3, "expected {}, got {}", expected, actual);
    }

    fn nodule(cx: f32, cy: f32, w: f32, h: f32) -> Detection {
        Detection::new(cx, cy, w, h, "nodule", 0.9)
    }

    #[test]
    fn test_reference_scenario() {
        let geometry = ViewportGeometry::new(640, 512.0, 512.0);
        let b = map_to_display(&nodule(320.0, 160.0, 100.0, 50.0), &geometry);
        assert_close(b.x, 216.0);
        assert_close(b.y, 108.0);
        assert_close(b.w, 80.0);
        assert_close(b.h, 40.0);
    }

    #[test]
    fn test_centered_detection_stays_centered() {
        let geometry = ViewportGeometry::new(640, 512.0, 512.0);
        let b = map_to_display(&nodule(320.0, 320.0, 64.0, 32.0), &geometry);
        let (cx, cy) = b.center();
        assert_close(cx, 256.0);
        assert_close(cy, 256.0);
    }

    #[test]
    fn test_axes_scale_independently() {
        let geometry = ViewportGeometry::new(640, 1280.0, 320.0);
        let b = map_to_display(&nodule(320.0, 320.0, 100.0, 100.0), &geometry);
        assert_close(b.w, 200.0);
        assert_close(b.h, 50.0);
        assert_close(b.x, 540.0);
        assert_close(b.y, 135.0);
    }

    #[test]
    fn test_size_scales_linearly() {
        let geometry = ViewportGeometry::new(640, 512.0, 384.0);
        let base = map_to_display(&nodule(200.0, 240.0, 40.0, 30.0), &geometry);
        let k = 2.5;
        let scaled = map_to_display(&nodule(200.0, 240.0, 40.0 * k, 30.0 * k), &geometry);

        assert_close(scaled.w, base.w * k);
        assert_close(scaled.h, base.h * k);
        // Center is preserved, so the box grows around it
        let (bx, by) = base.center();
        let (sx, sy) = scaled.center();
        assert_close(sx, bx);
        assert_close(sy, by);
    }

    #[test]
    fn test_boxes_are_not_clamped() {
        let geometry = ViewportGeometry::new(640, 512.0, 512.0);
        let b = map_to_display(&nodule(10.0, 630.0, 60.0, 60.0), &geometry);
        assert!(b.x < 0.0);
        assert!(b.y + b.h > 512.0);
    }

    #[test]
    fn test_zero_display_width_gives_zero_area() {
        let geometry = ViewportGeometry::new(640, 0.0, 512.0);
        let b = map_to_display(&nodule(320.0, 160.0, 100.0, 50.0), &geometry);
        assert_eq!(b.w, 0.0);
        assert_eq!(b.x, 0.0);
        assert_eq!(b.area(), 0.0);
    }

    #[test]
    fn test_zero_model_input_gives_empty_box() {
        let geometry = ViewportGeometry::new(0, 512.0, 512.0);
        let b = map_to_display(&nodule(320.0, 160.0, 100.0, 50.0), &geometry);
        assert_eq!(b, DisplayBox::default());
    }

    #[test]
    fn test_from_viewport_falls_back_to_default_size() {
        let geometry = ViewportGeometry::from_viewport(640, 0.0, -3.0);
        assert_eq!(geometry.display_width, DEFAULT_DISPLAY_SIZE);
        assert_eq!(geometry.display_height, DEFAULT_DISPLAY_SIZE);

        let geometry = ViewportGeometry::from_viewport(640, f32::NAN, 300.0);
        assert_eq!(geometry.display_width, DEFAULT_DISPLAY_SIZE);
        assert_eq!(geometry.display_height, 300.0);
    }
}
