use iced::{Color, Point, Rectangle};

/// Minimal 2D drawing capability the overlay renderer needs.
///
/// Coordinates are surface pixels with a top-left origin.
pub trait DrawSurface {
    /// Set the pixel size of the drawing buffer. Previous content is dropped.
    fn resize(&mut self, width: f32, height: f32);

    /// Erase everything back to transparent
    fn clear(&mut self);

    fn fill_rect(&mut self, rect: Rectangle, color: Color);

    fn stroke_rect(&mut self, rect: Rectangle, color: Color, width: f32);

    /// Connected line through all points; fewer than two points draws nothing
    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f32);

    /// Rendered width of `text` at `font_size`
    fn measure_text(&self, text: &str, font_size: f32) -> f32;

    /// `position` is the bottom-left corner of the text run
    fn draw_text(&mut self, text: &str, position: Point, color: Color, font_size: f32);
}

#[cfg(test)]
pub use recording::{DrawOp, RecordingSurface};

#[cfg(test)]
mod recording {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawOp {
        Resize(f32, f32),
        Clear,
        FillRect(Rectangle, Color),
        StrokeRect(Rectangle, Color, f32),
        StrokePolyline(Vec<Point>, Color, f32),
        DrawText(String, Point, Color, f32),
    }

    /// Fake surface that records every call in order
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<DrawOp>,
        pub size: (f32, f32),
    }

    impl RecordingSurface {
        /// Fixed advance per character so label layout is predictable
        pub const CHAR_ADVANCE: f32 = 0.5;

        pub fn new() -> Self {
            Self::default()
        }

        /// Operations issued after the most recent clear
        pub fn visible_ops(&self) -> &[DrawOp] {
            let start = self
                .ops
                .iter()
                .rposition(|op| *op == DrawOp::Clear)
                .map(|i| i + 1)
                .unwrap_or(0);
            &self.ops[start..]
        }

        pub fn texts(&self) -> Vec<&str> {
            self.visible_ops()
                .iter()
                .filter_map(|op| match op {
                    DrawOp::DrawText(text, ..) => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl DrawSurface for RecordingSurface {
        fn resize(&mut self, width: f32, height: f32) {
            self.size = (width, height);
            self.ops.push(DrawOp::Resize(width, height));
        }

        fn clear(&mut self) {
            self.ops.push(DrawOp::Clear);
        }

        fn fill_rect(&mut self, rect: Rectangle, color: Color) {
            self.ops.push(DrawOp::FillRect(rect, color));
        }

        fn stroke_rect(&mut self, rect: Rectangle, color: Color, width: f32) {
            self.ops.push(DrawOp::StrokeRect(rect, color, width));
        }

        fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f32) {
            self.ops.push(DrawOp::StrokePolyline(points.to_vec(), color, width));
        }

        fn measure_text(&self, text: &str, font_size: f32) -> f32 {
            text.chars().count() as f32 * font_size * Self::CHAR_ADVANCE
        }

        fn draw_text(&mut self, text: &str, position: Point, color: Color, font_size: f32) {
            self.ops.push(DrawOp::DrawText(text.to_string(), position, color, font_size));
        }
    }
}
