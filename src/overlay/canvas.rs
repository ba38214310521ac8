//! iced canvas backend for the overlay.
//!
//! The canvas is laid out with the same fixed size as the image viewer and
//! stacked on top of it. Geometry is taken from the canvas bounds on every
//! draw, so the overlay buffer always matches the rendered viewport.

use iced::alignment;
use iced::font::Weight;
use iced::widget::canvas::{self, Frame, Path, Stroke};
use iced::{mouse, Color, Font, Pixels, Point, Rectangle, Renderer, Size, Theme};

use super::{DrawSurface, OverlayLayer, OverlayStyle};
use crate::detection::ViewportGeometry;

/// Average advance of a bold sans-serif glyph relative to the font size.
/// Canvas text cannot be measured before layout, so label widths are estimated.
const BOLD_CHAR_ADVANCE: f32 = 0.6;

/// `DrawSurface` on top of an iced geometry frame
pub struct FrameSurface<'a> {
    renderer: &'a Renderer,
    frame: Frame,
    size: Size,
}

impl<'a> FrameSurface<'a> {
    pub fn new(renderer: &'a Renderer, size: Size) -> Self {
        Self {
            renderer,
            frame: Frame::new(renderer, size),
            size,
        }
    }

    pub fn into_geometry(self) -> canvas::Geometry {
        self.frame.into_geometry()
    }
}

impl DrawSurface for FrameSurface<'_> {
    fn resize(&mut self, width: f32, height: f32) {
        self.size = Size::new(width, height);
        self.frame = Frame::new(self.renderer, self.size);
    }

    fn clear(&mut self) {
        self.frame = Frame::new(self.renderer, self.size);
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Color) {
        self.frame.fill_rectangle(rect.position(), rect.size(), color);
    }

    fn stroke_rect(&mut self, rect: Rectangle, color: Color, width: f32) {
        let path = Path::rectangle(rect.position(), rect.size());
        self.frame.stroke(&path, Stroke::default().with_color(color).with_width(width));
    }

    fn stroke_polyline(&mut self, points: &[Point], color: Color, width: f32) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        if rest.is_empty() {
            return;
        }
        let path = Path::new(|builder| {
            builder.move_to(*first);
            for point in rest {
                builder.line_to(*point);
            }
        });
        self.frame.stroke(&path, Stroke::default().with_color(color).with_width(width));
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * BOLD_CHAR_ADVANCE
    }

    fn draw_text(&mut self, text: &str, position: Point, color: Color, font_size: f32) {
        self.frame.fill_text(canvas::Text {
            content: text.to_string(),
            position,
            color,
            size: Pixels(font_size),
            font: Font {
                weight: Weight::Bold,
                ..Font::DEFAULT
            },
            vertical_alignment: alignment::Vertical::Bottom,
            ..canvas::Text::default()
        });
    }
}

/// Canvas program that paints an `OverlayLayer`
pub struct OverlayCanvas<'a> {
    layer: &'a OverlayLayer,
    model_input_size: u32,
    style: OverlayStyle,
}

impl<'a> OverlayCanvas<'a> {
    pub fn new(layer: &'a OverlayLayer, model_input_size: u32, style: OverlayStyle) -> Self {
        Self {
            layer,
            model_input_size,
            style,
        }
    }
}

impl<Message> canvas::Program<Message> for OverlayCanvas<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        // Re-query the live size right before drawing
        let geometry = ViewportGeometry::from_viewport(self.model_input_size, bounds.width, bounds.height);
        let mut surface = FrameSurface::new(renderer, bounds.size());
        self.layer.draw(&mut surface, &geometry, &self.style);
        vec![surface.into_geometry()]
    }
}
