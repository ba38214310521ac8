//! Confidence-tiered bounding box drawing
//!
//! Each box gets a translucent fill, a solid border, four L-shaped corner
//! accents and a label badge sitting on top of its top-left corner.

use iced::{Color, Point, Rectangle, Size};

use super::surface::DrawSurface;
use crate::config::DEFAULT_LABEL_FONT_SIZE;
use crate::detection::{classify, map_to_display, Detection, DisplayBox, ViewportGeometry};

pub const FILL_ALPHA: f32 = 0.2;
pub const STROKE_WIDTH: f32 = 2.0;
pub const CORNER_FRACTION: f32 = 0.1;
pub const LABEL_PADDING: f32 = 4.0;
const LABEL_BACKGROUND: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.7 };

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub label_font_size: f32,
}

impl OverlayStyle {
    /// Badge text line height; 18px for the default 14px font
    pub fn label_height(&self) -> f32 {
        self.label_font_size + LABEL_PADDING
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self { label_font_size: DEFAULT_LABEL_FONT_SIZE }
    }
}

/// A detection mapped into display space, ready to draw
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayBox {
    pub rect: DisplayBox,
    pub color: Color,
    pub label: String,
    pub confidence: f32,
}

impl OverlayBox {
    pub fn from_detection(detection: &Detection, geometry: &ViewportGeometry) -> Self {
        let (_, color) = classify(detection.confidence);
        Self {
            rect: map_to_display(detection, geometry),
            color,
            label: detection.label.clone(),
            confidence: detection.confidence,
        }
    }
}

pub fn label_text(label: &str, confidence: f32) -> String {
    format!("{} ({:.1}%)", label, confidence * 100.0)
}

/// Three-point polylines for the top-left, top-right, bottom-right and
/// bottom-left corners, each running edge -> corner -> edge.
pub fn corner_brackets(rect: &DisplayBox) -> [[Point; 3]; 4] {
    let len = rect.w.min(rect.h) * CORNER_FRACTION;
    let (x, y, w, h) = (rect.x, rect.y, rect.w, rect.h);
    [
        [Point::new(x, y + len), Point::new(x, y), Point::new(x + len, y)],
        [Point::new(x + w - len, y), Point::new(x + w, y), Point::new(x + w, y + len)],
        [Point::new(x + w, y + h - len), Point::new(x + w, y + h), Point::new(x + w - len, y + h)],
        [Point::new(x + len, y + h), Point::new(x, y + h), Point::new(x, y + h - len)],
    ]
}

fn to_rectangle(rect: &DisplayBox) -> Rectangle {
    Rectangle::new(Point::new(rect.x, rect.y), Size::new(rect.w, rect.h))
}

/// Resize the surface to the live viewport and erase it.
pub fn clear<S: DrawSurface + ?Sized>(surface: &mut S, geometry: &ViewportGeometry) {
    surface.resize(geometry.display_width, geometry.display_height);
    surface.clear();
}

/// Draw all boxes in the order given; later boxes paint over earlier ones.
pub fn render<S: DrawSurface + ?Sized>(
    surface: &mut S,
    boxes: &[OverlayBox],
    geometry: &ViewportGeometry,
    style: &OverlayStyle,
) {
    clear(surface, geometry);

    for overlay_box in boxes {
        draw_box(surface, overlay_box, style);
    }
}

fn draw_box<S: DrawSurface + ?Sized>(surface: &mut S, overlay_box: &OverlayBox, style: &OverlayStyle) {
    let rect = to_rectangle(&overlay_box.rect);
    let color = overlay_box.color;

    surface.fill_rect(rect, Color { a: FILL_ALPHA, ..color });
    surface.stroke_rect(rect, color, STROKE_WIDTH);

    for bracket in corner_brackets(&overlay_box.rect) {
        surface.stroke_polyline(&bracket, color, STROKE_WIDTH);
    }

    let text = label_text(&overlay_box.label, overlay_box.confidence);
    let text_width = surface.measure_text(&text, style.label_font_size);
    let label_height = style.label_height();
    let top_left = Point::new(overlay_box.rect.x, overlay_box.rect.y);

    // Background sits flush on the box top; its bottom edge is at rect.y
    let background = Rectangle::new(
        Point::new(top_left.x, top_left.y - label_height - LABEL_PADDING),
        Size::new(text_width + 2.0 * LABEL_PADDING, label_height + LABEL_PADDING),
    );
    surface.fill_rect(background, LABEL_BACKGROUND);
    surface.draw_text(
        &text,
        Point::new(top_left.x + LABEL_PADDING, top_left.y - LABEL_PADDING),
        color,
        style.label_font_size,
    );
}
