use iced::widget::{button, canvas, center, column, container, horizontal_space, image, row, stack, text, Column};
use iced::{Background, Color, ContentFit, Element, Length};

use crate::app::{Message, ScanLens};
use crate::overlay::canvas::OverlayCanvas;

const ERROR_COLOR: Color = Color::from_rgb(0.86, 0.21, 0.27);
const MUTED_TEXT_COLOR: Color = Color::from_rgb(0.6, 0.6, 0.6);

pub fn build_ui(app: &ScanLens) -> Element<'_, Message> {
    let analyze_label = if app.session.is_analyzing() { "Analyzing..." } else { "Analyze" };

    let controls = row![
        button(text("Upload Image")).on_press(Message::OpenFile),
        button(text(analyze_label)).on_press_maybe(app.session.can_analyze().then_some(Message::Analyze)),
        horizontal_space(),
        button(text("Export logs")).on_press(Message::ExportDebugLogs),
    ]
    .spacing(10);

    let file_label = text(app.session.file_name().unwrap_or("No file loaded"))
        .size(14)
        .color(MUTED_TEXT_COLOR);

    column![controls, file_label, build_viewer(app)]
        .push_maybe(app.session.error().map(|e| text(e.to_string()).color(ERROR_COLOR)))
        .push(build_results(app))
        .spacing(12)
        .padding(20)
        .into()
}

/// Fixed-size viewport with the overlay canvas stacked on the image
fn build_viewer(app: &ScanLens) -> Element<'_, Message> {
    let content: Element<'_, Message> = match &app.image_handle {
        Some(handle) => stack![
            image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Fill),
            canvas(OverlayCanvas::new(
                app.session.overlay(),
                app.config.model_input_size,
                app.overlay_style(),
            ))
            .width(Length::Fill)
            .height(Length::Fill),
        ]
        .into(),
        None => center(text("Upload an image to begin").color(MUTED_TEXT_COLOR)).into(),
    };

    container(content)
        .width(app.config.viewport_width)
        .height(app.config.viewport_height)
        .style(|_theme| container::Style {
            background: Some(Background::Color(Color::BLACK)),
            ..container::Style::default()
        })
        .into()
}

fn build_results(app: &ScanLens) -> Element<'_, Message> {
    let lines = app.session.summary_lines();
    if lines.is_empty() {
        return column![].into();
    }

    let list = Column::with_children(lines.into_iter().map(|line| text(line).into())).spacing(4);
    column![text("Results").size(18), list].spacing(8).into()
}
