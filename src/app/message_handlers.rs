// Message routing for the application update loop
use std::path::PathBuf;

use iced::widget::image::Handle;
use iced::Task;
use log::{debug, error, info, warn};

use crate::app::{Message, ScanLens};
use crate::config::APP_NAME;
use crate::file_io;
use crate::logging;
use crate::session::SessionError;

/// Main entry point for handling all messages
pub fn handle_message(app: &mut ScanLens, message: Message) -> Task<Message> {
    match message {
        Message::OpenFile => open_file_dialog(app),
        Message::FileSelected(result) => handle_file_selected(app, result),
        Message::FileRead(path, result) => {
            handle_file_read(app, &path, result);
            Task::none()
        }
        Message::Analyze => start_analysis(app),
        Message::AnalysisFinished(ticket, result) => {
            let applied = app.session.finish_analysis(ticket, result.map_err(SessionError::from));
            if !applied {
                debug!("Analysis result arrived after the file changed");
            }
            Task::none()
        }
        Message::ExportDebugLogs => {
            logging::export_and_open_debug_logs(APP_NAME, &app.log_buffer);
            Task::none()
        }
    }
}

fn open_file_dialog(app: &ScanLens) -> Task<Message> {
    Task::perform(file_io::pick_file(app.config.file_extensions.clone()), Message::FileSelected)
}

/// Read a file off the UI thread and hand the bytes back as `FileRead`
pub fn read_file_task(path: PathBuf) -> Task<Message> {
    let reply_path = path.clone();
    Task::perform(file_io::read_file(path), move |result| {
        Message::FileRead(reply_path.clone(), result)
    })
}

fn handle_file_selected(app: &mut ScanLens, result: Result<PathBuf, file_io::Error>) -> Task<Message> {
    match result {
        Ok(path) => {
            info!("Selected {}", path.display());
            read_file_task(path)
        }
        Err(file_io::Error::DialogClosed) => {
            debug!("File dialog closed without a selection");
            Task::none()
        }
        Err(e) => {
            reject_file(app, SessionError::Decode(e.to_string()));
            Task::none()
        }
    }
}

fn handle_file_read(app: &mut ScanLens, path: &std::path::Path, result: Result<Vec<u8>, file_io::Error>) {
    let bytes = match result {
        Ok(bytes) => bytes,
        Err(e) => {
            reject_file(app, SessionError::Decode(e.to_string()));
            return;
        }
    };

    match app.viewer.load(&bytes) {
        Ok(raster) => {
            let (width, height) = raster.dimensions();
            app.image_handle = Some(Handle::from_rgba(width, height, raster.pixels().as_raw().clone()));
            let name = file_io::get_filename(path).unwrap_or_else(|| path.display().to_string());
            app.session.file_loaded(&name);
        }
        Err(e) => reject_file(app, e.into()),
    }
}

fn reject_file(app: &mut ScanLens, error: SessionError) {
    app.viewer.unload();
    app.image_handle = None;
    app.session.file_rejected(error);
}

fn start_analysis(app: &mut ScanLens) -> Task<Message> {
    let Some(ticket) = app.session.begin_analysis() else {
        warn!("Analyze requested while not allowed ({:?})", app.session.state());
        return Task::none();
    };

    let png = match app.viewer.capture_png() {
        Ok(png) => png,
        Err(e) => {
            app.session.finish_analysis(ticket, Err(e.into()));
            return Task::none();
        }
    };

    let client = match &app.client {
        Ok(client) => client.clone(),
        Err(e) => {
            error!("Detection client unavailable: {}", e);
            app.session.finish_analysis(ticket, Err(e.clone().into()));
            return Task::none();
        }
    };

    debug!("Analysis {:?} posting snapshot to {}", ticket, client.endpoint());
    Task::perform(async move { client.detect(png).await }, move |result| {
        Message::AnalysisFinished(ticket, result)
    })
}
