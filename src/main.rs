extern crate iced_custom as iced;

mod app;
mod build_info;
mod cli;
mod config;
mod detection;
mod file_io;
mod headless;
mod logging;
mod overlay;
mod session;
mod settings;
mod ui;
mod viewer;

use std::process::ExitCode;

use clap::Parser;
#[allow(unused_imports)]
use log::{debug, error, info, warn};

use crate::build_info::BuildInfo;
use crate::cli::Args;
use crate::config::{Config, APP_NAME};
use crate::settings::UserSettings;

/// Settings as they will be used this run, with CLI overrides folded in
fn effective_settings(args: &Args) -> UserSettings {
    let mut settings = UserSettings::load(args.settings.as_deref());
    if let Some(endpoint) = &args.endpoint {
        settings.detection_endpoint = endpoint.clone();
    }
    if let Some(api_key) = &args.api_key {
        settings.api_key = api_key.clone();
    }
    settings
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_buffer = logging::setup_logger();
    logging::setup_panic_hook(APP_NAME, log_buffer.clone());
    info!("ScanLens {}", BuildInfo::display_version());

    let settings = effective_settings(&args);
    if args.write_settings {
        match settings.save(args.settings.as_deref()) {
            Ok(path) => info!("Settings written to {}", path.display()),
            Err(e) => error!("Failed to write settings: {}", e),
        }
    }

    let config = Config::from_settings(&settings);
    debug!("Effective config: {:?}", Config { api_key: "<redacted>".to_string(), ..config.clone() });

    if args.headless {
        let Some(path) = args.file.as_deref() else {
            eprintln!("--headless requires an image file");
            return ExitCode::FAILURE;
        };
        return match headless::run(&config, path, args.json) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Headless run failed: {}", e);
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        };
    }

    match app::run(config, log_buffer, args.file) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {}", e);
            ExitCode::FAILURE
        }
    }
}
