//! Logging for ScanLens
//!
//! - `setup_logger()` installs a composite logger: colored env_logger output on
//!   the console plus an in-memory ring buffer of the last `MAX_LOG_LINES`
//!   crate messages.
//! - `export_debug_logs()` dumps that buffer to `<data_dir>/scanlens/logs/debug.log`
//!   so a user can attach it to a bug report.
//! - `setup_panic_hook()` writes a backtrace and the buffered log to `panic.log`.
//!
//! Debug builds log DEBUG and above, release builds only ERROR, unless RUST_LOG is set.

use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use env_logger::fmt::{Color, Formatter};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record};

pub const LOG_TARGET: &str = "scanlens";
pub const MAX_LOG_LINES: usize = 1000;

pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

struct BufferLogger {
    log_buffer: LogBuffer,
}

impl BufferLogger {
    fn new() -> Self {
        Self {
            log_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_LINES))),
        }
    }

    fn log_to_buffer(&self, message: &str, target: &str, line: Option<u32>) {
        let Ok(mut buffer) = self.log_buffer.lock() else {
            return;
        };
        if buffer.len() == MAX_LOG_LINES {
            buffer.pop_front();
        }

        let formatted_message = match line {
            Some(line_num) => format!("{target}:{line_num} {message}"),
            None => format!("{target} {message}"),
        };
        buffer.push_back(formatted_message);
    }

    fn get_shared_buffer(&self) -> LogBuffer {
        Arc::clone(&self.log_buffer)
    }
}

impl Log for BufferLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.target().starts_with(LOG_TARGET) && metadata.level() <= LevelFilter::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("{:<5} {}", record.level(), record.args());
            self.log_to_buffer(&message, record.target(), record.line());
        }
    }

    fn flush(&self) {}
}

struct CompositeLogger {
    console_logger: env_logger::Logger,
    buffer_logger: BufferLogger,
}

impl Log for CompositeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console_logger.enabled(metadata) || self.buffer_logger.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.console_logger.enabled(record.metadata()) {
            self.console_logger.log(record);
        }
        if self.buffer_logger.enabled(record.metadata()) {
            self.buffer_logger.log(record);
        }
    }

    fn flush(&self) {
        self.console_logger.flush();
        self.buffer_logger.flush();
    }
}

fn format_record(buf: &mut Formatter, record: &Record) -> std::io::Result<()> {
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

    let module_info = match (record.module_path(), record.line()) {
        (Some(module), Some(line)) => format!("{module}:{line}"),
        (Some(module), None) => module.to_string(),
        (None, Some(line)) => format!("line:{line}"),
        (None, None) => "unknown".to_string(),
    };

    let mut level_style = buf.style();
    let mut meta_style = buf.style();

    match record.level() {
        Level::Error => level_style.set_color(Color::Red).set_bold(true),
        Level::Warn => level_style.set_color(Color::Yellow).set_bold(true),
        Level::Info => level_style.set_color(Color::Green).set_bold(true),
        Level::Debug => level_style.set_color(Color::Blue).set_bold(true),
        Level::Trace => level_style.set_color(Color::White),
    };

    // Color::Rgb does not render on the macOS terminal
    #[cfg(target_os = "macos")]
    meta_style.set_color(Color::Blue);
    #[cfg(not(target_os = "macos"))]
    meta_style.set_color(Color::Rgb(120, 120, 120));

    writeln!(
        buf,
        "{} {} {} {}",
        meta_style.value(timestamp),
        level_style.value(record.level()),
        meta_style.value(module_info),
        record.args()
    )
}

/// Install the global logger and return the shared ring buffer.
///
/// Calling this twice is harmless; the second call gets a fresh, unattached
/// buffer and logs to stderr that a logger was already set.
pub fn setup_logger() -> LogBuffer {
    let buffer_logger = BufferLogger::new();
    let shared_buffer = buffer_logger.get_shared_buffer();

    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_env("RUST_LOG");
    } else if cfg!(debug_assertions) {
        builder.filter(Some(LOG_TARGET), LevelFilter::Debug);
    } else {
        builder.filter(Some(LOG_TARGET), LevelFilter::Error);
    }

    // Silence other crates (wgpu, reqwest, ...)
    builder.filter(None, LevelFilter::Off);
    builder.format(format_record);

    let composite_logger = CompositeLogger {
        console_logger: builder.build(),
        buffer_logger,
    };

    if let Err(e) = log::set_boxed_logger(Box::new(composite_logger)) {
        eprintln!("Failed to set logger: {e}");
        return shared_buffer;
    }
    log::set_max_level(LevelFilter::Trace);

    shared_buffer
}

pub fn get_log_directory(app_name: &str) -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join(app_name).join("logs")
}

fn snapshot(log_buffer: &LogBuffer) -> Vec<String> {
    match log_buffer.lock() {
        Ok(buffer) => buffer.iter().cloned().collect(),
        Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
    }
}

/// Write the buffered log entries to `debug.log` inside `log_dir`.
pub fn write_debug_log(log_dir: &Path, log_buffer: &LogBuffer) -> Result<PathBuf, std::io::Error> {
    std::fs::create_dir_all(log_dir)?;
    let debug_log_path = log_dir.join("debug.log");

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&debug_log_path)?;

    // Copy out first so the lock is not held across file IO
    let entries = snapshot(log_buffer);
    let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

    writeln!(file, "{timestamp} [DEBUG EXPORT] ScanLens debug log")?;
    for line in crate::build_info::BuildInfo::detailed_info().lines() {
        writeln!(file, "{timestamp} [DEBUG EXPORT] {line}")?;
    }
    writeln!(file, "{timestamp} [DEBUG EXPORT] {} of max {MAX_LOG_LINES} entries", entries.len())?;
    writeln!(file)?;

    if entries.is_empty() {
        writeln!(file, "{timestamp} [DEBUG EXPORT] No log entries found in buffer")?;
    }
    for entry in &entries {
        writeln!(file, "{timestamp} {entry}")?;
    }
    file.flush()?;

    Ok(debug_log_path)
}

pub fn export_debug_logs(app_name: &str, log_buffer: &LogBuffer) -> Result<PathBuf, std::io::Error> {
    let path = write_debug_log(&get_log_directory(app_name), log_buffer)?;
    info!("Debug logs exported to: {}", path.display());
    Ok(path)
}

/// Export the debug log and reveal its directory in the platform file manager.
pub fn export_and_open_debug_logs(app_name: &str, log_buffer: &LogBuffer) {
    match export_debug_logs(app_name, log_buffer) {
        Ok(path) => {
            if let Some(dir) = path.parent() {
                open_in_file_explorer(dir);
            }
        }
        Err(e) => error!("Failed to export debug logs: {}", e),
    }
}

pub fn open_in_file_explorer(path: &Path) {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "linux") {
        "xdg-open"
    } else {
        error!("Opening directories is not supported on this OS.");
        return;
    };

    if let Err(e) = Command::new(program).arg(path).spawn() {
        error!("Failed to open {} with {}: {}", path.display(), program, e);
    }
}

pub fn setup_panic_hook(app_name: &str, log_buffer: LogBuffer) {
    let log_file_path = get_log_directory(app_name).join("panic.log");
    if let Some(parent) = log_file_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {e}", parent.display());
        }
    }

    panic::set_hook(Box::new(move |info| {
        let backtrace = backtrace::Backtrace::new();
        let timestamp = Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ");

        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown location".to_string());
        let header_msg = format!("[PANIC] at {location} - {info}");
        let backtrace_lines: Vec<String> = format!("{backtrace:?}")
            .lines()
            .map(|line| format!("[BACKTRACE] {}", line.trim()))
            .collect();

        eprintln!("\n\n{header_msg}");
        for line in &backtrace_lines {
            eprintln!("{line}");
        }

        // Inside a panic hook there is nowhere left to report IO errors
        let written = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&log_file_path)?;
            writeln!(file, "{timestamp} {header_msg}")?;
            for line in &backtrace_lines {
                writeln!(file, "{timestamp} {line}")?;
            }
            writeln!(file)?;
            writeln!(file, "{timestamp} [PANIC] Last {MAX_LOG_LINES} log entries:")?;
            for entry in snapshot(&log_buffer) {
                writeln!(file, "{timestamp} {entry}")?;
            }
            Ok(())
        })();

        if written.is_ok() {
            eprintln!("\nA complete crash log has been written to: {}", log_file_path.display());
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at<'a>(target: &'a str, level: Level, args: std::fmt::Arguments<'a>) -> Record<'a> {
        Record::builder().target(target).level(level).line(Some(7)).args(args).build()
    }

    #[test]
    fn test_buffer_keeps_only_crate_messages() {
        let logger = BufferLogger::new();
        logger.log(&record_at("scanlens::session", Level::Info, format_args!("loaded")));
        logger.log(&record_at("wgpu_core", Level::Info, format_args!("noise")));
        logger.log(&record_at("scanlens::viewer", Level::Trace, format_args!("too verbose")));

        let entries = snapshot(&logger.get_shared_buffer());
        assert_eq!(entries, vec!["scanlens::session:7 INFO  loaded"]);
    }

    #[test]
    fn test_buffer_is_bounded() {
        let logger = BufferLogger::new();
        for i in 0..MAX_LOG_LINES + 5 {
            logger.log(&record_at("scanlens", Level::Debug, format_args!("entry {}", i)));
        }

        let entries = snapshot(&logger.get_shared_buffer());
        assert_eq!(entries.len(), MAX_LOG_LINES);
        assert!(entries[0].ends_with("entry 5"));
    }

    #[test]
    fn test_write_debug_log() {
        let dir = tempfile::tempdir().unwrap();
        let buffer: LogBuffer = Arc::new(Mutex::new(VecDeque::from(vec![
            "scanlens::app:10 INFO  first".to_string(),
            "scanlens::app:11 WARN  second".to_string(),
        ])));

        let path = write_debug_log(&dir.path().join("logs"), &buffer).unwrap();
        assert_eq!(path.file_name().unwrap(), "debug.log");

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("ScanLens debug log"));
        assert!(content.contains("scanlens::app:10 INFO  first"));
        assert!(content.contains("scanlens::app:11 WARN  second"));
    }
}
