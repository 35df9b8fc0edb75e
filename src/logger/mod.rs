//! Logger module
//!
//! Provides logging utilities for the service including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Slide generation and download events
//! - Error and warning logging with a configurable minimum level

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// Log severity, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
}

impl Level {
    /// Parse a level name; unknown names fall back to `Info`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "debug" | "trace" => Self::Debug,
            _ => Self::Info,
        }
    }
}

static MAX_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

fn enabled(level: Level) -> bool {
    level as u8 <= MAX_LEVEL.load(Ordering::Relaxed)
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    MAX_LEVEL.store(Level::parse(&config.logging.level) as u8, Ordering::Relaxed);
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    if !enabled(Level::Info) {
        return;
    }
    write_info("======================================");
    write_info("Slide deck service started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info(&format!("Output directory: {}", config.storage.output_dir));
    write_info(&format!(
        "Template: {}/{}",
        config.storage.templates_dir, config.storage.template_file
    ));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("  - POST /generate");
    write_info("  - GET  /download/{filename}");
    write_info("======================================\n");
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(&format!("[INFO] {message}"));
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    log_error(&format!("Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        log_debug(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_directories_ready(output_dir: &std::path::Path, templates_dir: &std::path::Path) {
    log_info(&format!(
        "Directories ready: output={}, templates={}",
        output_dir.display(),
        templates_dir.display()
    ));
}

pub fn log_template_missing(path: &std::path::Path) {
    log_debug(&format!(
        "[Generate] Template {} not found, using built-in default",
        path.display()
    ));
}

pub fn log_generation_started(slides: usize) {
    log_debug(&format!("[Generate] Building presentation with {slides} slide(s)"));
}

pub fn log_generation_finished(file_name: &str, slides: usize, elapsed: Duration) {
    log_info(&format!(
        "[Generate] Saved {file_name} ({slides} slide(s)) in {}ms",
        elapsed.as_millis()
    ));
}

pub fn log_generation_failed(reason: &str) {
    log_error(&format!("[Generate] {reason}"));
}

/// The layout had no body placeholder, so a slide's content was not written
pub fn log_content_dropped(slide_index: usize) {
    log_warning(&format!(
        "[Generate] Slide {} has no body placeholder; content dropped",
        slide_index + 1
    ));
}

pub fn log_download_rejected(file_name: &str) {
    log_warning(&format!("Rejected download file name: {file_name:?}"));
}

pub fn log_shutdown_requested(signal: &str) {
    log_info(&format!("[Shutdown] {signal} received, no longer accepting connections"));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        log_info("[Shutdown] All connections closed");
    } else {
        log_warning(&format!(
            "[Shutdown] Timed out with {remaining} connection(s) still open"
        ));
    }
}
