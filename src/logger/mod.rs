//! Logger module
//!
//! Console logging for the gateway:
//! - Server lifecycle logging
//! - Per-request access logging (`common` or `json`)
//! - Script invocation outcomes
//! - Error and warning logging, optionally redirected to files

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::{Config, ScriptPaths};
use chrono::Local;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// Prefix `message` with the local time and a `[TAG]`
fn stamped(tag: &str, message: &str) -> String {
    format!("{} [{tag}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, scripts: &ScriptPaths) {
    let port = addr.port();
    write_info("======================================");
    write_info(&format!("Starting mail service server on port {port}"));
    write_info(&format!("Listening on: http://{addr}"));
    write_info("Available endpoints:");
    write_info(&format!("  - POST http://localhost:{port}/authenticate"));
    write_info(&format!("  - POST http://localhost:{port}/contactUS"));
    write_info(&format!("Authentication script: {}", scripts.authenticate.display()));
    write_info(&format!("Contact form script: {}", scripts.contact.display()));
    write_info(&format!("Script timeout: {}s", config.scripts.timeout_secs));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown(in_flight: usize) {
    write_info("\nShutting down server...");
    if in_flight > 0 {
        write_info(&stamped(
            "SHUTDOWN",
            &format!("Terminating {in_flight} in-flight connection(s)"),
        ));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&stamped("ERROR", &format!("Failed to serve connection: {err:?}")));
}

pub fn log_error(message: &str) {
    write_error(&stamped("ERROR", message));
}

pub fn log_warning(message: &str) {
    write_error(&stamped("WARN", message));
}

pub fn log_signal(name: &str) {
    write_info(&stamped("SIGNAL", &format!("{name} received, initiating shutdown")));
}

pub fn log_script_finished(script: &Path, code: Option<i32>, elapsed: Duration) {
    let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
    write_info(&stamped(
        "SCRIPT",
        &format!("{} exited with {code} after {}ms", script.display(), elapsed.as_millis()),
    ));
}

pub fn log_script_timeout(script: &Path, timeout: Duration) {
    write_error(&stamped(
        "SCRIPT",
        &format!("{} killed after exceeding {}s timeout", script.display(), timeout.as_secs_f64()),
    ));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
