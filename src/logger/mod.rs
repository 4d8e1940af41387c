//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Startup banner
//! - Access logging with multiple formats
//! - Error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::{AccessLogEntry, AccessLogFormat};

use crate::config::Config;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

const RULE: &str = "==================================================";

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.logging.is_debug(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
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

fn debug_enabled() -> bool {
    writer::get().is_some_and(writer::LogWriter::debug_enabled)
}

/// Lines of the startup banner
pub fn banner_lines(base_dir: &Path, port: u16, lan_ip: Ipv4Addr) -> Vec<String> {
    vec![
        String::new(),
        RULE.to_string(),
        "lanserve is up".to_string(),
        format!("Base directory: {}", base_dir.display()),
        format!("Local:   http://localhost:{port}"),
        format!("Network: http://{lan_ip}:{port}"),
        RULE.to_string(),
        String::new(),
    ]
}

pub fn log_server_start(addr: &SocketAddr, base_dir: &Path, lan_ip: Ipv4Addr, config: &Config) {
    // Always on the console, even when the access log goes to a file
    for line in banner_lines(base_dir, addr.port(), lan_ip) {
        println!("{line}");
    }
    log_debug(&format!("Listening on {addr}, log level {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        log_debug(&format!("Worker threads: {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_debug(message: &str) {
    if debug_enabled() {
        write_info(&format!("[DEBUG] {message}"));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        write_info(&format!("[Headers] Count: {count}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &AccessLogFormat) {
    let line = entry.render(format);
    match writer::get() {
        Some(w) => w.write_access(&line),
        None => println!("{line}"),
    }
}

pub fn log_shutdown(active_connections: usize) {
    log_info(&format!(
        "Shutting down, {active_connections} connection(s) still finishing"
    ));
}
