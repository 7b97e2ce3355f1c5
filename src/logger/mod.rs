//! Logger module
//!
//! Provides logging utilities for the server including:
//! - Server lifecycle and route table logging
//! - Access logging with multiple formats
//! - Leveled error, warning and debug logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::{Config, LoggingConfig};
use crate::routing::RouteTable;

/// Log verbosity, least verbose first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" | "trace" => Ok(Self::Debug),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    let level = config.level.parse().map_err(|e: String| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    writer::init(
        level,
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(Level::Info, writer::LogWriter::level) >= level
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

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    let scheme = config.server.scheme();
    write_info("======================================");
    write_info("Static server started successfully");
    write_info(&format!("Listening on: {scheme}://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if config.server.tls {
        write_info(&format!("TLS certificate: {}", config.server.certfile));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

/// Dump the route table in match order
pub fn log_routes(routes: &RouteTable) {
    write_info(&format!("[Routes] {} route(s), in match order:", routes.iter().len()));
    for route in routes.iter() {
        let mut flags = Vec::new();
        if route.file_alias {
            flags.push("filealias".to_string());
        }
        if route.find_index {
            flags.push("findindex".to_string());
        }
        if let Some(ref tmpl) = route.index_template {
            flags.push(format!("useindex={}", tmpl.display()));
        }
        write_info(&format!(
            "  pattern={}; path={}; priority={}{}{}",
            route.pattern,
            route.path,
            route.priority,
            if flags.is_empty() { "" } else { "; " },
            flags.join(", ")
        ));
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    log_debug(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Display) {
    log_warning(&format!("Failed to serve connection: {err}"));
}

pub fn log_cache_cleared(reason: &str, templates: usize, filters: Option<usize>) {
    let filters = filters.map_or_else(String::new, |n| format!(", {n} filter pattern(s)"));
    log_info(&format!(
        "[Cache] Cleared {templates} index template(s){filters} ({reason})"
    ));
}

pub fn log_error(message: &str) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
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

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    match writer::get() {
        Some(w) => w.write_access(&entry.format(format)),
        None => println!("{}", entry.format(format)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing_and_order() {
        assert_eq!("INFO".parse::<Level>(), Ok(Level::Info));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert!("loud".parse::<Level>().is_err());
        assert!(Level::Debug > Level::Info);
        assert!(Level::Error < Level::Warn);
    }
}
