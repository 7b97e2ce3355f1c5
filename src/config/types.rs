// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    /// Route definitions in declaration order (`[[route]]` tables)
    #[serde(default, rename = "route")]
    pub routes: Vec<RouteConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
    /// Serve HTTPS instead of plain HTTP
    pub tls: bool,
    /// PEM certificate chain, required when `tls` is on
    #[serde(default)]
    pub certfile: String,
    /// PEM private key, required when `tls` is on
    #[serde(default)]
    pub keyfile: String,
}

impl ServerConfig {
    /// URL scheme handed to index templates
    pub const fn scheme(&self) -> &'static str {
        if self.tls {
            "https"
        } else {
            "http"
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// A single `[[route]]` entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Regular expression matched against the start of the request path
    pub pattern: String,
    /// Filesystem directory (or file, for aliases) served by this route
    pub path: String,
    /// Higher priorities are tried first
    #[serde(default)]
    pub priority: i64,
    /// Serve `path` itself for every request this route matches
    #[serde(default, rename = "filealias")]
    pub file_alias: bool,
    /// Look for `index.html` or render `useindex` when the target is a directory
    #[serde(default, rename = "findindex")]
    pub find_index: bool,
    /// Template rendered as the directory listing
    #[serde(default, rename = "useindex")]
    pub use_index: String,
}

impl RouteConfig {
    /// Route installed when the configuration declares none
    pub fn fallback() -> Self {
        Self {
            pattern: "/".to_string(),
            path: "./pub".to_string(),
            priority: 0,
            file_alias: false,
            find_index: false,
            use_index: String::new(),
        }
    }
}
