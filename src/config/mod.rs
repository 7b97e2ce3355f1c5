// Configuration module entry point
// Loads layered configuration and owns the shared runtime state

mod sample;
mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use sample::SAMPLE_CONFIG;
pub use state::AppState;
pub use types::{Config, LoggingConfig, RouteConfig};

/// Default configuration file, optional when not named on the command line
pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";

impl Config {
    /// Load configuration from a TOML file, environment and defaults.
    ///
    /// `required` decides whether a missing file is an error.
    pub fn load_from(config_path: &str, required: bool) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::new(config_path, config::FileFormat::Toml).required(required));
        Self::build(builder)
    }

    /// Parse configuration from an in-memory TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml));
        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, config::ConfigError> {
        let settings = builder
            .add_source(
                config::Environment::with_prefix("RXSTATIC")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.backlog", 128)?
            .set_default("server.tls", false)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        let mut cfg: Self = settings.try_deserialize()?;
        if cfg.routes.is_empty() {
            cfg.routes.push(RouteConfig::fallback());
        }
        Ok(cfg)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
