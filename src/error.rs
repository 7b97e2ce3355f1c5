//! Startup error types
//!
//! Route-table problems are fatal: the server must not start serving with a
//! table it could not build.

use thiserror::Error;

/// Errors raised while registering configured routes.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Two routes declared the same pattern string.
    #[error("duplicate route pattern '{pattern}' (path: {path})")]
    DuplicatePattern { pattern: String, path: String },

    /// The anchored pattern did not compile as a regular expression.
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
