//! HTTP protocol layer module
//!
//! Request-independent pieces: content typing, byte sniffing, query
//! overrides and response builders.

pub mod content_sniff;
pub mod mime;
pub mod query;
pub mod response;
pub mod sniff;

// Re-export commonly used types
pub use query::RequestOverrides;
pub use response::{
    build_403_response, build_404_response, build_405_response, build_500_response,
    build_empty_response, build_file_response, build_html_response,
};
