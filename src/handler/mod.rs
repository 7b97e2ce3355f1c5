//! Request handler module
//!
//! Responsible for request dispatch and content resolution: route matching,
//! index discovery, directory listing templates and raw file serving.

pub mod listing;
pub mod resolver;
pub mod router;
pub mod static_files;
pub mod template;

pub use resolver::{ContentResolver, Resolution};
// Re-export main entry point
pub use router::handle_request;
