//! Raw file serving
//!
//! Final step for every resolution that is not a rendered index: read the
//! file and send it with a content type chosen from its extension or bytes.

use std::io::ErrorKind;
use std::path::Path;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use tokio::fs;

use crate::http::{self, mime};
use crate::logger;

/// Serve a file from disk
pub async fn serve_file(path: &Path, is_head: bool) -> Response<Full<Bytes>> {
    let metadata = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) => return error_response(path, &e),
    };
    if metadata.is_dir() {
        logger::log_debug(&format!("Refusing to stream directory {}", path.display()));
        return http::build_404_response();
    }

    match fs::read(path).await {
        Ok(content) => {
            let content_type = mime::content_type_for(path, &content);
            http::build_file_response(content, content_type, is_head)
        }
        Err(e) => error_response(path, &e),
    }
}

fn error_response(path: &Path, error: &std::io::Error) -> Response<Full<Bytes>> {
    match error.kind() {
        // not found is common (404), no need to log at warning level
        ErrorKind::NotFound => http::build_404_response(),
        ErrorKind::PermissionDenied => {
            logger::log_warning(&format!("Permission denied: {}", path.display()));
            http::build_403_response()
        }
        _ => {
            logger::log_error(&format!("Failed to read file '{}': {}", path.display(), error));
            http::build_500_response()
        }
    }
}
