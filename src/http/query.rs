//! Request-level override parameters
//!
//! - `findindex=false` disables directory-index handling for one request.
//!   Only the literal `false` counts.
//! - `clearcache=<anything non-empty>` drops every compiled index template
//!   before the request is handled.

use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOverrides {
    pub find_index: bool,
    pub clear_cache: bool,
}

impl Default for RequestOverrides {
    fn default() -> Self {
        Self {
            find_index: true,
            clear_cache: false,
        }
    }
}

impl RequestOverrides {
    /// Parse the raw query string. The first occurrence of a key wins.
    pub fn from_query(query: Option<&str>) -> Self {
        let Some(query) = query else {
            return Self::default();
        };

        let mut find_index = None;
        let mut clear_cache = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "findindex" if find_index.is_none() => find_index = Some(value != "false"),
                "clearcache" if clear_cache.is_none() => clear_cache = Some(!value.is_empty()),
                _ => {}
            }
        }

        Self {
            find_index: find_index.unwrap_or(true),
            clear_cache: clear_cache.unwrap_or(false),
        }
    }
}
