//! Directory listing
//!
//! Produces the `{files, folders}` map handed to index templates. Only the
//! immediate children of a directory are listed; hidden sub-folders are
//! skipped and files may be filtered by a MIME regular expression.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::sync::{PoisonError, RwLock};

use regex::Regex;
use serde::Serialize;

use crate::http::sniff;
use crate::logger;

/// Marker stored for every listed folder
pub const FOLDER_MARKER: &str = "folder";

/// MIME type recorded when a file cannot be opened for sniffing
const UNREADABLE_MIME: &str = "application/octet-stream";

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryListing {
    /// File name to MIME type (empty when undetermined)
    pub files: BTreeMap<String, String>,
    /// Folder name to [`FOLDER_MARKER`]
    pub folders: BTreeMap<String, String>,
}

/// Compiled filter patterns keyed by their source text.
///
/// Invalid patterns are remembered as `None` so they are reported once.
#[derive(Debug, Default)]
pub struct FilterCache {
    patterns: RwLock<HashMap<String, Option<Regex>>>,
}

impl FilterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled regex for `pattern`, `None` when it does not compile
    pub fn get(&self, pattern: &str) -> Option<Regex> {
        if let Some(cached) = self
            .patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(pattern)
        {
            return cached.clone();
        }

        let compiled = match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                logger::log_warning(&format!("Ignoring invalid listing filter '{pattern}': {e}"));
                None
            }
        };
        self.patterns
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(pattern.to_string())
            .or_insert(compiled)
            .clone()
    }

    /// Drop every compiled pattern at once
    pub fn clear(&self) {
        *self.patterns.write().unwrap_or_else(PoisonError::into_inner) = HashMap::new();
    }

    pub fn len(&self) -> usize {
        self.patterns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Lists directories for index templates
#[derive(Debug, Default)]
pub struct DirectoryLister {
    filters: FilterCache,
}

impl DirectoryLister {
    pub fn new() -> Self {
        Self {
            filters: FilterCache::new(),
        }
    }

    pub const fn filters(&self) -> &FilterCache {
        &self.filters
    }

    /// List the immediate children of `dir`.
    ///
    /// A missing or non-directory path yields an empty listing. A non-empty
    /// `filter` keeps only files whose MIME type it matches; folders are
    /// never filtered.
    pub fn list(&self, dir: &Path, filter: &str) -> DirectoryListing {
        let mut listing = DirectoryListing::default();

        let Ok(entries) = fs::read_dir(dir) else {
            return listing;
        };
        let filter = if filter.is_empty() {
            None
        } else {
            self.filters.get(filter)
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "." || name == ".." {
                continue;
            }
            let Ok(file_type) = entry.file_type() else {
                continue;
            };

            if file_type.is_dir() {
                if !name.starts_with('.') {
                    listing.folders.insert(name, FOLDER_MARKER.to_string());
                }
                continue;
            }

            let mime = file_mime(&entry.path(), &name);
            if filter.as_ref().map_or(true, |re| re.is_match(&mime)) {
                listing.files.insert(name, mime);
            }
        }

        listing
    }
}

/// MIME type of a listed file: fixed extensions first, then the sniffer
fn file_mime(path: &Path, name: &str) -> String {
    if name.ends_with(".mp4") {
        return "video/mp4".to_string();
    }
    if name.ends_with(".txt") {
        return "text/plain".to_string();
    }
    if name.ends_with(".zip") {
        return "compress/zip".to_string();
    }

    let Ok(file) = File::open(path) else {
        return UNREADABLE_MIME.to_string();
    };
    // A failed read (e.g. a directory symlink) sniffs whatever arrived
    let mut header = Vec::with_capacity(sniff::SNIFF_HEADER_LEN as usize);
    let _ = file.take(sniff::SNIFF_HEADER_LEN).read_to_end(&mut header);
    sniff::detect(&header).unwrap_or_default().to_string()
}
