//! Content resolution
//!
//! Turns a matched route and a request path into what should be sent: a
//! file on disk (handed to the raw file server) or a rendered directory
//! index. Filesystem lookups that fail are treated as "absent" and simply
//! move resolution on to the next branch.

use std::fs::{self, Metadata};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::listing::DirectoryLister;
use super::template::{IndexTemplate, IndexTemplateCache};
use crate::http::RequestOverrides;
use crate::logger;
use crate::routing::Route;

const INDEX_FILE: &str = "index.html";

/// Outcome of resolving a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Stream this path as-is
    File(PathBuf),
    /// Rendered directory index
    Index(String),
}

/// Resolves requests against routes; owns the index-template cache
#[derive(Debug, Default)]
pub struct ContentResolver {
    lister: Arc<DirectoryLister>,
    templates: IndexTemplateCache,
}

impl ContentResolver {
    pub fn new() -> Self {
        Self {
            lister: Arc::new(DirectoryLister::new()),
            templates: IndexTemplateCache::new(),
        }
    }

    pub const fn templates(&self) -> &IndexTemplateCache {
        &self.templates
    }

    pub fn lister(&self) -> &DirectoryLister {
        &self.lister
    }

    /// Atomically drop every compiled index template
    pub fn clear_templates(&self) {
        self.templates.clear();
    }

    /// Decide what to serve for `request_path` under `route`.
    ///
    /// `host` is the absolute request URL handed to index templates.
    pub fn resolve(
        &self,
        route: &Route,
        request_path: &str,
        host: &str,
        overrides: RequestOverrides,
    ) -> Resolution {
        let target = target_path(route, request_path);

        let find_index = route.find_index && overrides.find_index;
        if !find_index || !try_stat(&target).is_some_and(|m| m.is_dir()) {
            return Resolution::File(target);
        }

        logger::log_debug(&format!("Trying index for {}", target.display()));
        let index_file = target.join(INDEX_FILE);
        if try_stat(&index_file).is_some() {
            return Resolution::File(index_file);
        }

        let Some(template_path) = route
            .index_template
            .as_deref()
            .filter(|p| try_stat(p).is_some())
        else {
            logger::log_debug(&format!("No index found for {}", target.display()));
            return Resolution::File(target);
        };

        match self.render_index(template_path, &target, host) {
            Ok(body) => Resolution::Index(body),
            Err(e) => {
                logger::log_error(&format!(
                    "Index template '{}' failed for {}: {}",
                    template_path.display(),
                    target.display(),
                    describe_tera_error(&e)
                ));
                Resolution::File(target)
            }
        }
    }

    fn render_index(&self, template_path: &Path, dir: &Path, host: &str) -> tera::Result<String> {
        let key = (template_path.to_path_buf(), dir.to_path_buf());
        let template = match self.templates.get(&key) {
            Some(template) => template,
            None => {
                let compiled =
                    IndexTemplate::compile(template_path, dir.to_path_buf(), Arc::clone(&self.lister))?;
                self.templates.insert(key, compiled)
            }
        };

        logger::log_debug(&format!("Rendering index for {}", dir.display()));
        template.render(dir, host)
    }
}

/// Filesystem path a request maps to under `route`.
///
/// File aliases ignore the request path. Otherwise the request path is
/// joined as a rooted path: `.` and empty segments vanish and `..` never
/// climbs above `route.path`.
pub fn target_path(route: &Route, request_path: &str) -> PathBuf {
    let base = clean(Path::new(&route.path));
    if route.file_alias {
        return base;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in request_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    segments.into_iter().fold(base, |path, s| path.join(s))
}

/// Lexically normalise a configured path
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Metadata for `path`, `None` when it cannot be read
pub fn try_stat(path: &Path) -> Option<Metadata> {
    fs::metadata(path).ok()
}

/// Tera nests the useful message in the error source chain
fn describe_tera_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(err) = source {
        message.push_str(": ");
        message.push_str(&err.to_string());
        source = err.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;
    use tempfile::TempDir;

    fn route(path: &Path, find_index: bool, use_index: &Path) -> Route {
        Route::compile(&RouteConfig {
            pattern: "/".to_string(),
            path: path.to_string_lossy().into_owned(),
            priority: 0,
            file_alias: false,
            find_index,
            use_index: use_index.to_string_lossy().into_owned(),
        })
        .unwrap()
    }

    fn docs_fixture() -> (TempDir, PathBuf, PathBuf) {
        let root = TempDir::new().unwrap();
        let docs = root.path().join("docs");
        fs::create_dir_all(docs.join("sub")).unwrap();
        let tmpl = root.path().join("tmpl");
        fs::create_dir(&tmpl).unwrap();
        let tmpl = tmpl.join("index.tmpl");
        fs::write(&tmpl, "dir={{ CurrentPath }} host={{ Host }}").unwrap();
        (root, docs, tmpl)
    }

    #[test]
    fn test_target_path_joins_and_cleans() {
        let r = route(Path::new("/docs"), false, Path::new(""));
        assert_eq!(target_path(&r, "/sub/page.html"), PathBuf::from("/docs/sub/page.html"));
        assert_eq!(target_path(&r, "/a/./b//c"), PathBuf::from("/docs/a/b/c"));
        assert_eq!(target_path(&r, "/a/../b"), PathBuf::from("/docs/b"));
        assert_eq!(target_path(&r, "/"), PathBuf::from("/docs"));
    }

    #[test]
    fn test_target_path_cannot_escape_route_root() {
        let r = route(Path::new("./pub"), false, Path::new(""));
        assert_eq!(target_path(&r, "/../../etc/passwd"), PathBuf::from("pub/etc/passwd"));
        let r = route(Path::new("/srv/docs/"), false, Path::new(""));
        assert_eq!(target_path(&r, "/.."), PathBuf::from("/srv/docs"));
    }

    #[test]
    fn test_file_alias_ignores_request_path() {
        let mut r = route(Path::new("/srv/docs/index.html"), false, Path::new(""));
        r.file_alias = true;
        assert_eq!(target_path(&r, "/guide/deep/path"), PathBuf::from("/srv/docs/index.html"));
    }

    #[test]
    fn test_clean_relative_parents() {
        assert_eq!(clean(Path::new("../a/./b/..")), PathBuf::from("../a"));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
    }

    #[test]
    fn test_directory_without_index_renders_template() {
        let (_root, docs, tmpl) = docs_fixture();
        let resolver = ContentResolver::new();
        let r = route(&docs, true, &tmpl);

        let resolution =
            resolver.resolve(&r, "/sub", "http://example.org/sub", RequestOverrides::default());
        assert_eq!(
            resolution,
            Resolution::Index(format!(
                "dir={} host=http://example.org/sub",
                docs.join("sub").display()
            ))
        );
        assert_eq!(resolver.templates().len(), 1);
    }

    #[test]
    fn test_existing_index_html_bypasses_template() {
        let (_root, docs, tmpl) = docs_fixture();
        fs::write(docs.join("sub").join("index.html"), "<p>hi</p>").unwrap();
        let resolver = ContentResolver::new();
        let r = route(&docs, true, &tmpl);

        let resolution = resolver.resolve(&r, "/sub", "h", RequestOverrides::default());
        assert_eq!(resolution, Resolution::File(docs.join("sub").join("index.html")));
        assert!(resolver.templates().is_empty());
    }

    #[test]
    fn test_findindex_override_serves_raw() {
        let (_root, docs, tmpl) = docs_fixture();
        let resolver = ContentResolver::new();
        let r = route(&docs, true, &tmpl);
        let overrides = RequestOverrides {
            find_index: false,
            clear_cache: false,
        };

        assert_eq!(
            resolver.resolve(&r, "/sub", "h", overrides),
            Resolution::File(docs.join("sub"))
        );
    }

    #[test]
    fn test_findindex_disabled_on_route() {
        let (_root, docs, tmpl) = docs_fixture();
        let r = route(&docs, false, &tmpl);
        assert_eq!(
            ContentResolver::new().resolve(&r, "/sub", "h", RequestOverrides::default()),
            Resolution::File(docs.join("sub"))
        );
    }

    #[test]
    fn test_missing_template_serves_directory() {
        let (root, docs, _tmpl) = docs_fixture();
        let r = route(&docs, true, &root.path().join("absent.tmpl"));
        assert_eq!(
            ContentResolver::new().resolve(&r, "/sub", "h", RequestOverrides::default()),
            Resolution::File(docs.join("sub"))
        );
    }

    #[test]
    fn test_broken_template_falls_back_and_is_not_cached() {
        let (_root, docs, tmpl) = docs_fixture();
        fs::write(&tmpl, "{% if %}").unwrap();
        let resolver = ContentResolver::new();
        let r = route(&docs, true, &tmpl);

        assert_eq!(
            resolver.resolve(&r, "/sub", "h", RequestOverrides::default()),
            Resolution::File(docs.join("sub"))
        );
        assert!(resolver.templates().is_empty());
    }

    #[test]
    fn test_regular_file_is_served_directly() {
        let (_root, docs, tmpl) = docs_fixture();
        fs::write(docs.join("page.txt"), "x").unwrap();
        let r = route(&docs, true, &tmpl);
        assert_eq!(
            ContentResolver::new().resolve(&r, "/page.txt", "h", RequestOverrides::default()),
            Resolution::File(docs.join("page.txt"))
        );
    }

    #[test]
    fn test_cache_keyed_per_directory_and_repopulates_after_clear() {
        let (_root, docs, tmpl) = docs_fixture();
        fs::create_dir(docs.join("other")).unwrap();
        let resolver = ContentResolver::new();
        let r = route(&docs, true, &tmpl);

        let first = resolver.resolve(&r, "/sub", "h", RequestOverrides::default());
        resolver.resolve(&r, "/other", "h", RequestOverrides::default());
        resolver.resolve(&r, "/sub", "h", RequestOverrides::default());
        assert_eq!(resolver.templates().len(), 2);

        resolver.clear_templates();
        resolver.clear_templates();
        assert!(resolver.templates().is_empty());

        let again = resolver.resolve(&r, "/sub", "h", RequestOverrides::default());
        assert_eq!(again, first);
        assert_eq!(resolver.templates().len(), 1);
    }

    #[test]
    fn test_cached_template_survives_source_edit_until_cleared() {
        let (_root, docs, tmpl) = docs_fixture();
        let resolver = ContentResolver::new();
        let r = route(&docs, true, &tmpl);
        let before = resolver.resolve(&r, "/sub", "h", RequestOverrides::default());

        fs::write(&tmpl, "edited").unwrap();
        assert_eq!(resolver.resolve(&r, "/sub", "h", RequestOverrides::default()), before);

        resolver.clear_templates();
        assert_eq!(
            resolver.resolve(&r, "/sub", "h", RequestOverrides::default()),
            Resolution::Index("edited".to_string())
        );
    }
}
