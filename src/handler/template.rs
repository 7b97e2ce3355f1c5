//! Directory index templates
//!
//! An index template is a Tera file compiled once per (template, directory)
//! pair. The directory is bound into the template's `getfiles` function, so
//! the same file yields a distinct compiled template for every directory it
//! lists.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;
use tera::{Context, Tera};

use super::listing::DirectoryLister;

/// Name of the function exposed to templates
pub const GETFILES_FUNCTION: &str = "getfiles";

/// Cache key: (template path, listed directory)
pub type TemplateKey = (PathBuf, PathBuf);

/// A compiled index template bound to one directory
#[derive(Debug)]
pub struct IndexTemplate {
    tera: Tera,
    name: String,
}

impl IndexTemplate {
    /// Compile `template_path` with `getfiles` bound to `dir`
    pub fn compile(
        template_path: &Path,
        dir: PathBuf,
        lister: Arc<DirectoryLister>,
    ) -> tera::Result<Self> {
        let name = template_path
            .file_name()
            .map_or_else(|| "index".to_string(), |n| n.to_string_lossy().into_owned());

        let mut tera = Tera::default();
        tera.add_template_file(template_path, Some(&name))?;
        tera.register_function(
            GETFILES_FUNCTION,
            move |args: &HashMap<String, Value>| -> tera::Result<Value> {
                let filter = match args.get("filter") {
                    None => "",
                    Some(Value::String(s)) => s.as_str(),
                    Some(other) => {
                        return Err(tera::Error::msg(format!(
                            "`{GETFILES_FUNCTION}`: `filter` must be a string, got {other}"
                        )))
                    }
                };
                serde_json::to_value(lister.list(&dir, filter))
                    .map_err(|e| tera::Error::msg(e.to_string()))
            },
        );

        Ok(Self { tera, name })
    }

    /// Render with the `CurrentPath` and `Host` context keys
    pub fn render(&self, current_path: &Path, host: &str) -> tera::Result<String> {
        let mut context = Context::new();
        context.insert("CurrentPath", &current_path.to_string_lossy());
        context.insert("Host", host);
        self.tera.render(&self.name, &context)
    }
}

/// Compiled templates shared by all requests.
///
/// Entries live until [`IndexTemplateCache::clear`] swaps in an empty map.
#[derive(Debug, Default)]
pub struct IndexTemplateCache {
    templates: RwLock<HashMap<TemplateKey, Arc<IndexTemplate>>>,
}

impl IndexTemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &TemplateKey) -> Option<Arc<IndexTemplate>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Store a compiled template; a concurrent insert for the same key wins
    pub fn insert(&self, key: TemplateKey, template: IndexTemplate) -> Arc<IndexTemplate> {
        Arc::clone(
            self.templates
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(key)
                .or_insert_with(|| Arc::new(template)),
        )
    }

    /// Replace the whole cache with an empty one
    pub fn clear(&self) {
        *self.templates.write().unwrap_or_else(PoisonError::into_inner) = HashMap::new();
    }

    pub fn len(&self) -> usize {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LISTING: &str = "{{ CurrentPath }}|{{ Host }}|\
        {% set l = getfiles(filter=\"\") %}\
        {% for name, mime in l.files %}{{ name }}={{ mime }};{% endfor %}|\
        {% for name, kind in l.folders %}{{ name }}:{{ kind }};{% endfor %}";

    #[test]
    fn test_render_binds_directory_and_context() {
        let root = TempDir::new().unwrap();
        let tmpl = root.path().join("index.tmpl");
        fs::write(&tmpl, LISTING).unwrap();
        let dir = root.path().join("docs");
        fs::create_dir(&dir).unwrap();
        fs::create_dir(dir.join("img")).unwrap();
        fs::write(dir.join("b.txt"), "b").unwrap();
        fs::write(dir.join("a.mp4"), "a").unwrap();

        let template =
            IndexTemplate::compile(&tmpl, dir.clone(), Arc::new(DirectoryLister::new())).unwrap();
        let out = template.render(&dir, "http://localhost/docs").unwrap();

        assert_eq!(
            out,
            format!(
                "{}|http://localhost/docs|a.mp4=video/mp4;b.txt=text/plain;|img:folder;",
                dir.display()
            )
        );
    }

    #[test]
    fn test_filter_argument_reaches_lister() {
        let root = TempDir::new().unwrap();
        let tmpl = root.path().join("videos.tmpl");
        fs::write(
            &tmpl,
            "{% set l = getfiles(filter=\"video\") %}{% for name, mime in l.files %}{{ name }};{% endfor %}",
        )
        .unwrap();
        fs::write(root.path().join("clip.mp4"), "v").unwrap();
        fs::write(root.path().join("notes.txt"), "n").unwrap();

        let template = IndexTemplate::compile(
            &tmpl,
            root.path().to_path_buf(),
            Arc::new(DirectoryLister::new()),
        )
        .unwrap();
        assert_eq!(template.render(root.path(), "h").unwrap(), "clip.mp4;");
    }

    #[test]
    fn test_compile_errors_surface() {
        let root = TempDir::new().unwrap();
        let broken = root.path().join("broken.tmpl");
        fs::write(&broken, "{% for x in %}").unwrap();
        let lister = Arc::new(DirectoryLister::new());

        assert!(IndexTemplate::compile(&broken, root.path().to_path_buf(), Arc::clone(&lister)).is_err());
        assert!(IndexTemplate::compile(&root.path().join("missing"), root.path().to_path_buf(), lister).is_err());
    }

    #[test]
    fn test_cache_clear_is_idempotent() {
        let root = TempDir::new().unwrap();
        let tmpl = root.path().join("t.tmpl");
        fs::write(&tmpl, "x").unwrap();
        let cache = IndexTemplateCache::new();
        let key = (tmpl.clone(), root.path().to_path_buf());
        let compiled =
            IndexTemplate::compile(&tmpl, key.1.clone(), Arc::new(DirectoryLister::new())).unwrap();

        cache.insert(key.clone(), compiled);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key).is_some());

        cache.clear();
        assert!(cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&key).is_none());
    }
}
