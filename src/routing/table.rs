//! Route table
//!
//! Routes are registered in declaration order, then frozen into a table
//! sorted by descending priority. Matching walks that order and returns the
//! first route whose pattern matches the start of the request path.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use regex::Regex;

use crate::config::RouteConfig;
use crate::error::ConfigError;

/// A compiled route
#[derive(Debug)]
pub struct Route {
    pub path: String,
    pub pattern: String,
    pub priority: i64,
    pub file_alias: bool,
    pub find_index: bool,
    /// Listing template, `None` when `useindex` is unset
    pub index_template: Option<PathBuf>,
    matcher: Regex,
}

impl Route {
    /// Compile a configured route. The pattern is anchored at the start only.
    pub fn compile(cfg: &RouteConfig) -> Result<Self, ConfigError> {
        let matcher =
            Regex::new(&format!("^{}", cfg.pattern)).map_err(|source| ConfigError::InvalidPattern {
                pattern: cfg.pattern.clone(),
                source,
            })?;

        Ok(Self {
            path: cfg.path.clone(),
            pattern: cfg.pattern.clone(),
            priority: cfg.priority,
            file_alias: cfg.file_alias,
            find_index: cfg.find_index,
            index_template: (!cfg.use_index.is_empty()).then(|| PathBuf::from(&cfg.use_index)),
            matcher,
        })
    }

    /// Prefix match: a trailing unmatched suffix is allowed
    pub fn matches(&self, request_path: &str) -> bool {
        self.matcher.is_match(request_path)
    }
}

/// Collects routes before the table is frozen
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
    routes: Vec<Arc<Route>>,
    patterns: HashSet<String>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route, rejecting duplicate or invalid patterns
    pub fn register(&mut self, cfg: &RouteConfig) -> Result<&mut Self, ConfigError> {
        if self.patterns.contains(&cfg.pattern) {
            return Err(ConfigError::DuplicatePattern {
                pattern: cfg.pattern.clone(),
                path: cfg.path.clone(),
            });
        }

        let route = Route::compile(cfg)?;
        self.patterns.insert(cfg.pattern.clone());
        self.routes.push(Arc::new(route));
        Ok(self)
    }

    /// Freeze the table. Equal priorities keep their registration order.
    pub fn finalize(self) -> RouteTable {
        let mut routes = self.routes;
        // sort_by is stable
        routes.sort_by(|a, b| b.priority.cmp(&a.priority));
        RouteTable { routes }
    }
}

/// Read-only, priority-ordered routes shared by every request
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
}

impl RouteTable {
    /// Build a finalized table from configured routes
    pub fn from_config(routes: &[RouteConfig]) -> Result<Self, ConfigError> {
        let mut builder = RouteTableBuilder::new();
        for cfg in routes {
            builder.register(cfg)?;
        }
        Ok(builder.finalize())
    }

    /// First route, in priority order, matching the request path
    pub fn match_path(&self, request_path: &str) -> Option<&Arc<Route>> {
        self.routes.iter().find(|route| route.matches(request_path))
    }

    /// Routes in match order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Arc<Route>> {
        self.routes.iter()
    }
}
