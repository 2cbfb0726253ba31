//! Endpoint registry
//!
//! A tree keyed by path segment. Every registered node carries the literal
//! URL parts of one REST resource and the auth mode used to call it. The
//! tree is built once from a declarative table and read-only afterwards.

use regex::Regex;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use crate::types::AuthMode;
use crate::{Error, Result};

static SEGMENT_REGEX: OnceLock<Regex> = OnceLock::new();

fn segment_regex() -> &'static Regex {
    // `-` would sort before `/` and break the listing order
    SEGMENT_REGEX.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("Valid regex pattern"))
}

/// The up-to-three literal URL parts of an endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    first: String,
    second: Option<String>,
    third: Option<String>,
}

impl PathParts {
    pub fn new(first: &str, second: Option<&str>, third: Option<&str>) -> Self {
        Self {
            first: first.to_string(),
            second: second.filter(|s| !s.is_empty()).map(String::from),
            third: third.filter(|s| !s.is_empty()).map(String::from),
        }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> Option<&str> {
        self.second.as_deref()
    }

    pub fn third(&self) -> Option<&str> {
        self.third.as_deref()
    }

    /// All path segments, in order, with embedded `/` split out
    fn segments(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.first.as_str())
            .chain(self.second.as_deref())
            .chain(self.third.as_deref())
            .flat_map(|part| part.split('/'))
    }
}

/// One row of a declarative endpoint table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDef {
    pub mode: AuthMode,
    pub part1: &'static str,
    pub part2: Option<&'static str>,
    pub part3: Option<&'static str>,
}

impl EndpointDef {
    pub const fn new(
        mode: AuthMode,
        part1: &'static str,
        part2: Option<&'static str>,
        part3: Option<&'static str>,
    ) -> Self {
        Self { mode, part1, part2, part3 }
    }
}

/// A registered, callable (or explicitly uncallable) resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    path: String,
    parts: PathParts,
    mode: AuthMode,
}

impl Endpoint {
    /// Dotted registry path, e.g. `zones.dns_records`
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parts(&self) -> &PathParts {
        &self.parts
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }
}

impl fmt::Display for Endpoint {
    /// `[/zones/:id/dns_records]`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered = format!("/{}", self.parts.first);
        for part in [&self.parts.second, &self.parts.third].into_iter().flatten() {
            rendered.push_str("/:id/");
            rendered.push_str(part);
        }
        write!(f, "[{}]", rendered)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    endpoint: Option<Endpoint>,
    children: BTreeMap<String, Node>,
}

impl Node {
    fn is_listed(&self) -> bool {
        self.endpoint
            .as_ref()
            .map(|e| e.mode.is_callable())
            .unwrap_or(false)
    }
}

/// Tree of registered endpoints
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    root: Node,
    count: usize,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a table, in table order
    pub fn from_table(table: &[EndpointDef]) -> Result<Self> {
        let mut registry = Self::new();
        for def in table {
            registry.add(def.mode, def.part1, def.part2, def.part3)?;
        }
        Ok(registry)
    }

    /// Register an endpoint, deriving its dotted path from the URL parts
    ///
    /// `("accounts", "storage/kv/namespaces")` lands at
    /// `accounts.storage.kv.namespaces`.
    pub fn add(
        &mut self,
        mode: AuthMode,
        part1: &str,
        part2: Option<&str>,
        part3: Option<&str>,
    ) -> Result<()> {
        let parts = PathParts::new(part1, part2, part3);
        let dotted = parts.segments().collect::<Vec<_>>().join(".");
        self.register(&dotted, part1, part2, part3, mode)
    }

    /// Register an endpoint at an explicit dotted path
    ///
    /// Every parent of the path must already be registered.
    pub fn register(
        &mut self,
        dotted_path: &str,
        part1: &str,
        part2: Option<&str>,
        part3: Option<&str>,
        mode: AuthMode,
    ) -> Result<()> {
        if part1.is_empty() {
            return Err(Error::internal(format!("api load failed: {} has no path", dotted_path)));
        }

        let segments: Vec<&str> = dotted_path.split('.').collect();
        if segments.iter().any(|s| !segment_regex().is_match(s)) {
            return Err(Error::internal(format!("api load name failed: {}", dotted_path)));
        }

        let (name, parents) = segments
            .split_last()
            .ok_or_else(|| Error::internal("api load name failed"))?;

        let mut branch = &mut self.root;
        for segment in parents {
            branch = branch
                .children
                .get_mut(*segment)
                .ok_or_else(|| Error::internal(format!("api load name failed: {}", dotted_path)))?;
        }

        let node = branch.children.entry(name.to_string()).or_default();
        if node.endpoint.is_none() {
            self.count += 1;
        }
        node.endpoint = Some(Endpoint {
            path: dotted_path.to_string(),
            parts: PathParts::new(part1, part2, part3),
            mode,
        });

        tracing::trace!(path = dotted_path, mode = %mode, "endpoint registered");
        Ok(())
    }

    /// Find the endpoint registered at a dotted path
    pub fn lookup(&self, dotted_path: &str) -> Option<&Endpoint> {
        let mut node = &self.root;
        for segment in dotted_path.split('.') {
            node = node.children.get(segment)?;
        }
        node.endpoint.as_ref()
    }

    /// Lazily enumerate `/a/b` call paths of every node exposing a verb
    ///
    /// Depth-first, lexical order at each level, parents before children.
    /// The iterator is `Clone`, and every call starts a fresh walk.
    pub fn list(&self) -> ApiPaths<'_> {
        ApiPaths {
            stack: vec![(String::new(), self.root.children.iter())],
        }
    }

    /// Number of registered nodes, listed or not
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Iterator returned by [`EndpointRegistry::list`]
#[derive(Debug, Clone)]
pub struct ApiPaths<'a> {
    stack: Vec<(String, btree_map::Iter<'a, String, Node>)>,
}

impl<'a> Iterator for ApiPaths<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let step = {
                let (prefix, children) = self.stack.last_mut()?;
                children
                    .next()
                    .map(|(name, node)| (format!("{}/{}", prefix, name), node))
            };

            match step {
                Some((path, node)) => {
                    self.stack.push((path.clone(), node.children.iter()));
                    if node.is_listed() {
                        return Some(path);
                    }
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EndpointRegistry {
        EndpointRegistry::from_table(&[
            EndpointDef::new(AuthMode::Key, "zones", None, None),
            EndpointDef::new(AuthMode::Key, "zones", Some("dns_records"), None),
            EndpointDef::new(AuthMode::Key, "zones", Some("dns_records"), Some("export")),
            EndpointDef::new(AuthMode::Void, "accounts", None, None),
            EndpointDef::new(AuthMode::Void, "accounts", Some("storage"), None),
            EndpointDef::new(AuthMode::Void, "accounts", Some("storage/kv"), None),
            EndpointDef::new(AuthMode::Key, "accounts", Some("storage/kv/namespaces"), None),
            EndpointDef::new(AuthMode::Open, "ips", None, None),
            EndpointDef::new(AuthMode::Cert, "certificates", None, None),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let registry = sample();
        let endpoint = registry.lookup("zones.dns_records").unwrap();
        assert_eq!(endpoint.mode(), AuthMode::Key);
        assert_eq!(endpoint.parts().first(), "zones");
        assert_eq!(endpoint.parts().second(), Some("dns_records"));

        let nested = registry.lookup("accounts.storage.kv.namespaces").unwrap();
        assert_eq!(nested.parts().second(), Some("storage/kv/namespaces"));

        assert!(registry.lookup("zones.nope").is_none());
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_missing_parent_rejected() {
        let mut registry = EndpointRegistry::new();
        let err = registry
            .add(AuthMode::Key, "zones", Some("dns_records"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));
    }

    #[test]
    fn test_bad_segment_rejected() {
        let mut registry = EndpointRegistry::new();
        assert!(registry.register("zones..x", "zones", None, None, AuthMode::Key).is_err());
        assert!(registry.register("zones", "", None, None, AuthMode::Key).is_err());
    }

    #[test]
    fn test_hyphenated_segment_rejected() {
        let mut registry = EndpointRegistry::new();
        registry.add(AuthMode::Key, "zones", None, None).unwrap();
        registry.add(AuthMode::Key, "zones", Some("dns"), None).unwrap();

        let err = registry.add(AuthMode::Key, "zones-x", None, None).unwrap_err();
        assert!(matches!(err, Error::Internal { .. }));

        // names that do register keep the listing sorted
        registry.add(AuthMode::Key, "zones_x", None, None).unwrap();
        registry.add(AuthMode::Key, "zones0", None, None).unwrap();
        let paths: Vec<String> = registry.list().collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
        assert_eq!(paths, vec!["/zones", "/zones/dns", "/zones0", "/zones_x"]);
    }

    #[test]
    fn test_list_order_and_filtering() {
        let registry = sample();
        let paths: Vec<String> = registry.list().collect();
        assert_eq!(
            paths,
            vec![
                "/accounts/storage/kv/namespaces",
                "/certificates",
                "/ips",
                "/zones",
                "/zones/dns_records",
                "/zones/dns_records/export",
            ]
        );
    }

    #[test]
    fn test_list_is_restartable() {
        let registry = sample();
        let mut first = registry.list();
        assert_eq!(first.next().as_deref(), Some("/accounts/storage/kv/namespaces"));
        let resumed = first.clone();
        assert_eq!(first.count(), 5);
        assert_eq!(resumed.count(), 5);
        assert_eq!(registry.list().count(), 6);
    }

    #[test]
    fn test_reregister_keeps_children() {
        let mut registry = sample();
        registry.add(AuthMode::Bearer, "zones", None, None).unwrap();
        assert_eq!(registry.lookup("zones").unwrap().mode(), AuthMode::Bearer);
        assert!(registry.lookup("zones.dns_records").is_some());
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_endpoint_display() {
        let registry = sample();
        assert_eq!(registry.lookup("zones").unwrap().to_string(), "[/zones]");
        assert_eq!(
            registry.lookup("zones.dns_records.export").unwrap().to_string(),
            "[/zones/:id/dns_records/:id/export]"
        );
    }
}
