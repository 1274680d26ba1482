//! Module resolution map building.
//!
//! For every file the resolver mints one ephemeral reference and registers
//! two specifiers for it in the import map: the bare file name and the
//! rooted alias (`/main.js` with the default prefix). The reverse registry
//! maps each reference back to its file name so error reports can be
//! attributed.

use std::collections::{BTreeMap, HashMap};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use playmap_core::{MediaType, ResolverConfig};

use crate::error::ResourceResult;
use crate::reference::ResourceRef;
use crate::store::SharedResourceStore;

/// Declarative specifier → locator table, serialized as `{"imports": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    /// Specifier to locator.
    pub imports: BTreeMap<String, ResourceRef>,
}

impl ImportMap {
    /// Look up a specifier.
    pub fn get(&self, specifier: &str) -> Option<&ResourceRef> {
        self.imports.get(specifier)
    }

    /// Number of specifiers.
    pub fn len(&self) -> usize {
        self.imports.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> ResourceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// JSON safe to embed as the body of a script element.
    ///
    /// `</` is written as `<\/`, which is the same JSON string but cannot
    /// close the surrounding element.
    pub fn to_script_body(&self) -> ResourceResult<String> {
        Ok(self.to_json()?.replace("</", "<\\/"))
    }
}

/// Locator → file name, the inverse of one run's references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReverseRegistry {
    entries: HashMap<ResourceRef, String>,
}

impl ReverseRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the file name behind a reference.
    pub fn insert(&mut self, reference: ResourceRef, name: impl Into<String>) {
        self.entries.insert(reference, name.into());
    }

    /// File name behind a locator, if it belongs to this run.
    pub fn resolve(&self, locator: &str) -> Option<&str> {
        self.entries.get(locator).map(String::as_str)
    }

    /// File name behind a locator, or the locator itself on a miss.
    pub fn attribute<'a>(&'a self, locator: &'a str) -> &'a str {
        self.resolve(locator).unwrap_or(locator)
    }

    /// Check whether a reference is registered.
    pub fn contains(&self, reference: &ResourceRef) -> bool {
        self.entries.contains_key(reference)
    }

    /// Iterate over `(reference, name)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceRef, &str)> + '_ {
        self.entries.iter().map(|(r, n)| (r, n.as_str()))
    }

    /// Number of registered references.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct ResolvedModules {
    /// Specifier table for the document.
    pub import_map: ImportMap,
    /// Reverse lookup for error attribution.
    pub registry: ReverseRegistry,
    /// Every reference minted by the pass, shadowed ones included.
    pub references: Vec<ResourceRef>,
}

/// Builds import maps backed by a resource store.
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    store: SharedResourceStore,
    alias_prefix: String,
}

impl ModuleResolver {
    /// Create a resolver minting into `store`.
    pub fn new(store: SharedResourceStore, config: &ResolverConfig) -> Self {
        Self {
            store,
            alias_prefix: config.alias_prefix.clone(),
        }
    }

    /// The backing store.
    pub fn store(&self) -> &SharedResourceStore {
        &self.store
    }

    /// Rooted alias registered for a file name.
    pub fn alias(&self, name: &str) -> String {
        format!("{}{}", self.alias_prefix, name)
    }

    /// Mint references for `(name, content)` pairs and build the maps.
    ///
    /// Every file gets a reference. When two files share a name the later
    /// one owns both specifiers; the earlier reference stays in the
    /// registry and in `references` so it can still be attributed and
    /// released.
    pub fn build<'a>(
        &self,
        files: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> ResolvedModules {
        let mut resolved = ResolvedModules::default();

        for (name, content) in files {
            let media = MediaType::infer(name);
            if !media.is_supported() {
                debug!(file = name, "No media type for file extension");
            }

            let reference = self
                .store
                .create(Bytes::copy_from_slice(content.as_bytes()), media);

            let previous = resolved
                .import_map
                .imports
                .insert(name.to_string(), reference.clone());
            if previous.is_some() {
                debug!(file = name, "Duplicate file name, later file wins");
            }
            resolved
                .import_map
                .imports
                .insert(self.alias(name), reference.clone());

            resolved.registry.insert(reference.clone(), name);
            resolved.references.push(reference);
        }

        debug!(
            files = resolved.references.len(),
            specifiers = resolved.import_map.len(),
            "Built module resolution map"
        );

        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ResourceStore;

    fn resolver() -> ModuleResolver {
        let config = ResolverConfig::default();
        ModuleResolver::new(ResourceStore::new(&config).into_shared(), &config)
    }

    #[test]
    fn test_two_specifiers_per_file() {
        let resolver = resolver();
        let files = [
            ("index.html", "<html></html>"),
            ("main.js", "console.log(1)"),
            ("style.css", "body {}"),
            ("notes.txt", "plain"),
        ];

        let resolved = resolver.build(files);

        assert_eq!(resolved.import_map.len(), 2 * files.len());
        assert_eq!(resolved.registry.len(), files.len());
        for reference in resolved.import_map.imports.values() {
            assert!(resolved.registry.contains(reference));
        }
        assert_eq!(
            resolved.import_map.get("main.js"),
            resolved.import_map.get("/main.js")
        );
    }

    #[test]
    fn test_registry_attribution() {
        let resolver = resolver();
        let resolved = resolver.build([("main.js", "boom()")]);
        let reference = resolved.import_map.get("main.js").unwrap();

        assert_eq!(resolved.registry.resolve(reference.as_str()), Some("main.js"));
        assert_eq!(resolved.registry.attribute("blob:elsewhere/1"), "blob:elsewhere/1");
    }

    #[test]
    fn test_resources_carry_content_and_media() {
        let resolver = resolver();
        let resolved = resolver.build([("main.js", "let a = 1;"), ("notes.txt", "")]);

        let script = resolver
            .store()
            .get(resolved.import_map.get("main.js").unwrap())
            .unwrap();
        assert_eq!(script.content().as_ref(), b"let a = 1;");
        assert_eq!(script.mime(), Some("application/javascript"));

        let notes = resolver
            .store()
            .get(resolved.import_map.get("notes.txt").unwrap())
            .unwrap();
        assert_eq!(notes.media(), MediaType::Unsupported);
    }

    #[test]
    fn test_duplicate_name_last_write_wins() {
        let resolver = resolver();
        let resolved = resolver.build([("a.js", "first"), ("a.js", "second")]);

        assert_eq!(resolved.import_map.len(), 2);
        assert_eq!(resolved.references.len(), 2);

        let winner = resolver
            .store()
            .get(resolved.import_map.get("a.js").unwrap())
            .unwrap();
        assert_eq!(winner.content().as_ref(), b"second");
        assert_eq!(resolved.registry.resolve(resolved.references[0].as_str()), Some("a.js"));
    }

    #[test]
    fn test_fresh_references_each_pass() {
        let resolver = resolver();
        let first = resolver.build([("a.js", "x")]);
        let second = resolver.build([("a.js", "x")]);

        assert_ne!(first.import_map.get("a.js"), second.import_map.get("a.js"));
        assert_eq!(resolver.store().len(), 2);
    }

    #[test]
    fn test_script_body_escapes_closing_tags() {
        let resolver = resolver();
        let resolved = resolver.build([("</script>.js", "")]);
        let body = resolved.import_map.to_script_body().unwrap();

        assert!(!body.contains("</"));
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(parsed["imports"]["</script>.js"].is_string());
    }
}
